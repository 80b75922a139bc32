/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use std::collections::BTreeSet;

use ferrite_model::{IpRecord, NicRecord};
use ferrite_network::Mac;
use ferrite_store::{NIC_BUCKET, ObjectStore, ip_bucket};
use ferrite_uuid::compute_node::ComputeNodeId;

use crate::create::map_not_found;
use crate::error::ProvisionError;
use crate::fabric::{FabricResolver, StoreFabricResolver};

/// What a delete hands back: the removed record plus, for fabric NICs,
/// the compute nodes sharing the overlay at commit time (the data the
/// overlay control plane needs to hear about the departure).
#[derive(Debug)]
pub struct DeletedNic {
    pub nic: NicRecord,
    pub vnet_cns: BTreeSet<ComputeNodeId>,
}

/// Remove a NIC and release the addresses it owns, in one atomic commit.
/// An IP whose ownership no longer matches is logged and left alone.
pub async fn delete_nic(store: &dyn ObjectStore, mac: Mac) -> Result<DeletedNic, ProvisionError> {
    let object = store
        .get(NIC_BUCKET, &mac.number().to_string())
        .await
        .map_err(|err| map_not_found(err, "nic", mac.to_string()))?;
    let nic = NicRecord::from_object(&object)?;

    let vnet_cns = match nic.vnet_id {
        Some(vnet_id) => StoreFabricResolver::new(store).vnet_cns(vnet_id).await?,
        None => BTreeSet::new(),
    };

    let mut batch = vec![nic.delete_batch()];

    if let (Some(ip), Some(network_uuid)) = (nic.ip_address, nic.network_uuid) {
        match store.get(&ip_bucket(&network_uuid), &ip.to_string()).await {
            Ok(object) => {
                let record = IpRecord::from_object(&object)?;
                if record.belongs_to_uuid == Some(nic.belongs_to_uuid) {
                    batch.push(record.unassign_batch());
                } else {
                    tracing::warn!(
                        address = %ip,
                        mac = %nic.mac,
                        belongs_to = ?record.belongs_to_uuid,
                        "IP ownership changed underneath this NIC, leaving the record alone"
                    );
                }
            }
            Err(err) if err.is_not_found() => {
                tracing::warn!(address = %ip, mac = %nic.mac, "bound IP has no record");
            }
            Err(err) => return Err(err.into()),
        }
    }

    store.commit(batch).await?;
    tracing::info!(mac = %nic.mac, "NIC deleted");

    Ok(DeletedNic { nic, vnet_cns })
}
