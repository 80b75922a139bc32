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

use chrono::Utc;
use ferrite_model::{IpRecord, NicRecord};
use ferrite_store::{NIC_BUCKET, ObjectStore, ip_bucket};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ProvisionConfig;
use crate::context::AllocationContext;
use crate::create::{AllocatedNic, map_not_found, view_of};
use crate::directory::NetworkDirectory;
use crate::driver::nic_and_ip;
use crate::error::{FieldError, ProvisionError};
use crate::fabric::StoreFabricResolver;
use crate::nic_select::NicSelection;
use crate::params::{NicBlueprint, UpdateNic};
use crate::provisioner::{IpProvision, NetworkProvision, Provisioner};

/// Reconcile an existing NIC against an update: merge the mutable fields,
/// rebind the IP when it is changing (releasing the old one if it still
/// belongs to this NIC), and run the result through the allocation loop.
/// The MAC never changes.
pub async fn update_nic(
    store: &dyn ObjectStore,
    networks: &dyn NetworkDirectory,
    config: &ProvisionConfig,
    params: UpdateNic,
) -> Result<AllocatedNic, ProvisionError> {
    update_nic_with_rng(store, networks, config, params, StdRng::from_os_rng()).await
}

pub async fn update_nic_with_rng(
    store: &dyn ObjectStore,
    networks: &dyn NetworkDirectory,
    config: &ProvisionConfig,
    params: UpdateNic,
    rng: StdRng,
) -> Result<AllocatedNic, ProvisionError> {
    let object = store
        .get(NIC_BUCKET, &params.mac.number().to_string())
        .await
        .map_err(|err| map_not_found(err, "nic", params.mac.to_string()))?;
    let existing = NicRecord::from_object(&object)?;

    let blueprint = NicBlueprint::merged(&existing, &params);
    let ownership = blueprint.ownership();

    // Unchanged network/IP fields default from the existing binding.
    let target_network = params.network_uuid.or(existing.network_uuid);
    let ip_changing = params
        .ip
        .is_some_and(|ip| existing.ip_address != Some(ip))
        || params
            .network_uuid
            .is_some_and(|uuid| existing.network_uuid != Some(uuid));

    let mut provisioners = Vec::new();
    let mut remove_ips = Vec::new();
    let mut ip_updates = Vec::new();

    if ip_changing {
        let Some(network_uuid) = target_network else {
            return Err(ProvisionError::InvalidParams {
                errors: vec![FieldError::missing("network_uuid")],
            });
        };
        let network = networks.network(&network_uuid).await?;

        if let Some(ip) = params.ip {
            if !network.contains(&ip) {
                return Err(ProvisionError::InvalidParams {
                    errors: vec![FieldError::invalid("ip", "not within the network's subnet")],
                });
            }
            // The new address must be provisionable before we go anywhere
            // near the allocation loop.
            match store.get(&ip_bucket(&network.uuid), &ip.to_string()).await {
                Ok(object) => {
                    let record = IpRecord::from_object(&object)?;
                    if !record.free && !record.provisionable(&ownership.owner_uuid) {
                        return Err(ProvisionError::IpInUse {
                            field: "ip",
                            used_by: record.belongs_to_type.zip(record.belongs_to_uuid),
                        });
                    }
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
            provisioners.push(Provisioner::Ip(IpProvision::new("ip", ip, network)));
        } else {
            provisioners.push(Provisioner::Network(NetworkProvision::new(network)));
        }

        // Release the old address, but only while it still belongs to
        // this NIC. Ownership reassigned underneath us means we detach
        // without freeing.
        if let (Some(old_ip), Some(old_network)) = (existing.ip_address, existing.network_uuid) {
            match store
                .get(&ip_bucket(&old_network), &old_ip.to_string())
                .await
            {
                Ok(object) => {
                    let record = IpRecord::from_object(&object)?;
                    if record.belongs_to_uuid == Some(existing.belongs_to_uuid) {
                        remove_ips.push(record);
                    } else {
                        tracing::info!(
                            address = %old_ip,
                            mac = %existing.mac,
                            "old IP no longer belongs to this NIC, detaching without freeing"
                        );
                    }
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }
    } else if let Some(reserved) = params.reserved {
        // Reservation toggle on the address the NIC keeps.
        if let (Some(ip), Some(network_uuid)) = (existing.ip_address, existing.network_uuid) {
            match store
                .get(&ip_bucket(&network_uuid), &ip.to_string())
                .await
            {
                Ok(object) => {
                    let mut record = IpRecord::from_object(&object)?;
                    if record.reserved != reserved {
                        record.reserved = reserved;
                        record.modified_at = Utc::now();
                        ip_updates.push(record);
                    }
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }
    }

    let resolver = StoreFabricResolver::new(store);
    let mut ctx = AllocationContext::with_rng(
        store, networks, &resolver, config, ownership, blueprint, rng,
    );
    ctx.remove_ips = remove_ips;
    ctx.ip_updates = ip_updates;
    if ip_changing {
        ctx.reserve_ip = params.reserved.unwrap_or(false);
    }

    let mut nic_fn = NicSelection::Existing(existing);
    let record = nic_and_ip(&mut ctx, &mut provisioners, &mut nic_fn).await?;
    let vnet_cns = std::mem::take(&mut ctx.vnet_cns);
    let nic = view_of(networks, &record).await?;
    Ok(AllocatedNic { nic, vnet_cns })
}
