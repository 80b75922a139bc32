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

use ferrite_model::NicRecord;
use ferrite_store::{ListFilter, NIC_BUCKET, ObjectStore};
use ferrite_uuid::compute_node::ComputeNodeId;

use crate::error::ProvisionError;

/// Resolves the set of compute nodes that share an overlay segment. A NIC
/// landing on (or leaving) a fabric network needs this set so the overlay
/// control plane can be told who is affected. One snapshot read per
/// request; membership changing concurrently is not blocked.
#[async_trait::async_trait]
pub trait FabricResolver: Send + Sync {
    async fn vnet_cns(&self, vnet_id: u32) -> Result<BTreeSet<ComputeNodeId>, ProvisionError>;
}

/// The store-backed resolver: fabric NIC records carry their network's
/// vnet_id, so membership is a single filtered scan of the NIC bucket.
pub struct StoreFabricResolver<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> StoreFabricResolver<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        StoreFabricResolver { store }
    }
}

#[async_trait::async_trait]
impl FabricResolver for StoreFabricResolver<'_> {
    async fn vnet_cns(&self, vnet_id: u32) -> Result<BTreeSet<ComputeNodeId>, ProvisionError> {
        let filter = ListFilter::new().eq("vnet_id", vnet_id).present("cn_uuid");
        let members = self.store.list(NIC_BUCKET, &filter).await?;

        let mut cns = BTreeSet::new();
        for object in &members {
            let nic = NicRecord::from_object(object)?;
            if let Some(cn_uuid) = nic.cn_uuid {
                cns.insert(cn_uuid);
            }
        }
        tracing::debug!(vnet_id, cns = cns.len(), "resolved fabric members");
        Ok(cns)
    }
}
