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

use ferrite_model::{Nic, NicRecord};
use ferrite_network::Mac;
use ferrite_store::{NIC_BUCKET, ObjectStore, StoreError};
use ferrite_uuid::compute_node::ComputeNodeId;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ProvisionConfig;
use crate::context::AllocationContext;
use crate::directory::NetworkDirectory;
use crate::driver::nic_and_ip;
use crate::error::{FieldError, ProvisionError};
use crate::fabric::StoreFabricResolver;
use crate::nic_select::NicSelection;
use crate::params::CreateNic;
use crate::provisioner::{IpProvision, NetworkPoolProvision, NetworkProvision, Provisioner};

/// The outcome of an allocation: the serialized NIC plus, when the bound
/// network is a fabric, the compute nodes sharing its overlay at commit
/// time (what the overlay control plane needs to hear about the change).
#[derive(Debug)]
pub struct AllocatedNic {
    pub nic: Nic,
    pub vnet_cns: BTreeSet<ComputeNodeId>,
}

/// Provision a new NIC, binding an IP when the request names an address
/// source. Returns the caller-facing serialization of what was committed.
pub async fn provision_nic(
    store: &dyn ObjectStore,
    networks: &dyn NetworkDirectory,
    config: &ProvisionConfig,
    params: CreateNic,
) -> Result<AllocatedNic, ProvisionError> {
    provision_nic_with_rng(store, networks, config, params, StdRng::from_os_rng()).await
}

/// As [`provision_nic`], with the random source injected. Tests seed this
/// to pin down the probing order.
pub async fn provision_nic_with_rng(
    store: &dyn ObjectStore,
    networks: &dyn NetworkDirectory,
    config: &ProvisionConfig,
    params: CreateNic,
    rng: StdRng,
) -> Result<AllocatedNic, ProvisionError> {
    params.validate()?;

    let mut provisioners = Vec::new();
    if let Some(ip) = params.ip {
        let Some(network_uuid) = params.network_uuid else {
            return Err(ProvisionError::InvalidParams {
                errors: vec![FieldError::missing("network_uuid")],
            });
        };
        let network = networks.network(&network_uuid).await?;
        if !network.contains(&ip) {
            return Err(ProvisionError::InvalidParams {
                errors: vec![FieldError::invalid("ip", "not within the network's subnet")],
            });
        }
        provisioners.push(Provisioner::Ip(IpProvision::new("ip", ip, network)));
    } else if let Some(network_uuid) = params.network_uuid {
        let network = networks.network(&network_uuid).await?;
        provisioners.push(Provisioner::Network(NetworkProvision::new(network)));
    } else if let Some(pool_uuid) = params.network_pool {
        let pool = networks.pool(&pool_uuid).await?;
        provisioners.push(Provisioner::Pool(NetworkPoolProvision::new(
            "network_pool",
            &pool,
        )));
    }

    let mut nic_fn = match params.mac {
        Some(mac) => NicSelection::MacSupplied(mac),
        None => NicSelection::random(),
    };

    let resolver = StoreFabricResolver::new(store);
    let mut ctx = AllocationContext::with_rng(
        store,
        networks,
        &resolver,
        config,
        params.ownership(),
        params.blueprint(),
        rng,
    );
    ctx.reserve_ip = params.reserved;

    let record = nic_and_ip(&mut ctx, &mut provisioners, &mut nic_fn).await?;
    let vnet_cns = std::mem::take(&mut ctx.vnet_cns);
    let nic = view_of(networks, &record).await?;
    Ok(AllocatedNic { nic, vnet_cns })
}

/// Load a NIC by MAC and serialize it the way provision/update do.
pub async fn get_nic(
    store: &dyn ObjectStore,
    networks: &dyn NetworkDirectory,
    mac: Mac,
) -> Result<Nic, ProvisionError> {
    let object = store
        .get(NIC_BUCKET, &mac.number().to_string())
        .await
        .map_err(|err| map_not_found(err, "nic", mac.to_string()))?;
    let nic = NicRecord::from_object(&object)?;
    view_of(networks, &nic).await
}

pub(crate) async fn view_of(
    networks: &dyn NetworkDirectory,
    nic: &NicRecord,
) -> Result<Nic, ProvisionError> {
    let network = match nic.network_uuid {
        Some(id) => Some(networks.network(&id).await?),
        None => None,
    };
    Ok(nic.view(network.as_ref()))
}

pub(crate) fn map_not_found(err: StoreError, kind: &'static str, id: String) -> ProvisionError {
    if err.is_not_found() {
        ProvisionError::NotFound { kind, id }
    } else {
        ProvisionError::from(err)
    }
}
