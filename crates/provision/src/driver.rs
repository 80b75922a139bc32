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

use crate::context::{AllocationContext, Conflict};
use crate::error::ProvisionError;
use crate::nic_select::NicSelection;
use crate::provisioner::Provisioner;

/// The allocation retry loop. Each iteration rebuilds the batch from
/// scratch: run the provisioners, queue any released or rewritten IPs,
/// resolve fabric membership, build the NIC, commit. A conflicted commit
/// records what it hit and goes around again; everything else ends the
/// loop.
///
/// There is no iteration cap. Termination comes from the bounded
/// identifier spaces underneath: an exhausted network search stops with
/// `subnet_full`/`pool_full`, an exhausted MAC search with `no_free_mac`,
/// and a commit that stops conflicting succeeds.
pub(crate) async fn nic_and_ip(
    ctx: &mut AllocationContext<'_>,
    provisioners: &mut [Provisioner],
    nic_fn: &mut NicSelection,
) -> Result<NicRecord, ProvisionError> {
    loop {
        match run_iteration(ctx, provisioners, nic_fn).await {
            Ok(nic) => {
                tracing::info!(mac = %nic.mac, ip = ?nic.ip_address, "allocation committed");
                return Ok(nic);
            }
            Err(err) if err.retryable() => {
                tracing::debug!(%err, "allocation lost a race, retrying");
                ctx.err = err.conflict().map(|(bucket, key)| Conflict {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
                refresh_side_records(ctx).await?;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn run_iteration(
    ctx: &mut AllocationContext<'_>,
    provisioners: &mut [Provisioner],
    nic_fn: &mut NicSelection,
) -> Result<NicRecord, ProvisionError> {
    ctx.reset();

    for provisioner in provisioners.iter_mut() {
        provisioner.provision(ctx).await?;
    }

    let frees: Vec<_> = ctx.remove_ips.iter().map(IpRecord::free_batch).collect();
    ctx.batch.extend(frees);
    let updates: Vec<_> = ctx.ip_updates.iter().map(IpRecord::batch).collect();
    ctx.batch.extend(updates);

    resolve_fabric(ctx).await?;

    let nic = nic_fn.build(ctx).await?;

    let batch = std::mem::take(&mut ctx.batch);
    ctx.store.commit(batch).await?;
    Ok(nic)
}

/// Collect the compute nodes on every fabric overlay this iteration's
/// IPs touch. One listing per distinct vnet, snapshot-consistent.
async fn resolve_fabric(ctx: &mut AllocationContext<'_>) -> Result<(), ProvisionError> {
    let vnets: BTreeSet<u32> = ctx
        .ips
        .iter()
        .filter(|provisioned| provisioned.network.fabric)
        .filter_map(|provisioned| provisioned.network.vnet_id)
        .collect();

    for vnet_id in vnets {
        let cns = ctx.fabric.vnet_cns(vnet_id).await?;
        ctx.vnet_cns.extend(cns);
    }
    Ok(())
}

/// After a conflict, reconcile the side records (released IPs and
/// reservation toggles) against what is now in the store. A released IP
/// that no longer belongs to this NIC is dropped: we detach without
/// freeing rather than yank an address someone else now holds.
async fn refresh_side_records(ctx: &mut AllocationContext<'_>) -> Result<(), ProvisionError> {
    let Some(conflict) = ctx.err.clone() else {
        return Ok(());
    };

    let mut kept = Vec::with_capacity(ctx.remove_ips.len());
    for ip in std::mem::take(&mut ctx.remove_ips) {
        if !conflict.matches(&ip.bucket(), &ip.key()) {
            kept.push(ip);
            continue;
        }
        match ctx.store.get(&ip.bucket(), &ip.key()).await {
            Ok(object) => {
                let fresh = IpRecord::from_object(&object)?;
                if fresh.belongs_to_uuid == Some(ctx.ownership.belongs_to_uuid) {
                    kept.push(fresh);
                } else {
                    tracing::info!(
                        address = %ip.address,
                        "IP reassigned concurrently, detaching without freeing"
                    );
                }
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(address = %ip.address, "released IP record vanished");
            }
            Err(err) => return Err(err.into()),
        }
    }
    ctx.remove_ips = kept;

    let mut kept = Vec::with_capacity(ctx.ip_updates.len());
    for ip in std::mem::take(&mut ctx.ip_updates) {
        if !conflict.matches(&ip.bucket(), &ip.key()) {
            kept.push(ip);
            continue;
        }
        match ctx.store.get(&ip.bucket(), &ip.key()).await {
            Ok(object) => {
                let mut fresh = IpRecord::from_object(&object)?;
                fresh.reserved = ip.reserved;
                kept.push(fresh);
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
    }
    ctx.ip_updates = kept;

    Ok(())
}
