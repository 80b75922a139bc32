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

use std::collections::VecDeque;

use ferrite_model::{IpRecord, LogicalNetwork, NetworkPool};
use ferrite_network::Ip;
use ferrite_store::ip_bucket;

use crate::context::{AllocationContext, ProvisionedIp};
use crate::error::ProvisionError;
use crate::scan::NetworkScan;

/// The three strategies for choosing an IP candidate. Each run appends
/// its candidate to the iteration's batch; on re-entry after a conflict,
/// the strategy decides whether its candidate survives or must be
/// replaced.
pub enum Provisioner {
    /// The caller named a specific address.
    Ip(IpProvision),
    /// The caller named a network; search it.
    Network(NetworkProvision),
    /// The caller named a pool; search its members in order.
    Pool(NetworkPoolProvision),
}

impl Provisioner {
    pub async fn provision(
        &mut self,
        ctx: &mut AllocationContext<'_>,
    ) -> Result<(), ProvisionError> {
        match self {
            Provisioner::Ip(p) => p.provision(ctx).await,
            Provisioner::Network(p) => p.provision(ctx).await,
            Provisioner::Pool(p) => p.provision(ctx).await,
        }
    }
}

/// Stamp ownership on the candidate and append it to the batch.
fn batch_ip(ctx: &mut AllocationContext<'_>, mut record: IpRecord, network: &LogicalNetwork) {
    record.assign(&ctx.ownership);
    if ctx.reserve_ip {
        record.reserved = true;
    }
    ctx.batch.push(record.batch());
    ctx.ips.push(ProvisionedIp {
        record,
        network: network.clone(),
    });
}

pub struct IpProvision {
    field: &'static str,
    ip: Ip,
    network: LogicalNetwork,
    record: Option<IpRecord>,
}

impl IpProvision {
    pub fn new(field: &'static str, ip: Ip, network: LogicalNetwork) -> Self {
        IpProvision {
            field,
            ip,
            network,
            record: None,
        }
    }

    fn in_use(&self, record: Option<&IpRecord>) -> ProvisionError {
        ProvisionError::IpInUse {
            field: self.field,
            used_by: record.and_then(|r| r.belongs_to_type.zip(r.belongs_to_uuid)),
        }
    }

    async fn provision(&mut self, ctx: &mut AllocationContext<'_>) -> Result<(), ProvisionError> {
        let bucket = ip_bucket(&self.network.uuid);
        let key = self.ip.to_string();

        // A conflict on the caller-named address means someone else bound
        // it between our read and our commit. No retry will change that.
        if ctx.conflicted(&bucket, &key) {
            let holder = match ctx.store.get(&bucket, &key).await {
                Ok(object) => IpRecord::from_object(&object).ok(),
                Err(_) => None,
            };
            return Err(self.in_use(holder.as_ref()));
        }

        if self.record.is_none() {
            let record = match ctx.store.get(&bucket, &key).await {
                Ok(object) => {
                    let record = IpRecord::from_object(&object)?;
                    if !record.free && !record.provisionable(&ctx.ownership.owner_uuid) {
                        return Err(self.in_use(Some(&record)));
                    }
                    record
                }
                Err(err) if err.is_not_found() => IpRecord::fresh(self.network.uuid, self.ip),
                Err(err) => return Err(err.into()),
            };
            self.record = Some(record);
        }

        let record = self.record.clone().expect("candidate set above");
        batch_ip(ctx, record, &self.network);
        Ok(())
    }
}

pub struct NetworkProvision {
    network: LogicalNetwork,
    scan: Option<NetworkScan>,
    record: Option<IpRecord>,
}

impl NetworkProvision {
    pub fn new(network: LogicalNetwork) -> Self {
        NetworkProvision {
            network,
            scan: None,
            record: None,
        }
    }

    async fn provision(&mut self, ctx: &mut AllocationContext<'_>) -> Result<(), ProvisionError> {
        let bucket = ip_bucket(&self.network.uuid);
        let keep = self
            .record
            .as_ref()
            .is_some_and(|record| !ctx.conflicted(&bucket, &record.key()));

        if !keep {
            if self.scan.is_none() {
                self.scan = Some(NetworkScan::new(self.network.clone(), &mut ctx.rng));
            }
            let scan = self.scan.as_mut().expect("scan initialized above");
            // SubnetFull propagates: with a single network there is no
            // fallback, so exhaustion stops the allocation.
            self.record = Some(scan.next_free(ctx.store).await?);
        }

        let record = self.record.clone().expect("candidate set above");
        batch_ip(ctx, record, &self.network);
        Ok(())
    }
}

pub struct NetworkPoolProvision {
    field: &'static str,
    queue: VecDeque<ferrite_uuid::network::NetworkId>,
    scan: Option<NetworkScan>,
    record: Option<IpRecord>,
}

impl NetworkPoolProvision {
    /// Members are tried in the stable order the pool object gives them.
    pub fn new(field: &'static str, pool: &NetworkPool) -> Self {
        NetworkPoolProvision {
            field,
            queue: pool.networks.iter().copied().collect(),
            scan: None,
            record: None,
        }
    }

    async fn provision(&mut self, ctx: &mut AllocationContext<'_>) -> Result<(), ProvisionError> {
        let keep = match (&self.record, &self.scan) {
            (Some(record), Some(scan)) => {
                !ctx.conflicted(&ip_bucket(&scan.network().uuid), &record.key())
            }
            _ => false,
        };

        if !keep {
            self.record = None;
            loop {
                if self.scan.is_none() {
                    let Some(next) = self.queue.pop_front() else {
                        return Err(ProvisionError::PoolFull { field: self.field });
                    };
                    let network = ctx.networks.network(&next).await?;
                    self.scan = Some(NetworkScan::new(network, &mut ctx.rng));
                }

                let scan = self.scan.as_mut().expect("scan initialized above");
                match scan.next_free(ctx.store).await {
                    Ok(record) => {
                        self.record = Some(record);
                        break;
                    }
                    Err(ProvisionError::SubnetFull { network_uuid }) => {
                        // This member is exhausted; fall through to the
                        // next one in the chain.
                        tracing::debug!(%network_uuid, "pool member subnet full, advancing");
                        self.scan = None;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        let record = self.record.clone().expect("candidate set above");
        let network = self
            .scan
            .as_ref()
            .expect("scan set alongside candidate")
            .network()
            .clone();
        batch_ip(ctx, record, &network);
        Ok(())
    }
}
