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

use ferrite_model::{IpOwnership, IpRecord, LogicalNetwork};
use ferrite_store::{BatchItem, ObjectStore};
use ferrite_uuid::compute_node::ComputeNodeId;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ProvisionConfig;
use crate::directory::NetworkDirectory;
use crate::fabric::FabricResolver;
use crate::params::NicBlueprint;

/// An IP candidate chosen this iteration, together with the network it
/// came from (needed for the NIC's linkage and for fabric resolution).
#[derive(Debug, Clone)]
pub struct ProvisionedIp {
    pub record: IpRecord,
    pub network: LogicalNetwork,
}

/// The object a failed commit conflicted on. Provisioners compare their
/// candidate's bucket/key against this to decide keep-or-replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub bucket: String,
    pub key: String,
}

impl Conflict {
    pub fn matches(&self, bucket: &str, key: &str) -> bool {
        self.bucket == bucket && self.key == key
    }
}

/// Everything one in-flight allocation carries. `batch`, `ips` and
/// `vnet_cns` are rebuilt from scratch every iteration; `err` holds the
/// previous iteration's conflict. The context belongs to exactly one
/// request and none of this state outlives it.
pub struct AllocationContext<'a> {
    pub store: &'a dyn ObjectStore,
    pub networks: &'a dyn NetworkDirectory,
    pub fabric: &'a dyn FabricResolver,
    pub config: &'a ProvisionConfig,
    pub rng: StdRng,

    /// Ownership stamped onto every IP this allocation binds.
    pub ownership: IpOwnership,
    /// The NIC-shaped parameters of the request.
    pub blueprint: NicBlueprint,
    /// Mark the bound IP as an explicit reservation.
    pub reserve_ip: bool,

    pub batch: Vec<BatchItem>,
    pub ips: Vec<ProvisionedIp>,
    pub err: Option<Conflict>,
    pub vnet_cns: BTreeSet<ComputeNodeId>,

    /// IPs released by this request (update path); emitted as free-batch
    /// items each iteration.
    pub remove_ips: Vec<IpRecord>,
    /// IP records rewritten as a side effect (reservation toggles).
    pub ip_updates: Vec<IpRecord>,
}

impl<'a> AllocationContext<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        networks: &'a dyn NetworkDirectory,
        fabric: &'a dyn FabricResolver,
        config: &'a ProvisionConfig,
        ownership: IpOwnership,
        blueprint: NicBlueprint,
    ) -> Self {
        Self::with_rng(
            store,
            networks,
            fabric,
            config,
            ownership,
            blueprint,
            StdRng::from_os_rng(),
        )
    }

    /// Tests inject a seeded generator here; everything randomized in the
    /// engine draws from this one.
    pub fn with_rng(
        store: &'a dyn ObjectStore,
        networks: &'a dyn NetworkDirectory,
        fabric: &'a dyn FabricResolver,
        config: &'a ProvisionConfig,
        ownership: IpOwnership,
        blueprint: NicBlueprint,
        rng: StdRng,
    ) -> Self {
        AllocationContext {
            store,
            networks,
            fabric,
            config,
            rng,
            ownership,
            blueprint,
            reserve_ip: false,
            batch: Vec::new(),
            ips: Vec::new(),
            err: None,
            vnet_cns: BTreeSet::new(),
            remove_ips: Vec::new(),
            ip_updates: Vec::new(),
        }
    }

    /// Start a fresh iteration. The previous conflict stays visible so
    /// provisioners can react to it.
    pub fn reset(&mut self) {
        self.batch.clear();
        self.ips.clear();
        self.vnet_cns.clear();
    }

    /// Did the previous iteration conflict on this object?
    pub fn conflicted(&self, bucket: &str, key: &str) -> bool {
        self.err
            .as_ref()
            .is_some_and(|conflict| conflict.matches(bucket, key))
    }
}
