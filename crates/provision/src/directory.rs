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

use std::collections::HashMap;

use ferrite_model::{LogicalNetwork, NetworkPool};
use ferrite_uuid::network::{NetworkId, NetworkPoolId};

use crate::error::ProvisionError;

/// Where the engine resolves network and pool UUIDs. Networks are
/// configured objects owned by the surrounding service and immutable for
/// the duration of an allocation; this trait is the whole contract the
/// engine has with them.
#[async_trait::async_trait]
pub trait NetworkDirectory: Send + Sync {
    async fn network(&self, id: &NetworkId) -> Result<LogicalNetwork, ProvisionError>;

    async fn pool(&self, id: &NetworkPoolId) -> Result<NetworkPool, ProvisionError>;
}

/// A fixed set of networks and pools, handed to the engine up front.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    networks: HashMap<NetworkId, LogicalNetwork>,
    pools: HashMap<NetworkPoolId, NetworkPool>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, network: LogicalNetwork) -> Self {
        self.networks.insert(network.uuid, network);
        self
    }

    pub fn with_pool(mut self, pool: NetworkPool) -> Self {
        self.pools.insert(pool.uuid, pool);
        self
    }
}

#[async_trait::async_trait]
impl NetworkDirectory for StaticDirectory {
    async fn network(&self, id: &NetworkId) -> Result<LogicalNetwork, ProvisionError> {
        self.networks
            .get(id)
            .cloned()
            .ok_or_else(|| ProvisionError::NotFound {
                kind: "network",
                id: id.to_string(),
            })
    }

    async fn pool(&self, id: &NetworkPoolId) -> Result<NetworkPool, ProvisionError> {
        self.pools
            .get(id)
            .cloned()
            .ok_or_else(|| ProvisionError::NotFound {
                kind: "network pool",
                id: id.to_string(),
            })
    }
}
