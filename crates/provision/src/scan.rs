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

use ferrite_model::{IpRecord, LogicalNetwork};
use ferrite_store::{ObjectStore, ip_bucket};
use rand::Rng;
use rand::rngs::StdRng;

use crate::error::ProvisionError;

/// The next-free-address search over one network's provision range.
///
/// The first call probes from a random offset so that concurrent
/// allocators spread across the range instead of piling onto the same
/// key; subsequent calls advance by one with wrap-around. An address is a
/// candidate if it has no record yet or its record is marked free;
/// everything else (bound, reserved, or merely unassigned) is skipped.
/// One full wrap without a candidate ends the search for good.
pub struct NetworkScan {
    network: LogicalNetwork,
    start_offset: u128,
    probed: u128,
}

impl NetworkScan {
    pub fn new(network: LogicalNetwork, rng: &mut StdRng) -> Self {
        let size = network.range_size();
        let start_offset = if size == 0 {
            0
        } else {
            rng.random_range(0..size)
        };
        NetworkScan {
            network,
            start_offset,
            probed: 0,
        }
    }

    pub fn network(&self) -> &LogicalNetwork {
        &self.network
    }

    pub async fn next_free(
        &mut self,
        store: &dyn ObjectStore,
    ) -> Result<IpRecord, ProvisionError> {
        let size = self.network.range_size();
        let bucket = ip_bucket(&self.network.uuid);

        while self.probed < size {
            let offset = (self.start_offset + self.probed) % size;
            self.probed += 1;

            let Some(address) = self.network.ip_at(offset) else {
                continue;
            };

            match store.get(&bucket, &address.to_string()).await {
                Ok(object) => {
                    let record = IpRecord::from_object(&object)?;
                    if record.free {
                        tracing::trace!(%address, network = %self.network.uuid, "reusing freed address");
                        return Ok(record);
                    }
                    // Present and not free: bound, reserved, or held.
                }
                Err(err) if err.is_not_found() => {
                    tracing::trace!(%address, network = %self.network.uuid, "found unused address");
                    return Ok(IpRecord::fresh(self.network.uuid, address));
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ProvisionError::SubnetFull {
            network_uuid: self.network.uuid,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ferrite_model::{BelongsToType, IpOwnership};
    use ferrite_network::{AddressFamily, Ip};
    use ferrite_store::MemoryStore;
    use ferrite_uuid::network::NetworkId;
    use ipnet::IpNet;
    use rand::SeedableRng;
    use uuid::Uuid;

    use super::*;

    fn network() -> LogicalNetwork {
        LogicalNetwork {
            uuid: NetworkId::new(),
            family: AddressFamily::Ipv4,
            subnet: IpNet::from_str("10.0.0.0/24").unwrap(),
            gateway: None,
            vlan_id: 0,
            nic_tag: "external".to_string(),
            resolvers: vec![],
            mtu: 1500,
            fabric: false,
            vnet_id: None,
            provision_start: Ip::from_str("10.0.0.10").unwrap(),
            provision_end: Ip::from_str("10.0.0.12").unwrap(),
        }
    }

    async fn occupy(store: &MemoryStore, network: &LogicalNetwork, address: &str) {
        let mut record =
            IpRecord::fresh(network.uuid, Ip::from_str(address).unwrap());
        record.assign(&IpOwnership {
            belongs_to_uuid: Uuid::new_v4(),
            belongs_to_type: BelongsToType::Zone,
            owner_uuid: Uuid::new_v4(),
        });
        store.commit(vec![record.batch()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_scan_covers_whole_range() {
        let store = MemoryStore::new();
        let net = network();
        let mut rng = StdRng::seed_from_u64(7);
        let mut scan = NetworkScan::new(net.clone(), &mut rng);

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..3 {
            let record = scan.next_free(&store).await.unwrap();
            assert!(net.in_provision_range(&record.address));
            assert!(seen.insert(record.address));
        }

        let err = scan.next_free(&store).await.unwrap_err();
        assert!(matches!(err, ProvisionError::SubnetFull { network_uuid } if network_uuid == net.uuid));
    }

    #[tokio::test]
    async fn test_scan_skips_bound_addresses() {
        let store = MemoryStore::new();
        let net = network();
        occupy(&store, &net, "10.0.0.10").await;
        occupy(&store, &net, "10.0.0.12").await;

        let mut rng = StdRng::seed_from_u64(7);
        let mut scan = NetworkScan::new(net.clone(), &mut rng);
        let record = scan.next_free(&store).await.unwrap();
        assert_eq!(record.address, Ip::from_str("10.0.0.11").unwrap());

        let err = scan.next_free(&store).await.unwrap_err();
        assert!(matches!(err, ProvisionError::SubnetFull { .. }));
    }

    #[tokio::test]
    async fn test_scan_reuses_freed_records() {
        let store = MemoryStore::new();
        let net = network();
        for address in ["10.0.0.10", "10.0.0.11", "10.0.0.12"] {
            occupy(&store, &net, address).await;
        }

        // Free the middle one the way a delete would.
        let object = store
            .get(&ip_bucket(&net.uuid), "10.0.0.11")
            .await
            .unwrap();
        let record = IpRecord::from_object(&object).unwrap();
        store.commit(vec![record.free_batch()]).await.unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let mut scan = NetworkScan::new(net, &mut rng);
        let record = scan.next_free(&store).await.unwrap();
        assert_eq!(record.address, Ip::from_str("10.0.0.11").unwrap());
        // The freed record exists in the store, so binding it must be a
        // conditional write, not an insert.
        assert!(record.version.is_some());
        assert!(record.free);
    }

    #[tokio::test]
    async fn test_scan_start_is_seed_deterministic() {
        let store = MemoryStore::new();
        let net = network();

        let first = {
            let mut rng = StdRng::seed_from_u64(42);
            NetworkScan::new(net.clone(), &mut rng)
                .next_free(&store)
                .await
                .unwrap()
        };
        let second = {
            let mut rng = StdRng::seed_from_u64(42);
            NetworkScan::new(net.clone(), &mut rng)
                .next_free(&store)
                .await
                .unwrap()
        };
        assert_eq!(first.address, second.address);
    }
}
