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
use ferrite_model::NicRecord;
use ferrite_network::MacOui;
use ferrite_store::{BatchItem, ListFilter, NIC_BUCKET};
use rand::Rng;

use crate::context::AllocationContext;
use crate::error::ProvisionError;

/// How the iteration's NIC record gets its MAC: the caller supplied one,
/// the engine generates one under the configured OUI, or (updates) the
/// existing NIC keeps its own. Whichever way, the selection appends the
/// NIC put (and any primary-unset puts it implies) to the batch.
pub enum NicSelection {
    MacSupplied(ferrite_network::Mac),
    RandomMac(RandomMacState),
    Existing(NicRecord),
}

/// Candidate state for generated MACs. The first draw is uniform over
/// the 24-bit suffix space; each collision advances by one, wrapping (and
/// re-randomizing) at the OUI boundary, up to the configured retry cap.
#[derive(Debug, Default)]
pub struct RandomMacState {
    suffix: Option<u32>,
    attempts: u32,
}

impl RandomMacState {
    fn next_mac(
        &mut self,
        ctx: &mut AllocationContext<'_>,
    ) -> Result<ferrite_network::Mac, ProvisionError> {
        let oui = ctx.config.mac_oui;

        let suffix = match self.suffix {
            None => ctx.rng.random_range(0..=MacOui::SUFFIX_MAX),
            Some(current) => {
                let key = oui.mac(current).number().to_string();
                if !ctx.conflicted(NIC_BUCKET, &key) {
                    current
                } else {
                    self.attempts += 1;
                    if self.attempts > ctx.config.mac_retries {
                        return Err(ProvisionError::NoFreeMac);
                    }
                    if current == MacOui::SUFFIX_MAX {
                        ctx.rng.random_range(0..=MacOui::SUFFIX_MAX)
                    } else {
                        current + 1
                    }
                }
            }
        };
        self.suffix = Some(suffix);
        Ok(oui.mac(suffix))
    }
}

impl NicSelection {
    pub fn random() -> Self {
        NicSelection::RandomMac(RandomMacState::default())
    }

    pub async fn build(
        &mut self,
        ctx: &mut AllocationContext<'_>,
    ) -> Result<NicRecord, ProvisionError> {
        let mut record = match self {
            NicSelection::MacSupplied(mac) => {
                // A conflict on the NIC key means the caller-supplied MAC
                // already exists; no retry will change that.
                if ctx.conflicted(NIC_BUCKET, &mac.number().to_string()) {
                    return Err(ProvisionError::DuplicateParam { field: "mac" });
                }
                ctx.blueprint.record(*mac)
            }
            NicSelection::RandomMac(state) => {
                let mac = state.next_mac(ctx)?;
                ctx.blueprint.record(mac)
            }
            NicSelection::Existing(nic) => {
                // A conflict here means the NIC moved under us; pick up
                // the current version and re-apply the update.
                if ctx.conflicted(NIC_BUCKET, &nic.key()) {
                    let object =
                        ctx.store
                            .get(NIC_BUCKET, &nic.key())
                            .await
                            .map_err(|err| {
                                if err.is_not_found() {
                                    ProvisionError::NotFound {
                                        kind: "nic",
                                        id: nic.mac.to_string(),
                                    }
                                } else {
                                    ProvisionError::from(err)
                                }
                            })?;
                    *nic = NicRecord::from_object(&object)?;
                }
                let mut record = nic.clone();
                ctx.blueprint.apply_to(&mut record);
                record
            }
        };

        if let Some(provisioned) = ctx.ips.first() {
            record.bind_ip(&provisioned.record, &provisioned.network);
        }

        if record.primary {
            let unsets = primary_unset_items(ctx, &record).await?;
            ctx.batch.extend(unsets);
        }

        ctx.batch.push(record.batch());
        Ok(record)
    }
}

/// Conditional puts clearing `primary` on every other primary NIC of the
/// same owner. They ride in the same atomic commit, so the owner never
/// observes two primaries.
async fn primary_unset_items(
    ctx: &AllocationContext<'_>,
    record: &NicRecord,
) -> Result<Vec<BatchItem>, ProvisionError> {
    let filter = ListFilter::new()
        .eq("owner_uuid", record.owner_uuid.to_string())
        .eq("primary", true);
    let peers = ctx.store.list(NIC_BUCKET, &filter).await?;

    let mut items = Vec::new();
    for object in &peers {
        let mut peer = NicRecord::from_object(object)?;
        if peer.mac == record.mac {
            continue;
        }
        tracing::debug!(mac = %peer.mac, "handing primary over from peer NIC");
        peer.primary = false;
        peer.modified_at = Utc::now();
        items.push(peer.batch());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use ferrite_model::BelongsToType;
    use ferrite_network::Mac;
    use ferrite_store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    use super::*;
    use crate::config::ProvisionConfig;
    use crate::context::Conflict;
    use crate::directory::StaticDirectory;
    use crate::fabric::StoreFabricResolver;
    use crate::params::CreateNic;

    fn conflict_on(mac: Mac) -> Conflict {
        Conflict {
            bucket: NIC_BUCKET.to_string(),
            key: mac.number().to_string(),
        }
    }

    #[tokio::test]
    async fn test_random_mac_keeps_advances_and_gives_up() {
        let store = MemoryStore::new();
        let networks = StaticDirectory::new();
        let resolver = StoreFabricResolver::new(&store);
        let config = ProvisionConfig {
            mac_oui: "90:b8:d0".parse().unwrap(),
            mac_retries: 2,
        };
        let params = CreateNic::new(Uuid::new_v4(), Uuid::new_v4(), BelongsToType::Zone);
        let mut ctx = AllocationContext::with_rng(
            &store,
            &networks,
            &resolver,
            &config,
            params.ownership(),
            params.blueprint(),
            StdRng::seed_from_u64(7),
        );

        let mut selection = NicSelection::random();
        let first = selection.build(&mut ctx).await.unwrap();
        assert_eq!(first.mac.oui(), config.mac_oui);
        ctx.batch.clear();

        // No conflict recorded: the candidate survives the iteration.
        let kept = selection.build(&mut ctx).await.unwrap();
        assert_eq!(kept.mac, first.mac);
        ctx.batch.clear();

        // A NIC-bucket conflict advances the suffix by one.
        ctx.err = Some(conflict_on(first.mac));
        let second = selection.build(&mut ctx).await.unwrap();
        assert_ne!(second.mac, first.mac);
        assert_eq!(second.mac.oui(), config.mac_oui);
        if first.mac.suffix() < ferrite_network::MacOui::SUFFIX_MAX {
            assert_eq!(second.mac.suffix(), first.mac.suffix() + 1);
        }
        ctx.batch.clear();

        // Two replacements were budgeted; the third conflict gives up.
        ctx.err = Some(conflict_on(second.mac));
        let third = selection.build(&mut ctx).await.unwrap();
        ctx.batch.clear();
        ctx.err = Some(conflict_on(third.mac));
        let err = selection.build(&mut ctx).await.unwrap_err();
        assert!(matches!(err, ProvisionError::NoFreeMac));
    }

    #[tokio::test]
    async fn test_supplied_mac_conflict_stops_as_duplicate() {
        let store = MemoryStore::new();
        let networks = StaticDirectory::new();
        let resolver = StoreFabricResolver::new(&store);
        let config = ProvisionConfig::new("90:b8:d0".parse().unwrap());
        let params = CreateNic::new(Uuid::new_v4(), Uuid::new_v4(), BelongsToType::Zone);
        let mut ctx = AllocationContext::with_rng(
            &store,
            &networks,
            &resolver,
            &config,
            params.ownership(),
            params.blueprint(),
            StdRng::seed_from_u64(7),
        );

        let mac: Mac = "90:b8:d0:00:00:01".parse().unwrap();
        let mut selection = NicSelection::MacSupplied(mac);

        let built = selection.build(&mut ctx).await.unwrap();
        assert_eq!(built.mac, mac);
        ctx.batch.clear();

        ctx.err = Some(conflict_on(mac));
        let err = selection.build(&mut ctx).await.unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::DuplicateParam { field: "mac" }
        ));
    }
}
