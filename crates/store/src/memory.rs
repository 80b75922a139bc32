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

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::Mutex;

use crate::batch::{BatchItem, BatchOp, Version, VersionedObject};
use crate::error::StoreError;
use crate::filter::ListFilter;
use crate::ObjectStore;

/// The in-memory implementation of [`ObjectStore`]. One mutex over all
/// buckets gives every commit the same linearizability the real store
/// provides per batch; concurrent allocators racing on this type exercise
/// the same conflict paths they would against production storage.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    buckets: HashMap<String, BTreeMap<String, Stored>>,
    next_version: u64,
    fail_next: VecDeque<StoreError>,
}

struct Stored {
    value: Value,
    version: Version,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by the next `commit` call, without
    /// applying the batch. Tests use this to exercise the transient-error
    /// retry path.
    pub async fn fail_next_commit(&self, err: StoreError) {
        self.inner.lock().await.fail_next.push_back(err);
    }

    /// Number of objects currently stored in `bucket`.
    pub async fn bucket_len(&self, bucket: &str) -> usize {
        self.inner
            .lock()
            .await
            .buckets
            .get(bucket)
            .map_or(0, BTreeMap::len)
    }
}

impl Inner {
    fn check(&self, item: &BatchItem) -> Result<(), StoreError> {
        let stored = self
            .buckets
            .get(&item.bucket)
            .and_then(|bucket| bucket.get(&item.key));

        let expect = match &item.op {
            BatchOp::Put { expect, .. } => expect,
            BatchOp::Delete { expect } => expect,
        };

        match (expect, stored) {
            // Insert-only put colliding with an existing key.
            (None, Some(_)) if matches!(item.op, BatchOp::Put { .. }) => {
                Err(StoreError::UniqueConflict {
                    bucket: item.bucket.clone(),
                    key: item.key.clone(),
                })
            }
            (Some(v), Some(stored)) if stored.version != *v => Err(StoreError::VersionConflict {
                bucket: item.bucket.clone(),
                key: item.key.clone(),
            }),
            // A conditional write against an object that has since been
            // removed is a version conflict as well.
            (Some(_), None) => Err(StoreError::VersionConflict {
                bucket: item.bucket.clone(),
                key: item.key.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn apply(&mut self, item: BatchItem) {
        match item.op {
            BatchOp::Put { value, .. } => {
                self.next_version += 1;
                let version = Version(self.next_version);
                self.buckets
                    .entry(item.bucket)
                    .or_default()
                    .insert(item.key, Stored { value, version });
            }
            BatchOp::Delete { .. } => {
                if let Some(bucket) = self.buckets.get_mut(&item.bucket) {
                    bucket.remove(&item.key);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<VersionedObject, StoreError> {
        let inner = self.inner.lock().await;
        inner
            .buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|stored| VersionedObject {
                value: stored.value.clone(),
                version: stored.version,
            })
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn commit(&self, batch: Vec<BatchItem>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        if let Some(err) = inner.fail_next.pop_front() {
            return Err(err);
        }

        // Validate the whole batch before touching anything, so a failed
        // commit leaves no partial state behind.
        for item in &batch {
            inner.check(item)?;
        }
        for item in batch {
            inner.apply(item);
        }
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        filter: &ListFilter,
    ) -> Result<Vec<VersionedObject>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .buckets
            .get(bucket)
            .map(|bucket| {
                bucket
                    .values()
                    .filter(|stored| filter.matches(&stored.value))
                    .map(|stored| VersionedObject {
                        value: stored.value.clone(),
                        version: stored.version,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
