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

//! The store contract the allocation engine runs against: versioned
//! objects in named buckets, conditional (version-tagged) writes, and an
//! atomic multi-object commit. All cross-request coordination happens
//! through these conditional writes; nothing here holds locks for callers.

mod batch;
mod bucket;
mod error;
mod filter;
mod memory;

pub use batch::{BatchItem, BatchOp, Version, VersionedObject};
pub use bucket::{NIC_BUCKET, ip_bucket};
pub use error::StoreError;
pub use filter::ListFilter;
pub use memory::MemoryStore;

/// The narrow surface the engine needs from the object store.
///
/// `commit` is the only write path: the batch either applies in full or
/// not at all, and a put/delete carrying an expected version fails with
/// [`StoreError::VersionConflict`] when some other writer got there first.
/// A put with no expected version is insert-only and fails with
/// [`StoreError::UniqueConflict`] if the key exists. Those two failures
/// are the signals the allocation retry loop is built on.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> Result<VersionedObject, StoreError>;

    async fn commit(&self, batch: Vec<BatchItem>) -> Result<(), StoreError>;

    /// Enumerate a bucket's objects matching `filter`. Used off the
    /// retry-critical path only (fabric membership, primary sweeps).
    async fn list(
        &self,
        bucket: &str,
        filter: &ListFilter,
    ) -> Result<Vec<VersionedObject>, StoreError>;
}
