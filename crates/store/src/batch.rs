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

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque per-object version tag. Writers echo the version they read;
/// the store rejects the write if the object has moved on since.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct Version(pub u64);

/// An object as read from a bucket: the JSON payload plus the version tag
/// to use for conditional writes against it.
#[derive(Debug, Clone)]
pub struct VersionedObject {
    pub value: Value,
    pub version: Version,
}

impl VersionedObject {
    /// Decode the payload into a typed record.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.value.clone())
    }
}

/// One entry of an atomic commit batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub bucket: String,
    pub key: String,
    pub op: BatchOp,
}

#[derive(Debug, Clone)]
pub enum BatchOp {
    /// Write the value. `expect: None` means the key must not exist yet;
    /// `expect: Some(v)` means the stored object must still be at `v`.
    Put {
        value: Value,
        expect: Option<Version>,
    },
    /// Remove the key. `expect` works as for `Put`, except `None` makes
    /// the delete unconditional.
    Delete { expect: Option<Version> },
}

impl BatchItem {
    pub fn put(
        bucket: impl Into<String>,
        key: impl Into<String>,
        value: Value,
        expect: Option<Version>,
    ) -> Self {
        BatchItem {
            bucket: bucket.into(),
            key: key.into(),
            op: BatchOp::Put { value, expect },
        }
    }

    pub fn delete(
        bucket: impl Into<String>,
        key: impl Into<String>,
        expect: Option<Version>,
    ) -> Self {
        BatchItem {
            bucket: bucket.into(),
            key: key.into(),
            op: BatchOp::Delete { expect },
        }
    }

    /// Whether this item addresses the given object.
    pub fn touches(&self, bucket: &str, key: &str) -> bool {
        self.bucket == bucket && self.key == key
    }
}
