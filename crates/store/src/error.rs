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

/// The failure taxonomy of the store. `VersionConflict` and
/// `UniqueConflict` carry the object they fired on; the allocation loop
/// uses that to decide which candidate identifier must be replaced.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("version conflict on {bucket}/{key}")]
    VersionConflict { bucket: String, key: String },

    #[error("unique constraint violated on {bucket}/{key}")]
    UniqueConflict { bucket: String, key: String },

    #[error("{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("transient store error: {0}")]
    Transient(String),

    #[error("fatal store error: {0}")]
    Fatal(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// The conflicted object, when this error names one.
    pub fn conflict_target(&self) -> Option<(&str, &str)> {
        match self {
            StoreError::VersionConflict { bucket, key }
            | StoreError::UniqueConflict { bucket, key } => Some((bucket, key)),
            _ => None,
        }
    }
}
