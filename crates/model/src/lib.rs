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

//! The persistent data model: logical networks and pools (immutable
//! during allocation), per-address IP records, and per-MAC NIC records.
//! Records are only ever modified through conditional batch items; the
//! emitters here build those items but never touch the store themselves.

pub mod ip;
pub mod network;
pub mod nic;
pub mod ownership;

pub use ip::IpRecord;
pub use network::{LogicalNetwork, NetworkPool};
pub use nic::{Nic, NicRecord, NicState};
pub use ownership::{BelongsToType, IpOwnership};

use ferrite_uuid::network::NetworkId;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("network {uuid} is invalid: {reason}")]
    InvalidNetwork { uuid: NetworkId, reason: String },

    #[error("stored record in {bucket} failed to decode: {source}")]
    Decode {
        bucket: String,
        #[source]
        source: serde_json::Error,
    },
}
