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

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of object a NIC (or its IP) is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BelongsToType {
    Zone,
    Server,
    Other,
}

impl fmt::Display for BelongsToType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BelongsToType::Zone => "zone",
            BelongsToType::Server => "server",
            BelongsToType::Other => "other",
        };
        f.write_str(s)
    }
}

/// The ownership triple stamped onto every IP record an allocation binds.
/// This is the "base params" the driver carries: whatever IP a provisioner
/// picks, these fields end up on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpOwnership {
    pub belongs_to_uuid: Uuid,
    pub belongs_to_type: BelongsToType,
    pub owner_uuid: Uuid,
}
