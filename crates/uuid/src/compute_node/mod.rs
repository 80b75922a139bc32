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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UuidConversionError;

/// ComputeNodeId identifies the server hosting a NIC. Fabric NICs on the
/// same overlay are grouped by collecting the distinct compute node IDs
/// sharing a vnet.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialOrd, Ord, Eq, PartialEq, Hash, Default,
)]
#[repr(transparent)]
pub struct ComputeNodeId(pub uuid::Uuid);

impl ComputeNodeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ComputeNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ComputeNodeId> for uuid::Uuid {
    fn from(id: ComputeNodeId) -> Self {
        id.0
    }
}

impl From<uuid::Uuid> for ComputeNodeId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for ComputeNodeId {
    type Err = UuidConversionError;
    fn from_str(input: &str) -> Result<Self, UuidConversionError> {
        Ok(Self(uuid::Uuid::parse_str(input).map_err(|_| {
            UuidConversionError::InvalidUuid {
                ty: "ComputeNodeId",
                value: input.to_string(),
            }
        })?))
    }
}
