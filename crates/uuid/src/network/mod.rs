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

/// NetworkId is a strongly typed UUID identifying a logical network, with
/// trait implementations allowing it to be passed around as a plain UUID,
/// parsed from request parameters, bound into store bucket names, etc.
/// The same shape is used for all of the object IDs in this workspace.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialOrd, Ord, Eq, PartialEq, Hash, Default,
)]
#[repr(transparent)]
pub struct NetworkId(pub uuid::Uuid);

impl NetworkId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The UUID without hyphens, as used in per-network bucket names.
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NetworkId> for uuid::Uuid {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl From<uuid::Uuid> for NetworkId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for NetworkId {
    type Err = UuidConversionError;
    fn from_str(input: &str) -> Result<Self, UuidConversionError> {
        Ok(Self(uuid::Uuid::parse_str(input).map_err(|_| {
            UuidConversionError::InvalidUuid {
                ty: "NetworkId",
                value: input.to_string(),
            }
        })?))
    }
}

/// NetworkPoolId identifies an ordered collection of logical networks used
/// as a fallback chain during allocation.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialOrd, Ord, Eq, PartialEq, Hash, Default,
)]
#[repr(transparent)]
pub struct NetworkPoolId(pub uuid::Uuid);

impl NetworkPoolId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for NetworkPoolId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NetworkPoolId> for uuid::Uuid {
    fn from(id: NetworkPoolId) -> Self {
        id.0
    }
}

impl From<uuid::Uuid> for NetworkPoolId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for NetworkPoolId {
    type Err = UuidConversionError;
    fn from_str(input: &str) -> Result<Self, UuidConversionError> {
        Ok(Self(uuid::Uuid::parse_str(input).map_err(|_| {
            UuidConversionError::InvalidUuid {
                ty: "NetworkPoolId",
                value: input.to_string(),
            }
        })?))
    }
}

#[test]
fn test_network_id_serialization() {
    // Make sure NetworkId serializes as a simple UUID.
    let id = uuid::Uuid::new_v4();
    let network_id = NetworkId::from(id);

    let uuid_json = serde_json::to_string(&id).unwrap();
    let nid_json = serde_json::to_string(&network_id).unwrap();

    assert_eq!(uuid_json, nid_json);
}
