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

use ferrite_model::{BelongsToType, ModelError};
use ferrite_store::StoreError;
use ferrite_uuid::network::NetworkId;
use serde::Serialize;
use uuid::Uuid;

/// The failures an allocation can end with. Only store conflicts and
/// transient store errors send the driver around the loop again; every
/// other variant stops it. [`ProvisionError::retryable`] is the single
/// place that distinction is made.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("invalid parameters")]
    InvalidParams { errors: Vec<FieldError> },

    /// A caller-supplied identifier collides with an existing object.
    #[error("duplicate value supplied for {field}")]
    DuplicateParam { field: &'static str },

    /// A caller-named address is taken; retrying cannot help.
    #[error("IP supplied in \"{field}\" is in use")]
    IpInUse {
        field: &'static str,
        used_by: Option<(BelongsToType, Uuid)>,
    },

    #[error("no free IP addresses on network {network_uuid}")]
    SubnetFull { network_uuid: NetworkId },

    #[error("all networks in the pool supplied in \"{field}\" are full")]
    PoolFull { field: &'static str },

    #[error("no free MAC addresses within the configured OUI")]
    NoFreeMac,

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ProvisionError {
    /// Whether the allocation loop should run another iteration after
    /// seeing this error.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ProvisionError::Store(
                StoreError::VersionConflict { .. }
                    | StoreError::UniqueConflict { .. }
                    | StoreError::Transient(_)
            )
        )
    }

    /// The object a store conflict fired on, if any. This is what tells
    /// the provisioners which candidate identifier must be replaced.
    pub fn conflict(&self) -> Option<(&str, &str)> {
        match self {
            ProvisionError::Store(err) => err.conflict_target(),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::InvalidParams { .. } => "invalid_params",
            ProvisionError::DuplicateParam { .. } => "duplicate_param",
            ProvisionError::IpInUse { .. } => "ip_in_use",
            ProvisionError::SubnetFull { .. } => "subnet_full",
            ProvisionError::PoolFull { .. } => "pool_full",
            ProvisionError::NoFreeMac => "no_free_mac",
            ProvisionError::NotFound { .. } => "not_found",
            ProvisionError::Store(_) | ProvisionError::Model(_) => "internal",
        }
    }

    /// The HTTP-ready shape of this error. Conflicts never reach callers
    /// (the loop consumes them), so those serialize as plain internal
    /// errors should one escape through a non-allocation path.
    pub fn body(&self) -> ErrorBody {
        let errors = match self {
            ProvisionError::InvalidParams { errors } => errors.clone(),
            ProvisionError::DuplicateParam { field } => vec![FieldError {
                field: (*field).to_string(),
                code: "duplicate",
                message: "already exists".to_string(),
            }],
            ProvisionError::IpInUse { field, used_by } => {
                let message = match used_by {
                    Some((belongs_to_type, belongs_to_uuid)) => {
                        format!("IP in use by {belongs_to_type} {belongs_to_uuid}")
                    }
                    None => "IP in use".to_string(),
                };
                vec![FieldError {
                    field: (*field).to_string(),
                    code: "in_use",
                    message,
                }]
            }
            ProvisionError::PoolFull { field } => vec![FieldError {
                field: (*field).to_string(),
                code: "subnets_exhausted",
                message: "all networks in pool are full".to_string(),
            }],
            _ => Vec::new(),
        };

        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            errors,
        }
    }
}

/// One offending field of a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            code: "missing",
            message: "is required".to_string(),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            code: "invalid",
            message: message.into(),
        }
    }
}

/// The structured error returned to callers: a stable code plus the
/// offending fields, ready to serialize into an HTTP error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let conflict = ProvisionError::Store(StoreError::VersionConflict {
            bucket: "nics".to_string(),
            key: "1".to_string(),
        });
        assert!(conflict.retryable());
        assert_eq!(conflict.conflict(), Some(("nics", "1")));

        assert!(ProvisionError::Store(StoreError::Transient("flap".into())).retryable());
        assert!(!ProvisionError::NoFreeMac.retryable());
        assert!(!ProvisionError::PoolFull { field: "network_pool" }.retryable());
        assert!(
            !ProvisionError::SubnetFull {
                network_uuid: NetworkId::new()
            }
            .retryable()
        );
        assert!(!ProvisionError::Store(StoreError::Fatal("down".into())).retryable());
    }

    #[test]
    fn test_body_shape() {
        let err = ProvisionError::DuplicateParam { field: "mac" };
        let body = err.body();
        assert_eq!(body.code, "duplicate_param");
        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.errors[0].field, "mac");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "duplicate_param");
        assert_eq!(json["errors"][0]["code"], "duplicate");

        // No errors array for variants without fields.
        let json = serde_json::to_value(ProvisionError::NoFreeMac.body()).unwrap();
        assert!(json.get("errors").is_none());
    }
}
