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

use chrono::{DateTime, Utc};
use ferrite_network::Ip;
use ferrite_store::{BatchItem, Version, VersionedObject, ip_bucket};
use ferrite_uuid::network::NetworkId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ModelError;
use crate::ownership::{BelongsToType, IpOwnership};

/// One bound (or reserved) address in a per-network bucket. Exists from
/// the moment an address is first bound or reserved; afterwards it is only
/// rewritten through conditional batch items, never in place.
///
/// A record with `free: true` is reclaimable by the next-free search. A
/// record that merely has no owner (for example after a NIC delete) is
/// skipped by the search but can still be bound by a caller naming it
/// explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IpRecord {
    pub address: Ip,
    pub network_uuid: NetworkId,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_type: Option<BelongsToType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uuid: Option<Uuid>,
    #[serde(default)]
    pub free: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Store version of the object this record was read from; None for a
    /// record that does not exist in the store yet.
    #[serde(skip)]
    pub version: Option<Version>,
}

impl IpRecord {
    /// A record for an address that has never been stored.
    pub fn fresh(network_uuid: NetworkId, address: Ip) -> Self {
        let now = Utc::now();
        IpRecord {
            address,
            network_uuid,
            reserved: false,
            belongs_to_uuid: None,
            belongs_to_type: None,
            owner_uuid: None,
            free: false,
            created_at: now,
            modified_at: now,
            version: None,
        }
    }

    /// Decode a stored object, attaching its version tag.
    pub fn from_object(object: &VersionedObject) -> Result<Self, ModelError> {
        let mut record: IpRecord = object.decode().map_err(|source| ModelError::Decode {
            bucket: "ips".to_string(),
            source,
        })?;
        record.version = Some(object.version);
        Ok(record)
    }

    /// The key of this record in its per-network bucket.
    pub fn key(&self) -> String {
        self.address.to_string()
    }

    pub fn bucket(&self) -> String {
        ip_bucket(&self.network_uuid)
    }

    /// Whether `owner` may bind this address: not reserved, and either
    /// unowned or already owned by `owner`.
    pub fn provisionable(&self, owner: &Uuid) -> bool {
        !self.reserved && (self.owner_uuid.is_none() || self.owner_uuid.as_ref() == Some(owner))
    }

    /// Stamp the ownership triple onto this record, taking it out of the
    /// free pool.
    pub fn assign(&mut self, ownership: &IpOwnership) {
        self.belongs_to_uuid = Some(ownership.belongs_to_uuid);
        self.belongs_to_type = Some(ownership.belongs_to_type);
        self.owner_uuid = Some(ownership.owner_uuid);
        self.free = false;
        self.modified_at = Utc::now();
    }

    /// Conditional put of the record as-is. Insert-only when the record
    /// has never been stored.
    pub fn batch(&self) -> BatchItem {
        let value = serde_json::to_value(self).expect("IP record serializes");
        BatchItem::put(self.bucket(), self.key(), value, self.version)
    }

    /// Conditional put clearing the binding while retaining the record.
    /// Reservations survive (and keep their owner); everything else
    /// becomes bindable again by an explicit request.
    pub fn unassign_batch(&self) -> BatchItem {
        let mut unbound = self.clone();
        unbound.belongs_to_uuid = None;
        unbound.belongs_to_type = None;
        if !unbound.reserved {
            unbound.owner_uuid = None;
        }
        unbound.modified_at = Utc::now();
        let value = serde_json::to_value(&unbound).expect("IP record serializes");
        BatchItem::put(self.bucket(), self.key(), value, self.version)
    }

    /// Conditional put returning the address to the free pool, making it
    /// visible to the next-free search again.
    pub fn free_batch(&self) -> BatchItem {
        let mut freed = self.clone();
        freed.belongs_to_uuid = None;
        freed.belongs_to_type = None;
        freed.owner_uuid = None;
        freed.reserved = false;
        freed.free = true;
        freed.modified_at = Utc::now();
        let value = serde_json::to_value(&freed).expect("IP record serializes");
        BatchItem::put(self.bucket(), self.key(), value, self.version)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ferrite_store::BatchOp;

    use super::*;

    fn record() -> IpRecord {
        IpRecord::fresh(NetworkId::new(), Ip::from_str("10.0.0.10").unwrap())
    }

    #[test]
    fn test_provisionable() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut ip = record();
        assert!(ip.provisionable(&owner));

        ip.owner_uuid = Some(owner);
        assert!(ip.provisionable(&owner));
        assert!(!ip.provisionable(&other));

        ip.owner_uuid = None;
        ip.reserved = true;
        assert!(!ip.provisionable(&owner));
    }

    #[test]
    fn test_fresh_record_batches_as_insert() {
        let ip = record();
        let item = ip.batch();
        assert_eq!(item.key, "10.0.0.10");
        assert!(matches!(item.op, BatchOp::Put { expect: None, .. }));
    }

    #[test]
    fn test_unassign_keeps_reservation() {
        let owner = Uuid::new_v4();
        let mut ip = record();
        ip.reserved = true;
        ip.owner_uuid = Some(owner);
        ip.belongs_to_uuid = Some(Uuid::new_v4());
        ip.belongs_to_type = Some(BelongsToType::Zone);
        ip.version = Some(Version(3));

        let item = ip.unassign_batch();
        let BatchOp::Put { value, expect } = item.op else {
            panic!("expected put");
        };
        assert_eq!(expect, Some(Version(3)));
        let unbound: IpRecord = serde_json::from_value(value).unwrap();
        assert!(unbound.reserved);
        assert_eq!(unbound.owner_uuid, Some(owner));
        assert_eq!(unbound.belongs_to_uuid, None);
        assert!(!unbound.free);
    }

    #[test]
    fn test_free_clears_everything() {
        let mut ip = record();
        ip.assign(&IpOwnership {
            belongs_to_uuid: Uuid::new_v4(),
            belongs_to_type: BelongsToType::Zone,
            owner_uuid: Uuid::new_v4(),
        });
        ip.version = Some(Version(1));

        let BatchOp::Put { value, .. } = ip.free_batch().op else {
            panic!("expected put");
        };
        let freed: IpRecord = serde_json::from_value(value).unwrap();
        assert!(freed.free);
        assert_eq!(freed.owner_uuid, None);
        assert_eq!(freed.belongs_to_uuid, None);
        assert!(!freed.reserved);
    }
}
