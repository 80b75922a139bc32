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

use chrono::Utc;
use ferrite_model::{BelongsToType, IpOwnership, NicRecord, NicState};
use ferrite_network::{Ip, Mac};
use ferrite_uuid::compute_node::ComputeNodeId;
use ferrite_uuid::network::{NetworkId, NetworkPoolId};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{FieldError, ProvisionError};

fn default_true() -> bool {
    true
}

/// Validated parameters for provisioning a new NIC. At most one address
/// source may be named: a specific `ip` (with its network), a network to
/// search, or a pool to fall back across. None at all is fine too; the
/// result is a NIC with no bound address.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNic {
    pub owner_uuid: Uuid,
    pub belongs_to_uuid: Uuid,
    pub belongs_to_type: BelongsToType,
    #[serde(default)]
    pub mac: Option<Mac>,
    #[serde(default)]
    pub ip: Option<Ip>,
    #[serde(default)]
    pub network_uuid: Option<NetworkId>,
    #[serde(default)]
    pub network_pool: Option<NetworkPoolId>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub state: NicState,
    #[serde(default = "default_true")]
    pub check_owner: bool,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub nic_tag: Option<String>,
    #[serde(default)]
    pub nic_tags_provided: Option<Vec<String>>,
    #[serde(default)]
    pub allow_dhcp_spoofing: bool,
    #[serde(default)]
    pub allow_ip_spoofing: bool,
    #[serde(default)]
    pub allow_mac_spoofing: bool,
    #[serde(default)]
    pub allow_restricted_traffic: bool,
    #[serde(default)]
    pub allow_unfiltered_promisc: bool,
    #[serde(default)]
    pub cn_uuid: Option<ComputeNodeId>,
    #[serde(default)]
    pub underlay: bool,
    #[serde(default)]
    pub reserved: bool,
}

impl CreateNic {
    /// A minimal request: everything else at its default.
    pub fn new(owner_uuid: Uuid, belongs_to_uuid: Uuid, belongs_to_type: BelongsToType) -> Self {
        CreateNic {
            owner_uuid,
            belongs_to_uuid,
            belongs_to_type,
            mac: None,
            ip: None,
            network_uuid: None,
            network_pool: None,
            primary: false,
            state: NicState::default(),
            check_owner: true,
            model: None,
            nic_tag: None,
            nic_tags_provided: None,
            allow_dhcp_spoofing: false,
            allow_ip_spoofing: false,
            allow_mac_spoofing: false,
            allow_restricted_traffic: false,
            allow_unfiltered_promisc: false,
            cn_uuid: None,
            underlay: false,
            reserved: false,
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        let mut errors = Vec::new();

        if self.ip.is_some() && self.network_uuid.is_none() {
            errors.push(FieldError::missing("network_uuid"));
        }
        if self.network_uuid.is_some() && self.network_pool.is_some() {
            errors.push(FieldError::invalid(
                "network_pool",
                "cannot be combined with network_uuid",
            ));
        }
        if self.ip.is_some() && self.network_pool.is_some() {
            errors.push(FieldError::invalid(
                "ip",
                "cannot be combined with network_pool",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::InvalidParams { errors })
        }
    }

    pub fn ownership(&self) -> IpOwnership {
        IpOwnership {
            belongs_to_uuid: self.belongs_to_uuid,
            belongs_to_type: self.belongs_to_type,
            owner_uuid: self.owner_uuid,
        }
    }

    pub fn blueprint(&self) -> NicBlueprint {
        NicBlueprint {
            primary: self.primary,
            state: self.state,
            belongs_to_uuid: self.belongs_to_uuid,
            belongs_to_type: self.belongs_to_type,
            owner_uuid: self.owner_uuid,
            check_owner: self.check_owner,
            model: self.model.clone(),
            vlan_id: 0,
            nic_tag: self.nic_tag.clone(),
            nic_tags_provided: self.nic_tags_provided.clone(),
            allow_dhcp_spoofing: self.allow_dhcp_spoofing,
            allow_ip_spoofing: self.allow_ip_spoofing,
            allow_mac_spoofing: self.allow_mac_spoofing,
            allow_restricted_traffic: self.allow_restricted_traffic,
            allow_unfiltered_promisc: self.allow_unfiltered_promisc,
            cn_uuid: self.cn_uuid,
            underlay: self.underlay,
        }
    }
}

/// An update to an existing NIC: the target MAC plus whichever mutable
/// fields the caller wants changed. Unset fields keep their current
/// values; the network and IP default from the existing binding.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNic {
    pub mac: Mac,
    #[serde(default)]
    pub primary: Option<bool>,
    #[serde(default)]
    pub state: Option<NicState>,
    #[serde(default)]
    pub belongs_to_uuid: Option<Uuid>,
    #[serde(default)]
    pub belongs_to_type: Option<BelongsToType>,
    #[serde(default)]
    pub owner_uuid: Option<Uuid>,
    #[serde(default)]
    pub check_owner: Option<bool>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub vlan_id: Option<u16>,
    #[serde(default)]
    pub ip: Option<Ip>,
    #[serde(default)]
    pub network_uuid: Option<NetworkId>,
    #[serde(default)]
    pub nic_tag: Option<String>,
    #[serde(default)]
    pub nic_tags_provided: Option<Vec<String>>,
    #[serde(default)]
    pub allow_dhcp_spoofing: Option<bool>,
    #[serde(default)]
    pub allow_ip_spoofing: Option<bool>,
    #[serde(default)]
    pub allow_mac_spoofing: Option<bool>,
    #[serde(default)]
    pub allow_restricted_traffic: Option<bool>,
    #[serde(default)]
    pub allow_unfiltered_promisc: Option<bool>,
    #[serde(default)]
    pub cn_uuid: Option<ComputeNodeId>,
    #[serde(default)]
    pub underlay: Option<bool>,
    #[serde(default)]
    pub reserved: Option<bool>,
}

impl UpdateNic {
    /// An update that changes nothing.
    pub fn new(mac: Mac) -> Self {
        UpdateNic {
            mac,
            primary: None,
            state: None,
            belongs_to_uuid: None,
            belongs_to_type: None,
            owner_uuid: None,
            check_owner: None,
            model: None,
            vlan_id: None,
            ip: None,
            network_uuid: None,
            nic_tag: None,
            nic_tags_provided: None,
            allow_dhcp_spoofing: None,
            allow_ip_spoofing: None,
            allow_mac_spoofing: None,
            allow_restricted_traffic: None,
            allow_unfiltered_promisc: None,
            cn_uuid: None,
            underlay: None,
            reserved: None,
        }
    }
}

/// The NIC-shaped parameters an allocation carries: everything a NIC
/// record holds except the identifiers the engine itself picks (MAC, IP,
/// network linkage). The same blueprint serves creates (stamped onto a
/// fresh record) and updates (applied over the existing one).
#[derive(Debug, Clone)]
pub struct NicBlueprint {
    pub primary: bool,
    pub state: NicState,
    pub belongs_to_uuid: Uuid,
    pub belongs_to_type: BelongsToType,
    pub owner_uuid: Uuid,
    pub check_owner: bool,
    pub model: Option<String>,
    pub vlan_id: u16,
    pub nic_tag: Option<String>,
    pub nic_tags_provided: Option<Vec<String>>,
    pub allow_dhcp_spoofing: bool,
    pub allow_ip_spoofing: bool,
    pub allow_mac_spoofing: bool,
    pub allow_restricted_traffic: bool,
    pub allow_unfiltered_promisc: bool,
    pub cn_uuid: Option<ComputeNodeId>,
    pub underlay: bool,
}

impl NicBlueprint {
    /// The merged view of an existing NIC with an update applied on top.
    pub fn merged(existing: &NicRecord, update: &UpdateNic) -> Self {
        NicBlueprint {
            primary: update.primary.unwrap_or(existing.primary),
            state: update.state.unwrap_or(existing.state),
            belongs_to_uuid: update.belongs_to_uuid.unwrap_or(existing.belongs_to_uuid),
            belongs_to_type: update.belongs_to_type.unwrap_or(existing.belongs_to_type),
            owner_uuid: update.owner_uuid.unwrap_or(existing.owner_uuid),
            check_owner: update.check_owner.unwrap_or(existing.check_owner),
            model: update.model.clone().or_else(|| existing.model.clone()),
            vlan_id: update.vlan_id.unwrap_or(existing.vlan_id),
            nic_tag: update.nic_tag.clone().or_else(|| existing.nic_tag.clone()),
            nic_tags_provided: update
                .nic_tags_provided
                .clone()
                .or_else(|| existing.nic_tags_provided.clone()),
            allow_dhcp_spoofing: update
                .allow_dhcp_spoofing
                .unwrap_or(existing.allow_dhcp_spoofing),
            allow_ip_spoofing: update.allow_ip_spoofing.unwrap_or(existing.allow_ip_spoofing),
            allow_mac_spoofing: update
                .allow_mac_spoofing
                .unwrap_or(existing.allow_mac_spoofing),
            allow_restricted_traffic: update
                .allow_restricted_traffic
                .unwrap_or(existing.allow_restricted_traffic),
            allow_unfiltered_promisc: update
                .allow_unfiltered_promisc
                .unwrap_or(existing.allow_unfiltered_promisc),
            cn_uuid: update.cn_uuid.or(existing.cn_uuid),
            underlay: update.underlay.unwrap_or(existing.underlay),
        }
    }

    pub fn ownership(&self) -> IpOwnership {
        IpOwnership {
            belongs_to_uuid: self.belongs_to_uuid,
            belongs_to_type: self.belongs_to_type,
            owner_uuid: self.owner_uuid,
        }
    }

    /// A fresh record for `mac` with no address bound yet.
    pub fn record(&self, mac: Mac) -> NicRecord {
        let now = Utc::now();
        let mut record = NicRecord {
            mac,
            primary: false,
            state: NicState::default(),
            belongs_to_uuid: self.belongs_to_uuid,
            belongs_to_type: self.belongs_to_type,
            owner_uuid: self.owner_uuid,
            check_owner: true,
            model: None,
            vlan_id: 0,
            nic_tag: None,
            nic_tags_provided: None,
            allow_dhcp_spoofing: false,
            allow_ip_spoofing: false,
            allow_mac_spoofing: false,
            allow_restricted_traffic: false,
            allow_unfiltered_promisc: false,
            cn_uuid: None,
            underlay: false,
            ip_address: None,
            network_uuid: None,
            vnet_id: None,
            created_at: now,
            modified_at: now,
            version: None,
        };
        self.apply_to(&mut record);
        record
    }

    /// Stamp these parameters onto `record`, leaving its identifiers and
    /// address linkage alone.
    pub fn apply_to(&self, record: &mut NicRecord) {
        record.primary = self.primary;
        record.state = self.state;
        record.belongs_to_uuid = self.belongs_to_uuid;
        record.belongs_to_type = self.belongs_to_type;
        record.owner_uuid = self.owner_uuid;
        record.check_owner = self.check_owner;
        record.model = self.model.clone();
        record.vlan_id = self.vlan_id;
        record.nic_tag = self.nic_tag.clone();
        record.nic_tags_provided = self.nic_tags_provided.clone();
        record.allow_dhcp_spoofing = self.allow_dhcp_spoofing;
        record.allow_ip_spoofing = self.allow_ip_spoofing;
        record.allow_mac_spoofing = self.allow_mac_spoofing;
        record.allow_restricted_traffic = self.allow_restricted_traffic;
        record.allow_unfiltered_promisc = self.allow_unfiltered_promisc;
        record.cn_uuid = self.cn_uuid;
        record.underlay = self.underlay;
        record.modified_at = Utc::now();
    }
}
