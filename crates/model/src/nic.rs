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

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use ferrite_network::{Ip, Mac};
use ferrite_store::{BatchItem, NIC_BUCKET, Version, VersionedObject};
use ferrite_uuid::compute_node::ComputeNodeId;
use ferrite_uuid::network::NetworkId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ModelError;
use crate::ip::IpRecord;
use crate::network::LogicalNetwork;
use crate::ownership::BelongsToType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NicState {
    #[default]
    Provisioning,
    Running,
    Stopped,
}

fn default_true() -> bool {
    true
}

/// One NIC per MAC, in the single global bucket. The MAC integer is the
/// key, so MAC uniqueness falls out of the store's insert-only puts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NicRecord {
    pub mac: Mac,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub state: NicState,
    pub belongs_to_uuid: Uuid,
    pub belongs_to_type: BelongsToType,
    pub owner_uuid: Uuid,
    #[serde(default = "default_true")]
    pub check_owner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub vlan_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cn_uuid: Option<ComputeNodeId>,
    #[serde(default)]
    pub underlay: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Ip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_uuid: Option<NetworkId>,
    /// Overlay segment of the bound network, denormalized here so that
    /// fabric membership is a single filtered scan of this bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: Option<Version>,
}

impl NicRecord {
    pub fn from_object(object: &VersionedObject) -> Result<Self, ModelError> {
        let mut record: NicRecord = object.decode().map_err(|source| ModelError::Decode {
            bucket: NIC_BUCKET.to_string(),
            source,
        })?;
        record.version = Some(object.version);
        Ok(record)
    }

    /// The key of this record in the NIC bucket.
    pub fn key(&self) -> String {
        self.mac.number().to_string()
    }

    /// Bind `record`'s address to this NIC, taking the network attributes
    /// that ride along with an IP binding.
    pub fn bind_ip(&mut self, record: &IpRecord, network: &LogicalNetwork) {
        self.ip_address = Some(record.address);
        self.network_uuid = Some(network.uuid);
        self.vlan_id = network.vlan_id;
        self.nic_tag = Some(network.nic_tag.clone());
        self.vnet_id = network.fabric.then_some(network.vnet_id).flatten();
        self.modified_at = Utc::now();
    }

    /// Conditional put of the record as-is; insert-only for a NIC that
    /// has never been stored.
    pub fn batch(&self) -> BatchItem {
        let value = serde_json::to_value(self).expect("NIC record serializes");
        BatchItem::put(NIC_BUCKET, self.key(), value, self.version)
    }

    pub fn delete_batch(&self) -> BatchItem {
        BatchItem::delete(NIC_BUCKET, self.key(), self.version)
    }

    /// The caller-facing serialization, with the network attributes
    /// resolved. `network` must be the NIC's bound network when one is
    /// set.
    pub fn view(&self, network: Option<&LogicalNetwork>) -> Nic {
        Nic {
            mac: self.mac.to_string(),
            primary: self.primary,
            owner_uuid: self.owner_uuid,
            belongs_to_uuid: self.belongs_to_uuid,
            belongs_to_type: self.belongs_to_type,
            ip: self.ip_address,
            netmask: network.and_then(LogicalNetwork::netmask),
            prefix_length: network
                .filter(|n| n.netmask().is_none())
                .map(LogicalNetwork::prefix_len),
            vlan_id: self.vlan_id,
            nic_tag: self.nic_tag.clone(),
            mtu: network.map(|n| n.mtu),
            gateway: network.and_then(|n| n.gateway),
            resolvers: network.map(|n| n.resolvers.clone()).unwrap_or_default(),
            allow_dhcp_spoofing: self.allow_dhcp_spoofing,
            allow_ip_spoofing: self.allow_ip_spoofing,
            allow_mac_spoofing: self.allow_mac_spoofing,
            allow_restricted_traffic: self.allow_restricted_traffic,
            allow_unfiltered_promisc: self.allow_unfiltered_promisc,
            state: self.state,
            cn_uuid: self.cn_uuid,
            underlay: self.underlay,
            fabric: network.map(|n| n.fabric),
            vnet_id: self.vnet_id,
            network_uuid: self.network_uuid,
        }
    }
}

/// The NIC as returned to callers: colon-form MAC, the bound address with
/// its netmask (v4) or prefix length (v6), and the network attributes a
/// consumer needs to plumb the interface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nic {
    pub mac: String,
    pub primary: bool,
    pub owner_uuid: Uuid,
    pub belongs_to_uuid: Uuid,
    pub belongs_to_type: BelongsToType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<Ip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netmask: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
    pub vlan_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nic_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ip>,
    #[serde(default)]
    pub resolvers: Vec<Ip>,
    pub allow_dhcp_spoofing: bool,
    pub allow_ip_spoofing: bool,
    pub allow_mac_spoofing: bool,
    pub allow_restricted_traffic: bool,
    pub allow_unfiltered_promisc: bool,
    pub state: NicState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cn_uuid: Option<ComputeNodeId>,
    pub underlay: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_uuid: Option<NetworkId>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use ferrite_network::AddressFamily;
    use ipnet::IpNet;

    use super::*;

    fn network(fabric: bool) -> LogicalNetwork {
        LogicalNetwork {
            uuid: NetworkId::new(),
            family: AddressFamily::Ipv4,
            subnet: IpNet::from_str("10.0.0.0/24").unwrap(),
            gateway: Some(Ip::from_str("10.0.0.1").unwrap()),
            vlan_id: 40,
            nic_tag: "external".to_string(),
            resolvers: vec![Ip::from_str("8.8.8.8").unwrap()],
            mtu: 1500,
            fabric,
            vnet_id: fabric.then_some(77),
            provision_start: Ip::from_str("10.0.0.10").unwrap(),
            provision_end: Ip::from_str("10.0.0.250").unwrap(),
        }
    }

    fn nic() -> NicRecord {
        let now = Utc::now();
        NicRecord {
            mac: Mac::from_str("90:b8:d0:00:00:01").unwrap(),
            primary: false,
            state: NicState::Running,
            belongs_to_uuid: Uuid::new_v4(),
            belongs_to_type: BelongsToType::Zone,
            owner_uuid: Uuid::new_v4(),
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
        }
    }

    #[test]
    fn test_key_is_mac_integer() {
        assert_eq!(nic().key(), 0x90b8_d000_0001_u64.to_string());
    }

    #[test]
    fn test_bind_ip_takes_network_attributes() {
        let net = network(true);
        let record = IpRecord::fresh(net.uuid, Ip::from_str("10.0.0.10").unwrap());

        let mut nic = nic();
        nic.bind_ip(&record, &net);
        assert_eq!(nic.ip_address, Some(record.address));
        assert_eq!(nic.network_uuid, Some(net.uuid));
        assert_eq!(nic.vlan_id, 40);
        assert_eq!(nic.nic_tag.as_deref(), Some("external"));
        assert_eq!(nic.vnet_id, Some(77));
    }

    #[test]
    fn test_view_v4() {
        let net = network(false);
        let record = IpRecord::fresh(net.uuid, Ip::from_str("10.0.0.10").unwrap());
        let mut nic = nic();
        nic.bind_ip(&record, &net);

        let view = nic.view(Some(&net));
        assert_eq!(view.mac, "90:b8:d0:00:00:01");
        assert_eq!(view.netmask, Some(Ipv4Addr::new(255, 255, 255, 0)));
        assert_eq!(view.prefix_length, None);
        assert_eq!(view.gateway, Some(Ip::from_str("10.0.0.1").unwrap()));
        assert_eq!(view.resolvers.len(), 1);
        assert_eq!(view.fabric, Some(false));
    }

    #[test]
    fn test_view_v6_uses_prefix_length() {
        let net = LogicalNetwork {
            family: AddressFamily::Ipv6,
            subnet: IpNet::from_str("fd00::/64").unwrap(),
            gateway: None,
            provision_start: Ip::from_str("fd00::10").unwrap(),
            provision_end: Ip::from_str("fd00::ff").unwrap(),
            ..network(false)
        };
        let record = IpRecord::fresh(net.uuid, Ip::from_str("fd00::10").unwrap());
        let mut nic = nic();
        nic.bind_ip(&record, &net);

        let view = nic.view(Some(&net));
        assert_eq!(view.netmask, None);
        assert_eq!(view.prefix_length, Some(64));
    }

    #[test]
    fn test_record_round_trips_through_store_payload() {
        let mut nic = nic();
        nic.bind_ip(
            &IpRecord::fresh(NetworkId::new(), Ip::from_str("10.0.0.10").unwrap()),
            &network(false),
        );
        let BatchItem { op, .. } = nic.batch();
        let ferrite_store::BatchOp::Put { value, expect } = op else {
            panic!("expected put");
        };
        assert_eq!(expect, None);
        let decoded: NicRecord = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, nic);
    }
}
