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

use ferrite_network::{AddressFamily, IdentifyAddressFamily, Ip};
use ferrite_uuid::network::{NetworkId, NetworkPoolId};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::ModelError;

fn default_mtu() -> u32 {
    1500
}

/// A configured logical network. Immutable for the duration of an
/// allocation; lookups go through whatever directory the surrounding
/// service provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalNetwork {
    pub uuid: NetworkId,
    pub family: AddressFamily,
    pub subnet: IpNet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ip>,
    pub vlan_id: u16,
    pub nic_tag: String,
    #[serde(default)]
    pub resolvers: Vec<Ip>,
    #[serde(default = "default_mtu")]
    pub mtu: u32,
    #[serde(default)]
    pub fabric: bool,
    /// Overlay segment ID. Present iff `fabric` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_id: Option<u32>,
    /// First address handed out by the next-free search.
    pub provision_start: Ip,
    /// Last address handed out by the next-free search.
    pub provision_end: Ip,
}

impl LogicalNetwork {
    pub fn validate(&self) -> Result<(), ModelError> {
        let fail = |reason: &str| ModelError::InvalidNetwork {
            uuid: self.uuid,
            reason: reason.to_string(),
        };

        if !self.subnet.is_address_family(self.family) {
            return Err(fail("subnet does not match the address family"));
        }
        for ip in [&self.provision_start, &self.provision_end] {
            if !ip.is_address_family(self.family) {
                return Err(fail("provision range does not match the address family"));
            }
            if !self.subnet.contains(&ip.addr()) {
                return Err(fail("provision range lies outside the subnet"));
            }
        }
        if self.provision_start > self.provision_end {
            return Err(fail("provision range start is past its end"));
        }
        if self.fabric != self.vnet_id.is_some() {
            return Err(fail("vnet_id must be present exactly on fabric networks"));
        }
        Ok(())
    }

    /// Number of addresses in the provision range.
    pub fn range_size(&self) -> u128 {
        self.provision_end
            .offset_from(&self.provision_start)
            .map_or(0, |span| span + 1)
    }

    /// The address `offset` slots into the provision range, if any.
    pub fn ip_at(&self, offset: u128) -> Option<Ip> {
        self.provision_start
            .checked_add(offset)
            .filter(|ip| *ip <= self.provision_end)
    }

    pub fn in_provision_range(&self, ip: &Ip) -> bool {
        *ip >= self.provision_start && *ip <= self.provision_end
    }

    pub fn contains(&self, ip: &Ip) -> bool {
        self.subnet.contains(&ip.addr())
    }

    /// The dotted netmask for v4 networks; v6 callers use `prefix_len`.
    pub fn netmask(&self) -> Option<Ipv4Addr> {
        match self.subnet {
            IpNet::V4(net) => Some(net.netmask()),
            IpNet::V6(_) => None,
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.subnet.prefix_len()
    }
}

/// An ordered collection of logical networks used as a fallback chain:
/// when one member's subnet is exhausted, allocation moves to the next.
/// Member order is stable and meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkPool {
    pub uuid: NetworkPoolId,
    pub name: String,
    pub networks: Vec<NetworkId>,
    pub nic_tag: String,
}
