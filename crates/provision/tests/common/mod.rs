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
#![allow(dead_code)]

use std::str::FromStr;

use ferrite_model::{BelongsToType, LogicalNetwork};
use ferrite_network::{AddressFamily, Ip, Mac};
use ferrite_provision::{CreateNic, ProvisionConfig};
use ferrite_uuid::network::NetworkId;
use ipnet::IpNet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use uuid::Uuid;

pub const OUI: &str = "90:b8:d0";

/// Wire up test logging once; repeated calls are fine.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

pub fn config() -> ProvisionConfig {
    ProvisionConfig::new(OUI.parse().expect("fixture OUI parses"))
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn mac(s: &str) -> Mac {
    Mac::from_str(s).expect("fixture MAC parses")
}

pub fn ip(s: &str) -> Ip {
    Ip::from_str(s).expect("fixture IP parses")
}

/// A v4 network with the given provision range.
pub fn network(subnet: &str, start: &str, end: &str) -> LogicalNetwork {
    let net = LogicalNetwork {
        uuid: NetworkId::new(),
        family: AddressFamily::Ipv4,
        subnet: IpNet::from_str(subnet).expect("fixture subnet parses"),
        gateway: Some(ip(&gateway_of(subnet))),
        vlan_id: 0,
        nic_tag: "external".to_string(),
        resolvers: vec![ip("8.8.8.8")],
        mtu: 1500,
        fabric: false,
        vnet_id: None,
        provision_start: ip(start),
        provision_end: ip(end),
    };
    net.validate().expect("fixture network is valid");
    net
}

fn gateway_of(subnet: &str) -> String {
    let base = subnet.split('/').next().expect("subnet has a base address");
    let ip = Ip::from_str(base).expect("subnet base parses");
    ip.checked_add(1).expect("gateway fits").to_string()
}

/// A fabric overlay network on the given vnet.
pub fn fabric_network(subnet: &str, start: &str, end: &str, vnet_id: u32) -> LogicalNetwork {
    let mut net = network(subnet, start, end);
    net.fabric = true;
    net.vnet_id = Some(vnet_id);
    net.validate().expect("fixture fabric network is valid");
    net
}

/// Minimal create parameters for a zone NIC.
pub fn create_params(owner: Uuid, belongs_to: Uuid) -> CreateNic {
    CreateNic::new(owner, belongs_to, BelongsToType::Zone)
}

pub fn on_network(owner: Uuid, belongs_to: Uuid, network: &LogicalNetwork) -> CreateNic {
    let mut params = create_params(owner, belongs_to);
    params.network_uuid = Some(network.uuid);
    params
}
