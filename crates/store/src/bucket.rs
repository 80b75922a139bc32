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

use ferrite_uuid::network::NetworkId;

/// The single global NIC bucket, keyed by the MAC integer as a decimal
/// string.
pub const NIC_BUCKET: &str = "nics";

/// Per-network IP bucket, keyed by the canonical address string. The name
/// is a pure function of the network UUID so every component addresses the
/// same bucket without coordination.
pub fn ip_bucket(network: &NetworkId) -> String {
    format!("ips_{}", network.simple())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_ip_bucket_name_is_deterministic() {
        let id = NetworkId::from_str("91609f10-c91d-470d-a260-6293ea0c1200").unwrap();
        let reparsed = NetworkId::from_str("91609F10-C91D-470D-A260-6293EA0C1200").unwrap();
        assert_eq!(ip_bucket(&id), "ips_91609f10c91d470da2606293ea0c1200");
        assert_eq!(ip_bucket(&id), ip_bucket(&reparsed));
    }
}
