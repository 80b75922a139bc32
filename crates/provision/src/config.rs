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

use ferrite_network::MacOui;
use serde::Deserialize;

fn default_mac_retries() -> u32 {
    64
}

/// Engine configuration, loaded from the service's TOML config file.
///
/// ```toml
/// mac_oui = "90:b8:d0"
/// mac_retries = 64
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    /// The 24-bit OUI every generated MAC falls under.
    pub mac_oui: MacOui,
    /// How many MAC candidates a single allocation may burn through
    /// before giving up with `no_free_mac`.
    #[serde(default = "default_mac_retries")]
    pub mac_retries: u32,
}

impl ProvisionConfig {
    pub fn new(mac_oui: MacOui) -> Self {
        ProvisionConfig {
            mac_oui,
            mac_retries: default_mac_retries(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let config = ProvisionConfig::from_toml("mac_oui = \"90:b8:d0\"").unwrap();
        assert_eq!(config.mac_oui.to_string(), "90:b8:d0");
        assert_eq!(config.mac_retries, 64);

        let config =
            ProvisionConfig::from_toml("mac_oui = \"00:53:00\"\nmac_retries = 8").unwrap();
        assert_eq!(config.mac_retries, 8);

        assert!(ProvisionConfig::from_toml("mac_retries = 8").is_err());
        assert!(ProvisionConfig::from_toml("mac_oui = \"bogus\"").is_err());
    }
}
