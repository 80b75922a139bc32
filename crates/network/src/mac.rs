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

use mac_address::MacAddress;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::AddressError;

/// A 48-bit MAC address held in the low bits of a u64. The integer form is
/// the store key; the lowercase colon form is what callers see.
///
/// Accepted textual forms: colon-separated hex and an all-digit string
/// holding the integer value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Mac(u64);

impl Mac {
    pub const MAX: u64 = 0xffff_ffff_ffff;

    pub fn number(&self) -> u64 {
        self.0
    }

    pub fn bytes(&self) -> [u8; 6] {
        let b = self.0.to_be_bytes();
        [b[2], b[3], b[4], b[5], b[6], b[7]]
    }

    /// The 24-bit organizationally-unique prefix.
    pub fn oui(&self) -> MacOui {
        MacOui((self.0 >> 24) as u32)
    }

    /// The 24 device bits below the OUI.
    pub fn suffix(&self) -> u32 {
        (self.0 & 0xff_ffff) as u32
    }
}

impl TryFrom<u64> for Mac {
    type Error = AddressError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > Mac::MAX {
            return Err(AddressError::InvalidMac(value.to_string()));
        }
        Ok(Mac(value))
    }
}

impl From<MacAddress> for Mac {
    fn from(addr: MacAddress) -> Self {
        let b = addr.bytes();
        Mac(u64::from_be_bytes([
            0, 0, b[0], b[1], b[2], b[3], b[4], b[5],
        ]))
    }
}

impl From<Mac> for MacAddress {
    fn from(mac: Mac) -> Self {
        MacAddress::new(mac.bytes())
    }
}

impl FromStr for Mac {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.contains(':') || input.contains('-') {
            return MacAddress::from_str(input)
                .map(Mac::from)
                .map_err(|_| AddressError::InvalidMac(input.to_string()));
        }
        let value: u64 = input
            .parse()
            .map_err(|_| AddressError::InvalidMac(input.to_string()))?;
        Mac::try_from(value)
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = self.bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl Serialize for Mac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mac {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Mac::from_str(&s).map_err(D::Error::custom)
    }
}

/// The configured 24-bit OUI prefix. All MACs minted by the allocator fall
/// under one of these.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MacOui(u32);

impl MacOui {
    /// The largest device suffix under an OUI.
    pub const SUFFIX_MAX: u32 = 0xff_ffff;

    /// Compose a full MAC from this OUI and a 24-bit device suffix.
    pub fn mac(&self, suffix: u32) -> Mac {
        debug_assert!(suffix <= Self::SUFFIX_MAX);
        Mac((u64::from(self.0) << 24) | u64::from(suffix & Self::SUFFIX_MAX))
    }

    pub fn contains(&self, mac: &Mac) -> bool {
        mac.oui() == *self
    }
}

impl TryFrom<u32> for MacOui {
    type Error = AddressError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > 0xff_ffff {
            return Err(AddressError::InvalidOui(value.to_string()));
        }
        Ok(MacOui(value))
    }
}

impl FromStr for MacOui {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || AddressError::InvalidOui(input.to_string());
        let bytes: Vec<u8> = input
            .split(':')
            .map(|part| {
                if part.len() == 2 {
                    u8::from_str_radix(part, 16).map_err(|_| err())
                } else {
                    Err(err())
                }
            })
            .collect::<Result<_, _>>()?;
        let [a, b, c] = bytes.as_slice() else {
            return Err(err());
        };
        Ok(MacOui(
            (u32::from(*a) << 16) | (u32::from(*b) << 8) | u32::from(*c),
        ))
    }
}

impl fmt::Display for MacOui {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}",
            (self.0 >> 16) as u8,
            (self.0 >> 8) as u8,
            self.0 as u8
        )
    }
}

impl Serialize for MacOui {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacOui {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MacOui::from_str(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_forms() {
        let mac = Mac::from_str("90:b8:d0:00:00:01").unwrap();
        assert_eq!(mac.number(), 0x90b8_d000_0001);
        assert_eq!(mac.to_string(), "90:b8:d0:00:00:01");
        assert_eq!(Mac::from_str(&mac.number().to_string()).unwrap(), mac);
        assert!(Mac::from_str("90:b8:d0:00:00").is_err());
        assert!(Mac::from_str("281474976710656").is_err()); // 2^48
    }

    #[test]
    fn test_mac_address_interop() {
        let mac = Mac::from_str("90:b8:d0:ab:cd:ef").unwrap();
        let addr: MacAddress = mac.into();
        assert_eq!(addr.bytes(), [0x90, 0xb8, 0xd0, 0xab, 0xcd, 0xef]);
        assert_eq!(Mac::from(addr), mac);
    }

    #[test]
    fn test_oui() {
        let oui = MacOui::from_str("90:b8:d0").unwrap();
        assert_eq!(oui.to_string(), "90:b8:d0");

        let mac = oui.mac(0x000001);
        assert_eq!(mac.to_string(), "90:b8:d0:00:00:01");
        assert_eq!(mac.oui(), oui);
        assert_eq!(mac.suffix(), 1);
        assert!(oui.contains(&mac));
        assert!(!oui.contains(&Mac::from_str("00:53:00:00:00:01").unwrap()));

        assert!(MacOui::from_str("90:b8").is_err());
        assert!(MacOui::from_str("90:b8:zz").is_err());
    }

    #[test]
    fn test_oui_wraps_suffix() {
        let oui = MacOui::from_str("90:b8:d0").unwrap();
        assert_eq!(oui.mac(MacOui::SUFFIX_MAX).suffix(), MacOui::SUFFIX_MAX);
    }
}
