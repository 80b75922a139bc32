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

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::address_family::{AddressFamily, IdentifyAddressFamily};
use crate::AddressError;

/// A unified IPv4/IPv6 address. Equality, hashing and ordering all go
/// through the canonical 16-byte representation (IPv4 addresses compare as
/// their v4-mapped IPv6 form), so an address parsed from any accepted form
/// is interchangeable with any other spelling of the same address.
///
/// Accepted textual forms: dotted IPv4, canonical IPv6, and an all-digit
/// string holding the numeric value of an IPv4 address. Records written by
/// older services may carry the address as `{"octets": [a, b, c, d]}`; that
/// form is re-coerced on deserialization.
#[derive(Clone, Copy, Debug)]
pub struct Ip(IpAddr);

impl Ip {
    pub fn new(addr: IpAddr) -> Self {
        // Store v4-mapped v6 addresses in their v4 form so that Display and
        // the address family reflect what the address actually is.
        match addr {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => Ip(IpAddr::V4(v4)),
                None => Ip(addr),
            },
            IpAddr::V4(_) => Ip(addr),
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.0
    }

    /// The canonical 16-byte form used as the equality key everywhere.
    pub fn key(&self) -> Ipv6Addr {
        match self.0 {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        }
    }

    /// Advance by `offset` addresses. Returns None if the result would
    /// leave the family's address space.
    pub fn checked_add(&self, offset: u128) -> Option<Ip> {
        match self.0 {
            IpAddr::V4(v4) => {
                let offset = u32::try_from(offset).ok()?;
                let bits = v4.to_bits().checked_add(offset)?;
                Some(Ip(IpAddr::V4(Ipv4Addr::from_bits(bits))))
            }
            IpAddr::V6(v6) => {
                let bits = v6.to_bits().checked_add(offset)?;
                Some(Ip(IpAddr::V6(Ipv6Addr::from_bits(bits))))
            }
        }
    }

    /// Step back by `offset` addresses. Returns None on wrap below zero.
    pub fn checked_sub(&self, offset: u128) -> Option<Ip> {
        match self.0 {
            IpAddr::V4(v4) => {
                let offset = u32::try_from(offset).ok()?;
                let bits = v4.to_bits().checked_sub(offset)?;
                Some(Ip(IpAddr::V4(Ipv4Addr::from_bits(bits))))
            }
            IpAddr::V6(v6) => {
                let bits = v6.to_bits().checked_sub(offset)?;
                Some(Ip(IpAddr::V6(Ipv6Addr::from_bits(bits))))
            }
        }
    }

    /// How many addresses lie between `earlier` and this one, inclusive of
    /// neither end. None if `earlier` is the larger address or the families
    /// differ.
    pub fn offset_from(&self, earlier: &Ip) -> Option<u128> {
        match (self.0, earlier.0) {
            (IpAddr::V4(a), IpAddr::V4(b)) => {
                (a >= b).then(|| u128::from(a.to_bits() - b.to_bits()))
            }
            (IpAddr::V6(a), IpAddr::V6(b)) => (a >= b).then(|| a.to_bits() - b.to_bits()),
            _ => None,
        }
    }
}

impl IdentifyAddressFamily for Ip {
    fn address_family(&self) -> AddressFamily {
        self.0.address_family()
    }
}

impl From<IpAddr> for Ip {
    fn from(addr: IpAddr) -> Self {
        Ip::new(addr)
    }
}

impl From<Ipv4Addr> for Ip {
    fn from(addr: Ipv4Addr) -> Self {
        Ip(IpAddr::V4(addr))
    }
}

impl From<Ipv6Addr> for Ip {
    fn from(addr: Ipv6Addr) -> Self {
        Ip::new(IpAddr::V6(addr))
    }
}

impl From<Ip> for IpAddr {
    fn from(ip: Ip) -> Self {
        ip.0
    }
}

impl FromStr for Ip {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            // Integer form: the numeric value of an IPv4 address.
            let value: u32 = input
                .parse()
                .map_err(|_| AddressError::InvalidAddress(input.to_string()))?;
            return Ok(Ip(IpAddr::V4(Ipv4Addr::from_bits(value))));
        }

        IpAddr::from_str(input)
            .map(Ip::new)
            .map_err(|_| AddressError::InvalidAddress(input.to_string()))
    }
}

impl fmt::Display for Ip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for Ip {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ip {}

impl Hash for Ip {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl PartialOrd for Ip {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ip {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Serialize for Ip {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The wire forms we accept when reading a record back: the usual string
/// form, or the legacy object form with raw IPv4 octets.
#[derive(Deserialize)]
#[serde(untagged)]
enum IpRepr {
    Text(String),
    Legacy { octets: [u8; 4] },
}

impl<'de> Deserialize<'de> for Ip {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IpRepr::deserialize(deserializer)? {
            IpRepr::Text(s) => Ip::from_str(&s).map_err(D::Error::custom),
            IpRepr::Legacy { octets } => Ok(Ip(IpAddr::V4(Ipv4Addr::from(octets)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ip {
        Ip::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(ip("10.0.0.10").addr(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 10)));
        assert_eq!(ip("167772170"), ip("10.0.0.10"));
        assert_eq!(
            ip("fd00::1").addr(),
            IpAddr::V6(Ipv6Addr::from_str("fd00::1").unwrap())
        );
        assert!(Ip::from_str("10.0.0").is_err());
        assert!(Ip::from_str("not-an-ip").is_err());
        assert!(Ip::from_str("").is_err());
        // Larger than any IPv4 integer value.
        assert!(Ip::from_str("4294967296").is_err());
    }

    #[test]
    fn test_mapped_v4_equality() {
        // A v4-mapped v6 spelling is the same address.
        assert_eq!(ip("::ffff:10.0.0.10"), ip("10.0.0.10"));
        assert_eq!(ip("::ffff:10.0.0.10").to_string(), "10.0.0.10");
    }

    #[test]
    fn test_ordering() {
        assert!(ip("10.0.0.10") < ip("10.0.0.11"));
        // All v4 addresses sort below non-mapped v6 space.
        assert!(ip("255.255.255.255") < ip("fd00::1"));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(ip("10.0.0.10").checked_add(2), Some(ip("10.0.0.12")));
        assert_eq!(ip("10.0.0.10").checked_sub(10), Some(ip("10.0.0.0")));
        assert_eq!(ip("255.255.255.255").checked_add(1), None);
        assert_eq!(ip("0.0.0.0").checked_sub(1), None);
        assert_eq!(
            ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff").checked_add(1),
            None
        );
    }

    #[test]
    fn test_offset_from() {
        assert_eq!(ip("10.0.0.12").offset_from(&ip("10.0.0.10")), Some(2));
        assert_eq!(ip("10.0.0.10").offset_from(&ip("10.0.0.12")), None);
        assert_eq!(ip("fd00::1").offset_from(&ip("10.0.0.1")), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let a = ip("10.0.0.10");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"10.0.0.10\"");
        assert_eq!(serde_json::from_str::<Ip>(&json).unwrap(), a);
    }

    #[test]
    fn test_legacy_octets_coercion() {
        let legacy: Ip = serde_json::from_str(r#"{"octets": [10, 0, 0, 10]}"#).unwrap();
        assert_eq!(legacy, ip("10.0.0.10"));
    }
}
