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

pub mod ip;
pub mod mac;

pub use ip::address_family::{AddressFamily, IdentifyAddressFamily};
pub use ip::addr::Ip;
pub use mac::{Mac, MacOui};

/// AddressError enumerates the parse failures of the codec. Every malformed
/// input maps to one of these, regardless of which textual form was used.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
    #[error("invalid MAC OUI: {0}")]
    InvalidOui(String),
}
