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

//! The allocation engine. A request enters with validated parameters; the
//! engine picks candidate identifiers (an IP from the requested network or
//! pool, a MAC under the configured OUI), assembles a single conditional
//! batch, and commits it. Losing a race surfaces as a version or unique
//! conflict, which sends the loop around with fresh candidates; parameter
//! problems stop it immediately. Nothing is written outside the batch, so
//! an abandoned request leaves no partial state.

pub mod config;
pub mod context;
pub mod create;
pub mod delete;
pub mod directory;
pub mod error;
pub mod fabric;
pub mod nic_select;
pub mod params;
pub mod provisioner;
pub mod scan;
pub mod update;

mod driver;

pub use config::ProvisionConfig;
pub use context::AllocationContext;
pub use create::{AllocatedNic, get_nic, provision_nic, provision_nic_with_rng};
pub use delete::{DeletedNic, delete_nic};
pub use directory::{NetworkDirectory, StaticDirectory};
pub use error::{ErrorBody, FieldError, ProvisionError};
pub use fabric::{FabricResolver, StoreFabricResolver};
pub use params::{CreateNic, UpdateNic};
pub use update::{update_nic, update_nic_with_rng};
