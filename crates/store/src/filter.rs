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

use serde_json::Value;

/// A conjunction of conditions over the top-level fields of stored
/// objects. This is all the query power `list` offers; anything richer
/// belongs in the caller.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, Value),
    Present(String),
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    /// Require `field` to be present and non-null.
    pub fn present(mut self, field: impl Into<String>) -> Self {
        self.conditions.push(Condition::Present(field.into()));
        self
    }

    pub fn matches(&self, object: &Value) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, expected) => object.get(field) == Some(expected),
            Condition::Present(field) => {
                object.get(field).is_some_and(|value| !value.is_null())
            }
        })
    }
}
