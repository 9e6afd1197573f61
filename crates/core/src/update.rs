// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance-update strategies and outcomes

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Strategy applied to live instances after a successful redefinition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateMethod {
    /// The platform migrated instances itself; nothing to do per instance.
    Automatic,
    /// Field-by-field copy into a freshly constructed instance.
    Reflection,
    /// Proxy wrappers re-resolve their delegates.
    ProxyRefresh,
    /// A factory/registry collaborator rebuilds its instances.
    FactoryReset,
    /// No tracked instances, or every other strategy was unavailable.
    NoUpdate,
}

crate::wire_names! {
    UpdateMethod {
        Automatic => "AUTOMATIC",
        Reflection => "REFLECTION",
        ProxyRefresh => "PROXY_REFRESH",
        FactoryReset => "FACTORY_RESET",
        NoUpdate => "NO_UPDATE",
    }
}

impl UpdateMethod {
    pub const ALL: [UpdateMethod; 5] = [
        UpdateMethod::Automatic,
        UpdateMethod::Reflection,
        UpdateMethod::ProxyRefresh,
        UpdateMethod::FactoryReset,
        UpdateMethod::NoUpdate,
    ];
}

impl std::str::FromStr for UpdateMethod {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdateMethod::ALL
            .into_iter()
            .find(|method| method.wire_name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Unrecognized strategy name in configuration.
#[derive(Debug, Error)]
#[error("unknown update strategy: {0}")]
pub struct UnknownStrategy(pub String);

/// Violations of the update-outcome invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateOutcomeError {
    #[error("updated ({updated}) + failed ({failed}) exceeds total ({total})")]
    CountsExceedTotal { updated: u32, failed: u32, total: u32 },
    #[error("zero-instance outcome must use NO_UPDATE, got {0}")]
    EmptyRequiresNoUpdate(UpdateMethod),
}

/// Aggregate result of one instance-update pass.
///
/// Invariants: `updated + failed <= total`, and an all-zero outcome always
/// carries [`UpdateMethod::NoUpdate`]. Fields are private so every outcome
/// passes through the validating constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    class_name: SmolStr,
    method: UpdateMethod,
    updated: u32,
    total: u32,
    failed: u32,
    duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl UpdateOutcome {
    pub fn new(
        class_name: impl Into<SmolStr>,
        method: UpdateMethod,
        updated: u32,
        total: u32,
        failed: u32,
        duration_ms: u64,
        detail: Option<String>,
    ) -> Result<Self, UpdateOutcomeError> {
        if updated.saturating_add(failed) > total {
            return Err(UpdateOutcomeError::CountsExceedTotal { updated, failed, total });
        }
        if updated == 0 && total == 0 && method != UpdateMethod::NoUpdate {
            return Err(UpdateOutcomeError::EmptyRequiresNoUpdate(method));
        }
        Ok(Self { class_name: class_name.into(), method, updated, total, failed, duration_ms, detail })
    }

    /// The outcome for a class with no live tracked instances.
    pub fn no_update(class_name: impl Into<SmolStr>) -> Self {
        Self {
            class_name: class_name.into(),
            method: UpdateMethod::NoUpdate,
            updated: 0,
            total: 0,
            failed: 0,
            duration_ms: 0,
            detail: None,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method(&self) -> UpdateMethod {
        self.method
    }

    pub fn updated(&self) -> u32 {
        self.updated
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// True when every targeted instance updated cleanly.
    pub fn complete(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
