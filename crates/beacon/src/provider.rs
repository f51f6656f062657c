// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider identity records.

use serde::{Deserialize, Serialize};

/// Identity metadata a provider announces about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Icon URI — a data URI or https URL.
    pub icon: String,
    /// Human-readable provider name.
    pub name: String,
    /// Reverse-domain identifier (e.g. "org.example.wallet"). Used for
    /// lookup convenience only; not required to be unique.
    pub rdns: String,
    /// Unique per provider instance for the lifetime of the execution
    /// context. The sole identity key for deduplication.
    pub uuid: String,
}

impl ProviderInfo {
    /// Build an info record, minting a fresh per-instance uuid.
    pub fn new(
        icon: impl Into<String>,
        name: impl Into<String>,
        rdns: impl Into<String>,
    ) -> Self {
        Self {
            icon: icon.into(),
            name: name.into(),
            rdns: rdns.into(),
            uuid: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// A full announcement: identity plus the capability handle consumers will
/// later invoke. The discovery machinery never inspects `provider`.
#[derive(Debug)]
pub struct ProviderDetail<P> {
    pub info: ProviderInfo,
    pub provider: P,
}

impl<P> ProviderDetail<P> {
    pub fn new(info: ProviderInfo, provider: P) -> Self {
        Self { info, provider }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
