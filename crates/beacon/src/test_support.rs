// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: fixture records and a recording listener.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::provider::{ProviderDetail, ProviderInfo};
use crate::store::ListChange;

/// Capability handle used by fixtures. Carries a tag so tests can tell
/// handles apart without touching identity metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeProvider(pub &'static str);

/// Fixture record with a fixed uuid, for deterministic assertions.
pub fn detail(name: &str, rdns: &str, uuid: &str) -> ProviderDetail<FakeProvider> {
    ProviderDetail {
        info: ProviderInfo {
            icon: format!("https://{rdns}/icon.png"),
            name: name.to_owned(),
            rdns: rdns.to_owned(),
            uuid: uuid.to_owned(),
        },
        provider: FakeProvider("fake"),
    }
}

/// Fixture record with a freshly minted uuid.
pub fn minted_detail(name: &str, rdns: &str) -> ProviderDetail<FakeProvider> {
    ProviderDetail {
        info: ProviderInfo::new(format!("https://{rdns}/icon.png"), name, rdns),
        provider: FakeProvider("fake"),
    }
}

/// The uuids of a record list, in order.
pub fn uuids<P>(details: &[Arc<ProviderDetail<P>>]) -> Vec<String> {
    details.iter().map(|detail| detail.info.uuid.clone()).collect()
}

/// A change descriptor reduced to uuids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedChange {
    Added(Vec<String>),
    Removed(Vec<String>),
    None,
}

/// One captured notification: the list as delivered plus its delta, both
/// reduced to uuids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub providers: Vec<String>,
    pub change: RecordedChange,
}

/// Listener double that records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingListener {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closure to hand to `Store::subscribe`.
    pub fn listener(
        &self,
    ) -> impl Fn(&[Arc<ProviderDetail<FakeProvider>>], Option<&ListChange<FakeProvider>>)
    + Send
    + Sync
    + 'static {
        let calls = Arc::clone(&self.calls);
        move |providers, change| {
            calls.lock().push(RecordedCall {
                providers: uuids(providers),
                change: match change {
                    Some(ListChange::Added(added)) => RecordedChange::Added(uuids(added)),
                    Some(ListChange::Removed(removed)) => RecordedChange::Removed(uuids(removed)),
                    None => RecordedChange::None,
                },
            });
        }
    }

    /// Every notification captured so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}
