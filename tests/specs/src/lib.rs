// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end discovery scenarios.
//!
//! Builds one shared signal bus per scenario — the stand-in for the
//! execution context every participant lives in — and wires wallet-style
//! announcers and stores through the public surface only.

use beacon::test_support::FakeProvider;
use beacon::{ProviderDetail, ProviderInfo, ProviderRelay, SignalBus, Store, Subscription};

/// One execution context: a bus plus relay endpoints bound to it.
pub struct Context {
    bus: SignalBus<FakeProvider>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            bus: SignalBus::new(),
        }
    }

    /// A relay endpoint bound to this context's bus.
    pub fn relay(&self) -> ProviderRelay<FakeProvider> {
        ProviderRelay::new(self.bus.clone())
    }

    /// A store discovering on this context's bus.
    pub fn store(&self) -> Store<FakeProvider> {
        Store::new(self.relay())
    }

    /// Announce a wallet-style provider with a fixed uuid. The returned
    /// handle keeps it re-announcing until cancelled.
    pub fn announce_wallet(&self, name: &str, rdns: &str, uuid: &str) -> Subscription {
        self.relay().announce(ProviderDetail {
            info: ProviderInfo {
                icon: format!("data:image/svg+xml,<svg name=\"{name}\"/>"),
                name: name.to_owned(),
                rdns: rdns.to_owned(),
                uuid: uuid.to_owned(),
            },
            provider: FakeProvider("wallet"),
        })
    }

    /// Number of live handler registrations on the underlying bus.
    pub fn bus_handler_count(&self) -> usize {
        self.bus.handler_count()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// The uuids of a store's current list, in order.
pub fn observed_uuids(store: &Store<FakeProvider>) -> Vec<String> {
    store.providers().iter().map(|d| d.info.uuid.clone()).collect()
}
