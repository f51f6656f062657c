// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Announce/discover protocol primitives over the signal bus.
//!
//! The relay is a stateless wrapper around exactly two bus operations:
//! `announce` publishes a provider record and keeps re-publishing it on
//! every discovery request, and `discover` forwards every announcement to a
//! callback after eliciting re-announcements with one request signal.

use std::sync::Arc;

use tracing::debug;

use crate::bus::{Signal, SignalBus, Subscription};
use crate::provider::ProviderDetail;

/// Protocol endpoint bound to one signal bus.
///
/// A detached relay stands in for an execution context that has no bus;
/// both primitives then do nothing and return detached handles, so callers
/// degrade silently instead of failing.
pub struct ProviderRelay<P> {
    bus: Option<SignalBus<P>>,
}

impl<P> Clone for ProviderRelay<P> {
    fn clone(&self) -> Self {
        Self {
            bus: self.bus.clone(),
        }
    }
}

impl<P: Send + Sync + 'static> ProviderRelay<P> {
    /// Relay bound to `bus`.
    pub fn new(bus: SignalBus<P>) -> Self {
        Self { bus: Some(bus) }
    }

    /// Relay for a context with no bus.
    pub fn detached() -> Self {
        Self { bus: None }
    }

    /// Publish `detail` immediately, then re-publish the same record every
    /// time a discovery request arrives, until the returned handle is
    /// cancelled.
    ///
    /// Cancelling stops future re-announcements only; announcements already
    /// observed by stores are not retracted.
    pub fn announce(&self, detail: ProviderDetail<P>) -> Subscription {
        let Some(bus) = &self.bus else {
            return Subscription::detached();
        };

        let detail = Arc::new(detail);
        debug!(
            uuid = %detail.info.uuid,
            rdns = %detail.info.rdns,
            name = %detail.info.name,
            "announcing provider"
        );
        bus.publish(&Signal::Announce(Arc::clone(&detail)));

        // Weak: the standing handler must not keep the bus alive.
        let rebroadcast = bus.downgrade();
        bus.subscribe(move |signal| {
            if matches!(signal, Signal::DiscoveryRequest) {
                if let Some(bus) = rebroadcast.upgrade() {
                    bus.publish(&Signal::Announce(Arc::clone(&detail)));
                }
            }
        })
    }

    /// Invoke `callback` for every announcement observed from now on, then
    /// broadcast one discovery request so already-registered announcers
    /// re-publish.
    ///
    /// No deduplication happens here: repeated request cycles deliver
    /// repeated records, and filtering is the consumer's job.
    pub fn discover<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Arc<ProviderDetail<P>>) + Send + Sync + 'static,
    {
        let Some(bus) = &self.bus else {
            debug!("no signal bus in this context; discovery is a no-op");
            return Subscription::detached();
        };

        let subscription = bus.subscribe(move |signal| {
            if let Signal::Announce(detail) = signal {
                callback(Arc::clone(detail));
            }
        });
        bus.publish(&Signal::DiscoveryRequest);
        subscription
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
