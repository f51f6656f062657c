// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process signal bus shared by announcers and discoverers.
//!
//! One bus instance stands in for the execution context all participants
//! share; [`SignalBus`] is a cheap handle and clones refer to the same
//! channel. Delivery is synchronous: `publish` invokes every handler that
//! was registered at the instant of the call, in registration order, and
//! returns only once all of them have run. Handlers are snapshotted before
//! dispatch, so a handler may publish or (un)subscribe re-entrantly;
//! registrations and cancellations made during a dispatch take effect for
//! later publishes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::provider::ProviderDetail;

/// A signal carried on the bus.
#[derive(Debug)]
pub enum Signal<P> {
    /// "I exist; here is my identity and capability handle."
    Announce(Arc<ProviderDetail<P>>),
    /// "Re-announce yourselves."
    DiscoveryRequest,
}

impl<P> Clone for Signal<P> {
    fn clone(&self) -> Self {
        match self {
            Self::Announce(detail) => Self::Announce(Arc::clone(detail)),
            Self::DiscoveryRequest => Self::DiscoveryRequest,
        }
    }
}

type Handler<P> = Arc<dyn Fn(&Signal<P>) + Send + Sync>;

struct Registry<P> {
    handlers: Mutex<Vec<(u64, Handler<P>)>>,
    next_id: AtomicU64,
}

/// Multi-producer/multi-consumer broadcast channel for [`Signal`]s.
pub struct SignalBus<P> {
    registry: Arc<Registry<P>>,
}

impl<P> Clone for SignalBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> SignalBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                handlers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Deliver `signal` to every currently-registered handler, in
    /// registration order.
    ///
    /// The handler list is snapshotted before dispatch and the registry lock
    /// is not held while handlers run, so a handler may publish or
    /// (un)subscribe without deadlocking.
    pub fn publish(&self, signal: &Signal<P>) {
        let handlers: Vec<Handler<P>> = {
            let registry = self.registry.handlers.lock();
            registry.iter().map(|(_, handler)| Arc::clone(handler)).collect()
        };
        for handler in handlers {
            handler(signal);
        }
    }

    /// Register a handler for every signal published from now on.
    ///
    /// The returned handle removes the handler; cancelling twice, or after
    /// the bus itself is gone, is a no-op. The handle holds only a weak
    /// back-reference, so a bus is never kept alive by its subscriptions.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        P: 'static,
        F: Fn(&Signal<P>) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.handlers.lock().push((id, Arc::new(handler)));

        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.handlers.lock().retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    /// A weak handle that does not keep the channel alive. Handlers that
    /// need to publish back into their own bus hold one of these.
    pub fn downgrade(&self) -> WeakBus<P> {
        WeakBus {
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Number of live handler registrations.
    pub fn handler_count(&self) -> usize {
        self.registry.handlers.lock().len()
    }
}

impl<P> Default for SignalBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for SignalBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Weak counterpart of [`SignalBus`].
pub struct WeakBus<P> {
    registry: Weak<Registry<P>>,
}

impl<P> Clone for WeakBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<P> WeakBus<P> {
    /// The bus, if any strong handle to it still exists.
    pub fn upgrade(&self) -> Option<SignalBus<P>> {
        self.registry.upgrade().map(|registry| SignalBus { registry })
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// Handle for a live registration on the bus or a store.
///
/// Cancelling removes the registration. Repeat cancellations are no-ops, as
/// is cancelling a handle whose target no longer exists.
pub struct Subscription {
    cancel: Mutex<Option<CancelFn>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// A handle with nothing behind it. Cancelling is a no-op.
    pub fn detached() -> Self {
        Self {
            cancel: Mutex::new(None),
        }
    }

    /// Whether the registration has not yet been cancelled.
    pub fn is_active(&self) -> bool {
        self.cancel.lock().is_some()
    }

    /// Remove the registration. Safe to call any number of times.
    pub fn cancel(&self) {
        let cancel = self.cancel.lock().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
