// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deduplicated, insertion-ordered view of announced providers.
//!
//! The store starts a discovery cycle at construction and folds every
//! announcement it observes into one list: first occurrence of a uuid wins
//! its position, re-announcements of a known uuid are discarded silently.
//! Listeners are notified synchronously with the post-mutation list plus a
//! [`ListChange`] delta before the triggering operation returns.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::bus::Subscription;
use crate::provider::ProviderDetail;
use crate::relay::ProviderRelay;

/// Change descriptor passed to listeners alongside the current list.
#[derive(Debug)]
pub enum ListChange<P> {
    /// Records just appended to the list.
    Added(Vec<Arc<ProviderDetail<P>>>),
    /// Records just excised from the list.
    Removed(Vec<Arc<ProviderDetail<P>>>),
}

/// Options for [`Store::subscribe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscribeOptions {
    /// Invoke the listener once at subscription time with the current list
    /// as the `Added` delta.
    pub emit_immediately: bool,
}

type Listener<P> = Arc<dyn Fn(&[Arc<ProviderDetail<P>>], Option<&ListChange<P>>) + Send + Sync>;

struct StoreInner<P> {
    /// Keyed by uuid; iteration order is first-announcement order.
    providers: IndexMap<String, Arc<ProviderDetail<P>>>,
    listeners: Vec<(u64, Listener<P>)>,
    next_listener_id: u64,
    discovery: Subscription,
}

impl<P> StoreInner<P> {
    fn snapshot(&self) -> Vec<Arc<ProviderDetail<P>>> {
        self.providers.values().cloned().collect()
    }

    fn listener_handles(&self) -> Vec<Listener<P>> {
        self.listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect()
    }
}

/// Aggregates provider announcements into a deduplicated, insertion-ordered
/// list and notifies listeners of every change.
///
/// Construction starts discovery immediately; [`Store::reset`] starts a
/// fresh cycle and [`Store::destroy`] retires the store until the next
/// reset. Dropping the store cancels its discovery subscription.
pub struct Store<P> {
    inner: Arc<Mutex<StoreInner<P>>>,
    relay: ProviderRelay<P>,
}

impl<P: Send + Sync + 'static> Store<P> {
    /// Build a store over `relay` and start discovering.
    ///
    /// With a detached relay the store constructs normally and stays empty
    /// until `reset` is called in a context that has a bus.
    pub fn new(relay: ProviderRelay<P>) -> Self {
        let inner = Arc::new(Mutex::new(StoreInner {
            providers: IndexMap::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
            discovery: Subscription::detached(),
        }));
        let discovery = start_discovery(&relay, &inner);
        inner.lock().discovery = discovery;
        Self { inner, relay }
    }

    /// Register `listener` for change notifications.
    ///
    /// Returns a handle that removes exactly this registration; cancelling
    /// it twice is a no-op. Registering the same closure twice yields two
    /// independent registrations.
    pub fn subscribe<F>(&self, listener: F, options: SubscribeOptions) -> Subscription
    where
        F: Fn(&[Arc<ProviderDetail<P>>], Option<&ListChange<P>>) + Send + Sync + 'static,
    {
        let listener: Listener<P> = Arc::new(listener);
        let (id, snapshot) = {
            let mut inner = self.inner.lock();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.snapshot())
        };

        if options.emit_immediately {
            let change = ListChange::Added(snapshot.clone());
            listener(&snapshot, Some(&change));
        }

        let inner = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.lock().listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Empty the list and notify every listener with the removed records.
    ///
    /// The notify is unconditional: an already-empty store still notifies,
    /// with an empty removed list. Discovery keeps running.
    pub fn clear(&self) {
        let (removed, listeners) = {
            let mut inner = self.inner.lock();
            let removed: Vec<_> = inner.providers.drain(..).map(|(_, detail)| detail).collect();
            (removed, inner.listener_handles())
        };
        notify(&listeners, &[], Some(&ListChange::Removed(removed)));
    }

    /// Clear the list, drop every listener, and stop discovery.
    ///
    /// Afterwards no announcements are ingested and no listeners remain;
    /// the store is inert until [`Store::reset`]. Safe to call repeatedly.
    pub fn destroy(&self) {
        self.clear();
        let discovery = {
            let mut inner = self.inner.lock();
            inner.listeners.clear();
            std::mem::replace(&mut inner.discovery, Subscription::detached())
        };
        discovery.cancel();
        debug!("store destroyed");
    }

    /// Clear the list and start a fresh discovery cycle.
    ///
    /// Listeners stay subscribed and observe the new cycle. This is also
    /// the way to revive a destroyed store.
    pub fn reset(&self) {
        self.clear();
        let retired = {
            let mut inner = self.inner.lock();
            std::mem::replace(&mut inner.discovery, Subscription::detached())
        };
        retired.cancel();
        debug!("store reset; starting fresh discovery");
        let discovery = start_discovery(&self.relay, &self.inner);
        self.inner.lock().discovery = discovery;
    }

    /// First provider whose `rdns` matches, in insertion order.
    pub fn find_provider(&self, rdns: &str) -> Option<Arc<ProviderDetail<P>>> {
        let inner = self.inner.lock();
        inner.providers.values().find(|detail| detail.info.rdns == rdns).cloned()
    }

    /// Remove the first provider whose `rdns` matches and notify listeners
    /// with the shrunk list. No match means no mutation and no notification.
    ///
    /// With duplicate `rdns` values only the earliest-inserted entry is
    /// addressed; the next duplicate becomes visible to rdns lookups on a
    /// subsequent call.
    pub fn remove_provider(&self, rdns: &str) {
        let (snapshot, removed, listeners) = {
            let mut inner = self.inner.lock();
            let Some(index) = inner.providers.values().position(|d| d.info.rdns == rdns) else {
                return;
            };
            let Some((_, detail)) = inner.providers.shift_remove_index(index) else {
                return;
            };
            (inner.snapshot(), detail, inner.listener_handles())
        };
        debug!(uuid = %removed.info.uuid, rdns = %removed.info.rdns, "provider removed");
        notify(&listeners, &snapshot, Some(&ListChange::Removed(vec![removed])));
    }

    /// Snapshot of the current list, in first-announcement order.
    pub fn providers(&self) -> Vec<Arc<ProviderDetail<P>>> {
        self.inner.lock().snapshot()
    }

    /// Number of live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

impl<P> Drop for Store<P> {
    fn drop(&mut self) {
        let discovery = {
            let mut inner = self.inner.lock();
            std::mem::replace(&mut inner.discovery, Subscription::detached())
        };
        discovery.cancel();
    }
}

impl<P> fmt::Debug for Store<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Store")
            .field("providers", &inner.providers.len())
            .field("listeners", &inner.listeners.len())
            .field("discovery", &inner.discovery)
            .finish()
    }
}

/// Start a discovery cycle over `relay`, feeding announcements into `inner`.
fn start_discovery<P: Send + Sync + 'static>(
    relay: &ProviderRelay<P>,
    inner: &Arc<Mutex<StoreInner<P>>>,
) -> Subscription {
    let inner = Arc::downgrade(inner);
    relay.discover(move |detail| {
        if let Some(inner) = inner.upgrade() {
            ingest(&inner, detail);
        }
    })
}

/// Append a newly observed provider; a known uuid is discarded silently
/// with no notification.
fn ingest<P>(inner: &Mutex<StoreInner<P>>, detail: Arc<ProviderDetail<P>>) {
    let (snapshot, listeners) = {
        let mut inner = inner.lock();
        if inner.providers.contains_key(&detail.info.uuid) {
            trace!(uuid = %detail.info.uuid, "re-announcement of known provider ignored");
            return;
        }
        debug!(
            uuid = %detail.info.uuid,
            rdns = %detail.info.rdns,
            name = %detail.info.name,
            "provider observed"
        );
        inner.providers.insert(detail.info.uuid.clone(), Arc::clone(&detail));
        (inner.snapshot(), inner.listener_handles())
    };
    notify(&listeners, &snapshot, Some(&ListChange::Added(vec![detail])));
}

/// Invoke every listener with the given list and delta, in registration
/// order. No store lock is held here; a listener may re-enter the store.
fn notify<P>(
    listeners: &[Listener<P>],
    providers: &[Arc<ProviderDetail<P>>],
    change: Option<&ListChange<P>>,
) {
    for listener in listeners {
        listener(providers, change);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
