// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end discovery scenarios over the public surface.

use anyhow::Context as _;

use beacon::test_support::RecordingListener;
use beacon::SubscribeOptions;
use beacon_specs::{observed_uuids, Context};

#[test]
fn full_discovery_cycle() -> anyhow::Result<()> {
    let ctx = Context::new();
    let _example = ctx.announce_wallet("Example Wallet", "org.example", "u1");
    let _foo = ctx.announce_wallet("Foo Wallet", "org.foo", "u2");

    let store = ctx.store();
    assert_eq!(observed_uuids(&store), vec!["u1", "u2"]);

    let example = store
        .find_provider("org.example")
        .context("org.example should be discoverable")?;
    assert_eq!(example.info.name, "Example Wallet");
    assert_eq!(example.provider.0, "wallet");
    Ok(())
}

#[test]
fn late_discoverer_sees_standing_announcers_only() {
    let ctx = Context::new();
    let example = ctx.announce_wallet("Example Wallet", "org.example", "u1");

    // A store built after the announcement observes it via re-announce.
    let early = ctx.store();
    assert_eq!(observed_uuids(&early), vec!["u1"]);

    // Cancelling stops re-announcement but retracts nothing already seen.
    example.cancel();
    assert_eq!(observed_uuids(&early), vec!["u1"]);

    let late = ctx.store();
    assert!(observed_uuids(&late).is_empty());
}

#[test]
fn stores_on_one_bus_are_independent() {
    let ctx = Context::new();
    let _example = ctx.announce_wallet("Example Wallet", "org.example", "u1");
    let _foo = ctx.announce_wallet("Foo Wallet", "org.foo", "u2");

    let first = ctx.store();
    let second = ctx.store();
    assert_eq!(observed_uuids(&first), vec!["u1", "u2"]);
    assert_eq!(observed_uuids(&second), vec!["u1", "u2"]);

    first.remove_provider("org.example");
    assert_eq!(observed_uuids(&first), vec!["u2"]);
    assert_eq!(observed_uuids(&second), vec!["u1", "u2"]);
}

#[test]
fn removal_lasts_only_until_the_next_discovery_cycle() {
    let ctx = Context::new();
    let _example = ctx.announce_wallet("Example Wallet", "org.example", "u1");

    let store = ctx.store();
    store.remove_provider("org.example");
    assert!(observed_uuids(&store).is_empty());

    // Any participant starting discovery re-elicits the standing
    // announcer, and the removed provider is ingested again.
    let _other = ctx.store();
    assert_eq!(observed_uuids(&store), vec!["u1"]);
}

#[test]
fn dashboard_subscription_flow() {
    let ctx = Context::new();
    let _example = ctx.announce_wallet("Example Wallet", "org.example", "u1");

    let store = ctx.store();
    let recorder = RecordingListener::new();
    let sub = store.subscribe(
        recorder.listener(),
        SubscribeOptions { emit_immediately: true },
    );

    let _foo = ctx.announce_wallet("Foo Wallet", "org.foo", "u2");
    sub.cancel();
    let _bar = ctx.announce_wallet("Bar Wallet", "org.bar", "u3");

    // One immediate replay, one live update, nothing after the cancel.
    let calls = recorder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].providers, vec!["u1"]);
    assert_eq!(calls[1].providers, vec!["u1", "u2"]);
    assert_eq!(observed_uuids(&store), vec!["u1", "u2", "u3"]);
}

#[test]
fn destroy_then_reset_recovers() {
    let ctx = Context::new();
    let _example = ctx.announce_wallet("Example Wallet", "org.example", "u1");
    let _foo = ctx.announce_wallet("Foo Wallet", "org.foo", "u2");

    let store = ctx.store();
    let _sub_1 = store.subscribe(|_, _| {}, SubscribeOptions::default());
    let _sub_2 = store.subscribe(|_, _| {}, SubscribeOptions::default());
    let _sub_3 = store.subscribe(|_, _| {}, SubscribeOptions::default());
    let _sub_4 = store.subscribe(|_, _| {}, SubscribeOptions::default());

    store.destroy();
    assert!(observed_uuids(&store).is_empty());
    assert_eq!(store.listener_count(), 0);

    let _bar = ctx.announce_wallet("Bar Wallet", "org.bar", "u3");
    assert!(observed_uuids(&store).is_empty());

    store.reset();
    assert_eq!(observed_uuids(&store), vec!["u1", "u2", "u3"]);
}

#[test]
fn participants_leave_no_handlers_behind() {
    let ctx = Context::new();

    let example = ctx.announce_wallet("Example Wallet", "org.example", "u1");
    let store = ctx.store();
    assert_eq!(ctx.bus_handler_count(), 2);

    example.cancel();
    drop(store);
    assert_eq!(ctx.bus_handler_count(), 0);
}
