//! Superseded loads must not overwrite newer data.

use pipelinehub_client::Operation;
use pipelinehub_core::records::Contact;
use pipelinehub_core::Changes;
use std::time::Duration;

use crate::common::TestHarness;

#[tokio::test(start_paused = true)]
async fn test_superseded_load_is_discarded() {
    let harness = TestHarness::new();
    harness.seed_contacts(&["Ann"]).await;
    harness.api.delay_next_fetch(Duration::from_millis(500)).await;
    harness.api.delay_next_fetch(Duration::from_millis(10)).await;

    let store = harness.crm.contacts.clone();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    while harness.api.call_count(Operation::Fetch).await == 0 {
        tokio::task::yield_now().await;
    }

    harness.seed_contacts(&["Bob"]).await;
    assert!(store.load().await);
    assert_eq!(store.items().len(), 2);

    let applied = slow.await.expect("load task completes");
    assert!(!applied);
    assert_eq!(store.items().len(), 2);
    assert!(!store.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_tracks_in_flight_load() {
    let harness = TestHarness::new();
    harness.api.delay_next_fetch(Duration::from_millis(100)).await;

    let store = harness.crm.contacts.clone();
    let mut rx = store.subscribe();
    let task = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });

    rx.changed().await.expect("store alive");
    assert!(rx.borrow_and_update().loading);

    store
        .wait_idle(Duration::from_secs(1))
        .await
        .expect("load finishes");
    assert!(task.await.expect("load task completes"));
    assert!(!store.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn test_create_during_slow_load_survives() {
    let harness = TestHarness::new();
    harness.seed_contacts(&["Ann"]).await;
    harness.api.delay_next_fetch(Duration::from_millis(500)).await;

    let store = harness.crm.contacts.clone();
    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    while harness.api.call_count(Operation::Fetch).await == 0 {
        tokio::task::yield_now().await;
    }

    let bob = store
        .create(&Contact::new("Bob", "bob@example.com"))
        .await
        .expect("create succeeds");

    let applied = slow.await.expect("load task completes");
    assert!(!applied);
    assert_eq!(store.find(bob.id).map(|c| c.name), Some("Bob".to_string()));
    assert!(!store.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn test_update_during_slow_load_survives() {
    let harness = TestHarness::new();
    let ids = harness.seed_contacts(&["Ann"]).await;
    let store = harness.crm.contacts.clone();
    assert!(store.load().await);
    harness.api.delay_next_fetch(Duration::from_millis(500)).await;

    let slow = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });
    while harness.api.call_count(Operation::Fetch).await < 2 {
        tokio::task::yield_now().await;
    }

    store
        .update(ids[0], &Changes::new().set("company", "Acme"))
        .await
        .expect("update succeeds");

    assert!(!slow.await.expect("load task completes"));
    let ann = store.find(ids[0]).expect("still listed");
    assert_eq!(ann.company.as_deref(), Some("Acme"));
    assert!(!store.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn test_newer_load_still_applies_after_mutation() {
    let harness = TestHarness::new();
    harness.seed_contacts(&["Ann"]).await;
    let store = harness.crm.contacts.clone();

    store
        .create(&Contact::new("Bob", "bob@example.com"))
        .await
        .expect("create succeeds");
    assert!(store.load().await);
    assert_eq!(store.items().len(), 2);
}
