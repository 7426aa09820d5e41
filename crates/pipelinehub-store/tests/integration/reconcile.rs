//! List reconciliation after mutations.

use pipelinehub_client::Operation;
use pipelinehub_core::records::{Contact, Deal};
use pipelinehub_core::{Changes, Entity};
use serde_json::json;

use crate::common::TestHarness;

#[tokio::test]
async fn test_create_failure_leaves_list_unchanged() {
    let harness = TestHarness::new();
    harness.seed_contacts(&["Ann", "Bob"]).await;
    let store = &harness.crm.contacts;
    store.load().await;
    let before = store.items();

    harness.api.fail_next(Operation::Create, "Quota exceeded").await;
    let created = store.create(&Contact::new("Cid", "cid@example.com")).await;

    assert!(created.is_none());
    assert_eq!(store.items(), before);
    assert_eq!(harness.notifier.errors(), vec!["Quota exceeded"]);
}

#[tokio::test]
async fn test_created_record_is_prepended_without_refetch() {
    let harness = TestHarness::new();
    harness.seed_contacts(&["Ann"]).await;
    let store = &harness.crm.contacts;
    store.load().await;

    let created = store
        .create(&Contact::new("Bob", "bob@example.com").with_tag("vip"))
        .await
        .expect("create succeeds");

    assert_eq!(store.items()[0], created);
    assert_eq!(store.items().len(), 2);
    assert_eq!(harness.api.call_count(Operation::Fetch).await, 1);
}

#[tokio::test]
async fn test_update_without_echo_triggers_refetch() {
    let harness = TestHarness::new();
    let ids = harness
        .seed(Deal::TABLE, vec![json!({"title_c": "Renewal", "stage_c": "Lead", "value_c": 10.0})])
        .await;
    let store = &harness.crm.deals;
    store.load().await;
    harness.api.set_echo_writes(false).await;

    let updated = store
        .update(ids[0], &Changes::new().set("stage", "Won"))
        .await
        .expect("update succeeds");

    assert_eq!(updated.stage, "Won");
    assert_eq!(store.find(ids[0]).unwrap().stage, "Won");
    assert_eq!(harness.api.call_count(Operation::Fetch).await, 2);
}

#[tokio::test]
async fn test_create_without_echo_refetches_list() {
    let harness = TestHarness::new();
    let store = &harness.crm.contacts;
    harness.api.set_echo_writes(false).await;

    let returned = store
        .create(&Contact::new("Ann", "ann@example.com"))
        .await
        .expect("create succeeds");

    assert!(returned.id.is_assigned());
    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0], returned);
}

#[tokio::test]
async fn test_delete_removes_by_id() {
    let harness = TestHarness::new();
    let ids = harness.seed_contacts(&["Ann", "Bob", "Cid"]).await;
    let store = &harness.crm.contacts;
    store.load().await;

    assert!(store.delete(ids[1]).await);
    let names: Vec<String> = store.items().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Cid", "Ann"]);
}

#[tokio::test]
async fn test_transport_failure_is_notified() {
    let harness = TestHarness::new();
    let ids = harness.seed_contacts(&["Ann"]).await;
    let store = &harness.crm.contacts;
    store.load().await;

    harness.api.disconnect_next(Operation::Update).await;
    let updated = store.update(ids[0], &Changes::new().set("phone", "555")).await;

    assert!(updated.is_none());
    let errors = harness.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Transport error"));
}
