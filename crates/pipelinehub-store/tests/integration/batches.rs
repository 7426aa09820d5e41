//! Per-record outcomes of batch writes.

use pipelinehub_core::Entity;
use pipelinehub_core::records::Task;

use crate::common::TestHarness;

#[tokio::test]
async fn test_each_refused_record_is_notified() {
    let harness = TestHarness::new();
    harness.api.require_fields(Task::TABLE, &["due_date_c"]).await;
    let store = &harness.crm.tasks;

    let dated = Task {
        due_date: Some("2024-05-01".to_string()),
        ..Task::new("T-1", "Call back")
    };
    let created = store
        .create_many(&[
            dated,
            Task::new("T-2", "Send quote"),
            Task::new("T-3", "Follow up"),
        ])
        .await;

    assert_eq!(created.len(), 1);
    assert_eq!(store.items().len(), 1);
    assert_eq!(
        harness.notifier.errors(),
        vec![
            "due_date_c: is required",
            "Required fields missing",
            "due_date_c: is required",
            "Required fields missing",
        ]
    );
}

#[tokio::test]
async fn test_batch_created_records_keep_submission_order() {
    let harness = TestHarness::new();
    let store = &harness.crm.tasks;

    store
        .create_many(&[Task::new("T-1", "First"), Task::new("T-2", "Second")])
        .await;

    let names: Vec<String> = store.items().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["T-1", "T-2"]);
    assert_eq!(store.items()[0].status, "Open");
}

#[tokio::test]
async fn test_invalid_record_blocks_whole_batch() {
    let harness = TestHarness::new();
    let store = &harness.crm.tasks;

    let created = store
        .create_many(&[Task::new("T-1", "First"), Task::new("", "Nameless")])
        .await;

    assert!(created.is_empty());
    assert!(store.items().is_empty());
    assert_eq!(harness.notifier.errors(), vec!["Validation error: name is required"]);
}
