//! Common test utilities and harness for store integration tests.

use pipelinehub_client::{MemoryRecordApi, RecordApi};
use pipelinehub_core::{Entity, RecordId};
use pipelinehub_core::records::Contact;
use pipelinehub_store::{CollectingNotifier, Crm, Notifier};
use serde_json::{Value, json};
use std::sync::Arc;

/// Test harness for integration tests.
///
/// Wires a `Crm` to an in-memory record API and a collecting notifier.
pub struct TestHarness {
    /// In-memory record API shared by every store
    pub api: Arc<MemoryRecordApi>,
    /// Notices emitted by the stores
    pub notifier: Arc<CollectingNotifier>,
    /// The data layer under test
    pub crm: Crm,
}

impl TestHarness {
    /// Creates a harness over an empty record API.
    pub fn new() -> Self {
        let api = Arc::new(MemoryRecordApi::new());
        let notifier = Arc::new(CollectingNotifier::new());
        let crm = Crm::builder(api.clone() as Arc<dyn RecordApi>)
            .notifier(notifier.clone() as Arc<dyn Notifier>)
            .build();
        Self { api, notifier, crm }
    }

    /// Inserts backend-named rows directly into `table`.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) -> Vec<RecordId> {
        let rows = rows
            .into_iter()
            .map(|row| row.as_object().cloned().expect("seed rows are objects"))
            .collect();
        self.api.seed(table, rows).await
    }

    /// Inserts one contact per name.
    pub async fn seed_contacts(&self, names: &[&str]) -> Vec<RecordId> {
        let rows = names
            .iter()
            .map(|name| {
                json!({
                    "Name": name,
                    "email_c": format!("{}@example.com", name.to_lowercase()),
                })
            })
            .collect();
        self.seed(Contact::TABLE, rows).await
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
