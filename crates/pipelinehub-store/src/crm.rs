//! One store per entity over a shared record API.

use pipelinehub_client::RecordApi;
use pipelinehub_core::Entity;
use pipelinehub_core::records::{
    Activity, Company, Contact, Deal, PipelineStage, Quote, SalesOrder, Task,
};
use std::sync::Arc;

use crate::gateway::Gateway;
use crate::notify::{Notifier, TracingNotifier};
use crate::store::RecordStore;

/// The CRM data layer: an explicitly constructed record API shared by every
/// entity store.
#[derive(Debug, Clone)]
pub struct Crm {
    /// Contacts
    pub contacts: RecordStore<Contact>,
    /// Companies
    pub companies: RecordStore<Company>,
    /// Deals
    pub deals: RecordStore<Deal>,
    /// Activities
    pub activities: RecordStore<Activity>,
    /// Quotes
    pub quotes: RecordStore<Quote>,
    /// Sales orders
    pub sales_orders: RecordStore<SalesOrder>,
    /// Tasks
    pub tasks: RecordStore<Task>,
    /// Pipeline stages
    pub stages: RecordStore<PipelineStage>,
}

/// Builder for [`Crm`].
pub struct CrmBuilder {
    api: Arc<dyn RecordApi>,
    notifier: Arc<dyn Notifier>,
    page_limit: Option<u32>,
}

impl CrmBuilder {
    /// Routes notices to `notifier` instead of tracing.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Overrides the page size of list queries.
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    fn store<E: Entity>(&self) -> RecordStore<E> {
        let mut gateway = Gateway::new(Arc::clone(&self.api));
        if let Some(limit) = self.page_limit {
            gateway = gateway.with_page_limit(limit);
        }
        RecordStore::new(gateway, Arc::clone(&self.notifier))
    }

    /// Builds the stores.
    pub fn build(self) -> Crm {
        Crm {
            contacts: self.store(),
            companies: self.store(),
            deals: self.store(),
            activities: self.store(),
            quotes: self.store(),
            sales_orders: self.store(),
            tasks: self.store(),
            stages: self.store(),
        }
    }
}

impl Crm {
    /// Starts building a data layer over `api`.
    pub fn builder(api: Arc<dyn RecordApi>) -> CrmBuilder {
        CrmBuilder {
            api,
            notifier: Arc::new(TracingNotifier),
            page_limit: None,
        }
    }

    /// A data layer over `api` notifying through tracing.
    pub fn new(api: Arc<dyn RecordApi>) -> Self {
        Self::builder(api).build()
    }

    /// Loads every store concurrently.
    pub async fn load_all(&self) {
        tokio::join!(
            self.contacts.load(),
            self.companies.load(),
            self.deals.load(),
            self.activities.load(),
            self.quotes.load(),
            self.sales_orders.load(),
            self.tasks.load(),
            self.stages.load(),
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::CollectingNotifier;
    use pipelinehub_client::MemoryRecordApi;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_all_populates_every_store() {
        let api = Arc::new(MemoryRecordApi::new());
        api.seed(
            Deal::TABLE,
            vec![json!({"title_c": "A", "value_c": 10.0}).as_object().cloned().unwrap()],
        )
        .await;
        api.seed(
            PipelineStage::TABLE,
            vec![json!({"Name": "Lead", "order_c": 1}).as_object().cloned().unwrap()],
        )
        .await;

        let crm = Crm::new(api as Arc<dyn RecordApi>);
        crm.load_all().await;
        assert_eq!(crm.deals.items().len(), 1);
        assert_eq!(crm.stages.items().len(), 1);
        assert!(crm.contacts.items().is_empty());
    }

    #[tokio::test]
    async fn test_builder_page_limit_and_notifier() {
        let api = Arc::new(MemoryRecordApi::new());
        let rows = (0..5)
            .map(|i| json!({"Name": format!("C{i}")}).as_object().cloned().unwrap())
            .collect();
        api.seed(Company::TABLE, rows).await;
        let notifier = Arc::new(CollectingNotifier::new());

        let crm = Crm::builder(api as Arc<dyn RecordApi>)
            .notifier(notifier.clone() as Arc<dyn Notifier>)
            .page_limit(2)
            .build();
        crm.companies.load().await;
        assert_eq!(crm.companies.items().len(), 2);

        crm.companies.create(&Company::new("Acme")).await.unwrap();
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_stores_for_same_table_are_independent() {
        let api: Arc<dyn RecordApi> = Arc::new(MemoryRecordApi::new());
        let first = Crm::new(Arc::clone(&api));
        let second = Crm::new(api);

        first.contacts.create(&Contact::new("Ann", "ann@example.com")).await.unwrap();
        assert_eq!(first.contacts.items().len(), 1);
        assert!(second.contacts.items().is_empty());

        second.contacts.load().await;
        assert_eq!(second.contacts.items().len(), 1);
    }
}
