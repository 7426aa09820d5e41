//! In-memory record list per entity.
//!
//! A [`RecordStore`] owns one list of records plus `loading` / `error`
//! flags and broadcasts every change through a `watch` channel. Mutations
//! go through the [`Gateway`] and are reconciled by splicing the echoed
//! record into the list by id; when the backend does not echo the record
//! the list is refetched instead.
//!
//! Loads and mutations share one generation counter. A load whose response
//! arrives after a newer load or a mutation has touched the list is
//! discarded, so a slow fetch never resurrects deleted rows or overwrites
//! a fresher echo.
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = RecordStore::new(Gateway::<Deal>::new(api), Arc::new(TracingNotifier));
//! store.load().await;
//! let mut rx = store.subscribe();
//! store.update(id, &Changes::new().set("stage", "Won")).await;
//! assert!(rx.has_changed()?);
//! ```

use pipelinehub_core::{Changes, Entity, Error, FieldSelection, RecordId};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use crate::gateway::{Gateway, ListFilter};
use crate::notify::{Notice, Notifier};

/// Observable state of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<E> {
    /// Loaded records
    pub items: Vec<E>,
    /// A load is in flight
    pub loading: bool,
    /// Message of the last failed load
    pub error: Option<String>,
}

impl<E> Default for Snapshot<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Handle to the record list of entity `E`.
///
/// Cheap to clone (Arc internals); clones share the list. Two stores built
/// separately hold independent copies.
pub struct RecordStore<E: Entity> {
    inner: Arc<StoreInner<E>>,
}

struct StoreInner<E: Entity> {
    gateway: Gateway<E>,
    notifier: Arc<dyn Notifier>,
    tx: watch::Sender<Snapshot<E>>,
    generation: AtomicU64,
    latest_load: AtomicU64,
}

impl<E: Entity> Clone for RecordStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> RecordStore<E> {
    /// An empty store over `gateway`.
    pub fn new(gateway: Gateway<E>, notifier: Arc<dyn Notifier>) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                gateway,
                notifier,
                tx,
                generation: AtomicU64::new(0),
                latest_load: AtomicU64::new(0),
            }),
        }
    }

    /// The gateway this store writes through.
    pub fn gateway(&self) -> &Gateway<E> {
        &self.inner.gateway
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot<E> {
        self.inner.tx.borrow().clone()
    }

    /// Current records.
    pub fn items(&self) -> Vec<E> {
        self.inner.tx.borrow().items.clone()
    }

    /// Looks up a loaded record.
    pub fn find(&self, id: RecordId) -> Option<E> {
        self.inner
            .tx
            .borrow()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<E>> {
        self.inner.tx.subscribe()
    }

    /// Loads every record, replacing the list.
    ///
    /// Returns `false` if a newer load started or a mutation was applied
    /// meanwhile, in which case this response was discarded.
    pub async fn load(&self) -> bool {
        self.load_filtered(&ListFilter::all()).await
    }

    /// Loads records matching `filter`, replacing the list.
    pub async fn load_filtered(&self, filter: &ListFilter) -> bool {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.latest_load.store(generation, Ordering::SeqCst);
        self.inner.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let result = self.inner.gateway.list(filter).await;

        if self.inner.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(entity = %E::KIND, generation, "discarding superseded load");
            if self.inner.latest_load.load(Ordering::SeqCst) == generation {
                self.inner.tx.send_modify(|s| s.loading = false);
            }
            return false;
        }

        match result {
            Ok(items) => {
                tracing::debug!(entity = %E::KIND, count = items.len(), "loaded");
                self.inner.tx.send_modify(|s| {
                    s.items = items;
                    s.loading = false;
                });
            }
            Err(err) => {
                let message = err.to_string();
                self.report("load", &err);
                self.inner.tx.send_modify(|s| {
                    s.items.clear();
                    s.loading = false;
                    s.error = Some(message);
                });
            }
        }
        true
    }

    /// Creates a record and prepends it to the list.
    ///
    /// Returns `None` on failure, leaving the list unchanged. When the
    /// backend does not echo the record, the list is refetched and the
    /// refetched row matching the submitted fields is returned; `None` if
    /// no such row came back.
    pub async fn create(&self, record: &E) -> Option<E> {
        match self.inner.gateway.create(record).await {
            Ok(Some(created)) => {
                self.supersede_loads();
                self.inner
                    .tx
                    .send_modify(|s| s.items.insert(0, created.clone()));
                self.succeeded("created");
                Some(created)
            }
            Ok(None) => {
                self.load().await;
                self.succeeded("created");
                let found = self.find_created(record);
                if found.is_none() {
                    tracing::warn!(entity = %E::KIND, "created record missing from refetched list");
                }
                found
            }
            Err(err) => {
                self.report("create", &err);
                None
            }
        }
    }

    /// Creates several records; each refused record is notified separately.
    ///
    /// Returns the records the backend echoed.
    pub async fn create_many(&self, records: &[E]) -> Vec<E> {
        match self.inner.gateway.create_many(records).await {
            Ok(outcome) => {
                for message in outcome.failure_messages() {
                    self.inner.notifier.notify(Notice::error(message));
                }
                if outcome.silent > 0 {
                    self.load().await;
                } else if !outcome.succeeded.is_empty() {
                    self.supersede_loads();
                    self.inner.tx.send_modify(|s| {
                        for created in outcome.succeeded.iter().rev() {
                            s.items.insert(0, created.clone());
                        }
                    });
                }
                if outcome.accepted() > 0 {
                    self.succeeded("created");
                }
                outcome.succeeded
            }
            Err(err) => {
                self.report("create", &err);
                Vec::new()
            }
        }
    }

    /// Applies `changes` to one record and replaces it in the list.
    pub async fn update(&self, id: RecordId, changes: &Changes) -> Option<E> {
        let result = self.inner.gateway.update(id, changes).await;
        self.reconcile_update(id, result).await
    }

    /// Writes every field of `record` and replaces it in the list.
    pub async fn update_record(&self, record: &E) -> Option<E> {
        let result = self.inner.gateway.update_record(record).await;
        self.reconcile_update(record.id(), result).await
    }

    async fn reconcile_update(
        &self,
        id: RecordId,
        result: pipelinehub_core::Result<Option<E>>,
    ) -> Option<E> {
        match result {
            Ok(Some(updated)) => {
                self.supersede_loads();
                self.inner.tx.send_modify(|s| {
                    if let Some(slot) = s.items.iter_mut().find(|item| item.id() == id) {
                        *slot = updated.clone();
                    }
                });
                self.succeeded("updated");
                Some(updated)
            }
            Ok(None) => {
                self.load().await;
                self.succeeded("updated");
                self.find(id)
            }
            Err(err) => {
                self.report("update", &err);
                None
            }
        }
    }

    /// Deletes a record and removes it from the list.
    pub async fn delete(&self, id: RecordId) -> bool {
        match self.inner.gateway.delete(id).await {
            Ok(()) => {
                self.supersede_loads();
                self.inner
                    .tx
                    .send_modify(|s| s.items.retain(|item| item.id() != id));
                self.succeeded("deleted");
                true
            }
            Err(err) => {
                self.report("delete", &err);
                false
            }
        }
    }

    /// Waits until no load is in flight.
    ///
    /// Fails with [`Error::Timeout`] if a load is still running after
    /// `timeout`.
    pub async fn wait_idle(&self, timeout: Duration) -> pipelinehub_core::Result<()> {
        let mut rx = self.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(|s| !s.loading)).await;
        match waited {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::transport(format!("{} store channel closed", E::KIND))),
            Err(_) => Err(Error::timeout(format!(
                "{} store still loading after {timeout:?}",
                E::KIND
            ))),
        }
    }

    /// Invalidates any load in flight before a mutation touches the list.
    fn supersede_loads(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Newest loaded row carrying every non-blank field of `record`.
    fn find_created(&self, record: &E) -> Option<E> {
        let wanted = record.to_backend(FieldSelection::Update).ok()?;
        let carries = |item: &E| {
            item.to_backend(FieldSelection::Update).is_ok_and(|fields| {
                wanted
                    .iter()
                    .filter(|(_, value)| !is_blank(value))
                    .all(|(key, value)| fields.get(key) == Some(value))
            })
        };
        self.inner
            .tx
            .borrow()
            .items
            .iter()
            .filter(|item| carries(*item))
            .max_by_key(|item| item.id())
            .cloned()
    }

    fn succeeded(&self, verb: &str) {
        self.inner
            .notifier
            .notify(Notice::success(format!("{} {verb} successfully", E::KIND.label())));
    }

    fn report(&self, operation: &str, err: &Error) {
        tracing::warn!(entity = %E::KIND, operation, error = %err, "store operation failed");
        for message in err.user_messages() {
            self.inner.notifier.notify(Notice::error(message));
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl<E: Entity> fmt::Debug for RecordStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.tx.borrow();
        f.debug_struct("RecordStore")
            .field("entity", &E::KIND)
            .field("items", &state.items.len())
            .field("loading", &state.loading)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
