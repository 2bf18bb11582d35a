use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::ports::{
    Document, DocumentStore, FieldFilter, Fields, Snapshot, SnapshotListener, StoreError,
    SubscriptionHandle,
};

/// Document store kept in process memory.
///
/// Listeners are called synchronously: once on subscribe with the current
/// snapshot, then after every write to their collection. Deliveries happen
/// outside the data lock and are serialized, so every listener sees
/// snapshots in write order.
///
/// `set_offline(true)` makes one-shot operations fail with
/// [`StoreError::Unavailable`] and pushes that error to every listener.
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
    dispatch: ReentrantMutex<()>,
    next_handle: AtomicU64,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    listeners: HashMap<u64, Registration>,
    offline: bool,
}

struct Registration {
    collection: String,
    filter: FieldFilter,
    on_event: SnapshotListener,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            dispatch: ReentrantMutex::new(()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        let _order = self.dispatch.lock();
        let deliveries = {
            let mut state = self.state.lock();
            if state.offline == offline {
                return;
            }
            state.offline = offline;
            if offline {
                state
                    .listeners
                    .values()
                    .map(|r| (r.on_event.clone(), Err(offline_error())))
                    .collect()
            } else {
                state.all_snapshots()
            }
        };
        debug!(offline, "Store connectivity changed");
        deliver(deliveries);
    }

    pub fn is_offline(&self) -> bool {
        self.state.lock().offline
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Current documents of `collection`, in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state
            .lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Apply `write` to the data, then notify the listeners of `collection`.
    fn write<T>(
        &self,
        collection: &str,
        write: impl FnOnce(&mut Vec<Document>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _order = self.dispatch.lock();
        let (result, deliveries) = {
            let mut state = self.state.lock();
            if state.offline {
                return Err(offline_error());
            }
            let documents = state.collections.entry(collection.to_owned()).or_default();
            let result = write(documents)?;
            (result, state.snapshots_for(collection))
        };
        deliver(deliveries);
        Ok(result)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.state.lock().offline {
            Err(offline_error())
        } else {
            Ok(())
        }
    }
}

impl State {
    fn filtered(&self, collection: &str, filter: &FieldFilter) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default()
    }

    fn snapshots_for(&self, collection: &str) -> Vec<(SnapshotListener, Snapshot)> {
        self.listeners
            .values()
            .filter(|r| r.collection == collection)
            .map(|r| (r.on_event.clone(), Ok(self.filtered(collection, &r.filter))))
            .collect()
    }

    fn all_snapshots(&self) -> Vec<(SnapshotListener, Snapshot)> {
        self.listeners
            .values()
            .map(|r| (r.on_event.clone(), Ok(self.filtered(&r.collection, &r.filter))))
            .collect()
    }
}

fn deliver(deliveries: Vec<(SnapshotListener, Snapshot)>) {
    for (on_event, snapshot) in deliveries {
        on_event(snapshot);
    }
}

fn offline_error() -> StoreError {
    StoreError::Unavailable("client is offline".to_owned())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(name = "contacts.memory_store.subscribe", skip(self, on_event))]
    fn subscribe(
        &self,
        collection: &str,
        filter: FieldFilter,
        on_event: SnapshotListener,
    ) -> Result<SubscriptionHandle, StoreError> {
        let _order = self.dispatch.lock();
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let initial = {
            let mut state = self.state.lock();
            let initial = if state.offline {
                Err(offline_error())
            } else {
                Ok(state.filtered(collection, &filter))
            };
            state.listeners.insert(
                id,
                Registration {
                    collection: collection.to_owned(),
                    filter,
                    on_event: on_event.clone(),
                },
            );
            initial
        };
        debug!(subscription = id, "Listener registered");
        on_event(initial);
        Ok(SubscriptionHandle::new(id))
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self.state.lock().listeners.remove(&handle.id()).is_some() {
            debug!(subscription = handle.id(), "Listener removed");
        }
    }

    async fn query(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        Ok(self.state.lock().filtered(collection, filter))
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let state = self.state.lock();
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.write(collection, |docs| {
            docs.push(Document::new(id.clone(), fields));
            Ok(id)
        })
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.write(collection, |docs| {
            match docs.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.fields = fields,
                None => docs.push(Document::new(id, fields)),
            }
            Ok(())
        })
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.write(collection, |docs| {
            let existing = docs
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_owned(),
                    id: id.to_owned(),
                })?;
            existing.fields.extend(fields);
            Ok(())
        })
    }

    /// Deleting a missing document succeeds.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.write(collection, |docs| {
            docs.retain(|d| d.id != id);
            Ok(())
        })
    }
}
