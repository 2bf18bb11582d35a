#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use contacts::contract::model::Contact;
use contacts::domain::events::ContactListEvent;
use contacts::domain::ports::{
    Document, DocumentStore, EventPublisher, FieldFilter, Fields, Snapshot, SnapshotListener,
    StoreError, SubscriptionHandle,
};
use contacts::domain::view_model::ContactListViewModel;

pub const CONTACTS: &str = "contacts";

/// A subscription captured by [`FakeDocumentStore`].
#[derive(Clone)]
pub struct Captured {
    pub handle: SubscriptionHandle,
    pub collection: String,
    pub filter: FieldFilter,
    pub listener: SnapshotListener,
}

type QueryHook = Box<dyn Fn() + Send + Sync>;
type SubscribeHook = Arc<dyn Fn(&FieldFilter) -> Option<StoreError> + Send + Sync>;

/// Store double that records subscriptions instead of delivering anything.
/// Tests push synthetic snapshots through [`emit`](Self::emit).
#[derive(Default)]
pub struct FakeDocumentStore {
    captured: Mutex<Vec<Captured>>,
    released: Mutex<Vec<SubscriptionHandle>>,
    next: AtomicU64,
    fail_subscribe: AtomicBool,
    query_result: Mutex<Vec<Document>>,
    before_query_returns: Mutex<Option<QueryHook>>,
    on_subscribe: Mutex<Option<SubscribeHook>>,
}

impl FakeDocumentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver `snapshot` to the `index`-th subscription ever opened.
    pub fn emit(&self, index: usize, snapshot: Snapshot) {
        let listener = self.captured.lock()[index].listener.clone();
        listener(snapshot);
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().clone()
    }

    pub fn released(&self) -> Vec<SubscriptionHandle> {
        self.released.lock().clone()
    }

    /// Subscriptions opened and not yet released.
    pub fn active(&self) -> Vec<SubscriptionHandle> {
        let released = self.released.lock().clone();
        self.captured
            .lock()
            .iter()
            .map(|c| c.handle)
            .filter(|h| !released.contains(h))
            .collect()
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn set_query_result(&self, documents: Vec<Document>) {
        *self.query_result.lock() = documents;
    }

    /// Run `hook` while a query is in flight, before its result is returned.
    pub fn before_query_returns(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.before_query_returns.lock() = Some(Box::new(hook));
    }

    /// Run `hook` inside every `subscribe` call. A returned error fails that
    /// subscription. The hook may call back into the store.
    pub fn on_subscribe(
        &self,
        hook: impl Fn(&FieldFilter) -> Option<StoreError> + Send + Sync + 'static,
    ) {
        *self.on_subscribe.lock() = Some(Arc::new(hook));
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    fn subscribe(
        &self,
        collection: &str,
        filter: FieldFilter,
        on_event: SnapshotListener,
    ) -> Result<SubscriptionHandle, StoreError> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied("listen refused".into()));
        }
        let hook = self.on_subscribe.lock().clone();
        if let Some(err) = hook.and_then(|hook| hook(&filter)) {
            return Err(err);
        }
        let handle = SubscriptionHandle::new(self.next.fetch_add(1, Ordering::SeqCst));
        self.captured.lock().push(Captured {
            handle,
            collection: collection.to_owned(),
            filter,
            listener: on_event,
        });
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.released.lock().push(handle);
    }

    async fn query(
        &self,
        _collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StoreError> {
        let result: Vec<Document> = self
            .query_result
            .lock()
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        if let Some(hook) = self.before_query_returns.lock().as_ref() {
            hook();
        }
        Ok(result)
    }

    async fn get_document(
        &self,
        _collection: &str,
        _id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(None)
    }

    async fn add_document(&self, _collection: &str, _fields: Fields) -> Result<String, StoreError> {
        Ok("fake-id".into())
    }

    async fn set_document(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Fields,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update_document(
        &self,
        _collection: &str,
        _id: &str,
        _fields: Fields,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete_document(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Publisher that keeps every event.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<ContactListEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ContactListEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&ContactListEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

impl EventPublisher<ContactListEvent> for RecordingPublisher {
    fn publish(&self, event: &ContactListEvent) {
        self.events.lock().push(event.clone());
    }
}

pub fn view_model(store: Arc<dyn DocumentStore>) -> (ContactListViewModel, Arc<RecordingPublisher>) {
    let events = Arc::new(RecordingPublisher::default());
    let vm = ContactListViewModel::new(store, events.clone(), CONTACTS);
    (vm, events)
}

pub fn fields(v: Value) -> Fields {
    match v {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

pub fn contact_doc(id: &str, owner: &str, name: &str, phone: &str, email: &str) -> Document {
    Document::new(
        id,
        fields(json!({
            "name": name,
            "phone": phone,
            "email": email,
            "imageData": "",
            "ownerId": owner,
        })),
    )
}

pub fn contact(id: &str, owner: &str, name: &str, phone: &str, email: &str) -> Contact {
    Contact {
        id: id.into(),
        name: name.into(),
        phone: phone.into(),
        email: email.into(),
        image_data: String::new(),
        owner_id: owner.into(),
    }
}

/// Three contacts owned by `owner`.
pub fn three_docs(owner: &str) -> Vec<Document> {
    vec![
        contact_doc("c1", owner, "Ana", "5512345678", "a@x.com"),
        contact_doc("c2", owner, "Bruno", "5588889999", "bruno@mail.mx"),
        contact_doc("c3", owner, "Carla", "5511110000", "carla@x.com"),
    ]
}

pub fn names(contacts: &[Contact]) -> Vec<String> {
    contacts.iter().map(|c| c.name.clone()).collect()
}
