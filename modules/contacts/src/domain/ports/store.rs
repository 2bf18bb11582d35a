use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by the store: opaque id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String value of `field`, `None` when absent or not a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Equality filter `field == value`, the only query shape the domain needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        document.get_str(&self.field) == Some(self.value.as_str())
    }
}

/// Handle of a realtime listener, released through [`DocumentStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("network unavailable: {0}")]
    Unavailable(String),

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Backend(String),
}

/// One realtime delivery: the full filtered collection, or a feed error.
pub type Snapshot = Result<Vec<Document>, StoreError>;

/// Callback invoked for every realtime delivery of a subscription.
pub type SnapshotListener = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// Port for the document database: realtime listeners plus one-shot CRUD.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a realtime listener on `collection` restricted by `filter`.
    ///
    /// Setup is fire-and-forget: results arrive later through `on_event`
    /// (possibly before this call returns).
    fn subscribe(
        &self,
        collection: &str,
        filter: FieldFilter,
        on_event: SnapshotListener,
    ) -> Result<SubscriptionHandle, StoreError>;

    /// Release a listener. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);

    async fn query(&self, collection: &str, filter: &FieldFilter)
        -> Result<Vec<Document>, StoreError>;

    async fn get_document(&self, collection: &str, id: &str)
        -> Result<Option<Document>, StoreError>;

    /// Insert with a store-assigned id, which is returned.
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Create or fully replace the document `id`.
    async fn set_document(&self, collection: &str, id: &str, fields: Fields)
        -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
