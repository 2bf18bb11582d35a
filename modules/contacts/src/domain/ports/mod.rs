pub mod auth;
pub mod image;
pub mod store;

pub use auth::{AuthClient, AuthError, AuthListenerHandle, AuthStateListener, AuthUser};
pub use image::{ImageError, ImageProcessor, ImageSource};
pub use store::{
    Document, DocumentStore, FieldFilter, Fields, Snapshot, SnapshotListener, StoreError,
    SubscriptionHandle,
};

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// Small key/value store for device-local flags such as "remember me".
pub trait PreferencesStore: Send + Sync {
    fn get_bool(&self, key: &str) -> bool;
    fn set_bool(&self, key: &str, value: bool);
}

pub const REMEMBER_USER_KEY: &str = "remember_user";
