//! In-process backends for the demo binary and tests.

pub mod auth;
pub mod prefs;
pub mod store;

pub use auth::InMemoryAuthClient;
pub use prefs::InMemoryPreferences;
pub use store::InMemoryDocumentStore;
