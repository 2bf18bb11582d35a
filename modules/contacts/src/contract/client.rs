use async_trait::async_trait;

use crate::contract::{
    error::ContactsError,
    model::{Contact, ContactDraft, SavedContact, UserProfile},
};

/// Public API trait for the contacts module that other crates can use
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Load a single contact owned by the signed-in user
    async fn get_contact(&self, id: &str) -> Result<Contact, ContactsError>;

    /// Current local contact list, in feed order
    async fn list_contacts(&self) -> Result<Vec<Contact>, ContactsError>;

    /// Contacts whose name, phone or email contains `query` (case-insensitive)
    async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, ContactsError>;

    /// Create (`id == None`) or edit a contact
    async fn save_contact(
        &self,
        id: Option<&str>,
        draft: ContactDraft,
    ) -> Result<SavedContact, ContactsError>;

    /// Delete a contact by ID
    async fn delete_contact(&self, id: &str) -> Result<(), ContactsError>;

    /// Re-read the contact list from the store
    async fn refresh(&self) -> Result<(), ContactsError>;

    /// Profile of the signed-in user, with the default name when none is stored
    async fn profile(&self) -> Result<UserProfile, ContactsError>;
}
