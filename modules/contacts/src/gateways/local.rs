use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::ContactsApi,
    error::ContactsError,
    model::{Contact, ContactDraft, SavedContact, UserProfile},
};
use crate::domain::service::ContactsService;

/// Local implementation of the ContactsApi trait that delegates to the domain service
pub struct ContactsLocalClient {
    service: Arc<ContactsService>,
}

impl ContactsLocalClient {
    pub fn new(service: Arc<ContactsService>) -> Self {
        Self { service }
    }

    fn ensure_signed_in(&self) -> Result<(), ContactsError> {
        if self.service.view_model().owner_id().is_none() {
            return Err(ContactsError::unauthenticated(
                self.service.messages().not_signed_in(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactsApi for ContactsLocalClient {
    async fn get_contact(&self, id: &str) -> Result<Contact, ContactsError> {
        self.service.load_contact(id).await.map_err(Into::into)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ContactsError> {
        self.ensure_signed_in()?;
        Ok(self.service.view_model().contacts().as_ref().clone())
    }

    async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, ContactsError> {
        self.ensure_signed_in()?;
        Ok(self.service.view_model().filtered_contacts(query))
    }

    async fn save_contact(
        &self,
        id: Option<&str>,
        draft: ContactDraft,
    ) -> Result<SavedContact, ContactsError> {
        self.service.save_contact(id, draft).await.map_err(Into::into)
    }

    async fn delete_contact(&self, id: &str) -> Result<(), ContactsError> {
        self.service.delete_contact(id).await.map_err(Into::into)
    }

    async fn refresh(&self) -> Result<(), ContactsError> {
        self.ensure_signed_in()?;
        self.service.refresh_contacts().await.map_err(Into::into)
    }

    async fn profile(&self) -> Result<UserProfile, ContactsError> {
        self.service.load_display_name().await.map_err(Into::into)
    }
}
