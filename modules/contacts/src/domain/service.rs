use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{Contact, ContactDraft, SavedContact, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::mapper::{
    contact_from_document, to_fields, user_record_from_document, ContactDocument, FIELD_IMAGE_DATA,
    FIELD_OWNER_ID,
};
use crate::domain::messages::{Locale, Messages};
use crate::domain::ports::{
    AuthClient, DocumentStore, FieldFilter, ImageError, ImageProcessor, ImageSource, StoreError,
};
use crate::domain::validation::validate_contact;
use crate::domain::view_model::ContactListViewModel;

/// Contact CRUD on top of the document store, keeping the view model in sync.
#[derive(Clone)]
pub struct ContactsService {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthClient>,
    images: Arc<dyn ImageProcessor>,
    camera: Arc<dyn ImageSource>,
    view_model: Arc<ContactListViewModel>,
    messages: Messages,
    config: ServiceConfig,
}

/// Configuration shared by the domain services
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub locale: Locale,
    pub contacts_collection: String,
    pub users_collection: String,
    pub max_image_dimension: u32,
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            contacts_collection: "contacts".to_owned(),
            users_collection: "users".to_owned(),
            max_image_dimension: 500,
            min_password_length: 6,
        }
    }
}

impl ContactsService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthClient>,
        images: Arc<dyn ImageProcessor>,
        camera: Arc<dyn ImageSource>,
        view_model: Arc<ContactListViewModel>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            auth,
            images,
            camera,
            view_model,
            messages: Messages::new(config.locale),
            config,
        }
    }

    pub fn view_model(&self) -> &Arc<ContactListViewModel> {
        &self.view_model
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Create (`contact_id == None`) or edit a contact of the signed-in user.
    ///
    /// A picture that cannot be processed does not fail the save: the contact
    /// is written without it and the returned value carries a warning.
    #[instrument(name = "contacts.service.save_contact", skip(self, draft), fields(contact_id = ?contact_id))]
    pub async fn save_contact(
        &self,
        contact_id: Option<&str>,
        draft: ContactDraft,
    ) -> Result<SavedContact, DomainError> {
        let owner = self.require_user()?;
        validate_contact(&draft, &self.messages)?;

        let (image_data, image_warning) = match draft.image.as_deref() {
            None => (None, None),
            Some(bytes) => match self.prepare_image(bytes) {
                Ok(data) => (Some(data), None),
                Err(e) => {
                    warn!("Storing contact without picture: {}", e);
                    (None, Some(self.messages.image_unusable().to_owned()))
                }
            },
        };

        let document = ContactDocument {
            name: draft.name,
            phone: draft.phone,
            email: draft.email,
            image_data: image_data.clone().unwrap_or_default(),
            owner_id: owner.clone(),
        };

        let collection = &self.config.contacts_collection;
        let id = match contact_id.filter(|id| !id.is_empty()) {
            None => {
                let id = self
                    .store
                    .add_document(collection, to_fields(&document))
                    .await
                    .map_err(|e| self.store_error(e))?;
                info!(contact_id = %id, "Created contact");
                id
            }
            Some(id) => {
                self.owned_contact(id, &owner).await?;
                let mut fields = to_fields(&document);
                if image_data.is_none() {
                    // Leave the stored picture untouched.
                    fields.remove(FIELD_IMAGE_DATA);
                }
                self.store
                    .update_document(collection, id, fields)
                    .await
                    .map_err(|e| self.store_error(e))?;
                info!("Updated contact");
                id.to_owned()
            }
        };

        self.refresh_after_write().await;
        Ok(SavedContact { id, image_warning })
    }

    /// Contact `id` for the edit form.
    #[instrument(name = "contacts.service.load_contact", skip(self))]
    pub async fn load_contact(&self, id: &str) -> Result<Contact, DomainError> {
        let owner = self.require_user()?;
        self.owned_contact(id, &owner).await
    }

    #[instrument(name = "contacts.service.delete_contact", skip(self))]
    pub async fn delete_contact(&self, id: &str) -> Result<(), DomainError> {
        let owner = self.require_user()?;
        self.owned_contact(id, &owner).await?;
        self.store
            .delete_document(&self.config.contacts_collection, id)
            .await
            .map_err(|e| self.store_error(e))?;
        info!("Deleted contact");
        self.refresh_after_write().await;
        Ok(())
    }

    /// Re-read the attached owner's contacts with a one-shot query.
    ///
    /// The result is dropped when the view model moved on while the query
    /// was running (new attachment or a newer realtime snapshot).
    #[instrument(name = "contacts.service.refresh_contacts", skip(self))]
    pub async fn refresh_contacts(&self) -> Result<(), DomainError> {
        let Some((ticket, owner)) = self.view_model.refresh_ticket() else {
            debug!("Not attached, nothing to refresh");
            return Ok(());
        };
        let documents = self
            .store
            .query(
                &self.config.contacts_collection,
                &FieldFilter::eq(FIELD_OWNER_ID, owner),
            )
            .await
            .map_err(|e| self.store_error(e))?;
        let contacts: Vec<Contact> = documents.iter().filter_map(contact_from_document).collect();
        let count = contacts.len();
        if self.view_model.apply_refresh(ticket, contacts) {
            debug!(count, "Refreshed contacts");
        } else {
            debug!("Refresh superseded");
        }
        Ok(())
    }

    /// Read the signed-in user's profile and publish its display name to the view model.
    #[instrument(name = "contacts.service.load_display_name", skip(self))]
    pub async fn load_display_name(&self) -> Result<UserProfile, DomainError> {
        let uid = self.require_user()?;
        let record = self
            .store
            .get_document(&self.config.users_collection, &uid)
            .await
            .map_err(|e| self.store_error(e))?;
        let name = record
            .as_ref()
            .and_then(user_record_from_document)
            .map(|r| r.display_name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.messages.default_user_name().to_owned());
        self.view_model.set_display_name(name.clone());
        Ok(UserProfile { display_name: name })
    }

    /// Picture bytes of `contact`, `None` when it has none or it cannot be decoded.
    pub fn contact_image(&self, contact: &Contact) -> Option<Vec<u8>> {
        if !contact.has_image() {
            return None;
        }
        match self.images.decode_inline(&contact.image_data) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(contact_id = %contact.id, "Unreadable contact picture: {}", e);
                None
            }
        }
    }

    #[instrument(name = "contacts.service.capture_contact_image", skip(self))]
    pub async fn capture_contact_image(&self) -> Result<Vec<u8>, DomainError> {
        self.camera.capture_image().await.map_err(|e| {
            warn!("Camera capture failed: {}", e);
            match e {
                ImageError::PermissionDenied => {
                    DomainError::image(self.messages.camera_permission_denied())
                }
                _ => DomainError::image(self.messages.capture_failed()),
            }
        })
    }

    // --- helpers ---

    fn require_user(&self) -> Result<String, DomainError> {
        self.auth
            .current_user_id()
            .ok_or_else(|| DomainError::not_signed_in(self.messages.not_signed_in()))
    }

    async fn owned_contact(&self, id: &str, owner: &str) -> Result<Contact, DomainError> {
        let document = self
            .store
            .get_document(&self.config.contacts_collection, id)
            .await
            .map_err(|e| self.store_error(e))?;
        match document.as_ref().and_then(contact_from_document) {
            Some(contact) if contact.owner_id == owner => Ok(contact),
            Some(_) => {
                warn!(contact_id = %id, "Contact belongs to another user");
                Err(DomainError::contact_not_found(id, self.messages.contact_not_found()))
            }
            None => Err(DomainError::contact_not_found(id, self.messages.contact_not_found())),
        }
    }

    fn prepare_image(&self, bytes: &[u8]) -> Result<String, ImageError> {
        let upright = self.images.correct_orientation(bytes)?;
        let resized = self
            .images
            .resize(&upright, self.config.max_image_dimension)?;
        Ok(self.images.encode_inline(&resized))
    }

    /// A failed refresh after a successful write only leaves the list stale.
    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh_contacts().await {
            warn!("Refresh after write failed: {}", e);
        }
    }

    pub(crate) fn store_error(&self, error: StoreError) -> DomainError {
        match error {
            StoreError::NotFound { id, .. } => {
                DomainError::contact_not_found(id, self.messages.contact_not_found())
            }
            other => DomainError::store(self.messages.store_failure(&other.to_string())),
        }
    }
}
