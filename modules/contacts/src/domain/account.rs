use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{ProfileUpdate, Registration};
use crate::domain::error::DomainError;
use crate::domain::mapper::{to_fields, UserRecord};
use crate::domain::messages::Messages;
use crate::domain::ports::{
    AuthClient, AuthListenerHandle, DocumentStore, PreferencesStore, StoreError, REMEMBER_USER_KEY,
};
use crate::domain::service::ContactsService;
use crate::domain::validation::{validate_new_password, validate_profile};
use crate::domain::view_model::ContactListViewModel;

/// Session and profile flows: sign-up, sign-in, sign-out, password and
/// profile maintenance. Every successful sign-in attaches the view model to
/// the new user and loads their contacts and display name.
pub struct AccountService {
    auth: Arc<dyn AuthClient>,
    store: Arc<dyn DocumentStore>,
    prefs: Arc<dyn PreferencesStore>,
    contacts: Arc<ContactsService>,
    watcher: Mutex<Option<AuthListenerHandle>>,
}

impl AccountService {
    pub fn new(
        auth: Arc<dyn AuthClient>,
        store: Arc<dyn DocumentStore>,
        prefs: Arc<dyn PreferencesStore>,
        contacts: Arc<ContactsService>,
    ) -> Self {
        Self {
            auth,
            store,
            prefs,
            contacts,
            watcher: Mutex::new(None),
        }
    }

    fn messages(&self) -> &Messages {
        self.contacts.messages()
    }

    fn view_model(&self) -> &Arc<ContactListViewModel> {
        self.contacts.view_model()
    }

    #[instrument(name = "contacts.account.register", skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: Registration) -> Result<(), DomainError> {
        let profile = ProfileUpdate {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
        };
        validate_profile(&profile, self.messages())?;
        if form.password.is_empty() {
            return Err(DomainError::validation(self.messages().missing_credentials()));
        }

        let user = self
            .auth
            .sign_up(&form.email, &form.password)
            .await
            .map_err(|e| {
                debug!("Sign-up rejected: {}", e);
                DomainError::authentication(self.messages().register_error(&e.message))
            })?;

        let record = UserRecord {
            display_name: form.name.clone(),
            email: form.email,
            phone: form.phone,
        };
        self.store
            .set_document(
                &self.contacts.config().users_collection,
                &user.uid,
                to_fields(&record),
            )
            .await
            .map_err(|e| self.store_error(e))?;

        if let Err(e) = self.auth.update_profile(&form.name).await {
            warn!("Could not set provider display name: {}", e);
        }

        self.prefs.set_bool(REMEMBER_USER_KEY, true);
        info!(user_id = %user.uid, "Registered new user");
        self.open_session(&user.uid).await;
        Ok(())
    }

    #[instrument(name = "contacts.account.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> Result<(), DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation(self.messages().missing_credentials()));
        }
        let user = self.auth.sign_in(email, password).await.map_err(|e| {
            debug!("Sign-in rejected: {}", e);
            DomainError::authentication(self.messages().login_error(&e.message))
        })?;

        self.prefs.set_bool(REMEMBER_USER_KEY, remember);
        info!(user_id = %user.uid, "Signed in");
        self.open_session(&user.uid).await;
        Ok(())
    }

    #[instrument(name = "contacts.account.logout", skip(self))]
    pub async fn logout(&self) {
        self.auth.sign_out().await;
        self.prefs.set_bool(REMEMBER_USER_KEY, false);
        self.view_model().detach();
        self.view_model().set_display_name("");
        info!("Signed out");
    }

    /// Resume a remembered session at startup. Returns whether a user is signed in.
    ///
    /// A provider session without the remember flag is closed.
    #[instrument(name = "contacts.account.restore_session", skip(self))]
    pub async fn restore_session(&self) -> bool {
        let Some(user) = self.auth.current_user() else {
            return false;
        };
        if self.prefs.get_bool(REMEMBER_USER_KEY) {
            info!(user_id = %user.uid, "Restoring remembered session");
            self.open_session(&user.uid).await;
            true
        } else {
            debug!("Session not remembered, signing out");
            self.logout().await;
            false
        }
    }

    /// Keep the view model attached to whoever the provider reports as signed
    /// in. Replaces a previous watcher.
    pub fn watch_auth_state(&self) {
        let weak = Arc::downgrade(self.view_model());
        let handle = self.auth.on_auth_state_changed(Arc::new(move |uid: Option<String>| {
            let Some(view_model) = weak.upgrade() else {
                return;
            };
            if view_model.owner_id() != uid {
                view_model.attach_to_user(uid.as_deref());
            }
        }));
        let previous = self.watcher.lock().replace(handle);
        if let Some(previous) = previous {
            self.auth.remove_auth_state_listener(previous);
        }
    }

    pub fn stop_watching(&self) {
        let handle = self.watcher.lock().take();
        if let Some(handle) = handle {
            self.auth.remove_auth_state_listener(handle);
        }
    }

    /// Send a reset link; returns the confirmation text.
    #[instrument(name = "contacts.account.reset_password", skip(self))]
    pub async fn reset_password(&self, email: &str) -> Result<&'static str, DomainError> {
        self.auth.send_password_reset(email).await.map_err(|e| {
            DomainError::authentication(self.messages().password_reset_failed(&e.message))
        })?;
        Ok(self.messages().password_reset_sent())
    }

    /// Confirm the signed-in user's password before a sensitive change.
    #[instrument(name = "contacts.account.reauthenticate", skip(self, password))]
    pub async fn reauthenticate(&self, password: &str) -> Result<(), DomainError> {
        let user = self
            .auth
            .current_user()
            .ok_or_else(|| DomainError::not_signed_in(self.messages().not_signed_in()))?;
        let email = user
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| DomainError::authentication(self.messages().missing_user_email()))?;
        if password.trim().is_empty() {
            return Err(DomainError::validation(self.messages().enter_password()));
        }
        self.auth
            .reauthenticate(&email, password)
            .await
            .map_err(|e| DomainError::authentication(self.messages().login_error(&e.message)))
    }

    /// Returns the confirmation text.
    #[instrument(name = "contacts.account.update_password", skip_all)]
    pub async fn update_password(
        &self,
        new_password: &str,
        confirmation: &str,
    ) -> Result<&'static str, DomainError> {
        validate_new_password(
            new_password,
            confirmation,
            self.contacts.config().min_password_length,
            self.messages(),
        )?;
        if self.auth.current_user().is_none() {
            return Err(DomainError::not_signed_in(self.messages().not_signed_in()));
        }
        self.auth.update_password(new_password).await.map_err(|e| {
            DomainError::authentication(self.messages().password_update_failed(&e.message))
        })?;
        info!("Password updated");
        Ok(self.messages().password_updated())
    }

    /// Update the user record and display name.
    ///
    /// An email change only starts the provider's verification flow; the
    /// outcome of that step is returned as a notice and never fails the call.
    #[instrument(name = "contacts.account.update_profile", skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Option<String>, DomainError> {
        let user = self
            .auth
            .current_user()
            .ok_or_else(|| DomainError::not_signed_in(self.messages().not_signed_in()))?;
        validate_profile(&update, self.messages())?;

        let record = UserRecord {
            display_name: update.name.clone(),
            email: update.email.clone(),
            phone: update.phone.clone(),
        };
        self.store
            .update_document(
                &self.contacts.config().users_collection,
                &user.uid,
                to_fields(&record),
            )
            .await
            .map_err(|e| self.store_error(e))?;

        if let Err(e) = self.auth.update_profile(&update.name).await {
            warn!("Could not set provider display name: {}", e);
        }
        self.view_model().set_display_name(update.name);

        let email_changed = user.email.as_deref().is_some_and(|current| current != update.email);
        if !email_changed {
            return Ok(None);
        }
        let notice = match self.auth.verify_before_update_email(&update.email).await {
            Ok(()) => self.messages().email_verification_sent().to_owned(),
            Err(e) => {
                warn!("Email change rejected: {}", e);
                self.messages().email_update_failed(&e.message)
            }
        };
        Ok(Some(notice))
    }

    /// Attach to `uid` (unless already attached) and load their data.
    /// Load failures are logged; the session itself stays open.
    async fn open_session(&self, uid: &str) {
        let view_model = self.view_model();
        if view_model.owner_id().as_deref() != Some(uid) {
            view_model.attach_to_user(Some(uid));
        }
        if let Err(e) = self.contacts.refresh_contacts().await {
            warn!("Initial contacts load failed: {}", e);
        }
        if let Err(e) = self.contacts.load_display_name().await {
            warn!("Display name load failed: {}", e);
            view_model.set_display_name(self.messages().default_user_name());
        }
    }

    fn store_error(&self, error: StoreError) -> DomainError {
        DomainError::store(self.messages().store_failure(&error.to_string()))
    }
}

impl Drop for AccountService {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.get_mut().take() {
            self.auth.remove_auth_state_listener(handle);
        }
    }
}
