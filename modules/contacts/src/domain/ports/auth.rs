use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Identity reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Provider failure. The message is provider-specific and is mapped to a
/// localized text by the domain before reaching the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives the new user id (or `None` on sign-out) on every identity change.
pub type AuthStateListener = Arc<dyn Fn(Option<String>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthListenerHandle(pub u64);

/// Port for the email/password authentication provider.
#[async_trait]
pub trait AuthClient: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;

    fn current_user_id(&self) -> Option<String> {
        self.current_user().map(|u| u.uid)
    }

    /// Register an identity listener. Implementations call it once right away
    /// with the current state.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> AuthListenerHandle;

    fn remove_auth_state_listener(&self, handle: AuthListenerHandle);

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self);

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Re-check the signed-in user's credentials.
    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError>;

    async fn update_profile(&self, display_name: &str) -> Result<(), AuthError>;

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;

    /// Start an email change; takes effect once the new address is verified.
    async fn verify_before_update_email(&self, new_email: &str) -> Result<(), AuthError>;
}
