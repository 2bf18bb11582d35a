use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    AuthClient, AuthError, AuthListenerHandle, AuthStateListener, AuthUser,
};

// Provider texts, matched by the domain's error mapping.
const BADLY_FORMATTED: &str = "The email address is badly formatted.";
const WEAK_PASSWORD: &str =
    "The given password is invalid. [ Password should be at least 6 characters ]";
const EMAIL_IN_USE: &str = "The email address is already in use by another account.";
const BAD_CREDENTIALS: &str = "The supplied auth credential is incorrect, malformed or has expired.";
const NO_SUCH_USER: &str = "There is no user record corresponding to this identifier.";
const NO_CURRENT_USER: &str = "No user is currently signed in.";
const NETWORK: &str =
    "A network error (such as timeout, interrupted connection or unreachable host) has occurred.";

const MIN_PASSWORD_LEN: usize = 6;

/// Email/password provider kept in process memory.
///
/// Identity listeners are called synchronously after the state lock is
/// released. `set_offline(true)` makes every remote call fail with the
/// provider's network error.
pub struct InMemoryAuthClient {
    state: Mutex<State>,
    next_listener: AtomicU64,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    current: Option<String>,
    listeners: HashMap<u64, AuthStateListener>,
    offline: bool,
    sent_resets: Vec<String>,
    pending_email: Option<String>,
}

#[derive(Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: Option<String>,
}

impl Account {
    fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
        }
    }
}

impl State {
    fn current_account(&self) -> Option<&Account> {
        let uid = self.current.as_deref()?;
        self.accounts.values().find(|a| a.uid == uid)
    }

    fn current_account_mut(&mut self) -> Result<&mut Account, AuthError> {
        let uid = self
            .current
            .clone()
            .ok_or_else(|| AuthError::new(NO_CURRENT_USER))?;
        self.accounts
            .values_mut()
            .find(|a| a.uid == uid)
            .ok_or_else(|| AuthError::new(NO_CURRENT_USER))
    }

    fn online(&self) -> Result<(), AuthError> {
        if self.offline {
            Err(AuthError::new(NETWORK))
        } else {
            Ok(())
        }
    }

    fn listeners(&self) -> Vec<AuthStateListener> {
        self.listeners.values().cloned().collect()
    }
}

impl Default for InMemoryAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthClient {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Addresses that were sent a reset link, oldest first.
    pub fn sent_password_resets(&self) -> Vec<String> {
        self.state.lock().sent_resets.clone()
    }

    /// Address waiting for verification after `verify_before_update_email`.
    pub fn pending_email(&self) -> Option<String> {
        self.state.lock().pending_email.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    fn switch_user(&self, uid: Option<String>) {
        let listeners = {
            let mut state = self.state.lock();
            state.current = uid.clone();
            state.listeners()
        };
        for listener in listeners {
            listener(uid.clone());
        }
    }
}

fn well_formed(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

fn key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthClient for InMemoryAuthClient {
    fn current_user(&self) -> Option<AuthUser> {
        self.state.lock().current_account().map(Account::user)
    }

    fn on_auth_state_changed(&self, listener: AuthStateListener) -> AuthListenerHandle {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let current = {
            let mut state = self.state.lock();
            state.listeners.insert(id, listener.clone());
            state.current.clone()
        };
        listener(current);
        AuthListenerHandle(id)
    }

    fn remove_auth_state_listener(&self, handle: AuthListenerHandle) {
        self.state.lock().listeners.remove(&handle.0);
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = {
            let mut state = self.state.lock();
            state.online()?;
            if !well_formed(email) {
                return Err(AuthError::new(BADLY_FORMATTED));
            }
            if password.chars().count() < MIN_PASSWORD_LEN {
                return Err(AuthError::new(WEAK_PASSWORD));
            }
            if state.accounts.contains_key(&key(email)) {
                return Err(AuthError::new(EMAIL_IN_USE));
            }
            let account = Account {
                uid: Uuid::new_v4().simple().to_string(),
                email: email.trim().to_owned(),
                password: password.to_owned(),
                display_name: None,
            };
            let user = account.user();
            state.accounts.insert(key(email), account);
            user
        };
        info!(user_id = %user.uid, "Account created");
        self.switch_user(Some(user.uid.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = {
            let state = self.state.lock();
            state.online()?;
            if !well_formed(email) {
                return Err(AuthError::new(BADLY_FORMATTED));
            }
            match state.accounts.get(&key(email)) {
                Some(account) if account.password == password => account.user(),
                _ => return Err(AuthError::new(BAD_CREDENTIALS)),
            }
        };
        debug!(user_id = %user.uid, "Signed in");
        self.switch_user(Some(user.uid.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        if self.state.lock().current.is_some() {
            self.switch_user(None);
        }
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        state.online()?;
        if !well_formed(email) {
            return Err(AuthError::new(BADLY_FORMATTED));
        }
        if !state.accounts.contains_key(&key(email)) {
            return Err(AuthError::new(NO_SUCH_USER));
        }
        state.sent_resets.push(email.trim().to_owned());
        Ok(())
    }

    async fn reauthenticate(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let state = self.state.lock();
        state.online()?;
        let account = state
            .current_account()
            .ok_or_else(|| AuthError::new(NO_CURRENT_USER))?;
        if key(&account.email) == key(email) && account.password == password {
            Ok(())
        } else {
            Err(AuthError::new(BAD_CREDENTIALS))
        }
    }

    async fn update_profile(&self, display_name: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        state.online()?;
        state.current_account_mut()?.display_name = Some(display_name.to_owned());
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        state.online()?;
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(WEAK_PASSWORD));
        }
        state.current_account_mut()?.password = new_password.to_owned();
        Ok(())
    }

    async fn verify_before_update_email(&self, new_email: &str) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        state.online()?;
        state.current_account_mut()?;
        if !well_formed(new_email) {
            return Err(AuthError::new(BADLY_FORMATTED));
        }
        if state.accounts.contains_key(&key(new_email)) {
            return Err(AuthError::new(EMAIL_IN_USE));
        }
        state.pending_email = Some(new_email.trim().to_owned());
        Ok(())
    }
}
