use once_cell::sync::Lazy;
use regex::Regex;

use crate::contract::model::{ContactDraft, ProfileUpdate};
use crate::domain::error::DomainError;
use crate::domain::messages::Messages;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z].*@.+\..+$").unwrap()
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[0-9]{10}$").unwrap()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Checks run before a contact is written, in the order the form reports them.
pub fn validate_contact(draft: &ContactDraft, messages: &Messages) -> Result<(), DomainError> {
    validate_person(&draft.name, &draft.phone, &draft.email, messages)
}

/// Same rules for the signed-in user's own profile.
pub fn validate_profile(update: &ProfileUpdate, messages: &Messages) -> Result<(), DomainError> {
    validate_person(&update.name, &update.phone, &update.email, messages)
}

fn validate_person(
    name: &str,
    phone: &str,
    email: &str,
    messages: &Messages,
) -> Result<(), DomainError> {
    if name.trim().is_empty() || email.trim().is_empty() || phone.trim().is_empty() {
        return Err(DomainError::validation(messages.incomplete_contact()));
    }
    if !is_valid_email(email) {
        return Err(DomainError::validation(messages.invalid_email()));
    }
    if !is_valid_phone(phone) {
        return Err(DomainError::validation(messages.invalid_phone()));
    }
    Ok(())
}

pub fn validate_new_password(
    password: &str,
    confirmation: &str,
    min_len: usize,
    messages: &Messages,
) -> Result<(), DomainError> {
    if password != confirmation || password.chars().count() < min_len {
        return Err(DomainError::validation(messages.password_mismatch()));
    }
    Ok(())
}
