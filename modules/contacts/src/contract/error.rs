use thiserror::Error;

/// Errors that are safe to expose to consumers.
///
/// Every variant carries a message that can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactsError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("{message}")]
    NotFound { id: String, message: String },

    #[error("{message}")]
    Unavailable { message: String },
}

impl ContactsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// The presentable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Unauthenticated { message }
            | Self::NotFound { message, .. }
            | Self::Unavailable { message } => message,
        }
    }
}

impl From<crate::domain::error::DomainError> for ContactsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { message } | Image { message } => Self::validation(message),
            NotSignedIn { message } | Authentication { message } => {
                Self::unauthenticated(message)
            }
            ContactNotFound { id, message } => Self::not_found(id, message),
            Store { message } => Self::unavailable(message),
        }
    }
}
