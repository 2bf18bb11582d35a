use thiserror::Error;

/// Domain-specific errors using thiserror.
///
/// Messages are already localized: they are built at the call site from
/// [`Messages`](crate::domain::messages::Messages) so every failure can be
/// shown to the user without further mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotSignedIn { message: String },

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    ContactNotFound { id: String, message: String },

    #[error("{message}")]
    Store { message: String },

    #[error("{message}")]
    Image { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_signed_in(message: impl Into<String>) -> Self {
        Self::NotSignedIn {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn contact_not_found(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContactNotFound {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn image(message: impl Into<String>) -> Self {
        Self::Image {
            message: message.into(),
        }
    }
}
