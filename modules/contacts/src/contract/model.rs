/// A contact owned by exactly one user.
///
/// `id` is assigned by the document store and stays empty until the contact
/// has been persisted. `image_data` is either empty or an inline base64 picture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub image_data: String,
    pub owner_id: String,
}

impl Contact {
    pub fn has_image(&self) -> bool {
        !self.image_data.is_empty()
    }

    /// Case-insensitive substring match on name, phone or email.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.name, &self.phone, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Form data for creating or editing a contact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Raw picture bytes as captured; processed before storage.
    pub image: Option<Vec<u8>>,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedContact {
    pub id: String,
    /// Set when the picture could not be processed and the contact was stored without it.
    pub image_warning: Option<String>,
}

/// Cached profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProfile {
    pub display_name: String,
}

/// Sign-up form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Profile edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub phone: String,
}
