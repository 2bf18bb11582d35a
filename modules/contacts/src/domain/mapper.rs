//! Document shapes stored in the `contacts` and `users` collections and their
//! conversion to domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::model::Contact;
use crate::domain::ports::{Document, Fields};

pub const FIELD_OWNER_ID: &str = "ownerId";
pub const FIELD_IMAGE_DATA: &str = "imageData";
pub const FIELD_DISPLAY_NAME: &str = "displayName";

/// Wire shape of a contact document. Missing fields read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDocument {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub image_data: String,
    pub owner_id: String,
}

/// Wire shape of a user record, keyed by the user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub display_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDocument {
    pub fn into_contact(self, id: impl Into<String>) -> Contact {
        Contact {
            id: id.into(),
            name: self.name,
            phone: self.phone,
            email: self.email,
            image_data: self.image_data,
            owner_id: self.owner_id,
        }
    }
}

impl From<&Contact> for ContactDocument {
    fn from(c: &Contact) -> Self {
        Self {
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            image_data: c.image_data.clone(),
            owner_id: c.owner_id.clone(),
        }
    }
}

/// Map a stored document to a contact; `None` when a field has the wrong type.
pub fn contact_from_document(document: &Document) -> Option<Contact> {
    serde_json::from_value::<ContactDocument>(Value::Object(document.fields.clone()))
        .ok()
        .map(|d| d.into_contact(document.id.clone()))
}

pub fn user_record_from_document(document: &Document) -> Option<UserRecord> {
    serde_json::from_value(Value::Object(document.fields.clone())).ok()
}

/// Serialize any of the document shapes into a field map.
pub fn to_fields<T: Serialize>(value: &T) -> Fields {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Fields::new(),
    }
}
