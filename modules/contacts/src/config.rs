use serde::{Deserialize, Serialize};

use crate::domain::messages::Locale;
use crate::domain::service::ServiceConfig;

/// Configuration for the contacts module (`modules.contacts`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactsConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_contacts_collection")]
    pub contacts_collection: String,
    #[serde(default = "default_users_collection")]
    pub users_collection: String,
    /// Longer side of a stored contact picture, in pixels.
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Capacity of the view-model event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            contacts_collection: default_contacts_collection(),
            users_collection: default_users_collection(),
            max_image_dimension: default_max_image_dimension(),
            jpeg_quality: default_jpeg_quality(),
            min_password_length: default_min_password_length(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ContactsConfig {
    /// Read the module section from the raw `modules.contacts` value.
    /// A missing section yields the defaults.
    pub fn from_module_value(value: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid modules.contacts config: {e}")),
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            locale: self.locale,
            contacts_collection: self.contacts_collection.clone(),
            users_collection: self.users_collection.clone(),
            max_image_dimension: self.max_image_dimension,
            min_password_length: self.min_password_length,
        }
    }
}

fn default_contacts_collection() -> String {
    "contacts".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_max_image_dimension() -> u32 {
    500
}

fn default_jpeg_quality() -> u8 {
    80
}

fn default_min_password_length() -> usize {
    6
}

fn default_event_buffer() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_section_uses_defaults() {
        let cfg = ContactsConfig::from_module_value(None).unwrap();
        assert_eq!(cfg, ContactsConfig::default());
        assert_eq!(cfg.max_image_dimension, 500);
        assert_eq!(cfg.jpeg_quality, 80);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let v = json!({ "locale": "es", "max_image_dimension": 320 });
        let cfg = ContactsConfig::from_module_value(Some(&v)).unwrap();
        assert_eq!(cfg.locale, Locale::Es);
        assert_eq!(cfg.max_image_dimension, 320);
        assert_eq!(cfg.contacts_collection, "contacts");
        assert_eq!(cfg.service_config().max_image_dimension, 320);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let v = json!({ "colour": "blue" });
        assert!(ContactsConfig::from_module_value(Some(&v)).is_err());
    }
}
