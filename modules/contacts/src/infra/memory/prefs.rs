use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::ports::PreferencesStore;

/// Device-local flags kept in process memory. Unset keys read as `false`.
#[derive(Default)]
pub struct InMemoryPreferences {
    flags: RwLock<HashMap<String, bool>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferencesStore for InMemoryPreferences {
    fn get_bool(&self, key: &str) -> bool {
        self.flags.read().get(key).copied().unwrap_or(false)
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.flags.write().insert(key.to_owned(), value);
    }
}
