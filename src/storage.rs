use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

// 1. TabStorage Contract
/// TabStorage
///
/// Defines the abstract contract for the tab-scoped key-value store that holds the
/// serialized session record. Values live as long as the browser tab (or the process,
/// for the in-memory implementation) and are never written anywhere else.
///
/// The trait lets the session service run against real tab storage in a browser host
/// and against `MemoryTabStorage` in headless runs and tests.
pub trait TabStorage: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: String);

    /// Removes `key`. Removing an absent key is a no-op.
    fn remove_item(&self, key: &str);
}

// 2. The In-Memory Implementation
/// MemoryTabStorage
///
/// A `HashMap` behind a mutex. Used by the headless shell and by every test that needs
/// a session to exist (or to be corrupt) without a browser.
#[derive(Default)]
pub struct MemoryTabStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing serialization. Lets tests plant corrupt records.
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.set_item(key, value.to_string());
        storage
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TabStorage for MemoryTabStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: String) {
        self.lock().insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// TabStorageState
///
/// The concrete type used to share tab storage between the session service and the host.
pub type TabStorageState = Arc<dyn TabStorage>;
