use web_sys::Storage;

use crate::error::{LiveLinkError, Result};
use crate::host::SessionStore;

use super::helpers::{describe, window};

/// `window.sessionStorage`
pub struct BrowserSessionStore {
    storage: Storage,
}

impl BrowserSessionStore {
    /// `None` when session storage is disabled or blocked
    pub fn open() -> Option<Self> {
        let storage = window().ok()?.session_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl SessionStore for BrowserSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| LiveLinkError::Storage(describe(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| LiveLinkError::Storage(describe(&e)))
    }
}
