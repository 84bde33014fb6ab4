//! `window.localStorage` behind the [`Storage`] trait.

use crate::core::error::{ConnectError, Result};
use crate::core::storage::Storage;

pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// `None` when there is no window or storage access is denied
    /// (sandboxed iframes, some private modes).
    pub fn open() -> Option<Self> {
        let inner = web_sys::window()?.local_storage().ok()??;
        Some(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|e| ConnectError::Storage(format!("set {}: {:?}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner
            .remove_item(key)
            .map_err(|e| ConnectError::Storage(format!("remove {}: {:?}", key, e)))
    }
}
