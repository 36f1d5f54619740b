//! `localStorage` / `sessionStorage` adapter for the core record store.

use roombook_core::{KeyValueStore, StoreError};
use wasm_bindgen::{JsCast, JsValue};

/// Which of the two browser storage areas to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// Shared by every tab of the origin, survives restarts
    Local,
    /// Scoped to the tab, cleared when it closes
    Session,
}

pub struct BrowserStorage {
    storage: web_sys::Storage,
    area: StorageArea,
}

impl BrowserStorage {
    pub fn open(area: StorageArea) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
        let storage = match area {
            StorageArea::Local => window.local_storage()?,
            StorageArea::Session => window.session_storage()?,
        };
        let storage = storage.ok_or_else(|| JsValue::from_str("web storage is disabled"))?;
        Ok(Self { storage, area })
    }

    pub fn local() -> Result<Self, JsValue> {
        Self::open(StorageArea::Local)
    }

    pub fn session() -> Result<Self, JsValue> {
        Self::open(StorageArea::Session)
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        // A throwing getItem (e.g. storage blocked by privacy settings) reads as absent
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| backend_error(key, &err))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|err| backend_error(key, &err))
    }
}

fn backend_error(key: &str, err: &JsValue) -> StoreError {
    StoreError::Backend {
        key: key.to_string(),
        message: describe_js_error(err),
    }
}

/// Best-effort message for a thrown JS value (quota errors are DOMExceptions)
fn describe_js_error(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{err:?}"))
}
