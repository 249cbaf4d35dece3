//! String key-value storage port and its browser/in-memory backends.
//!
//! Everything that persists state in the tab (activity tracking, last search,
//! favorites, auth token) goes through [`KeyValueStore`] so the logic can be
//! exercised against [`MemoryStore`] without a browser.

use crate::config::FAVORITES_COOKIE_MAX_AGE_SECS;
use crate::error::StorageError;
use gloo_storage::{LocalStorage, Storage};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// Read a JSON value. Missing keys and unparsable content both yield `None`.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt value under {}: {}", key, e);
            None
        }
    }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// `window.localStorage`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}

/// `document.cookie`, one cookie per key. Values are percent-encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CookieStore;

impl CookieStore {
    fn document() -> Result<web_sys::HtmlDocument, StorageError> {
        gloo_utils::document()
            .dyn_into::<web_sys::HtmlDocument>()
            .map_err(|_| StorageError::Unavailable)
    }
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        let header = Self::document().ok()?.cookie().ok()?;
        find_cookie(&header, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::document()?
            .set_cookie(&format_cookie(key, value, FAVORITES_COOKIE_MAX_AGE_SECS))
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{:?}", e),
            })
    }

    fn remove(&self, key: &str) {
        if let Ok(doc) = Self::document() {
            let _ = doc.set_cookie(&format_cookie(key, "", 0));
        }
    }
}

/// Pick `name` out of a `document.cookie` header and decode its value.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .and_then(|(_, v)| urlencoding::decode(v).ok().map(|v| v.into_owned()))
}

pub fn format_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!(
        "{}={};max-age={};path=/;SameSite=Lax",
        name,
        urlencoding::encode(value),
        max_age_secs
    )
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_json_reads_as_absent() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        assert_eq!(load_json::<Vec<u32>, _>(&store, "k"), None);
    }

    #[test]
    fn json_values_survive_the_store() {
        let store = MemoryStore::new();
        save_json(&store, "ids", &vec![3u32, 1, 2]).unwrap();
        assert_eq!(load_json::<Vec<u32>, _>(&store, "ids"), Some(vec![3, 1, 2]));
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("a", "1").unwrap();
        assert_eq!(other.get("a").as_deref(), Some("1"));
        other.remove("a");
        assert!(store.is_empty());
    }

    #[test]
    fn cookie_lookup_decodes_value() {
        let header = "lang=sq; car_favorites=%5B1%2C2%5D; other=x";
        assert_eq!(find_cookie(header, "car_favorites").as_deref(), Some("[1,2]"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn cookie_format_encodes_and_expires() {
        let cookie = format_cookie("car_favorites", "[1,2]", 0);
        assert_eq!(cookie, "car_favorites=%5B1%2C2%5D;max-age=0;path=/;SameSite=Lax");
    }
}
