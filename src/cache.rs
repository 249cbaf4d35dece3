//! Thread-local cache of catalog response bodies.
//!
//! Reference lists (makes, models by make, colors, options) change only
//! through the admin pages, so their raw JSON bodies are kept for the life of
//! the tab and re-decoded on each hit. Admin writes invalidate by path prefix.
//!
//! # Cache Key Structure
//! - API path including the query string, e.g. `/api/models/by-make/3/`

use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    /// Survives component lifetimes.
    pub static CACHE_STORE: RefCell<HashMap<String, String>> =
        RefCell::new(HashMap::with_capacity(64));
}

pub fn get(path: &str) -> Option<String> {
    let hit = CACHE_STORE.with(|c| c.borrow().get(path).cloned());
    if hit.is_some() {
        debug!("Cache hit for {}", path);
    }
    hit
}

pub fn put(path: &str, body: &str) {
    CACHE_STORE.with(|c| {
        c.borrow_mut().insert(path.to_string(), body.to_string());
    });
}

/// Drop every entry whose path starts with `prefix`.
pub fn invalidate(prefix: &str) {
    CACHE_STORE.with(|c| c.borrow_mut().retain(|path, _| !path.starts_with(prefix)));
}

pub fn clear() {
    CACHE_STORE.with(|c| c.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_is_by_prefix() {
        clear();
        put("/api/models/by-make/3/", "[]");
        put("/api/models/by-make/4/", "[]");
        put("/api/makes/", "[]");
        invalidate("/api/models/");
        assert_eq!(get("/api/models/by-make/3/"), None);
        assert_eq!(get("/api/makes/").as_deref(), Some("[]"));
    }
}
