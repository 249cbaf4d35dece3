//! URL query-string form of a [`FilterRecord`] and access to the address bar.
//!
//! Scalars are flat `key=value` pairs; the options set is written as repeated
//! `options[]=id` entries. Encoding is `application/x-www-form-urlencoded`,
//! the same as `URLSearchParams`.

use crate::filters::{FilterKey, FilterRecord};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use url::form_urlencoded;
use wasm_bindgen::JsValue;

const ARRAY_SUFFIX: &str = "[]";

pub fn encode(record: &FilterRecord) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in record.iter() {
        serializer.append_pair(key, value);
    }
    let options_key = format!("{}{}", FilterKey::Options.as_str(), ARRAY_SUFFIX);
    for id in record.options() {
        serializer.append_pair(&options_key, id);
    }
    serializer.finish()
}

pub fn decode(query: &str) -> FilterRecord {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut record = FilterRecord::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.strip_suffix(ARRAY_SUFFIX) {
            Some(base) if base == FilterKey::Options.as_str() => record.add_option(value.into_owned()),
            Some(base) => debug!("Ignoring unsupported array parameter {}[]", base),
            None => record.set(&key, &value),
        }
    }
    record.enforce_cascade();
    record
}

/// Whether a query string carries any parameter at all.
pub fn has_params(query: &str) -> bool {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes()).next().is_some()
}

/// Read and rewrite the query string of the current page.
pub trait UrlState {
    fn query(&self) -> String;
    fn push_query(&self, query: &str);
}

/// The browser's address bar, rewritten through `history.pushState`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserUrl;

impl UrlState for BrowserUrl {
    fn query(&self) -> String {
        gloo_utils::window().location().search().unwrap_or_default()
    }

    fn push_query(&self, query: &str) {
        let window = gloo_utils::window();
        let path = window.location().pathname().unwrap_or_else(|_| "/".to_string());
        let target = if query.is_empty() {
            path
        } else {
            format!("{}?{}", path, query)
        };
        if let Ok(history) = window.history() {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(&target)) {
                log::warn!("Failed to update the address bar: {:?}", e);
            }
        }
    }
}

/// Address bar stand-in that records every pushed query.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrl {
    current: Rc<RefCell<String>>,
    pushed: Rc<RefCell<Vec<String>>>,
}

impl MemoryUrl {
    pub fn new(query: &str) -> Self {
        Self {
            current: Rc::new(RefCell::new(query.to_string())),
            pushed: Rc::default(),
        }
    }

    pub fn pushed(&self) -> Vec<String> {
        self.pushed.borrow().clone()
    }
}

impl UrlState for MemoryUrl {
    fn query(&self) -> String {
        self.current.borrow().clone()
    }

    fn push_query(&self, query: &str) {
        *self.current.borrow_mut() = query.to_string();
        self.pushed.borrow_mut().push(query.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PRICE_MAX;
    use crate::filters::RangeField;

    #[test]
    fn arrays_use_bracket_keys() {
        let mut r = FilterRecord::new();
        r.set("make", "3");
        r.set_options(["7", "9"]);
        assert_eq!(encode(&r), "make=3&options%5B%5D=7&options%5B%5D=9");
    }

    #[test]
    fn decode_accepts_raw_and_encoded_brackets() {
        let r = decode("?make=3&options[]=7&options%5B%5D=9&fuel_type=Nafta+e+rende");
        assert_eq!(r.get("make"), Some("3"));
        assert_eq!(r.options(), ["7", "9"]);
        assert_eq!(r.get("fuel_type"), Some("Nafta e rende"));
    }

    #[test]
    fn round_trip_drops_empties_and_boundary_bounds() {
        let mut r = FilterRecord::new();
        r.set("make", "3");
        r.set("model", "12");
        r.set("bodyType", "");
        r.set_range(RangeField::Price, 5_000, PRICE_MAX);
        r.set_options(["1"]);

        let query = encode(&r);
        assert!(!query.contains("max_price"));
        assert!(!query.contains("bodyType"));

        let back = decode(&query);
        assert_eq!(back, r);
        assert_eq!(back.range(RangeField::Price), (5_000, PRICE_MAX));
    }

    #[test]
    fn empty_record_has_no_params() {
        assert_eq!(encode(&FilterRecord::new()), "");
        assert!(!has_params(""));
        assert!(!has_params("?"));
        assert!(has_params("?make=1"));
    }

    #[test]
    fn memory_url_tracks_pushes() {
        let url = MemoryUrl::new("?make=1");
        url.push_query("");
        assert_eq!(url.query(), "");
        assert_eq!(url.pushed(), vec![String::new()]);
    }
}
