//! The flat filter record shared by the catalog, the URL and the last search.
//!
//! Scalar filters are stored by name; `options` is the only multi-valued key.
//! The record itself keeps the make → model → variant chain consistent: a
//! downstream key never survives its upstream key being cleared.

use crate::config::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Filter keys the catalog knows about. Unknown keys coming from a URL are
/// carried through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    Make,
    Model,
    Variant,
    FirstRegistrationFrom,
    FirstRegistrationTo,
    MinPrice,
    MaxPrice,
    MinMileage,
    MaxMileage,
    MinPower,
    MaxPower,
    BodyType,
    Gearbox,
    Doors,
    Seats,
    Condition,
    ExteriorColor,
    InteriorColor,
    Upholstery,
    FuelType,
    EmissionClass,
    CreatedSince,
    Options,
}

impl FilterKey {
    pub const ALL: [FilterKey; 23] = [
        FilterKey::Make,
        FilterKey::Model,
        FilterKey::Variant,
        FilterKey::FirstRegistrationFrom,
        FilterKey::FirstRegistrationTo,
        FilterKey::MinPrice,
        FilterKey::MaxPrice,
        FilterKey::MinMileage,
        FilterKey::MaxMileage,
        FilterKey::MinPower,
        FilterKey::MaxPower,
        FilterKey::BodyType,
        FilterKey::Gearbox,
        FilterKey::Doors,
        FilterKey::Seats,
        FilterKey::Condition,
        FilterKey::ExteriorColor,
        FilterKey::InteriorColor,
        FilterKey::Upholstery,
        FilterKey::FuelType,
        FilterKey::EmissionClass,
        FilterKey::CreatedSince,
        FilterKey::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Make => "make",
            FilterKey::Model => "model",
            FilterKey::Variant => "variant",
            FilterKey::FirstRegistrationFrom => "first_registration_from",
            FilterKey::FirstRegistrationTo => "first_registration_to",
            FilterKey::MinPrice => "min_price",
            FilterKey::MaxPrice => "max_price",
            FilterKey::MinMileage => "min_mileage",
            FilterKey::MaxMileage => "max_mileage",
            FilterKey::MinPower => "min_power",
            FilterKey::MaxPower => "max_power",
            FilterKey::BodyType => "bodyType",
            FilterKey::Gearbox => "gearbox",
            FilterKey::Doors => "doors",
            FilterKey::Seats => "seats",
            FilterKey::Condition => "condition",
            FilterKey::ExteriorColor => "exterior_color",
            FilterKey::InteriorColor => "interior_color",
            FilterKey::Upholstery => "upholstery",
            FilterKey::FuelType => "fuel_type",
            FilterKey::EmissionClass => "emission_class",
            FilterKey::CreatedSince => "created_since",
            FilterKey::Options => "options",
        }
    }

    pub fn parse(name: &str) -> Option<FilterKey> {
        FilterKey::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Numeric range filters. A bound equal to the global limit means "no
/// constraint" and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeField {
    Price,
    Mileage,
    Power,
}

impl RangeField {
    /// `(min, max, step)`
    pub fn limits(self) -> (u32, u32, u32) {
        match self {
            RangeField::Price => (PRICE_MIN, PRICE_MAX, PRICE_STEP),
            RangeField::Mileage => (MILEAGE_MIN, MILEAGE_MAX, MILEAGE_STEP),
            RangeField::Power => (POWER_MIN, POWER_MAX, POWER_STEP),
        }
    }

    pub fn keys(self) -> (FilterKey, FilterKey) {
        match self {
            RangeField::Price => (FilterKey::MinPrice, FilterKey::MaxPrice),
            RangeField::Mileage => (FilterKey::MinMileage, FilterKey::MaxMileage),
            RangeField::Power => (FilterKey::MinPower, FilterKey::MaxPower),
        }
    }

    /// The range a `min_*`/`max_*` key bounds, and the limit that key sits on
    /// when it constrains nothing.
    pub fn for_key(key: &str) -> Option<(RangeField, u32)> {
        [RangeField::Price, RangeField::Mileage, RangeField::Power]
            .into_iter()
            .find_map(|field| {
                let (lo, hi, _) = field.limits();
                let (min_key, max_key) = field.keys();
                if key == min_key.as_str() {
                    Some((field, lo))
                } else if key == max_key.as_str() {
                    Some((field, hi))
                } else {
                    None
                }
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct FilterRecord {
    values: BTreeMap<String, String>,
    options: Vec<String>,
}

impl FilterRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.options.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_key(&self, key: FilterKey) -> Option<&str> {
        self.get(key.as_str())
    }

    /// Set a scalar filter. An empty (or whitespace) value clears the key and
    /// cascades down the make → model → variant chain. A range bound equal to
    /// its global limit is dropped, whichever way it came in.
    pub fn set(&mut self, key: &str, value: &str) {
        if key == FilterKey::Options.as_str() {
            self.options = split_option_ids(value);
            return;
        }
        let on_limit = RangeField::for_key(key)
            .map_or(false, |(_, limit)| value.trim().parse::<u32>() == Ok(limit));
        if on_limit || value.trim().is_empty() {
            self.remove(key);
        } else {
            self.values.insert(key.to_string(), value.to_string());
        }
    }

    pub fn set_key(&mut self, key: FilterKey, value: &str) {
        self.set(key.as_str(), value);
    }

    pub fn remove(&mut self, key: &str) {
        if key == FilterKey::Options.as_str() {
            self.options.clear();
            return;
        }
        self.values.remove(key);
        if key == FilterKey::Make.as_str() {
            self.values.remove(FilterKey::Model.as_str());
            self.values.remove(FilterKey::Variant.as_str());
        } else if key == FilterKey::Model.as_str() {
            self.values.remove(FilterKey::Variant.as_str());
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn set_options<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options.clear();
        for id in ids {
            self.add_option(id);
        }
    }

    pub fn add_option<T: Into<String>>(&mut self, id: T) {
        let id = id.into();
        if !id.trim().is_empty() && !self.options.contains(&id) {
            self.options.push(id);
        }
    }

    /// Add the id if absent, drop it if present. Returns whether it is now selected.
    pub fn toggle_option(&mut self, id: &str) -> bool {
        if let Some(pos) = self.options.iter().position(|o| o == id) {
            self.options.remove(pos);
            false
        } else {
            self.add_option(id);
            true
        }
    }

    pub fn remove_option(&mut self, id: &str) {
        self.options.retain(|o| o != id);
    }

    /// Store a range, omitting bounds that sit on the global limits.
    pub fn set_range(&mut self, field: RangeField, min: u32, max: u32) {
        let (lo, hi, _) = field.limits();
        let (min_key, max_key) = field.keys();
        let min = min.clamp(lo, hi);
        let max = max.clamp(lo, hi);
        if min == lo {
            self.remove(min_key.as_str());
        } else {
            self.set_key(min_key, &min.to_string());
        }
        if max == hi {
            self.remove(max_key.as_str());
        } else {
            self.set_key(max_key, &max.to_string());
        }
    }

    /// Effective range, falling back to the global limits for absent or
    /// unparsable bounds.
    pub fn range(&self, field: RangeField) -> (u32, u32) {
        let (lo, hi, _) = field.limits();
        let (min_key, max_key) = field.keys();
        let parse = |key: FilterKey, fallback: u32| {
            self.get_key(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(fallback)
        };
        (parse(min_key, lo), parse(max_key, hi))
    }

    /// Scalar entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Drop downstream keys whose upstream key is missing. Used when a record
    /// comes from an untrusted source such as the URL or old storage.
    pub fn enforce_cascade(&mut self) {
        if self.get_key(FilterKey::Make).is_none() {
            self.remove(FilterKey::Make.as_str());
        } else if self.get_key(FilterKey::Model).is_none() {
            self.remove(FilterKey::Model.as_str());
        }
    }
}

fn split_option_ids(value: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl From<BTreeMap<String, Value>> for FilterRecord {
    fn from(map: BTreeMap<String, Value>) -> Self {
        let mut record = FilterRecord::new();
        for (key, value) in map {
            match value {
                Value::Array(items) if key == FilterKey::Options.as_str() => {
                    record.set_options(items.iter().filter_map(value_to_text));
                }
                other => {
                    if let Some(text) = value_to_text(&other) {
                        record.set(&key, &text);
                    }
                }
            }
        }
        record.enforce_cascade();
        record
    }
}

impl From<FilterRecord> for BTreeMap<String, Value> {
    fn from(record: FilterRecord) -> Self {
        let mut map: BTreeMap<String, Value> = record
            .values
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        if !record.options.is_empty() {
            map.insert(
                FilterKey::Options.as_str().to_string(),
                Value::Array(record.options.into_iter().map(Value::String).collect()),
            );
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> FilterRecord {
        let mut r = FilterRecord::new();
        for (k, v) in pairs {
            r.set(k, v);
        }
        r
    }

    #[test]
    fn clearing_make_clears_model_and_variant() {
        let mut r = record(&[("make", "3"), ("model", "12"), ("variant", "40"), ("gearbox", "Manual")]);
        r.set("make", "");
        assert_eq!(r.get("model"), None);
        assert_eq!(r.get("variant"), None);
        assert_eq!(r.get("gearbox"), Some("Manual"));
    }

    #[test]
    fn clearing_model_keeps_make() {
        let mut r = record(&[("make", "3"), ("model", "12"), ("variant", "40")]);
        r.remove("model");
        assert_eq!(r.get("make"), Some("3"));
        assert_eq!(r.get("variant"), None);
    }

    #[test]
    fn range_bounds_on_limits_are_omitted() {
        let mut r = FilterRecord::new();
        r.set_range(RangeField::Price, PRICE_MIN, 50_000);
        assert_eq!(r.get("min_price"), None);
        assert_eq!(r.get("max_price"), Some("50000"));
        assert_eq!(r.range(RangeField::Price), (PRICE_MIN, 50_000));

        r.set_range(RangeField::Price, 10_000, PRICE_MAX);
        assert_eq!(r.get("max_price"), None);
        assert_eq!(r.range(RangeField::Price), (10_000, PRICE_MAX));
    }

    #[test]
    fn bounds_on_limits_are_dropped_by_plain_set() {
        let mut r = record(&[("min_price", "0"), ("max_mileage", " 300000 "), ("max_power", "250")]);
        assert_eq!(r.get("min_price"), None);
        assert_eq!(r.get("max_mileage"), None);
        assert_eq!(r.get("max_power"), Some("250"));

        r.set("max_price", &PRICE_MAX.to_string());
        assert_eq!(r.get("max_price"), None);
        assert_eq!(RangeField::for_key("min_mileage"), Some((RangeField::Mileage, MILEAGE_MIN)));
        assert_eq!(RangeField::for_key("make"), None);
    }

    #[test]
    fn stored_search_on_limits_loads_without_them() {
        let r: FilterRecord =
            serde_json::from_str(r#"{"make": "3", "min_power": 0, "max_price": "200000"}"#).unwrap();
        assert_eq!(r.get("min_power"), None);
        assert_eq!(r.get("make"), Some("3"));
    }

    #[test]
    fn out_of_range_bounds_are_clamped() {
        let mut r = FilterRecord::new();
        r.set_range(RangeField::Power, 0, 5_000);
        assert!(r.is_empty());
    }

    #[test]
    fn toggling_options_keeps_order_and_uniqueness() {
        let mut r = FilterRecord::new();
        assert!(r.toggle_option("5"));
        assert!(r.toggle_option("2"));
        r.add_option("5");
        assert_eq!(r.options(), ["5", "2"]);
        assert!(!r.toggle_option("5"));
        assert_eq!(r.options(), ["2"]);
    }

    #[test]
    fn json_form_matches_stored_last_search() {
        let json = r#"{"make": "3", "min_price": 5000, "options": ["1", 2], "bodyType": ""}"#;
        let r: FilterRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.get("make"), Some("3"));
        assert_eq!(r.get("min_price"), Some("5000"));
        assert_eq!(r.get("bodyType"), None);
        assert_eq!(r.options(), ["1", "2"]);

        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["options"], serde_json::json!(["1", "2"]));
    }

    #[test]
    fn orphaned_downstream_keys_are_dropped_on_decode() {
        let r: FilterRecord = serde_json::from_str(r#"{"model": "12", "variant": "4"}"#).unwrap();
        assert!(r.is_empty());
    }
}
