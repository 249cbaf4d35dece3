//! Per-tab browsing activity: view cooldowns, recently viewed cars, make and
//! model interest counters, and the last submitted search.
//!
//! # Storage layout
//! - `recentCarViews`: JSON array of car ids, most recent first
//! - `carViewTimestamps`: JSON object, car id → epoch ms of the last counted view
//! - `userCarActivity`: `{ "makes": {key: count}, "models": {key: count} }`
//! - `carViewAliases`: JSON object, detail-link slug → car id, so a car
//!   reached by slug and by id is tracked once
//! - `lastCarSearch` / `lastSearchActivityTime`: last submitted filters and
//!   the epoch ms they were saved at
//!
//! Counter keys are the raw id for numeric values and `name:<value>` otherwise.

use crate::clock::{Clock, SystemClock};
use crate::config::{LAST_SEARCH_EXPIRY_MS, MAX_RECENT_VIEWS, VIEW_COOLDOWN_MS};
use crate::filters::FilterRecord;
use crate::models::ItemRef;
use crate::storage::{load_json, save_json, BrowserStore, KeyValueStore};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const RECENT_VIEWS_KEY: &str = "recentCarViews";
pub const VIEW_TIMESTAMPS_KEY: &str = "carViewTimestamps";
pub const ACTIVITY_KEY: &str = "userCarActivity";
pub const VIEW_ALIASES_KEY: &str = "carViewAliases";
pub const LAST_SEARCH_KEY: &str = "lastCarSearch";
pub const LAST_SEARCH_TIME_KEY: &str = "lastSearchActivityTime";

const NAME_PREFIX: &str = "name:";

/// Key of an interest counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterestKey {
    Id(String),
    Name(String),
}

impl InterestKey {
    /// Classify a make/model value. Returns `None` for blank input.
    pub fn classify(value: &str) -> Option<InterestKey> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.parse::<f64>().map_or(false, f64::is_finite) {
            Some(InterestKey::Id(trimmed.to_string()))
        } else {
            Some(InterestKey::Name(value.to_string()))
        }
    }

    /// Parse a stored counter key.
    pub fn from_stored(key: &str) -> InterestKey {
        match key.strip_prefix(NAME_PREFIX) {
            Some(name) => InterestKey::Name(name.to_string()),
            None => InterestKey::Id(key.to_string()),
        }
    }
}

impl fmt::Display for InterestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestKey::Id(id) => write!(f, "{}", id),
            InterestKey::Name(name) => write!(f, "{}{}", NAME_PREFIX, name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarActivity {
    #[serde(default)]
    pub makes: BTreeMap<String, u32>,
    #[serde(default)]
    pub models: BTreeMap<String, u32>,
}

impl CarActivity {
    pub fn make_count(&self, key: &InterestKey) -> u32 {
        self.makes.get(&key.to_string()).copied().unwrap_or(0)
    }

    pub fn model_count(&self, key: &InterestKey) -> u32 {
        self.models.get(&key.to_string()).copied().unwrap_or(0)
    }

    /// Most viewed make. Ties go to the smallest key.
    pub fn top_make(&self) -> Option<InterestKey> {
        let mut best: Option<(&String, u32)> = None;
        for (key, &count) in &self.makes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((key, count));
            }
        }
        best.map(|(key, _)| InterestKey::from_stored(key))
    }

    fn bump(map: &mut BTreeMap<String, u32>, value: &str) {
        if let Some(key) = InterestKey::classify(value) {
            *map.entry(key.to_string()).or_insert(0) += 1;
        }
    }
}

/// Tracks what the visitor looks at. Storage and time are injected.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker<S = BrowserStore, C = SystemClock> {
    store: S,
    clock: C,
}

impl ActivityTracker {
    /// Tracker over `localStorage` and the wall clock.
    pub fn browser() -> Self {
        Self::new(BrowserStore, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> ActivityTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    fn timestamps(&self) -> BTreeMap<String, u64> {
        load_json(&self.store, VIEW_TIMESTAMPS_KEY).unwrap_or_default()
    }

    fn cooldown_active(&self, timestamps: &BTreeMap<String, u64>, car_id: &str, now: u64) -> bool {
        timestamps
            .get(car_id)
            .map_or(false, |&last| now.saturating_sub(last) < VIEW_COOLDOWN_MS)
    }

    /// Car id for a detail-link key, when the key is a slug seen before.
    /// Unknown slugs and plain ids come back unchanged.
    pub fn resolve_view_key(&self, key_or_slug: &str) -> String {
        load_json::<BTreeMap<String, String>, _>(&self.store, VIEW_ALIASES_KEY)
            .and_then(|aliases| aliases.get(key_or_slug).cloned())
            .unwrap_or_else(|| key_or_slug.to_string())
    }

    /// Remember that `key_or_slug` names `car_id`.
    pub fn remember_view_alias(&self, key_or_slug: &str, car_id: &str) {
        if key_or_slug == car_id {
            return;
        }
        let mut aliases: BTreeMap<String, String> =
            load_json(&self.store, VIEW_ALIASES_KEY).unwrap_or_default();
        if aliases.get(key_or_slug).map(String::as_str) == Some(car_id) {
            return;
        }
        aliases.insert(key_or_slug.to_string(), car_id.to_string());
        if let Err(e) = save_json(&self.store, VIEW_ALIASES_KEY, &aliases) {
            error!("Error tracking car view: {}", e);
        }
    }

    /// Whether a view of `car_id` right now would *not* be counted.
    pub fn is_within_cooldown(&self, car_id: &str) -> bool {
        let now = self.clock.now_ms();
        self.cooldown_active(&self.timestamps(), car_id, now)
    }

    /// Record a detail-page view and return whether it was counted.
    ///
    /// Counted views refresh the cooldown timestamp and bump the make/model
    /// counters. Every view moves the car to the front of the recent list.
    pub fn record_view(&self, car_id: &str, make: &str, model: &str) -> bool {
        let now = self.clock.now_ms();
        let mut timestamps = self.timestamps();
        let counted = !self.cooldown_active(&timestamps, car_id, now);

        if counted {
            timestamps.insert(car_id.to_string(), now);
            if let Err(e) = save_json(&self.store, VIEW_TIMESTAMPS_KEY, &timestamps) {
                error!("Error tracking car view: {}", e);
            }

            let mut activity = self.activity();
            CarActivity::bump(&mut activity.makes, make);
            CarActivity::bump(&mut activity.models, model);
            if let Err(e) = save_json(&self.store, ACTIVITY_KEY, &activity) {
                error!("Error tracking car view: {}", e);
            }
        } else {
            debug!("View of car {} within cooldown, not counted", car_id);
        }

        let mut recent = self.recently_viewed();
        recent.retain(|id| id != car_id);
        recent.insert(0, car_id.to_string());
        recent.truncate(MAX_RECENT_VIEWS);
        if let Err(e) = save_json(&self.store, RECENT_VIEWS_KEY, &recent) {
            error!("Error tracking car view: {}", e);
        }

        counted
    }

    /// Recently viewed car ids, most recent first. Accepts ids stored as
    /// numbers by older builds.
    pub fn recently_viewed(&self) -> Vec<String> {
        load_json::<Vec<ItemRef>, _>(&self.store, RECENT_VIEWS_KEY)
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }

    pub fn activity(&self) -> CarActivity {
        load_json(&self.store, ACTIVITY_KEY).unwrap_or_default()
    }

    pub fn top_make(&self) -> Option<InterestKey> {
        self.activity().top_make()
    }

    /// Persist a submitted search and refresh its activity timestamp.
    pub fn save_last_search(&self, record: &FilterRecord) {
        let saved = save_json(&self.store, LAST_SEARCH_KEY, record).and_then(|_| {
            self.store
                .set(LAST_SEARCH_TIME_KEY, &self.clock.now_ms().to_string())
        });
        if let Err(e) = saved {
            error!("Error saving last search: {}", e);
        }
    }

    /// Last submitted search, unless it went unused for longer than the
    /// expiry window. Expired or orphaned entries are deleted.
    pub fn last_search(&self) -> Option<FilterRecord> {
        let stamp = self.store.get(LAST_SEARCH_TIME_KEY);
        let saved_at = match stamp.as_deref().map(|s| s.trim().parse::<u64>()) {
            Some(Ok(ms)) => ms,
            Some(Err(_)) => {
                warn!("Discarding last search with unreadable timestamp");
                self.forget_last_search();
                return None;
            }
            None => return None,
        };

        if self.clock.now_ms().saturating_sub(saved_at) > LAST_SEARCH_EXPIRY_MS {
            debug!("Last search expired");
            self.forget_last_search();
            return None;
        }
        load_json(&self.store, LAST_SEARCH_KEY)
    }

    /// Raw last search without the expiry check, for recommendations.
    pub fn last_search_unchecked(&self) -> Option<FilterRecord> {
        load_json(&self.store, LAST_SEARCH_KEY)
    }

    pub fn forget_last_search(&self) {
        self.store.remove(LAST_SEARCH_KEY);
        self.store.remove(LAST_SEARCH_TIME_KEY);
    }

    /// Wipe all tracked activity.
    pub fn clear(&self) {
        for key in [RECENT_VIEWS_KEY, VIEW_TIMESTAMPS_KEY, VIEW_ALIASES_KEY, ACTIVITY_KEY] {
            self.store.remove(key);
        }
        self.forget_last_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    const MINUTE: u64 = 60_000;

    fn tracker() -> (ActivityTracker<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::new(1_700_000_000_000);
        (ActivityTracker::new(store.clone(), clock.clone()), store, clock)
    }

    #[test]
    fn repeat_view_inside_cooldown_counts_once() {
        let (tracker, _, clock) = tracker();
        assert!(tracker.record_view("42", "BMW", "X5"));
        assert!(!tracker.record_view("42", "BMW", "X5"));

        let activity = tracker.activity();
        assert_eq!(activity.make_count(&InterestKey::Name("BMW".into())), 1);
        assert_eq!(activity.model_count(&InterestKey::Name("X5".into())), 1);

        clock.advance(30 * MINUTE);
        assert!(tracker.record_view("42", "BMW", "X5"));
        assert_eq!(tracker.activity().makes.get("name:BMW"), Some(&2));
    }

    #[test]
    fn cooldown_check_does_not_mutate() {
        let (tracker, store, clock) = tracker();
        assert!(!tracker.is_within_cooldown("1"));
        assert!(store.is_empty());

        tracker.record_view("1", "3", "12");
        assert!(tracker.is_within_cooldown("1"));
        clock.advance(30 * MINUTE - 1);
        assert!(tracker.is_within_cooldown("1"));
        clock.advance(1);
        assert!(!tracker.is_within_cooldown("1"));
    }

    #[test]
    fn slug_and_id_share_one_view() {
        let (tracker, _, _) = tracker();
        assert_eq!(tracker.resolve_view_key("bmw-x5-42"), "bmw-x5-42");
        assert!(tracker.record_view("42", "BMW", "X5"));

        tracker.remember_view_alias("bmw-x5-42", "42");
        let key = tracker.resolve_view_key("bmw-x5-42");
        assert_eq!(key, "42");
        assert!(tracker.is_within_cooldown(&key));
        assert!(!tracker.record_view(&key, "BMW", "X5"));
        assert_eq!(tracker.recently_viewed(), ["42"]);
        assert_eq!(tracker.activity().make_count(&InterestKey::Name("BMW".into())), 1);
    }

    #[test]
    fn numeric_values_key_by_id() {
        let (tracker, _, _) = tracker();
        tracker.record_view("1", "3", " 12 ");
        let activity = tracker.activity();
        assert_eq!(activity.makes.get("3"), Some(&1));
        assert_eq!(activity.models.get("12"), Some(&1));
        assert_eq!(tracker.top_make(), Some(InterestKey::Id("3".into())));
    }

    #[test]
    fn blank_make_is_not_counted() {
        let (tracker, _, _) = tracker();
        tracker.record_view("1", "", "Golf");
        let activity = tracker.activity();
        assert!(activity.makes.is_empty());
        assert_eq!(activity.models.get("name:Golf"), Some(&1));
    }

    #[test]
    fn recent_list_is_capped_and_deduplicated() {
        let (tracker, _, _) = tracker();
        for i in 0..25 {
            tracker.record_view(&i.to_string(), "1", "1");
        }
        let recent = tracker.recently_viewed();
        assert_eq!(recent.len(), MAX_RECENT_VIEWS);
        assert_eq!(recent[0], "24");
        assert_eq!(recent[19], "5");

        tracker.record_view("10", "1", "1");
        let recent = tracker.recently_viewed();
        assert_eq!(recent.len(), MAX_RECENT_VIEWS);
        assert_eq!(recent[0], "10");
        assert_eq!(recent.iter().filter(|id| *id == "10").count(), 1);
    }

    #[test]
    fn legacy_numeric_recent_ids_are_read() {
        let (tracker, store, _) = tracker();
        store.set(RECENT_VIEWS_KEY, "[5, 3]").unwrap();
        assert_eq!(tracker.recently_viewed(), vec!["5", "3"]);
    }

    #[test]
    fn corrupt_activity_starts_over() {
        let (tracker, store, _) = tracker();
        store.set(ACTIVITY_KEY, "not json").unwrap();
        assert!(tracker.record_view("1", "Audi", "A4"));
        assert_eq!(tracker.activity().makes.get("name:Audi"), Some(&1));
    }

    #[test]
    fn last_search_expires_after_thirty_minutes() {
        let (tracker, store, clock) = tracker();
        let mut search = FilterRecord::new();
        search.set("fuel_type", "Naftë");
        tracker.save_last_search(&search);

        clock.advance(29 * MINUTE);
        assert_eq!(tracker.last_search(), Some(search.clone()));

        clock.advance(2 * MINUTE);
        assert_eq!(tracker.last_search(), None);
        assert!(!store.contains(LAST_SEARCH_KEY));
        assert!(!store.contains(LAST_SEARCH_TIME_KEY));
    }

    #[test]
    fn last_search_without_timestamp_is_ignored() {
        let (tracker, store, _) = tracker();
        store.set(LAST_SEARCH_KEY, r#"{"make": "1"}"#).unwrap();
        assert_eq!(tracker.last_search(), None);
        assert!(tracker.last_search_unchecked().is_some());
    }

    #[test]
    fn top_make_prefers_highest_count() {
        let mut activity = CarActivity::default();
        activity.makes.insert("3".into(), 2);
        activity.makes.insert("name:Audi".into(), 5);
        assert_eq!(activity.top_make(), Some(InterestKey::Name("Audi".into())));
    }

    #[test]
    fn clear_removes_everything() {
        let (tracker, store, _) = tracker();
        tracker.record_view("1", "1", "1");
        tracker.save_last_search(&FilterRecord::new());
        tracker.clear();
        assert!(store.is_empty());
    }
}
