//! Favorite cars, kept in local storage with a cookie mirror.
//!
//! `car_favorites_with_slugs` is the primary record. `car_favorites` (plain
//! ids) and its cookie twin are older forms that are still read and written
//! so a visitor whose local storage was cleared keeps their list.

use crate::storage::{save_json, BrowserStore, CookieStore, KeyValueStore};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const FAVORITES_KEY: &str = "car_favorites";
pub const FAVORITES_WITH_SLUGS_KEY: &str = "car_favorites_with_slugs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFavorite {
    pub id: i64,
    pub slug: String,
}

#[derive(Debug)]
struct Corrupt;

fn parse<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Result<Option<T>, Corrupt> {
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
            warn!("Failed to parse favorites under {}: {}", key, e);
            Corrupt
        }),
    }
}

fn from_ids(ids: Vec<i64>) -> Vec<StoredFavorite> {
    ids.into_iter()
        .map(|id| StoredFavorite {
            id,
            slug: id.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Favorites<S = BrowserStore, K = CookieStore> {
    store: S,
    cookies: K,
    entries: Vec<StoredFavorite>,
}

impl Favorites {
    pub fn browser() -> Self {
        Self::load(BrowserStore, CookieStore)
    }
}

impl<S: KeyValueStore, K: KeyValueStore> Favorites<S, K> {
    /// Read favorites: slugged list first, then plain ids, then the cookie
    /// (which is copied back into local storage). Corrupt data wipes all
    /// three.
    pub fn load(store: S, cookies: K) -> Self {
        let entries = match Self::read(&store, &cookies) {
            Ok(entries) => entries,
            Err(Corrupt) => {
                store.remove(FAVORITES_KEY);
                store.remove(FAVORITES_WITH_SLUGS_KEY);
                cookies.remove(FAVORITES_KEY);
                Vec::new()
            }
        };
        Self {
            store,
            cookies,
            entries,
        }
    }

    fn read(store: &S, cookies: &K) -> Result<Vec<StoredFavorite>, Corrupt> {
        let slugged = store.get(FAVORITES_WITH_SLUGS_KEY);
        if let Some(entries) = parse::<Vec<StoredFavorite>>(FAVORITES_WITH_SLUGS_KEY, slugged)? {
            return Ok(entries);
        }
        if let Some(ids) = parse::<Vec<i64>>(FAVORITES_KEY, store.get(FAVORITES_KEY))? {
            return Ok(from_ids(ids));
        }
        let cookie = cookies.get(FAVORITES_KEY);
        if let Some(ids) = parse::<Vec<i64>>(FAVORITES_KEY, cookie.clone())? {
            if let Some(raw) = cookie {
                if let Err(e) = store.set(FAVORITES_KEY, &raw) {
                    error!("Error restoring favorites from cookie: {}", e);
                }
            }
            return Ok(from_ids(ids));
        }
        Ok(Vec::new())
    }

    fn persist(&self) {
        let ids = self.ids();
        let written = serde_json::to_string(&ids)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(FAVORITES_KEY, &json)
                    .and_then(|_| self.cookies.set(FAVORITES_KEY, &json))
                    .and_then(|_| save_json(&self.store, FAVORITES_WITH_SLUGS_KEY, &self.entries))
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = written {
            error!("Error saving favorites: {}", e);
        }
    }

    pub fn ids(&self) -> Vec<i64> {
        self.entries.iter().map(|f| f.id).collect()
    }

    pub fn entries(&self) -> &[StoredFavorite] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.entries.iter().any(|f| f.id == id)
    }

    pub fn slug_for(&self, id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.slug.as_str())
    }

    /// Add a car, or refresh its slug if it is already a favorite.
    pub fn add(&mut self, id: i64, slug: Option<&str>) {
        let slug = slug.filter(|s| !s.is_empty());
        match self.entries.iter_mut().find(|f| f.id == id) {
            Some(existing) => match slug {
                Some(slug) if existing.slug != slug => existing.slug = slug.to_string(),
                _ => return,
            },
            None => self.entries.push(StoredFavorite {
                id,
                slug: slug.map_or_else(|| id.to_string(), str::to_string),
            }),
        }
        self.persist();
    }

    pub fn remove(&mut self, id: i64) {
        let before = self.entries.len();
        self.entries.retain(|f| f.id != id);
        if self.entries.len() != before {
            self.persist();
        }
    }

    /// Flip a car's favorite state. Returns whether it is now a favorite.
    pub fn toggle(&mut self, id: i64, slug: Option<&str>) -> bool {
        if self.is_favorite(id) {
            self.remove(id);
            false
        } else {
            self.add(id, slug);
            true
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn fresh() -> (MemoryStore, MemoryStore) {
        (MemoryStore::new(), MemoryStore::new())
    }

    #[test]
    fn add_persists_everywhere() {
        let (store, cookies) = fresh();
        let mut favs = Favorites::load(store.clone(), cookies.clone());
        favs.add(7, Some("bmw-x5-7"));
        favs.add(9, None);

        assert_eq!(store.get(FAVORITES_KEY).as_deref(), Some("[7,9]"));
        assert_eq!(cookies.get(FAVORITES_KEY).as_deref(), Some("[7,9]"));
        let reloaded = Favorites::load(store, cookies);
        assert_eq!(reloaded.slug_for(7), Some("bmw-x5-7"));
        assert_eq!(reloaded.slug_for(9), Some("9"));
    }

    #[test]
    fn adding_again_updates_the_slug() {
        let (store, cookies) = fresh();
        let mut favs = Favorites::load(store, cookies);
        favs.add(7, None);
        favs.add(7, Some("golf-7"));
        assert_eq!(favs.len(), 1);
        assert_eq!(favs.slug_for(7), Some("golf-7"));
    }

    #[test]
    fn plain_ids_are_read_when_slugs_are_missing() {
        let (store, cookies) = fresh();
        store.set(FAVORITES_KEY, "[3, 4]").unwrap();
        let favs = Favorites::load(store, cookies);
        assert_eq!(favs.ids(), vec![3, 4]);
        assert_eq!(favs.slug_for(4), Some("4"));
    }

    #[test]
    fn cookie_is_copied_back_to_storage() {
        let (store, cookies) = fresh();
        cookies.set(FAVORITES_KEY, "[5]").unwrap();
        let favs = Favorites::load(store.clone(), cookies);
        assert!(favs.is_favorite(5));
        assert_eq!(store.get(FAVORITES_KEY).as_deref(), Some("[5]"));
    }

    #[test]
    fn corrupt_data_is_wiped() {
        let (store, cookies) = fresh();
        store.set(FAVORITES_WITH_SLUGS_KEY, "{broken").unwrap();
        store.set(FAVORITES_KEY, "[1]").unwrap();
        cookies.set(FAVORITES_KEY, "[1]").unwrap();

        let favs = Favorites::load(store.clone(), cookies.clone());
        assert!(favs.is_empty());
        assert!(store.is_empty());
        assert!(cookies.is_empty());
    }

    #[test]
    fn toggle_and_clear() {
        let (store, cookies) = fresh();
        let mut favs = Favorites::load(store.clone(), cookies);
        assert!(favs.toggle(1, Some("a")));
        assert!(!favs.toggle(1, Some("a")));
        favs.add(2, None);
        favs.clear();
        assert!(favs.is_empty());
        assert_eq!(store.get(FAVORITES_WITH_SLUGS_KEY).as_deref(), Some("[]"));
    }
}
