//! "Similar cars" recommendations.
//!
//! With a car on screen the query asks for the same make, body type, fuel and
//! a ±20% price band. Without one it falls back to the visitor's most viewed
//! make and their last search. When the make-restricted listing leaves fewer
//! than [`RECOMMENDATIONS_SHOWN`] cars, a second listing without the make tops
//! it up.

use crate::activity::{ActivityTracker, CarActivity, InterestKey};
use crate::api::ApiClient;
use crate::clock::Clock;
use crate::config::{RECOMMENDATIONS_SHOWN, RECOMMENDATION_FETCH_LIMIT, RECOMMENDATION_PRICE_SPREAD};
use crate::error::ApiError;
use crate::filters::{FilterKey, FilterRecord};
use crate::models::Car;
use crate::storage::KeyValueStore;
use log::{debug, warn};
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    params: Vec<(&'static str, String)>,
}

impl RecommendationQuery {
    fn base() -> Self {
        Self {
            params: vec![("limit", RECOMMENDATION_FETCH_LIMIT.to_string())],
        }
    }

    fn push(&mut self, key: &'static str, value: &str) {
        if !value.trim().is_empty() {
            self.params.push((key, value.to_string()));
        }
    }

    /// Cars like `car`.
    pub fn for_car(car: &Car) -> Self {
        let mut query = Self::base();
        query.push(FilterKey::Make.as_str(), &car.make.to_string());
        query.push(FilterKey::BodyType.as_str(), &car.body_type);
        if car.price > 0.0 && !car.discussed_price {
            let min = (car.price * (1.0 - RECOMMENDATION_PRICE_SPREAD)).floor() as u64;
            let max = (car.price * (1.0 + RECOMMENDATION_PRICE_SPREAD)).ceil() as u64;
            query.push(FilterKey::MinPrice.as_str(), &min.to_string());
            query.push(FilterKey::MaxPrice.as_str(), &max.to_string());
        }
        query.push(FilterKey::FuelType.as_str(), &car.fuel_type);
        query
    }

    /// Cars matching what the visitor has been looking at.
    pub fn from_activity(activity: &CarActivity, last_search: Option<&FilterRecord>) -> Self {
        let mut query = Self::base();
        match activity.top_make() {
            Some(InterestKey::Name(name)) => query.push("search", &name),
            Some(InterestKey::Id(id)) => query.push(FilterKey::Make.as_str(), &id),
            None => {}
        }
        if let Some(search) = last_search {
            for key in [FilterKey::FuelType, FilterKey::BodyType] {
                if let Some(value) = search.get_key(key) {
                    query.push(key.as_str(), value);
                }
            }
        }
        query
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_make(&self) -> bool {
        self.get(FilterKey::Make.as_str()).is_some()
    }

    pub fn without_make(&self) -> Self {
        Self {
            params: self
                .params
                .iter()
                .filter(|(k, _)| *k != FilterKey::Make.as_str())
                .cloned()
                .collect(),
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

/// Ids never to recommend: the current car plus explicit exclusions.
pub fn excluded_ids(current: Option<&Car>, exclude: &[i64]) -> Vec<i64> {
    let mut ids = exclude.to_vec();
    if let Some(car) = current {
        ids.push(car.id);
    }
    ids
}

/// Merge primary and backup listings: excluded and repeated cars dropped,
/// primary order first, at most [`RECOMMENDATIONS_SHOWN`].
pub fn select_recommendations(primary: Vec<Car>, backup: Vec<Car>, excluded: &[i64]) -> Vec<Car> {
    let mut picked: Vec<Car> = Vec::with_capacity(RECOMMENDATIONS_SHOWN);
    for car in primary.into_iter().chain(backup) {
        if excluded.contains(&car.id) || picked.iter().any(|c| c.id == car.id) {
            continue;
        }
        picked.push(car);
    }
    picked.truncate(RECOMMENDATIONS_SHOWN);
    picked
}

pub async fn fetch_recommendations<S: KeyValueStore, C: Clock>(
    client: &ApiClient,
    tracker: &ActivityTracker<S, C>,
    current: Option<&Car>,
    exclude: &[i64],
) -> Result<Vec<Car>, ApiError> {
    let query = match current {
        Some(car) => RecommendationQuery::for_car(car),
        None => RecommendationQuery::from_activity(&tracker.activity(), tracker.last_search_unchecked().as_ref()),
    };
    let excluded = excluded_ids(current, exclude);

    let primary = client.cars_query(&query.to_query_string(), 1).await?.results;
    let remaining = primary.iter().filter(|c| !excluded.contains(&c.id)).count();

    let mut backup = Vec::new();
    if remaining < RECOMMENDATIONS_SHOWN && current.is_some() && query.has_make() {
        debug!("Only {} similar cars for the make, widening", remaining);
        match client.cars_query(&query.without_make().to_query_string(), 1).await {
            Ok(page) => backup = page.results,
            Err(e) => warn!("Backup recommendation query failed: {}", e),
        }
    }
    Ok(select_recommendations(primary, backup, &excluded))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(id: i64) -> Car {
        serde_json::from_str(&format!(r#"{{"id": {}, "make": 3, "model": 12}}"#, id)).unwrap()
    }

    #[test]
    fn query_for_car_uses_price_band() {
        let car: Car = serde_json::from_str(
            r#"{"id": 1, "make": 3, "model": 12, "price": "20000", "body_type": "SUV", "fuel_type": "Naftë"}"#,
        )
        .unwrap();
        let query = RecommendationQuery::for_car(&car);
        assert_eq!(query.get("make"), Some("3"));
        assert_eq!(query.get("bodyType"), Some("SUV"));
        assert_eq!(query.get("min_price"), Some("16000"));
        assert_eq!(query.get("max_price"), Some("24000"));
        assert_eq!(query.get("limit"), Some("8"));
        assert!(query.to_query_string().starts_with("limit=8&make=3&bodyType=SUV"));
    }

    #[test]
    fn discussed_price_has_no_band() {
        let car: Car = serde_json::from_str(
            r#"{"id": 1, "make": 3, "model": 12, "price": 20000, "discussed_price": true}"#,
        )
        .unwrap();
        let query = RecommendationQuery::for_car(&car);
        assert_eq!(query.get("min_price"), None);
        assert_eq!(query.get("bodyType"), None);
    }

    #[test]
    fn activity_query_searches_by_name() {
        let mut activity = CarActivity::default();
        activity.makes.insert("name:Audi".into(), 4);
        activity.makes.insert("3".into(), 1);
        let mut last = FilterRecord::new();
        last.set("fuel_type", "Benzinë");
        last.set("gearbox", "Manual");

        let query = RecommendationQuery::from_activity(&activity, Some(&last));
        assert_eq!(query.get("search"), Some("Audi"));
        assert!(!query.has_make());
        assert_eq!(query.get("fuel_type"), Some("Benzinë"));
        assert_eq!(query.get("gearbox"), None);
    }

    #[test]
    fn activity_query_uses_numeric_make() {
        let mut activity = CarActivity::default();
        activity.makes.insert("7".into(), 2);
        let query = RecommendationQuery::from_activity(&activity, None);
        assert_eq!(query.get("make"), Some("7"));
        assert_eq!(query.without_make().get("make"), None);
        assert_eq!(query.without_make().get("limit"), Some("8"));
    }

    #[test]
    fn selection_excludes_and_dedupes() {
        let picked = select_recommendations(
            vec![car(1), car(2)],
            vec![car(2), car(3), car(4), car(5), car(6)],
            &[1, 4],
        );
        let ids: Vec<i64> = picked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 5, 6]);
    }

    #[test]
    fn exclusions_include_current_car() {
        assert_eq!(excluded_ids(Some(&car(9)), &[1]), vec![1, 9]);
        assert_eq!(excluded_ids(None, &[]), Vec::<i64>::new());
    }
}
