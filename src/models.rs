//! Typed shapes of the REST API's JSON bodies.
//!
//! Decoding into these types is the single place where a malformed response
//! is detected; see [`crate::api::decode`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reference that the API sends either as a numeric id or as a name/slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Id(i64),
    Name(String),
}

impl ItemRef {
    pub fn id(&self) -> Option<i64> {
        match self {
            ItemRef::Id(id) => Some(*id),
            ItemRef::Name(name) => name.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "{}", id),
            ItemRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Accept numbers, numeric strings (Django decimals) and null.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Raw::Null => Ok(0.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarImage {
    pub id: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub order: i32,
}

impl CarImage {
    pub fn src(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.image.as_deref().filter(|s| !s.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    pub make: ItemRef,
    pub model: ItemRef,
    #[serde(default)]
    pub variant: Option<ItemRef>,
    #[serde(default)]
    pub first_registration_day: Option<u32>,
    #[serde(default)]
    pub first_registration_month: Option<u32>,
    #[serde(default)]
    pub first_registration_year: Option<i32>,
    #[serde(default)]
    pub first_registration: Option<String>,
    #[serde(default)]
    pub exterior_color_id: Option<i64>,
    #[serde(default)]
    pub exterior_color_name: Option<String>,
    #[serde(default)]
    pub exterior_color_hex: Option<String>,
    #[serde(default)]
    pub interior_color_id: Option<i64>,
    #[serde(default)]
    pub interior_color_name: Option<String>,
    #[serde(default)]
    pub interior_color_hex: Option<String>,
    #[serde(default)]
    pub upholstery: Option<i64>,
    #[serde(default)]
    pub upholstery_name: Option<String>,
    #[serde(deserialize_with = "lenient_number", default)]
    pub price: f64,
    #[serde(default)]
    pub discussed_price: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub images: Vec<CarImage>,
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub drivetrain: String,
    #[serde(default)]
    pub seats: u32,
    #[serde(default)]
    pub doors: u32,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default)]
    pub full_service_history: bool,
    #[serde(default)]
    pub customs_paid: bool,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub gearbox: String,
    #[serde(deserialize_with = "lenient_number", default)]
    pub engine_size: f64,
    #[serde(default)]
    pub gears: u32,
    #[serde(default)]
    pub cylinders: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub emission_class: String,
    #[serde(default)]
    pub fuel_type: String,
    #[serde(default)]
    pub options: Vec<i64>,
    #[serde(default)]
    pub view_count: u64,
}

impl Car {
    /// Path segment used in detail links: the slug when present, else the id.
    pub fn link_key(&self) -> String {
        if self.slug.is_empty() {
            self.id.to_string()
        } else {
            self.slug.clone()
        }
    }

    pub fn title(&self) -> String {
        match self.variant_name.as_deref().filter(|v| !v.is_empty()) {
            Some(variant) => format!("{} {} {}", self.brand, self.model_name, variant),
            None => format!("{} {}", self.brand, self.model_name),
        }
    }

    /// The image flagged primary, else the first one.
    pub fn primary_image(&self) -> Option<&CarImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Make {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub make: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub name: String,
    pub model: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExteriorColor {
    pub id: i64,
    pub name: String,
    pub hex_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorColor {
    pub id: i64,
    pub name: String,
    pub hex_code: String,
    #[serde(default)]
    pub upholstery: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upholstery {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarOption {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub category_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCategory {
    pub value: String,
    pub label: String,
}

impl OptionCategory {
    /// Categories used when the API cannot be reached.
    pub fn defaults() -> Vec<OptionCategory> {
        [
            ("COMFORT", "Comfort & Convenience"),
            ("ENTERTAINMENT", "Entertainment & Media"),
            ("SAFETY", "Safety & Security"),
            ("EXTRAS", "Extras"),
        ]
        .iter()
        .map(|(value, label)| OptionCategory {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub working_hours: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            address: "123 Auto Avenue, Car City, CC 12345".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            email: "info@cardealer.com".to_string(),
            working_hours:
                "Monday to Friday: 9:00 AM - 6:00 PM, Saturday: 10:00 AM - 4:00 PM".to_string(),
        }
    }
}

/// Body of `POST /api/contact/submit/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedCar {
    pub id: i64,
    pub name: String,
    pub views: u64,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyVisits {
    pub date: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAnalytics {
    pub unique_visitors: u64,
    pub total_page_views: u64,
    pub car_views: u64,
    #[serde(default)]
    pub most_viewed_cars: Vec<ViewedCar>,
    #[serde(default)]
    pub daily_visits: Vec<DailyVisits>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

/// Result of a multi-file image upload. Some files may fail while others
/// succeed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageUploadResult {
    #[serde(default)]
    pub uploaded: Vec<CarImage>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOrder {
    pub image_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Named catalog entry payload (makes, upholstery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamePayload {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPayload {
    pub name: String,
    pub make: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantPayload {
    pub name: String,
    pub model: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPayload {
    pub name: String,
    pub hex_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionPayload {
    pub name: String,
    pub category: String,
}

/// Body of car create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarPayload {
    pub make: Option<i64>,
    pub model: Option<i64>,
    pub variant: Option<i64>,
    #[serde(rename = "exterior_color")]
    pub exterior_color_id: Option<i64>,
    #[serde(rename = "interior_color")]
    pub interior_color_id: Option<i64>,
    #[serde(rename = "upholstery")]
    pub upholstery_id: Option<i64>,
    pub price: f64,
    pub discussed_price: bool,
    pub description: String,
    pub created_at: String,
    pub body_type: String,
    pub is_used: bool,
    pub drivetrain: String,
    pub seats: u32,
    pub doors: u32,
    pub mileage: u32,
    pub first_registration_day: Option<u32>,
    pub first_registration_month: Option<u32>,
    pub first_registration_year: Option<i32>,
    pub full_service_history: bool,
    pub customs_paid: bool,
    pub power: u32,
    pub gearbox: String,
    pub engine_size: f64,
    pub gears: u32,
    pub cylinders: Option<u32>,
    pub weight: u32,
    pub emission_class: String,
    pub fuel_type: String,
    pub options: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_accepts_decimal_strings_and_mixed_refs() {
        let json = r#"{
            "id": 7, "slug": "bmw-x5-7", "brand": "BMW", "model_name": "X5",
            "make": 3, "model": "12", "price": "25500.00", "engine_size": 3.0,
            "images": [{"id": 1, "image": "a.jpg", "is_primary": false, "order": 0},
                       {"id": 2, "url": "b.jpg", "is_primary": true, "order": 1}]
        }"#;
        let car: Car = serde_json::from_str(json).unwrap();
        assert_eq!(car.price, 25500.0);
        assert_eq!(car.make, ItemRef::Id(3));
        assert_eq!(car.model.id(), Some(12));
        assert_eq!(car.primary_image().and_then(|i| i.src()), Some("b.jpg"));
        assert_eq!(car.title(), "BMW X5");
        assert_eq!(car.link_key(), "bmw-x5-7");
    }

    #[test]
    fn car_without_slug_links_by_id() {
        let json = r#"{"id": 9, "make": "Audi", "model": "A4", "price": null}"#;
        let car: Car = serde_json::from_str(json).unwrap();
        assert_eq!(car.link_key(), "9");
        assert_eq!(car.price, 0.0);
        assert_eq!(car.make.id(), None);
    }

    #[test]
    fn paginated_results_default_to_empty() {
        let page: Paginated<Make> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(page.results.is_empty());
    }
}
