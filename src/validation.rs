//! Client-side form validation. A form with any error is not submitted.

use crate::config::{MILEAGE_MAX, POWER_MAX, PRICE_MAX};
use crate::models::{CarPayload, ContactForm, OptionCategory};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static HEX_COLOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[\d\s()\-]{6,20}$").unwrap());

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_IMAGES: usize = 10;
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Field name → message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Invalid fields: {}", .0.keys().copied().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

pub fn validate_price_input(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(0), Some(PRICE_MAX), "Price")
}

pub fn validate_mileage_input(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(0), Some(MILEAGE_MAX), "Mileage")
}

pub fn validate_power_input(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(0), Some(POWER_MAX), "Power")
}

/// `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn validate_car(car: &CarPayload, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if car.make.is_none() {
        errors.add("make", "Make is required");
    }
    if car.model.is_none() {
        errors.add("model", "Model is required");
    }
    if car.exterior_color_id.is_none() {
        errors.add("exterior_color", "Exterior color is required");
    }
    if !car.discussed_price && car.price <= 0.0 {
        errors.add("price", "Price is required unless it is open to discussion");
    }
    if car.description.trim().is_empty() {
        errors.add("description", "Description is required");
    }

    if car.created_at.trim().is_empty() {
        errors.add("created_at", "Listing date is required");
    } else {
        match parse_date(&car.created_at) {
            None => errors.add("created_at", "Listing date is not a valid date"),
            Some(date) if date > today => errors.add("created_at", "Listing date cannot be in the future"),
            Some(_) => {}
        }
    }

    if car.is_used {
        match (
            car.first_registration_day,
            car.first_registration_month,
            car.first_registration_year,
        ) {
            (Some(day), Some(month), Some(year)) => match NaiveDate::from_ymd_opt(year, month, day) {
                None => errors.add("first_registration", "First registration is not a valid date"),
                Some(date) if date > today => {
                    errors.add("first_registration", "First registration cannot be in the future")
                }
                Some(_) => {}
            },
            _ => errors.add(
                "first_registration",
                "Day, month and year of first registration are required for used cars",
            ),
        }
    }

    if car.cylinders == Some(0) {
        errors.add("cylinders", "Cylinders must be at least 1");
    }

    errors.into_result()
}

/// Names of makes, models, variants, upholstery types and options.
pub fn validate_name(value: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add("name", "Name is required");
    } else if trimmed.chars().count() > MAX_NAME_LEN {
        errors.add("name", format!("Name cannot exceed {} characters", MAX_NAME_LEN));
    }
    errors.into_result()
}

pub fn validate_color(name: &str, hex_code: &str) -> Result<(), ValidationErrors> {
    let mut errors = validate_name(name).err().unwrap_or_default();
    if !HEX_COLOR_REGEX.is_match(hex_code.trim()) {
        errors.add("hex_code", "Color must look like #RRGGBB");
    }
    errors.into_result()
}

pub fn validate_option(name: &str, category: &str, categories: &[OptionCategory]) -> Result<(), ValidationErrors> {
    let mut errors = validate_name(name).err().unwrap_or_default();
    if !categories.iter().any(|c| c.value == category) {
        errors.add("category", "Choose a category");
    }
    errors.into_result()
}

pub fn validate_contact(form: &ContactForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if form.name.trim().is_empty() {
        errors.add("name", "Emri është i detyrueshëm");
    }
    if form.email.trim().is_empty() {
        errors.add("email", "Email-i është i detyrueshëm");
    } else if !EMAIL_REGEX.is_match(form.email.trim()) {
        errors.add("email", "Email-i nuk është i vlefshëm");
    }
    if !form.phone.trim().is_empty() && !PHONE_REGEX.is_match(form.phone.trim()) {
        errors.add("phone", "Numri i telefonit nuk është i vlefshëm");
    }
    if form.subject.trim().is_empty() {
        errors.add("subject", "Subjekti është i detyrueshëm");
    }
    if form.message.trim().is_empty() {
        errors.add("message", "Mesazhi është i detyrueshëm");
    }
    errors.into_result()
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

pub fn validate_images(files: &[ImageCandidate], existing: usize) -> Result<(), String> {
    if files.len() + existing > MAX_IMAGES {
        return Err(format!("Maximum {} images allowed", MAX_IMAGES));
    }
    for file in files {
        if file.size > MAX_IMAGE_BYTES {
            return Err("Image size should not exceed 5MB".to_string());
        }
        if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
            return Err("Only JPEG, PNG and WebP images are allowed".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn valid_car() -> CarPayload {
        CarPayload {
            make: Some(3),
            model: Some(12),
            exterior_color_id: Some(1),
            price: 18_000.0,
            description: "Gjendje e mirë".into(),
            created_at: "2024-06-01".into(),
            ..CarPayload::default()
        }
    }

    #[test]
    fn complete_new_car_passes() {
        assert_eq!(validate_car(&valid_car(), today()), Ok(()));
    }

    #[test]
    fn required_fields_are_reported() {
        let errors = validate_car(&CarPayload::default(), today()).unwrap_err();
        for field in ["make", "model", "exterior_color", "price", "description", "created_at"] {
            assert!(errors.get(field).is_some(), "missing error for {}", field);
        }
    }

    #[test]
    fn discussed_price_needs_no_amount() {
        let car = CarPayload {
            price: 0.0,
            discussed_price: true,
            ..valid_car()
        };
        assert!(validate_car(&car, today()).is_ok());
    }

    #[test]
    fn used_car_needs_a_past_registration() {
        let mut car = CarPayload {
            is_used: true,
            ..valid_car()
        };
        assert!(validate_car(&car, today()).unwrap_err().get("first_registration").is_some());

        car.first_registration_day = Some(31);
        car.first_registration_month = Some(2);
        car.first_registration_year = Some(2020);
        let errors = validate_car(&car, today()).unwrap_err();
        assert_eq!(errors.get("first_registration"), Some("First registration is not a valid date"));

        car.first_registration_day = Some(1);
        car.first_registration_year = Some(2025);
        assert!(validate_car(&car, today()).is_err());

        car.first_registration_year = Some(2019);
        assert!(validate_car(&car, today()).is_ok());
    }

    #[test]
    fn future_listing_date_and_zero_cylinders_fail() {
        let car = CarPayload {
            created_at: "2024-07-01T10:00:00Z".into(),
            cylinders: Some(0),
            ..valid_car()
        };
        let errors = validate_car(&car, today()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn colors_need_hex_codes() {
        assert!(validate_color("E zezë", "#000000").is_ok());
        let errors = validate_color("", "black").unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("hex_code").is_some());
    }

    #[test]
    fn option_category_must_exist() {
        let categories = OptionCategory::defaults();
        assert!(validate_option("Kamera", "SAFETY", &categories).is_ok());
        assert!(validate_option("Kamera", "WHEELS", &categories).is_err());
    }

    #[test]
    fn contact_form_checks_email_shape() {
        let mut form = ContactForm {
            name: "Arben".into(),
            email: "arben@example".into(),
            phone: String::new(),
            subject: "Pyetje".into(),
            message: "Përshëndetje".into(),
        };
        assert!(validate_contact(&form).unwrap_err().get("email").is_some());
        form.email = "arben@example.com".into();
        assert!(validate_contact(&form).is_ok());
        form.phone = "abc".into();
        assert!(validate_contact(&form).is_err());
    }

    #[test]
    fn numeric_inputs_respect_bounds() {
        assert_eq!(validate_price_input(" 15000 "), Ok(15_000));
        assert!(validate_power_input("1001").is_err());
        assert_eq!(validate_mileage_input("").unwrap_err(), "Mileage cannot be empty");
    }

    #[test]
    fn image_batches_are_limited() {
        let jpeg = |size| ImageCandidate {
            name: "a.jpg".into(),
            size,
            content_type: "image/jpeg".into(),
        };
        assert!(validate_images(&[jpeg(1024)], 9).is_ok());
        assert!(validate_images(&[jpeg(1024), jpeg(1024)], 9).is_err());
        assert!(validate_images(&[jpeg(MAX_IMAGE_BYTES + 1)], 0).is_err());
        let gif = ImageCandidate {
            content_type: "image/gif".into(),
            ..jpeg(10)
        };
        assert!(validate_images(&[gif], 0).is_err());
    }
}
