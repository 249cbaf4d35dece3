use crate::api::endpoints;
use crate::config::{PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH};
use crate::models::Car;
use chrono::{DateTime, Datelike};
use url::form_urlencoded;

const KW_TO_HP: f64 = 1.36;
const MIN_PLAUSIBLE_YEAR: i32 = 1900;

/// Paths where opening a car must not count as a view.
const NO_TRACKING_PATHS: [&str; 3] = ["/auth", "/admin", "/favorites"];

/// Insert `,` between groups of three digits.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_price(price: f64, discussed: bool) -> String {
    if discussed {
        "I diskutueshem".to_string()
    } else {
        format!("€{}", group_thousands(price.max(0.0).round() as u64))
    }
}

pub fn format_mileage(km: u64) -> String {
    format!("{} km", group_thousands(km))
}

pub fn format_power(power: u32) -> String {
    format!("{} KF", power)
}

pub fn kw_to_hp(kw: u32) -> u32 {
    (kw as f64 * KW_TO_HP).round() as u32
}

/// Year of the epoch-ms timestamp, UTC.
pub fn year_of(ms: u64) -> i32 {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.year())
        .unwrap_or(MIN_PLAUSIBLE_YEAR)
}

/// Year part of a `YYYY-MM-DD` date, if it falls in 1900..=current+1.
pub fn extract_year_from_date(date: &str, current_year: i32) -> Option<i32> {
    let year: i32 = date.split('-').next()?.trim().parse().ok()?;
    (MIN_PLAUSIBLE_YEAR..=current_year + 1)
        .contains(&year)
        .then_some(year)
}

pub fn car_detail_path(car: &Car) -> String {
    format!("/car/{}", car.link_key())
}

pub fn should_disable_view_tracking(path: &str) -> bool {
    NO_TRACKING_PATHS.iter().any(|p| path.contains(p))
}

pub fn path_display_name(path: &str) -> String {
    let name = if path.is_empty() {
        "Unknown"
    } else if path == "/" {
        "Home"
    } else if path.contains("/auth") || path.contains("/admin") {
        "Admin"
    } else if path.contains("/favorites") {
        "Favorites"
    } else if path.contains("/cars") {
        "Car Listings"
    } else if path.contains("/car/") {
        "Car Detail"
    } else if path.contains("/about") {
        "About"
    } else if path.contains("/contact") {
        "Contact"
    } else {
        path
    };
    name.to_string()
}

/// Absolute canonical URL on the public domain. Empty parameter values are
/// left out.
pub fn canonical_url(domain: &str, path: &str, params: &[(&str, &str)]) -> String {
    let mut url = domain.trim_end_matches('/').to_string();
    if !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);

    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        query.append_pair(key, value);
        any = true;
    }
    if any {
        url.push('?');
        url.push_str(&query.finish());
    }
    url
}

/// Absolute source for an image path returned by the API.
pub fn absolute_image_url(api_base: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        src.to_string()
    } else {
        format!("{}/{}", api_base.trim_end_matches('/'), src.trim_start_matches('/'))
    }
}

/// The car's primary image, or the placeholder when it has none.
pub fn car_image_src(api_base: &str, car: &Car) -> String {
    match car.primary_image().and_then(|img| img.src()) {
        Some(src) => absolute_image_url(api_base, src),
        None => absolute_image_url(
            api_base,
            &endpoints::placeholder(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(json: &str) -> Car {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(12_500), "12,500");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn prices_and_units() {
        assert_eq!(format_price(12_500.0, false), "€12,500");
        assert_eq!(format_price(12_500.0, true), "I diskutueshem");
        assert_eq!(format_mileage(150_000), "150,000 km");
        assert_eq!(format_power(110), "110 KF");
        assert_eq!(kw_to_hp(100), 136);
    }

    #[test]
    fn year_extraction_rejects_implausible_years() {
        assert_eq!(extract_year_from_date("2019-05-01", 2026), Some(2019));
        assert_eq!(extract_year_from_date("2027-01-01", 2026), Some(2027));
        assert_eq!(extract_year_from_date("2028-01-01", 2026), None);
        assert_eq!(extract_year_from_date("1899-12-31", 2026), None);
        assert_eq!(extract_year_from_date("", 2026), None);
        assert_eq!(year_of(0), 1970);
    }

    #[test]
    fn tracking_is_disabled_for_back_office_paths() {
        assert!(should_disable_view_tracking("/admin/cars"));
        assert!(should_disable_view_tracking("/favorites"));
        assert!(!should_disable_view_tracking("/cars"));
        assert_eq!(path_display_name("/car/bmw-x5"), "Car Detail");
        assert_eq!(path_display_name("/cars"), "Car Listings");
        assert_eq!(path_display_name("/kushtet"), "/kushtet");
    }

    #[test]
    fn canonical_urls_skip_empty_params() {
        let domain = "https://www.autohafuzi.com";
        assert_eq!(canonical_url(domain, "cars", &[]), "https://www.autohafuzi.com/cars");
        assert_eq!(
            canonical_url(domain, "/cars", &[("make", "3"), ("model", "")]),
            "https://www.autohafuzi.com/cars?make=3"
        );
    }

    #[test]
    fn image_falls_back_to_placeholder() {
        let base = "http://localhost:8000";
        let bare = car(r#"{"id": 1, "make": 1, "model": 1}"#);
        assert_eq!(car_image_src(base, &bare), "http://localhost:8000/api/placeholder/400/300/");
        assert_eq!(car_detail_path(&bare), "/car/1");

        let hosted = car(r#"{"id": 2, "make": 1, "model": 1,
            "images": [{"id": 5, "url": "https://cdn.example.com/a.jpg"}]}"#);
        assert_eq!(car_image_src(base, &hosted), "https://cdn.example.com/a.jpg");
    }
}
