//! Application-level configuration constants.

// Activity tracking
pub const VIEW_COOLDOWN_MS: u64 = 1_800_000;
pub const MAX_RECENT_VIEWS: usize = 20;
pub const LAST_SEARCH_EXPIRY_MS: u64 = 30 * 60 * 1000;

// Range filters: (min, max, step)
pub const PRICE_MIN: u32 = 0;
pub const PRICE_MAX: u32 = 200_000;
pub const PRICE_STEP: u32 = 1_000;
pub const MILEAGE_MIN: u32 = 0;
pub const MILEAGE_MAX: u32 = 300_000;
pub const MILEAGE_STEP: u32 = 1_000;
pub const POWER_MIN: u32 = 0;
pub const POWER_MAX: u32 = 1_000;
pub const POWER_STEP: u32 = 10;

// Static choice lists for the filter panel
pub const BODY_TYPES: &[&str] = &[
    "Sedan",
    "SUV",
    "Coupe",
    "Hatchback",
    "Wagon",
    "Convertible",
    "Van",
    "Truck",
];
pub const FUEL_TYPES: &[&str] = &["Benzinë", "Naftë", "Elektrik", "Hibrid", "LPG", "CNG"];
pub const GEARBOX_TYPES: &[&str] = &["Manual", "Automatik"];
pub const EMISSION_CLASSES: &[&str] = &["Euro 6", "Euro 5", "Euro 4", "Euro 3", "Euro 2", "Euro 1"];
pub const DOOR_OPTIONS: &[u8] = &[2, 3, 4, 5];
pub const SEAT_OPTIONS: &[u8] = &[2, 3, 4, 5, 6, 7, 8, 9];
pub const CONDITION_OPTIONS: &[(&str, &str)] = &[("new", "E Re"), ("used", "E Përdorur")];
pub const CREATED_SINCE_OPTIONS: &[(&str, &str)] = &[
    ("today", "Sot"),
    ("yesterday", "Dje"),
    ("1week", "1 Javë"),
    ("2weeks", "2 Javë"),
];
pub const REGISTRATION_YEAR_SPAN: i32 = 30;

// Recommendations
pub const RECOMMENDATION_FETCH_LIMIT: usize = 8;
pub const RECOMMENDATIONS_SHOWN: usize = 4;
pub const RECOMMENDATION_PRICE_SPREAD: f64 = 0.2;

// Favorites cookie mirror
pub const FAVORITES_COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

// UI behavior
pub const DEBOUNCE_MS: u32 = 300;
pub const CARS_PAGE_SIZE: u32 = 12;
pub const PLACEHOLDER_WIDTH: u32 = 400;
pub const PLACEHOLDER_HEIGHT: u32 = 300;

// Defaults used when the API cannot be reached
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SITE_DOMAIN: &str = "https://www.autohafuzi.com";

/// Deployment settings resolved at build time.
///
/// `CAR_MARKET_API_BASE_URL` and `CAR_MARKET_SITE_DOMAIN` override the
/// defaults when set in the environment of the wasm build.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub site_domain: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            site_domain: DEFAULT_SITE_DOMAIN.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: option_env!("CAR_MARKET_API_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            site_domain: option_env!("CAR_MARKET_SITE_DOMAIN")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_domain),
        }
    }
}
