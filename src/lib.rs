//! Front end for a used-car dealership: catalog browsing with a cascading
//! make/model/variant filter, per-visitor activity tracking, favorites,
//! recommendations and a small back office.
//!
//! Everything below `components` and `hooks` is plain Rust with injectable
//! storage and clocks, so it runs and tests without a browser.

pub mod activity;
pub mod api;
pub mod auth;
pub mod cache;
pub mod cascade;
pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod hooks;
pub mod labels;
pub mod logging;
pub mod models;
pub mod query;
pub mod recommend;
pub mod routes;
pub mod session;
pub mod storage;
pub mod utils;
pub mod validation;

pub use activity::{ActivityTracker, CarActivity, InterestKey};
pub use api::ApiClient;
pub use cascade::{CascadeLevel, CascadingFilter, DependentList, FetchTicket, InitialSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{ApiError, StorageError};
pub use favorites::Favorites;
pub use filters::{FilterKey, FilterRecord, RangeField};
pub use query::{BrowserUrl, MemoryUrl, UrlState};
pub use session::FilterSession;
pub use storage::{BrowserStore, CookieStore, KeyValueStore, MemoryStore};
pub use validation::ValidationErrors;
