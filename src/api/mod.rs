//! Client for the dealership REST API.
//!
//! One attempt per request, no retries. A non-2xx status is an error, and
//! every JSON body is decoded into its typed shape here so a malformed
//! response surfaces as [`ApiError::Decode`] instead of deep in the UI.

pub mod endpoints;

use crate::cache;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::filters::FilterRecord;
use crate::models::*;
use crate::query;
use endpoints::ColorCatalog;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

const VIEW_TRACKING_HEADER: &str = "X-View-Tracking";
const FALLBACK_ERROR: &str = "Request failed";

/// Map a response status and body to success or the matching error.
pub fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    if status == 401 {
        return Err(ApiError::Unauthorized);
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "detail", "message"]
                .iter()
                .find_map(|k| v.get(k).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| FALLBACK_ERROR.to_string());
    Err(ApiError::Status { status, message })
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(body)?)
}

/// Flatten a car payload into multipart text fields. Lists become repeated
/// fields, absent values are left out.
pub fn form_fields(payload: &CarPayload) -> Result<Vec<(String, String)>, ApiError> {
    let mut fields = Vec::new();
    if let Value::Object(map) = serde_json::to_value(payload)? {
        for (key, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    fields.extend(items.iter().map(|item| (key.clone(), scalar_text(item))));
                }
                other => fields.push((key, scalar_text(&other))),
            }
        }
    }
    Ok(fields)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthorized)?;
        Ok(request.header("Authorization", format!("Token {}", token)))
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if let Err(e) = check_status(status, &body) {
            error!("API request failed: {}", e);
            return Err(e);
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.http.get(self.url(path))).await?;
        decode(&body)
    }

    /// GET through the catalog cache.
    async fn get_cached<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        if let Some(body) = cache::get(path) {
            match decode(&body) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("Dropping undecodable cache entry for {}: {}", path, e);
                    cache::invalidate(path);
                }
            }
        }
        let body = self.send(self.http.get(self.url(path))).await?;
        let value = decode(&body)?;
        cache::put(path, &body);
        Ok(value)
    }

    async fn admin_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(self.authorized(self.http.get(self.url(path)))?).await?;
        decode(&body)
    }

    async fn admin_post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.authorized(self.http.post(self.url(path)).json(body))?;
        decode(&self.send(request).await?)
    }

    async fn admin_put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.authorized(self.http.put(self.url(path)).json(body))?;
        decode(&self.send(request).await?)
    }

    async fn admin_delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.authorized(self.http.delete(self.url(path)))?)
            .await
            .map(|_| ())
    }

    // Catalog

    pub async fn makes(&self) -> Result<Vec<Make>, ApiError> {
        self.get_cached(endpoints::MAKES).await
    }

    pub async fn models_by_make(&self, make_id: &str) -> Result<Vec<Model>, ApiError> {
        self.get_cached(&endpoints::models_by_make(make_id)).await
    }

    pub async fn variants_by_model(&self, model_id: &str) -> Result<Vec<Variant>, ApiError> {
        self.get_cached(&endpoints::variants_by_model(model_id)).await
    }

    pub async fn colors<T: DeserializeOwned>(&self, catalog: ColorCatalog) -> Result<Vec<T>, ApiError> {
        self.get_cached(&catalog.list()).await
    }

    pub async fn exterior_colors(&self) -> Result<Vec<ExteriorColor>, ApiError> {
        self.colors(ColorCatalog::Exterior).await
    }

    pub async fn interior_colors(&self) -> Result<Vec<InteriorColor>, ApiError> {
        self.colors(ColorCatalog::Interior).await
    }

    pub async fn upholstery(&self) -> Result<Vec<Upholstery>, ApiError> {
        self.colors(ColorCatalog::Upholstery).await
    }

    pub async fn options(&self) -> Result<Vec<CarOption>, ApiError> {
        self.get_cached(endpoints::OPTIONS_LIST).await
    }

    /// Option categories, or the built-in set when the API fails.
    pub async fn option_categories(&self) -> Vec<OptionCategory> {
        match self.get_cached(endpoints::OPTION_CATEGORIES).await {
            Ok(categories) => categories,
            Err(e) => {
                error!("Error fetching option categories: {}", e);
                OptionCategory::defaults()
            }
        }
    }

    // Cars

    pub async fn cars(&self, filters: &FilterRecord, page: u32) -> Result<Paginated<Car>, ApiError> {
        self.cars_query(&query::encode(filters), page).await
    }

    /// Car listing for a prebuilt query string.
    pub async fn cars_query(&self, query: &str, page: u32) -> Result<Paginated<Car>, ApiError> {
        self.get_json(&endpoints::cars(query, page)).await
    }

    /// Fetch a car by slug. With `count_view` false the server is told not to
    /// count this request as a view.
    pub async fn car(&self, slug: &str, count_view: bool) -> Result<Car, ApiError> {
        let mut request = self.http.get(self.url(&endpoints::car(slug)));
        if !count_view {
            request = request.header(VIEW_TRACKING_HEADER, "false");
        }
        decode(&self.send(request).await?)
    }

    fn car_form(payload: &CarPayload) -> Result<Form, ApiError> {
        Ok(form_fields(payload)?
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value)))
    }

    pub async fn add_car(&self, payload: &CarPayload) -> Result<Car, ApiError> {
        let request = self.http.post(self.url(endpoints::CARS_ADD));
        let request = self.authorized(request)?.multipart(Self::car_form(payload)?);
        decode(&self.send(request).await?)
    }

    pub async fn update_car(&self, slug: &str, payload: &CarPayload) -> Result<Car, ApiError> {
        let request = self.http.put(self.url(&endpoints::car_update(slug)));
        let request = self.authorized(request)?.multipart(Self::car_form(payload)?);
        decode(&self.send(request).await?)
    }

    pub async fn delete_car(&self, slug: &str) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::car_delete(slug)).await
    }

    // Car images

    /// Upload `(file name, bytes)` pairs as the `images` field.
    pub async fn upload_images(
        &self,
        slug: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Result<ImageUploadResult, ApiError> {
        let form = files.into_iter().fold(Form::new(), |form, (name, bytes)| {
            form.part("images", Part::bytes(bytes).file_name(name))
        });
        let request = self.http.post(self.url(&endpoints::car_images_upload(slug)));
        let request = self.authorized(request)?.multipart(form);
        decode(&self.send(request).await?)
    }

    pub async fn delete_image(&self, image_id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::car_image_delete(image_id)).await
    }

    pub async fn set_primary_image(&self, slug: &str, image_id: i64) -> Result<(), ApiError> {
        let request = self.http.post(self.url(&endpoints::car_image_primary(slug, image_id)));
        self.send(self.authorized(request)?).await.map(|_| ())
    }

    pub async fn reorder_images(&self, slug: &str, image_ids: Vec<i64>) -> Result<Vec<CarImage>, ApiError> {
        self.admin_post(&endpoints::car_images_reorder(slug), &ImageOrder { image_ids })
            .await
    }

    pub async fn car_images(&self, slug: &str) -> Result<Vec<CarImage>, ApiError> {
        self.get_json(&endpoints::car_images_list(slug)).await
    }

    // Auth

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self.http.post(self.url(endpoints::AUTH)).json(credentials);
        decode(&self.send(request).await?)
    }

    // Makes, models, variants

    pub async fn add_make(&self, name: &str) -> Result<Make, ApiError> {
        let make = self
            .admin_post(endpoints::MAKES_ADD, &NamePayload { name: name.to_string() })
            .await?;
        cache::invalidate(endpoints::MAKES);
        Ok(make)
    }

    pub async fn update_make(&self, id: i64, name: &str) -> Result<Make, ApiError> {
        let make = self
            .admin_put(&endpoints::make_update(id), &NamePayload { name: name.to_string() })
            .await?;
        cache::invalidate(endpoints::MAKES);
        Ok(make)
    }

    pub async fn delete_make(&self, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::make_delete(id)).await?;
        cache::invalidate(endpoints::MAKES);
        cache::invalidate(&endpoints::models_by_make(&id.to_string()));
        Ok(())
    }

    pub async fn add_model(&self, payload: &ModelPayload) -> Result<Model, ApiError> {
        let model = self.admin_post(endpoints::MODELS_ADD, payload).await?;
        cache::invalidate(&endpoints::models_by_make(&payload.make.to_string()));
        Ok(model)
    }

    pub async fn update_model(&self, id: i64, payload: &ModelPayload) -> Result<Model, ApiError> {
        let model = self.admin_put(&endpoints::model_update(id), payload).await?;
        cache::invalidate("/api/models/");
        Ok(model)
    }

    pub async fn delete_model(&self, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::model_delete(id)).await?;
        cache::invalidate("/api/models/");
        cache::invalidate(&endpoints::variants_by_model(&id.to_string()));
        Ok(())
    }

    pub async fn add_variant(&self, payload: &VariantPayload) -> Result<Variant, ApiError> {
        let variant = self.admin_post(endpoints::VARIANTS_ADD, payload).await?;
        cache::invalidate(&endpoints::variants_by_model(&payload.model.to_string()));
        Ok(variant)
    }

    pub async fn update_variant(&self, id: i64, payload: &VariantPayload) -> Result<Variant, ApiError> {
        let variant = self.admin_put(&endpoints::variant_update(id), payload).await?;
        cache::invalidate("/api/variants/");
        Ok(variant)
    }

    pub async fn delete_variant(&self, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::variant_delete(id)).await?;
        cache::invalidate("/api/variants/");
        Ok(())
    }

    // Colors, upholstery, options

    pub async fn add_color<B: Serialize, T: DeserializeOwned>(
        &self,
        catalog: ColorCatalog,
        payload: &B,
    ) -> Result<T, ApiError> {
        let created = self.admin_post(&catalog.add(), payload).await?;
        cache::invalidate(&catalog.list());
        Ok(created)
    }

    pub async fn update_color<B: Serialize, T: DeserializeOwned>(
        &self,
        catalog: ColorCatalog,
        id: i64,
        payload: &B,
    ) -> Result<T, ApiError> {
        let updated = self.admin_put(&catalog.update(id), payload).await?;
        cache::invalidate(&catalog.list());
        Ok(updated)
    }

    pub async fn delete_color(&self, catalog: ColorCatalog, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&catalog.delete(id)).await?;
        cache::invalidate(&catalog.list());
        Ok(())
    }

    pub async fn add_option(&self, payload: &OptionPayload) -> Result<CarOption, ApiError> {
        let option = self.admin_post(endpoints::OPTIONS_ADD, payload).await?;
        cache::invalidate(endpoints::OPTIONS_LIST);
        Ok(option)
    }

    pub async fn delete_option(&self, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::option_delete(id)).await?;
        cache::invalidate(endpoints::OPTIONS_LIST);
        Ok(())
    }

    // Site content, contact, analytics

    pub async fn about(&self) -> Result<AboutInfo, ApiError> {
        self.get_json(endpoints::ABOUT).await
    }

    /// Contact details, or the built-in ones when the API fails.
    pub async fn contact_info(&self) -> ContactInfo {
        match self.get_json(endpoints::CONTACT).await {
            Ok(info) => info,
            Err(e) => {
                error!("Error fetching contact info: {}", e);
                ContactInfo::default()
            }
        }
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<ContactReceipt, ApiError> {
        let request = self.http.post(self.url(endpoints::CONTACT_SUBMIT)).json(form);
        decode(&self.send(request).await?)
    }

    pub async fn contact_messages(&self, read: Option<bool>) -> Result<Vec<ContactMessage>, ApiError> {
        self.admin_get(&endpoints::contact_messages(read)).await
    }

    pub async fn mark_message_read(&self, id: i64) -> Result<ContactMessage, ApiError> {
        self.admin_put(&endpoints::contact_message_read(id), &serde_json::json!({}))
            .await
    }

    pub async fn delete_message(&self, id: i64) -> Result<(), ApiError> {
        self.admin_delete(&endpoints::contact_message_delete(id)).await
    }

    pub async fn analytics(&self, days: u32) -> Result<SiteAnalytics, ApiError> {
        self.admin_get(&endpoints::analytics(days)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass() {
        assert!(check_status(200, "").is_ok());
        assert!(check_status(204, "").is_ok());
        assert!(check_status(207, "{}").is_ok());
    }

    #[test]
    fn error_message_comes_from_body() {
        match check_status(404, r#"{"error": "Car not found"}"#) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Car not found");
            }
            other => panic!("unexpected {:?}", other),
        }
        match check_status(500, "<html>") {
            Err(ApiError::Status { message, .. }) => assert_eq!(message, FALLBACK_ERROR),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unauthorized_is_its_own_error() {
        assert!(matches!(check_status(401, ""), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let result: Result<Vec<Make>, _> = decode(r#"{"id": 1}"#);
        assert!(matches!(result, Err(ApiError::Decode(_))));
        let makes: Vec<Make> = decode(r#"[{"id": 1, "name": "BMW"}]"#).unwrap();
        assert_eq!(makes[0].name, "BMW");
    }

    #[test]
    fn car_form_repeats_options_and_skips_absent_fields() {
        let payload = CarPayload {
            make: Some(3),
            model: Some(12),
            price: 15000.0,
            options: vec![1, 4],
            ..CarPayload::default()
        };
        let fields = form_fields(&payload).unwrap();
        assert!(fields.contains(&("make".to_string(), "3".to_string())));
        assert!(fields.contains(&("discussed_price".to_string(), "false".to_string())));
        assert!(!fields.iter().any(|(k, _)| k == "variant"));
        let options: Vec<&str> = fields
            .iter()
            .filter(|(k, _)| k == "options")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(options, ["1", "4"]);
    }

    #[test]
    fn admin_calls_need_a_token() {
        let client = ApiClient::new(&AppConfig::default()).with_token(Some(String::new()));
        let request = client.http.get(client.url(endpoints::ANALYTICS));
        assert!(matches!(client.authorized(request), Err(ApiError::Unauthorized)));
    }
}
