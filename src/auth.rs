//! Admin sign-in state kept in local storage.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{AdminUser, Credentials, LoginResponse};
use crate::storage::{load_json, save_json, BrowserStore, KeyValueStore};
use log::{error, info};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Default)]
pub struct AuthStore<S = BrowserStore> {
    store: S,
}

impl AuthStore {
    pub fn browser() -> Self {
        Self::new(BrowserStore)
    }
}

impl<S: KeyValueStore> AuthStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }

    pub fn user(&self) -> Option<AdminUser> {
        load_json(&self.store, USER_KEY)
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    pub fn remember(&self, login: &LoginResponse) {
        let saved = self
            .store
            .set(TOKEN_KEY, &login.token)
            .and_then(|_| save_json(&self.store, USER_KEY, &login.user));
        if let Err(e) = saved {
            error!("Error saving sign-in: {}", e);
        }
    }

    pub fn sign_out(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    /// `client` carrying the stored token, if any.
    pub fn authorize(&self, client: ApiClient) -> ApiClient {
        client.with_token(self.token())
    }

    /// Exchange credentials for a token and keep it.
    pub async fn sign_in(&self, client: &ApiClient, credentials: &Credentials) -> Result<AdminUser, ApiError> {
        let login = client.login(credentials).await?;
        info!("Signed in as {}", login.user.username);
        self.remember(&login);
        Ok(login.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn login() -> LoginResponse {
        serde_json::from_str(
            r#"{"token": "abc123", "user": {"id": 1, "username": "admin", "email": "a@b.c"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn remembers_and_forgets_the_token() {
        let store = MemoryStore::new();
        let auth = AuthStore::new(store.clone());
        assert!(!auth.is_signed_in());

        auth.remember(&login());
        assert_eq!(auth.token().as_deref(), Some("abc123"));
        assert_eq!(auth.user().map(|u| u.username), Some("admin".to_string()));

        auth.sign_out();
        assert!(!auth.is_signed_in());
        assert!(store.is_empty());
    }

    #[test]
    fn blank_token_counts_as_signed_out() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "  ").unwrap();
        assert!(!AuthStore::new(store).is_signed_in());
    }
}
