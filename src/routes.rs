//! Page selection from the address bar path.

use urlencoding::decode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Catalog,
    /// Slug or numeric id, as it appears in `/car/<key>`.
    Car(String),
    Favorites,
    Contact,
    About,
    Login,
    Admin,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/cars" => Route::Catalog,
            "/favorites" => Route::Favorites,
            "/contact" => Route::Contact,
            "/about" => Route::About,
            "/auth" | "/auth/login" => Route::Login,
            _ if trimmed.starts_with("/admin") => Route::Admin,
            _ => match trimmed.strip_prefix("/car/") {
                Some(key) if !key.is_empty() && !key.contains('/') => {
                    let key = decode(key).map(|k| k.into_owned()).unwrap_or_else(|_| key.to_string());
                    Route::Car(key)
                }
                _ => Route::NotFound,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths() {
        assert_eq!(Route::parse("/"), Route::Catalog);
        assert_eq!(Route::parse("/cars/"), Route::Catalog);
        assert_eq!(Route::parse("/favorites"), Route::Favorites);
        assert_eq!(Route::parse("/auth"), Route::Login);
        assert_eq!(Route::parse("/admin/messages"), Route::Admin);
    }

    #[test]
    fn car_keys_are_decoded() {
        assert_eq!(Route::parse("/car/bmw-x5-7"), Route::Car("bmw-x5-7".into()));
        assert_eq!(Route::parse("/car/42/"), Route::Car("42".into()));
        assert_eq!(Route::parse("/car/skoda%20octavia"), Route::Car("skoda octavia".into()));
    }

    #[test]
    fn everything_else_is_not_found() {
        assert_eq!(Route::parse("/car/"), Route::NotFound);
        assert_eq!(Route::parse("/car/a/b"), Route::NotFound);
        assert_eq!(Route::parse("/nowhere"), Route::NotFound);
    }
}
