//! Path templates of the REST API. Every path is rooted at `/api/` and ends
//! with a slash.

pub const CARS: &str = "/api/cars/";
pub const CARS_ADD: &str = "/api/cars/add/";
pub const AUTH: &str = "/api/auth/";
pub const MAKES: &str = "/api/makes/";
pub const MAKES_ADD: &str = "/api/makes/add/";
pub const MODELS_ADD: &str = "/api/models/add/";
pub const VARIANTS_ADD: &str = "/api/variants/add/";
pub const ABOUT: &str = "/api/about/";
pub const OPTIONS_ADD: &str = "/api/options/";
pub const OPTIONS_LIST: &str = "/api/options/list/";
pub const OPTION_CATEGORIES: &str = "/api/option-categories/";
pub const CONTACT: &str = "/api/contact/";
pub const CONTACT_SUBMIT: &str = "/api/contact/submit/";
pub const CONTACT_MESSAGES: &str = "/api/contact/messages/";
pub const ANALYTICS: &str = "/api/analytics/";

/// Catalogs that share the list / add / update / delete layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCatalog {
    Exterior,
    Interior,
    Upholstery,
}

impl ColorCatalog {
    fn root(self) -> &'static str {
        match self {
            ColorCatalog::Exterior => "/api/exterior-colors/",
            ColorCatalog::Interior => "/api/interior-colors/",
            ColorCatalog::Upholstery => "/api/upholstery/",
        }
    }

    pub fn list(self) -> String {
        self.root().to_string()
    }

    pub fn add(self) -> String {
        format!("{}add/", self.root())
    }

    pub fn update(self, id: i64) -> String {
        format!("{}{}/", self.root(), id)
    }

    pub fn delete(self, id: i64) -> String {
        format!("{}delete/{}/", self.root(), id)
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

pub fn car(slug: &str) -> String {
    format!("/api/cars/{}/", segment(slug))
}

pub fn car_update(slug: &str) -> String {
    format!("/api/cars/update/{}/", segment(slug))
}

pub fn car_delete(slug: &str) -> String {
    format!("/api/cars/delete/{}/", segment(slug))
}

pub fn car_images_upload(slug: &str) -> String {
    format!("/api/cars/{}/images/", segment(slug))
}

pub fn car_image_delete(image_id: i64) -> String {
    format!("/api/cars/images/{}/", image_id)
}

pub fn car_image_primary(slug: &str, image_id: i64) -> String {
    format!("/api/cars/{}/images/{}/primary/", segment(slug), image_id)
}

pub fn car_images_reorder(slug: &str) -> String {
    format!("/api/cars/{}/images/reorder/", segment(slug))
}

pub fn car_images_list(slug: &str) -> String {
    format!("/api/cars/{}/images/list/", segment(slug))
}

pub fn placeholder(width: u32, height: u32) -> String {
    format!("/api/placeholder/{}/{}/", width, height)
}

pub fn make_update(id: i64) -> String {
    format!("/api/makes/{}/", id)
}

pub fn make_delete(id: i64) -> String {
    format!("/api/makes/delete/{}/", id)
}

pub fn models_by_make(make_id: &str) -> String {
    format!("/api/models/by-make/{}/", segment(make_id))
}

pub fn model_update(id: i64) -> String {
    format!("/api/models/update/{}/", id)
}

pub fn model_delete(id: i64) -> String {
    format!("/api/models/delete/{}/", id)
}

pub fn variants_by_model(model_id: &str) -> String {
    format!("/api/variants/by-model/{}/", segment(model_id))
}

pub fn variant_update(id: i64) -> String {
    format!("/api/variants/update/{}/", id)
}

pub fn variant_delete(id: i64) -> String {
    format!("/api/variants/delete/{}/", id)
}

pub fn option_delete(id: i64) -> String {
    format!("/api/options/{}/", id)
}

pub fn contact_messages(read: Option<bool>) -> String {
    match read {
        Some(read) => format!("{}?read={}", CONTACT_MESSAGES, read),
        None => CONTACT_MESSAGES.to_string(),
    }
}

pub fn contact_message_read(id: i64) -> String {
    format!("/api/contact/messages/{}/read/", id)
}

pub fn contact_message_delete(id: i64) -> String {
    format!("/api/contact/messages/{}/delete/", id)
}

pub fn analytics(days: u32) -> String {
    format!("{}?days={}", ANALYTICS, days)
}

/// Car listing with the filter query (no leading `?`) and a 1-based page.
pub fn cars(query: &str, page: u32) -> String {
    let mut path = CARS.to_string();
    let mut sep = '?';
    if !query.is_empty() {
        path.push(sep);
        path.push_str(query);
        sep = '&';
    }
    if page > 1 {
        path.push(sep);
        path.push_str(&format!("page={}", page));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependent_list_paths() {
        assert_eq!(models_by_make("3"), "/api/models/by-make/3/");
        assert_eq!(variants_by_model("12"), "/api/variants/by-model/12/");
    }

    #[test]
    fn car_paths_encode_slugs() {
        assert_eq!(car("bmw-x5-7"), "/api/cars/bmw-x5-7/");
        assert_eq!(car("a b"), "/api/cars/a%20b/");
        assert_eq!(car_image_primary("golf", 4), "/api/cars/golf/images/4/primary/");
        assert_eq!(car_image_delete(4), "/api/cars/images/4/");
    }

    #[test]
    fn color_catalogs_share_layout() {
        assert_eq!(ColorCatalog::Exterior.add(), "/api/exterior-colors/add/");
        assert_eq!(ColorCatalog::Interior.update(2), "/api/interior-colors/2/");
        assert_eq!(ColorCatalog::Upholstery.delete(5), "/api/upholstery/delete/5/");
    }

    #[test]
    fn car_listing_appends_page_after_filters() {
        assert_eq!(cars("", 1), "/api/cars/");
        assert_eq!(cars("", 2), "/api/cars/?page=2");
        assert_eq!(cars("make=3", 3), "/api/cars/?make=3&page=3");
        assert_eq!(contact_messages(Some(false)), "/api/contact/messages/?read=false");
        assert_eq!(analytics(30), "/api/analytics/?days=30");
    }
}
