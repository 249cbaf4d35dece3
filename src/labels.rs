//! Human-readable chips for the active filters and option grouping.

use crate::cascade::OPTION_CHIP_PREFIX;
use crate::config::{CONDITION_OPTIONS, CREATED_SINCE_OPTIONS};
use crate::filters::{FilterKey, FilterRecord};
use crate::models::{CarOption, ExteriorColor, Make, Model, Upholstery, Variant};
use crate::utils::group_thousands;
use std::collections::BTreeMap;

const OTHER_CATEGORY: &str = "Tjetër";

/// One removable chip. `key` is what [`crate::cascade::CascadingFilter::remove_filter`] takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub key: String,
    pub value: String,
    pub label: String,
}

/// Loaded catalog lists used to turn ids into names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogLists {
    pub makes: Vec<Make>,
    pub models: Vec<Model>,
    pub variants: Vec<Variant>,
    pub exterior_colors: Vec<ExteriorColor>,
    pub upholstery: Vec<Upholstery>,
    pub options: Vec<CarOption>,
}

fn name_by_id<'a, T>(
    items: &'a [T],
    value: &str,
    id: impl Fn(&T) -> i64,
    name: impl Fn(&'a T) -> &'a str,
) -> Option<&'a str> {
    items.iter().find(|item| id(*item).to_string() == value).map(name)
}

fn grouped(value: &str) -> String {
    value
        .trim()
        .parse::<u64>()
        .map(group_thousands)
        .unwrap_or_else(|_| value.to_string())
}

fn label_for(key: FilterKey, value: &str, lists: &CatalogLists) -> Option<String> {
    let label = match key {
        FilterKey::Make => format!("Marka: {}", name_by_id(&lists.makes, value, |m| m.id, |m| m.name.as_str())?),
        FilterKey::Model => format!("Modeli: {}", name_by_id(&lists.models, value, |m| m.id, |m| m.name.as_str())?),
        FilterKey::Variant => format!("Varianti: {}", name_by_id(&lists.variants, value, |v| v.id, |v| v.name.as_str())?),
        FilterKey::FirstRegistrationFrom => format!("Viti nga: {}", value),
        FilterKey::FirstRegistrationTo => format!("Viti deri: {}", value),
        FilterKey::MinPrice => format!("Çmimi min: €{}", grouped(value)),
        FilterKey::MaxPrice => format!("Çmimi max: €{}", grouped(value)),
        FilterKey::MinMileage => format!("Kilometrazhi min: {} km", grouped(value)),
        FilterKey::MaxMileage => format!("Kilometrazhi max: {} km", grouped(value)),
        FilterKey::MinPower => format!("Fuqia min: {} KF", value),
        FilterKey::MaxPower => format!("Fuqia max: {} KF", value),
        FilterKey::BodyType => format!("Tipi i karrocerisë: {}", value),
        FilterKey::Gearbox => format!("Transmisioni: {}", value),
        FilterKey::Doors => format!("Dyert: {}", value),
        FilterKey::Seats => format!("Ndenjëset: {}", value),
        FilterKey::Condition => {
            let shown = CONDITION_OPTIONS
                .iter()
                .find(|(v, _)| *v == value)
                .map_or(value, |(_, label)| *label);
            format!("Gjendja: {}", shown)
        }
        FilterKey::ExteriorColor => format!(
            "Ngjyra e jashtme: {}",
            name_by_id(&lists.exterior_colors, value, |c| c.id, |c| c.name.as_str()).unwrap_or(value)
        ),
        FilterKey::InteriorColor => format!("Ngjyra e brendshme: {}", value),
        FilterKey::Upholstery => format!(
            "Tapiceria: {}",
            name_by_id(&lists.upholstery, value, |u| u.id, |u| u.name.as_str()).unwrap_or(value)
        ),
        FilterKey::FuelType => format!("Karburanti: {}", value),
        FilterKey::EmissionClass => format!("Klasa e emisioneve: {}", value),
        FilterKey::CreatedSince => {
            let (_, label) = CREATED_SINCE_OPTIONS.iter().find(|(v, _)| *v == value)?;
            format!("Krijuar që prej: {}", label)
        }
        FilterKey::Options => return None,
    };
    Some(label)
}

/// Chips for every set filter. Catalog ids that are not loaded yet produce no
/// chip; unknown keys are shown raw.
pub fn active_filters(record: &FilterRecord, lists: &CatalogLists) -> Vec<ActiveFilter> {
    let mut chips = Vec::new();
    for (key, value) in record.iter() {
        let label = match FilterKey::parse(key) {
            Some(known) => label_for(known, value, lists),
            None => Some(format!("{}: {}", key, value)),
        };
        if let Some(label) = label {
            chips.push(ActiveFilter {
                key: key.to_string(),
                value: value.to_string(),
                label,
            });
        }
    }
    for id in record.options() {
        if let Some(option) = lists.options.iter().find(|o| o.id.to_string() == *id) {
            chips.push(ActiveFilter {
                key: format!("{}{}", OPTION_CHIP_PREFIX, id),
                value: id.clone(),
                label: format!("Opsioni: {}", option.name),
            });
        }
    }
    chips
}

/// Options grouped by their display category.
pub fn group_options(options: &[CarOption]) -> BTreeMap<String, Vec<CarOption>> {
    let mut groups: BTreeMap<String, Vec<CarOption>> = BTreeMap::new();
    for option in options {
        let category = option
            .category_display
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(OTHER_CATEGORY);
        groups.entry(category.to_string()).or_default().push(option.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> CatalogLists {
        CatalogLists {
            makes: vec![Make { id: 3, name: "BMW".into() }],
            models: vec![Model { id: 12, name: "X5".into(), make: 3 }],
            options: vec![CarOption {
                id: 5,
                name: "Navigacion".into(),
                category: "COMFORT".into(),
                category_display: Some("Komoditet".into()),
            }],
            ..CatalogLists::default()
        }
    }

    fn labels(record: &FilterRecord, lists: &CatalogLists) -> Vec<String> {
        active_filters(record, lists).into_iter().map(|c| c.label).collect()
    }

    #[test]
    fn catalog_ids_resolve_to_names() {
        let mut r = FilterRecord::new();
        r.set("make", "3");
        r.set("model", "12");
        assert_eq!(labels(&r, &lists()), ["Marka: BMW", "Modeli: X5"]);
    }

    #[test]
    fn unloaded_catalog_entries_have_no_chip() {
        let mut r = FilterRecord::new();
        r.set("make", "99");
        assert!(active_filters(&r, &lists()).is_empty());
    }

    #[test]
    fn amounts_are_grouped() {
        let mut r = FilterRecord::new();
        r.set("max_price", "25000");
        r.set("min_mileage", "50000");
        r.set("condition", "used");
        assert_eq!(
            labels(&r, &lists()),
            ["Gjendja: E Përdorur", "Çmimi max: €25,000", "Kilometrazhi min: 50,000 km"]
        );
    }

    #[test]
    fn option_chips_use_prefixed_keys() {
        let mut r = FilterRecord::new();
        r.set_options(["5", "6"]);
        let chips = active_filters(&r, &lists());
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].key, "options-5");
        assert_eq!(chips[0].label, "Opsioni: Navigacion");
    }

    #[test]
    fn uncategorized_options_go_to_other() {
        let mut options = lists().options;
        options.push(CarOption {
            id: 6,
            name: "Tërheqëse".into(),
            category: "EXTRAS".into(),
            category_display: None,
        });
        let groups = group_options(&options);
        assert_eq!(groups["Komoditet"].len(), 1);
        assert_eq!(groups[OTHER_CATEGORY][0].id, 6);
    }
}
