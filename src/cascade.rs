//! Make → model → variant cascade over a [`FilterRecord`].
//!
//! Selecting a make or model asks for the dependent candidate list through a
//! [`FetchTicket`]. Each list keeps a sequence number; a response is applied
//! only when its ticket is the newest one issued for that list and the parent
//! selection it was issued for is still current. Clearing a parent bumps the
//! sequence, so anything still in flight for it is dropped on arrival.

use crate::filters::{FilterKey, FilterRecord, RangeField};
use crate::models::{Model, Variant};
use crate::query;
use log::debug;

/// Where the cascade currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CascadeLevel {
    None,
    MakeSet,
    ModelSet,
    VariantSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentList {
    Models,
    Variants,
}

/// A request for a dependent list, issued by the filter and redeemed with the
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub list: DependentList,
    pub parent_id: String,
    seq: u64,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Which source seeded the initial record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    Url,
    LastSearch,
    Empty,
}

pub const OPTION_CHIP_PREFIX: &str = "options-";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadingFilter {
    record: FilterRecord,
    models: Vec<Model>,
    variants: Vec<Variant>,
    models_seq: u64,
    variants_seq: u64,
    models_loading: bool,
    variants_loading: bool,
}

impl CascadingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record, returning the fetches its make/model
    /// selections need.
    pub fn with_record(mut record: FilterRecord) -> (Self, Vec<FetchTicket>) {
        record.enforce_cascade();
        let mut filter = Self {
            record,
            ..Self::default()
        };
        let mut tickets = Vec::new();
        if let Some(make) = filter.record.get_key(FilterKey::Make).map(str::to_string) {
            tickets.push(filter.issue(DependentList::Models, make));
        }
        if let Some(model) = filter.record.get_key(FilterKey::Model).map(str::to_string) {
            tickets.push(filter.issue(DependentList::Variants, model));
        }
        (filter, tickets)
    }

    /// URL parameters win when present; otherwise the (already expiry-checked)
    /// last search is used. The two are never merged.
    pub fn initialize(
        url_query: &str,
        last_search: Option<FilterRecord>,
    ) -> (Self, Vec<FetchTicket>, InitialSource) {
        let (record, source) = if query::has_params(url_query) {
            (query::decode(url_query), InitialSource::Url)
        } else if let Some(saved) = last_search.filter(|r| !r.is_empty()) {
            (saved, InitialSource::LastSearch)
        } else {
            (FilterRecord::new(), InitialSource::Empty)
        };
        let (filter, tickets) = Self::with_record(record);
        (filter, tickets, source)
    }

    pub fn record(&self) -> &FilterRecord {
        &self.record
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn models_loading(&self) -> bool {
        self.models_loading
    }

    pub fn variants_loading(&self) -> bool {
        self.variants_loading
    }

    pub fn level(&self) -> CascadeLevel {
        let has = |k| self.record.get_key(k).is_some();
        match (has(FilterKey::Make), has(FilterKey::Model), has(FilterKey::Variant)) {
            (false, _, _) => CascadeLevel::None,
            (true, false, _) => CascadeLevel::MakeSet,
            (true, true, false) => CascadeLevel::ModelSet,
            (true, true, true) => CascadeLevel::VariantSet,
        }
    }

    fn issue(&mut self, list: DependentList, parent_id: String) -> FetchTicket {
        let seq = match list {
            DependentList::Models => {
                self.models_seq += 1;
                self.models_loading = true;
                self.models_seq
            }
            DependentList::Variants => {
                self.variants_seq += 1;
                self.variants_loading = true;
                self.variants_seq
            }
        };
        FetchTicket {
            list,
            parent_id,
            seq,
        }
    }

    fn invalidate(&mut self, list: DependentList) {
        match list {
            DependentList::Models => {
                self.models_seq += 1;
                self.models_loading = false;
                self.models.clear();
            }
            DependentList::Variants => {
                self.variants_seq += 1;
                self.variants_loading = false;
                self.variants.clear();
            }
        }
    }

    /// Set any filter by name, routing the cascade keys through their
    /// transitions.
    pub fn set_field(&mut self, key: &str, value: &str) -> Option<FetchTicket> {
        match FilterKey::parse(key) {
            Some(FilterKey::Make) => self.set_make(value),
            Some(FilterKey::Model) => self.set_model(value),
            Some(FilterKey::Variant) => {
                self.set_variant(value);
                None
            }
            _ => {
                self.record.set(key, value);
                None
            }
        }
    }

    pub fn set_make(&mut self, make: &str) -> Option<FetchTicket> {
        let make = make.trim();
        if make.is_empty() {
            self.record.remove(FilterKey::Make.as_str());
            self.invalidate(DependentList::Models);
            self.invalidate(DependentList::Variants);
            return None;
        }
        if self.record.get_key(FilterKey::Make) == Some(make) {
            return None;
        }
        self.record.set_key(FilterKey::Make, make);
        Some(self.issue(DependentList::Models, make.to_string()))
    }

    /// Ignored while no make is selected.
    pub fn set_model(&mut self, model: &str) -> Option<FetchTicket> {
        let model = model.trim();
        if model.is_empty() {
            self.record.remove(FilterKey::Model.as_str());
            self.invalidate(DependentList::Variants);
            return None;
        }
        if self.record.get_key(FilterKey::Make).is_none() {
            debug!("Ignoring model {} without a make", model);
            return None;
        }
        if self.record.get_key(FilterKey::Model) == Some(model) {
            return None;
        }
        self.record.set_key(FilterKey::Model, model);
        Some(self.issue(DependentList::Variants, model.to_string()))
    }

    /// Ignored while no model is selected.
    pub fn set_variant(&mut self, variant: &str) {
        if variant.trim().is_empty() {
            self.record.remove(FilterKey::Variant.as_str());
        } else if self.record.get_key(FilterKey::Model).is_some() {
            self.record.set_key(FilterKey::Variant, variant.trim());
        }
    }

    pub fn set_range(&mut self, field: RangeField, min: u32, max: u32) {
        self.record.set_range(field, min, max);
    }

    pub fn toggle_option(&mut self, id: &str) -> bool {
        self.record.toggle_option(id)
    }

    /// Remove an active-filter chip: either a plain key or `options-<id>`.
    pub fn remove_filter(&mut self, chip_key: &str) {
        match chip_key.strip_prefix(OPTION_CHIP_PREFIX) {
            Some(id) => self.record.remove_option(id),
            None => {
                self.set_field(chip_key, "");
            }
        }
    }

    fn accepts(&self, ticket: &FetchTicket) -> bool {
        let (seq, parent) = match ticket.list {
            DependentList::Models => (self.models_seq, self.record.get_key(FilterKey::Make)),
            DependentList::Variants => (self.variants_seq, self.record.get_key(FilterKey::Model)),
        };
        ticket.seq == seq && parent == Some(ticket.parent_id.as_str())
    }

    /// Whether a response for `ticket` would still be applied.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.accepts(ticket)
    }

    pub fn apply_models(&mut self, ticket: &FetchTicket, models: Vec<Model>) -> bool {
        if ticket.list != DependentList::Models || !self.accepts(ticket) {
            debug!("Dropping stale models response for make {}", ticket.parent_id);
            return false;
        }
        self.models = models;
        self.models_loading = false;
        true
    }

    pub fn apply_variants(&mut self, ticket: &FetchTicket, variants: Vec<Variant>) -> bool {
        if ticket.list != DependentList::Variants || !self.accepts(ticket) {
            debug!("Dropping stale variants response for model {}", ticket.parent_id);
            return false;
        }
        self.variants = variants;
        self.variants_loading = false;
        true
    }

    /// A fetch failed. The previous candidate list stays in place.
    pub fn fetch_failed(&mut self, ticket: &FetchTicket) {
        if !self.accepts(ticket) {
            return;
        }
        match ticket.list {
            DependentList::Models => self.models_loading = false,
            DependentList::Variants => self.variants_loading = false,
        }
    }

    pub fn reset(&mut self) {
        self.record = FilterRecord::new();
        self.invalidate(DependentList::Models);
        self.invalidate(DependentList::Variants);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: i64, make: i64) -> Model {
        Model {
            id,
            name: format!("Model {}", id),
            make,
        }
    }

    fn variant(id: i64, model: i64) -> Variant {
        Variant {
            id,
            name: format!("Variant {}", id),
            model,
        }
    }

    #[test]
    fn walks_forward_through_levels() {
        let mut f = CascadingFilter::new();
        assert_eq!(f.level(), CascadeLevel::None);
        let t = f.set_make("3").unwrap();
        assert_eq!(t.list, DependentList::Models);
        assert_eq!(f.level(), CascadeLevel::MakeSet);
        assert!(f.apply_models(&t, vec![model(12, 3)]));
        let t = f.set_model("12").unwrap();
        assert_eq!(t.list, DependentList::Variants);
        assert!(f.apply_variants(&t, vec![variant(40, 12)]));
        f.set_variant("40");
        assert_eq!(f.level(), CascadeLevel::VariantSet);
    }

    #[test]
    fn clearing_make_clears_everything_downstream() {
        let mut f = CascadingFilter::new();
        let t = f.set_make("3").unwrap();
        f.apply_models(&t, vec![model(12, 3)]);
        let t = f.set_model("12").unwrap();
        f.apply_variants(&t, vec![variant(40, 12)]);
        f.set_variant("40");

        assert!(f.set_make("").is_none());
        assert_eq!(f.record().get("model"), None);
        assert_eq!(f.record().get("variant"), None);
        assert!(f.models().is_empty());
        assert!(f.variants().is_empty());
        assert_eq!(f.level(), CascadeLevel::None);
    }

    #[test]
    fn changing_make_keeps_model_until_cleared() {
        let mut f = CascadingFilter::new();
        f.set_make("3");
        f.set_model("12");
        assert!(f.set_make("4").is_some());
        assert_eq!(f.record().get("model"), Some("12"));
    }

    #[test]
    fn stale_models_response_is_discarded() {
        let mut f = CascadingFilter::new();
        let first = f.set_make("3").unwrap();
        let second = f.set_make("4").unwrap();

        assert!(f.apply_models(&second, vec![model(20, 4)]));
        assert!(!f.apply_models(&first, vec![model(12, 3)]));
        assert_eq!(f.models(), [model(20, 4)]);
    }

    #[test]
    fn response_after_clear_is_discarded() {
        let mut f = CascadingFilter::new();
        let t = f.set_make("3").unwrap();
        f.set_make("");
        assert!(!f.is_current(&t));
        assert!(!f.apply_models(&t, vec![model(12, 3)]));
        assert!(f.models().is_empty());
    }

    #[test]
    fn current_sequence_with_a_different_parent_is_rejected() {
        let mut f = CascadingFilter::new();
        f.set_make("3");
        let issued = f.set_model("12").unwrap();
        let moved = FetchTicket {
            parent_id: "14".into(),
            ..issued.clone()
        };
        assert_eq!(moved.seq(), f.variants_seq);
        assert!(!f.is_current(&moved));
        assert!(!f.apply_variants(&moved, vec![variant(70, 14)]));
        f.fetch_failed(&moved);
        assert!(f.variants_loading());

        let moved = FetchTicket {
            list: DependentList::Models,
            parent_id: "4".into(),
            seq: f.models_seq,
        };
        assert!(!f.apply_models(&moved, vec![model(20, 4)]));
        assert!(f.is_current(&issued));
    }

    #[test]
    fn ticket_for_the_other_list_is_rejected() {
        let mut f = CascadingFilter::new();
        let models = f.set_make("3").unwrap();
        assert!(!f.apply_variants(&models, vec![variant(40, 12)]));
        assert!(f.variants().is_empty());
    }

    #[test]
    fn reselecting_same_make_issues_nothing() {
        let mut f = CascadingFilter::new();
        assert!(f.set_make("3").is_some());
        assert!(f.set_make("3").is_none());
    }

    #[test]
    fn model_without_make_is_ignored() {
        let mut f = CascadingFilter::new();
        assert!(f.set_model("12").is_none());
        f.set_variant("40");
        assert!(f.record().is_empty());
    }

    #[test]
    fn url_wins_over_last_search() {
        let mut saved = FilterRecord::new();
        saved.set("fuel_type", "Naftë");
        let (f, tickets, source) =
            CascadingFilter::initialize("?make=3&model=12", Some(saved.clone()));
        assert_eq!(source, InitialSource::Url);
        assert_eq!(f.record().get("fuel_type"), None);
        assert_eq!(tickets.len(), 2);

        let (f, tickets, source) = CascadingFilter::initialize("", Some(saved));
        assert_eq!(source, InitialSource::LastSearch);
        assert_eq!(f.record().get("fuel_type"), Some("Naftë"));
        assert!(tickets.is_empty());
    }

    #[test]
    fn remove_filter_handles_option_chips() {
        let mut f = CascadingFilter::new();
        f.toggle_option("5");
        f.toggle_option("6");
        f.set_make("3");
        f.set_model("12");
        f.remove_filter("options-5");
        assert_eq!(f.record().options(), ["6"]);
        f.remove_filter("make");
        assert_eq!(f.level(), CascadeLevel::None);
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut f = CascadingFilter::new();
        let t = f.set_make("3").unwrap();
        f.apply_models(&t, vec![model(12, 3)]);
        let t = f.set_make("4").unwrap();
        assert!(f.models_loading());
        f.fetch_failed(&t);
        assert!(!f.models_loading());
        assert_eq!(f.models().len(), 1);
    }
}
