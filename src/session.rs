//! A catalog search session: the cascading filter plus where it is mirrored
//! (address bar and last-search storage).

use crate::activity::ActivityTracker;
use crate::cascade::{CascadingFilter, FetchTicket, InitialSource};
use crate::clock::Clock;
use crate::filters::FilterRecord;
use crate::query::{self, UrlState};
use crate::storage::KeyValueStore;
use log::{debug, info};

pub struct FilterSession<S, C, U> {
    filter: CascadingFilter,
    tracker: ActivityTracker<S, C>,
    url: U,
}

impl<S: KeyValueStore, C: Clock, U: UrlState> FilterSession<S, C, U> {
    /// Seed the filter from the URL, falling back to the saved last search.
    /// The returned tickets are the dependent lists to fetch right away.
    pub fn start(tracker: ActivityTracker<S, C>, url: U) -> (Self, Vec<FetchTicket>) {
        let (filter, tickets, source) = CascadingFilter::initialize(&url.query(), tracker.last_search());
        match source {
            InitialSource::Url => debug!("Filters initialized from the URL"),
            InitialSource::LastSearch => debug!("Filters initialized from the last search"),
            InitialSource::Empty => debug!("Filters start empty"),
        }
        (
            Self {
                filter,
                tracker,
                url,
            },
            tickets,
        )
    }

    pub fn filter(&self) -> &CascadingFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut CascadingFilter {
        &mut self.filter
    }

    pub fn tracker(&self) -> &ActivityTracker<S, C> {
        &self.tracker
    }

    /// Persist the current record as the last search, mirror it into the URL
    /// and hand it to `on_submit`.
    pub fn submit<F: FnOnce(&FilterRecord)>(&mut self, on_submit: F) -> FilterRecord {
        let cleaned = self.filter.record().clone();
        let query = query::encode(&cleaned);
        info!("Searching with [{}]", query);
        self.tracker.save_last_search(&cleaned);
        self.url.push_query(&query);
        on_submit(&cleaned);
        cleaned
    }

    /// Clear every filter and the URL query, then report an empty search.
    pub fn reset<F: FnOnce(&FilterRecord)>(&mut self, on_submit: F) {
        self.filter.reset();
        self.url.push_query("");
        on_submit(&FilterRecord::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::LAST_SEARCH_KEY;
    use crate::clock::ManualClock;
    use crate::query::MemoryUrl;
    use crate::storage::MemoryStore;

    fn session(query: &str) -> (FilterSession<MemoryStore, ManualClock, MemoryUrl>, MemoryStore, MemoryUrl) {
        let store = MemoryStore::new();
        let url = MemoryUrl::new(query);
        let tracker = ActivityTracker::new(store.clone(), ManualClock::new(1_000_000));
        let (session, _) = FilterSession::start(tracker, url.clone());
        (session, store, url)
    }

    #[test]
    fn empty_submit_yields_empty_query() {
        let (mut session, _, url) = session("");
        let mut seen = None;
        let record = session.submit(|r| seen = Some(r.clone()));
        assert!(record.is_empty());
        assert_eq!(seen, Some(FilterRecord::new()));
        assert_eq!(url.pushed(), vec![String::new()]);
    }

    #[test]
    fn submit_persists_and_rewrites_url() {
        let (mut session, store, url) = session("");
        session.filter_mut().set_make("3");
        session.filter_mut().set_field("fuel_type", "Naftë");
        session.submit(|_| {});
        assert!(store.contains(LAST_SEARCH_KEY));
        assert_eq!(url.query(), "fuel_type=Naft%C3%AB&make=3");
        assert_eq!(
            session.tracker().last_search().and_then(|r| r.get("make").map(str::to_string)),
            Some("3".to_string())
        );
    }

    #[test]
    fn clearing_make_after_submit_drops_downstream_keys() {
        let (mut session, _, _) = session("?make=3&model=12");
        session.submit(|_| {});
        session.filter_mut().set_make("");
        let record = session.submit(|_| {});
        assert_eq!(record.get("model"), None);
        assert_eq!(record.get("variant"), None);
    }

    #[test]
    fn reset_clears_url_and_reports_empty_record() {
        let (mut session, _, url) = session("?gearbox=Manual");
        let mut seen = None;
        session.reset(|r| seen = Some(r.clone()));
        assert!(session.filter().record().is_empty());
        assert_eq!(url.query(), "");
        assert_eq!(seen, Some(FilterRecord::new()));
    }
}
