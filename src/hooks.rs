//! Hooks that bind the search session, favorites and form fields to
//! components.

use crate::activity::ActivityTracker;
use crate::api::ApiClient;
use crate::cascade::{CascadingFilter, DependentList, FetchTicket};
use crate::clock::SystemClock;
use crate::config::AppConfig;
use crate::favorites::Favorites;
use crate::filters::{FilterRecord, RangeField};
use crate::query::BrowserUrl;
use crate::session::FilterSession;
use crate::storage::BrowserStore;
use gloo_timers::callback::Timeout;
use log::{debug, error};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

type BrowserSession = FilterSession<BrowserStore, SystemClock, BrowserUrl>;

/// Bump a render counter so components reading `RefCell` state redraw.
pub fn bump_version(version: &UseStateHandle<usize>) {
    version.set(version.wrapping_add(1));
}

/// The API client for this build, created once per component.
#[hook]
pub fn use_api_client() -> ApiClient {
    let client = use_memo((), |_| ApiClient::new(&AppConfig::from_build_env()));
    (*client).clone()
}

/// A text field parsed on commit.
#[derive(Clone, PartialEq)]
pub struct ValidatedInput<T: Clone + PartialEq + 'static> {
    /// What the user typed.
    pub text: String,
    /// Last value that parsed.
    pub value: T,
    pub error: Option<String>,
    pub oninput: Callback<InputEvent>,
    /// Parse `text`; on success `value` and `text` take the canonical form.
    pub commit: Callback<()>,
    /// Overwrite from outside, e.g. when a chip is removed.
    pub set: Callback<T>,
}

#[hook]
pub fn use_validated_input<T>(initial: T, parse: Rc<dyn Fn(&str) -> Result<T, String>>) -> ValidatedInput<T>
where
    T: Clone + PartialEq + Display + 'static,
{
    let value = use_state(|| initial.clone());
    let text = use_state(|| initial.to_string());
    let error = use_state(|| None::<String>);

    let oninput = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text.set(input.value());
        })
    };

    let commit = {
        let (value, text, error) = (value.clone(), text.clone(), error.clone());
        Callback::from(move |_| match parse(&text) {
            Ok(parsed) => {
                text.set(parsed.to_string());
                value.set(parsed);
                error.set(None);
            }
            Err(message) => error.set(Some(message)),
        })
    };

    let set = {
        let (value, text, error) = (value.clone(), text.clone(), error.clone());
        Callback::from(move |next: T| {
            text.set(next.to_string());
            value.set(next);
            error.set(None);
        })
    };

    ValidatedInput {
        text: (*text).clone(),
        value: (*value).clone(),
        error: (*error).clone(),
        oninput,
        commit,
        set,
    }
}

/// Emit the latest value once `delay_ms` passes without another one.
#[hook]
pub fn use_debounced<T: 'static>(callback: Callback<T>, delay_ms: u32) -> Callback<T> {
    let timer = use_mut_ref(|| None::<Timeout>);
    Callback::from(move |value: T| {
        let callback = callback.clone();
        // Replacing the handle drops, and so cancels, the pending call.
        *timer.borrow_mut() = Some(Timeout::new(delay_ms, move || callback.emit(value)));
    })
}

/// Filter state plus the actions the filter panel needs.
#[derive(Clone, PartialEq)]
pub struct CarFilterHandle {
    /// Snapshot for this render.
    pub filter: CascadingFilter,
    pub set_field: Callback<(String, String)>,
    pub set_range: Callback<(RangeField, u32, u32)>,
    pub toggle_option: Callback<String>,
    pub remove_filter: Callback<String>,
    pub submit: Callback<()>,
    pub reset: Callback<()>,
}

struct SessionSlot {
    session: BrowserSession,
    pending: Vec<FetchTicket>,
}

/// Load a dependent list and hand it back to the filter, which drops it if a
/// newer selection has been made since `ticket` was issued.
fn spawn_fetch(
    client: ApiClient,
    slot: Rc<RefCell<SessionSlot>>,
    version: UseStateHandle<usize>,
    ticket: FetchTicket,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let applied = match ticket.list {
            DependentList::Models => match client.models_by_make(&ticket.parent_id).await {
                Ok(models) => slot.borrow_mut().session.filter_mut().apply_models(&ticket, models),
                Err(e) => {
                    error!("Error fetching models for make {}: {}", ticket.parent_id, e);
                    slot.borrow_mut().session.filter_mut().fetch_failed(&ticket);
                    false
                }
            },
            DependentList::Variants => match client.variants_by_model(&ticket.parent_id).await {
                Ok(variants) => slot.borrow_mut().session.filter_mut().apply_variants(&ticket, variants),
                Err(e) => {
                    error!("Error fetching variants for model {}: {}", ticket.parent_id, e);
                    slot.borrow_mut().session.filter_mut().fetch_failed(&ticket);
                    false
                }
            },
        };
        debug!("{:?} for {} applied: {}", ticket.list, ticket.parent_id, applied);
        bump_version(&version);
    });
}

/// The catalog filter bound to the address bar and local storage.
/// `on_search` receives the record on every submit or reset.
#[hook]
pub fn use_car_filter(on_search: Callback<FilterRecord>) -> CarFilterHandle {
    let client = use_api_client();
    let version = use_state(|| 0usize);
    let slot = use_mut_ref(|| {
        let (session, pending) = FilterSession::start(ActivityTracker::browser(), BrowserUrl);
        SessionSlot { session, pending }
    });

    {
        let (client, slot, version) = (client.clone(), slot.clone(), version.clone());
        use_effect_with((), move |_| {
            let pending = std::mem::take(&mut slot.borrow_mut().pending);
            for ticket in pending {
                spawn_fetch(client.clone(), slot.clone(), version.clone(), ticket);
            }
            || ()
        });
    }

    let set_field = {
        let (client, slot, version) = (client.clone(), slot.clone(), version.clone());
        Callback::from(move |(key, value): (String, String)| {
            let ticket = slot.borrow_mut().session.filter_mut().set_field(&key, &value);
            if let Some(ticket) = ticket {
                spawn_fetch(client.clone(), slot.clone(), version.clone(), ticket);
            }
            bump_version(&version);
        })
    };

    let set_range = {
        let (slot, version) = (slot.clone(), version.clone());
        Callback::from(move |(field, min, max): (RangeField, u32, u32)| {
            slot.borrow_mut().session.filter_mut().set_range(field, min, max);
            bump_version(&version);
        })
    };

    let toggle_option = {
        let (slot, version) = (slot.clone(), version.clone());
        Callback::from(move |id: String| {
            slot.borrow_mut().session.filter_mut().toggle_option(&id);
            bump_version(&version);
        })
    };

    let remove_filter = {
        let (slot, version) = (slot.clone(), version.clone());
        Callback::from(move |key: String| {
            slot.borrow_mut().session.filter_mut().remove_filter(&key);
            bump_version(&version);
        })
    };

    let submit = {
        let (slot, version, on_search) = (slot.clone(), version.clone(), on_search.clone());
        Callback::from(move |_| {
            let record = slot.borrow_mut().session.submit(|_| ());
            on_search.emit(record);
            bump_version(&version);
        })
    };

    let reset = {
        let (slot, version) = (slot.clone(), version.clone());
        Callback::from(move |_| {
            slot.borrow_mut().session.reset(|_| ());
            on_search.emit(FilterRecord::new());
            bump_version(&version);
        })
    };

    let filter = slot.borrow().session.filter().clone();
    CarFilterHandle {
        filter,
        set_field,
        set_range,
        toggle_option,
        remove_filter,
        submit,
        reset,
    }
}

/// Favorites shared through context so every heart button agrees.
#[derive(Clone, PartialEq)]
pub struct FavoritesHandle {
    pub ids: Rc<Vec<i64>>,
    /// `(id, slug)`
    pub toggle: Callback<(i64, Option<String>)>,
    pub remove: Callback<i64>,
    pub clear: Callback<()>,
}

impl FavoritesHandle {
    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }
}

#[hook]
pub fn use_favorites() -> FavoritesHandle {
    let favorites = use_mut_ref(Favorites::browser);
    let version = use_state(|| 0usize);

    let toggle = {
        let (favorites, version) = (favorites.clone(), version.clone());
        Callback::from(move |(id, slug): (i64, Option<String>)| {
            let now_favorite = favorites.borrow_mut().toggle(id, slug.as_deref());
            debug!("Car {} favorite: {}", id, now_favorite);
            bump_version(&version);
        })
    };

    let remove = {
        let (favorites, version) = (favorites.clone(), version.clone());
        Callback::from(move |id: i64| {
            favorites.borrow_mut().remove(id);
            bump_version(&version);
        })
    };

    let clear = {
        let (favorites, version) = (favorites.clone(), version.clone());
        Callback::from(move |_| {
            favorites.borrow_mut().clear();
            bump_version(&version);
        })
    };

    let ids = Rc::new(favorites.borrow().ids());
    FavoritesHandle {
        ids,
        toggle,
        remove,
        clear,
    }
}
