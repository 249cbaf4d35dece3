//! Entry point for the car marketplace front end.
//! Picks the page from the path and wires pages to the API and local state.

use car_market::activity::ActivityTracker;
use car_market::api::ApiClient;
use car_market::auth::AuthStore;
use car_market::components::{
    render_car_grid, AnalyticsSummary, ContactFormView, FavoriteButton, FilterPanel, LoginForm, MessagesTable,
    NameListEditor, Pagination, RecommendedCars,
};
use car_market::config::{AppConfig, CARS_PAGE_SIZE};
use car_market::error::ApiError;
use car_market::filters::FilterRecord;
use car_market::hooks::{bump_version, use_api_client, use_car_filter, use_favorites, FavoritesHandle};
use car_market::labels::CatalogLists;
use car_market::models::{
    AboutInfo, Car, ContactForm, ContactInfo, ContactMessage, Credentials, Make, Paginated, SiteAnalytics,
};
use car_market::routes::Route;
use car_market::utils::{
    absolute_image_url, canonical_url, format_mileage, format_price, kw_to_hp, path_display_name,
    should_disable_view_tracking,
};
use car_market::logging;
use futures::future::join_all;
use log::{error, info, warn, LevelFilter};
use std::future::Future;
use yew::prelude::*;

const ANALYTICS_DAYS: u32 = 30;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Log a failed catalog fetch and carry on with an empty list.
fn or_empty<T>(what: &str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        error!("Error fetching {}: {}", what, e);
        Vec::new()
    })
}

fn navigate(path: &str) {
    if let Err(e) = gloo_utils::window().location().set_href(path) {
        error!("Navigation to {} failed: {:?}", path, e);
    }
}

fn current_path() -> String {
    gloo_utils::window().location().pathname().unwrap_or_default()
}

/// Client carrying the stored admin token.
fn admin_client(client: ApiClient) -> ApiClient {
    AuthStore::browser().authorize(client)
}

fn report(failure: &UseStateHandle<Option<String>>, what: &str, e: ApiError) {
    error!("Error {}: {}", what, e);
    if matches!(e, ApiError::Unauthorized) {
        AuthStore::browser().sign_out();
        navigate("/auth");
        return;
    }
    failure.set(Some(e.user_message()));
}

fn render_failure(failure: &Option<String>) -> Html {
    match failure {
        Some(message) => html! { <p class="error-message">{ message }</p> },
        None => html! {},
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Public pages

#[function_component(CatalogPage)]
fn catalog_page() -> Html {
    let client = use_api_client();
    let api_base = AttrValue::from(client.base_url().to_string());
    let lists = use_state(CatalogLists::default);
    let page = use_state(|| 1u32);
    let search = use_state(|| None::<FilterRecord>);
    let results = use_state(|| None::<Paginated<Car>>);
    let failure = use_state(|| None::<String>);

    let on_search = {
        let (search, page) = (search.clone(), page.clone());
        Callback::from(move |record: FilterRecord| {
            page.set(1);
            search.set(Some(record));
        })
    };
    let filter = use_car_filter(on_search);

    {
        let (client, lists) = (client.clone(), lists.clone());
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let (makes, colors, upholstery, options) = futures::join!(
                    client.makes(),
                    client.exterior_colors(),
                    client.upholstery(),
                    client.options()
                );
                lists.set(CatalogLists {
                    makes: or_empty("makes", makes),
                    exterior_colors: or_empty("exterior colors", colors),
                    upholstery: or_empty("upholstery", upholstery),
                    options: or_empty("options", options),
                    ..CatalogLists::default()
                });
            });
            || ()
        });
    }

    {
        // Before the first submit the listing follows the record the filter
        // was seeded with.
        let seeded = filter.filter.record().clone();
        let (client, results, failure) = (client.clone(), results.clone(), failure.clone());
        use_effect_with(((*search).clone(), *page), move |(search, page)| {
            let record = search.clone().unwrap_or(seeded);
            let page = *page;
            wasm_bindgen_futures::spawn_local(async move {
                match client.cars(&record, page).await {
                    Ok(found) => {
                        failure.set(None);
                        results.set(Some(found));
                    }
                    Err(e) => report(&failure, "fetching cars", e),
                }
            });
            || ()
        });
    }

    let on_page = {
        let page = page.clone();
        Callback::from(move |next: u32| page.set(next.max(1)))
    };

    html! {
        <div class="catalog-page">
            <aside class="catalog-filters">
                <FilterPanel handle={filter} lists={(*lists).clone()} />
            </aside>
            <main class="catalog-results">
                { render_failure(&failure) }
                {
                    match &*results {
                        None => html! { <p class="loading">{ "Duke ngarkuar..." }</p> },
                        Some(listing) => html! {
                            <>
                                <p class="result-count">{ format!("{} makina", listing.count) }</p>
                                { render_car_grid(&listing.results, &api_base) }
                                <Pagination page={*page} total={listing.count} page_size={CARS_PAGE_SIZE} {on_page} />
                            </>
                        },
                    }
                }
                <RecommendedCars api_base={api_base.clone()} />
            </main>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CarDetailProps {
    key_or_slug: String,
}

fn render_specs(car: &Car) -> Html {
    let mut rows: Vec<(&str, String)> = vec![
        ("Kilometrazhi", format_mileage(car.mileage as u64)),
        ("Karburanti", car.fuel_type.clone()),
        ("Transmisioni", car.gearbox.clone()),
        ("Tipi i karrocerisë", car.body_type.clone()),
        ("Gjendja", if car.is_used { "E Përdorur" } else { "E Re" }.to_string()),
    ];
    if let Some(year) = car.first_registration_year {
        rows.insert(0, ("Regjistrimi i parë", year.to_string()));
    }
    if car.power > 0 {
        rows.push(("Fuqia", format!("{} kW ({} hp)", car.power, kw_to_hp(car.power))));
    }
    if let Some(color) = &car.exterior_color_name {
        rows.push(("Ngjyra e jashtme", color.clone()));
    }
    if !car.emission_class.is_empty() {
        rows.push(("Klasa e emisioneve", car.emission_class.clone()));
    }
    html! {
        <table class="car-specs-table">
            { for rows.into_iter().filter(|(_, v)| !v.is_empty()).map(|(label, value)| html! {
                <tr><th>{ label }</th><td>{ value }</td></tr>
            }) }
        </table>
    }
}

/// Car detail. Views are tracked by car id; a slug seen before resolves to
/// its id so the cooldown check before the fetch uses the same key.
#[function_component(CarDetailPage)]
fn car_detail_page(props: &CarDetailProps) -> Html {
    let client = use_api_client();
    let api_base = client.base_url().to_string();
    let car = use_state(|| None::<Car>);
    let failure = use_state(|| None::<String>);

    {
        let (client, car, failure) = (client.clone(), car.clone(), failure.clone());
        use_effect_with(props.key_or_slug.clone(), move |key| {
            let key = key.clone();
            let tracker = ActivityTracker::browser();
            let tracking = !should_disable_view_tracking(&gloo_utils::document().referrer());
            let count_view = tracking && !tracker.is_within_cooldown(&tracker.resolve_view_key(&key));
            wasm_bindgen_futures::spawn_local(async move {
                match client.car(&key, count_view).await {
                    Ok(found) => {
                        let car_id = found.id.to_string();
                        tracker.remember_view_alias(&key, &car_id);
                        if tracking {
                            let counted =
                                tracker.record_view(&car_id, &found.make.to_string(), &found.model.to_string());
                            if counted != count_view {
                                warn!(
                                    "View of car {} counted locally: {}, requested from server: {}",
                                    car_id, counted, count_view
                                );
                            }
                        }
                        car.set(Some(found));
                    }
                    Err(e) => report(&failure, "fetching car", e),
                }
            });
            || ()
        });
    }

    let Some(found) = (*car).clone() else {
        return html! {
            <div class="car-detail-page">
                { render_failure(&failure) }
                if failure.is_none() { <p class="loading">{ "Duke ngarkuar..." }</p> }
            </div>
        };
    };

    let share = canonical_url(&AppConfig::from_build_env().site_domain, &current_path(), &[]);
    html! {
        <div class="car-detail-page">
            <header class="car-detail-header">
                <h1>{ found.title() }</h1>
                <div class="car-price">{ format_price(found.price, found.discussed_price) }</div>
                <FavoriteButton car_id={found.id} slug={Some(found.link_key())} />
            </header>
            <div class="car-gallery">
                { for found.images.iter().filter_map(|img| img.src()).map(|src| html! {
                    <img src={absolute_image_url(&api_base, src)} alt={found.title()} />
                }) }
            </div>
            { render_specs(&found) }
            <p class="car-description">{ &found.description }</p>
            <input class="share-link" readonly=true value={share} />
            <RecommendedCars current={Some(found.clone())} api_base={api_base} />
        </div>
    }
}

#[function_component(FavoritesPage)]
fn favorites_page() -> Html {
    let client = use_api_client();
    let api_base = client.base_url().to_string();
    let favorites = use_context::<FavoritesHandle>();
    let cars = use_state(Vec::<Car>::new);

    let ids = favorites.as_ref().map(|f| (*f.ids).clone()).unwrap_or_default();
    {
        let cars = cars.clone();
        use_effect_with(ids, move |ids| {
            let keys: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            wasm_bindgen_futures::spawn_local(async move {
                // Looking at a saved car here must not count as a view.
                let loaded = join_all(keys.iter().map(|key| client.car(key, false))).await;
                let found: Vec<Car> = loaded
                    .into_iter()
                    .filter_map(|r| r.map_err(|e| error!("Error fetching favorite: {}", e)).ok())
                    .collect();
                cars.set(found);
            });
            || ()
        });
    }

    let on_clear = favorites
        .map(|f| f.clear.reform(|_: MouseEvent| ()))
        .unwrap_or_default();
    html! {
        <div class="favorites-page">
            <h1>{ "Të preferuarat" }</h1>
            if !cars.is_empty() {
                <button class="clear-favorites" onclick={on_clear}>{ "Pastro listën" }</button>
            }
            { render_car_grid(&cars, &api_base) }
        </div>
    }
}

#[function_component(ContactPage)]
fn contact_page() -> Html {
    let client = use_api_client();
    let info = use_state(ContactInfo::default);
    let busy = use_state(|| false);
    let status = use_state(|| None::<String>);

    {
        let (client, info) = (client.clone(), info.clone());
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                info.set(client.contact_info().await);
            });
            || ()
        });
    }

    let on_submit = {
        let (busy, status) = (busy.clone(), status.clone());
        Callback::from(move |form: ContactForm| {
            let (client, busy, status) = (client.clone(), busy.clone(), status.clone());
            busy.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                match client.submit_contact(&form).await {
                    Ok(receipt) => {
                        info!("Contact message sent");
                        status.set(Some(
                            receipt
                                .message
                                .unwrap_or_else(|| "Mesazhi u dërgua me sukses".to_string()),
                        ));
                    }
                    Err(e) => {
                        error!("Error sending contact message: {}", e);
                        status.set(Some(e.user_message()));
                    }
                }
                busy.set(false);
            });
        })
    };

    html! {
        <div class="contact-page">
            <section class="contact-info">
                <p>{ &info.address }</p>
                <p>{ &info.phone }</p>
                <p>{ &info.email }</p>
                <p>{ &info.working_hours }</p>
            </section>
            <ContactFormView {on_submit} busy={*busy} status={(*status).clone()} />
        </div>
    }
}

#[function_component(AboutPage)]
fn about_page() -> Html {
    let client = use_api_client();
    let about = use_state(|| None::<AboutInfo>);
    {
        let about = about.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match client.about().await {
                    Ok(found) => about.set(Some(found)),
                    Err(e) => error!("Error fetching about info: {}", e),
                }
            });
            || ()
        });
    }
    match &*about {
        Some(found) => html! {
            <div class="about-page">
                <h1>{ &found.title }</h1>
                <p>{ &found.content }</p>
            </div>
        },
        None => html! { <div class="about-page" /> },
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Back office

#[function_component(LoginPage)]
fn login_page() -> Html {
    let client = use_api_client();
    let busy = use_state(|| false);
    let failure = use_state(|| None::<String>);

    let on_submit = {
        let (busy, failure) = (busy.clone(), failure.clone());
        Callback::from(move |credentials: Credentials| {
            let (client, busy, failure) = (client.clone(), busy.clone(), failure.clone());
            busy.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                match AuthStore::browser().sign_in(&client, &credentials).await {
                    Ok(_) => navigate("/admin"),
                    Err(e) => {
                        warn!("Sign-in failed: {}", e);
                        failure.set(Some(e.user_message()));
                        busy.set(false);
                    }
                }
            });
        })
    };

    html! {
        <div class="login-page">
            <h1>{ "Hyrja e administratorit" }</h1>
            <LoginForm {on_submit} busy={*busy} error={(*failure).clone()} />
        </div>
    }
}

/// Run a back office mutation, then reload the admin lists.
fn run_admin_action<F>(
    what: &'static str,
    action: F,
    failure: UseStateHandle<Option<String>>,
    data_version: UseStateHandle<usize>,
) where
    F: Future<Output = Result<(), ApiError>> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        match action.await {
            Ok(()) => {
                info!("Admin action done: {}", what);
                bump_version(&data_version);
            }
            Err(e) => report(&failure, what, e),
        }
    });
}

#[function_component(AdminPage)]
fn admin_page() -> Html {
    let client = admin_client(use_api_client());
    let messages = use_state(Vec::<ContactMessage>::new);
    let makes = use_state(Vec::<Make>::new);
    let analytics = use_state(|| None::<SiteAnalytics>);
    let failure = use_state(|| None::<String>);
    // Bumped after every mutation to reload the lists.
    let data_version = use_state(|| 0usize);

    {
        let (client, messages, makes, analytics, failure) =
            (client.clone(), messages.clone(), makes.clone(), analytics.clone(), failure.clone());
        use_effect_with(*data_version, move |_| {
            if !AuthStore::browser().is_signed_in() {
                navigate("/auth");
            } else {
                wasm_bindgen_futures::spawn_local(async move {
                    let (found_messages, found_makes, found_analytics) = futures::join!(
                        client.contact_messages(None),
                        client.makes(),
                        client.analytics(ANALYTICS_DAYS)
                    );
                    match found_messages {
                        Ok(list) => messages.set(list),
                        Err(e) => report(&failure, "fetching messages", e),
                    }
                    makes.set(or_empty("makes", found_makes));
                    match found_analytics {
                        Ok(stats) => analytics.set(Some(stats)),
                        Err(e) => error!("Error fetching analytics: {}", e),
                    }
                });
            }
            || ()
        });
    }

    let on_mark_read = {
        let (client, failure, data_version) = (client.clone(), failure.clone(), data_version.clone());
        Callback::from(move |id: i64| {
            let client = client.clone();
            let action = async move { client.mark_message_read(id).await.map(|_| ()) };
            run_admin_action("marking message read", action, failure.clone(), data_version.clone());
        })
    };
    let on_delete_message = {
        let (client, failure, data_version) = (client.clone(), failure.clone(), data_version.clone());
        Callback::from(move |id: i64| {
            let client = client.clone();
            let action = async move { client.delete_message(id).await };
            run_admin_action("deleting message", action, failure.clone(), data_version.clone());
        })
    };
    let on_add_make = {
        let (client, failure, data_version) = (client.clone(), failure.clone(), data_version.clone());
        Callback::from(move |name: String| {
            let client = client.clone();
            let action = async move { client.add_make(&name).await.map(|_| ()) };
            run_admin_action("adding make", action, failure.clone(), data_version.clone());
        })
    };
    let on_delete_make = {
        let (client, failure, data_version) = (client.clone(), failure.clone(), data_version.clone());
        Callback::from(move |id: i64| {
            let client = client.clone();
            let action = async move { client.delete_make(id).await };
            run_admin_action("deleting make", action, failure.clone(), data_version.clone());
        })
    };
    let on_sign_out = Callback::from(|_: MouseEvent| {
        AuthStore::browser().sign_out();
        navigate("/auth");
    });

    let make_items: Vec<(i64, String)> = makes.iter().map(|m| (m.id, m.name.clone())).collect();
    html! {
        <div class="admin-page">
            <header class="admin-header">
                <h1>{ "Paneli i administrimit" }</h1>
                <button onclick={on_sign_out}>{ "Dil" }</button>
            </header>
            { render_failure(&failure) }
            if let Some(stats) = &*analytics {
                <AnalyticsSummary analytics={stats.clone()} />
            }
            <section class="admin-messages">
                <h2>{ "Mesazhet" }</h2>
                <MessagesTable messages={(*messages).clone()} {on_mark_read} on_delete={on_delete_message} />
            </section>
            <NameListEditor title="Markat" items={make_items} on_add={on_add_make} on_delete={on_delete_make} />
        </div>
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// App

/// Root component: shares favorites through context and picks the page.
#[function_component]
pub fn App() -> Html {
    let favorites = use_favorites();
    let path = current_path();
    let route = Route::parse(&path);

    use_effect_with(path.clone(), |path| {
        gloo_utils::document().set_title(&format!("{} | Auto Hafuzi", path_display_name(path)));
        || ()
    });

    let page = match route {
        Route::Catalog => html! { <CatalogPage /> },
        Route::Car(key) => html! { <CarDetailPage key_or_slug={key} /> },
        Route::Favorites => html! { <FavoritesPage /> },
        Route::Contact => html! { <ContactPage /> },
        Route::About => html! { <AboutPage /> },
        Route::Login => html! { <LoginPage /> },
        Route::Admin => html! { <AdminPage /> },
        Route::NotFound => html! { <p class="not-found">{ "Faqja nuk u gjet" }</p> },
    };

    html! {
        <ContextProvider<FavoritesHandle> context={favorites}>
            <nav class="main-nav">
                <a href="/">{ "Makinat" }</a>
                <a href="/favorites">{ "Të preferuarat" }</a>
                <a href="/about">{ "Rreth nesh" }</a>
                <a href="/contact">{ "Kontakt" }</a>
            </nav>
            { page }
        </ContextProvider<FavoritesHandle>>
    }
}

/// Entry point: installs logging and the panic hook, then renders the App.
fn main() {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Debug);
    yew::Renderer::<App>::new().render();
}
