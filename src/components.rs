//! Yew view components for the catalog, the car pages and the back office.
//!
//! Most components render from props. The exceptions own a small piece of
//! form state or load their own data (recommendations).

use crate::activity::ActivityTracker;
use crate::clock::now_ms;
use crate::config::{
    BODY_TYPES, CONDITION_OPTIONS, CREATED_SINCE_OPTIONS, DEBOUNCE_MS, DOOR_OPTIONS, EMISSION_CLASSES,
    FUEL_TYPES, GEARBOX_TYPES, REGISTRATION_YEAR_SPAN, SEAT_OPTIONS,
};
use crate::filters::{FilterKey, RangeField};
use crate::hooks::{use_api_client, use_debounced, use_validated_input, CarFilterHandle, FavoritesHandle};
use crate::labels::{active_filters, group_options, ActiveFilter, CatalogLists};
use crate::models::{Car, CarOption, ContactForm, ContactMessage, Credentials, SiteAnalytics};
use crate::recommend::fetch_recommendations;
use crate::utils::{car_detail_path, car_image_src, format_mileage, format_power, format_price, year_of};
use crate::validation::{
    validate_contact, validate_mileage_input, validate_name, validate_power_input, validate_price_input,
    ValidationErrors,
};
use log::error;
use std::rc::Rc;
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

fn pairs<T: ToString>(values: &[T]) -> Vec<(String, String)> {
    values.iter().map(|v| (v.to_string(), v.to_string())).collect()
}

fn labelled(values: &[(&str, &str)]) -> Vec<(String, String)> {
    values
        .iter()
        .map(|(v, label)| (v.to_string(), label.to_string()))
        .collect()
}

fn field_error(errors: &ValidationErrors, field: &str) -> Html {
    match errors.get(field) {
        Some(message) => html! { <span class="field-error">{ message }</span> },
        None => html! {},
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Cars

#[derive(Properties, PartialEq)]
pub struct FavoriteButtonProps {
    pub car_id: i64,
    #[prop_or_default]
    pub slug: Option<String>,
}

#[function_component(FavoriteButton)]
pub fn favorite_button(props: &FavoriteButtonProps) -> Html {
    let favorites = use_context::<FavoritesHandle>();
    let Some(favorites) = favorites else {
        return html! {};
    };
    let active = favorites.contains(props.car_id);
    let onclick = {
        let toggle = favorites.toggle.clone();
        let (id, slug) = (props.car_id, props.slug.clone());
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            e.stop_propagation();
            toggle.emit((id, slug.clone()));
        })
    };
    let title = if active { "Hiq nga të preferuarat" } else { "Shto te të preferuarat" };

    html! {
        <button class={classes!("favorite-button", active.then_some("active"))} {title} {onclick}>
            { if active { "♥" } else { "♡" } }
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct CarCardProps {
    pub car: Car,
    pub api_base: AttrValue,
}

#[function_component(CarCard)]
pub fn car_card(props: &CarCardProps) -> Html {
    let car = &props.car;
    let href = car_detail_path(car);
    let title = car.title();

    html! {
        <div class="car-card">
            <a href={href.clone()} class="car-card-image">
                <img src={car_image_src(&props.api_base, car)} alt={title.clone()} loading="lazy" />
            </a>
            <div class="car-card-body">
                <h3><a href={href}>{ title }</a></h3>
                <div class="car-price">{ format_price(car.price, car.discussed_price) }</div>
                <ul class="car-specs">
                    { for car.first_registration_year.map(|y| html! { <li>{ y }</li> }) }
                    <li>{ format_mileage(car.mileage as u64) }</li>
                    { for (!car.fuel_type.is_empty()).then(|| html! { <li>{ &car.fuel_type }</li> }) }
                    { for (!car.gearbox.is_empty()).then(|| html! { <li>{ &car.gearbox }</li> }) }
                    { for (car.power > 0).then(|| html! { <li>{ format_power(car.power) }</li> }) }
                </ul>
            </div>
            <FavoriteButton car_id={car.id} slug={Some(car.link_key())} />
        </div>
    }
}

/// Grid of car cards, or a notice when there is nothing to show.
pub fn render_car_grid(cars: &[Car], api_base: &str) -> Html {
    if cars.is_empty() {
        return html! {
            <div class="car-grid">
                <p class="no-results-message">{ "Nuk u gjetën makina" }</p>
            </div>
        };
    }
    html! {
        <div class="car-grid">
            { for cars.iter().map(|car| html! {
                <CarCard key={car.id} car={car.clone()} api_base={AttrValue::from(api_base.to_string())} />
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PaginationProps {
    pub page: u32,
    pub total: u64,
    pub page_size: u32,
    pub on_page: Callback<u32>,
}

#[function_component(Pagination)]
pub fn pagination(props: &PaginationProps) -> Html {
    let pages = props.total.div_ceil(props.page_size.max(1) as u64) as u32;
    if pages <= 1 {
        return html! {};
    }
    let go = |target: u32| {
        let on_page = props.on_page.clone();
        Callback::from(move |_: MouseEvent| on_page.emit(target))
    };
    html! {
        <nav class="pagination">
            <button disabled={props.page <= 1} onclick={go(props.page.saturating_sub(1))}>{ "‹" }</button>
            <span>{ format!("{} / {}", props.page, pages) }</span>
            <button disabled={props.page >= pages} onclick={go(props.page + 1)}>{ "›" }</button>
        </nav>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecommendedCarsProps {
    #[prop_or_default]
    pub current: Option<Car>,
    #[prop_or_default]
    pub exclude: Vec<i64>,
    pub api_base: AttrValue,
}

/// "Similar cars" strip. Loads its own data whenever the car changes.
#[function_component(RecommendedCars)]
pub fn recommended_cars(props: &RecommendedCarsProps) -> Html {
    let client = use_api_client();
    let cars = use_state(Vec::<Car>::new);
    let loading = use_state(|| true);

    {
        let (cars, loading) = (cars.clone(), loading.clone());
        let current = props.current.clone();
        let deps = (current.as_ref().map(|c| c.id), props.exclude.clone());
        use_effect_with(deps, move |(_, exclude)| {
            let exclude = exclude.clone();
            loading.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                let tracker = ActivityTracker::browser();
                match fetch_recommendations(&client, &tracker, current.as_ref(), &exclude).await {
                    Ok(list) => cars.set(list),
                    Err(e) => error!("Error fetching recommendations: {}", e),
                }
                loading.set(false);
            });
            || ()
        });
    }

    if *loading {
        return html! { <div class="recommended-cars loading">{ "Duke ngarkuar..." }</div> };
    }
    if cars.is_empty() {
        return html! {};
    }
    html! {
        <section class="recommended-cars">
            <h2>{ "Makina të ngjashme" }</h2>
            { render_car_grid(&cars, &props.api_base) }
        </section>
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Filters

#[derive(Properties, PartialEq)]
pub struct ActiveFiltersListProps {
    pub chips: Vec<ActiveFilter>,
    pub on_remove: Callback<String>,
    pub on_clear: Callback<()>,
}

#[function_component(ActiveFiltersList)]
pub fn active_filters_list(props: &ActiveFiltersListProps) -> Html {
    if props.chips.is_empty() {
        return html! {};
    }
    let on_clear = props.on_clear.reform(|_: MouseEvent| ());
    html! {
        <div class="active-filters">
            { for props.chips.iter().map(|chip| {
                let key = chip.key.clone();
                let on_remove = props.on_remove.reform(move |_: MouseEvent| key.clone());
                html! {
                    <span class="filter-chip" key={chip.key.clone()}>
                        { &chip.label }
                        <button class="chip-remove" onclick={on_remove}>{ "×" }</button>
                    </span>
                }
            }) }
            <button class="clear-filters" onclick={on_clear}>{ "Pastro të gjitha" }</button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SelectFieldProps {
    pub name: AttrValue,
    pub label: AttrValue,
    /// `(value, label)`
    pub options: Vec<(String, String)>,
    #[prop_or_default]
    pub value: Option<String>,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or(AttrValue::from("Të gjitha"))]
    pub placeholder: AttrValue,
    /// Emits `(name, value)`; an empty value clears the filter.
    pub onchange: Callback<(String, String)>,
}

#[function_component(SelectField)]
pub fn select_field(props: &SelectFieldProps) -> Html {
    let onchange = {
        let (name, cb) = (props.name.to_string(), props.onchange.clone());
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            cb.emit((name.clone(), select.value()));
        })
    };
    let current = props.value.clone().unwrap_or_default();

    html! {
        <div class="form-group">
            <label for={props.name.clone()}>{ &props.label }</label>
            <select id={props.name.clone()} disabled={props.disabled} {onchange}>
                <option value="" selected={current.is_empty()}>{ &props.placeholder }</option>
                { for props.options.iter().map(|(value, label)| html! {
                    <option value={value.clone()} selected={*value == current}>{ label }</option>
                }) }
            </select>
        </div>
    }
}

fn range_parser(field: RangeField) -> Rc<dyn Fn(&str) -> Result<u32, String>> {
    match field {
        RangeField::Price => Rc::new(validate_price_input),
        RangeField::Mileage => Rc::new(validate_mileage_input),
        RangeField::Power => Rc::new(validate_power_input),
    }
}

#[derive(Properties, PartialEq)]
pub struct RangeInputsProps {
    pub field: RangeField,
    pub label: AttrValue,
    pub min: u32,
    pub max: u32,
    pub onchange: Callback<(RangeField, u32, u32)>,
}

/// Min/max text inputs plus a slider for the upper bound. Committed values
/// are reported after a short pause.
#[function_component(RangeInputs)]
pub fn range_inputs(props: &RangeInputsProps) -> Html {
    let (limit_min, limit_max, step) = props.field.limits();
    let min_input = use_validated_input(props.min, range_parser(props.field));
    let max_input = use_validated_input(props.max, range_parser(props.field));
    let report = use_debounced(props.onchange.clone(), DEBOUNCE_MS);

    {
        let (set_min, set_max) = (min_input.set.clone(), max_input.set.clone());
        use_effect_with((props.min, props.max), move |(min, max)| {
            set_min.emit(*min);
            set_max.emit(*max);
            || ()
        });
    }
    {
        let field = props.field;
        let outer = (props.min, props.max);
        use_effect_with((min_input.value, max_input.value), move |&(min, max)| {
            if (min, max) != outer {
                report.emit((field, min, max));
            }
            || ()
        });
    }

    let on_enter = |commit: Callback<()>| {
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                commit.emit(());
            }
        })
    };
    let on_slide = {
        let set_max = max_input.set.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(value) = input.value().parse::<u32>() {
                set_max.emit(value);
            }
        })
    };

    html! {
        <div class="form-group range-inputs">
            <label>{ &props.label }</label>
            <div class="range-row">
                <input type="number" placeholder="Min"
                    value={min_input.text.clone()}
                    oninput={min_input.oninput.clone()}
                    onchange={min_input.commit.reform(|_: Event| ())}
                    onkeydown={on_enter(min_input.commit.clone())}
                />
                <input type="number" placeholder="Max"
                    value={max_input.text.clone()}
                    oninput={max_input.oninput.clone()}
                    onchange={max_input.commit.reform(|_: Event| ())}
                    onkeydown={on_enter(max_input.commit.clone())}
                />
            </div>
            <input type="range"
                min={limit_min.to_string()}
                max={limit_max.to_string()}
                step={step.to_string()}
                value={max_input.value.to_string()}
                oninput={on_slide}
            />
            { for min_input.error.iter().chain(max_input.error.iter()).map(|e| html! {
                <span class="field-error">{ e }</span>
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct OptionsChecklistProps {
    pub options: Vec<CarOption>,
    pub selected: Vec<String>,
    pub on_toggle: Callback<String>,
}

#[function_component(OptionsChecklist)]
pub fn options_checklist(props: &OptionsChecklistProps) -> Html {
    html! {
        <div class="options-checklist">
            { for group_options(&props.options).into_iter().map(|(category, options)| html! {
                <fieldset key={category.clone()}>
                    <legend>{ category }</legend>
                    { for options.iter().map(|option| {
                        let id = option.id.to_string();
                        let checked = props.selected.contains(&id);
                        let onchange = props.on_toggle.reform({
                            let id = id.clone();
                            move |_: Event| id.clone()
                        });
                        html! {
                            <label class="option-item">
                                <input type="checkbox" {checked} {onchange} />
                                { &option.name }
                            </label>
                        }
                    }) }
                </fieldset>
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct FilterPanelProps {
    pub handle: CarFilterHandle,
    /// Catalog lists loaded by the page; models and variants come from the
    /// filter itself.
    pub lists: CatalogLists,
}

#[function_component(FilterPanel)]
pub fn filter_panel(props: &FilterPanelProps) -> Html {
    let handle = &props.handle;
    let filter = &handle.filter;
    let record = filter.record();
    let value = |key: FilterKey| record.get_key(key).map(str::to_string);

    let mut lists = props.lists.clone();
    lists.models = filter.models().to_vec();
    lists.variants = filter.variants().to_vec();
    let chips = active_filters(record, &lists);

    let current_year = year_of(now_ms());
    let years: Vec<(String, String)> = (current_year - REGISTRATION_YEAR_SPAN..=current_year)
        .rev()
        .map(|y| (y.to_string(), y.to_string()))
        .collect();
    let makes: Vec<(String, String)> = lists.makes.iter().map(|m| (m.id.to_string(), m.name.clone())).collect();
    let models: Vec<(String, String)> = lists.models.iter().map(|m| (m.id.to_string(), m.name.clone())).collect();
    let variants: Vec<(String, String)> =
        lists.variants.iter().map(|v| (v.id.to_string(), v.name.clone())).collect();
    let colors: Vec<(String, String)> =
        lists.exterior_colors.iter().map(|c| (c.id.to_string(), c.name.clone())).collect();
    let upholstery: Vec<(String, String)> =
        lists.upholstery.iter().map(|u| (u.id.to_string(), u.name.clone())).collect();

    let loading = |busy: bool| AttrValue::from(if busy { "Duke ngarkuar..." } else { "Të gjitha" });
    let range = |field: RangeField, label: &'static str| {
        let (min, max) = record.range(field);
        html! { <RangeInputs {field} label={label} {min} {max} onchange={handle.set_range.clone()} /> }
    };
    let onsubmit = handle.submit.reform(|e: SubmitEvent| e.prevent_default());
    let onreset = handle.reset.reform(|_: MouseEvent| ());

    html! {
        <form class="filter-panel" {onsubmit}>
            <ActiveFiltersList chips={chips} on_remove={handle.remove_filter.clone()} on_clear={handle.reset.clone()} />
            <SelectField name="make" label="Marka" options={makes} value={value(FilterKey::Make)}
                onchange={handle.set_field.clone()} />
            <SelectField name="model" label="Modeli" options={models} value={value(FilterKey::Model)}
                disabled={value(FilterKey::Make).is_none() || filter.models_loading()}
                placeholder={loading(filter.models_loading())}
                onchange={handle.set_field.clone()} />
            <SelectField name="variant" label="Varianti" options={variants} value={value(FilterKey::Variant)}
                disabled={value(FilterKey::Model).is_none() || filter.variants_loading()}
                placeholder={loading(filter.variants_loading())}
                onchange={handle.set_field.clone()} />
            <SelectField name="first_registration_from" label="Viti nga" options={years.clone()}
                value={value(FilterKey::FirstRegistrationFrom)} onchange={handle.set_field.clone()} />
            <SelectField name="first_registration_to" label="Viti deri" options={years}
                value={value(FilterKey::FirstRegistrationTo)} onchange={handle.set_field.clone()} />
            { range(RangeField::Price, "Çmimi (€)") }
            { range(RangeField::Mileage, "Kilometrazhi (km)") }
            { range(RangeField::Power, "Fuqia (KF)") }
            <SelectField name="bodyType" label="Tipi i karrocerisë" options={pairs(BODY_TYPES)}
                value={value(FilterKey::BodyType)} onchange={handle.set_field.clone()} />
            <SelectField name="fuel_type" label="Karburanti" options={pairs(FUEL_TYPES)}
                value={value(FilterKey::FuelType)} onchange={handle.set_field.clone()} />
            <SelectField name="gearbox" label="Transmisioni" options={pairs(GEARBOX_TYPES)}
                value={value(FilterKey::Gearbox)} onchange={handle.set_field.clone()} />
            <SelectField name="doors" label="Dyert" options={pairs(DOOR_OPTIONS)}
                value={value(FilterKey::Doors)} onchange={handle.set_field.clone()} />
            <SelectField name="seats" label="Ndenjëset" options={pairs(SEAT_OPTIONS)}
                value={value(FilterKey::Seats)} onchange={handle.set_field.clone()} />
            <SelectField name="condition" label="Gjendja" options={labelled(CONDITION_OPTIONS)}
                value={value(FilterKey::Condition)} onchange={handle.set_field.clone()} />
            <SelectField name="exterior_color" label="Ngjyra e jashtme" options={colors}
                value={value(FilterKey::ExteriorColor)} onchange={handle.set_field.clone()} />
            <SelectField name="upholstery" label="Tapiceria" options={upholstery}
                value={value(FilterKey::Upholstery)} onchange={handle.set_field.clone()} />
            <SelectField name="emission_class" label="Klasa e emisioneve" options={pairs(EMISSION_CLASSES)}
                value={value(FilterKey::EmissionClass)} onchange={handle.set_field.clone()} />
            <SelectField name="created_since" label="Krijuar që prej" options={labelled(CREATED_SINCE_OPTIONS)}
                value={value(FilterKey::CreatedSince)} onchange={handle.set_field.clone()} />
            <OptionsChecklist options={lists.options.clone()} selected={record.options().to_vec()}
                on_toggle={handle.toggle_option.clone()} />
            <div class="filter-actions">
                <button type="submit" class="primary">{ "Kërko" }</button>
                <button type="button" onclick={onreset}>{ "Pastro" }</button>
            </div>
        </form>
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Forms

fn text_setter<F>(form: &UseStateHandle<ContactForm>, apply: F) -> Callback<InputEvent>
where
    F: Fn(&mut ContactForm, String) + 'static,
{
    let form = form.clone();
    Callback::from(move |e: InputEvent| {
        let value = match e.target_dyn_into::<HtmlTextAreaElement>() {
            Some(area) => area.value(),
            None => e.target_unchecked_into::<HtmlInputElement>().value(),
        };
        let mut next = (*form).clone();
        apply(&mut next, value);
        form.set(next);
    })
}

#[derive(Properties, PartialEq)]
pub struct ContactFormViewProps {
    pub on_submit: Callback<ContactForm>,
    #[prop_or_default]
    pub busy: bool,
    /// Server outcome to show under the form.
    #[prop_or_default]
    pub status: Option<String>,
}

/// Contact form. Emits only when every field validates.
#[function_component(ContactFormView)]
pub fn contact_form_view(props: &ContactFormViewProps) -> Html {
    let form = use_state(ContactForm::default);
    let errors = use_state(ValidationErrors::new);

    let onsubmit = {
        let (form, errors, on_submit) = (form.clone(), errors.clone(), props.on_submit.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match validate_contact(&form) {
                Ok(()) => {
                    errors.set(ValidationErrors::new());
                    on_submit.emit((*form).clone());
                }
                Err(found) => errors.set(found),
            }
        })
    };

    html! {
        <form class="contact-form" {onsubmit}>
            <div class="form-group">
                <label>{ "Emri" }</label>
                <input type="text" value={form.name.clone()} oninput={text_setter(&form, |f, v| f.name = v)} />
                { field_error(&errors, "name") }
            </div>
            <div class="form-group">
                <label>{ "Email" }</label>
                <input type="email" value={form.email.clone()} oninput={text_setter(&form, |f, v| f.email = v)} />
                { field_error(&errors, "email") }
            </div>
            <div class="form-group">
                <label>{ "Telefoni" }</label>
                <input type="tel" value={form.phone.clone()} oninput={text_setter(&form, |f, v| f.phone = v)} />
                { field_error(&errors, "phone") }
            </div>
            <div class="form-group">
                <label>{ "Subjekti" }</label>
                <input type="text" value={form.subject.clone()} oninput={text_setter(&form, |f, v| f.subject = v)} />
                { field_error(&errors, "subject") }
            </div>
            <div class="form-group">
                <label>{ "Mesazhi" }</label>
                <textarea value={form.message.clone()} oninput={text_setter(&form, |f, v| f.message = v)} />
                { field_error(&errors, "message") }
            </div>
            <button type="submit" class="primary" disabled={props.busy}>{ "Dërgo" }</button>
            { for props.status.iter().map(|s| html! { <p class="form-status">{ s }</p> }) }
        </form>
    }
}

#[derive(Properties, PartialEq)]
pub struct LoginFormProps {
    pub on_submit: Callback<Credentials>,
    #[prop_or_default]
    pub busy: bool,
    #[prop_or_default]
    pub error: Option<String>,
}

#[function_component(LoginForm)]
pub fn login_form(props: &LoginFormProps) -> Html {
    let username = use_state(String::new);
    let password = use_state(String::new);

    let bind = |state: &UseStateHandle<String>| {
        let state = state.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            state.set(input.value());
        })
    };
    let onsubmit = {
        let (username, password, on_submit) = (username.clone(), password.clone(), props.on_submit.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(Credentials {
                username: username.trim().to_string(),
                password: (*password).clone(),
            });
        })
    };

    html! {
        <form class="login-form" {onsubmit}>
            <div class="form-group">
                <label>{ "Përdoruesi" }</label>
                <input type="text" value={(*username).clone()} oninput={bind(&username)} />
            </div>
            <div class="form-group">
                <label>{ "Fjalëkalimi" }</label>
                <input type="password" value={(*password).clone()} oninput={bind(&password)} />
            </div>
            <button type="submit" class="primary"
                disabled={props.busy || username.trim().is_empty() || password.is_empty()}>
                { "Hyr" }
            </button>
            { for props.error.iter().map(|e| html! { <p class="field-error">{ e }</p> }) }
        </form>
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Back office

#[derive(Properties, PartialEq)]
pub struct MessagesTableProps {
    pub messages: Vec<ContactMessage>,
    pub on_mark_read: Callback<i64>,
    pub on_delete: Callback<i64>,
}

#[function_component(MessagesTable)]
pub fn messages_table(props: &MessagesTableProps) -> Html {
    if props.messages.is_empty() {
        return html! { <p class="no-results-message">{ "Nuk ka mesazhe" }</p> };
    }
    html! {
        <table class="messages-table">
            <thead>
                <tr>
                    <th>{ "Data" }</th>
                    <th>{ "Nga" }</th>
                    <th>{ "Subjekti" }</th>
                    <th>{ "Mesazhi" }</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                { for props.messages.iter().map(|m| {
                    let id = m.id;
                    html! {
                        <tr key={id} class={classes!((!m.is_read).then_some("unread"))}>
                            <td>{ m.created_at.get(..10).unwrap_or(m.created_at.as_str()) }</td>
                            <td>{ format!("{} <{}>", m.name, m.email) }</td>
                            <td>{ &m.subject }</td>
                            <td>{ &m.message }</td>
                            <td>
                                if !m.is_read {
                                    <button onclick={props.on_mark_read.reform(move |_: MouseEvent| id)}>
                                        { "Shëno si të lexuar" }
                                    </button>
                                }
                                <button class="danger" onclick={props.on_delete.reform(move |_: MouseEvent| id)}>
                                    { "Fshi" }
                                </button>
                            </td>
                        </tr>
                    }
                }) }
            </tbody>
        </table>
    }
}

#[derive(Properties, PartialEq)]
pub struct NameListEditorProps {
    pub title: AttrValue,
    /// `(id, name)`
    pub items: Vec<(i64, String)>,
    pub on_add: Callback<String>,
    pub on_delete: Callback<i64>,
}

/// List of named catalog entries with an add field, used for makes.
#[function_component(NameListEditor)]
pub fn name_list_editor(props: &NameListEditorProps) -> Html {
    let draft = use_state(String::new);
    let errors = use_state(ValidationErrors::new);

    let oninput = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            draft.set(input.value());
        })
    };
    let onsubmit = {
        let (draft, errors, on_add) = (draft.clone(), errors.clone(), props.on_add.clone());
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match validate_name(&draft) {
                Ok(()) => {
                    on_add.emit(draft.trim().to_string());
                    draft.set(String::new());
                    errors.set(ValidationErrors::new());
                }
                Err(found) => errors.set(found),
            }
        })
    };

    html! {
        <section class="name-list-editor">
            <h2>{ &props.title }</h2>
            <form {onsubmit}>
                <input type="text" value={(*draft).clone()} {oninput} />
                <button type="submit">{ "Shto" }</button>
                { field_error(&errors, "name") }
            </form>
            <ul>
                { for props.items.iter().map(|(id, name)| {
                    let id = *id;
                    html! {
                        <li key={id}>
                            { name }
                            <button class="danger" onclick={props.on_delete.reform(move |_: MouseEvent| id)}>
                                { "Fshi" }
                            </button>
                        </li>
                    }
                }) }
            </ul>
        </section>
    }
}

#[derive(Properties, PartialEq)]
pub struct AnalyticsSummaryProps {
    pub analytics: SiteAnalytics,
}

#[function_component(AnalyticsSummary)]
pub fn analytics_summary(props: &AnalyticsSummaryProps) -> Html {
    let a = &props.analytics;
    html! {
        <section class="analytics-summary">
            <div class="stat">{ format!("Vizitorë unikë: {}", a.unique_visitors) }</div>
            <div class="stat">{ format!("Shikime faqesh: {}", a.total_page_views) }</div>
            <div class="stat">{ format!("Shikime makinash: {}", a.car_views) }</div>
            <ol class="most-viewed">
                { for a.most_viewed_cars.iter().map(|car| html! {
                    <li key={car.id}>
                        <a href={format!("/car/{}", car.slug)}>{ &car.name }</a>
                        { format!(" ({})", car.views) }
                    </li>
                }) }
            </ol>
        </section>
    }
}
