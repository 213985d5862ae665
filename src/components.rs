//! Yew components for the search and edit pages.
//!
//! Each widget is mounted as its own app on the server-rendered element it
//! replaces; see `main.rs`.

use std::rc::Rc;

use asset_filters::fields::{DateRange, DATE_FORMAT};
use asset_filters::{
    Candidates, Encoding, FilterAction, FilterConfig, FilterOption, FilterState,
    HiddenInputStore, LookupConfig, QueryOp, QueryParamMirror,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, Node};
use yew::prelude::*;

use crate::browser::BrowserLocation;
use crate::config::{END_DATE_KEY, START_DATE_KEY};
use crate::hooks::{
    use_focus_request, use_outside_click, use_overflow_label, use_panel_registry,
    use_query_log_sync, use_remote_lookup,
};
use crate::utils::sanitize_tag;

#[derive(Properties, PartialEq)]
pub struct ChipFilterProps {
    pub config: Rc<FilterConfig>,
    pub candidates: Candidates,
    #[prop_or_default]
    pub preselected: Vec<FilterOption>,
    /// Remote lookup for filters without page-embedded options.
    #[prop_or_default]
    pub lookup: Option<LookupConfig>,
    pub search_mode: bool,
    #[prop_or_default]
    pub placeholder: AttrValue,
    /// Section headings keyed by category id.
    #[prop_or_default]
    pub category_labels: Rc<IndexMap<String, String>>,
}

/// Search box with a panel of candidate chips, a row of selected chips and
/// the hidden inputs the surrounding form submits.
#[function_component(ChipFilter)]
pub fn chip_filter(props: &ChipFilterProps) -> Html {
    let state = {
        let config = props.config.clone();
        let candidates = props.candidates.clone();
        let preselected = props.preselected.clone();
        use_reducer(move || FilterState::new(config, candidates, preselected))
    };
    let root_ref = use_node_ref();
    let input_ref = use_node_ref();
    let selected_ref = use_node_ref();

    use_query_log_sync(&state, props.search_mode);
    use_panel_registry(state.dispatcher(), state.is_open());
    use_outside_click(root_ref.clone(), {
        let dispatcher = state.dispatcher();
        Callback::from(move |_| dispatcher.dispatch(FilterAction::ClickOutside))
    });
    use_focus_request(input_ref.clone(), state.focus_requests());
    let lookup = use_remote_lookup(props.lookup.clone(), state.dispatcher());
    let overflow = use_overflow_label(selected_ref.clone(), state.selected().count());

    let oninput = {
        let dispatcher = state.dispatcher();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            dispatcher.dispatch(FilterAction::Input(value.clone()));
            lookup.emit(value);
        })
    };

    let onfocusin = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: FocusEvent| dispatcher.dispatch(FilterAction::FocusIn))
    };

    let onfocusout = {
        let dispatcher = state.dispatcher();
        let root_ref = root_ref.clone();
        Callback::from(move |e: FocusEvent| {
            let within = match (root_ref.get(), e.related_target()) {
                (Some(root), Some(target)) => target
                    .dyn_ref::<Node>()
                    .is_some_and(|node| root.contains(Some(node))),
                _ => false,
            };
            dispatcher.dispatch(FilterAction::FocusOut { within });
        })
    };

    let onactivate = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: String| dispatcher.dispatch(FilterAction::Activate(id)))
    };

    let ondismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |id: String| dispatcher.dispatch(FilterAction::Dismiss(id)))
    };

    let onexpand = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(FilterAction::Expand))
    };

    html! {
        <div class="p-search-and-filter" ref={root_ref} {onfocusin} {onfocusout}>
            <div class="p-search-and-filter__search-container"
                aria-expanded={state.is_open().to_string()}>
                <span class="p-chips" ref={selected_ref}>
                    { for state.selected().map(|option| html! {
                        <SelectedChip option={option.clone()} ondismiss={ondismiss.clone()} />
                    }) }
                </span>
                if !overflow.is_empty() {
                    <span class="p-search-and-filter__selected-count" onclick={onexpand}>
                        { overflow }
                    </span>
                }
                <div class="p-search-and-filter__box">
                    <input ref={input_ref}
                        type="search"
                        class="p-search-and-filter__input"
                        autocomplete="off"
                        placeholder={props.placeholder.clone()}
                        value={state.query().to_string()}
                        {oninput}
                    />
                </div>
            </div>
            <div class="p-search-and-filter__panel" aria-hidden={(!state.is_open()).to_string()}>
                { render_panel(&state, &props.category_labels, &onactivate) }
            </div>
            { for state.hidden_fields().map(|(field, value)| html! {
                <input type="hidden" name={field.to_string()} {value} />
            }) }
        </div>
    }
}

/// Panel body: a loading or empty notice, or candidates grouped by category
/// in the order they were ranked.
fn render_panel(
    state: &FilterState,
    labels: &IndexMap<String, String>,
    onactivate: &Callback<String>,
) -> Html {
    if state.is_awaiting() {
        return html! { <p class="p-search-and-filter__loading">{ "Loading..." }</p> };
    }
    if state.shows_no_results() {
        return html! {
            <p class="js-no-results"><strong>{ "No results found..." }</strong></p>
        };
    }

    let mut sections: IndexMap<Option<&str>, Vec<&FilterOption>> = IndexMap::new();
    for option in state.visible_candidates() {
        sections
            .entry(option.category.as_deref())
            .or_default()
            .push(option);
    }

    sections
        .into_iter()
        .map(|(category, options)| {
            let heading = category.map(|c| labels.get(c).cloned().unwrap_or_else(|| c.to_string()));
            html! {
                <div class="p-filter-panel-section">
                    if let Some(heading) = heading {
                        <h3 class="p-filter-panel-section__heading">{ heading }</h3>
                    }
                    <div class="p-filter-panel-section__chips">
                        { for options.into_iter().map(|option| html! {
                            <OptionChip option={option.clone()} onactivate={onactivate.clone()} />
                        }) }
                    </div>
                </div>
            }
        })
        .collect::<Html>()
}

#[derive(Properties, PartialEq)]
pub struct OptionChipProps {
    pub option: FilterOption,
    pub onactivate: Callback<String>,
}

#[function_component(OptionChip)]
pub fn option_chip(props: &OptionChipProps) -> Html {
    let onclick = {
        let id = props.option.id.clone();
        let onactivate = props.onactivate.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            onactivate.emit(id.clone());
        })
    };

    html! {
        <button type="button" class="p-chip js-unselected" data-id={props.option.id.clone()} {onclick}>
            <span class="p-chip__value">{ props.option.name.clone() }</span>
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct SelectedChipProps {
    pub option: FilterOption,
    pub ondismiss: Callback<String>,
}

#[function_component(SelectedChip)]
pub fn selected_chip(props: &SelectedChipProps) -> Html {
    let onclick = {
        let id = props.option.id.clone();
        let ondismiss = props.ondismiss.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            ondismiss.emit(id.clone());
        })
    };

    html! {
        <span class="p-chip is-dense js-selected" data-id={props.option.id.clone()}>
            <span class="p-chip__value">{ props.option.name.clone() }</span>
            <button type="button" class="p-chip__dismiss" {onclick}>{ "Dismiss" }</button>
        </span>
    }
}

#[derive(Properties, PartialEq)]
pub struct DateRangeProps {
    pub start_field: AttrValue,
    pub end_field: AttrValue,
    #[prop_or_default]
    pub initial: DateRange,
    pub search_mode: bool,
}

/// Two date inputs backed by hidden ISO-8601 fields.
#[function_component(DateRangePicker)]
pub fn date_range_picker(props: &DateRangeProps) -> Html {
    let range = {
        let initial = props.initial;
        use_state_eq(move || initial)
    };
    let start_ref = use_node_ref();
    let end_ref = use_node_ref();

    let onchange = {
        let range = range.clone();
        let start_ref = start_ref.clone();
        let end_ref = end_ref.clone();
        let search_mode = props.search_mode;
        Callback::from(move |_: Event| {
            let read = |r: &NodeRef| {
                r.cast::<HtmlInputElement>()
                    .map(|input| input.value())
                    .unwrap_or_default()
            };
            match DateRange::parse(&read(&start_ref), &read(&end_ref)) {
                Ok(next) => {
                    mirror_date_range(&next, search_mode);
                    range.set(next);
                }
                Err(err) => warn!("date range: {err}"),
            }
        })
    };

    html! {
        <div class="p-date-range">
            <input type="date"
                ref={start_ref}
                aria-label="Start date"
                value={format_date(range.start)}
                onchange={onchange.clone()}
            />
            <span class="p-date-range__separator">{ "to" }</span>
            <input type="date"
                ref={end_ref}
                aria-label="End date"
                value={format_date(range.end)}
                {onchange}
            />
            <input type="hidden" name={props.start_field.clone()}
                value={range.start_iso().unwrap_or_default()} />
            <input type="hidden" name={props.end_field.clone()}
                value={range.end_iso().unwrap_or_default()} />
        </div>
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn mirror_date_range(range: &DateRange, search_mode: bool) {
    let mut mirror = QueryParamMirror::new(BrowserLocation, search_mode);
    for (key, value) in [
        (START_DATE_KEY, range.start_iso()),
        (END_DATE_KEY, range.end_iso()),
    ] {
        let op = match value {
            Some(value) => QueryOp::Add {
                key: key.to_string(),
                value,
                replace: true,
            },
            None => QueryOp::Clear {
                key: key.to_string(),
            },
        };
        if let Err(err) = mirror.apply(&op) {
            warn!("date range: cannot update query string: {err}");
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct TagChipsProps {
    pub field: AttrValue,
    #[prop_or_default]
    pub input_id: Option<AttrValue>,
    #[prop_or_default]
    pub placeholder: AttrValue,
    #[prop_or_default]
    pub initial: Vec<String>,
}

/// Free-text tags: Enter turns the input into a sanitized chip.
#[function_component(TagChips)]
pub fn tag_chips(props: &TagChipsProps) -> Html {
    let tags = {
        let initial = props.initial.clone();
        use_state(move || {
            let mut store = HiddenInputStore::new(Encoding::Csv);
            for tag in &initial {
                let tag = tag.trim();
                if !tag.is_empty() {
                    store.add_value(tag, false);
                }
            }
            store
        })
    };

    let onkeydown = {
        let tags = tags.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() != "Enter" {
                return;
            }
            e.prevent_default();
            let input: HtmlInputElement = e.target_unchecked_into();
            let tag = sanitize_tag(&input.value());
            input.set_value("");
            if tag.is_empty() {
                return;
            }
            let mut next = (*tags).clone();
            if next.add_value(&tag, false) {
                debug!("tags: added {tag:?}");
                tags.set(next);
            }
        })
    };

    html! {
        <>
            <input type="text"
                id={props.input_id.clone()}
                placeholder={props.placeholder.clone()}
                autocomplete="off"
                {onkeydown}
            />
            <div class="added-chips">
                { for tags.ids().map(|tag| {
                    let onclick = {
                        let tags = tags.clone();
                        let tag = tag.to_string();
                        Callback::from(move |e: MouseEvent| {
                            e.prevent_default();
                            let mut next = (*tags).clone();
                            if next.remove(&tag) {
                                tags.set(next);
                            }
                        })
                    };
                    html! {
                        <span class="p-chip">
                            <span class="p-chip__value">{ tag.to_string() }</span>
                            <button type="button" class="p-chip__dismiss" {onclick}>{ "Dismiss" }</button>
                        </span>
                    }
                }) }
            </div>
            <input type="hidden" name={props.field.clone()} value={tags.serialize()} />
        </>
    }
}
