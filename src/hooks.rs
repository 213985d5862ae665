//! Side-effect hooks shared by the chip filters.

use std::cell::RefCell;
use std::rc::Rc;

use asset_filters::fields::{overflow_label, overflowing_chips_count, ChipMetrics};
use asset_filters::{FilterAction, FilterState, LookupConfig, LookupSequencer, QueryParamMirror};
use futures::future::{AbortHandle, Abortable};
use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, HtmlElement, HtmlInputElement, Node};
use yew::prelude::*;

use crate::browser::{fetch_options, BrowserLocation, EventListener};
use crate::config::OVERFLOW_ROW_LIMIT;
use crate::registry;

/// Replay query-log entries the page URL has not seen yet, then report them
/// applied so the state can drop them.
///
/// Several dispatches can be reduced before the effect runs, so the hook
/// keeps a cursor into the log instead of looking at the last entry only.
#[hook]
pub fn use_query_log_sync(state: &UseReducerHandle<FilterState>, search_mode: bool) {
    let applied = use_mut_ref(|| 0usize);
    let state = state.clone();

    use_effect_with(state.query_log_end(), move |&end| {
        let pending = state.pending_ops(*applied.borrow());
        if !pending.is_empty() {
            let mut mirror = QueryParamMirror::new(BrowserLocation, search_mode);
            for op in pending {
                if let Err(err) = mirror.apply(op) {
                    warn!("{}: cannot update query string: {err}", state.config().name);
                }
            }
            state.dispatch(FilterAction::QueryApplied(end));
        }
        *applied.borrow_mut() = end;
        || ()
    });
}

/// Register this filter's panel so opening it closes the others.
#[hook]
pub fn use_panel_registry(dispatcher: UseReducerDispatcher<FilterState>, open: bool) {
    let id = *use_state(registry::next_id);

    use_effect_with(id, move |&id| {
        registry::register(
            id,
            Callback::from(move |_| dispatcher.dispatch(FilterAction::Close)),
        );
        move || registry::unregister(id)
    });

    use_effect_with(open, move |&open| {
        if open {
            registry::close_others(id);
        }
        || ()
    });
}

/// Emit `on_outside` for document clicks that land outside `root`.
#[hook]
pub fn use_outside_click(root: NodeRef, on_outside: Callback<()>) {
    use_effect_with(root, move |root| {
        let root = root.clone();
        let listener = EventListener::new(&gloo_utils::document(), "click", move |e: &Event| {
            let Some(root) = root.get() else {
                return;
            };
            let inside = e
                .target()
                .and_then(|t| t.dyn_into::<Node>().ok())
                .is_some_and(|target| root.contains(Some(&target)));
            if !inside {
                on_outside.emit(());
            }
        });
        move || drop(listener)
    });
}

/// Move focus to `input` whenever `requests` changes after the first render.
#[hook]
pub fn use_focus_request(input: NodeRef, requests: u32) {
    use_effect_with(requests, move |&requests| {
        if requests > 0 {
            if let Some(input) = input.cast::<HtmlInputElement>() {
                if let Err(err) = input.focus() {
                    debug!("cannot refocus search input: {err:?}");
                }
            }
        }
        || ()
    });
}

/// Debounced remote lookup.
///
/// The returned callback takes the raw query. Each keystroke drops the
/// pending timer and invalidates and aborts the request in flight; when a
/// timer fires it takes a fresh ticket, so only the latest query can reach
/// the reducer.
/// Failures are logged and shown as an empty result list.
#[hook]
pub fn use_remote_lookup(
    lookup: Option<LookupConfig>,
    dispatcher: UseReducerDispatcher<FilterState>,
) -> Callback<String> {
    let timer = use_mut_ref(|| None::<Timeout>);
    let sequencer = use_mut_ref(LookupSequencer::default);
    let in_flight: Rc<RefCell<Option<AbortHandle>>> = use_mut_ref(|| None);

    let Some(lookup) = lookup else {
        return Callback::noop();
    };

    Callback::from(move |query: String| {
        // Dropping the timeout cancels it
        timer.borrow_mut().take();
        let wanted = sequencer.borrow_mut().input(&query);
        if let Some(handle) = in_flight.borrow_mut().take() {
            handle.abort();
        }
        if !wanted {
            return;
        }

        let lookup = lookup.clone();
        let sequencer = sequencer.clone();
        let in_flight = in_flight.clone();
        let dispatcher = dispatcher.clone();
        let handle = Timeout::new(lookup.debounce_ms, move || {
            let ticket = sequencer.borrow_mut().issue();
            let (abort, registration) = AbortHandle::new_pair();
            if let Some(previous) = in_flight.borrow_mut().replace(abort) {
                previous.abort();
            }

            spawn_local(async move {
                let fetched = Abortable::new(fetch_options(&lookup, &query), registration).await;
                let Ok(result) = fetched else {
                    debug!("lookup for {query:?} superseded");
                    return;
                };
                if !sequencer.borrow().is_current(ticket) {
                    debug!("dropping stale results for {query:?}");
                    return;
                }
                let options = result.unwrap_or_else(|err| {
                    warn!("lookup for {query:?} failed: {err}");
                    Vec::new()
                });
                dispatcher.dispatch(FilterAction::LookupResults(options));
            });
        });
        *timer.borrow_mut() = Some(handle);
    })
}

/// `+N` label for selected chips that wrapped past the first row.
#[hook]
pub fn use_overflow_label(container: NodeRef, selected: usize) -> String {
    let label = use_state_eq(String::new);
    {
        let label = label.clone();
        use_effect_with(selected, move |_| {
            if let Some(container) = container.cast::<Element>() {
                let chips = chip_metrics(&container);
                label.set(overflow_label(overflowing_chips_count(
                    &chips,
                    OVERFLOW_ROW_LIMIT,
                )));
            }
            || ()
        });
    }
    (*label).clone()
}

fn chip_metrics(container: &Element) -> Vec<ChipMetrics> {
    let children = container.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter_map(|c| c.dyn_into::<HtmlElement>().ok())
        .map(|c| ChipMetrics {
            offset_top: c.offset_top(),
            offset_height: c.offset_height(),
        })
        .collect()
}
