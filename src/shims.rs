//! Page-wide listeners for the plain form controls: multiselects, the
//! auto-submitting search fields and the submit spinner.
//!
//! These live as long as the page, so every listener is forgotten.

use asset_filters::fields::{join_selected, spinner_class_name};
use asset_filters::QueryParamMirror;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlButtonElement, HtmlInputElement, HtmlSelectElement};

use crate::browser::{BrowserLocation, EventListener};
use crate::config::*;
use crate::markup::{find, find_all};

/// Write `value` under `key`, or drop the key when the value is blank.
fn mirror_value(search_mode: bool, key: &str, value: &str) {
    let mut mirror = QueryParamMirror::new(BrowserLocation, search_mode);
    let result = if value.trim().is_empty() {
        mirror.clear(key)
    } else {
        mirror.add(key, value, true)
    };
    if let Err(err) = result {
        warn!("cannot mirror {key}: {err}");
    }
}

fn selected_values(select: &HtmlSelectElement) -> Vec<String> {
    let options = select.selected_options();
    (0..options.length())
        .filter_map(|i| options.item(i))
        .filter_map(|o| o.get_attribute("value").or_else(|| o.text_content()))
        .collect()
}

/// Native `<select multiple>` only submits its first value; copy the whole
/// selection into the sibling hidden field on every change.
pub fn attach_multiselects(search_mode: bool) -> usize {
    let mut attached = 0;
    for root in find_all(&document_root(), MULTISELECT) {
        let Some(hidden) = find(&root, HIDDEN_FIELD).and_then(|h| h.dyn_into::<HtmlInputElement>().ok()) else {
            warn!("multiselect without {HIDDEN_FIELD}, skipped");
            continue;
        };
        let select = match root.clone().dyn_into::<HtmlSelectElement>() {
            Ok(select) => select,
            Err(root) => match find(&root, "select").and_then(|s| s.dyn_into().ok()) {
                Some(select) => select,
                None => {
                    warn!("multiselect without a <select>, skipped");
                    continue;
                }
            },
        };

        let target = select.clone();
        EventListener::new(&select, "change", move |_: &Event| {
            let values = join_selected(selected_values(&target));
            hidden.set_value(&values);
            mirror_value(search_mode, &hidden.name(), &values);
        })
        .forget();
        attached += 1;
    }
    attached
}

/// The search page's auto-submitting fields only need their values copied
/// into the query string.
pub fn attach_search_mirrors() -> usize {
    let document = document_root();
    let mut attached = 0;

    for root in find_all(&document, SELECT) {
        let Some(select) = find(&root, "select").and_then(|s| s.dyn_into::<HtmlSelectElement>().ok()) else {
            continue;
        };
        let target = select.clone();
        EventListener::new(&select, "change", move |_: &Event| {
            mirror_value(true, &target.name(), &target.value());
        })
        .forget();
        attached += 1;
    }

    for selector in [TAGS_INPUT, SALESFORCE_ID_INPUT] {
        let Some(input) = find(&document, selector).and_then(|i| i.dyn_into::<HtmlInputElement>().ok()) else {
            continue;
        };
        let target = input.clone();
        EventListener::new(&input, "input", move |_: &Event| {
            mirror_value(true, &target.name(), &target.value());
        })
        .forget();
        attached += 1;
    }
    attached
}

/// Swap the label of every submit button of a submitting form for a spinner.
pub fn attach_submit_spinners() -> usize {
    let forms = find_all(&document_root(), "form");
    for form in &forms {
        let target = form.clone();
        EventListener::new(form, "submit", move |_: &Event| {
            for button in find_all(&target, SUBMIT_BUTTONS) {
                if let Ok(button) = button.dyn_into::<HtmlButtonElement>() {
                    show_spinner(&button);
                }
            }
        })
        .forget();
    }
    forms.len()
}

fn show_spinner(button: &HtmlButtonElement) {
    let positive = button.class_list().contains("p-button--positive");
    let Ok(icon) = gloo_utils::document().create_element("i") else {
        return;
    };
    icon.set_class_name(&spinner_class_name(positive));

    // Pin the size so the button does not collapse around the icon
    let rect = button.get_bounding_client_rect();
    let style = button.style();
    let _ = style.set_property("width", &format!("{}px", rect.width()));
    let _ = style.set_property("height", &format!("{}px", rect.height()));
    let _ = button.class_list().add_1("is-processing");
    button.set_disabled(true);
    button.set_inner_text("");
    if let Err(err) = button.append_child(&icon) {
        debug!("cannot add spinner: {err:?}");
    }
}

fn document_root() -> Element {
    gloo_utils::document_element()
}
