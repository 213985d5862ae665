//! Reads the server-rendered markup of each widget into component props.
//!
//! Everything is read before a component mounts, because mounting replaces
//! the children of the host element. Missing or malformed markup is a
//! `SetupError`; the caller logs it and leaves that widget alone.

use std::collections::HashSet;
use std::rc::Rc;

use asset_filters::fields::{parse_date, DateRange};
use asset_filters::{
    Candidates, Cardinality, Encoding, FieldBinding, FilterConfig, FilterOption, FuzzyMatcher,
    HiddenInputStore, LookupConfig, PanelTrigger, Projection, SetupError,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

use crate::components::{ChipFilterProps, DateRangeProps, TagChipsProps};
use crate::config::*;
use crate::utils::{parse_debounce_ms, parse_empty_query};

pub fn find(scope: &Element, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

pub fn find_all(scope: &Element, selector: &str) -> Vec<Element> {
    let Ok(nodes) = scope.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

fn require(scope: &Element, selector: &str, filter: &str) -> Result<Element, SetupError> {
    find(scope, selector).ok_or_else(|| SetupError::MissingElement {
        filter: filter.to_string(),
        selector: selector.to_string(),
    })
}

fn require_attr(
    el: &Element,
    attribute: &str,
    selector: &str,
    filter: &str,
) -> Result<String, SetupError> {
    el.get_attribute(attribute)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SetupError::MissingAttribute {
            filter: filter.to_string(),
            selector: selector.to_string(),
            attribute: attribute.to_string(),
        })
}

fn input_value(el: &Element) -> String {
    el.dyn_ref::<HtmlInputElement>()
        .map(|input| input.value())
        .or_else(|| el.get_attribute("value"))
        .unwrap_or_default()
}

/// A hidden form field the component will render itself.
struct HiddenField {
    name: String,
    value: String,
    /// Set when the field sits outside the widget root.
    outside: Option<Element>,
}

impl HiddenField {
    /// Remove a field outside the root so the form does not submit it twice.
    /// Only called once the whole widget has been read.
    fn detach(&self) {
        if let Some(field) = &self.outside {
            field.remove();
        }
    }
}

/// Fields the page template renders beside the widget rather than inside it.
/// Anything else, `.js-hidden-field` above all, must come from the root, or
/// one widget would take another's field.
fn page_wide(selector: &str) -> bool {
    matches!(
        selector,
        AUTHOR_EMAIL_FIELD
            | AUTHOR_FIRSTNAME_FIELD
            | AUTHOR_LASTNAME_FIELD
            | CATEGORIES_FIELD
            | START_DATE_FIELD
            | END_DATE_FIELD
    )
}

/// Find `selector` in `root`, falling back to the whole page for the
/// `page_wide` fields.
fn locate(root: &Element, selector: &str) -> Option<Element> {
    find(root, selector).or_else(|| {
        page_wide(selector)
            .then(|| gloo_utils::document().query_selector(selector).ok().flatten())
            .flatten()
    })
}

/// Read a hidden field the component will render itself.
fn take_field(root: &Element, selector: &str, filter: &str) -> Result<HiddenField, SetupError> {
    let field = locate(root, selector).ok_or_else(|| SetupError::MissingElement {
        filter: filter.to_string(),
        selector: selector.to_string(),
    })?;
    let name = require_attr(&field, "name", selector, filter)?;
    let value = input_value(&field);
    let outside = (!root.contains(Some(&field))).then_some(field);
    Ok(HiddenField {
        name,
        value,
        outside,
    })
}

fn invalid(filter: &str, attribute: &str, value: &str, reason: String) -> SetupError {
    SetupError::InvalidAttribute {
        filter: filter.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason,
    }
}

fn debounce_override(
    root: &Element,
    filter: &str,
    lookup: LookupConfig,
) -> Result<LookupConfig, SetupError> {
    match root.get_attribute(DEBOUNCE_ATTR) {
        Some(raw) => {
            let ms = parse_debounce_ms(&raw).map_err(|e| invalid(filter, DEBOUNCE_ATTR, &raw, e))?;
            Ok(lookup.with_debounce(ms))
        }
        None => Ok(lookup),
    }
}

fn placeholder(input: &Element) -> String {
    input.get_attribute("placeholder").unwrap_or_default()
}

/// Products: options are the chips rendered in the panel, grouped by
/// category. Writes product ids and their categories.
pub fn products(root: &Element, search_mode: bool) -> Result<ChipFilterProps, SetupError> {
    let filter = "products";
    let input = require(root, PRODUCTS_INPUT, filter)?;
    let products = take_field(root, HIDDEN_FIELD, filter)?;

    let categories = match locate(root, CATEGORIES_FIELD) {
        Some(_) => Some(take_field(root, CATEGORIES_FIELD, filter)?),
        None => None,
    };

    let mut bindings = vec![
        FieldBinding::csv(products.name.clone(), Projection::Id).mirrored(PRODUCTS_QUERY_KEY),
    ];
    if let Some(categories) = &categories {
        bindings.push(FieldBinding::csv(categories.name.clone(), Projection::Category));
    }

    let mut seen = HashSet::new();
    let mut options = Vec::new();
    let mut preselected = Vec::new();
    for chip in find_all(root, PRODUCT_CHIP) {
        let id = require_attr(&chip, "data-id", PRODUCT_CHIP, filter)?;
        let name = require_attr(&chip, "data-name", PRODUCT_CHIP, filter)?;
        // A product listed under two categories keeps the first
        if !seen.insert(id.clone()) {
            continue;
        }
        let mut option = FilterOption::new(id, name);
        if let Some(category) = chip.get_attribute("data-category").filter(|c| !c.is_empty()) {
            option = option.with_category(category);
        }
        if chip.has_attribute("data-selected") {
            preselected.push(option.clone());
        }
        options.push(option);
    }

    let category_labels: IndexMap<String, String> = find_all(root, CATEGORY_HEADING)
        .into_iter()
        .filter_map(|heading| {
            let id = heading.get_attribute("data-id")?;
            let label = heading.text_content().unwrap_or_default().trim().to_string();
            Some((id, label))
        })
        .collect();

    let empty_query = match root.get_attribute(EMPTY_QUERY_ATTR) {
        Some(raw) => {
            parse_empty_query(&raw).map_err(|e| invalid(filter, EMPTY_QUERY_ATTR, &raw, e))?
        }
        None => Default::default(),
    };

    products.detach();
    if let Some(categories) = &categories {
        categories.detach();
    }

    Ok(ChipFilterProps {
        config: Rc::new(FilterConfig {
            name: filter.to_string(),
            cardinality: Cardinality::Multi,
            trigger: PanelTrigger::Focus,
            bindings,
        }),
        candidates: Candidates::Static(Rc::new(FuzzyMatcher::new(
            options,
            FUZZY_THRESHOLD,
            empty_query,
        ))),
        preselected,
        lookup: None,
        search_mode,
        placeholder: placeholder(&input).into(),
        category_labels: Rc::new(category_labels),
    })
}

/// Authors: single selection from a remote user lookup, written as three
/// parallel fields.
pub fn authors(root: &Element, search_mode: bool) -> Result<ChipFilterProps, SetupError> {
    let filter = "authors";
    let input = require(root, AUTHORS_INPUT, filter)?;

    let mut bindings = Vec::new();
    let mut values = Vec::new();
    let mut fields = Vec::new();
    for (selector, attr, key) in [
        (AUTHOR_EMAIL_FIELD, "email", AUTHOR_EMAIL_KEY),
        (AUTHOR_FIRSTNAME_FIELD, "firstname", AUTHOR_FIRSTNAME_KEY),
        (AUTHOR_LASTNAME_FIELD, "lastname", AUTHOR_LASTNAME_KEY),
    ] {
        let field = take_field(root, selector, filter)?;
        bindings.push(
            FieldBinding::csv(field.name.clone(), Projection::Attr(attr.into())).mirrored(key),
        );
        values.push(field.value.trim().to_string());
        fields.push(field);
    }
    let lookup = debounce_override(root, filter, LookupConfig::authors())?;

    let preselected = selected_author(root, &values).into_iter().collect();
    fields.iter().for_each(HiddenField::detach);

    Ok(ChipFilterProps {
        config: Rc::new(FilterConfig {
            name: filter.to_string(),
            cardinality: Cardinality::Single,
            trigger: PanelTrigger::Input,
            bindings,
        }),
        candidates: Candidates::Remote {
            results: Vec::new(),
            max_results: asset_filters::lookup::MAX_RESULTS,
        },
        preselected,
        lookup: Some(lookup),
        search_mode,
        placeholder: placeholder(&input).into(),
        category_labels: Rc::default(),
    })
}

/// The preselected author: the rendered `.js-author-chip` when there is one,
/// otherwise the hidden field values (`[email, firstname, lastname]`).
fn selected_author(root: &Element, hidden: &[String]) -> Option<FilterOption> {
    let from_chip = find(root, SELECTED_AUTHOR).and_then(|chip| {
        let attr = |name: &str| chip.get_attribute(name).unwrap_or_default().trim().to_string();
        let email = attr("data-email");
        (!email.is_empty()).then(|| [email, attr("data-firstname"), attr("data-lastname")])
    });
    let [email, first, last] = match from_chip {
        Some(values) => values,
        None => match hidden {
            [email, first, last] if !email.is_empty() => {
                [email.clone(), first.clone(), last.clone()]
            }
            _ => return None,
        },
    };
    let name = format!("{first} {last}").trim().to_string();
    Some(
        FilterOption::new(email.clone(), name)
            .with_attr("email", email)
            .with_attr("firstname", first)
            .with_attr("lastname", last),
    )
}

/// Campaigns: multi selection from a remote lookup, written as a JSON array
/// of `{id, name}` records.
pub fn campaigns(root: &Element, search_mode: bool) -> Result<ChipFilterProps, SetupError> {
    let filter = "campaigns";
    let input = require(root, CAMPAIGNS_INPUT, filter)?;
    let field = take_field(root, HIDDEN_FIELD, filter)?;

    let store = HiddenInputStore::parse(Encoding::JsonRecords, &field.value).map_err(|source| {
        SetupError::Store {
            filter: filter.to_string(),
            source,
        }
    })?;
    let preselected = store
        .records()
        .map(|r| FilterOption::new(r.id, r.name))
        .collect();
    let lookup = debounce_override(root, filter, LookupConfig::campaigns())?;
    field.detach();

    Ok(ChipFilterProps {
        config: Rc::new(FilterConfig {
            name: filter.to_string(),
            cardinality: Cardinality::Multi,
            trigger: PanelTrigger::Input,
            bindings: vec![FieldBinding::records(field.name.clone())],
        }),
        candidates: Candidates::Remote {
            results: Vec::new(),
            max_results: asset_filters::lookup::MAX_RESULTS,
        },
        preselected,
        lookup: Some(lookup),
        search_mode,
        placeholder: placeholder(&input).into(),
        category_labels: Rc::default(),
    })
}

/// The date-range picker replaces the `.js-date-picker` input. The hidden
/// start and end fields live elsewhere in the form and hold ISO timestamps
/// whose date part seeds the picker.
pub fn date_range(picker: &Element, search_mode: bool) -> Result<DateRangeProps, SetupError> {
    let filter = "date range";
    let start = take_field(picker, START_DATE_FIELD, filter)?;
    let end = take_field(picker, END_DATE_FIELD, filter)?;
    let initial = DateRange::new(
        initial_date(&start, filter)?,
        initial_date(&end, filter)?,
    );
    start.detach();
    end.detach();

    Ok(DateRangeProps {
        start_field: start.name.into(),
        end_field: end.name.into(),
        initial,
        search_mode,
    })
}

fn initial_date(field: &HiddenField, filter: &str) -> Result<Option<NaiveDate>, SetupError> {
    let value = field.value.trim();
    let date = value.get(..10).unwrap_or(value);
    parse_date(date).map_err(|e| invalid(filter, "value", value, e.to_string()))
}

/// Free-text tag chips on the edit page.
pub fn tag_chips(root: &Element) -> Result<TagChipsProps, SetupError> {
    let filter = "tags";
    let input = require(root, TAG_CHIPS_INPUT, filter)?;
    let field = take_field(root, HIDDEN_FIELD, filter)?;

    let mut initial: Vec<String> = field
        .value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    initial.extend(
        find_all(root, EXISTING_TAG_CHIPS)
            .into_iter()
            .filter_map(|chip| chip.text_content())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
    );
    field.detach();

    Ok(TagChipsProps {
        field: field.name.into(),
        input_id: input.get_attribute("id").map(Into::into),
        placeholder: placeholder(&input).into(),
        initial,
    })
}
