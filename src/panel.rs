//! Per-instance state of a chip filter.
//!
//! `FilterState` is the single source of truth for one filter: whether its
//! panel is open, what has been typed, which options are selected and the
//! hidden-field stores derived from the selection. Views render from it and
//! never read state back out of the DOM. Query-string changes are appended to
//! `query_log`; the browser side replays entries it has not applied yet and
//! then reports them applied, which drains them.

use crate::fuzzy::FuzzyMatcher;
use crate::query::QueryOp;
use crate::store::HiddenInputStore;
use crate::{FieldBinding, FilterOption};
use indexmap::IndexMap;
use log::debug;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Selecting replaces the previous selection.
    Single,
    Multi,
}

/// What opens the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTrigger {
    /// Focusing the input (page-embedded options).
    Focus,
    /// Typing a non-empty query (remote lookups).
    Input,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub name: String,
    pub cardinality: Cardinality,
    pub trigger: PanelTrigger,
    pub bindings: Vec<FieldBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Candidates {
    /// Shared between reduced states, the option list never changes.
    Static(Rc<FuzzyMatcher>),
    Remote {
        results: Vec<FilterOption>,
        max_results: usize,
    },
}

#[derive(Debug, Clone)]
pub enum FilterAction {
    FocusIn,
    /// Focus left an element of the filter; `within` is whether the element
    /// receiving focus is inside the filter's root.
    FocusOut { within: bool },
    ClickOutside,
    Close,
    /// The overflow counter of the selected row was clicked.
    Expand,
    Input(String),
    /// A chip was clicked: select it if available, dismiss it if selected.
    Activate(String),
    Dismiss(String),
    LookupResults(Vec<FilterOption>),
    /// Query-log entries before this position reached the URL.
    QueryApplied(usize),
}

#[derive(Debug, Clone)]
pub struct FilterState {
    config: Rc<FilterConfig>,
    open: bool,
    query: String,
    awaiting: bool,
    selected: IndexMap<String, FilterOption>,
    stores: Vec<HiddenInputStore>,
    candidates: Candidates,
    focus_requests: u32,
    /// The next focus-in is the refocus requested by a selection and must
    /// not reopen the panel that selection closed.
    refocus_pending: bool,
    query_log: Vec<QueryOp>,
    /// Log position of `query_log[0]`; entries before it were drained.
    log_base: usize,
}

impl FilterState {
    /// Build the state and run `preselected` through the normal selection
    /// path, so stores and query string start out agreeing with the chips.
    pub fn new(
        config: Rc<FilterConfig>,
        candidates: Candidates,
        preselected: Vec<FilterOption>,
    ) -> Self {
        let stores = config
            .bindings
            .iter()
            .map(|b| HiddenInputStore::new(b.encoding))
            .collect();
        let mut state = Self {
            config,
            open: false,
            query: String::new(),
            awaiting: false,
            selected: IndexMap::new(),
            stores,
            candidates,
            focus_requests: 0,
            refocus_pending: false,
            query_log: Vec::new(),
            log_base: 0,
        };
        for option in preselected {
            state.select(option);
        }
        state
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// A remote lookup for the current query has not answered yet.
    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains_key(id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &FilterOption> {
        self.selected.values()
    }

    /// Bumped whenever the view should move focus back to the search input.
    pub fn focus_requests(&self) -> u32 {
        self.focus_requests
    }

    /// Entries not yet reported applied.
    pub fn query_log(&self) -> &[QueryOp] {
        &self.query_log
    }

    /// Position after the last entry ever logged. Grows monotonically.
    pub fn query_log_end(&self) -> usize {
        self.log_base + self.query_log.len()
    }

    /// Entries from log position `from` onwards that are still held.
    pub fn pending_ops(&self, from: usize) -> &[QueryOp] {
        let skip = from.saturating_sub(self.log_base).min(self.query_log.len());
        &self.query_log[skip..]
    }

    pub fn store(&self, field: &str) -> Option<&HiddenInputStore> {
        self.config
            .bindings
            .iter()
            .position(|b| b.field == field)
            .map(|i| &self.stores[i])
    }

    /// `(field name, serialized value)` for every hidden input.
    pub fn hidden_fields(&self) -> impl Iterator<Item = (&str, String)> {
        self.config
            .bindings
            .iter()
            .zip(&self.stores)
            .map(|(b, s)| (b.field.as_str(), s.serialize()))
    }

    /// Unselected candidates for the current query, best first.
    pub fn visible_candidates(&self) -> Vec<&FilterOption> {
        match &self.candidates {
            Candidates::Static(matcher) => matcher
                .search(&self.query)
                .into_iter()
                .filter(|o| !self.is_selected(&o.id))
                .collect(),
            Candidates::Remote { results, .. } => results
                .iter()
                .filter(|o| !self.is_selected(&o.id))
                .collect(),
        }
    }

    /// A query was entered and nothing matches it.
    pub fn shows_no_results(&self) -> bool {
        !self.query.trim().is_empty() && !self.awaiting && self.visible_candidates().is_empty()
    }

    pub fn apply(&mut self, action: FilterAction) {
        match action {
            FilterAction::FocusIn => {
                if self.refocus_pending {
                    self.refocus_pending = false;
                } else if self.config.trigger == PanelTrigger::Focus {
                    self.open = true;
                }
            }
            FilterAction::FocusOut { within } => {
                if !within {
                    self.open = false;
                    self.refocus_pending = false;
                }
            }
            FilterAction::ClickOutside | FilterAction::Close => {
                self.open = false;
                self.refocus_pending = false;
            }
            FilterAction::Expand => self.open = true,
            FilterAction::Input(text) => {
                // The input already had focus, so no focus-in will follow
                self.refocus_pending = false;
                self.set_query(text);
            }
            FilterAction::Activate(id) => {
                if self.is_selected(&id) {
                    self.deselect(&id);
                } else if let Some(option) = self.find_candidate(&id) {
                    self.select(option);
                } else {
                    debug!("{}: no candidate with id {id:?}", self.config.name);
                }
            }
            FilterAction::Dismiss(id) => self.deselect(&id),
            FilterAction::LookupResults(options) => self.receive_results(options),
            FilterAction::QueryApplied(upto) => {
                let drained = upto.saturating_sub(self.log_base).min(self.query_log.len());
                self.query_log.drain(..drained);
                self.log_base += drained;
            }
        }
    }

    fn set_query(&mut self, text: String) {
        let blank = text.trim().is_empty();
        self.query = text;
        match self.config.trigger {
            PanelTrigger::Focus => self.open = true,
            PanelTrigger::Input => self.open = !blank,
        }
        if let Candidates::Remote { results, .. } = &mut self.candidates {
            if blank {
                results.clear();
            }
            self.awaiting = !blank;
        }
    }

    fn receive_results(&mut self, options: Vec<FilterOption>) {
        let Candidates::Remote {
            results,
            max_results,
        } = &mut self.candidates
        else {
            return;
        };
        if self.query.trim().is_empty() {
            debug!("{}: dropping results for a cleared query", self.config.name);
            return;
        }
        *results = options
            .into_iter()
            .filter(|o| !self.selected.contains_key(&o.id))
            .take(*max_results)
            .collect();
        self.awaiting = false;
    }

    fn find_candidate(&self, id: &str) -> Option<FilterOption> {
        match &self.candidates {
            Candidates::Static(matcher) => matcher.get(id).cloned(),
            Candidates::Remote { results, .. } => results.iter().find(|o| o.id == id).cloned(),
        }
    }

    /// Select `option`. Already-selected options are ignored.
    pub fn select(&mut self, option: FilterOption) {
        if self.selected.contains_key(&option.id) {
            debug!("{}: {:?} already selected", self.config.name, option.id);
            return;
        }
        let replace = self.config.cardinality == Cardinality::Single;
        if replace {
            self.selected.clear();
        }

        for (binding, store) in self.config.bindings.iter().zip(self.stores.iter_mut()) {
            match binding.projection.project(&option) {
                Some(record) => {
                    let value = record.id.clone();
                    store.add(record, replace);
                    if let Some(key) = &binding.query_key {
                        self.query_log.push(QueryOp::Add {
                            key: key.clone(),
                            value,
                            replace,
                        });
                    }
                }
                None if replace => {
                    store.clear();
                    if let Some(key) = &binding.query_key {
                        self.query_log.push(QueryOp::Clear { key: key.clone() });
                    }
                }
                None => {}
            }
        }

        debug!("{}: selected {:?}", self.config.name, option.id);
        self.selected.insert(option.id.clone(), option);

        if !self.query.is_empty() {
            self.query.clear();
            self.focus_requests = self.focus_requests.wrapping_add(1);
            self.refocus_pending = true;
            if let Candidates::Remote { results, .. } = &mut self.candidates {
                results.clear();
            }
        }
        self.awaiting = false;
        self.open = false;
    }

    /// Deselect `id`. A binding's value is only removed once no remaining
    /// selection projects the same value, so shared categories survive until
    /// their last option goes.
    pub fn deselect(&mut self, id: &str) {
        let Some(option) = self.selected.shift_remove(id) else {
            return;
        };

        for (binding, store) in self.config.bindings.iter().zip(self.stores.iter_mut()) {
            let Some(record) = binding.projection.project(&option) else {
                continue;
            };
            let still_used = self.selected.values().any(|other| {
                binding
                    .projection
                    .project(other)
                    .is_some_and(|r| r.id == record.id)
            });
            if still_used {
                debug!(
                    "{}: keeping {:?} in {}, still referenced",
                    self.config.name, record.id, binding.field
                );
                continue;
            }
            store.remove(&record.id);
            if let Some(key) = &binding.query_key {
                self.query_log.push(QueryOp::Remove {
                    key: key.clone(),
                    value: record.id,
                });
            }
        }
        debug!("{}: deselected {id:?}", self.config.name);
    }
}

impl Reducible for FilterState {
    type Action = FilterAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::EmptyQueryPolicy;
    use crate::query::{MemoryLocation, QueryParamMirror};
    use crate::{Encoding, FieldBinding, Projection};
    use pretty_assertions::assert_eq;

    const SEARCH_URL: &str = "https://assets.example/manager?tag=e2e";

    fn products_config() -> Rc<FilterConfig> {
        Rc::new(FilterConfig {
            name: "products".into(),
            cardinality: Cardinality::Multi,
            trigger: PanelTrigger::Focus,
            bindings: vec![
                FieldBinding::csv("product_types", Projection::Id).mirrored("product_types"),
                FieldBinding::csv("categories", Projection::Category),
            ],
        })
    }

    fn products() -> Vec<FilterOption> {
        vec![
            FilterOption::new("digital-signage", "Digital Signage").with_category("iot"),
            FilterOption::new("ubuntu-core", "Ubuntu Core").with_category("iot"),
            FilterOption::new("kubernetes", "Kubernetes").with_category("cloud"),
        ]
    }

    fn products_state(preselected: Vec<FilterOption>) -> FilterState {
        let matcher = FuzzyMatcher::new(products(), 0.3, EmptyQueryPolicy::ShowAll);
        FilterState::new(products_config(), Candidates::Static(Rc::new(matcher)), preselected)
    }

    fn authors_state() -> FilterState {
        let config = Rc::new(FilterConfig {
            name: "authors".into(),
            cardinality: Cardinality::Single,
            trigger: PanelTrigger::Input,
            bindings: ["email", "firstname", "lastname"]
                .into_iter()
                .map(|attr| {
                    FieldBinding::csv(attr, Projection::Attr(attr.into()))
                        .mirrored(format!("author_{attr}"))
                })
                .collect(),
        });
        FilterState::new(
            config,
            Candidates::Remote {
                results: Vec::new(),
                max_results: 10,
            },
            Vec::new(),
        )
    }

    fn author(first: &str, last: &str) -> FilterOption {
        let email = format!("{}@example.com", first.to_lowercase());
        FilterOption::new(email.clone(), format!("{first} {last}"))
            .with_attr("email", email)
            .with_attr("firstname", first)
            .with_attr("lastname", last)
    }

    fn replay(state: &FilterState, from: usize, mirror: &mut QueryParamMirror<MemoryLocation>) {
        for op in state.pending_ops(from) {
            mirror.apply(op).unwrap();
        }
    }

    fn field(state: &FilterState, name: &str) -> String {
        state.store(name).map(|s| s.serialize()).unwrap_or_default()
    }

    #[test]
    fn select_then_deselect_restores_stores_and_url() {
        let mut state = products_state(Vec::new());
        let mut mirror = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);
        let before_fields: Vec<_> = state.hidden_fields().map(|(f, v)| (f.to_string(), v)).collect();

        state.apply(FilterAction::Activate("kubernetes".into()));
        replay(&state, 0, &mut mirror);
        assert_eq!(field(&state, "product_types"), "kubernetes");
        assert_eq!(field(&state, "categories"), "cloud");
        assert_eq!(mirror.values("product_types").unwrap(), vec!["kubernetes"]);

        let applied = state.query_log_end();
        state.apply(FilterAction::Activate("kubernetes".into()));
        replay(&state, applied, &mut mirror);

        let after_fields: Vec<_> = state.hidden_fields().map(|(f, v)| (f.to_string(), v)).collect();
        assert_eq!(after_fields, before_fields);
        assert_eq!(mirror.target().url.as_str(), SEARCH_URL);
    }

    #[test]
    fn shared_category_is_reference_counted() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::Activate("digital-signage".into()));
        state.apply(FilterAction::Activate("ubuntu-core".into()));
        assert_eq!(field(&state, "categories"), "iot");

        state.apply(FilterAction::Dismiss("digital-signage".into()));
        assert_eq!(field(&state, "categories"), "iot");
        assert_eq!(field(&state, "product_types"), "ubuntu-core");

        state.apply(FilterAction::Dismiss("ubuntu-core".into()));
        assert_eq!(field(&state, "categories"), "");
        assert_eq!(field(&state, "product_types"), "");
    }

    #[test]
    fn duplicate_selection_is_a_no_op() {
        let mut state = products_state(Vec::new());
        state.select(products()[0].clone());
        let log_len = state.query_log().len();
        state.select(products()[0].clone());
        assert_eq!(state.query_log().len(), log_len);
        assert_eq!(field(&state, "product_types"), "digital-signage");
    }

    #[test]
    fn hydration_uses_the_selection_path() {
        let state = products_state(vec![products()[2].clone()]);
        assert!(state.is_selected("kubernetes"));
        assert_eq!(field(&state, "categories"), "cloud");
        assert_eq!(
            state.query_log(),
            &[QueryOp::Add {
                key: "product_types".into(),
                value: "kubernetes".into(),
                replace: false
            }]
        );
        assert_eq!(state.focus_requests(), 0);
        assert!(!state.is_open());
    }

    #[test]
    fn selecting_clears_query_refocuses_and_closes() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::FocusIn);
        state.apply(FilterAction::Input("kube".into()));
        assert!(state.is_open());
        assert_eq!(state.visible_candidates().len(), 1);

        state.apply(FilterAction::Activate("kubernetes".into()));
        assert_eq!(state.query(), "");
        assert_eq!(state.focus_requests(), 1);
        assert!(!state.is_open());
        assert_eq!(state.visible_candidates().len(), 2);

        state.apply(FilterAction::FocusIn);
        assert!(!state.is_open());
        state.apply(FilterAction::FocusIn);
        assert!(state.is_open());
    }

    #[test]
    fn typing_after_a_selection_does_not_swallow_the_next_focus() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::Input("kube".into()));
        state.apply(FilterAction::Activate("kubernetes".into()));
        // The input kept focus, so the refocus produced no focus-in
        state.apply(FilterAction::Input("ubu".into()));
        state.apply(FilterAction::Close);

        state.apply(FilterAction::FocusIn);
        assert!(state.is_open());
    }

    #[test]
    fn leaving_after_a_selection_does_not_swallow_the_next_focus() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::Input("kube".into()));
        state.apply(FilterAction::Activate("kubernetes".into()));
        state.apply(FilterAction::ClickOutside);

        state.apply(FilterAction::FocusIn);
        assert!(state.is_open());
    }

    #[test]
    fn focus_out_within_root_keeps_panel_open() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::FocusIn);
        state.apply(FilterAction::FocusOut { within: true });
        assert!(state.is_open());
        state.apply(FilterAction::FocusOut { within: false });
        assert!(!state.is_open());

        state.apply(FilterAction::FocusIn);
        state.apply(FilterAction::ClickOutside);
        assert!(!state.is_open());
    }

    #[test]
    fn unmatched_query_shows_no_results() {
        let mut state = products_state(Vec::new());
        state.apply(FilterAction::Input("zzzzqqq".into()));
        assert!(state.shows_no_results());
        state.apply(FilterAction::Input(String::new()));
        assert!(!state.shows_no_results());
    }

    #[test]
    fn single_select_replaces_previous_author() {
        let mut state = authors_state();
        let mut mirror = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);

        state.apply(FilterAction::Input("ada".into()));
        assert!(state.is_open());
        state.apply(FilterAction::LookupResults(vec![author("Ada", "Lovelace")]));
        state.apply(FilterAction::Activate("ada@example.com".into()));

        state.apply(FilterAction::Input("gra".into()));
        state.apply(FilterAction::LookupResults(vec![author("Grace", "Hopper")]));
        state.apply(FilterAction::Activate("grace@example.com".into()));
        replay(&state, 0, &mut mirror);

        assert_eq!(state.selected().count(), 1);
        assert_eq!(field(&state, "email"), "grace@example.com");
        assert_eq!(field(&state, "firstname"), "Grace");
        assert_eq!(field(&state, "lastname"), "Hopper");
        assert_eq!(mirror.values("author_email").unwrap(), vec!["grace@example.com"]);
        assert_eq!(mirror.values("author_lastname").unwrap(), vec!["Hopper"]);

        state.apply(FilterAction::Dismiss("grace@example.com".into()));
        let mut fresh = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);
        replay(&state, 0, &mut fresh);
        assert_eq!(fresh.target().url.as_str(), SEARCH_URL);
        assert_eq!(field(&state, "email"), "");
    }

    #[test]
    fn lastname_with_a_comma_round_trips_through_the_url() {
        let mut state = authors_state();
        let mut mirror = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);

        state.apply(FilterAction::Input("john".into()));
        state.apply(FilterAction::LookupResults(vec![author("John", "Smith, Jr")]));
        state.apply(FilterAction::Activate("john@example.com".into()));
        replay(&state, 0, &mut mirror);
        assert_eq!(mirror.values("author_email").unwrap(), vec!["john@example.com"]);
        assert_eq!(field(&state, "lastname"), "Smith, Jr");

        let applied = state.query_log_end();
        state.apply(FilterAction::Dismiss("john@example.com".into()));
        replay(&state, applied, &mut mirror);
        assert_eq!(mirror.target().url.as_str(), SEARCH_URL);
    }

    #[test]
    fn blank_author_attribute_is_neither_stored_nor_mirrored() {
        let mut state = authors_state();
        let mut mirror = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);

        state.apply(FilterAction::Input("hop".into()));
        state.apply(FilterAction::LookupResults(vec![author("", "Hopper")]));
        state.apply(FilterAction::Activate("@example.com".into()));
        replay(&state, 0, &mut mirror);

        assert_eq!(field(&state, "firstname"), "");
        assert_eq!(field(&state, "lastname"), "Hopper");
        assert!(!mirror
            .target()
            .url
            .query_pairs()
            .any(|(k, _)| k == "author_firstname"));
        assert_eq!(mirror.values("author_lastname").unwrap(), vec!["Hopper"]);
    }

    #[test]
    fn applied_query_ops_are_drained() {
        let mut state = products_state(Vec::new());
        let mut mirror = QueryParamMirror::new(MemoryLocation::parse(SEARCH_URL).unwrap(), true);

        state.apply(FilterAction::Activate("kubernetes".into()));
        state.apply(FilterAction::Activate("ubuntu-core".into()));
        replay(&state, 0, &mut mirror);
        let end = state.query_log_end();
        assert_eq!(end, 2);
        state.apply(FilterAction::QueryApplied(end));
        assert!(state.query_log().is_empty());
        assert_eq!(state.query_log_end(), 2);

        state.apply(FilterAction::Dismiss("kubernetes".into()));
        assert_eq!(state.query_log_end(), 3);
        assert_eq!(state.pending_ops(0).len(), 1);
        replay(&state, end, &mut mirror);
        assert_eq!(mirror.values("product_types").unwrap(), vec!["ubuntu-core"]);

        // A stale report never drains entries logged after it
        state.apply(FilterAction::QueryApplied(end));
        assert_eq!(state.query_log().len(), 1);
    }

    #[test]
    fn remote_results_skip_selected_and_are_capped() {
        let mut state = authors_state();
        state.apply(FilterAction::Input("a".into()));
        state.apply(FilterAction::LookupResults(vec![author("Ada", "Lovelace")]));
        state.apply(FilterAction::Activate("ada@example.com".into()));

        state.apply(FilterAction::Input("a".into()));
        assert!(state.is_awaiting());
        assert!(!state.shows_no_results());
        let mut results = vec![author("Ada", "Lovelace")];
        results.extend((0..15).map(|i| author(&format!("A{i}"), "Person")));
        state.apply(FilterAction::LookupResults(results));

        let visible = state.visible_candidates();
        assert_eq!(visible.len(), 10);
        assert!(visible.iter().all(|o| o.id != "ada@example.com"));
    }

    #[test]
    fn results_for_a_cleared_query_are_dropped() {
        let mut state = authors_state();
        state.apply(FilterAction::Input("ad".into()));
        state.apply(FilterAction::Input("  ".into()));
        assert!(!state.is_open());
        state.apply(FilterAction::LookupResults(vec![author("Ada", "Lovelace")]));
        assert!(state.visible_candidates().is_empty());
    }

    #[test]
    fn campaign_records_serialize_as_json() {
        let config = Rc::new(FilterConfig {
            name: "campaigns".into(),
            cardinality: Cardinality::Multi,
            trigger: PanelTrigger::Input,
            bindings: vec![FieldBinding::records("salesforce_campaigns")],
        });
        let mut state = FilterState::new(
            config,
            Candidates::Remote {
                results: Vec::new(),
                max_results: 10,
            },
            vec![FilterOption::new("701A", "Spring launch")],
        );
        state.apply(FilterAction::Input("sum".into()));
        state.apply(FilterAction::LookupResults(vec![FilterOption::new("701B", "Summit")]));
        state.apply(FilterAction::Activate("701B".into()));

        let store = state.store("salesforce_campaigns").unwrap();
        assert_eq!(store.encoding(), Encoding::JsonRecords);
        assert_eq!(
            store.serialize(),
            r#"[{"id":"701A","name":"Spring launch"},{"id":"701B","name":"Summit"}]"#
        );
        assert!(state.query_log().is_empty());
    }

    #[test]
    fn reducer_keeps_previous_state_untouched() {
        let state = Rc::new(products_state(Vec::new()));
        let next = state.clone().reduce(FilterAction::Activate("kubernetes".into()));
        assert!(!state.is_selected("kubernetes"));
        assert!(next.is_selected("kubernetes"));

        let (Candidates::Static(before), Candidates::Static(after)) =
            (&state.candidates, &next.candidates)
        else {
            panic!("products use static candidates");
        };
        assert!(Rc::ptr_eq(before, after));
    }
}
