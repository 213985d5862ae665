//! Chip filter state, hidden-input projection and query-string mirroring for the
//! asset manager's search and edit pages.
//!
//! Everything in this crate is plain Rust with no DOM access, so the browser
//! binary (`main.rs`) only has to read the server-rendered markup into these
//! types, render them, and copy query operations onto the live location.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod fields;
pub mod fuzzy;
pub mod lookup;
pub mod panel;
pub mod query;
pub mod store;

pub use fuzzy::{EmptyQueryPolicy, FuzzyMatcher};
pub use lookup::{LookupConfig, LookupKind, LookupSequencer, Ticket};
pub use panel::{Candidates, Cardinality, FilterAction, FilterConfig, FilterState, PanelTrigger};
pub use query::{MemoryLocation, QueryOp, QueryParamMirror, QueryTarget};
pub use store::{Encoding, HiddenInputStore, Record};

/// A selectable value of one filter category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    /// Extra named values, e.g. an author's `email`, `firstname` and `lastname`.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Which part of an option is written into a hidden field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Id,
    Name,
    Category,
    Attr(String),
    /// The `{id, name}` pair, for JSON-encoded fields.
    Record,
}

impl Projection {
    /// Returns `None` when the option has no value for this projection
    /// (an uncategorised product, an author without an email). Blank values
    /// count as missing.
    pub fn project(&self, option: &FilterOption) -> Option<Record> {
        let plain = |v: &str| (!v.trim().is_empty()).then(|| Record::plain(v));
        match self {
            Projection::Id => plain(&option.id),
            Projection::Name => plain(&option.name),
            Projection::Category => option.category.as_deref().and_then(plain),
            Projection::Attr(key) => option.attr(key).and_then(plain),
            Projection::Record => Some(Record {
                id: option.id.clone(),
                name: option.name.clone(),
            }),
        }
    }
}

/// One hidden form field fed by a filter, and optionally the query key that
/// mirrors it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub field: String,
    pub query_key: Option<String>,
    pub projection: Projection,
    pub encoding: Encoding,
}

impl FieldBinding {
    pub fn csv(field: impl Into<String>, projection: Projection) -> Self {
        Self {
            field: field.into(),
            query_key: None,
            projection,
            encoding: Encoding::Csv,
        }
    }

    pub fn records(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query_key: None,
            projection: Projection::Record,
            encoding: Encoding::JsonRecords,
        }
    }

    pub fn mirrored(mut self, query_key: impl Into<String>) -> Self {
        self.query_key = Some(query_key.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("malformed JSON records: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot read page location: {0}")]
    Location(String),
    #[error(transparent)]
    Parse(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("cannot build lookup url: {0}")]
    Url(#[from] url::ParseError),
    #[error("lookup endpoint {0} cannot take path segments")]
    CannotBeABase(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("lookup returned HTTP {0}")]
    Status(u16),
    #[error("cannot decode lookup response: {0}")]
    Decode(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Invalid(String),
}

/// A filter instance whose markup cannot be mounted. Reported once at setup;
/// the instance is then left as the server rendered it.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{filter}: missing element `{selector}`")]
    MissingElement { filter: String, selector: String },
    #[error("{filter}: `{selector}` has no `{attribute}` attribute")]
    MissingAttribute {
        filter: String,
        selector: String,
        attribute: String,
    },
    #[error("{filter}: invalid `{attribute}` value {value:?}: {reason}")]
    InvalidAttribute {
        filter: String,
        attribute: String,
        value: String,
        reason: String,
    },
    #[error("{filter}: {source}")]
    Store {
        filter: String,
        #[source]
        source: StoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projections_read_the_expected_fields() {
        let option = FilterOption::new("ubuntu-core", "Ubuntu Core")
            .with_category("iot")
            .with_attr("email", "a@example.com");

        assert_eq!(Projection::Id.project(&option), Some(Record::plain("ubuntu-core")));
        assert_eq!(Projection::Name.project(&option), Some(Record::plain("Ubuntu Core")));
        assert_eq!(Projection::Category.project(&option), Some(Record::plain("iot")));
        assert_eq!(
            Projection::Attr("email".into()).project(&option),
            Some(Record::plain("a@example.com"))
        );
        assert_eq!(
            Projection::Record.project(&option),
            Some(Record {
                id: "ubuntu-core".into(),
                name: "Ubuntu Core".into()
            })
        );
    }

    #[test]
    fn missing_values_project_to_none() {
        let option = FilterOption::new("x", "X");
        assert_eq!(Projection::Category.project(&option), None);
        assert_eq!(Projection::Attr("email".into()).project(&option), None);
    }

    #[test]
    fn blank_values_project_to_none() {
        let option = FilterOption::new("grace@example.com", "Hopper")
            .with_category("  ")
            .with_attr("firstname", "");
        assert_eq!(Projection::Category.project(&option), None);
        assert_eq!(Projection::Attr("firstname".into()).project(&option), None);
        assert_eq!(Projection::Id.project(&option), Some(Record::plain("grace@example.com")));
    }
}
