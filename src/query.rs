//! Mirrors filter selections into the page's query string so a reload or a
//! shared link restores the same search.
//!
//! Multi-valued keys hold one comma-joined value (`product_types=a,b`). The
//! mirror only writes in search mode; on create/edit pages the URL is not a
//! search state and is left alone.

use crate::QueryError;
use url::Url;

/// Read and replace the current location. The browser implementation uses
/// `history.replaceState`, so nothing navigates.
pub trait QueryTarget {
    fn current(&self) -> Result<Url, QueryError>;
    fn replace(&mut self, url: &Url) -> Result<(), QueryError>;
}

/// An in-memory location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocation {
    pub url: Url,
}

impl MemoryLocation {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        Ok(Self {
            url: Url::parse(input)?,
        })
    }
}

impl QueryTarget for MemoryLocation {
    fn current(&self) -> Result<Url, QueryError> {
        Ok(self.url.clone())
    }

    fn replace(&mut self, url: &Url) -> Result<(), QueryError> {
        self.url = url.clone();
        Ok(())
    }
}

/// A pending change to the query string, emitted by the panel controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOp {
    Add {
        key: String,
        value: String,
        replace: bool,
    },
    Remove {
        key: String,
        value: String,
    },
    Clear {
        key: String,
    },
}

pub struct QueryParamMirror<T> {
    target: T,
    enabled: bool,
}

impl<T: QueryTarget> QueryParamMirror<T> {
    /// `search_mode` false makes every write a no-op.
    pub fn new(target: T, search_mode: bool) -> Self {
        Self {
            target,
            enabled: search_mode,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn add(&mut self, key: &str, value: &str, replace: bool) -> Result<(), QueryError> {
        if !self.enabled {
            return Ok(());
        }
        let mut url = self.target.current()?;
        if !replace && raw_value(&url, key).as_deref() == Some(value) {
            return Ok(());
        }
        let mut values = if replace {
            Vec::new()
        } else {
            read_values(&url, key)
        };
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
        write_values(&mut url, key, &values);
        self.target.replace(&url)
    }

    /// Remove `value` from `key`, deleting the key once no values are left.
    pub fn remove(&mut self, key: &str, value: &str) -> Result<(), QueryError> {
        if !self.enabled {
            return Ok(());
        }
        let mut url = self.target.current()?;
        // A value holding a comma was written whole and must match whole
        let values = if raw_value(&url, key).as_deref() == Some(value) {
            Vec::new()
        } else {
            let mut values = read_values(&url, key);
            values.retain(|v| v != value);
            values
        };
        write_values(&mut url, key, &values);
        self.target.replace(&url)
    }

    pub fn clear(&mut self, key: &str) -> Result<(), QueryError> {
        if !self.enabled {
            return Ok(());
        }
        let mut url = self.target.current()?;
        write_values(&mut url, key, &[]);
        self.target.replace(&url)
    }

    pub fn apply(&mut self, op: &QueryOp) -> Result<(), QueryError> {
        match op {
            QueryOp::Add {
                key,
                value,
                replace,
            } => self.add(key, value, *replace),
            QueryOp::Remove { key, value } => self.remove(key, value),
            QueryOp::Clear { key } => self.clear(key),
        }
    }

    pub fn values(&self, key: &str) -> Result<Vec<String>, QueryError> {
        Ok(read_values(&self.target.current()?, key))
    }
}

fn raw_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Values of the first `key` pair, split on commas.
pub fn read_values(url: &Url, key: &str) -> Vec<String> {
    raw_value(url, key)
        .map(|v| {
            v.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Set `key` to the comma-joined `values` in place of its first occurrence,
/// dropping any other occurrences. An empty `values` deletes the key.
pub fn write_values(url: &mut Url, key: &str, values: &[String]) {
    let joined = values.join(",");
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut written = false;
    for (k, v) in url.query_pairs() {
        if k != key {
            pairs.push((k.into_owned(), v.into_owned()));
        } else if !written {
            written = true;
            if !values.is_empty() {
                pairs.push((key.to_string(), joined.clone()));
            }
        }
    }
    if !written && !values.is_empty() {
        pairs.push((key.to_string(), joined));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}
