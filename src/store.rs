//! Hidden form-field stores.
//!
//! Chips are not form controls, so the selection they represent is carried to
//! the server in a single hidden input per field. The value is either a
//! comma-joined list or, when a plain list cannot hold the data, a JSON array
//! of `{id, name}` records.

use crate::StoreError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Csv,
    JsonRecords,
}

/// A stored entry. For comma-joined fields `id` and `name` are the same string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
}

impl Record {
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: value.clone(),
            name: value,
        }
    }
}

/// Ordered set of entries keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenInputStore {
    encoding: Encoding,
    entries: IndexMap<String, String>,
}

impl HiddenInputStore {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            entries: IndexMap::new(),
        }
    }

    /// Read a value the server rendered into the field.
    pub fn parse(encoding: Encoding, raw: &str) -> Result<Self, StoreError> {
        let mut store = Self::new(encoding);
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(store);
        }
        match encoding {
            Encoding::Csv => {
                for value in raw.split(',').filter(|v| !v.is_empty()) {
                    store.add(Record::plain(value), false);
                }
            }
            Encoding::JsonRecords => {
                let records: Vec<Record> = serde_json::from_str(raw)?;
                for record in records {
                    store.add(record, false);
                }
            }
        }
        Ok(store)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Add `record`, or make it the only entry when `replace` is set.
    /// Returns whether the stored set changed.
    pub fn add(&mut self, record: Record, replace: bool) -> bool {
        if replace {
            let unchanged = self.entries.len() == 1 && self.entries.contains_key(&record.id);
            self.entries.clear();
            self.entries.insert(record.id, record.name);
            return !unchanged;
        }
        if self.entries.contains_key(&record.id) {
            return false;
        }
        self.entries.insert(record.id, record.name);
        true
    }

    pub fn add_value(&mut self, value: &str, replace: bool) -> bool {
        self.add(Record::plain(value), replace)
    }

    /// Remove the entry with `id`. Absent ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.shift_remove(id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.entries.iter().map(|(id, name)| Record {
            id: id.clone(),
            name: name.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The value to put in the hidden input. Empty stores serialize to `""`.
    pub fn serialize(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        match self.encoding {
            Encoding::Csv => self.ids().collect::<Vec<_>>().join(","),
            Encoding::JsonRecords => {
                let records: Vec<Record> = self.records().collect();
                // A Vec of string pairs always serializes.
                serde_json::to_string(&records).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    enum Op {
        Add(&'static str),
        Replace(&'static str),
        Remove(&'static str),
    }

    #[test]
    fn replay_matches_set_semantics() {
        let sequences: Vec<Vec<Op>> = vec![
            vec![Op::Add("a"), Op::Add("b"), Op::Add("a"), Op::Remove("c")],
            vec![Op::Remove("a"), Op::Add("a"), Op::Remove("a"), Op::Remove("a")],
            vec![Op::Add("a"), Op::Add("b"), Op::Replace("c"), Op::Add("d")],
            vec![Op::Add("x"), Op::Remove("x"), Op::Add("y"), Op::Add("x")],
        ];

        for ops in sequences {
            let mut store = HiddenInputStore::new(Encoding::Csv);
            let mut model = BTreeSet::new();
            for op in &ops {
                match op {
                    Op::Add(v) => {
                        store.add_value(v, false);
                        model.insert(v.to_string());
                    }
                    Op::Replace(v) => {
                        store.add_value(v, true);
                        model.clear();
                        model.insert(v.to_string());
                    }
                    Op::Remove(v) => {
                        store.remove(v);
                        model.remove(*v);
                    }
                }
            }
            let reparsed = HiddenInputStore::parse(Encoding::Csv, &store.serialize()).unwrap();
            let ids: BTreeSet<String> = reparsed.ids().map(str::to_string).collect();
            assert_eq!(ids, model);
        }
    }

    #[test]
    fn csv_keeps_insertion_order_and_skips_blanks() {
        let store = HiddenInputStore::parse(Encoding::Csv, "b,,a,b,").unwrap();
        assert_eq!(store.serialize(), "b,a");
    }

    #[test]
    fn empty_store_serializes_to_empty_string() {
        let mut store = HiddenInputStore::new(Encoding::JsonRecords);
        assert_eq!(store.serialize(), "");
        store.add(Record::plain("1"), false);
        store.remove("1");
        assert_eq!(store.serialize(), "");
    }

    #[test]
    fn json_records_are_unique_by_id() {
        let mut store = HiddenInputStore::new(Encoding::JsonRecords);
        assert!(store.add(
            Record {
                id: "701A".into(),
                name: "Spring launch".into()
            },
            false
        ));
        assert!(!store.add(
            Record {
                id: "701A".into(),
                name: "Renamed".into()
            },
            false
        ));
        assert_eq!(store.serialize(), r#"[{"id":"701A","name":"Spring launch"}]"#);

        let parsed = HiddenInputStore::parse(Encoding::JsonRecords, &store.serialize()).unwrap();
        assert_eq!(parsed, store);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(HiddenInputStore::parse(Encoding::JsonRecords, "[{").is_err());
    }

    #[test]
    fn replace_reports_change() {
        let mut store = HiddenInputStore::new(Encoding::Csv);
        assert!(store.add_value("a", true));
        assert!(!store.add_value("a", true));
        assert!(store.add_value("b", true));
        assert_eq!(store.serialize(), "b");
    }

    #[test]
    fn single_value_with_a_comma_is_kept_whole() {
        let mut store = HiddenInputStore::new(Encoding::Csv);
        store.add_value("Smith, Jr", true);
        assert_eq!(store.len(), 1);
        assert_eq!(store.serialize(), "Smith, Jr");
        assert!(store.remove("Smith, Jr"));
        assert_eq!(store.serialize(), "");
    }
}
