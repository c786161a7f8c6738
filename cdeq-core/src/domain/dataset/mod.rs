// cdeq-core/src/domain/dataset/mod.rs

pub mod value;

pub use value::Value;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One record of a system dataset: field name -> cell.
pub type Record = BTreeMap<String, Value>;

/// Cross-system record key unless the project configures another one.
pub const DEFAULT_ID_FIELD: &str = "uitid";

static NULL: Value = Value::Null;

/// An ordered table of records for a single system.
///
/// The field set is the union of the declared header and every key seen in
/// the records, so a column can be present even when some records omit it
/// (those records read as null).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    fields: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        let mut dataset = Self {
            fields: Vec::new(),
            records: Vec::new(),
        };
        for field in fields {
            dataset.add_field(field);
        }
        for record in records {
            dataset.push(record);
        }
        dataset
    }

    /// Builds a dataset from records only, deriving the field set.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Vec::new(), records)
    }

    pub fn push(&mut self, record: Record) {
        for key in record.keys() {
            if !self.fields.iter().any(|f| f == key) {
                self.fields.push(key.clone());
            }
        }
        self.records.push(record);
    }

    fn add_field(&mut self, field: String) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column view in row order. Missing cells read as null.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.has_field(name) {
            return None;
        }
        Some(
            self.records
                .iter()
                .map(|r| r.get(name).unwrap_or(&NULL))
                .collect(),
        )
    }

    /// Record identifiers in row order, rendered as text.
    pub fn identifiers(&self, id_field: &str) -> Option<Vec<String>> {
        self.column(id_field)
            .map(|col| col.into_iter().map(ToString::to_string).collect())
    }

    /// Keeps only the records whose identifier is in `ids`.
    pub fn retain_ids(&mut self, id_field: &str, ids: &HashSet<String>) {
        self.records.retain(|r| {
            r.get(id_field)
                .is_some_and(|v| ids.contains(&v.to_string()))
        });
    }
}

/// Datasets keyed by system name, in insertion order.
///
/// Insertion order drives the "all systems" fan-out of rules that do not
/// declare their systems, so it has to be stable.
#[derive(Debug, Clone, Default)]
pub struct DatasetMap {
    entries: Vec<(String, Dataset)>,
}

impl DatasetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the dataset of `system`. Replacement keeps the
    /// original position.
    pub fn insert(&mut self, system: impl Into<String>, dataset: Dataset) {
        let system = system.into();
        match self.entries.iter_mut().find(|(name, _)| *name == system) {
            Some(entry) => entry.1 = dataset,
            None => self.entries.push((system, dataset)),
        }
    }

    pub fn get(&self, system: &str) -> Option<&Dataset> {
        self.entries
            .iter()
            .find(|(name, _)| name == system)
            .map(|(_, d)| d)
    }

    pub fn systems(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        self.entries.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Dataset)> {
        self.entries.iter_mut().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Dataset)> for DatasetMap {
    fn from_iter<I: IntoIterator<Item = (S, Dataset)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (system, dataset) in iter {
            map.insert(system, dataset);
        }
        map
    }
}

/// Builds a record from `(field, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
