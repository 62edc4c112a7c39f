use serde::{Deserialize, Serialize};

/// A single waste-movement row.
///
/// Records are open-ended: the column set comes entirely from the header row
/// of the CSV that produced them. Column order is preserved so that exports
/// can lay fields out the way they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pairs: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Record { pairs: Vec::new() }
    }

    /// Build a record from (column, value) pairs, keeping their order.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Record { pairs }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((column.into(), value.into()));
    }

    /// Value of the first column with the given name, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// In-memory movement store: the ordered list of every uploaded row.
///
/// Append-only and process-lifetime only; the store is shared across request
/// handlers behind a single `Mutex` in the application state, so all
/// mutation serializes through one lock.
#[derive(Debug, Default)]
pub struct MovementStore {
    records: Vec<Record>,
}

impl MovementStore {
    pub fn new() -> Self {
        MovementStore {
            records: Vec::new(),
        }
    }

    /// Append a batch of records in order. Returns the new total.
    pub fn append(&mut self, batch: Vec<Record>) -> usize {
        self.records.extend(batch);
        self.records.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Column names of the first record. Exports use this as the header row;
    /// later uploads with a different shape are not reconciled against it.
    pub fn header(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
