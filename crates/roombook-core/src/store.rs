//! Local record persistence.
//!
//! Records live as JSON arrays in a string key-value backend (browser
//! `localStorage` in production, [`MemoryStore`] in tests). Every write
//! replaces the whole table; there is no locking, so two writers sharing a
//! backend race and the last one wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::StoreError;

/// Minimal string key-value backend
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-process backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The two logical tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Bookings,
    Contacts,
}

impl Table {
    /// Backend key the table is stored under
    pub fn key(self) -> &'static str {
        match self {
            Table::Bookings => "bookings",
            Table::Contacts => "contacts",
        }
    }
}

/// A flat record belonging to one table
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: Table;
}

/// Typed table access over a key-value backend
#[derive(Debug, Clone, Default)]
pub struct RecordStore<S> {
    backend: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Read every record of a table in insertion order.
    ///
    /// Absent or unparseable content yields an empty table. Array elements
    /// that do not decode as records are skipped.
    pub fn read_table<R: Record>(&self) -> Vec<R> {
        let key = R::TABLE.key();
        match self.backend.get(key) {
            Some(raw) => decode_table(key, &raw),
            None => Vec::new(),
        }
    }

    /// Replace the whole table
    pub fn write_table<R: Record>(&mut self, records: &[R]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.backend.set(R::TABLE.key(), &raw)
    }

    /// Append one record (read, push, write back). Returns the new table length.
    pub fn append<R: Record>(&mut self, record: R) -> Result<usize, StoreError> {
        let mut records = self.read_table::<R>();
        records.push(record);
        self.write_table(&records)?;
        Ok(records.len())
    }

    /// Drop a table entirely
    pub fn clear(&mut self, table: Table) -> Result<(), StoreError> {
        tracing::info!(table = table.key(), "clearing table");
        self.backend.remove(table.key())
    }
}

fn decode_table<R: DeserializeOwned>(key: &str, raw: &str) -> Vec<R> {
    let items = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(serde_json::Value::Null) => return Vec::new(),
        Ok(other) => {
            tracing::warn!(key, kind = json_kind(&other), "table is not an array, treating as empty");
            return Vec::new();
        }
        Err(err) => {
            tracing::warn!(key, %err, "table is not valid JSON, treating as empty");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(key, index, %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl Record for Note {
        const TABLE: Table = Table::Contacts;
    }

    fn note(text: &str) -> Note {
        Note { text: text.into() }
    }

    #[test]
    fn test_read_absent_table_is_empty() {
        let store = RecordStore::new(MemoryStore::new());
        assert!(store.read_table::<Note>().is_empty());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut store = RecordStore::new(MemoryStore::new());
        for i in 0..5 {
            let len = store.append(note(&format!("n{i}"))).unwrap();
            assert_eq!(len, i + 1);
        }
        let texts: Vec<String> = store.read_table::<Note>().into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["n0", "n1", "n2", "n3", "n4"]);
    }

    #[test]
    fn test_write_table_overwrites() {
        let mut store = RecordStore::new(MemoryStore::new());
        store.append(note("old")).unwrap();
        store.write_table(&[note("a"), note("b")]).unwrap();
        assert_eq!(store.read_table::<Note>(), vec![note("a"), note("b")]);
    }

    #[test]
    fn test_clear_then_read_is_empty() {
        let mut store = RecordStore::new(MemoryStore::new());
        store.append(note("x")).unwrap();
        store.clear(Table::Contacts).unwrap();
        assert!(store.read_table::<Note>().is_empty());
        assert!(store.backend().get("contacts").is_none());
    }

    #[test]
    fn test_corrupt_content_degrades_to_empty() {
        for raw in ["definitely not json", "{\"text\": \"x\"}", "42", "\"[]\"", "null", ""] {
            let mut backend = MemoryStore::new();
            backend.set("contacts", raw).unwrap();
            let store = RecordStore::new(backend);
            assert!(store.read_table::<Note>().is_empty(), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let mut backend = MemoryStore::new();
        backend
            .set("contacts", r#"[{"text": "keep"}, 7, {"other": 1}, {"text": "also"}]"#)
            .unwrap();
        let store = RecordStore::new(backend);
        assert_eq!(store.read_table::<Note>(), vec![note("keep"), note("also")]);
    }

    #[test]
    fn test_tables_are_independent() {
        let mut backend = MemoryStore::new();
        backend.set("bookings", "[{\"text\": \"elsewhere\"}]").unwrap();
        let mut store = RecordStore::new(backend);
        store.append(note("mine")).unwrap();
        assert_eq!(store.read_table::<Note>(), vec![note("mine")]);
        assert_eq!(store.backend().len(), 2);
    }
}
