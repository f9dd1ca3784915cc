//! Pluggable document store.
//!
//! Plugins persist JSON documents grouped in named collections through the
//! [`DocumentStore`] contract. Three backends implement it:
//!
//! - [`MemoryStore`]: process memory only, for tests and throwaway runs
//! - [`FileStore`]: one pretty-printed JSON array per collection
//! - [`RedbStore`]: one redb table per collection
//!
//! Documents come back in insertion order from every backend.

mod file;
mod memory;
mod redb_store;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redb_store::RedbStore;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{BotError, Result};
use crate::paths;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Field every stored document carries.
pub const ID_FIELD: &str = "_id";

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Conjunction of top-level field equalities. The empty filter matches every
/// document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter(Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Document {
        &self.0
    }
}

impl From<Document> for Filter {
    fn from(fields: Document) -> Self {
        Self(fields)
    }
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// What `update_or_insert` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upsert {
    Inserted,
    Updated,
}

pub trait DocumentStore: Send {
    /// All documents in `collection` matching `filter`, in insertion order.
    fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// First matching document in insertion order.
    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find_many(collection, filter)?.into_iter().next())
    }

    /// Merges `doc` into the first document matching `filter`, or inserts
    /// `filter ∪ doc` (with a fresh `_id` unless one is given) when nothing
    /// matches.
    fn update_or_insert(
        &mut self,
        collection: &str,
        filter: &Filter,
        doc: Document,
    ) -> Result<Upsert>;

    /// Removes every matching document. Returns how many were removed.
    fn delete(&mut self, collection: &str, filter: &Filter) -> Result<usize>;

    /// Names of the collections holding at least one document, sorted.
    fn collections(&self) -> Result<Vec<String>>;
}

/// Open the backend selected by `config`, resolving its path against `root`.
pub fn open_store(root: &Path, config: &StoreConfig) -> Result<Box<dyn DocumentStore>> {
    let location = paths::resolve(root, &config.path);
    let store: Box<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => Box::new(MemoryStore::new()),
        StoreBackend::File => Box::new(FileStore::open(&location)?),
        StoreBackend::Redb => Box::new(RedbStore::open(&location.join(paths::REDB_FILE))?),
    };
    tracing::debug!(backend = ?config.backend, path = %location.display(), "store opened");
    Ok(store)
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(BotError::InvalidDocument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

// ---------------------------------------------------------------------------
// Shared Vec<Document> operations (memory and file backends)
// ---------------------------------------------------------------------------

/// Build the document inserted when an upsert matches nothing.
pub(crate) fn new_document(filter: &Filter, doc: Document) -> Document {
    let mut inserted = filter.fields().clone();
    inserted.extend(doc);
    if !inserted.contains_key(ID_FIELD) {
        inserted.insert(
            ID_FIELD.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }
    inserted
}

/// Merge `doc` into `existing`, keeping the existing `_id`.
pub(crate) fn merge_into(existing: &mut Document, doc: Document) {
    for (field, value) in doc {
        if field == ID_FIELD && existing.contains_key(ID_FIELD) {
            continue;
        }
        existing.insert(field, value);
    }
}

pub(crate) fn upsert_vec(docs: &mut Vec<Document>, filter: &Filter, doc: Document) -> Upsert {
    match docs.iter_mut().find(|d| filter.matches(d)) {
        Some(existing) => {
            merge_into(existing, doc);
            Upsert::Updated
        }
        None => {
            docs.push(new_document(filter, doc));
            Upsert::Inserted
        }
    }
}

pub(crate) fn delete_vec(docs: &mut Vec<Document>, filter: &Filter) -> usize {
    let before = docs.len();
    docs.retain(|d| !filter.matches(d));
    before - docs.len()
}

// ---------------------------------------------------------------------------
// Contract tests shared by every backend
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_everything() {
        let doc = to_document(&json!({ "a": 1 })).unwrap();
        assert!(Filter::all().matches(&doc));
        assert!(Filter::all().is_empty());
    }

    #[test]
    fn filter_requires_every_field() {
        let doc = to_document(&json!({ "a": 1, "b": "x" })).unwrap();
        assert!(Filter::eq("a", 1).matches(&doc));
        assert!(Filter::eq("a", 1).and("b", "x").matches(&doc));
        assert!(!Filter::eq("a", 1).and("b", "y").matches(&doc));
        assert!(!Filter::eq("c", 1).matches(&doc));
    }

    #[test]
    fn to_document_rejects_non_objects() {
        assert!(matches!(
            to_document(&vec![1, 2]),
            Err(BotError::InvalidDocument(_))
        ));
    }

    #[test]
    fn open_store_selects_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        for backend in [StoreBackend::Memory, StoreBackend::File, StoreBackend::Redb] {
            let config = StoreConfig {
                backend,
                path: "data".into(),
            };
            let mut store = open_store(dir.path(), &config).unwrap();
            store
                .update_or_insert("probe", &Filter::eq("k", "v"), Document::new())
                .unwrap();
            assert_eq!(store.find_many("probe", &Filter::all()).unwrap().len(), 1);
        }
        assert!(dir.path().join("data/probe.json").exists());
        assert!(dir.path().join("data").join(paths::REDB_FILE).exists());
    }
}
