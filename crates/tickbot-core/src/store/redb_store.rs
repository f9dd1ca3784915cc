//! Document storage in a single redb database.
//!
//! # Table design
//!
//! Each collection is its own table keyed by a `u64` sequence number:
//! ```text
//! key:   insertion sequence (last key + 1)
//! value: JSON-encoded document
//! ```
//!
//! Key order is insertion order, so a plain table scan returns documents in
//! the order every other backend uses. Updates rewrite the value under the
//! same key.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError, TableHandle};

use super::{merge_into, new_document, Document, DocumentStore, Filter, Upsert};
use crate::error::{BotError, Result};
use crate::paths::validate_collection;

fn table_def(collection: &str) -> TableDefinition<'_, u64, &'static [u8]> {
    TableDefinition::new(collection)
}

fn db_err(e: impl std::fmt::Display) -> BotError {
    BotError::Store(e.to_string())
}

pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        Ok(Self { db })
    }

    /// Every `(key, document)` in `collection`, in key order. A collection
    /// that was never written reads as empty.
    fn scan(&self, collection: &str) -> Result<Vec<(u64, Document)>> {
        validate_collection(collection)?;
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = match rt.open_table(table_def(collection)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(db_err(e)),
        };

        let mut docs = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (k, v) = entry.map_err(db_err)?;
            let doc: Document = serde_json::from_slice(v.value())?;
            docs.push((k.value(), doc));
        }
        Ok(docs)
    }
}

impl DocumentStore for RedbStore {
    fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .scan(collection)?
            .into_iter()
            .map(|(_, doc)| doc)
            .filter(|doc| filter.matches(doc))
            .collect())
    }

    fn update_or_insert(
        &mut self,
        collection: &str,
        filter: &Filter,
        doc: Document,
    ) -> Result<Upsert> {
        let existing = self
            .scan(collection)?
            .into_iter()
            .find(|(_, d)| filter.matches(d));

        let wt = self.db.begin_write().map_err(db_err)?;
        let outcome = {
            let mut t = wt.open_table(table_def(collection)).map_err(db_err)?;
            match existing {
                Some((key, mut current)) => {
                    merge_into(&mut current, doc);
                    let value = serde_json::to_vec(&current)?;
                    t.insert(key, value.as_slice()).map_err(db_err)?;
                    Upsert::Updated
                }
                None => {
                    let next = match t.last().map_err(db_err)? {
                        Some((k, _)) => k.value() + 1,
                        None => 0,
                    };
                    let value = serde_json::to_vec(&new_document(filter, doc))?;
                    t.insert(next, value.as_slice()).map_err(db_err)?;
                    Upsert::Inserted
                }
            }
        };
        wt.commit().map_err(db_err)?;
        Ok(outcome)
    }

    fn delete(&mut self, collection: &str, filter: &Filter) -> Result<usize> {
        let doomed: Vec<u64> = self
            .scan(collection)?
            .into_iter()
            .filter(|(_, d)| filter.matches(d))
            .map(|(key, _)| key)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut t = wt.open_table(table_def(collection)).map_err(db_err)?;
            for key in &doomed {
                t.remove(*key).map_err(db_err)?;
            }
        }
        wt.commit().map_err(db_err)?;
        Ok(doomed.len())
    }

    fn collections(&self) -> Result<Vec<String>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let mut names = Vec::new();
        for handle in rt.list_tables().map_err(db_err)? {
            let name = handle.name().to_string();
            if validate_collection(&name).is_ok() && !self.scan(&name)?.is_empty() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
