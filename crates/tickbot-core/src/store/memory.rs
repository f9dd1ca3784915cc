use std::collections::BTreeMap;

use super::{delete_vec, upsert_vec, Document, DocumentStore, Filter, Upsert};
use crate::error::Result;
use crate::paths::validate_collection;

/// Keeps every collection in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    fn update_or_insert(
        &mut self,
        collection: &str,
        filter: &Filter,
        doc: Document,
    ) -> Result<Upsert> {
        validate_collection(collection)?;
        let docs = self.collections.entry(collection.to_string()).or_default();
        Ok(upsert_vec(docs, filter, doc))
    }

    fn delete(&mut self, collection: &str, filter: &Filter) -> Result<usize> {
        validate_collection(collection)?;
        Ok(self
            .collections
            .get_mut(collection)
            .map(|docs| delete_vec(docs, filter))
            .unwrap_or(0))
    }

    fn collections(&self) -> Result<Vec<String>> {
        Ok(self
            .collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}
