use std::path::{Path, PathBuf};

use tracing::debug;

use super::{delete_vec, upsert_vec, Document, DocumentStore, Filter, Upsert};
use crate::error::Result;
use crate::io::{atomic_write, read_json_or_default};
use crate::paths::{collection_file, validate_collection};

/// Stores each collection as a JSON array in `<dir>/<collection>.json`.
///
/// Every write rewrites the whole collection file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn load(&self, collection: &str) -> Result<Vec<Document>> {
        validate_collection(collection)?;
        read_json_or_default(&collection_file(&self.dir, collection))
    }

    fn save(&self, collection: &str, docs: &[Document]) -> Result<()> {
        let path = collection_file(&self.dir, collection);
        let data = serde_json::to_vec_pretty(docs)?;
        atomic_write(&path, &data)?;
        debug!(collection, documents = docs.len(), "collection written");
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .load(collection)?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect())
    }

    fn update_or_insert(
        &mut self,
        collection: &str,
        filter: &Filter,
        doc: Document,
    ) -> Result<Upsert> {
        let mut docs = self.load(collection)?;
        let outcome = upsert_vec(&mut docs, filter, doc);
        self.save(collection, &docs)?;
        Ok(outcome)
    }

    fn delete(&mut self, collection: &str, filter: &Filter) -> Result<usize> {
        let mut docs = self.load(collection)?;
        let removed = delete_vec(&mut docs, filter);
        if removed > 0 {
            self.save(collection, &docs)?;
        }
        Ok(removed)
    }

    fn collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_collection(stem).is_ok() && !self.load(stem)?.is_empty() {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn satisfies_store_contract() {
        let dirs: std::cell::RefCell<Vec<TempDir>> = Default::default();
        contract::run_all(|| {
            let dir = TempDir::new().unwrap();
            let store = FileStore::open(dir.path()).unwrap();
            dirs.borrow_mut().push(dir);
            store
        });
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store
                .update_or_insert("alts", &Filter::eq("alt_id", "2"), Document::new())
                .unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        let found = store.find_one("alts", &Filter::eq("alt_id", "2")).unwrap();
        assert!(found.is_some());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("alts.json")).unwrap())
                .unwrap();
        assert_eq!(raw[0]["alt_id"], json!("2"));
    }

    #[test]
    fn delete_without_matches_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.delete("empty", &Filter::all()).unwrap(), 0);
        assert!(!dir.path().join("empty.json").exists());
    }
}
