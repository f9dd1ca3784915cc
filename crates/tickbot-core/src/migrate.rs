//! Bulk import of collection dumps into any [`DocumentStore`].
//!
//! A dump is one JSON object mapping collection names to arrays of
//! documents, the shape [`export_all`] produces:
//!
//! ```json
//! { "alts": [ { "_id": "…", "guild_id": "1", "main_id": "2", "alt_id": "3" } ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{BotError, Result};
use crate::paths::validate_collection;
use crate::store::{DocumentStore, Filter, ID_FIELD};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Documents written (or that would be written) per collection.
    pub imported: BTreeMap<String, usize>,
    /// Entries that were not JSON objects.
    pub skipped: usize,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.imported.values().sum()
    }
}

/// Import `dump` into `store`. Documents with an `_id` replace the stored
/// document with that id; the rest are inserted with a fresh one. Every
/// collection name is checked before anything is written.
pub fn import(
    store: &mut dyn DocumentStore,
    dump: &Value,
    dry_run: bool,
) -> Result<MigrationReport> {
    let collections = dump
        .as_object()
        .ok_or_else(|| BotError::InvalidDocument("dump must be a JSON object".to_string()))?;
    for (name, docs) in collections {
        validate_collection(name)?;
        if !docs.is_array() {
            return Err(BotError::InvalidDocument(format!(
                "collection '{name}' must be a JSON array"
            )));
        }
    }

    let mut report = MigrationReport {
        dry_run,
        ..MigrationReport::default()
    };
    for (name, docs) in collections {
        let mut count = 0;
        for (i, entry) in docs.as_array().into_iter().flatten().enumerate() {
            let Some(doc) = entry.as_object() else {
                warn!(collection = %name, index = i, "skipping non-object entry");
                report.skipped += 1;
                continue;
            };
            if !dry_run {
                write_document(store, name, doc.clone())?;
            }
            count += 1;
        }
        report.imported.insert(name.clone(), count);
    }

    info!(total = report.total(), skipped = report.skipped, dry_run, "import finished");
    Ok(report)
}

fn write_document(
    store: &mut dyn DocumentStore,
    collection: &str,
    mut doc: Map<String, Value>,
) -> Result<()> {
    let id = match doc.get(ID_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => Uuid::new_v4().to_string(),
    };
    doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    store.update_or_insert(collection, &Filter::eq(ID_FIELD, id), doc)?;
    Ok(())
}

pub fn import_file(
    store: &mut dyn DocumentStore,
    path: &Path,
    dry_run: bool,
) -> Result<MigrationReport> {
    let data = std::fs::read_to_string(path)?;
    let dump: Value = serde_json::from_str(&data)?;
    import(store, &dump, dry_run)
}

/// Every non-empty collection as a dump object.
pub fn export_all(store: &dyn DocumentStore) -> Result<Value> {
    let mut dump = Map::new();
    for name in store.collections()? {
        let docs = store.find_many(&name, &Filter::all())?;
        dump.insert(name, Value::Array(docs.into_iter().map(Value::Object).collect()));
    }
    Ok(Value::Object(dump))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn imports_and_counts_per_collection() {
        let mut store = MemoryStore::new();
        let dump = json!({
            "alts": [
                { "_id": "a", "guild_id": "1", "main_id": "2", "alt_id": "3" },
                { "guild_id": "1", "main_id": "2", "alt_id": "4" },
                "not a document"
            ],
            "settings": [ { "prefix": "!" } ]
        });

        let report = import(&mut store, &dump, false).unwrap();
        assert_eq!(report.imported["alts"], 2);
        assert_eq!(report.imported["settings"], 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total(), 3);

        let alts = store.find_many("alts", &Filter::all()).unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0][ID_FIELD], json!("a"));
        assert!(alts[1][ID_FIELD].is_string());
    }

    #[test]
    fn reimport_replaces_by_id() {
        let mut store = MemoryStore::new();
        import(&mut store, &json!({ "alts": [ { "_id": "a", "v": 1 } ] }), false).unwrap();
        import(&mut store, &json!({ "alts": [ { "_id": "a", "v": 2 } ] }), false).unwrap();

        let alts = store.find_many("alts", &Filter::all()).unwrap();
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0]["v"], json!(2));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let mut store = MemoryStore::new();
        let report = import(&mut store, &json!({ "alts": [ {}, {} ] }), true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.imported["alts"], 2);
        assert!(store.collections().unwrap().is_empty());
    }

    #[test]
    fn bad_collection_name_fails_before_writing() {
        let mut store = MemoryStore::new();
        let dump = json!({ "alts": [ {} ], "Bad Name": [ {} ] });
        assert!(matches!(
            import(&mut store, &dump, false),
            Err(BotError::InvalidCollection(_))
        ));
        assert!(store.collections().unwrap().is_empty());
    }

    #[test]
    fn rejects_non_object_dump_and_non_array_collections() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            import(&mut store, &json!([1, 2]), false),
            Err(BotError::InvalidDocument(_))
        ));
        assert!(matches!(
            import(&mut store, &json!({ "alts": {} }), false),
            Err(BotError::InvalidDocument(_))
        ));
    }

    #[test]
    fn export_then_import_into_another_store() {
        let mut source = MemoryStore::new();
        source
            .update_or_insert("alts", &Filter::eq("alt_id", "3"), Default::default())
            .unwrap();
        let dump = export_all(&source).unwrap();

        let mut target = MemoryStore::new();
        let report = import_file_from_value(&mut target, dump);
        assert_eq!(report.total(), 1);
        assert_eq!(
            target.find_many("alts", &Filter::all()).unwrap(),
            source.find_many("alts", &Filter::all()).unwrap()
        );
    }

    fn import_file_from_value(store: &mut MemoryStore, dump: Value) -> MigrationReport {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, serde_json::to_string(&dump).unwrap()).unwrap();
        import_file(store, &path, false).unwrap()
    }
}
