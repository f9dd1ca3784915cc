use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use clap::Subcommand;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tickbot_core::{
    config::Config,
    io, migrate,
    store::{open_store, Document, DocumentStore, Filter, Upsert},
};

#[derive(Subcommand)]
pub enum StoreSubcommand {
    /// List collections and their document counts
    List,

    /// Print the documents of a collection
    Get {
        collection: String,
        /// Field equality, repeatable: --where guild_id=123
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },

    /// Merge a JSON object into the first match, or insert it
    Put {
        collection: String,
        /// JSON object with the fields to write
        document: String,
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },

    /// Delete matching documents
    Delete {
        collection: String,
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
        /// Required to delete without any --where filter
        #[arg(long)]
        all: bool,
    },

    /// Dump every collection as one JSON object
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: StoreSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = open_store(root, &config.store).context("failed to open store")?;

    match subcmd {
        StoreSubcommand::List => list(store.as_ref(), json),
        StoreSubcommand::Get {
            collection,
            filters,
        } => {
            let filter = parse_filter(&filters)?;
            let docs = store.find_many(&collection, &filter)?;
            print_json(&docs)
        }
        StoreSubcommand::Put {
            collection,
            document,
            filters,
        } => {
            let filter = parse_filter(&filters)?;
            let doc: Document =
                serde_json::from_str(&document).context("document must be a JSON object")?;
            let outcome = store.update_or_insert(&collection, &filter, doc)?;
            if json {
                print_json(&serde_json::json!({ "outcome": outcome }))
            } else {
                println!(
                    "{} in {collection}",
                    match outcome {
                        Upsert::Inserted => "inserted",
                        Upsert::Updated => "updated",
                    }
                );
                Ok(())
            }
        }
        StoreSubcommand::Delete {
            collection,
            filters,
            all,
        } => {
            let filter = parse_filter(&filters)?;
            if filter.is_empty() && !all {
                bail!("refusing to delete every document in '{collection}' without --all");
            }
            let removed = store.delete(&collection, &filter)?;
            if json {
                print_json(&serde_json::json!({ "removed": removed }))
            } else {
                println!("removed {removed} from {collection}");
                Ok(())
            }
        }
        StoreSubcommand::Export { out } => {
            let dump = migrate::export_all(store.as_ref())?;
            match out {
                Some(path) => {
                    let data = serde_json::to_vec_pretty(&dump)?;
                    io::atomic_write(&path, &data)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("exported to {}", path.display());
                    Ok(())
                }
                None => print_json(&dump),
            }
        }
    }
}

fn list(store: &dyn DocumentStore, json: bool) -> anyhow::Result<()> {
    let mut rows = Vec::new();
    for name in store.collections()? {
        let count = store.find_many(&name, &Filter::all())?.len();
        rows.push((name, count));
    }

    if json {
        let value: serde_json::Map<String, Value> = rows
            .into_iter()
            .map(|(name, count)| (name, Value::from(count)))
            .collect();
        return print_json(&value);
    }
    if rows.is_empty() {
        println!("No collections.");
        return Ok(());
    }
    print_table(
        &["COLLECTION", "DOCUMENTS"],
        rows.into_iter()
            .map(|(name, count)| vec![name, count.to_string()])
            .collect(),
    );
    Ok(())
}

/// `field=value` pairs; values that parse as JSON (numbers, booleans, quoted
/// strings) keep their type, anything else is a string.
pub fn parse_filter(pairs: &[String]) -> anyhow::Result<Filter> {
    let mut filter = Filter::all();
    for pair in pairs {
        let Some((field, raw)) = pair.split_once('=') else {
            bail!("invalid filter '{pair}': expected FIELD=VALUE");
        };
        if field.is_empty() {
            bail!("invalid filter '{pair}': empty field name");
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
        filter = filter.and(field, value);
    }
    Ok(filter)
}
