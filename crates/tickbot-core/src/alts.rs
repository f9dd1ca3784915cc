//! Alternate-account registry.
//!
//! Each guild keeps a flat main → alts mapping in the `alts` collection.
//! Links never chain: linking to someone who is already an alt links to
//! their main instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::store::{from_document, to_document, DocumentStore, Filter};

pub const ALTS_COLLECTION: &str = "alts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltLink {
    pub guild_id: String,
    pub main_id: String,
    pub alt_id: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

fn by_alt(guild_id: &str, alt_id: &str) -> Filter {
    Filter::eq("guild_id", guild_id).and("alt_id", alt_id)
}

fn find_link(store: &dyn DocumentStore, guild_id: &str, alt_id: &str) -> Result<Option<AltLink>> {
    store
        .find_one(ALTS_COLLECTION, &by_alt(guild_id, alt_id))?
        .map(from_document)
        .transpose()
}

/// Link `alt_id` to `main_id` in `guild_id` and return the stored link.
///
/// When `main_id` is itself an alt, the link goes to its main. Adding a link
/// that already exists returns it unchanged.
pub fn add_alt(
    store: &mut dyn DocumentStore,
    guild_id: &str,
    main_id: &str,
    alt_id: &str,
    added_by: &str,
    now: DateTime<Utc>,
) -> Result<AltLink> {
    if main_id == alt_id {
        return Err(BotError::AltSelfLink(alt_id.to_string()));
    }
    let main_id = main_of(store, guild_id, main_id)?.unwrap_or_else(|| main_id.to_string());
    if main_id == alt_id {
        return Err(BotError::AltSelfLink(alt_id.to_string()));
    }

    if let Some(existing) = find_link(store, guild_id, alt_id)? {
        if existing.main_id == main_id {
            return Ok(existing);
        }
        return Err(BotError::AltAlreadyLinked {
            alt: alt_id.to_string(),
            main: existing.main_id,
        });
    }
    if !alts_of(store, guild_id, alt_id)?.is_empty() {
        return Err(BotError::AltIsMain(alt_id.to_string()));
    }

    let link = AltLink {
        guild_id: guild_id.to_string(),
        main_id,
        alt_id: alt_id.to_string(),
        added_by: added_by.to_string(),
        added_at: now,
    };
    store.update_or_insert(ALTS_COLLECTION, &by_alt(guild_id, alt_id), to_document(&link)?)?;
    tracing::debug!(guild = guild_id, main = %link.main_id, alt = alt_id, "alt linked");
    Ok(link)
}

/// Unlink `alt_id`. Returns the removed link, if there was one.
pub fn remove_alt(
    store: &mut dyn DocumentStore,
    guild_id: &str,
    alt_id: &str,
) -> Result<Option<AltLink>> {
    let link = find_link(store, guild_id, alt_id)?;
    if link.is_some() {
        store.delete(ALTS_COLLECTION, &by_alt(guild_id, alt_id))?;
    }
    Ok(link)
}

/// Alts of `main_id`, oldest link first.
pub fn alts_of(store: &dyn DocumentStore, guild_id: &str, main_id: &str) -> Result<Vec<AltLink>> {
    store
        .find_many(
            ALTS_COLLECTION,
            &Filter::eq("guild_id", guild_id).and("main_id", main_id),
        )?
        .into_iter()
        .map(from_document)
        .collect()
}

/// The main account `user_id` is an alt of, if any.
pub fn main_of(store: &dyn DocumentStore, guild_id: &str, user_id: &str) -> Result<Option<String>> {
    Ok(find_link(store, guild_id, user_id)?.map(|link| link.main_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn add(store: &mut MemoryStore, main: &str, alt: &str) -> Result<AltLink> {
        add_alt(store, "g1", main, alt, "mod", Utc::now())
    }

    fn alt_ids(store: &MemoryStore, main: &str) -> Vec<String> {
        alts_of(store, "g1", main)
            .unwrap()
            .into_iter()
            .map(|l| l.alt_id)
            .collect()
    }

    #[test]
    fn add_and_list() {
        let mut store = MemoryStore::new();
        add(&mut store, "main", "a1").unwrap();
        add(&mut store, "main", "a2").unwrap();

        assert_eq!(alt_ids(&store, "main"), vec!["a1", "a2"]);
        assert_eq!(main_of(&store, "g1", "a2").unwrap().as_deref(), Some("main"));
        assert_eq!(main_of(&store, "g1", "main").unwrap(), None);
    }

    #[test]
    fn self_link_is_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(add(&mut store, "u", "u"), Err(BotError::AltSelfLink(_))));
    }

    #[test]
    fn linking_back_to_own_main_is_a_self_link() {
        let mut store = MemoryStore::new();
        add(&mut store, "main", "a1").unwrap();
        assert!(matches!(add(&mut store, "a1", "main"), Err(BotError::AltSelfLink(_))));
    }

    #[test]
    fn alt_of_another_main_is_rejected() {
        let mut store = MemoryStore::new();
        add(&mut store, "m1", "a1").unwrap();
        match add(&mut store, "m2", "a1") {
            Err(BotError::AltAlreadyLinked { alt, main }) => {
                assert_eq!(alt, "a1");
                assert_eq!(main, "m1");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn main_with_alts_cannot_become_an_alt() {
        let mut store = MemoryStore::new();
        add(&mut store, "m1", "a1").unwrap();
        assert!(matches!(add(&mut store, "m2", "m1"), Err(BotError::AltIsMain(_))));
    }

    #[test]
    fn chains_resolve_to_the_root_main() {
        let mut store = MemoryStore::new();
        add(&mut store, "main", "a1").unwrap();
        let link = add(&mut store, "a1", "a2").unwrap();

        assert_eq!(link.main_id, "main");
        assert_eq!(alt_ids(&store, "main"), vec!["a1", "a2"]);
        assert!(alt_ids(&store, "a1").is_empty());
    }

    #[test]
    fn re_adding_is_idempotent() {
        let mut store = MemoryStore::new();
        let first = add(&mut store, "main", "a1").unwrap();
        let again = add(&mut store, "main", "a1").unwrap();

        assert_eq!(first, again);
        assert_eq!(store.find_many(ALTS_COLLECTION, &Filter::all()).unwrap().len(), 1);
    }

    #[test]
    fn guilds_are_independent() {
        let mut store = MemoryStore::new();
        add(&mut store, "m1", "a1").unwrap();
        add_alt(&mut store, "g2", "m2", "a1", "mod", Utc::now()).unwrap();
        assert_eq!(main_of(&store, "g2", "a1").unwrap().as_deref(), Some("m2"));
    }

    #[test]
    fn remove_returns_the_link() {
        let mut store = MemoryStore::new();
        add(&mut store, "main", "a1").unwrap();

        let removed = remove_alt(&mut store, "g1", "a1").unwrap().unwrap();
        assert_eq!(removed.main_id, "main");
        assert!(remove_alt(&mut store, "g1", "a1").unwrap().is_none());
        assert!(alt_ids(&store, "main").is_empty());
    }
}
