use crate::error::{BotError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TICKBOT_DIR: &str = ".tickbot";
pub const CONFIG_FILE: &str = ".tickbot/config.yaml";
pub const DATA_DIR: &str = ".tickbot/data";
pub const REDB_FILE: &str = "store.redb";
pub const GITIGNORE: &str = ".gitignore";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn tickbot_dir(root: &Path) -> PathBuf {
    root.join(TICKBOT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn gitignore_path(root: &Path) -> PathBuf {
    root.join(GITIGNORE)
}

/// Resolve a configured store path against the project root. Absolute paths
/// are returned unchanged.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

pub fn collection_file(data_dir: &Path, collection: &str) -> PathBuf {
    data_dir.join(format!("{collection}.json"))
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static COLLECTION_RE: OnceLock<Regex> = OnceLock::new();
static COMMAND_RE: OnceLock<Regex> = OnceLock::new();

fn collection_re() -> &'static Regex {
    COLLECTION_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_\-]*$").unwrap())
}

fn command_re() -> &'static Regex {
    COMMAND_RE.get_or_init(|| Regex::new(r"^[a-z0-9_\-]{1,32}$").unwrap())
}

pub fn validate_collection(name: &str) -> Result<()> {
    if name.len() > 64 || !collection_re().is_match(name) {
        return Err(BotError::InvalidCollection(name.to_string()));
    }
    Ok(())
}

/// Slash command and option names: 1-32 lowercase letters, digits, `-`, `_`.
pub fn is_valid_command_name(name: &str) -> bool {
    command_re().is_match(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
