use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tickbot_core::{config::Config, migrate, store::open_store};

pub fn run(root: &Path, file: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = open_store(root, &config.store).context("failed to open store")?;
    let report = migrate::import_file(store.as_mut(), file, dry_run)
        .with_context(|| format!("failed to import {}", file.display()))?;

    if json {
        return print_json(&report);
    }

    let rows = report
        .imported
        .iter()
        .map(|(name, count)| vec![name.clone(), count.to_string()])
        .collect();
    print_table(&["COLLECTION", "DOCUMENTS"], rows);
    let verb = if dry_run { "would import" } else { "imported" };
    println!(
        "\n{verb} {} document(s), skipped {}",
        report.total(),
        report.skipped
    );
    Ok(())
}
