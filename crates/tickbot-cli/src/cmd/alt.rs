use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use tickbot_core::{
    alts::{add_alt, alts_of, main_of, remove_alt},
    config::Config,
    store::open_store,
};

#[derive(Subcommand)]
pub enum AltSubcommand {
    /// Link ALT to MAIN
    Add {
        main: String,
        alt: String,
        #[arg(long)]
        guild: String,
        /// Recorded as the moderator who added the link
        #[arg(long, default_value = "console")]
        by: String,
    },

    /// Unlink ALT from its main
    Remove {
        alt: String,
        #[arg(long)]
        guild: String,
    },

    /// List the alts of MAIN
    List {
        main: String,
        #[arg(long)]
        guild: String,
    },

    /// Show what USER is linked to
    Whois {
        user: String,
        #[arg(long)]
        guild: String,
    },
}

pub fn run(root: &Path, subcmd: AltSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut store = open_store(root, &config.store).context("failed to open store")?;

    match subcmd {
        AltSubcommand::Add {
            main,
            alt,
            guild,
            by,
        } => {
            let link = add_alt(store.as_mut(), &guild, &main, &alt, &by, chrono::Utc::now())?;
            if json {
                print_json(&link)
            } else {
                println!("linked {} -> {}", link.alt_id, link.main_id);
                Ok(())
            }
        }
        AltSubcommand::Remove { alt, guild } => {
            let removed = remove_alt(store.as_mut(), &guild, &alt)?;
            if json {
                return print_json(&removed);
            }
            match removed {
                Some(link) => println!("unlinked {} from {}", link.alt_id, link.main_id),
                None => println!("{alt} is not a registered alt"),
            }
            Ok(())
        }
        AltSubcommand::List { main, guild } => {
            let links = alts_of(store.as_ref(), &guild, &main)?;
            if json {
                return print_json(&links);
            }
            if links.is_empty() {
                println!("{main} has no alts.");
                return Ok(());
            }
            let rows = links
                .into_iter()
                .map(|l| {
                    vec![
                        l.alt_id,
                        l.added_by,
                        l.added_at.format("%Y-%m-%d %H:%M").to_string(),
                    ]
                })
                .collect();
            print_table(&["ALT", "ADDED BY", "ADDED AT"], rows);
            Ok(())
        }
        AltSubcommand::Whois { user, guild } => {
            let main = main_of(store.as_ref(), &guild, &user)?;
            let alts: Vec<String> = alts_of(store.as_ref(), &guild, &user)?
                .into_iter()
                .map(|l| l.alt_id)
                .collect();
            if json {
                return print_json(&serde_json::json!({
                    "user": user,
                    "main": main,
                    "alts": alts,
                }));
            }
            match main {
                Some(main) => println!("{user} is an alt of {main}"),
                None if alts.is_empty() => println!("{user} has no linked accounts"),
                None => println!("{user} is a main with alts: {}", alts.join(", ")),
            }
            Ok(())
        }
    }
}
