use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tickbot_core::{config::Config, host::Host};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let host = Host::from_config(root, &config).context("failed to start plugin host")?;
    let commands = host.commands();

    if json {
        return print_json(&commands);
    }

    let rows = commands
        .into_iter()
        .map(|c| {
            let options = c
                .options
                .iter()
                .map(|o| {
                    if o.required {
                        format!("<{}:{}>", o.name, o.kind)
                    } else {
                        format!("[{}:{}]", o.name, o.kind)
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            vec![format!("/{}", c.name), options, c.description]
        })
        .collect();
    print_table(&["COMMAND", "OPTIONS", "DESCRIPTION"], rows);
    Ok(())
}
