//! Console gateway.
//!
//! Reads one JSON [`Interaction`] per stdin line and writes one JSON event
//! per stdout line: a `reply` for each interaction, a `message` for each
//! outgoing message produced by scheduled actions, and an `error` for lines
//! that are not interactions. After stdin closes the loop keeps ticking
//! until every scheduled job is done.

use crate::output::print_json_line;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::path::Path;
use tickbot_core::{
    action::ticker,
    command::{Interaction, OutgoingMessage, Response},
    config::{Config, WarnLevel},
    host::Host,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Args)]
pub struct RunArgs {
    /// Stop after this many ticks even if jobs are still scheduled
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Override tick.interval_ms from the config
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event<'a> {
    Reply {
        interaction_id: &'a str,
        #[serde(flatten)]
        response: Response,
    },
    Message(&'a OutgoingMessage),
    Error {
        message: String,
    },
}

pub fn run(root: &Path, args: RunArgs) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(ms) = args.interval_ms {
        config.tick.interval_ms = ms;
    }
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => warn!("{}", w.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
        }
    }

    let host = Host::from_config(root, &config).context("failed to start plugin host")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(gateway(host, &config, args.max_ticks));
    // a pending stdin read cannot be cancelled; don't wait for it
    runtime.shutdown_background();
    result
}

async fn gateway(mut host: Host, config: &Config, max_ticks: Option<u64>) -> anyhow::Result<()> {
    info!(
        bot = %config.bot.name,
        plugins = ?host.plugin_names(),
        interval_ms = config.tick.interval_ms,
        "console gateway started"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut timer = ticker(config.tick.interval());

    let mut stdin_open = true;
    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("failed to read stdin")? {
                    Some(line) => handle_line(&mut host, &line)?,
                    None => {
                        stdin_open = false;
                        info!(pending = host.pending_jobs(), "stdin closed");
                    }
                }
            }
            _ = timer.tick() => {
                ticks += 1;
                for message in host.tick() {
                    print_json_line(&Event::Message(&message))?;
                }
                if !stdin_open && host.pending_jobs() == 0 {
                    break;
                }
                if max_ticks.is_some_and(|limit| ticks >= limit) {
                    warn!(ticks, pending = ?host.pending_labels(), "tick limit reached");
                    break;
                }
            }
        }
    }

    info!(ticks, "console gateway stopped");
    Ok(())
}

fn handle_line(host: &mut Host, line: &str) -> anyhow::Result<()> {
    if line.trim().is_empty() {
        return Ok(());
    }
    let interaction: Interaction = match serde_json::from_str(line) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "ignoring malformed interaction");
            return print_json_line(&Event::Error {
                message: format!("malformed interaction: {e}"),
            });
        }
    };

    let response = host.dispatch(&interaction).unwrap_or_else(|e| {
        warn!(command = %interaction.command, error = %e, "interaction failed");
        Response::ephemeral(format!("error: {e}"))
    });
    print_json_line(&Event::Reply {
        interaction_id: &interaction.id,
        response,
    })
}
