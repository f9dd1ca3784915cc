mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    alt::AltSubcommand, config::ConfigSubcommand, init::InitArgs, run::RunArgs,
    store::StoreSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tickbot",
    about = "Tick-driven chat bot host: plugins, scheduled actions and a document store",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .tickbot/)
    #[arg(long, global = true, env = "TICKBOT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .tickbot/ with a default config
    Init(InitArgs),

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Read and write documents in the configured store
    Store {
        #[command(subcommand)]
        subcommand: StoreSubcommand,
    },

    /// Manage alternate-account links
    Alt {
        #[command(subcommand)]
        subcommand: AltSubcommand,
    },

    /// Import a JSON collection dump into the configured store
    Migrate {
        /// Dump file: {"collection": [document, ...]}
        file: PathBuf,

        /// Count what would be imported without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// List the slash commands of every enabled plugin
    Commands,

    /// Run the console gateway: JSON interactions on stdin, replies on stdout
    Run(RunArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init(args) => cmd::init::run(&root, args),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Store { subcommand } => cmd::store::run(&root, subcommand, cli.json),
        Commands::Alt { subcommand } => cmd::alt::run(&root, subcommand, cli.json),
        Commands::Migrate { file, dry_run } => cmd::migrate::run(&root, &file, dry_run, cli.json),
        Commands::Commands => cmd::commands::run(&root, cli.json),
        Commands::Run(args) => cmd::run::run(&root, args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
