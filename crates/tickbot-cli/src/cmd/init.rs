use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::Path;
use tickbot_core::{
    config::{Config, StoreBackend},
    io, paths,
};

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Memory,
    File,
    Redb,
}

impl From<BackendArg> for StoreBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Memory => StoreBackend::Memory,
            BackendArg::File => StoreBackend::File,
            BackendArg::Redb => StoreBackend::Redb,
        }
    }
}

#[derive(Args)]
pub struct InitArgs {
    /// Bot name (default: the root directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Document store backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

pub fn run(root: &Path, args: InitArgs) -> anyhow::Result<()> {
    let bot_name = args.name.unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tickbot".to_string())
    });

    println!("Initializing tickbot in: {}", root.display());

    let dir = paths::tickbot_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config.yaml")?
    } else {
        let mut cfg = Config::new(bot_name);
        if let Some(backend) = args.backend {
            cfg.store.backend = backend.into();
        }
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let data_dir = paths::resolve(root, &config.store.path);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let ignore_entry = format!("{}/", paths::DATA_DIR);
    if io::ensure_line(&paths::gitignore_path(root), &ignore_entry)
        .context("failed to update .gitignore")?
    {
        println!("  updated: {} (+{ignore_entry})", paths::GITIGNORE);
    }

    println!("\nReady. Start the console gateway with: tickbot run");
    Ok(())
}
