//! # CLI Layer
//!
//! The binary's side of logbook: the only place that parses arguments,
//! reads environment variables, installs logging or decides exit codes.
//!
//! Resolution order for where data lives:
//!
//! 1. `--data-dir`
//! 2. `LOGBOOK_DATA_DIR`
//! 3. `data_dir` in the config file
//! 4. the platform data directory (`directories::ProjectDirs`)
//!
//! `--save-on-exit` and `--no-seed` override the matching config keys for a
//! single run without touching the file.

mod args;
mod logging;

use args::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use logbook::commands::CmdMessage;
use logbook::config::{LogbookConfig, SavePolicy, CONFIG_FILENAME};
use logbook::domains::Collection;
use logbook::error::{LogbookError, Result};
use logbook::interact::{render, Console};
use logbook::session::Session;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => project_dirs()?.config_dir().join(CONFIG_FILENAME),
    };
    let stored = LogbookConfig::load(&config_path)?;
    debug!(path = %config_path.display(), "config loaded");

    if let Commands::Config { key, value } = &cli.command {
        return handle_config(stored, &config_path, key.as_deref(), value.as_deref());
    }

    let config = effective_config(&cli, stored)?;
    let data_dir = resolve_data_dir(&cli, &config)?;
    match cli.command.collection() {
        Some(collection) => handle_collection(collection, data_dir, config),
        None => handle_path(&data_dir, &config_path),
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "logbook", "logbook")
        .ok_or_else(|| LogbookError::Config("Could not determine a home directory".into()))
}

/// Stored config with environment and per-run flag overrides applied.
fn effective_config(cli: &Cli, mut config: LogbookConfig) -> Result<LogbookConfig> {
    config.apply_env(|var| std::env::var(var).ok())?;
    if cli.save_on_exit {
        config.save_policy = SavePolicy::OnExit;
    }
    if cli.no_seed {
        config.seed_samples = false;
    }
    Ok(config)
}

fn resolve_data_dir(cli: &Cli, config: &LogbookConfig) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    Ok(project_dirs()?.data_dir().to_path_buf())
}

fn handle_collection(collection: Collection, data_dir: PathBuf, config: LogbookConfig) -> Result<()> {
    let max_attempts = config.max_field_attempts;
    let mut session = Session::open(data_dir, config)?;
    let mut console = Console::stdio().with_max_attempts(max_attempts);
    collection.run(&mut session, &mut console)
}

fn handle_path(data_dir: &Path, config_path: &Path) -> Result<()> {
    println!("data dir: {}", data_dir.display());
    println!("config:   {}", config_path.display());
    for collection in Collection::ALL {
        let file = data_dir.join(format!("{}.json", collection.name()));
        let marker = if file.exists() { "" } else { " (not created yet)" };
        println!("{:<9} {}{}", format!("{}:", collection), file.display(), marker);
    }
    Ok(())
}

fn handle_config(
    mut config: LogbookConfig,
    path: &Path,
    key: Option<&str>,
    value: Option<&str>,
) -> Result<()> {
    match (key, value) {
        (None, _) => {
            for (key, value) in config.entries() {
                println!("{} = {}", key, value);
            }
        }
        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => return Err(LogbookError::Config(format!("Unknown config key: {}", key))),
        },
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save(path)?;
            let shown = config.get(key).unwrap_or_default();
            print_messages(&[CmdMessage::success(format!("{} set to {}", key, shown))]);
        }
    }
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        println!("{}", render::message(message));
    }
}
