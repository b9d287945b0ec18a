//! lazydep - Lazy plugin dependency cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use lazydep::cli::{Cli, Commands};
use lazydep::config::{Config, ConfigManager};
use lazydep::error::LazydepResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("lazydep=warn"),
        1 => EnvFilter::new("lazydep=info"),
        _ => EnvFilter::new("lazydep=debug"),
    };

    // Logs go to stderr so `--format json` output stays parseable
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(ref repository) = cli.repository {
        config.workspace = std::mem::take(&mut config.workspace).into_repository(repository);
    }
    if let Some(ref workspace) = cli.workspace {
        config.workspace.root = Some(workspace.clone());
    }
    if let Some(ref store) = cli.store {
        config.store.root = Some(store.clone());
    }
    if cli.no_manifest_fingerprint {
        config.workspace.include_manifest_fingerprint = false;
    }
}

async fn run() -> LazydepResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let mut config = config_manager.load().await?;
    apply_overrides(&cli, &mut config);

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Key(args) => lazydep::cli::commands::key(args, &config).await,
        Commands::Acquire(args) => lazydep::cli::commands::acquire(args, &config).await,
        Commands::Cache(args) => lazydep::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            lazydep::cli::commands::config(args, &config, cli.config).await
        }
    }
}
