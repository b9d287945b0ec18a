//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// lazydep - Lazy plugin dependency cache
///
/// Installs optional plugins on demand into an isolated workspace and
/// snapshots the workspace between runs.
#[derive(Parser, Debug)]
#[command(name = "lazydep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LAZYDEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace directory (overrides config)
    #[arg(long, global = true, env = "LAZYDEP_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Use a workspace inside this repository checkout, keyed without the
    /// manifest fingerprint
    #[arg(long, global = true, env = "LAZYDEP_REPOSITORY", conflicts_with = "workspace")]
    pub repository: Option<PathBuf>,

    /// Snapshot store directory (overrides config)
    #[arg(long, global = true, env = "LAZYDEP_STORE")]
    pub store: Option<PathBuf>,

    /// Leave the dependency manifest fingerprint out of the cache key
    #[arg(long, global = true)]
    pub no_manifest_fingerprint: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cache key for a run configuration
    Key(KeyArgs),

    /// Acquire plugins for one run and persist newly installed ones
    Acquire(AcquireArgs),

    /// Manage stored snapshots
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Run configuration descriptors
#[derive(Args, Debug, Clone)]
pub struct RunConfigArgs {
    /// Project kind query (first key fragment)
    #[arg(long, env = "LAZYDEP_PROJECT")]
    pub project: Option<String>,

    /// Hosting/platform query (second key fragment)
    #[arg(long, env = "LAZYDEP_HOSTING")]
    pub hosting: Option<String>,
}

/// Arguments for the key command
#[derive(Parser, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub run: RunConfigArgs,
}

/// Arguments for the acquire command
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Packages to acquire, as name or name@version
    #[arg(required = true)]
    pub packages: Vec<String>,

    #[command(flatten)]
    pub run: RunConfigArgs,

    /// Install packages missing from a restored workspace
    #[arg(long)]
    pub verify_installed: bool,

    /// Fail the run if saving the snapshot fails
    #[arg(long)]
    pub strict_save: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List stored snapshots
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove the snapshot for one key
    Remove {
        /// Cache key as printed by `lazydep key`
        key: String,
    },

    /// Remove snapshots older than N days
    Gc {
        /// Age threshold in days (0 disables gc)
        #[arg(long, default_value = "30")]
        days: u32,

        /// Dry run - show what would be removed
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove every snapshot
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_acquire() {
        let cli = Cli::try_parse_from([
            "lazydep",
            "acquire",
            "pluginA@2.0.0",
            "@scope/pluginB",
            "--project",
            "lib",
            "--hosting",
            "hostA",
        ])
        .unwrap();

        match cli.command {
            Commands::Acquire(args) => {
                assert_eq!(args.packages, vec!["pluginA@2.0.0", "@scope/pluginB"]);
                assert_eq!(args.run.project.as_deref(), Some("lib"));
                assert_eq!(args.run.hosting.as_deref(), Some("hostA"));
                assert_eq!(args.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn acquire_requires_packages() {
        assert!(Cli::try_parse_from(["lazydep", "acquire"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lazydep",
            "key",
            "--no-manifest-fingerprint",
            "--workspace",
            "/tmp/ws",
            "-vv",
        ])
        .unwrap();
        assert!(cli.no_manifest_fingerprint);
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn repository_conflicts_with_workspace() {
        let cli = Cli::try_parse_from(["lazydep", "key", "--repository", "/repo"]).unwrap();
        assert_eq!(cli.repository, Some(PathBuf::from("/repo")));

        assert!(Cli::try_parse_from([
            "lazydep",
            "key",
            "--repository",
            "/repo",
            "--workspace",
            "/tmp/ws",
        ])
        .is_err());
    }
}
