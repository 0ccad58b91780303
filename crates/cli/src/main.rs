//! forgescope command-line front end.
//!
//! Inspects the local git repository behind a forge pull-request workflow:
//! which hosted repository a directory belongs to, how its remotes relate,
//! the state of its branches, and whether a merge would conflict.

mod commands;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use forgescope_core::config::ForgescopeConfig;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// forgescope command-line front end.
#[derive(Parser, Debug)]
#[command(
    name = "forgescope",
    version,
    about = "Inspect a local git repository before opening a pull request"
)]
struct Cli {
    /// Path to the TOML configuration file
    /// (default: <config dir>/forgescope/config.toml, if it exists).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve the hosted repository a directory belongs to.
    Resolve {
        /// Working tree root.
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Also detect fork relationships between remotes.
        #[arg(long)]
        forks: bool,
    },

    /// List configured remotes and the repositories they point at.
    Remotes {
        /// Working tree root.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Query branch state.
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Predict whether merging HEAD into BASE would conflict.
    Conflicts {
        /// Branch merged into.
        base: String,
        /// Branch merged from.
        head: String,
        /// Working tree root.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Run every local check a pull request needs. Exits 2 when blocked.
    Preflight {
        /// Branch the pull request targets.
        #[arg(long)]
        base: String,
        /// Branch the pull request is opened from (default: current branch).
        #[arg(long)]
        head: Option<String>,
        /// Working tree root.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum BranchAction {
    /// Print the checked-out branch.
    Current {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Check whether a local branch exists.
    Exists {
        branch: String,
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Count commits on HEAD that BASE lacks.
    Count {
        base: String,
        head: String,
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Check whether HEAD is behind BASE.
    Behind {
        base: String,
        head: String,
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a configuration file with every default filled in.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./forgescope.toml")]
        output: PathBuf,
    },
    /// Validate the configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, source) = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.log_level.as_deref(), &config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match &source {
        Some(path) => info!(path = %path.display(), "using configuration file"),
        None => debug!("no configuration file, using defaults"),
    }

    match run(cli, config, source).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: ForgescopeConfig, source: Option<PathBuf>) -> Result<ExitCode> {
    let json = cli.json;
    let runner = config.runner();

    match cli.command {
        Commands::Resolve { dir, forks } => commands::repo::run_resolve(&dir, forks, json)?,
        Commands::Remotes { dir } => commands::repo::run_remotes(&dir, json)?,
        Commands::Branch { action } => match action {
            BranchAction::Current { dir } => {
                commands::branch::run_current(runner, &dir, json).await?
            }
            BranchAction::Exists { branch, dir } => {
                commands::branch::run_exists(runner, &dir, &branch, json).await?
            }
            BranchAction::Count { base, head, dir } => {
                commands::branch::run_count(runner, &dir, &base, &head, json).await?
            }
            BranchAction::Behind { base, head, dir } => {
                commands::branch::run_behind(runner, &dir, &base, &head, json).await?
            }
        },
        Commands::Conflicts { base, head, dir } => {
            commands::conflicts::run_conflicts(runner, &dir, &base, &head, json).await?
        }
        Commands::Preflight { base, head, dir } => {
            let ready =
                commands::preflight::run_preflight(runner, &dir, &base, head.as_deref(), json)
                    .await?;
            if !ready {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { output } => commands::config::run_init(&output)?,
            ConfigAction::Validate => {
                commands::config::run_validate(source.as_deref(), &config)?
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// `<config dir>/forgescope/config.toml`.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("forgescope").join("config.toml"))
}

/// Load the configuration named on the command line, else the default file
/// if it exists, else built-in defaults. Also returns the file that was read.
fn load_config(explicit: Option<&Path>) -> Result<(ForgescopeConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok((ForgescopeConfig::default(), None)),
        },
    };
    let config = ForgescopeConfig::load_and_validate(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    Ok((config, Some(path)))
}

/// `--log-level`, else `RUST_LOG`, else the configured level.
fn log_filter(flag: Option<&str>, config: &ForgescopeConfig) -> EnvFilter {
    if let Some(level) = flag {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_preflight() {
        let cli = Cli::parse_from([
            "forgescope", "--json", "preflight", "--base", "main", "--dir", "/tmp/repo",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Preflight { base, head, dir } => {
                assert_eq!(base, "main");
                assert!(head.is_none());
                assert_eq!(dir, PathBuf::from("/tmp/repo"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_branch_count_defaults_dir() {
        let cli = Cli::parse_from(["forgescope", "branch", "count", "main", "feature"]);
        match cli.command {
            Commands::Branch {
                action: BranchAction::Count { base, head, dir },
            } => {
                assert_eq!((base.as_str(), head.as_str()), ("main", "feature"));
                assert_eq!(dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let err = load_config(Some(Path::new("/nonexistent/forgescope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load configuration"));
    }

    #[test]
    fn test_explicit_config_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[git]\ntimeout_secs = 0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());

        std::fs::write(&path, "[git]\ntimeout_secs = 5\n").unwrap();
        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.git.timeout_secs, 5);
        assert_eq!(source.as_deref(), Some(path.as_path()));
    }
}
