//! CLI entry point for semisus.
//!
//! This binary adds files to a work list and then scans them for look-alike
//! semicolons, or rewrites their semicolons in either direction.
//!
//! # Usage
//!
//! ```bash
//! semisus [OPTIONS] <COMMAND>
//!
//! # Show how many semicolons in a directory are look-alikes
//! semisus scan ./src
//!
//! # Replace about one semicolon in five, in C# files only
//! semisus --pattern '*.cs' --randomized --chance 80 troll ./src
//!
//! # Restore every semicolon
//! semisus detroll ./src
//!
//! # Persist settings
//! semisus config set randomized_chance 95
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre};
use sus_batch::{BatchCoordinator, BatchEvent, TrollType};
use sus_core::{Config, WorkItem};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Capacity of the coordinator's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_FILE: &str = "semisus.json";

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Scan source files for look-alike semicolons, or swap them in and out.
///
/// Files and directories given as inputs are added to a work list of at most
/// 1000 files, then every file is processed in order. Press Ctrl-C to cancel;
/// a cancelled troll run restores the files it already changed.
#[derive(Parser)]
#[command(name = "semisus", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON configuration file.
    #[arg(short, long, global = true, env = "SEMISUS_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

    /// File name pattern to accept (repeatable). Overrides the configured patterns.
    #[arg(short, long = "pattern", global = true)]
    patterns: Vec<String>,

    /// Accept every file regardless of patterns.
    #[arg(long, global = true)]
    all_files: bool,

    /// Descend into subdirectories of directory inputs.
    #[arg(short, long, global = true)]
    recursive: bool,

    /// Replace each semicolon at random instead of all of them.
    #[arg(long, global = true)]
    randomized: bool,

    /// Chance (0-100) that a semicolon is kept in a randomized run.
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    chance: Option<u8>,

    /// Print the final work list as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Count look-alike semicolons in every file.
    Scan {
        /// Files or directories to add.
        #[arg(required = true)]
        inputs: Vec<Utf8PathBuf>,
    },

    /// Replace semicolons with look-alikes.
    Troll {
        /// Files or directories to add.
        #[arg(required = true)]
        inputs: Vec<Utf8PathBuf>,
    },

    /// Replace look-alikes with semicolons.
    Detroll {
        /// Files or directories to add.
        #[arg(required = true)]
        inputs: Vec<Utf8PathBuf>,
    },

    /// Show which files would be added, without touching them.
    List {
        /// Files or directories to add.
        #[arg(required = true)]
        inputs: Vec<Utf8PathBuf>,
    },

    /// Show or change the persisted configuration.
    Config {
        /// Configuration action.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// Change one option in the configuration file.
    ///
    /// Keys: patterns (comma-separated), all_files, recursive, randomized,
    /// randomized_chance.
    Set {
        /// Option name.
        key: String,
        /// New value.
        value: String,
    },
}

/// What to do with the work list once inputs are added.
#[derive(Debug, Clone, Copy)]
enum Operation {
    List,
    Scan,
    Substitute(TrollType),
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},ignore=warn,globset=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the configuration file and applies command-line overrides.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or if the result
/// is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = Config::load_or_default(&cli.config)?;
    apply_overrides(cli, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if !cli.patterns.is_empty() {
        config.discovery.patterns.clone_from(&cli.patterns);
    }
    config.discovery.all_files |= cli.all_files;
    config.discovery.recursive |= cli.recursive;
    config.substitution.randomized |= cli.randomized;
    if let Some(chance) = cli.chance {
        config.substitution.randomized_chance = chance;
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Adds `inputs` to a fresh work list and runs `operation` over it.
///
/// # Errors
///
/// Returns an error if the run cannot be started, the worker fails, or a
/// cancelled troll run could not restore every file.
async fn run_batch(
    config: &Config,
    inputs: Vec<Utf8PathBuf>,
    operation: Operation,
    json: bool,
) -> color_eyre::Result<()> {
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let coordinator = BatchCoordinator::new(Arc::new(config.substitution), tx)
        .with_recursive(config.discovery.recursive);

    let patterns = config.discovery.effective_patterns().map(<[String]>::to_vec);
    coordinator.add(inputs, patterns)?.join().await?;
    info!(files = coordinator.len(), "Added files");

    let run = if coordinator.is_empty() {
        warn!("No matching files found");
        None
    } else {
        match operation {
            Operation::List => None,
            Operation::Scan => Some(coordinator.scan()?),
            Operation::Substitute(troll_type) => Some(coordinator.troll_init(troll_type)?),
        }
    };

    let mut failure = None;
    if let Some(run) = run {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut cancelling = false;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(BatchEvent::Progress { current, total, message }) => {
                        print_progress(current, total, &message);
                    }
                    Some(BatchEvent::Completed { kind, cancelled, error }) => {
                        info!(%kind, cancelled, "Run finished");
                        failure = error;
                        break;
                    }
                    Some(_) => {}
                    None => break,
                },
                _ = &mut ctrl_c, if !cancelling => {
                    warn!("Cancelling, waiting for the current file to finish");
                    coordinator.cancel();
                    cancelling = true;
                }
            }
        }
        run.join().await?;
    }

    let items = coordinator.items();
    if json {
        print_json(&items)?;
    } else {
        print_item_table(&items, matches!(operation, Operation::List));
    }

    match failure {
        Some(error) => Err(eyre!(error)),
        None => Ok(()),
    }
}

/// Runs a `config` subcommand.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, validated, or written.
fn run_config(cli: &Cli, action: &ConfigAction) -> color_eyre::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = build_config(cli)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", serde_json::to_string_pretty(&config)?)?;
        }
        ConfigAction::Init { force } => {
            if cli.config.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.config);
            }
            Config::default().save(&cli.config)?;
            info!(path = %cli.config, "Wrote default configuration");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default(&cli.config)?;
            set_option(&mut config, key, value)?;
            config.save(&cli.config)?;
            info!(path = %cli.config, key = %key, value = %value, "Updated configuration");
        }
    }
    Ok(())
}

/// Sets one configuration option from its textual value.
///
/// # Errors
///
/// Returns an error for unknown keys or unparsable values.
fn set_option(config: &mut Config, key: &str, value: &str) -> color_eyre::Result<()> {
    match key {
        "patterns" => {
            config.discovery.patterns = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }
        "all_files" => config.discovery.all_files = parse_bool(key, value)?,
        "recursive" => config.discovery.recursive = parse_bool(key, value)?,
        "randomized" => config.substitution.randomized = parse_bool(key, value)?,
        "randomized_chance" | "chance" => {
            config.substitution.randomized_chance = value
                .parse()
                .map_err(|e| eyre!("invalid value for {key}: {e}"))?;
        }
        _ => bail!("unknown configuration key: {key}"),
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> color_eyre::Result<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("invalid value for {key}: expected true or false, got {value}"),
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints one progress line to stderr.
fn print_progress(current: usize, total: usize, message: &str) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "[{current}/{total}] {message}");
}

/// Prints the work list as a table.
fn print_item_table(items: &[WorkItem], paths_only: bool) {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if items.is_empty() {
        let _ = writeln!(handle, "No files.");
        return;
    }

    if paths_only {
        for item in items {
            let _ = writeln!(handle, "{}", item.path);
        }
        let _ = writeln!(handle);
        let _ = writeln!(handle, "{} file(s)", items.len());
        return;
    }

    let _ = writeln!(handle);
    let _ = writeln!(handle, "{:<32} {:<12} Summary", "File", "Status");
    let _ = writeln!(handle, "{}", "=".repeat(80));
    for item in items {
        let _ = writeln!(
            handle,
            "{:<32} {:<12} {}",
            item.display_name,
            item.status.label(),
            item.summary
        );
    }
}

/// Prints the work list as pretty-printed JSON.
fn print_json(items: &[WorkItem]) -> color_eyre::Result<()> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| eyre!("Failed to serialize JSON: {}", e))?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{json}")?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Route to appropriate command
    match &cli.command {
        Commands::Config { action } => run_config(&cli, action),
        Commands::Scan { inputs } => {
            let config = build_config(&cli)?;
            run_batch(&config, inputs.clone(), Operation::Scan, cli.json).await
        }
        Commands::Troll { inputs } => {
            let config = build_config(&cli)?;
            run_batch(
                &config,
                inputs.clone(),
                Operation::Substitute(TrollType::Troll),
                cli.json,
            )
            .await
        }
        Commands::Detroll { inputs } => {
            let config = build_config(&cli)?;
            run_batch(
                &config,
                inputs.clone(),
                Operation::Substitute(TrollType::DeTroll),
                cli.json,
            )
            .await
        }
        Commands::List { inputs } => {
            let config = build_config(&cli)?;
            run_batch(&config, inputs.clone(), Operation::List, cli.json).await
        }
    }
}
