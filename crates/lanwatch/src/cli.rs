//! Clap derive structures for the `lanwatch` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lanwatch -- live dashboard for a LAN telemetry feed
#[derive(Debug, Parser)]
#[command(
    name = "lanwatch",
    version,
    about = "Watch a LAN telemetry feed from the command line",
    long_about = "Connects to a network-telemetry WebSocket feed, reconciles device,\n\
        topology and metric messages into a live dashboard state, and prints it.\n\n\
        Recorded feeds (one JSON frame per line) can be replayed offline.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Feed profile to use
    #[arg(long, short = 'p', env = "LANWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "LANWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the config file's `defaults.output`)
    #[arg(long, short = 'o', env = "LANWATCH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty tables (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to the live feed and follow the dashboard
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Run a recorded feed (JSON lines) through the engine
    #[command(alias = "r")]
    Replay(ReplayArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Feed URL (overrides the profile's feed_url)
    #[arg(long, short = 'u', env = "LANWATCH_URL")]
    pub url: Option<String>,

    /// Minimum seconds between summary lines
    #[arg(long, default_value = "1")]
    pub refresh_secs: u64,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Events shown in the final report (defaults to the configured page size)
    #[arg(long)]
    pub events: Option<usize>,
}

// ── Replay ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Recorded feed: one JSON frame per line
    pub file: PathBuf,

    /// Event page to show (1-indexed, clamped to the last page)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Events per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current resolved configuration
    Show,

    /// Write a starter config with a `default` profile
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
