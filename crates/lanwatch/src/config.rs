//! CLI configuration: thin wrapper around `lanwatch_config`.
//!
//! Adds `GlobalOpts`-aware loading (`--config`, `--profile`, `--output`)
//! on top of the shared types.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use lanwatch_config::{Config, Resolved, load_config_from, save_config_to, starter_config};

/// Config file in effect: `--config` / `LANWATCH_CONFIG`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(lanwatch_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_path(global))?)
}

/// Resolve the active profile, with an optional feed URL override.
pub fn resolve(
    global: &GlobalOpts,
    cfg: &Config,
    url_override: Option<&str>,
) -> Result<Resolved, CliError> {
    let mut resolved = cfg.resolve(global.profile.as_deref())?;
    if let Some(raw) = url_override {
        resolved.feed.url = lanwatch_config::parse_feed_url(raw)?;
    }
    Ok(resolved)
}

/// `--output` wins; otherwise the config's `defaults.output`.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    <OutputFormat as ValueEnum>::from_str(&cfg.defaults.output, true).map_err(|_| {
        CliError::Validation {
            field: "defaults.output".into(),
            reason: format!(
                "expected 'table', 'json' or 'json-compact', got '{}'",
                cfg.defaults.output
            ),
        }
    })
}
