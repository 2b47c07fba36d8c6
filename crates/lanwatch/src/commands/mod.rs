//! Command handlers.

pub mod config_cmd;
pub mod dashboard;
pub mod replay;
pub mod watch;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output;

/// Settings shared by the commands that run the engine.
pub struct Context {
    pub resolved: Resolved,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Context {
    pub fn load(global: &GlobalOpts, url_override: Option<&str>) -> Result<Self, CliError> {
        let cfg = config::load(global)?;
        let resolved = config::resolve(global, &cfg, url_override)?;
        tracing::debug!(profile = %resolved.profile, url = %resolved.feed.url, "resolved profile");

        Ok(Self {
            format: config::output_format(global, &cfg)?,
            color: output::should_color(global.color),
            quiet: global.quiet,
            resolved,
        })
    }
}
