//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lanwatch_config::ConfigError;
use lanwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to feed at {url}")]
    #[diagnostic(
        code(lanwatch::connection_failed),
        help(
            "Check that the telemetry backend is running and reachable.\n\
             URL: {url}\n\
             Try: lanwatch watch --url ws://HOST:PORT/ws/frontend"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Feed connection timed out after {seconds}s")]
    #[diagnostic(
        code(lanwatch::timeout),
        help("Raise `connect_timeout` in your profile or check the feed host.")
    )]
    Timeout { seconds: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lanwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(lanwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: lanwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(lanwatch::config_exists),
        help("Use --force to overwrite it.\nPath: {path}")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(lanwatch::config))]
    Config(Box<figment::Error>),

    // ── Input ────────────────────────────────────────────────────────

    #[error("Recording not found: {path}")]
    #[diagnostic(
        code(lanwatch::not_found),
        help("Pass a file with one JSON feed frame per line.")
    )]
    RecordingNotFound { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(lanwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(lanwatch::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(lanwatch::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::RecordingNotFound { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile, available } => CliError::ProfileNotFound {
                name: profile,
                available,
            },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::FeedDisconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "Feed connection was lost".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Decode(e) => CliError::Validation {
                field: "frame".into(),
                reason: e.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "feed_url".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "ws://x".into(),
            reason: "refused".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let usage = CliError::from(ConfigError::Validation {
            field: "feed_url".into(),
            reason: "bad".into(),
        });
        assert_eq!(usage.exit_code(), exit_code::USAGE);

        let missing = CliError::from(ConfigError::UnknownProfile {
            profile: "lab".into(),
            available: "default".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        assert_eq!(
            CliError::Internal("boom".into()).exit_code(),
            exit_code::GENERAL
        );
    }
}
