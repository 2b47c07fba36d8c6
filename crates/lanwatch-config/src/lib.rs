//! Shared configuration for the lanwatch CLI.
//!
//! TOML profiles layered under `LANWATCH_` environment variables, and
//! translation into `lanwatch_core::EngineConfig` + `FeedConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lanwatch_core::config::{
    DEFAULT_ARP_HISTORY_CAPACITY, DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_FEED_URL, DEFAULT_PAGE_SIZE,
};
use lanwatch_core::{EngineConfig, FeedConfig};

pub const DEFAULT_PROFILE: &str = "default";
pub const ENV_PREFIX: &str = "LANWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found (available: {available})")]
    UnknownProfile { profile: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named feed profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// `table` or `json`.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,

    #[serde(default = "default_arp_history_capacity")]
    pub arp_history_capacity: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_frame_queue_capacity")]
    pub frame_queue_capacity: usize,

    /// WebSocket handshake timeout, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            event_log_capacity: default_event_log_capacity(),
            arp_history_capacity: default_arp_history_capacity(),
            page_size: default_page_size(),
            frame_queue_capacity: default_frame_queue_capacity(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_event_log_capacity() -> usize {
    DEFAULT_EVENT_LOG_CAPACITY
}
fn default_arp_history_capacity() -> usize {
    DEFAULT_ARP_HISTORY_CAPACITY
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_frame_queue_capacity() -> usize {
    lanwatch_core::FeedOptions::default().frame_queue_capacity
}
fn default_connect_timeout() -> u64 {
    lanwatch_core::FeedOptions::default().connect_timeout.as_secs()
}

/// A named feed profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Feed endpoint (e.g., "ws://localhost:8000/ws/frontend").
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arp_history_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_queue_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            event_log_capacity: None,
            arp_history_capacity: None,
            frame_queue_capacity: None,
            connect_timeout: None,
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "lanwatch", "lanwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lanwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, then `LANWATCH_*` environment variables.
///
/// A missing file is not an error. Nested keys use a double underscore:
/// `LANWATCH_DEFAULTS__PAGE_SIZE=25`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// A starter config with one `default` profile pointing at the local feed.
pub fn starter_config() -> Config {
    let mut cfg = Config::default();
    cfg.profiles.insert(DEFAULT_PROFILE.into(), Profile::default());
    cfg
}

// ── Profile resolution ──────────────────────────────────────────────

/// Everything a command needs to run against one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub profile: String,
    pub feed: FeedConfig,
    pub engine: EngineConfig,
    pub page_size: usize,
    pub output: String,
}

impl Config {
    /// Name of the profile to use: explicit, else `default_profile`, else `default`.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Look up a profile by name.
    ///
    /// The `default` profile always exists: when the file does not define
    /// it, the built-in local feed is used.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.clone());
        }
        if name == DEFAULT_PROFILE {
            return Ok(Profile::default());
        }
        Err(ConfigError::UnknownProfile {
            profile: name.into(),
            available: self.available_profiles(),
        })
    }

    fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            return DEFAULT_PROFILE.into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Resolve a profile into runtime engine and feed settings.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Resolved, ConfigError> {
        let name = self.profile_name(requested);
        let profile = self.profile(name)?;
        let url = parse_feed_url(&profile.feed_url)?;

        let defaults = &self.defaults;
        let engine = EngineConfig {
            event_log_capacity: profile
                .event_log_capacity
                .unwrap_or(defaults.event_log_capacity),
            arp_history_capacity: profile
                .arp_history_capacity
                .unwrap_or(defaults.arp_history_capacity),
        };
        let feed = FeedConfig::new(url)
            .with_frame_queue_capacity(
                profile
                    .frame_queue_capacity
                    .unwrap_or(defaults.frame_queue_capacity),
            )
            .with_connect_timeout(Duration::from_secs(
                profile.connect_timeout.unwrap_or(defaults.connect_timeout),
            ));

        Ok(Resolved {
            profile: name.to_owned(),
            feed,
            engine,
            page_size: defaults.page_size,
            output: defaults.output.clone(),
        })
    }
}

/// Parse and check a feed URL (`ws://` or `wss://` only).
pub fn parse_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "feed_url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "feed_url".into(),
            reason: format!("expected a ws:// or wss:// URL, got scheme '{other}'"),
        }),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
