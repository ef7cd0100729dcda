//! Configuration for the client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (`./.ptrail.toml`, then `~/.config/ptrail/config.toml`,
//!    or whatever `--configfile` points at)
//! 3. Built-in defaults (lowest priority)
//!
//! Command-line flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod colorizer;
mod observability;
mod serialization;

#[cfg(test)]
mod tests;

pub use colorizer::{ColorGroup, FileColorGroup};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://papertrailapp.com/api/v1";

/// CA bundle trusted when present on the host
pub const SYSTEM_CA_FILE: &str = "/etc/ssl/certs/ca-certificates.crt";

/// Config file looked up in the working directory before the home one
const LOCAL_CONFIG_FILE: &str = ".ptrail.toml";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API token (sent as a header)
    pub token: Option<String>,

    /// Basic-auth username (used with `password`)
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// API base URL
    pub api_url: String,

    /// Extra CA bundle; ignored if the file doesn't exist
    pub ca_file: Option<PathBuf>,

    /// Verify TLS certificates
    pub verify_ssl: bool,

    /// Seconds between polls in follow mode
    pub delay_secs: u64,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Fail on unparseable `--min-time`/`--max-time` instead of ignoring them
    pub strict_time: bool,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Named colorizer settings, selected with `--color-group`
    pub colorizer: HashMap<String, ColorGroup>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            password: None,
            api_url: DEFAULT_API_URL.to_string(),
            ca_file: Some(PathBuf::from(SYSTEM_CA_FILE)),
            verify_ssl: true,
            delay_secs: 2,
            timeout_secs: 60,
            strict_time: false,
            logging: LoggingConfig::default(),
            colorizer: HashMap::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_url: Option<String>,
    pub ca_file: Option<String>,
    pub verify_ssl: Option<bool>,
    pub delay_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub strict_time: Option<bool>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [colorizer.X] sections
    #[serde(default)]
    pub colorizer: HashMap<String, FileColorGroup>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Home config path: ~/.config/ptrail/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn home_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("ptrail").join("config.toml"))
    }

    /// Config file to use when none is given on the command line: the first
    /// existing of `./.ptrail.toml` and the home path, else the home path.
    pub fn config_path() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        Self::home_config_path()
    }

    /// Read a config file. A missing file is an empty config; an unreadable
    /// or invalid one is an error.
    pub(crate) fn read_file_config(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).with_context(|| {
                format!(
                    "Failed to parse config file {} (check quotes, booleans and section names)",
                    path.display()
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Cannot read config file {}", path.display()))),
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::config_path);
        let file = match &path {
            Some(p) => Self::read_file_config(p)?,
            None => FileConfig::default(),
        };
        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups over the defaults
    pub(crate) fn from_parts<E>(file: FileConfig, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Token: env > file
        let token = env("PAPERTRAIL_API_TOKEN")
            .filter(|t| !t.is_empty())
            .or(file.token);

        // API URL: env > file > default
        let api_url = env("PAPERTRAIL_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let ca_file = file.ca_file.map(PathBuf::from).or(defaults.ca_file);

        let colorizer = file
            .colorizer
            .into_iter()
            .map(|(name, group)| Ok((name.clone(), ColorGroup::from_file(&name, group)?)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            token,
            username: file.username,
            password: file.password,
            api_url,
            ca_file,
            verify_ssl: file.verify_ssl.unwrap_or(defaults.verify_ssl),
            delay_secs: file.delay_secs.unwrap_or(defaults.delay_secs),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            strict_time: file.strict_time.unwrap_or(defaults.strict_time),
            logging: LoggingConfig::from_file(file.logging)?,
            colorizer,
        })
    }

    /// True if some form of credentials is configured
    pub fn has_credentials(&self) -> bool {
        (self.username.is_some() && self.password.is_some()) || self.token.is_some()
    }
}
