//! `[logging]` section: diagnostic verbosity and the optional JSON log file
//!
//! stdout belongs to the log lines being searched, so whatever is set here
//! only ever reaches stderr or the file; see `crate::logging`.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Diagnostic verbosity for the `ptrail` target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    /// Quiet enough that a plain search prints nothing but events
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name; a typo is a config error rather than silence
    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            other => bail!(
                "Unknown log level {:?} in [logging] (expected trace, debug, info, warn or error)",
                other
            ),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// How often the JSON log file starts a new file
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file named exactly `file_prefix`
    Never,
}

impl LogRotation {
    /// Unknown names fall back to daily
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Mirror diagnostics as JSON lines under `file_dir`
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            file_enabled: false,
            file_dir: dirs::cache_dir()
                .map(|p| p.join("ptrail").join("logs"))
                .unwrap_or_else(|| PathBuf::from("./logs")),
            file_rotation: LogRotation::Daily,
            file_prefix: "ptrail".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Ok(Self {
            level: file
                .level
                .as_deref()
                .map(LogLevel::parse)
                .transpose()?
                .unwrap_or(defaults.level),
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.file_dir),
            file_rotation: file
                .file_rotation
                .map(|s| LogRotation::parse(&s))
                .unwrap_or(defaults.file_rotation),
            // An empty prefix would make `never` rotation write to the directory itself
            file_prefix: file
                .file_prefix
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.file_prefix),
        })
    }

    /// `EnvFilter` directive used when RUST_LOG is unset.
    ///
    /// HTTP internals stay at warn unless tracing everything, so `debug`
    /// shows ptrail's own request and cursor decisions without connection noise.
    pub fn filter_directive(&self) -> String {
        let http = match self.level {
            LogLevel::Trace => "debug",
            _ => "warn",
        };
        format!(
            "ptrail={level},reqwest={http},hyper_util={http}",
            level = self.level.as_str(),
        )
    }
}
