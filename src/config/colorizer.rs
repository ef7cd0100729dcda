//! Colorizer settings: `[colorizer.<name>]` sections
//!
//! ```toml
//! [colorizer.web]
//! type = "heroku"          # bundled format; unknown names fall back to syslog
//! [colorizer.web.colors]
//! source = 36              # ANSI foreground code per named group
//!
//! [colorizer.app]
//! pattern = '^(?<level>\w+) (?<message>.*)$'   # custom pattern instead of a type
//! ```

use super::serialization::toml_string;
use super::Config;
use crate::format::{CompiledPattern, Colorizer, LogFormat, DEFAULT_FORMAT};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Colorizer section as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileColorGroup {
    #[serde(rename = "type")]
    pub format: Option<String>,
    pub pattern: Option<String>,
    #[serde(default)]
    pub colors: HashMap<String, u8>,
}

/// What a color group matches lines with
#[derive(Debug, Clone, PartialEq)]
pub enum LineShape {
    Builtin(LogFormat),
    Custom(String),
}

impl LineShape {
    pub(super) fn to_toml_line(&self) -> String {
        match self {
            Self::Builtin(format) => format!("type = {}\n", toml_string(format.as_str())),
            Self::Custom(pattern) => format!("pattern = {}\n", toml_string(pattern)),
        }
    }
}

/// A resolved colorizer section
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGroup {
    pub shape: LineShape,
    /// Color overrides by group name
    pub colors: HashMap<String, u8>,
}

impl ColorGroup {
    /// Resolve a file section. A custom pattern wins over `type` and must compile.
    pub fn from_file(name: &str, file: FileColorGroup) -> Result<Self> {
        let shape = match (file.pattern, file.format) {
            (Some(pattern), _) => {
                CompiledPattern::new(&pattern)
                    .with_context(|| format!("Invalid pattern in [colorizer.{}]", name))?;
                LineShape::Custom(pattern)
            }
            (None, Some(format)) => LineShape::Builtin(LogFormat::from_name_or_default(&format)),
            (None, None) => LineShape::Builtin(DEFAULT_FORMAT),
        };

        Ok(Self {
            shape,
            colors: file.colors,
        })
    }

    pub fn compile(&self) -> Result<CompiledPattern, regex::Error> {
        match &self.shape {
            LineShape::Builtin(format) => format.compile(),
            LineShape::Custom(pattern) => CompiledPattern::new(pattern),
        }
    }
}

impl Config {
    /// Build the colorizer for `--color-group <name>`, or the default syslog
    /// colorizer when no group is named or the name isn't configured.
    pub fn build_colorizer(&self, group: Option<&str>) -> Result<Colorizer> {
        let selected = group.and_then(|name| {
            let found = self.colorizer.get(name);
            if found.is_none() {
                tracing::warn!("No [colorizer.{}] section, using default colors", name);
            }
            found
        });

        let colorizer = match selected {
            Some(group) => Colorizer::new(
                group.compile().context("Failed to compile colorizer pattern")?,
                group.colors.clone(),
            ),
            None => Colorizer::new(
                DEFAULT_FORMAT
                    .compile()
                    .context("Failed to compile colorizer pattern")?,
                HashMap::new(),
            ),
        };
        Ok(colorizer)
    }
}
