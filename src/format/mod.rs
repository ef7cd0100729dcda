// Log format registry
//
// Named-capture patterns for the line shapes we know how to color. Group
// order matters: the colorizer assigns default colors left to right in the
// order groups are declared, and `regex` reports capture names in exactly
// that order (opening-paren position), never alphabetically.

mod colorizer;

pub use colorizer::Colorizer;

use regex::Regex;

/// Format used when none is configured or the configured one is unknown
pub const DEFAULT_FORMAT: LogFormat = LogFormat::Syslog;

const SYSLOG: &str = r"(?x)^
    (?<datetime>[A-Z][a-z]+\s+[0-9]{1,2}\s+[0-9]{2}:[0-9]{2}:[0-9]{2})
    \s+
    (?<source>[^\s]+)
    \s+
    (?<process>[^:]+:)
    \s+
    (?<message>.*)
    $";

const HEROKU: &str = r"(?x)^
    (?<datetime>[A-Z][a-z]+\s+[0-9]{1,2}\s+[0-9]{2}:[0-9]{2}:[0-9]{2})
    \s+
    (?<source>[^\s]+)
    \s+
    (?<dyno>[^:]+:)
    \s+
    (?<message>.*)
    $";

/// Bundled log formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `<datetime> <source> <process>: <message>`
    Syslog,
    /// Same shape, but the third field is a platform dyno name
    Heroku,
}

impl LogFormat {
    pub const ALL: [LogFormat; 2] = [LogFormat::Syslog, LogFormat::Heroku];

    /// Look up a format by identifier (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "syslog" => Some(Self::Syslog),
            "heroku" => Some(Self::Heroku),
            _ => None,
        }
    }

    /// Look up a format, falling back to [`DEFAULT_FORMAT`] for unknown names
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(LogFormat::as_str).collect();
            tracing::warn!(
                "Unknown log format {:?} (known: {}), using {}",
                name,
                known.join(", "),
                DEFAULT_FORMAT.as_str()
            );
            DEFAULT_FORMAT
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syslog => "syslog",
            Self::Heroku => "heroku",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::Syslog => SYSLOG,
            Self::Heroku => HEROKU,
        }
    }

    pub fn compile(&self) -> Result<CompiledPattern, regex::Error> {
        CompiledPattern::new(self.source())
    }
}

/// A matcher plus its named groups in declaration order
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    names: Vec<String>,
}

impl CompiledPattern {
    /// Compile a pattern. Unnamed groups are ignored for coloring.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let names = regex.capture_names().flatten().map(String::from).collect();
        Ok(Self { regex, names })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Named groups, left to right
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
