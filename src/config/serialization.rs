//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize the config as a commented TOML file.
    ///
    /// Unset credentials are written as commented examples so a fresh file
    /// documents every key.
    pub fn to_toml(&self) -> String {
        let mut output = format!(
            r#"# ptrail configuration
#
# Precedence: environment variables > this file > built-in defaults.
# PAPERTRAIL_API_TOKEN overrides `token`, PAPERTRAIL_API_URL overrides `api_url`.

# Credentials: a token, or a username/password pair
{token}
{username}
{password}

api_url = {api_url}
{ca_file}
verify_ssl = {verify_ssl}

# Seconds between polls with --follow
delay_secs = {delay_secs}
timeout_secs = {timeout_secs}

# Fail on unparseable --min-time/--max-time instead of searching without them
strict_time = {strict_time}

[logging]
level = {level}
file_enabled = {file_enabled}
file_dir = {file_dir}
file_rotation = {file_rotation}
file_prefix = {file_prefix}
"#,
            token = optional_key("token", self.token.as_deref(), "your-api-token"),
            username = optional_key("username", self.username.as_deref(), "you@example.com"),
            password = optional_key("password", self.password.as_deref(), "secret"),
            api_url = toml_string(&self.api_url),
            ca_file = optional_key(
                "ca_file",
                self.ca_file.as_ref().map(|p| p.display().to_string()).as_deref(),
                "/path/to/ca-bundle.crt",
            ),
            verify_ssl = self.verify_ssl,
            delay_secs = self.delay_secs,
            timeout_secs = self.timeout_secs,
            strict_time = self.strict_time,
            level = toml_string(self.logging.level.as_str()),
            file_enabled = self.logging.file_enabled,
            file_dir = toml_string(&self.logging.file_dir.display().to_string()),
            file_rotation = toml_string(self.logging.file_rotation.as_str()),
            file_prefix = toml_string(&self.logging.file_prefix),
        );

        output.push_str(&self.colorizer_to_toml());
        output
    }

    /// Serialize colorizer sections (examples when none are configured)
    pub(super) fn colorizer_to_toml(&self) -> String {
        if self.colorizer.is_empty() {
            return r#"
# Colorizer sections, selected with --color --color-group <name>
# [colorizer.web]
# type = "heroku"             # "syslog" (default) or "heroku"
# [colorizer.web.colors]
# source = 36                 # ANSI foreground code per named group
#
# [colorizer.app]
# pattern = '^(?<level>\w+) (?<message>.*)$'
"#
            .to_string();
        }

        let mut output = String::from("\n");
        // Sort keys for deterministic output
        let mut names: Vec<_> = self.colorizer.keys().collect();
        names.sort();

        for name in names {
            let group = &self.colorizer[name];
            output.push_str(&format!("[colorizer.{}]\n", name));
            output.push_str(&group.shape.to_toml_line());

            if !group.colors.is_empty() {
                output.push_str(&format!("\n[colorizer.{}.colors]\n", name));
                let mut keys: Vec<_> = group.colors.keys().collect();
                keys.sort();
                for key in keys {
                    output.push_str(&format!("{} = {}\n", key, group.colors[key]));
                }
            }
            output.push('\n');
        }
        output
    }

    /// Human-readable effective config with secrets masked
    pub fn describe(&self) -> String {
        let mask = |v: &Option<String>| match v {
            Some(_) => "\"***\"".to_string(),
            None => "(unset)".to_string(),
        };

        let mut lines = vec![
            format!("token = {}", mask(&self.token)),
            format!(
                "username = {}",
                self.username
                    .as_deref()
                    .map(toml_string)
                    .unwrap_or_else(|| "(unset)".to_string())
            ),
            format!("password = {}", mask(&self.password)),
            format!("api_url = {}", toml_string(&self.api_url)),
            format!(
                "ca_file = {}",
                self.ca_file
                    .as_ref()
                    .map(|p| toml_string(&p.display().to_string()))
                    .unwrap_or_else(|| "(unset)".to_string())
            ),
            format!("verify_ssl = {}", self.verify_ssl),
            format!("delay_secs = {}", self.delay_secs),
            format!("timeout_secs = {}", self.timeout_secs),
            format!("strict_time = {}", self.strict_time),
            String::new(),
            "[logging]".to_string(),
            format!("level = {}", toml_string(self.logging.level.as_str())),
            format!("file_enabled = {}", self.logging.file_enabled),
        ];

        let mut names: Vec<_> = self.colorizer.keys().collect();
        names.sort();
        for name in names {
            lines.push(String::new());
            lines.push(format!("[colorizer.{}]", name));
            lines.push(self.colorizer[name].shape.to_toml_line().trim_end().to_string());
        }

        lines.join("\n")
    }
}

/// A TOML string literal for `value`, escaped as the format requires
pub(super) fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn optional_key(key: &str, value: Option<&str>, example: &str) -> String {
    match value {
        Some(v) => format!("{} = {}", key, toml_string(v)),
        None => format!("# {} = \"{}\"", key, example),
    }
}
