//! Configuration tests
//!
//! The default template must always parse back, and precedence must stay
//! env > file > defaults.

use super::colorizer::LineShape;
use super::observability::LogLevel;
use super::*;
use crate::format::LogFormat;

fn no_env(_: &str) -> Option<String> {
    None
}

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// The generated template is what `config --init` writes; it must parse.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

/// Values and colorizer sections survive serialization
#[test]
fn test_config_roundtrip_with_values() {
    let mut config = Config::default();
    config.token = Some("abc123".to_string());
    config.delay_secs = 5;
    config.logging.file_rotation = LogRotation::Hourly;
    config.colorizer.insert(
        "web".to_string(),
        ColorGroup {
            shape: LineShape::Builtin(LogFormat::Heroku),
            colors: HashMap::from([("source".to_string(), 36)]),
        },
    );
    config.colorizer.insert(
        "app".to_string(),
        ColorGroup {
            shape: LineShape::Custom(r"^(?<level>\w+) (?<message>.*)$".to_string()),
            colors: HashMap::new(),
        },
    );

    let toml_str = config.to_toml();
    let file: FileConfig = toml::from_str(&toml_str).unwrap_or_else(|e| {
        panic!("Config should round-trip.\nTOML:\n{}\nError: {}", toml_str, e)
    });
    let reloaded = Config::from_parts(file, no_env).unwrap();

    assert_eq!(reloaded.token.as_deref(), Some("abc123"));
    assert_eq!(reloaded.delay_secs, 5);
    assert_eq!(reloaded.logging.file_rotation, LogRotation::Hourly);
    assert_eq!(reloaded.colorizer, config.colorizer);
}

/// Quotes, backslashes and Windows-style paths must survive the file format
#[test]
fn test_config_roundtrip_escapes_values() {
    let mut config = Config::default();
    config.password = Some(r#"pa"ss\word"#.to_string());
    config.logging.file_dir = PathBuf::from(r"C:\Users\ops\ptrail logs");
    let pattern = r"^(?<who>\w+)'s (?<message>.*)$".to_string();
    config.colorizer.insert(
        "possessive".to_string(),
        ColorGroup {
            shape: LineShape::Custom(pattern.clone()),
            colors: HashMap::new(),
        },
    );

    let toml_str = config.to_toml();
    let file: FileConfig = toml::from_str(&toml_str).unwrap_or_else(|e| {
        panic!("Config should round-trip.\nTOML:\n{}\nError: {}", toml_str, e)
    });
    let reloaded = Config::from_parts(file, no_env).unwrap();

    assert_eq!(reloaded.password, config.password);
    assert_eq!(reloaded.logging.file_dir, config.logging.file_dir);
    assert_eq!(
        reloaded.colorizer["possessive"].shape,
        LineShape::Custom(pattern)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults_when_file_empty() {
    let config = Config::from_parts(FileConfig::default(), no_env).unwrap();

    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.delay_secs, 2);
    assert!(config.verify_ssl);
    assert!(!config.strict_time);
    assert_eq!(config.ca_file, Some(PathBuf::from(SYSTEM_CA_FILE)));
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert!(!config.has_credentials());
}

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
        token = "from-file"
        api_url = "https://file.example.com/api/v1"
        "#,
    );
    let env = |key: &str| match key {
        "PAPERTRAIL_API_TOKEN" => Some("from-env".to_string()),
        "PAPERTRAIL_API_URL" => Some("https://env.example.com/api/v1".to_string()),
        _ => None,
    };

    let config = Config::from_parts(file, env).unwrap();
    assert_eq!(config.token.as_deref(), Some("from-env"));
    assert_eq!(config.api_url, "https://env.example.com/api/v1");
}

#[test]
fn test_empty_env_token_is_ignored() {
    let file = parse(r#"token = "from-file""#);
    let env = |key: &str| (key == "PAPERTRAIL_API_TOKEN").then(String::new);

    let config = Config::from_parts(file, env).unwrap();
    assert_eq!(config.token.as_deref(), Some("from-file"));
}

#[test]
fn test_basic_credentials_from_file() {
    let file = parse(
        r#"
        username = "ops@example.com"
        password = "hunter2"
        "#,
    );
    let config = Config::from_parts(file, no_env).unwrap();
    assert!(config.has_credentials());
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_logging_section() {
    let file = parse(
        r#"
        [logging]
        level = "debug"
        file_enabled = true
        file_rotation = "never"
        "#,
    );
    let config = Config::from_parts(file, no_env).unwrap();
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.logging.file_enabled);
    assert_eq!(config.logging.file_rotation, LogRotation::Never);
    assert_eq!(config.logging.file_prefix, "ptrail");
}

#[test]
fn test_unknown_log_level_is_an_error() {
    let file = parse(
        r#"
        [logging]
        level = "verbose"
        "#,
    );
    let err = Config::from_parts(file, no_env).unwrap_err();
    assert!(err.to_string().contains("verbose"));

    assert_eq!(LogLevel::parse(" WARNING ").unwrap(), LogLevel::Warn);
}

#[test]
fn test_filter_directive_follows_level() {
    let mut logging = LoggingConfig {
        level: LogLevel::Debug,
        ..LoggingConfig::default()
    };
    assert_eq!(
        logging.filter_directive(),
        "ptrail=debug,reqwest=warn,hyper_util=warn"
    );

    // Only trace opens up HTTP internals
    logging.level = LogLevel::Trace;
    assert_eq!(
        logging.filter_directive(),
        "ptrail=trace,reqwest=debug,hyper_util=debug"
    );
}

#[test]
fn test_empty_file_prefix_keeps_default() {
    let file = parse(
        r#"
        [logging]
        file_prefix = "  "
        "#,
    );
    let config = Config::from_parts(file, no_env).unwrap();
    assert_eq!(config.logging.file_prefix, "ptrail");
}

#[test]
fn test_unknown_rotation_defaults_to_daily() {
    assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
}

#[test]
fn test_colorizer_sections() {
    let file = parse(
        r#"
        [colorizer.web]
        type = "heroku"
        [colorizer.web.colors]
        dyno = 35

        [colorizer.legacy]
        type = "apache"
        "#,
    );
    let config = Config::from_parts(file, no_env).unwrap();

    let web = &config.colorizer["web"];
    assert_eq!(web.shape, LineShape::Builtin(LogFormat::Heroku));
    assert_eq!(web.colors.get("dyno"), Some(&35));

    // Unknown format names fall back to syslog
    assert_eq!(
        config.colorizer["legacy"].shape,
        LineShape::Builtin(LogFormat::Syslog)
    );
}

#[test]
fn test_invalid_custom_pattern_is_an_error() {
    let file = parse(
        r#"
        [colorizer.broken]
        pattern = '(?<unclosed'
        "#,
    );
    assert!(Config::from_parts(file, no_env).is_err());
}

#[test]
fn test_build_colorizer_selection() {
    let file = parse(
        r#"
        [colorizer.web]
        type = "heroku"
        [colorizer.web.colors]
        message = 35
        "#,
    );
    let config = Config::from_parts(file, no_env).unwrap();
    let line = "Jan 1 00:00:00 host web.1: hello";

    let web = config.build_colorizer(Some("web")).unwrap();
    assert!(web.colorize(line).ends_with("\x1b[35mhello\x1b[0m"));

    // Unknown group and no group both use syslog with the default palette
    for group in [Some("nope"), None] {
        let default = config.build_colorizer(group).unwrap();
        assert!(default.colorize(line).ends_with("\x1b[34mhello\x1b[0m"));
    }
}

#[test]
fn test_missing_file_is_empty_config() {
    let path = std::env::temp_dir().join("ptrail-test-does-not-exist.toml");
    let file = Config::read_file_config(&path).unwrap();
    assert!(file.token.is_none());
}

#[test]
fn test_invalid_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("ptrail-invalid-{}.toml", std::process::id()));
    std::fs::write(&path, "verify_ssl = maybe").unwrap();
    let result = Config::read_file_config(&path);
    let _ = std::fs::remove_file(&path);
    assert!(result.is_err());
}

#[test]
fn test_describe_masks_secrets() {
    let mut config = Config::default();
    config.token = Some("super-secret".to_string());
    config.password = Some("hunter2".to_string());

    let shown = config.describe();
    assert!(!shown.contains("super-secret"));
    assert!(!shown.contains("hunter2"));
    assert!(shown.contains("token = \"***\""));
}
