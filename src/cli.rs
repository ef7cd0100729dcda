// CLI module - command-line argument parsing and config handlers
//
// Without a subcommand the positional words form a search query. The
// subcommands cover the one-shot management calls and config inspection:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --init: Write a commented default config file

use crate::config::{Config, VERSION};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Search and tail logs on a hosted log service
#[derive(Parser, Debug)]
#[command(name = "ptrail")]
#[command(version = VERSION)]
#[command(about = "Search and tail hosted logs", long_about = None)]
pub struct Cli {
    /// Search query; words are joined with spaces
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Keep polling for new events
    #[arg(short, long)]
    pub follow: bool,

    /// Seconds between polls with --follow
    #[arg(short, long, value_name = "SECS")]
    pub delay: Option<u64>,

    /// Print raw JSON instead of log lines
    #[arg(short, long)]
    pub json: bool,

    /// Restrict to one system
    #[arg(short, long, value_name = "NAME")]
    pub system: Option<String>,

    /// Restrict to one group
    #[arg(short, long, value_name = "NAME")]
    pub group: Option<String>,

    /// Earliest time to search from (e.g. "2 hours ago", "yesterday at 4pm")
    #[arg(long, value_name = "TIME")]
    pub min_time: Option<String>,

    /// Latest time to search to
    #[arg(long, value_name = "TIME")]
    pub max_time: Option<String>,

    /// Colorize log lines
    #[arg(long)]
    pub color: bool,

    /// Colorizer section from the config file
    #[arg(long, value_name = "NAME")]
    pub color_group: Option<String>,

    /// Config file to use instead of the default one
    #[arg(short = 'c', long, value_name = "PATH", global = true)]
    pub configfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The search query, or an empty string to match everything
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List systems
    ListSystems {
        /// Print the raw JSON listing
        #[arg(short, long)]
        json: bool,
    },

    /// List groups
    ListGroups {
        /// Print the raw JSON listing
        #[arg(short, long)]
        json: bool,
    },

    /// List saved searches
    ListSearches {
        /// Print the raw JSON listing
        #[arg(short, long)]
        json: bool,
    },

    /// Create a group unless one with that name already exists
    AddGroup {
        /// Group name
        #[arg(short, long)]
        group: String,

        /// Wildcard selecting the systems in the group
        #[arg(short, long)]
        wildcard: Option<String>,
    },

    /// Remove a system
    RemoveSystem {
        /// System name
        #[arg(short, long)]
        system: String,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write a commented default config file
        #[arg(long)]
        init: bool,
    },
}

/// Config file this run reads: `--configfile` if given, else the default lookup
pub fn effective_config_path(configfile: Option<&Path>) -> Option<PathBuf> {
    configfile.map(Path::to_path_buf).or_else(Config::config_path)
}

/// Handle `config` flags
pub fn handle_config(
    configfile: Option<&Path>,
    show: bool,
    path: bool,
    init: bool,
) -> Result<()> {
    if path {
        handle_config_path(configfile)
    } else if show {
        handle_config_show(configfile)
    } else if init {
        handle_config_init(configfile)
    } else {
        // No flag provided, show help
        println!("Usage: ptrail config [--show|--path|--init]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --path    Show config file path");
        println!("  --init    Write a commented default config file");
        Ok(())
    }
}

fn handle_config_path(configfile: Option<&Path>) -> Result<()> {
    let path = effective_config_path(configfile).context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show(configfile: Option<&Path>) -> Result<()> {
    let config = Config::load(configfile)?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("{}", config.describe());

    // Show source info
    println!();
    match effective_config_path(configfile) {
        Some(path) if path.exists() => println!("# Source: {}", path.display()),
        _ => println!("# Source: defaults (no config file)"),
    }
    Ok(())
}

fn handle_config_init(configfile: Option<&Path>) -> Result<()> {
    let path = match configfile {
        Some(p) => p.to_path_buf(),
        None => Config::home_config_path().context("Could not determine config path")?,
    };

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    // Config's single source of truth for the file format
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config written: {}", path.display());
    Ok(())
}

/// Which retrieval strategy a search invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Follow,
    TimeRange,
    Once,
}

impl Cli {
    /// `--follow` wins, then `--min-time`; anything else is a single page
    pub fn search_mode(&self) -> SearchMode {
        if self.follow {
            if self.min_time.is_some() || self.max_time.is_some() {
                tracing::warn!("--min-time/--max-time are ignored with --follow");
            }
            SearchMode::Follow
        } else if self.min_time.is_some() {
            SearchMode::TimeRange
        } else {
            if self.max_time.is_some() {
                tracing::warn!("--max-time is ignored without --min-time");
            }
            SearchMode::Once
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ptrail").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_query_words_are_joined() {
        let cli = parse(&["-s", "web-1", "status=500", "GET"]);
        assert_eq!(cli.query_string(), "status=500 GET");
        assert_eq!(cli.system.as_deref(), Some("web-1"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_empty_query() {
        let cli = parse(&["-f"]);
        assert_eq!(cli.query_string(), "");
        assert!(cli.follow);
    }

    #[test]
    fn test_time_flags() {
        let cli = parse(&["--min-time", "2 hours ago", "--max-time", "1 hour ago", "error"]);
        assert_eq!(cli.min_time.as_deref(), Some("2 hours ago"));
        assert_eq!(cli.max_time.as_deref(), Some("1 hour ago"));
        assert_eq!(cli.query_string(), "error");
    }

    #[test]
    fn test_subcommands() {
        let cli = parse(&["list-groups", "-j"]);
        assert!(matches!(cli.command, Some(Commands::ListGroups { json: true })));

        let cli = parse(&["add-group", "-g", "web", "-w", "web-*"]);
        match cli.command {
            Some(Commands::AddGroup { group, wildcard }) => {
                assert_eq!(group, "web");
                assert_eq!(wildcard.as_deref(), Some("web-*"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_configfile_is_global() {
        let cli = parse(&["config", "--show", "-c", "/tmp/ptrail.toml"]);
        assert_eq!(cli.configfile, Some(PathBuf::from("/tmp/ptrail.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Config { show: true, .. })
        ));
    }

    #[test]
    fn test_search_mode_selection() {
        assert_eq!(parse(&["error"]).search_mode(), SearchMode::Once);
        assert_eq!(parse(&["-f", "error"]).search_mode(), SearchMode::Follow);
        assert_eq!(
            parse(&["--min-time", "1 hour ago"]).search_mode(),
            SearchMode::TimeRange
        );
        // Follow takes precedence over a time range
        assert_eq!(
            parse(&["-f", "--min-time", "1 hour ago"]).search_mode(),
            SearchMode::Follow
        );
        assert_eq!(
            parse(&["--max-time", "1 hour ago"]).search_mode(),
            SearchMode::Once
        );
    }

    #[test]
    fn test_explicit_configfile_wins() {
        let path = effective_config_path(Some(Path::new("/tmp/other.toml")));
        assert_eq!(path, Some(PathBuf::from("/tmp/other.toml")));
    }
}
