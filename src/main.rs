// ptrail - search and tail logs on a hosted log service
//
// Architecture:
// - API client (reqwest, blocking): authenticated calls against the REST API
// - Search: one-request pagination engine plus three retrieval strategies
//   (single page, follow, time-range scan)
// - Format/colorizer: named-capture patterns that color rendered lines
// - Output: text or raw JSON on stdout; diagnostics go to stderr via tracing

mod api;
mod cli;
mod commands;
mod config;
mod format;
mod logging;
mod output;
mod search;
mod timespec;

use anyhow::{bail, Context, Result};
use api::{Client, ClientSettings, ListingKind};
use clap::Parser;
use cli::{Cli, Commands, SearchMode};
use config::Config;
use output::{OutputMode, Renderer};
use search::{QueryBounds, TimeRange};
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the file is broken
    if let Some(Commands::Config { show, path, init }) = &cli.command {
        return cli::handle_config(cli.configfile.as_deref(), *show, *path, *init);
    }

    let config = Config::load(cli.configfile.as_deref())?;

    // The guard must be kept alive for the duration of the program to ensure logs flush
    let _log_guard = logging::init(&config.logging);

    let result = match &cli.command {
        Some(command) => run_command(&config, command),
        None => run_search(&cli, &config),
    };

    // A closed pipe (e.g. `| head`) is a normal way for output to end
    match result {
        Err(e) if is_broken_pipe(&e) => Ok(()),
        other => other,
    }
}

fn build_client(config: &Config) -> Result<Client> {
    if !config.has_credentials() {
        bail!(
            "No credentials configured. Set PAPERTRAIL_API_TOKEN, or add `token` \
             (or `username` and `password`) to the config file; \
             `ptrail config --init` writes a template"
        );
    }
    let settings = ClientSettings::from_config(config)?;
    Ok(Client::new(settings)?)
}

fn run_command(config: &Config, command: &Commands) -> Result<()> {
    let client = build_client(config)?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::ListSystems { json } => {
            commands::list(&client, ListingKind::Systems, *json, &mut stdout)
        }
        Commands::ListGroups { json } => {
            commands::list(&client, ListingKind::Groups, *json, &mut stdout)
        }
        Commands::ListSearches { json } => {
            commands::list(&client, ListingKind::Searches, *json, &mut stdout)
        }
        Commands::AddGroup { group, wildcard } => {
            commands::add_group(&client, group, wildcard.as_deref())
        }
        Commands::RemoveSystem { system } => commands::remove_system(&client, system),
        // Handled before config is loaded
        Commands::Config { .. } => Ok(()),
    }
}

fn run_search(cli: &Cli, config: &Config) -> Result<()> {
    let client = build_client(config)?;

    // Names resolve to ids once, before the first page
    let system_id = cli
        .system
        .as_deref()
        .map(|name| client.resolve_id(ListingKind::Systems, name))
        .transpose()?;
    let group_id = cli
        .group
        .as_deref()
        .map(|name| client.resolve_id(ListingKind::Groups, name))
        .transpose()?;
    let scope = QueryBounds::scoped(system_id, group_id);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let colorizer = if cli.color && mode == OutputMode::Text {
        Some(config.build_colorizer(cli.color_group.as_deref())?)
    } else {
        None
    };
    let mut renderer = Renderer::new(std::io::stdout().lock(), mode, colorizer);

    let query = cli.query_string();
    tracing::debug!("Searching {:?} (system: {:?}, group: {:?})", query, system_id, group_id);

    match cli.search_mode() {
        SearchMode::Follow => {
            let delay = Duration::from_secs(cli.delay.unwrap_or(config.delay_secs));
            search::follow(&client, &query, &scope, &mut renderer, delay, std::thread::sleep)
        }
        SearchMode::TimeRange => {
            let range = time_range(cli, config)?;
            let summary = search::scan_time_range(&client, &query, &scope, range, &mut renderer)?;
            tracing::debug!(
                "Scan finished after {} pages, {} events ({:?})",
                summary.pages,
                summary.events,
                summary.stop
            );
            Ok(())
        }
        SearchMode::Once => search::run_once(&client, &query, &scope, &mut renderer),
    }
}

/// Resolve `--min-time`/`--max-time` against the local clock
fn time_range(cli: &Cli, config: &Config) -> Result<TimeRange> {
    let now = chrono::Local::now();
    let bound = |flag: &str, input: Option<&str>| match input {
        Some(input) => timespec::resolve_bound(flag, input, &now, config.strict_time),
        None => Ok(None),
    };

    Ok(TimeRange {
        min: bound("--min-time", cli.min_time.as_deref()).context("Invalid time range")?,
        max: bound("--max-time", cli.max_time.as_deref()).context("Invalid time range")?,
    })
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
    })
}
