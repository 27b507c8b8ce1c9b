mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::ensure;
use clap::Parser;
use digger_core::{Msg, Source};
use digger_logging::{digger_info, LogDestination};
use log::LevelFilter;

use platform::{load_config, DiggerConfig, SessionOptions, DEFAULT_CONFIG_FILENAME};

/// Search DJ mixes (mixesdb) and the Discogs catalog through a digger backend.
///
/// With a query, --artist or --label the search runs once and the exit status
/// tells whether it succeeded. Without one an interactive session reads
/// searches and commands from stdin.
#[derive(Debug, Parser)]
#[command(name = "digger", version, about)]
struct Cli {
    /// Search term
    query: Option<String>,

    /// RON config file [default: ./digger.ron when present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Source to search: discogs or mixesdb
    #[arg(long)]
    source: Option<Source>,

    /// List the releases of a Discogs artist
    #[arg(long, conflicts_with_all = ["query", "label"])]
    artist: Option<String>,

    /// List the releases of a Discogs label
    #[arg(long, conflicts_with_all = ["query", "artist"])]
    label: Option<String>,

    /// Write the results of a one-shot search to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print YouTube links instead of opening a browser
    #[arg(long)]
    no_browser: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("digger: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => load_config(path, true)?,
        None => load_config(&PathBuf::from(DEFAULT_CONFIG_FILENAME), false)?,
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    init_logging(&config, cli.verbose);
    digger_info!("digger starting; backend {}", config.base_url);

    let source = cli.source.unwrap_or(config.default_source);
    ensure!(
        Source::selectable().contains(&source),
        "source {source} cannot be searched directly (use discogs or mixesdb)"
    );

    let options = SessionOptions {
        export: cli.export,
        open_browser: !cli.no_browser,
    };
    let mut initial = vec![Msg::SourceSelected(source)];

    if let Some(artist_id) = cli.artist {
        initial.push(Msg::ViewArtistReleases { artist_id });
    } else if let Some(label_id) = cli.label {
        initial.push(Msg::ViewLabelReleases { label_id });
    } else if let Some(query) = cli.query {
        initial.push(Msg::QueryChanged(query));
        initial.push(Msg::SearchSubmitted);
    } else {
        ensure!(
            options.export.is_none(),
            "--export needs a query, --artist or --label"
        );
        platform::run_interactive(&config, initial, options)?;
        return Ok(true);
    }

    platform::run_once(&config, initial, options)
}

/// Logs go to the configured file. Without one, only warnings reach the
/// terminal unless `--verbose` is set.
fn init_logging(config: &DiggerConfig, verbose: bool) {
    let (destination, level) = match (&config.log_file, verbose) {
        (Some(path), false) => (LogDestination::File(path.clone()), LevelFilter::Info),
        (Some(path), true) => (LogDestination::Both(path.clone()), LevelFilter::Debug),
        (None, false) => (LogDestination::Terminal, LevelFilter::Warn),
        (None, true) => (LogDestination::Terminal, LevelFilter::Debug),
    };
    digger_logging::initialize(destination, level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn artist_and_query_conflict() {
        let result = Cli::try_parse_from(["digger", "--artist", "42", "Ben UFO"]);
        assert!(result.is_err());
    }

    #[test]
    fn source_is_parsed_from_its_form_value() {
        let cli = Cli::try_parse_from(["digger", "--source", "discogs", "Pangaea"]).unwrap();
        assert_eq!(cli.source, Some(Source::Discogs));
        assert_eq!(cli.query.as_deref(), Some("Pangaea"));
        assert!(Cli::try_parse_from(["digger", "--source", "bandcamp"]).is_err());
    }
}
