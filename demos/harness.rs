//! Command-line front end for the counter race harness.
//!
//! Run with:
//! ```bash
//! cargo run --release --example harness --features demo -- --threads 8 --iterations 1000000
//! ```
//!
//! If `--threads` or `--iterations` is missing or invalid, both fall back to
//! `threads=3, iterations=1000000` and a warning is printed on stderr, also
//! under `--quiet`.

use std::io;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ordini::config::RunConfig;
use ordini::coordinator::Coordinator;
use ordini::discipline::Discipline;
use ordini::error::ConfigError;
use ordini::observers::json::JsonObserver;
use ordini::observers::table::{TableObserver, TableStyle};
use ordini::sink::{ConsoleFormat, ConsoleSink};
use tracing_subscriber::EnvFilter;

/// Output format for snapshots and the final report.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One row per counter
    Table,
    /// All counters on a few lines
    Compact,
    /// One JSON document per line
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

/// Increment shared counters from many threads under different
/// synchronization disciplines and compare the totals.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workers per discipline
    #[arg(long)]
    threads: Option<String>,

    /// Increments per worker
    #[arg(long)]
    iterations: Option<String>,

    /// Yield the processor after every increment
    #[arg(long)]
    yield_now: bool,

    /// Sampling period in milliseconds
    #[arg(long, default_value_t = 200)]
    period_ms: u64,

    /// Disciplines to run (repeatable; default: all)
    #[arg(short, long = "discipline", value_parser = parse_discipline)]
    disciplines: Vec<Discipline>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table/compact formats)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors and the configuration fallback warning
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_discipline(s: &str) -> Result<Discipline, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

/// Log filter for the verbosity flags.
///
/// The default-configuration fallback warning stays visible in quiet mode.
fn log_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error,ordini::config=warn"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(verbose, quiet)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Returns the run configuration and the error that triggered the default
/// fallback, if any.
fn build_config(args: &Args) -> (RunConfig, Option<ConfigError>) {
    let (config, fallback) =
        RunConfig::resolve(args.threads.as_deref(), args.iterations.as_deref());
    let config = config
        .with_yield_now(args.yield_now)
        .with_sample_period(Duration::from_millis(args.period_ms.max(1)));

    if args.disciplines.is_empty() {
        return (config, fallback);
    }
    match config.clone().with_disciplines(&args.disciplines) {
        Ok(selected) => (selected, fallback),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring discipline selection");
            (config, fallback)
        }
    }
}

fn console_format(args: &Args) -> ConsoleFormat {
    match args.format {
        OutputFormat::Table => {
            ConsoleFormat::Table(TableObserver::new().with_style(args.style.into()))
        }
        OutputFormat::Compact => ConsoleFormat::Table(
            TableObserver::new()
                .compact(true)
                .columns(3)
                .with_style(args.style.into()),
        ),
        OutputFormat::Json => ConsoleFormat::Json(JsonObserver::new()),
    }
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let (config, fallback) = build_config(&args);
    if let Some(err) = &fallback {
        eprintln!("Using default threads/iterations: {err}");
    }
    eprintln!(
        "Running {} threads x {} iterations per discipline ({} workers)...",
        config.threads(),
        config.iterations(),
        config.worker_count()
    );

    let sink = ConsoleSink::new(io::stdout(), console_format(&args));
    let report = Coordinator::new(config).run(&sink);

    if !report.is_consistent() {
        eprintln!("warning: an exact discipline lost updates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_filter_keeps_config_fallback() {
        let filter = log_filter(false, true);
        assert!(EnvFilter::try_new(filter).is_ok());
        assert!(filter.contains("ordini::config=warn"));
        assert!(filter.starts_with("error"));
    }

    #[test]
    fn test_filters_parse() {
        for (verbose, quiet) in [(false, false), (true, false), (false, true)] {
            assert!(EnvFilter::try_new(log_filter(verbose, quiet)).is_ok());
        }
    }

    #[test]
    fn test_build_config_falls_back_when_flag_missing() {
        let args = Args::parse_from(["harness", "-q", "--threads", "8"]);
        let (config, fallback) = build_config(&args);
        assert_eq!(config.threads(), 3);
        assert_eq!(config.iterations(), 1_000_000);
        assert!(matches!(
            fallback,
            Some(ConfigError::Missing { flag: "iterations" })
        ));
    }

    #[test]
    fn test_build_config_with_disciplines() {
        let args = Args::parse_from([
            "harness",
            "--threads",
            "2",
            "--iterations",
            "10",
            "-d",
            "mutex",
            "--period-ms",
            "5",
        ]);
        let (config, fallback) = build_config(&args);
        assert!(fallback.is_none());
        assert_eq!(config.expected(), 20);
        assert_eq!(config.disciplines(), &[Discipline::Mutex]);
        assert_eq!(config.sample_period(), Duration::from_millis(5));
    }
}
