//! Lexicrawl main entry point
//!
//! Command-line interface for the bounded parallel word-count crawler.

use anyhow::Context;
use clap::Parser;
use lexicrawl::config::load_config;
use lexicrawl::crawler::{CrawlEngine, CrawlParameters, HttpFetcher};
use lexicrawl::output::{write_result, write_result_to_path};
use lexicrawl::profiler::{Profiler, TimedFetcher};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Lexicrawl: a bounded parallel word-count crawler
///
/// Crawls the web from a configured set of start pages, following links up
/// to a maximum depth until a time budget runs out, and reports the most
/// popular words across every page it visited.
#[derive(Parser, Debug)]
#[command(name = "lexicrawl")]
#[command(version)]
#[command(about = "A bounded parallel word-count crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    let params = CrawlParameters::from_config(&config).context("Invalid crawl parameters")?;
    tracing::info!(
        "Crawling {} start pages (max depth {}, timeout {:?}, parallelism {})",
        params.start_pages.len(),
        params.max_depth,
        params.timeout,
        params.parallelism
    );

    // Build the fetcher and wrap it so every fetch call is timed
    let profiler = Profiler::new();
    let fetcher = TimedFetcher::new(
        HttpFetcher::new().context("Failed to build HTTP client")?,
        profiler.state(),
    );

    // Run the crawl
    let engine = CrawlEngine::new(fetcher, &params)?;
    let result = engine.crawl(&params.start_pages).await;

    tracing::info!(
        "Visited {} URLs, keeping {} words",
        result.urls_visited,
        result.word_counts.len()
    );

    // Write the crawl result
    if config.output.result_path.is_empty() {
        let mut stdout = std::io::stdout();
        write_result(&result, &mut stdout)?;
    } else {
        let path = Path::new(&config.output.result_path);
        write_result_to_path(&result, path)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
        tracing::info!("Result written to {}", path.display());
    }

    // Write the profiling report
    if config.output.profile_path.is_empty() {
        let mut stdout = std::io::stdout();
        profiler.write_report(&mut stdout)?;
    } else {
        let path = Path::new(&config.output.profile_path);
        profiler
            .write_report_to_path(path)
            .with_context(|| format!("Failed to write profile data to {}", path.display()))?;
        tracing::info!("Profile data written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicrawl=info,warn"),
            1 => EnvFilter::new("lexicrawl=debug,info"),
            2 => EnvFilter::new("lexicrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
