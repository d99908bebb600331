//! WLW scraper main entry point
//!
//! This is the command-line interface for the marketplace scraper.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wlw_scraper::config::{resolve_settings, Overrides, SearchMode, Settings};
use wlw_scraper::crawler::{crawl, CrawlOutput};
use wlw_scraper::output::{export_to_json, log_statistics};
use wlw_scraper::ConfigError;

/// Wer liefert was B2B marketplace scraper
///
/// Crawls company or product search results, optionally enriches companies
/// with their profile pages, and exports the records as JSON.
#[derive(Parser, Debug)]
#[command(name = "wlw-scraper")]
#[command(version)]
#[command(about = "Wer liefert was B2B marketplace scraper", long_about = None)]
struct Cli {
    /// Search query (e.g. 'Aufzüge', 'Metallbau'); falls back to the input file
    #[arg(short, long)]
    query: Option<String>,

    /// Search mode
    #[arg(short, long, value_enum)]
    mode: Option<SearchMode>,

    /// Region code such as DE, AT, CH, BE, LU
    #[arg(short, long)]
    region: Option<String>,

    /// Language code such as 'de' or 'en'
    #[arg(short, long)]
    language: Option<String>,

    /// Maximum number of pages to crawl (0 means unlimited)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Skip detailed company profile extraction
    #[arg(long)]
    no_details: bool,

    /// Path to JSON settings file
    #[arg(long, default_value = "config/settings.json")]
    config: PathBuf,

    /// Override output JSON file path
    #[arg(short, long)]
    output: Option<String>,

    /// Optional JSON file with default query and options
    #[arg(short, long, default_value = "data/sample_input.json")]
    input: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            query: self.query.clone(),
            mode: self.mode,
            region: self.region.clone(),
            language: self.language.clone(),
            max_pages: self.max_pages,
            no_details: self.no_details,
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let settings = match resolve_settings(&cli.config, &cli.input, &cli.overrides()) {
        Ok(settings) => settings,
        Err(ConfigError::MissingQuery) => {
            tracing::error!(
                "No search query provided. Use --query or set 'query' in {}.",
                cli.input.display()
            );
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Scraping failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wlw_scraper=info,warn"),
            1 => EnvFilter::new("wlw_scraper=debug,info"),
            2 => EnvFilter::new("wlw_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Crawls with the effective settings and exports the records
async fn run(settings: Settings) -> anyhow::Result<()> {
    let output_path = settings.output_path();
    let max_pages = match settings.max_pages {
        0 => "unlimited".to_string(),
        n => n.to_string(),
    };

    tracing::info!(
        "Starting WLW scraper | mode={} | query={} | region={} | language={} | max_pages={}",
        settings.mode,
        settings.query.as_deref().unwrap_or_default(),
        settings.region,
        settings.language,
        max_pages
    );

    let (output, stats) = crawl(settings).await.context("crawl setup failed")?;
    tracing::info!("Scraping completed. Total records: {}", output.len());

    match &output {
        CrawlOutput::Companies(records) => export_to_json(records, &output_path),
        CrawlOutput::Products(records) => export_to_json(records, &output_path),
    }
    .with_context(|| format!("failed to export to {}", output_path.display()))?;

    let shown = std::fs::canonicalize(&output_path).unwrap_or_else(|_| output_path.clone());
    tracing::info!("Results exported to {}", shown.display());
    log_statistics(&stats);

    Ok(())
}
