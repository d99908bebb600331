//! WLW scraper: company and product records from a B2B marketplace
//!
//! This crate crawls paginated search results of a "Wer liefert was"-style
//! marketplace, extracts company and product records from loosely structured
//! HTML through data-driven selector chains, optionally enriches companies with
//! their detail pages, and exports the accumulated records as JSON.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for {field}")]
    InvalidSelector { field: String, selector: String },

    #[error("No search query provided. Use --query or set 'query' in the input file.")]
    MissingQuery,
}

// Re-export commonly used types
pub use config::{SearchMode, Settings};
pub use crawler::{Coordinator, CrawlOutput, FetchResult, HttpFetcher, PageSource};
pub use extract::{normalize_whitespace, CompanyDetails, CompanySummary, ProductSummary};
pub use crate::url::build_search_url;
