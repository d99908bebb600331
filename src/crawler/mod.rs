//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and exponential backoff
//! - The page-source seam between the crawl loop and the network
//! - Overall crawl coordination across result pages and detail pages

mod coordinator;
mod fetcher;

pub use coordinator::{run_crawl, Coordinator, CrawlOutput};
pub use fetcher::{
    backoff_delay, build_http_client, retry_with_backoff, FetchFailure, FetchResult, HttpFetcher,
    Page, PageSource, ACCEPT_LANGUAGE_VALUE, USER_AGENT,
};

use crate::config::Settings;
use crate::output::CrawlStats;
use crate::ScrapeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the shared HTTP client
/// 2. Fetch search-result pages until a stop condition is met
/// 3. Extract company or product cards from every page
/// 4. Fetch and attach company detail pages when enabled
///
/// # Arguments
///
/// * `settings` - Effective settings with a resolved query
///
/// # Returns
///
/// * `Ok((CrawlOutput, CrawlStats))` - Accumulated records and run statistics
/// * `Err(ScrapeError)` - The crawl could not be set up
pub async fn crawl(settings: Settings) -> Result<(CrawlOutput, CrawlStats), ScrapeError> {
    run_crawl(settings).await
}
