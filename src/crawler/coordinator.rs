//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the page loop that coordinates the crawl:
//! - Building each search-results URL
//! - Fetching and extracting cards page by page
//! - Fetching company detail pages and attaching them in card order
//! - Deciding when to stop
//!
//! Termination is checked in this order on every page: the page could not be
//! fetched, the page had no cards, the configured page limit was reached.
//! Records from every processed page are kept in page-then-card order.

use crate::config::{SearchMode, Settings};
use crate::crawler::fetcher::{FetchResult, HttpFetcher, PageSource};
use crate::extract::{CompanyDetails, CompanyExtractor, CompanySummary, ProductExtractor, ProductSummary};
use crate::output::{CrawlStats, Termination};
use crate::url::build_search_url;
use crate::{ConfigError, ScrapeError};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::Instrument;
use url::Url;

/// Records accumulated by one crawl
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CrawlOutput {
    Companies(Vec<CompanySummary>),
    Products(Vec<ProductSummary>),
}

impl CrawlOutput {
    /// Number of accumulated records
    pub fn len(&self) -> usize {
        match self {
            Self::Companies(records) => records.len(),
            Self::Products(records) => records.len(),
        }
    }

    /// Returns true if nothing was accumulated
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one detail-page fetch
enum DetailOutcome {
    NoLink,
    Attached(CompanyDetails),
    Failed,
}

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    source: S,
    settings: Settings,
    query: String,
    base_url: Url,
    companies: CompanyExtractor,
    products: ProductExtractor,
    stats: CrawlStats,
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `settings` - Effective settings; the query must be resolved
    /// * `source` - Where pages come from
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(ScrapeError)` - Missing query, bad base URL or bad selector
    pub fn new(settings: Settings, source: S) -> Result<Self, ScrapeError> {
        let query = settings
            .query
            .clone()
            .filter(|q| !q.trim().is_empty())
            .ok_or(ConfigError::MissingQuery)?;
        let base_url = Url::parse(&settings.base_url)?;
        let companies = CompanyExtractor::new(&settings.selectors)?;
        let products = ProductExtractor::new(&settings.selectors)?;

        Ok(Self {
            source,
            settings,
            query,
            base_url,
            companies,
            products,
            stats: CrawlStats::default(),
        })
    }

    /// Statistics of the last run
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Runs the crawl for the configured mode
    pub async fn run(&mut self) -> Result<CrawlOutput, ScrapeError> {
        let span = tracing::info_span!(
            "crawl",
            mode = %self.settings.mode,
            query = %self.query
        );

        match self.settings.mode {
            SearchMode::Company => {
                let records = self.crawl_companies().instrument(span).await?;
                Ok(CrawlOutput::Companies(records))
            }
            SearchMode::Product => {
                let records = self.crawl_products().instrument(span).await?;
                Ok(CrawlOutput::Products(records))
            }
        }
    }

    /// Crawls company search results, attaching detail pages when enabled
    pub async fn crawl_companies(&mut self) -> Result<Vec<CompanySummary>, ScrapeError> {
        self.stats = CrawlStats::default();
        let mut all_companies = Vec::new();
        let mut page = 1;

        loop {
            let Some(html) = self.fetch_search_page(SearchMode::Company, page).await? else {
                break;
            };

            let mut companies_on_page = self.companies.parse_company_list(&html, &self.base_url);
            if companies_on_page.is_empty() {
                tracing::info!("No more companies found on page {}, stopping.", page);
                self.stats.termination = Some(Termination::EmptyPage { page });
                break;
            }

            if self.settings.include_company_details {
                self.attach_details(&mut companies_on_page).await;
            }

            all_companies.extend(companies_on_page);
            self.stats.records = all_companies.len();
            tracing::info!("Accumulated {} company records so far.", all_companies.len());

            if self.page_limit_reached(page) {
                break;
            }
            page += 1;
        }

        Ok(all_companies)
    }

    /// Crawls product search results
    pub async fn crawl_products(&mut self) -> Result<Vec<ProductSummary>, ScrapeError> {
        self.stats = CrawlStats::default();
        let mut all_products = Vec::new();
        let mut page = 1;

        loop {
            let Some(html) = self.fetch_search_page(SearchMode::Product, page).await? else {
                break;
            };

            let products_on_page = self.products.parse_product_list(&html, &self.base_url);
            if products_on_page.is_empty() {
                tracing::info!("No more products found on page {}, stopping.", page);
                self.stats.termination = Some(Termination::EmptyPage { page });
                break;
            }

            all_products.extend(products_on_page);
            self.stats.records = all_products.len();
            tracing::info!("Accumulated {} product records so far.", all_products.len());

            if self.page_limit_reached(page) {
                break;
            }
            page += 1;
        }

        Ok(all_products)
    }

    /// Fetches one search-results page, or None once the crawl must stop
    async fn fetch_search_page(
        &mut self,
        mode: SearchMode,
        page: u32,
    ) -> Result<Option<String>, ScrapeError> {
        let settings = &self.settings;
        let search_url = build_search_url(
            &settings.base_url,
            &self.query,
            mode,
            &settings.region,
            &settings.language,
            page,
        )?;
        tracing::info!("Fetching {} search results page {}: {}", mode, page, search_url);

        match self.source.fetch(search_url.as_str()).await {
            FetchResult::Success { body, .. } => {
                self.stats.pages_fetched += 1;
                Ok(Some(body))
            }
            FetchResult::Failed { reason, attempts } => {
                tracing::info!(
                    "No response for page {} after {} attempt(s) ({}), stopping.",
                    page,
                    attempts,
                    reason
                );
                self.stats.termination = Some(Termination::FetchFailed { page });
                Ok(None)
            }
        }
    }

    /// Fetches detail pages for every summary with a details URL
    ///
    /// Up to `detail_concurrency` fetches are in flight; results are attached
    /// in card order. A failed detail page leaves `details` empty.
    async fn attach_details(&mut self, companies: &mut [CompanySummary]) {
        let source = &self.source;
        let extractor = &self.companies;
        let concurrency = self.settings.detail_concurrency.max(1);

        let outcomes: Vec<DetailOutcome> = stream::iter(companies.iter())
            .map(|company| async move {
                let Some(details_url) = company.details_url.as_deref() else {
                    return DetailOutcome::NoLink;
                };

                tracing::info!("Fetching company details: {}", details_url);
                match source.fetch(details_url).await {
                    FetchResult::Success { body, .. } => DetailOutcome::Attached(
                        extractor.parse_company_details(&body, company.company_id.as_deref()),
                    ),
                    FetchResult::Failed { reason, .. } => {
                        tracing::warn!("No details HTML for {}: {}", details_url, reason);
                        DetailOutcome::Failed
                    }
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        for (company, outcome) in companies.iter_mut().zip(outcomes) {
            match outcome {
                DetailOutcome::Attached(details) => {
                    company.details = Some(details);
                    self.stats.details_fetched += 1;
                }
                DetailOutcome::Failed => self.stats.details_failed += 1,
                DetailOutcome::NoLink => {}
            }
        }
    }

    fn page_limit_reached(&mut self, page: u32) -> bool {
        let max_pages = self.settings.max_pages;
        if max_pages > 0 && page >= max_pages {
            tracing::info!("Reached max_pages={}, stopping.", max_pages);
            self.stats.termination = Some(Termination::MaxPages { page });
            true
        } else {
            false
        }
    }
}

/// Runs a complete crawl over HTTP
///
/// Builds the shared HTTP client from the retry policy, crawls the configured
/// mode and returns the records together with the run statistics.
pub async fn run_crawl(settings: Settings) -> Result<(CrawlOutput, CrawlStats), ScrapeError> {
    let fetcher = HttpFetcher::new(settings.retry.clone())?;
    let mut coordinator = Coordinator::new(settings, fetcher)?;
    let output = coordinator.run().await?;
    Ok((output, coordinator.stats().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchFailure;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://www.wlw.de";

    /// In-memory page source that records every request
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), body.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageSource for FakeSource {
        async fn fetch(&self, url: &str) -> FetchResult {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(body) if !body.is_empty() => FetchResult::Success {
                    final_url: url.to_string(),
                    status_code: 200,
                    body: body.clone(),
                },
                Some(_) => FetchResult::Failed {
                    reason: FetchFailure::EmptyBody,
                    attempts: 1,
                },
                None => FetchResult::Failed {
                    reason: FetchFailure::HttpStatus(404),
                    attempts: 4,
                },
            }
        }
    }

    fn settings(mode: SearchMode, max_pages: u32, details: bool) -> Settings {
        Settings {
            query: Some("Aufzüge".to_string()),
            mode,
            max_pages,
            include_company_details: details,
            ..Default::default()
        }
    }

    fn search_url(mode: SearchMode, page: u32) -> String {
        build_search_url(BASE, "Aufzüge", mode, "DE", "de", page)
            .unwrap()
            .to_string()
    }

    fn company_page(ids: &[u32]) -> String {
        let cards: String = ids
            .iter()
            .map(|id| {
                format!(
                    r#"<article class="company-item"><h2>Firma {id}</h2><a href="/de/firma/firma-{id}">Profil</a></article>"#
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", cards)
    }

    fn product_page(names: &[&str]) -> String {
        let cards: String = names
            .iter()
            .map(|name| format!(r#"<div class="product-card"><h3>{name}</h3></div>"#))
            .collect();
        format!("<html><body>{}</body></html>", cards)
    }

    fn detail_page(name: &str) -> String {
        format!("<html><body><h1>{}</h1><p>Gründungsjahr 1990</p></body></html>", name)
    }

    fn names(companies: &[CompanySummary]) -> Vec<String> {
        companies.iter().filter_map(|c| c.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_stops_on_page_without_cards() {
        let source = FakeSource::default()
            .with(search_url(SearchMode::Company, 1), company_page(&[1, 2]))
            .with(
                search_url(SearchMode::Company, 2),
                "<html><body><p>Keine Treffer</p></body></html>",
            )
            .with(search_url(SearchMode::Company, 3), company_page(&[3]));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 0, false), source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        assert_eq!(names(&companies), vec!["Firma 1", "Firma 2"]);
        assert_eq!(
            coordinator.stats().termination,
            Some(Termination::EmptyPage { page: 2 })
        );
        assert_eq!(coordinator.stats().pages_fetched, 2);
        assert_eq!(
            coordinator.source.requests(),
            vec![
                search_url(SearchMode::Company, 1),
                search_url(SearchMode::Company, 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_on_fetch_failure_and_keeps_results() {
        let source = FakeSource::default()
            .with(search_url(SearchMode::Company, 1), company_page(&[1]))
            .with(search_url(SearchMode::Company, 2), company_page(&[2, 3]));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 0, false), source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        assert_eq!(names(&companies), vec!["Firma 1", "Firma 2", "Firma 3"]);
        assert_eq!(
            coordinator.stats().termination,
            Some(Termination::FetchFailed { page: 3 })
        );
        assert_eq!(coordinator.stats().records, 3);
    }

    #[tokio::test]
    async fn test_empty_body_stops_crawl() {
        let source = FakeSource::default().with(search_url(SearchMode::Company, 1), "");

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 0, true), source).unwrap();
        let output = coordinator.run().await.unwrap();

        assert!(output.is_empty());
        assert_eq!(
            coordinator.stats().termination,
            Some(Termination::FetchFailed { page: 1 })
        );
    }

    #[tokio::test]
    async fn test_max_pages_limit() {
        let source = FakeSource::default()
            .with(search_url(SearchMode::Company, 1), company_page(&[1]))
            .with(search_url(SearchMode::Company, 2), company_page(&[2]))
            .with(search_url(SearchMode::Company, 3), company_page(&[3]));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 2, false), source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        assert_eq!(names(&companies), vec!["Firma 1", "Firma 2"]);
        assert_eq!(
            coordinator.stats().termination,
            Some(Termination::MaxPages { page: 2 })
        );
        assert!(!coordinator
            .source
            .requests()
            .contains(&search_url(SearchMode::Company, 3)));
    }

    #[tokio::test]
    async fn test_details_attached_and_failures_skipped() {
        let page = r#"<html><body>
            <article class="company-item" data-id="1"><h2>Eins</h2><a href="/de/firma/eins-1">p</a></article>
            <article class="company-item" data-id="2"><h2>Zwei</h2><a href="/de/firma/zwei-2">p</a></article>
            <article class="company-item"><h2>Drei</h2></article>
        </body></html>"#;
        let source = FakeSource::default()
            .with(search_url(SearchMode::Company, 1), page)
            .with(format!("{}/de/firma/eins-1", BASE), detail_page("Eins GmbH"));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 1, true), source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        assert_eq!(companies.len(), 3);

        let details = companies[0].details.as_ref().unwrap();
        assert_eq!(details.company_id.as_deref(), Some("1"));
        assert_eq!(details.name.as_deref(), Some("Eins GmbH"));
        assert_eq!(details.founding_year, Some(1990));

        assert!(companies[1].details.is_none());
        assert!(companies[2].details.is_none());

        let stats = coordinator.stats();
        assert_eq!(stats.details_fetched, 1);
        assert_eq!(stats.details_failed, 1);
        // Page 1, then one detail request per card with a link
        assert_eq!(coordinator.source.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_details_disabled() {
        let source = FakeSource::default()
            .with(search_url(SearchMode::Company, 1), company_page(&[1, 2]));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Company, 1, false), source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        assert!(companies.iter().all(|c| c.details.is_none()));
        assert_eq!(coordinator.source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_parallel_details_keep_card_order() {
        let ids: Vec<u32> = (1..=6).collect();
        let mut source =
            FakeSource::default().with(search_url(SearchMode::Company, 1), company_page(&ids));
        for id in &ids {
            source = source.with(
                format!("{}/de/firma/firma-{}", BASE, id),
                detail_page(&format!("Detail {}", id)),
            );
        }

        let mut config = settings(SearchMode::Company, 1, true);
        config.detail_concurrency = 3;
        let mut coordinator = Coordinator::new(config, source).unwrap();
        let companies = coordinator.crawl_companies().await.unwrap();

        for (company, id) in companies.iter().zip(&ids) {
            assert_eq!(company.name, Some(format!("Firma {}", id)));
            assert_eq!(
                company.details.as_ref().and_then(|d| d.name.clone()),
                Some(format!("Detail {}", id))
            );
        }
    }

    #[tokio::test]
    async fn test_product_mode() {
        let source = FakeSource::default()
            .with(search_url(SearchMode::Product, 1), product_page(&["A", "B"]))
            .with(search_url(SearchMode::Product, 2), product_page(&["C"]));

        let mut coordinator =
            Coordinator::new(settings(SearchMode::Product, 0, true), source).unwrap();
        let output = coordinator.run().await.unwrap();

        match output {
            CrawlOutput::Products(products) => {
                let names: Vec<_> = products.iter().filter_map(|p| p.name.clone()).collect();
                assert_eq!(names, vec!["A", "B", "C"]);
            }
            other => panic!("expected products, got {:?}", other),
        }
        assert_eq!(
            coordinator.stats().termination,
            Some(Termination::FetchFailed { page: 3 })
        );
    }

    #[test]
    fn test_missing_query_rejected() {
        let mut config = settings(SearchMode::Company, 1, true);
        config.query = None;
        let result = Coordinator::new(config, FakeSource::default());
        assert!(matches!(
            result,
            Err(ScrapeError::Config(ConfigError::MissingQuery))
        ));
    }

    #[test]
    fn test_crawl_output_serializes_as_plain_list() {
        let output = CrawlOutput::Products(vec![ProductSummary::default()]);
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.is_array());
        assert_eq!(output.len(), 1);
    }
}
