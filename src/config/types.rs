use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default marketplace base URL
pub const DEFAULT_BASE_URL: &str = "https://www.wlw.de";

/// Which kind of search results to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Company search results, optionally enriched with detail pages
    #[default]
    Company,
    /// Product search results (list pages only)
    Product,
}

impl SearchMode {
    /// Path segment used by the marketplace for this mode
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Company => "firmen",
            Self::Product => "produkte",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => write!(f, "company"),
            Self::Product => write!(f, "product"),
        }
    }
}

/// Effective scraper settings after all layers have been merged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Marketplace base URL
    pub base_url: String,

    /// Interface language ("de" or anything else for English)
    pub language: String,

    /// Country filter passed as the `country` query parameter
    pub region: String,

    /// Company or product search
    pub mode: SearchMode,

    /// Maximum number of result pages, 0 means unlimited
    pub max_pages: u32,

    /// Whether to fetch and attach company detail pages
    pub include_company_details: bool,

    /// Directory for relative output filenames
    pub output_dir: PathBuf,

    /// Output filename, or an absolute path
    pub output_filename: String,

    /// Search query; required once all layers are merged
    pub query: Option<String>,

    /// HTTP retry policy
    pub retry: RetryConfig,

    /// Maximum number of detail pages fetched at once
    pub detail_concurrency: usize,

    /// Candidate selector chains and marker strings
    pub selectors: SelectorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "de".to_string(),
            region: "DE".to_string(),
            mode: SearchMode::Company,
            max_pages: 1,
            include_company_details: true,
            output_dir: PathBuf::from("data"),
            output_filename: "sample_output.json".to_string(),
            query: None,
            retry: RetryConfig::default(),
            detail_concurrency: 1,
            selectors: SelectorConfig::default(),
        }
    }
}

impl Settings {
    /// Resolves where the export should be written
    ///
    /// An absolute `output_filename` wins; otherwise it is placed under `output_dir`.
    pub fn output_path(&self) -> PathBuf {
        let filename = PathBuf::from(&self.output_filename);
        if filename.is_absolute() {
            filename
        } else {
            self.output_dir.join(filename)
        }
    }
}

/// Retry policy for page fetches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    pub retries: u32,

    /// Base delay in seconds; attempt `i` waits `backoff_factor * 2^i`
    pub backoff_factor: f64,

    /// Per-request timeout in seconds
    pub timeout: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_factor: 0.5,
            timeout: 20.0,
        }
    }
}

/// All selector chains and text markers used by the extractors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub company_list: CompanyListSelectors,
    pub company_details: CompanyDetailSelectors,
    pub product_list: ProductListSelectors,
    pub markers: MarkerConfig,
}

/// Selector chains for company cards on a search-results page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyListSelectors {
    pub cards: Vec<String>,
    pub name: Vec<String>,
    pub details_link: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub homepage: Vec<String>,
    pub address: Vec<String>,
    pub description: Vec<String>,
    pub logo: Vec<String>,
}

impl Default for CompanyListSelectors {
    fn default() -> Self {
        Self {
            cards: strings(&[
                "[data-test='company-result-card']",
                "article.company-item",
                "div.company-card",
            ]),
            name: strings(&["[data-test='company-name']", "h2", "h3"]),
            details_link: strings(&[
                "a[data-test='company-link'][href]",
                "a[href*='/firmen/']",
                "a[href]",
            ]),
            email: strings(&["a[href^='mailto:']"]),
            phone: strings(&["a[href^='tel:']"]),
            homepage: strings(&["a[href^='http']"]),
            address: strings(&["[data-test='company-address']", ".address"]),
            description: strings(&["[data-test='company-description']", ".description"]),
            logo: strings(&["img[src]"]),
        }
    }
}

/// Selector chains for a company detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDetailSelectors {
    pub name: Vec<String>,
    pub description: Vec<String>,
    pub email: Vec<String>,
    pub phone: Vec<String>,
    pub homepage: Vec<String>,
    pub address: Vec<String>,
    pub contact_blocks: Vec<String>,
    pub contact_name: Vec<String>,
    pub contact_role: Vec<String>,
    pub contact_email: Vec<String>,
    pub certificate_items: Vec<String>,
    pub products: Vec<String>,
}

impl Default for CompanyDetailSelectors {
    fn default() -> Self {
        Self {
            name: strings(&["[data-test='company-name']", "h1", "h2"]),
            description: strings(&[
                "[data-test='company-description']",
                "section.description",
                "p.lead",
            ]),
            email: strings(&["a[href^='mailto:']"]),
            phone: strings(&["a[href^='tel:']"]),
            homepage: strings(&["a[href^='http']"]),
            address: strings(&["[data-test='company-address']", "address", ".address"]),
            contact_blocks: strings(&["[data-test='contact-person']", ".contact-person"]),
            contact_name: strings(&["h3", "h4", ".name"]),
            contact_role: strings(&[".role", ".position"]),
            contact_email: strings(&["a[href^='mailto:']"]),
            certificate_items: strings(&["li"]),
            products: strings(&[
                "[data-test='product-name']",
                ".product-list li",
                "section.products li",
            ]),
        }
    }
}

/// Selector chains for product cards on a search-results page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductListSelectors {
    pub cards: Vec<String>,
    pub name: Vec<String>,
    pub product_link: Vec<String>,
    pub company_name: Vec<String>,
    pub company_link: Vec<String>,
    pub description: Vec<String>,
    pub region: Vec<String>,
}

impl Default for ProductListSelectors {
    fn default() -> Self {
        Self {
            cards: strings(&[
                "[data-test='product-result-card']",
                "article.product-item",
                "div.product-card",
            ]),
            name: strings(&["[data-test='product-name']", "h2", "h3"]),
            product_link: strings(&[
                "a[data-test='product-link'][href]",
                "a[href*='/produkte/']",
            ]),
            company_name: strings(&["[data-test='company-name']", ".company-name"]),
            company_link: strings(&[
                "a[data-test='company-link'][href]",
                "a[href*='/firmen/']",
            ]),
            description: strings(&["[data-test='product-description']", ".description"]),
            region: strings(&["[data-test='company-region']", ".region"]),
        }
    }
}

/// Language-specific label substrings used by the free-text heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marks the employee count, both on cards and in the facts block
    pub employee_count: Vec<String>,

    /// Marks the text node whose parent holds the company facts
    pub facts_anchor: Vec<String>,

    /// Marks a facts block that carries the founding year
    pub founding_year: Vec<String>,

    /// Marks the heading of the certificates list
    pub certificates: Vec<String>,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            employee_count: strings(&["Mitarbeiter"]),
            facts_anchor: strings(&["Gründungsjahr", "Mitarbeiteranzahl"]),
            founding_year: strings(&["Gründungsjahr"]),
            certificates: strings(&["Zertifizierungen"]),
        }
    }
}

impl SelectorConfig {
    /// Every configured selector chain, labelled by its field path
    pub fn chains(&self) -> Vec<(&'static str, &[String])> {
        let company = &self.company_list;
        let details = &self.company_details;
        let product = &self.product_list;
        vec![
            ("company_list.cards", &company.cards[..]),
            ("company_list.name", &company.name[..]),
            ("company_list.details_link", &company.details_link[..]),
            ("company_list.email", &company.email[..]),
            ("company_list.phone", &company.phone[..]),
            ("company_list.homepage", &company.homepage[..]),
            ("company_list.address", &company.address[..]),
            ("company_list.description", &company.description[..]),
            ("company_list.logo", &company.logo[..]),
            ("company_details.name", &details.name[..]),
            ("company_details.description", &details.description[..]),
            ("company_details.email", &details.email[..]),
            ("company_details.phone", &details.phone[..]),
            ("company_details.homepage", &details.homepage[..]),
            ("company_details.address", &details.address[..]),
            ("company_details.contact_blocks", &details.contact_blocks[..]),
            ("company_details.contact_name", &details.contact_name[..]),
            ("company_details.contact_role", &details.contact_role[..]),
            ("company_details.contact_email", &details.contact_email[..]),
            ("company_details.certificate_items", &details.certificate_items[..]),
            ("company_details.products", &details.products[..]),
            ("product_list.cards", &product.cards[..]),
            ("product_list.name", &product.name[..]),
            ("product_list.product_link", &product.product_link[..]),
            ("product_list.company_name", &product.company_name[..]),
            ("product_list.company_link", &product.company_link[..]),
            ("product_list.description", &product.description[..]),
            ("product_list.region", &product.region[..]),
        ]
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
