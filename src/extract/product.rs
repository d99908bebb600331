//! Product extraction from search-result cards

use crate::config::{ProductListSelectors, SelectorConfig};
use crate::extract::selectors::SelectorChain;
use crate::extract::types::ProductSummary;
use crate::url::{company_id_from_href, resolve_link};
use crate::ConfigError;
use scraper::{ElementRef, Html};
use url::Url;

/// Parses product cards out of a search-results page
///
/// Products have no detail pass; everything comes from the card itself.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    cards: SelectorChain,
    name: SelectorChain,
    product_link: SelectorChain,
    company_name: SelectorChain,
    company_link: SelectorChain,
    description: SelectorChain,
    region: SelectorChain,
}

impl ProductExtractor {
    /// Compiles the extractor from selector configuration
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        let ProductListSelectors {
            cards,
            name,
            product_link,
            company_name,
            company_link,
            description,
            region,
        } = &config.product_list;

        Ok(Self {
            cards: SelectorChain::compile("product_list.cards", cards)?,
            name: SelectorChain::compile("product_list.name", name)?,
            product_link: SelectorChain::compile("product_list.product_link", product_link)?,
            company_name: SelectorChain::compile("product_list.company_name", company_name)?,
            company_link: SelectorChain::compile("product_list.company_link", company_link)?,
            description: SelectorChain::compile("product_list.description", description)?,
            region: SelectorChain::compile("product_list.region", region)?,
        })
    }

    /// Parses a search-results page into product summaries
    pub fn parse_product_list(&self, html: &str, base_url: &Url) -> Vec<ProductSummary> {
        let document = Html::parse_document(html);
        let cards = self.cards.first_family(document.root_element());

        tracing::info!("Found {} potential product cards in search results.", cards.len());

        cards
            .into_iter()
            .map(|card| self.parse_card(card, base_url))
            .collect()
    }

    fn parse_card(&self, card: ElementRef<'_>, base_url: &Url) -> ProductSummary {
        let product_url = self
            .product_link
            .first_attr(card, "href")
            .and_then(|href| resolve_link(base_url, &href));

        let company_link = self.company_link.first_value(card, |a| {
            a.value()
                .attr("href")
                .filter(|href| !href.trim().is_empty())
                .map(|href| (a, href.trim().to_string()))
        });

        let (company_url, company_id) = match company_link {
            Some((a, href)) => {
                let id = a
                    .value()
                    .attr("data-id")
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .or_else(|| company_id_from_href(&href));
                (resolve_link(base_url, &href), id)
            }
            None => (None, None),
        };

        ProductSummary {
            name: self.name.first_text(card),
            company_name: self.company_name.first_text(card),
            company_id,
            product_url,
            company_url,
            region: self.region.first_text(card),
            description: self.description.first_text(card),
        }
    }
}
