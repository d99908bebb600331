//! Company extraction from search-result cards and detail pages

use crate::config::{CompanyDetailSelectors, CompanyListSelectors, MarkerConfig, SelectorConfig};
use crate::extract::selectors::SelectorChain;
use crate::extract::text::{element_text, non_empty, normalize_whitespace, strip_scheme};
use crate::extract::types::{CompanyAddress, CompanyContact, CompanyDetails, CompanySummary};
use crate::url::{company_id_from_href, resolve_link};
use crate::ConfigError;
use scraper::{ElementRef, Html};
use url::Url;

/// Compiled selector chains for company cards
#[derive(Debug, Clone)]
struct ListChains {
    cards: SelectorChain,
    name: SelectorChain,
    details_link: SelectorChain,
    email: SelectorChain,
    phone: SelectorChain,
    homepage: SelectorChain,
    address: SelectorChain,
    description: SelectorChain,
    logo: SelectorChain,
}

impl ListChains {
    fn compile(config: &CompanyListSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            cards: SelectorChain::compile("company_list.cards", &config.cards)?,
            name: SelectorChain::compile("company_list.name", &config.name)?,
            details_link: SelectorChain::compile("company_list.details_link", &config.details_link)?,
            email: SelectorChain::compile("company_list.email", &config.email)?,
            phone: SelectorChain::compile("company_list.phone", &config.phone)?,
            homepage: SelectorChain::compile("company_list.homepage", &config.homepage)?,
            address: SelectorChain::compile("company_list.address", &config.address)?,
            description: SelectorChain::compile("company_list.description", &config.description)?,
            logo: SelectorChain::compile("company_list.logo", &config.logo)?,
        })
    }
}

/// Compiled selector chains for company detail pages
#[derive(Debug, Clone)]
struct DetailChains {
    name: SelectorChain,
    description: SelectorChain,
    email: SelectorChain,
    phone: SelectorChain,
    homepage: SelectorChain,
    address: SelectorChain,
    contact_blocks: SelectorChain,
    contact_name: SelectorChain,
    contact_role: SelectorChain,
    contact_email: SelectorChain,
    certificate_items: SelectorChain,
    products: SelectorChain,
}

impl DetailChains {
    fn compile(config: &CompanyDetailSelectors) -> Result<Self, ConfigError> {
        let chain = |field: &str, sources: &[String]| {
            SelectorChain::compile(&format!("company_details.{}", field), sources)
        };

        Ok(Self {
            name: chain("name", &config.name)?,
            description: chain("description", &config.description)?,
            email: chain("email", &config.email)?,
            phone: chain("phone", &config.phone)?,
            homepage: chain("homepage", &config.homepage)?,
            address: chain("address", &config.address)?,
            contact_blocks: chain("contact_blocks", &config.contact_blocks)?,
            contact_name: chain("contact_name", &config.contact_name)?,
            contact_role: chain("contact_role", &config.contact_role)?,
            contact_email: chain("contact_email", &config.contact_email)?,
            certificate_items: chain("certificate_items", &config.certificate_items)?,
            products: chain("products", &config.products)?,
        })
    }
}

/// Facts parsed from the free-text facts block of a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFacts {
    pub founding_year: Option<i32>,
    pub employee_count: Option<String>,
}

/// Parses company records out of marketplace HTML
///
/// Every field is looked up through its own candidate selector chain. A field
/// whose chain matches nothing stays empty; extraction never fails.
#[derive(Debug, Clone)]
pub struct CompanyExtractor {
    list: ListChains,
    details: DetailChains,
    markers: MarkerConfig,
}

impl CompanyExtractor {
    /// Compiles the extractor from selector configuration
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            list: ListChains::compile(&config.company_list)?,
            details: DetailChains::compile(&config.company_details)?,
            markers: config.markers.clone(),
        })
    }

    /// Parses a search-results page into company summaries
    ///
    /// Cards are discovered with the first card selector that matches
    /// anything on the page. A page without cards yields an empty list.
    ///
    /// # Arguments
    ///
    /// * `html` - The search-results page
    /// * `base_url` - Base for resolving relative profile links
    pub fn parse_company_list(&self, html: &str, base_url: &Url) -> Vec<CompanySummary> {
        let document = Html::parse_document(html);
        let cards = self.list.cards.first_family(document.root_element());

        tracing::info!("Found {} potential company cards in search results.", cards.len());

        cards
            .into_iter()
            .map(|card| self.parse_card(card, base_url))
            .collect()
    }

    fn parse_card(&self, card: ElementRef<'_>, base_url: &Url) -> CompanySummary {
        let list = &self.list;

        let mut company_id = attr(card, "data-id").or_else(|| attr(card, "data-company-id"));

        let link = list
            .details_link
            .first_value(card, |a| attr(a, "href").map(|href| (a, href)));
        let details_url = link.as_ref().and_then(|(_, href)| resolve_link(base_url, href));
        if company_id.is_none() {
            if let Some((a, href)) = &link {
                company_id = attr(*a, "data-id").or_else(|| company_id_from_href(href));
            }
        }

        let employee_count = find_marked_text(card, &self.markers.employee_count)
            .map(|(text, _)| normalize_whitespace(text))
            .and_then(non_empty);

        CompanySummary {
            company_id,
            name: list.name.first_text(card),
            email: link_target(&list.email, card, "mailto:"),
            phone_number: link_target(&list.phone, card, "tel:"),
            homepage: list.homepage.first_attr(card, "href"),
            address: CompanyAddress::from_full(list.address.first_text(card)),
            employee_count,
            founding_year: None,
            description: list.description.first_text(card),
            region: None,
            logo_url: list.logo.first_attr(card, "src"),
            details_url,
            details: None,
        }
    }

    /// Parses a company detail page into an enriched record
    ///
    /// # Arguments
    ///
    /// * `html` - The detail page
    /// * `company_id` - Identifier carried over from the summary, if known
    pub fn parse_company_details(&self, html: &str, company_id: Option<&str>) -> CompanyDetails {
        let document = Html::parse_document(html);
        let root = document.root_element();
        let d = &self.details;

        let facts = self.parse_facts(root);

        CompanyDetails {
            company_id: company_id.map(str::to_string),
            name: d.name.first_text(root),
            email: link_target(&d.email, root, "mailto:"),
            phone_number: link_target(&d.phone, root, "tel:"),
            homepage: d.homepage.first_attr(root, "href"),
            address: parse_address(d.address.first_text(root)),
            employee_count: facts.employee_count,
            founding_year: facts.founding_year,
            description: d.description.first_text(root),
            products: texts(d.products.all(root)),
            contacts: self.parse_contacts(root),
            certificates: self.parse_certificates(root),
        }
    }

    fn parse_facts(&self, root: ElementRef<'_>) -> CompanyFacts {
        match find_marked_text(root, &self.markers.facts_anchor) {
            Some((_, Some(parent))) => parse_facts_block(&element_text(parent), &self.markers),
            _ => CompanyFacts::default(),
        }
    }

    fn parse_contacts(&self, root: ElementRef<'_>) -> Vec<CompanyContact> {
        let d = &self.details;

        d.contact_blocks
            .all(root)
            .into_iter()
            .map(|block| {
                let contact = CompanyContact {
                    email: link_target(&d.contact_email, block, "mailto:"),
                    role: d.contact_role.first_text(block),
                    ..Default::default()
                };
                match d.contact_name.first_text(block) {
                    Some(name) => contact.with_name(&name),
                    None => contact,
                }
            })
            .collect()
    }

    /// Certificate list items under the parent of the marker text
    ///
    /// When that parent is a heading without items of its own, the element
    /// directly following the heading is searched instead. Nothing above the
    /// parent is ever searched.
    fn parse_certificates(&self, root: ElementRef<'_>) -> Vec<String> {
        let Some((_, Some(anchor))) = find_marked_text(root, &self.markers.certificates) else {
            return Vec::new();
        };

        let items = texts(self.details.certificate_items.all(anchor));
        if !items.is_empty() || !is_heading(anchor) {
            return items;
        }

        anchor
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(|list| texts(self.details.certificate_items.all(list)))
            .unwrap_or_default()
    }
}

/// Splits a raw address into street, postal code, city and country code
///
/// Comma-separated parts are trimmed. The first part is the street; the second
/// part's first token is the postal code and its remaining tokens the city;
/// with three or more parts, the last token of the last part, uppercased, is
/// the country code. No validation is done on any derived field.
///
/// # Examples
///
/// ```
/// use wlw_scraper::extract::parse_address;
///
/// let address = parse_address(Some("Hauptstr. 1, 12345 Berlin, Germany".to_string()));
/// assert_eq!(address.street.as_deref(), Some("Hauptstr. 1"));
/// assert_eq!(address.postal_code.as_deref(), Some("12345"));
/// assert_eq!(address.city.as_deref(), Some("Berlin"));
/// assert_eq!(address.country_code.as_deref(), Some("GERMANY"));
/// ```
pub fn parse_address(full: Option<String>) -> CompanyAddress {
    let Some(full) = full.filter(|f| !f.is_empty()) else {
        return CompanyAddress::default();
    };

    let parts: Vec<&str> = full
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let mut address = CompanyAddress::default();
    address.street = parts.first().map(|s| s.to_string());

    if let Some(locality) = parts.get(1) {
        let mut tokens = locality.split_whitespace();
        address.postal_code = tokens.next().map(str::to_string);
        address.city = non_empty(tokens.collect::<Vec<_>>().join(" "));
    }

    if parts.len() >= 3 {
        address.country_code = parts
            .last()
            .and_then(|part| part.split_whitespace().last())
            .map(str::to_uppercase);
    }

    address.full = Some(full);
    address
}

/// Parses founding year and employee count from a facts text block
///
/// The founding year is the first standalone four-digit token, read only when
/// a founding-year marker occurs in the block. The employee count is the
/// verbatim remainder of the block from the first employee marker onwards.
pub fn parse_facts_block(block: &str, markers: &MarkerConfig) -> CompanyFacts {
    let mut facts = CompanyFacts::default();

    if contains_any(block, &markers.founding_year) {
        facts.founding_year = block
            .split_whitespace()
            .find(|token| token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|token| token.parse().ok());
    }

    facts.employee_count = markers
        .employee_count
        .iter()
        .filter_map(|marker| block.find(marker.as_str()))
        .min()
        .and_then(|start| non_empty(block[start..].trim().to_string()));

    facts
}

/// First text node under `scope` containing any of the markers, with its parent element
fn find_marked_text<'a>(
    scope: ElementRef<'a>,
    markers: &[String],
) -> Option<(&'a str, Option<ElementRef<'a>>)> {
    scope.descendants().find_map(|node| {
        let text: &'a str = node.value().as_text()?;
        if contains_any(text, markers) {
            Some((text, node.parent().and_then(ElementRef::wrap)))
        } else {
            None
        }
    })
}

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

fn contains_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}

/// href of the first matching link with its scheme prefix removed
fn link_target(chain: &SelectorChain, scope: ElementRef<'_>, scheme: &str) -> Option<String> {
    chain
        .first_attr(scope, "href")
        .and_then(|href| strip_scheme(&href, scheme))
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn texts(elements: Vec<ElementRef<'_>>) -> Vec<String> {
    elements
        .into_iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}
