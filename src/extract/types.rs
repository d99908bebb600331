use serde::{Deserialize, Serialize};

/// Postal address of a company
///
/// `full` is the raw extracted text. The other fields are derived from it
/// positionally and may be missing or wrong when the text does not follow the
/// `street, postal city, ..., country` pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAddress {
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub full: Option<String>,
}

impl CompanyAddress {
    /// Address with only the raw text set, as found on result cards
    pub fn from_full(full: Option<String>) -> Self {
        Self {
            full,
            ..Default::default()
        }
    }
}

/// A contact person listed on a company detail page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl CompanyContact {
    /// Sets `first_name` and `last_name` from a display name
    ///
    /// The first token becomes the first name and the remaining tokens the
    /// last name; a single-token name leaves `last_name` empty.
    pub fn with_name(mut self, full_name: &str) -> Self {
        let mut tokens = full_name.split_whitespace();
        self.first_name = tokens.next().map(str::to_string);
        let rest = tokens.collect::<Vec<_>>().join(" ");
        self.last_name = if rest.is_empty() { None } else { Some(rest) };
        self
    }
}

/// One company card from a search-results page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub company_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub homepage: Option<String>,
    pub address: CompanyAddress,
    /// Free text, e.g. "50-99 Mitarbeiter"
    pub employee_count: Option<String>,
    pub founding_year: Option<i32>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub logo_url: Option<String>,
    pub details_url: Option<String>,
    /// Attached by the crawler when detail pages are fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CompanyDetails>,
}

/// Enriched company record parsed from a detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    pub company_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub homepage: Option<String>,
    pub address: CompanyAddress,
    pub employee_count: Option<String>,
    pub founding_year: Option<i32>,
    pub description: Option<String>,
    pub products: Vec<String>,
    pub contacts: Vec<CompanyContact>,
    pub certificates: Vec<String>,
}

/// One product card from a search-results page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub company_id: Option<String>,
    pub product_url: Option<String>,
    pub company_url: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
}
