//! URL handling module
//!
//! This module builds paginated search URLs, resolves links found in result
//! cards against the marketplace base URL, and derives company identifiers
//! from profile link paths.

use crate::config::SearchMode;
use url::Url;

/// Builds the URL of one search-results page
///
/// The path is `/{lang}/{mode}/` where `lang` is `de` for German and `en` for
/// every other language, and `mode` is `firmen` or `produkte`. Query, page and
/// region are appended form-encoded as `q`, `page` and `country`.
///
/// # Examples
///
/// ```
/// use wlw_scraper::config::SearchMode;
/// use wlw_scraper::url::build_search_url;
///
/// let url = build_search_url("https://www.wlw.de", "Aufzüge", SearchMode::Company, "DE", "de", 2)
///     .unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.wlw.de/de/firmen/?q=Aufz%C3%BCge&page=2&country=DE"
/// );
/// ```
pub fn build_search_url(
    base_url: &str,
    query: &str,
    mode: SearchMode,
    region: &str,
    language: &str,
    page: u32,
) -> Result<Url, url::ParseError> {
    let lang_segment = if language == "de" { "de" } else { "en" };
    let path = format!("/{}/{}/", lang_segment, mode.path_segment());

    let mut url = Url::parse(base_url)?.join(&path)?;
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("page", &page.to_string())
        .append_pair("country", region);

    Ok(url)
}

/// Resolves an href from a result card against the base URL
///
/// Relative references combine with the base, absolute references replace it.
/// Returns None for empty or unparseable hrefs.
pub fn resolve_link(base_url: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base_url.join(href).ok().map(String::from)
}

/// Derives a company identifier from a profile link
///
/// The identifier is the last dash-delimited token of the href once leading
/// and trailing slashes are removed, so `/firmen/acme-gmbh-4711` yields `4711`.
pub fn company_id_from_href(href: &str) -> Option<String> {
    href.trim()
        .trim_matches('/')
        .rsplit('-')
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
