//! Text helpers shared by all extractors

use scraper::ElementRef;

/// Collapses every whitespace run into a single space and trims both ends
///
/// # Examples
///
/// ```
/// use wlw_scraper::extract::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Acme \n\t GmbH "), "Acme GmbH");
/// assert_eq!(normalize_whitespace(""), "");
/// ```
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text content of an element
///
/// Text nodes are joined with a space so that markup like `<br>` between
/// address lines does not glue words together.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Turns an empty string into None
pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strips a URI scheme such as `mailto:` from an href
pub(crate) fn strip_scheme(href: &str, scheme: &str) -> Option<String> {
    non_empty(href.replacen(scheme, "", 1).trim().to_string())
}
