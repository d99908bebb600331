//! Candidate selector chains
//!
//! A chain is an ordered list of CSS selectors compiled from configuration.
//! Field lookups try each selector in turn and the first one that yields a
//! usable value wins, so markup drift only requires configuration changes.

use crate::extract::text::element_text;
use crate::ConfigError;
use scraper::{ElementRef, Selector};

/// An ordered list of compiled selectors for one field
#[derive(Debug, Clone)]
pub struct SelectorChain {
    field: String,
    selectors: Vec<Selector>,
    union: Option<Selector>,
}

impl SelectorChain {
    /// Compiles a chain from selector strings
    ///
    /// # Arguments
    ///
    /// * `field` - Field label used in error messages
    /// * `sources` - Selector strings, highest priority first
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorChain)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector failed to parse
    pub fn compile(field: &str, sources: &[String]) -> Result<Self, ConfigError> {
        let invalid = |selector: &str| ConfigError::InvalidSelector {
            field: field.to_string(),
            selector: selector.to_string(),
        };

        let selectors = sources
            .iter()
            .map(|source| Selector::parse(source).map_err(|_| invalid(source)))
            .collect::<Result<Vec<_>, _>>()?;

        let union = if sources.is_empty() {
            None
        } else {
            let joined = sources.join(", ");
            Some(Selector::parse(&joined).map_err(|_| invalid(&joined))?)
        };

        Ok(Self {
            field: field.to_string(),
            selectors,
            union,
        })
    }

    /// First value produced by `extract`, trying selectors in priority order
    ///
    /// Within one selector, matches are tried in document order, so a chain
    /// like `a[href^='mailto:']` skips links whose href turns out empty.
    pub fn first_value<'a, T>(
        &self,
        scope: ElementRef<'a>,
        mut extract: impl FnMut(ElementRef<'a>) -> Option<T>,
    ) -> Option<T> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).find_map(&mut extract))
    }

    /// Normalized text of the first match with non-empty text
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.first_value(scope, |element| {
            let text = element_text(element);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
    }

    /// Trimmed value of `attr` on the first match that carries a non-empty one
    pub fn first_attr(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        self.first_value(scope, |element| {
            element
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }

    /// All matches of the first selector that matches anything
    ///
    /// Used for card discovery: one selector family wins for the whole page.
    pub fn first_family<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for selector in &self.selectors {
            let matches: Vec<_> = scope.select(selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        tracing::debug!("No selector in {} matched", self.field);
        Vec::new()
    }

    /// Matches of any selector in the chain, in document order
    pub fn all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match &self.union {
            Some(union) => scope.select(union).collect(),
            None => Vec::new(),
        }
    }
}
