//! Extraction module for marketplace HTML
//!
//! This module turns search-result and detail pages into records:
//! - Whitespace normalization shared by every field
//! - Data-driven candidate selector chains
//! - Company summaries and detail records
//! - Product summaries

mod company;
mod product;
mod selectors;
mod text;
mod types;

pub use company::{parse_address, parse_facts_block, CompanyExtractor, CompanyFacts};
pub use product::ProductExtractor;
pub use selectors::SelectorChain;
pub use text::{element_text, normalize_whitespace};
pub use types::{CompanyAddress, CompanyContact, CompanyDetails, CompanySummary, ProductSummary};
