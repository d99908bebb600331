//! Configuration module for the scraper
//!
//! This module handles loading JSON settings files, layering them with the
//! optional input-defaults file and command-line overrides, and validating the
//! result.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use wlw_scraper::config::{resolve_settings, Overrides};
//!
//! let overrides = Overrides {
//!     query: Some("Aufzüge".to_string()),
//!     ..Default::default()
//! };
//! let settings = resolve_settings(
//!     Path::new("config/settings.json"),
//!     Path::new("data/sample_input.json"),
//!     &overrides,
//! )
//! .unwrap();
//! println!("Crawling {} pages", settings.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CompanyDetailSelectors, CompanyListSelectors, MarkerConfig, ProductListSelectors,
    RetryConfig, SearchMode, SelectorConfig, Settings, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{load_input_layer, load_settings_layer, merge_layers, resolve_settings, Overrides};
pub use validation::validate;
