//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing accumulated records as a JSON document with export metadata
//! - Recording and reporting crawl statistics

mod json;
pub mod stats;

pub use json::{export_to_json, ExportMeta, ExportPayload};
pub use stats::{log_statistics, CrawlStats, Termination};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
