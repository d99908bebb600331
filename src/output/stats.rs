//! Crawl statistics
//!
//! Counters collected by the coordinator while it crawls, plus a formatter
//! for the end-of-run report.

use std::fmt;

/// Why the page loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The search page could not be fetched
    FetchFailed { page: u32 },
    /// The search page had no matching cards
    EmptyPage { page: u32 },
    /// The configured page limit was reached
    MaxPages { page: u32 },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed { page } => write!(f, "page {} could not be fetched", page),
            Self::EmptyPage { page } => write!(f, "page {} had no results", page),
            Self::MaxPages { page } => write!(f, "page limit reached at page {}", page),
        }
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Search-result pages fetched successfully
    pub pages_fetched: u32,

    /// Records accumulated across all pages
    pub records: usize,

    /// Detail pages fetched and attached
    pub details_fetched: usize,

    /// Detail pages that could not be fetched
    pub details_failed: usize,

    /// How the page loop ended
    pub termination: Option<Termination>,
}

impl CrawlStats {
    /// Share of attempted detail pages that were attached, in percent
    pub fn detail_success_rate(&self) -> f64 {
        let attempted = self.details_fetched + self.details_failed;
        if attempted == 0 {
            0.0
        } else {
            (self.details_fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Logs statistics at info level
///
/// # Arguments
///
/// * `stats` - The statistics to report
pub fn log_statistics(stats: &CrawlStats) {
    tracing::info!("Search pages fetched: {}", stats.pages_fetched);
    tracing::info!("Records accumulated: {}", stats.records);

    if stats.details_fetched + stats.details_failed > 0 {
        tracing::info!(
            "Detail pages: {} attached, {} failed ({:.1}% success)",
            stats.details_fetched,
            stats.details_failed,
            stats.detail_success_rate()
        );
    }

    if let Some(termination) = stats.termination {
        tracing::info!("Stopped: {}", termination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_success_rate() {
        let stats = CrawlStats {
            details_fetched: 3,
            details_failed: 1,
            ..Default::default()
        };
        assert!((stats.detail_success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_detail_success_rate_without_details() {
        assert_eq!(CrawlStats::default().detail_success_rate(), 0.0);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(
            Termination::EmptyPage { page: 2 }.to_string(),
            "page 2 had no results"
        );
        assert_eq!(
            Termination::MaxPages { page: 1 }.to_string(),
            "page limit reached at page 1"
        );
    }
}
