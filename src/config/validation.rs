use crate::config::types::{RetryConfig, SelectorConfig, Settings};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates merged settings
///
/// # Validation Rules
///
/// - `base_url` must be an absolute http(s) URL
/// - `language` and `region` cannot be empty
/// - `retry.backoff_factor` must be finite and non-negative, `retry.timeout` positive
/// - `detail_concurrency` must be at least 1
/// - Every selector must compile, and both card chains must be non-empty
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_base_url(&settings.base_url)?;

    if settings.language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "language cannot be empty".to_string(),
        ));
    }

    if settings.region.trim().is_empty() {
        return Err(ConfigError::Validation("region cannot be empty".to_string()));
    }

    validate_retry(&settings.retry)?;

    if settings.detail_concurrency == 0 {
        return Err(ConfigError::Validation(
            "detail_concurrency must be greater than 0".to_string(),
        ));
    }

    validate_selectors(&settings.selectors)?;

    Ok(())
}

/// Validates the marketplace base URL
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: base_url must use http or https",
            base_url
        )));
    }

    Ok(())
}

/// Validates the retry policy
fn validate_retry(retry: &RetryConfig) -> Result<(), ConfigError> {
    if !retry.backoff_factor.is_finite() || retry.backoff_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry.backoff_factor must be a non-negative number, got {}",
            retry.backoff_factor
        )));
    }

    if !retry.timeout.is_finite() || retry.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "retry.timeout must be greater than 0, got {}",
            retry.timeout
        )));
    }

    Ok(())
}

/// Checks that every configured CSS selector compiles
fn validate_selectors(selectors: &SelectorConfig) -> Result<(), ConfigError> {
    if selectors.company_list.cards.is_empty() || selectors.product_list.cards.is_empty() {
        return Err(ConfigError::Validation(
            "card selector chains cannot be empty".to_string(),
        ));
    }

    for (field, chain) in selectors.chains() {
        for selector in chain {
            if Selector::parse(selector).is_err() {
                return Err(ConfigError::InvalidSelector {
                    field: field.to_string(),
                    selector: selector.clone(),
                });
            }
        }
    }

    Ok(())
}
