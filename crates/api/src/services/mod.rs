//! External service integrations.
//!
//! Builds the PII analyzer and the feedback store from configuration. Both
//! are created once at startup and shared through the application state.

pub mod presidio;

use std::sync::Arc;
use std::time::Duration;

use domain::services::{AnalyzerError, Anonymizer, PatternAnalyzer, PiiAnalyzer};
use persistence::repositories::{FeedbackRepository, FeedbackStore};
use persistence::{ConnectionString, StoreError, TableClient};
use tracing::info;

use crate::config::{Config, PiiConfig, PII_PROVIDER_PRESIDIO};

pub use presidio::PresidioAnalyzer;

/// Builds the analyzer selected by `pii.provider`.
pub fn build_analyzer(config: &PiiConfig) -> Result<Arc<dyn PiiAnalyzer>, AnalyzerError> {
    if config.provider == PII_PROVIDER_PRESIDIO {
        let analyzer = PresidioAnalyzer::new(
            &config.analyzer_url,
            Duration::from_millis(config.timeout_ms),
            config.min_score,
        )?;
        info!(url = %analyzer.base_url(), "Using Presidio PII analyzer");
        Ok(Arc::new(analyzer))
    } else {
        info!("Using built-in PII analyzer");
        Ok(Arc::new(PatternAnalyzer::new()))
    }
}

/// Builds the anonymizer around the configured analyzer.
pub fn build_anonymizer(config: &PiiConfig) -> Result<Anonymizer, AnalyzerError> {
    Ok(Anonymizer::new(build_analyzer(config)?)
        .with_language(config.language.clone())
        .with_min_score(config.min_score))
}

/// Builds the feedback store, or `None` when no connection string is set.
///
/// Creates the table first when `storage.create_table` is enabled.
pub async fn build_feedback_store(
    config: &Config,
) -> Result<Option<Arc<dyn FeedbackStore>>, StoreError> {
    if !config.storage.is_configured() {
        info!("No table storage configured; feedback will not be persisted");
        return Ok(None);
    }

    let connection: ConnectionString = config.storage.connection_string.parse()?;

    info!(
        account = %connection.account_name,
        table = %config.storage.table_name,
        "Using Azure table storage for feedback"
    );

    let client = TableClient::new(connection, Duration::from_millis(config.storage.timeout_ms))?;
    let repository = FeedbackRepository::new(client, config.storage.table_name.clone());

    if config.storage.create_table {
        repository.ensure_table().await?;
    }

    Ok(Some(Arc::new(repository)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_builtin_analyzer() {
        let config = Config::load_for_test(&[]).unwrap();
        let analyzer = build_analyzer(&config.pii).unwrap();
        assert_eq!(analyzer.name(), "builtin");
    }

    #[test]
    fn test_build_presidio_analyzer() {
        let config = Config::load_for_test(&[
            ("pii.provider", "presidio"),
            ("pii.analyzer_url", "http://localhost:5002"),
        ])
        .unwrap();
        let anonymizer = build_anonymizer(&config.pii).unwrap();
        assert_eq!(anonymizer.analyzer_name(), "presidio");
    }

    #[tokio::test]
    async fn test_no_store_without_connection_string() {
        let config = Config::load_for_test(&[]).unwrap();
        assert!(build_feedback_store(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_with_connection_string() {
        let config = Config::load_for_test(&[(
            "storage.connection_string",
            "UseDevelopmentStorage=true",
        )])
        .unwrap();
        assert!(build_feedback_store(&config).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_connection_string() {
        let config =
            Config::load_for_test(&[("storage.connection_string", "AccountName=x")]).unwrap();
        assert!(build_feedback_store(&config).await.is_err());
    }
}
