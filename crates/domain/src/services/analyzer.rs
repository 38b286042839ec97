//! PII analyzer abstraction.
//!
//! An analyzer inspects text and reports spans of personally identifiable
//! information. Implementations range from the built-in pattern analyzer to
//! remote NER-backed services; the anonymizer only sees this trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RecognizerResult;

/// Errors that can occur while analyzing text.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("PII analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid response from PII analyzer: {0}")]
    InvalidResponse(String),

    #[error("Unsupported analyzer language: {0}")]
    UnsupportedLanguage(String),
}

/// Detects PII spans in free text.
///
/// Implementations are shared across requests and must not keep per-call state.
#[async_trait]
pub trait PiiAnalyzer: Send + Sync {
    /// Short identifier used in logs and health output.
    fn name(&self) -> &'static str;

    /// Returns the detected spans as byte offsets into `text`.
    async fn analyze(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<RecognizerResult>, AnalyzerError>;

    /// Whether the analyzer can currently serve requests.
    async fn is_available(&self) -> bool {
        true
    }
}
