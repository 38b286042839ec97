//! Presidio analyzer integration.
//!
//! Calls the analyzer REST API of a Presidio deployment and adapts its
//! results to the domain `PiiAnalyzer` contract. Presidio reports offsets in
//! characters; they are converted to byte offsets here.

use std::time::Duration;

use async_trait::async_trait;
use domain::models::RecognizerResult;
use domain::services::{AnalyzerError, PiiAnalyzer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body for `POST /analyze`.
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    score_threshold: f64,
}

/// One entry of the `POST /analyze` response.
#[derive(Debug, Deserialize)]
struct PresidioResult {
    entity_type: String,
    start: usize,
    end: usize,
    score: f64,
}

/// Remote analyzer backed by a Presidio analyzer service.
#[derive(Debug, Clone)]
pub struct PresidioAnalyzer {
    client: Client,
    base_url: String,
    score_threshold: f64,
}

impl PresidioAnalyzer {
    /// Creates a client for the analyzer at `base_url`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        score_threshold: f64,
    ) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzerError::Unavailable(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            score_threshold,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PiiAnalyzer for PresidioAnalyzer {
    fn name(&self) -> &'static str {
        "presidio"
    }

    async fn analyze(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<RecognizerResult>, AnalyzerError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest {
                text,
                language,
                score_threshold: self.score_threshold,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Presidio analyzer request failed");
                AnalyzerError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AnalyzerError::Unavailable(format!(
                "analyzer returned {}",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::InvalidResponse(format!(
                "analyzer returned {}: {}",
                status, body
            )));
        }

        let results: Vec<PresidioResult> = response
            .json()
            .await
            .map_err(|e| AnalyzerError::InvalidResponse(e.to_string()))?;

        debug!(count = results.len(), "Presidio analysis complete");
        to_byte_offsets(text, results)
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Presidio health check failed");
                false
            }
        }
    }
}

/// Converts character offsets reported by Presidio into byte offsets.
fn to_byte_offsets(
    text: &str,
    results: Vec<PresidioResult>,
) -> Result<Vec<RecognizerResult>, AnalyzerError> {
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    results
        .into_iter()
        .map(|r| {
            match (boundaries.get(r.start), boundaries.get(r.end)) {
                (Some(&start), Some(&end)) if start <= end => {
                    Ok(RecognizerResult::new(r.entity_type, start, end, r.score))
                }
                _ => Err(AnalyzerError::InvalidResponse(format!(
                    "span {}..{} is outside the analyzed text",
                    r.start, r.end
                ))),
            }
        })
        .collect()
}
