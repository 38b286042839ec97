//! Common test utilities for integration tests.
//!
//! Builds the router with in-process doubles for the PII analyzer and the
//! feedback store, so no external services are needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::{FeedbackRecord, RecognizerResult};
use domain::services::{AnalyzerError, Anonymizer, PatternAnalyzer, PiiAnalyzer};
use esai_feedback_api::{app::create_app, config::Config};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use persistence::repositories::FeedbackStore;
use persistence::StoreError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Configuration built from the bundled defaults plus `overrides`.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    Config::load_for_test(overrides).expect("Failed to load test config")
}

/// Anonymizer backed by the built-in pattern analyzer.
pub fn builtin_anonymizer() -> Anonymizer {
    Anonymizer::new(Arc::new(PatternAnalyzer::new()))
}

/// Analyzer that behaves like an unreachable remote service.
pub struct UnavailableAnalyzer;

#[async_trait]
impl PiiAnalyzer for UnavailableAnalyzer {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn analyze(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Vec<RecognizerResult>, AnalyzerError> {
        Err(AnalyzerError::Unavailable("connection refused".to_string()))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

/// How the in-memory store answers inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBehavior {
    Accept,
    Unavailable,
    Reject,
}

/// Feedback store that keeps rows in memory.
pub struct InMemoryStore {
    rows: Mutex<Vec<FeedbackRecord>>,
    behavior: StoreBehavior,
}

impl InMemoryStore {
    pub fn new(behavior: StoreBehavior) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            behavior,
        })
    }

    pub fn rows(&self) -> Vec<FeedbackRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryStore {
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        match self.behavior {
            StoreBehavior::Accept => {
                self.rows.lock().unwrap().push(record.clone());
                Ok(())
            }
            StoreBehavior::Unavailable => Err(StoreError::Timeout),
            StoreBehavior::Reject => Err(StoreError::Rejected {
                status: 400,
                message: "PropertyValueTooLarge".to_string(),
            }),
        }
    }
}

/// Router with the built-in analyzer and the given store.
pub fn create_test_app(config: Config, store: Option<Arc<InMemoryStore>>) -> Router {
    create_app(
        config,
        builtin_anonymizer(),
        store.map(|s| s as Arc<dyn FeedbackStore>),
    )
}

/// A complete, valid submission.
pub fn feedback_payload() -> Value {
    json!({
        "overall_response_quality": 4,
        "overall_document_quality": 5,
        "verbatim": "Helpful, the guide at https://contoso.com/kb/123 fixed it",
        "inaccurate_answer": false,
        "missing_info": false,
        "too_long": false,
        "too_short": false,
        "confusing": false,
        "offensive": false,
        "biased": false,
        "outdated": false,
        "repetitive": false,
        "fantastic": true,
        "case_number": "CAS-01234",
        "question_id": "q-42",
        "question": "Where is the VPN guide?",
        "answer_id": "a-42",
        "answer": "Follow the VPN setup steps in the portal.",
        "contentIndex": "support-index",
        "top_docs": [
            {"title": "VPN setup", "filepath": "docs/vpn.md"},
            {"title": "Remote access", "filepath": "docs/remote.md"}
        ],
        "in_domain": true
    })
}

/// A valid submission with random filler text in every free-text field.
pub fn random_feedback_payload() -> Value {
    let mut payload = feedback_payload();
    payload["verbatim"] = json!(Sentence(3..8).fake::<String>());
    payload["question"] = json!(Sentence(3..8).fake::<String>());
    payload["answer"] = json!(Sentence(3..8).fake::<String>());
    payload
}

/// Build a JSON POST request.
pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    raw_json_request(uri, serde_json::to_string(body).unwrap())
}

/// Build a POST request with an arbitrary body and a JSON content type.
pub fn raw_json_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

/// Build a GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read the response body as bytes.
pub async fn response_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Parse the response body as JSON, `Null` if it is not JSON.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    serde_json::from_slice(&response_bytes(response).await).unwrap_or(Value::Null)
}
