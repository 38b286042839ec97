//! Domain layer for the ESAI feedback backend.
//!
//! This crate contains:
//! - Domain models (feedback submissions, persisted records, redaction policies)
//! - PII analysis and anonymization services
//! - Domain error types

pub mod models;
pub mod services;
