//! Shared utilities and common types for the ESAI feedback backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (HMAC request signing)
//! - Serde helpers for strict JSON payloads
//! - Common validation logic

pub mod crypto;
pub mod serde_ext;
pub mod validation;
