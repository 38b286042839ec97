//! Persistence layer for the ESAI feedback backend.
//!
//! This crate contains:
//! - Storage connection-string parsing
//! - An Azure Table Storage REST client with shared-key and SAS auth
//! - Repository implementations for feedback rows

pub mod connection;
pub mod error;
pub mod metrics;
pub mod repositories;
pub mod table;

pub use connection::{ConnectionString, ConnectionStringError, Credentials};
pub use error::StoreError;
pub use table::TableClient;
