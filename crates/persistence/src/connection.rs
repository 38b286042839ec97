//! Storage account connection strings.
//!
//! Parses the `Key=Value;...` format used by Azure storage accounts, e.g.
//! `DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=...;EndpointSuffix=core.windows.net`.

use std::fmt;
use std::str::FromStr;

use shared::crypto::{decode_signing_key, CryptoError};
use thiserror::Error;

/// Account name used by the local storage emulator.
pub const DEV_STORE_ACCOUNT: &str = "devstoreaccount1";

/// Publicly documented key of the local storage emulator.
pub const DEV_STORE_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

const DEV_STORE_TABLE_ENDPOINT: &str = "http://127.0.0.1:10002/devstoreaccount1";
const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Errors raised while parsing a connection string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("Connection string is empty")]
    Empty,

    #[error("Malformed connection string segment: {0}")]
    MalformedSegment(String),

    #[error("Connection string is missing AccountName")]
    MissingAccountName,

    #[error("Connection string has neither AccountKey nor SharedAccessSignature")]
    MissingCredentials,

    #[error("Invalid AccountKey: {0}")]
    InvalidAccountKey(#[from] CryptoError),
}

/// How requests to the table service are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Decoded account key used for SharedKeyLite signatures.
    SharedKey { account_key: Vec<u8> },
    /// Pre-signed SAS query string (without the leading `?`).
    Sas { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::SharedKey { .. } => f.write_str("SharedKey(<redacted>)"),
            Credentials::Sas { .. } => f.write_str("Sas(<redacted>)"),
        }
    }
}

/// Parsed storage connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    pub credentials: Credentials,
    /// Table service base URL without a trailing slash.
    pub table_endpoint: String,
}

impl ConnectionString {
    /// Connection to the local storage emulator.
    pub fn development() -> Result<Self, ConnectionStringError> {
        Ok(Self {
            account_name: DEV_STORE_ACCOUNT.to_string(),
            credentials: Credentials::SharedKey {
                account_key: decode_signing_key(DEV_STORE_KEY)?,
            },
            table_endpoint: DEV_STORE_TABLE_ENDPOINT.to_string(),
        })
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ConnectionStringError::Empty);
        }

        let mut protocol = None;
        let mut account_name = None;
        let mut account_key = None;
        let mut sas = None;
        let mut endpoint_suffix = None;
        let mut table_endpoint = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Values such as base64 keys may contain '=', so split on the first only.
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "usedevelopmentstorage" if value.eq_ignore_ascii_case("true") => {
                    return Self::development();
                }
                "defaultendpointsprotocol" => protocol = Some(value.to_string()),
                "accountname" => account_name = Some(value.to_string()),
                "accountkey" => account_key = Some(value.to_string()),
                "sharedaccesssignature" => {
                    sas = Some(value.trim_start_matches('?').to_string())
                }
                "endpointsuffix" => endpoint_suffix = Some(value.to_string()),
                "tableendpoint" => table_endpoint = Some(value.trim_end_matches('/').to_string()),
                _ => {}
            }
        }

        let account_name = account_name
            .filter(|name| !name.is_empty())
            .ok_or(ConnectionStringError::MissingAccountName)?;

        let credentials = match (account_key, sas) {
            (Some(key), _) => Credentials::SharedKey {
                account_key: decode_signing_key(&key)?,
            },
            (None, Some(token)) if !token.is_empty() => Credentials::Sas { token },
            _ => return Err(ConnectionStringError::MissingCredentials),
        };

        let table_endpoint = table_endpoint.unwrap_or_else(|| {
            format!(
                "{}://{}.table.{}",
                protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
                account_name,
                endpoint_suffix.as_deref().unwrap_or(DEFAULT_ENDPOINT_SUFFIX),
            )
        });

        Ok(Self {
            account_name,
            credentials,
            table_endpoint,
        })
    }
}
