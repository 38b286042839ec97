//! Azure Table Storage REST client.
//!
//! Only the operations the service needs are implemented: inserting an
//! entity and creating a table. Requests are authorized with either a
//! SharedKeyLite signature or a SAS token taken from the connection string.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::crypto::hmac_sha256_base64;
use tracing::{debug, warn};

use crate::connection::{ConnectionString, Credentials};
use crate::error::StoreError;
use crate::metrics::{record_operation_failure, OperationTimer};

const API_VERSION: &str = "2019-02-02";
const DATA_SERVICE_VERSION: &str = "3.0;NetFx";
const ACCEPT_NO_METADATA: &str = "application/json;odata=nometadata";
const TABLES_RESOURCE: &str = "Tables";
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Builds the SharedKeyLite string-to-sign for the table service.
///
/// `path` is the URL path of the request, including any account segment of
/// a path-style (emulator) endpoint.
pub fn string_to_sign(date: &str, account: &str, path: &str) -> String {
    format!("{}\n/{}{}", date, account, path)
}

/// Builds the `Authorization` header value for a SharedKeyLite request.
pub fn shared_key_lite_authorization(
    account: &str,
    key: &[u8],
    date: &str,
    path: &str,
) -> Result<String, StoreError> {
    let signature = hmac_sha256_base64(key, &string_to_sign(date, account, path))
        .map_err(|e| StoreError::Signing(e.to_string()))?;
    Ok(format!("SharedKeyLite {}:{}", account, signature))
}

#[derive(Debug, Deserialize)]
struct ODataErrorBody {
    #[serde(rename = "odata.error")]
    error: ODataError,
}

#[derive(Debug, Deserialize)]
struct ODataError {
    code: String,
    #[serde(default)]
    message: Option<ODataMessage>,
}

#[derive(Debug, Deserialize)]
struct ODataMessage {
    value: String,
}

/// Extracts a readable message from a table service error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ODataErrorBody>(body) {
        Ok(parsed) => match parsed.error.message {
            Some(message) => format!("{}: {}", parsed.error.code, message.value),
            None => parsed.error.code,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}

/// Client for a single storage account's table service.
#[derive(Debug, Clone)]
pub struct TableClient {
    http: Client,
    connection: ConnectionString,
}

impl TableClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(connection: ConnectionString, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;

        Ok(Self { http, connection })
    }

    /// Inserts `entity` into `table`. An existing row with the same keys
    /// yields [`StoreError::Conflict`].
    pub async fn insert_entity<T: Serialize>(
        &self,
        table: &str,
        entity: &T,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_vec(entity)?;
        let timer = OperationTimer::new("insert_entity");
        let result = self.send(Method::POST, table, body).await;
        timer.record();

        let (status, text) = result.map_err(|e| {
            record_operation_failure("insert_entity", e.kind());
            e
        })?;

        match status {
            StatusCode::NO_CONTENT | StatusCode::CREATED => {
                debug!(table = %table, "Inserted table entity");
                Ok(())
            }
            status => {
                let err = status_error(status, &text);
                record_operation_failure("insert_entity", err.kind());
                Err(err)
            }
        }
    }

    /// Creates `table`. Returns `false` when the table already exists.
    pub async fn create_table_if_not_exists(&self, table: &str) -> Result<bool, StoreError> {
        let body = serde_json::to_vec(&json!({ "TableName": table }))?;
        let timer = OperationTimer::new("create_table");
        let result = self.send(Method::POST, TABLES_RESOURCE, body).await;
        timer.record();

        let (status, text) = result.map_err(|e| {
            record_operation_failure("create_table", e.kind());
            e
        })?;

        match status {
            StatusCode::NO_CONTENT | StatusCode::CREATED => Ok(true),
            StatusCode::CONFLICT => Ok(false),
            status => {
                let err = status_error(status, &text);
                record_operation_failure("create_table", err.kind());
                Err(err)
            }
        }
    }

    fn resource_url(&self, resource: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&format!("{}/{}", self.connection.table_endpoint, resource))
            .map_err(|e| StoreError::Http(format!("invalid table endpoint: {}", e)))?;
        if let Credentials::Sas { token } = &self.connection.credentials {
            url.set_query(Some(token));
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        resource: &str,
        body: Vec<u8>,
    ) -> Result<(StatusCode, String), StoreError> {
        let url = self.resource_url(resource)?;
        let date = Utc::now().format(RFC1123_FORMAT).to_string();

        let mut request = self
            .http
            .request(method, url.clone())
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header("DataServiceVersion", DATA_SERVICE_VERSION)
            .header("MaxDataServiceVersion", DATA_SERVICE_VERSION)
            .header("Accept", ACCEPT_NO_METADATA)
            .header("Content-Type", "application/json")
            .header("Prefer", "return-no-content")
            .body(body);

        if let Credentials::SharedKey { account_key } = &self.connection.credentials {
            let authorization = shared_key_lite_authorization(
                &self.connection.account_name,
                account_key,
                &date,
                url.path(),
            )?;
            request = request.header("Authorization", authorization);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Ok((status, text))
    }
}

fn status_error(status: StatusCode, body: &str) -> StoreError {
    let message = error_message(body);
    match status {
        StatusCode::CONFLICT => StoreError::Conflict,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            warn!(status = status.as_u16(), message = %message, "Table service unavailable");
            StoreError::Unavailable(message)
        }
        status => StoreError::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}
