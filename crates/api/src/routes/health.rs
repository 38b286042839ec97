//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub pii_analyzer: AnalyzerHealth,
    pub storage: StorageHealth,
}

/// PII analyzer health status.
#[derive(Debug, Serialize)]
pub struct AnalyzerHealth {
    pub name: String,
    pub available: bool,
    pub latency_ms: Option<u64>,
}

/// Table storage status. Persistence is optional, so this never fails the check.
#[derive(Debug, Serialize)]
pub struct StorageHealth {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Simple status response for liveness and readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Feedback cannot be accepted without the analyzer, so an unavailable
/// analyzer makes the service unhealthy.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();
    let available = state.anonymizer.analyzer_available().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let response = HealthResponse {
        status: if available { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pii_analyzer: AnalyzerHealth {
            name: state.anonymizer.analyzer_name().to_string(),
            available,
            latency_ms: available.then_some(latency_ms),
        },
        storage: StorageHealth {
            configured: state.store.is_some(),
            table: state
                .store
                .as_ref()
                .map(|_| state.config.storage.table_name.clone()),
        },
    };

    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness check endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness check endpoint.
///
/// Returns 200 OK when the PII analyzer can accept requests.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if state.anonymizer.analyzer_available().await {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.3.0".to_string(),
            pii_analyzer: AnalyzerHealth {
                name: "builtin".to_string(),
                available: true,
                latency_ms: Some(0),
            },
            storage: StorageHealth {
                configured: false,
                table: None,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["pii_analyzer"]["name"], "builtin");
        assert_eq!(json["storage"]["configured"], false);
        assert!(json["storage"].get("table").is_none());
    }

    #[test]
    fn test_status_response() {
        let response = StatusResponse {
            status: "alive".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"status":"alive"}"#
        );
    }
}
