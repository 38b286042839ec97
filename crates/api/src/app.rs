use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::Anonymizer;
use persistence::repositories::FeedbackStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id, SecurityHeaders,
};
use crate::routes::{feedback, health, index_date};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub anonymizer: Anonymizer,
    /// `None` when no connection string is configured.
    pub store: Option<Arc<dyn FeedbackStore>>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(
    config: Config,
    anonymizer: Anonymizer,
    store: Option<Arc<dyn FeedbackStore>>,
) -> Router {
    let config = Arc::new(config);
    let cors = cors_layer(&config);
    let security_headers = SecurityHeaders {
        hsts: config.security.hsts_enabled,
    };

    let state = AppState {
        config: config.clone(),
        anonymizer,
        store,
    };

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let feedback_routes = Router::new()
        .route("/feedback", post(feedback::submit_feedback))
        .route("/azureindexdate", get(index_date::azure_index_date));

    Router::new()
        .merge(public_routes)
        .merge(feedback_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
