//! HTTP API Server for Recommendations
//!
//! Provides the REST surface consumers call: a liveness probe and
//! per-model, per-user recommendation lookups behind a bearer token.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ApiConfig, Config};
use crate::error::Error;
use crate::recommendation::metrics::PerformanceTimer;
use crate::recommendation::{ItemId, ModelRegistry, UserId};

/// Shared application state
pub struct AppState {
    pub registry: ModelRegistry,
    pub token: String,
    pub k_recs: usize,
    pub max_user_id: u64,
}

impl AppState {
    pub fn new(registry: ModelRegistry, config: &Config) -> Self {
        Self {
            registry,
            token: config.auth.token.clone(),
            k_recs: config.recommendation.k_recs,
            max_user_id: config.recommendation.max_user_id,
        }
    }
}

/// Response for the recommendation endpoint
#[derive(Debug, Serialize)]
pub struct RecoResponse {
    pub user_id: UserId,
    pub items: Vec<ItemId>,
}

/// Build the application router
pub fn build_router(state: Arc<AppState>, api: &ApiConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/reco/:model_name/:user_id", get(get_reco))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(api.request_timeout));

    if api.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// Start the API server
pub async fn start_server(state: Arc<AppState>, api: &ApiConfig) -> Result<()> {
    let app = build_router(state, api);

    let addr = format!("{}:{}", api.host, api.port);
    info!("🚀 Starting recommendation API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> &'static str {
    "I am alive"
}

/// Serve recommendations for one user from one model
async fn get_reco(
    State(state): State<Arc<AppState>>,
    Path((model_name, user_id)): Path<(String, UserId)>,
    headers: HeaderMap,
) -> Result<Json<RecoResponse>, Error> {
    let _timer = PerformanceTimer::new("get_reco");

    info!("Request for model: {}, user_id: {}", model_name, user_id);

    authorize(&state.token, &headers)?;

    if !state.registry.contains(&model_name) {
        return Err(Error::not_found("model", model_name));
    }

    if user_id > state.max_user_id {
        return Err(Error::not_found("user", user_id.to_string()));
    }

    let items = state
        .registry
        .recommend(&model_name, user_id, state.k_recs)?;

    Ok(Json(RecoResponse { user_id, items }))
}

/// Check the bearer token against the configured service token
fn authorize(expected: &str, headers: &HeaderMap) -> Result<(), Error> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("authorization scheme must be Bearer"))?;

    if token != expected {
        return Err(Error::unauthorized("invalid bearer token"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize_accepts_matching_token() {
        assert!(authorize("secret", &headers_with("Bearer secret")).is_ok());
    }

    #[test]
    fn test_authorize_rejects_wrong_token() {
        let err = authorize("secret", &headers_with("Bearer nope")).unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
    }

    #[test]
    fn test_authorize_rejects_wrong_scheme() {
        let err = authorize("secret", &headers_with("Basic secret")).unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
    }

    #[test]
    fn test_authorize_rejects_missing_header() {
        let err = authorize("secret", &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, Error::Unauthorized { .. }));
    }
}
