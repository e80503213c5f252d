mod rate_limit;

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, State};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use madadgar_agents::{DispatchAgent, DispatchError, LogNotifier};
use madadgar_core::{DispatchRequest, Lexicon};
use madadgar_observability::AppMetrics;
use madadgar_resolver::FacilityResolver;
use madadgar_storage::Store;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::RequestLimiter;

const MAX_BODY_BYTES: usize = 32 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<DispatchAgent<Store, LogNotifier>>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: RequestLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: madadgar_observability::MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    live_tier: bool,
    local_facilities: usize,
    sqlite: bool,
}

pub async fn build_app(data_root: impl AsRef<Path>) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let lexicon = Arc::new(Lexicon::standard());
    let resolver = Arc::new(FacilityResolver::from_env(data_root)?);

    let store = if let Ok(database_url) = env::var("MADADGAR_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let agent = Arc::new(DispatchAgent::new(
        lexicon,
        resolver,
        LogNotifier,
        Arc::new(store),
        metrics.clone(),
    ));

    let rate_limit_window = Duration::from_secs(
        env::var("MADADGAR_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("MADADGAR_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);

    let state = ApiState {
        agent,
        metrics,
        limiter: RequestLimiter::new(rate_limit_window, rate_limit_max),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/dispatch", post(dispatch))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

fn build_cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = env::var("MADADGAR_ALLOWED_ORIGINS")
        .ok()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
                .collect()
        })
        .unwrap_or_default();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let caller = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .unwrap_or("unknown")
        .trim()
        .to_string();

    if !state.limiter.allow(&caller) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "Too many requests, slow down"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            live_tier: state.agent.resolver().has_live_tier(),
            local_facilities: state
                .agent
                .resolver()
                .dataset()
                .map(|dataset| dataset.len())
                .unwrap_or(0),
            sqlite: env::var("MADADGAR_DATABASE_URL").is_ok(),
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn dispatch(
    State(state): State<ApiState>,
    Json(request): Json<DispatchRequest>,
) -> Response {
    match state.agent.handle(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(DispatchError::EmptyText) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "empty_text",
                "message": "Dispatch text must not be empty"
            })),
        )
            .into_response(),
        Err(DispatchError::Resolve(error)) => {
            tracing::error!(%error, "facility resolution misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "missing_static_contact",
                    "message": error.to_string()
                })),
            )
                .into_response()
        }
    }
}
