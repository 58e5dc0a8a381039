mod providers;
mod users;

use std::num::NonZeroUsize;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use gharsewa_db::PgDirectory;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
    REQUEST_ID_HEADER,
};

/// Default and maximum number of ranked providers per request.
#[derive(Debug, Clone, Copy)]
pub struct NearbyLimits {
    pub default: NonZeroUsize,
    pub max: NonZeroUsize,
}

impl NearbyLimits {
    #[must_use]
    pub fn from_config(config: &gharsewa_core::AppConfig) -> Self {
        let default = NonZeroUsize::new(config.nearby_default_limit).unwrap_or(NonZeroUsize::MIN);
        let max = NonZeroUsize::new(config.nearby_max_limit)
            .unwrap_or(default)
            .max(default);
        Self { default, max }
    }
}

impl Default for NearbyLimits {
    fn default() -> Self {
        Self {
            default: NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN),
            max: NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub directory: PgDirectory,
    pub limits: NearbyLimits,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, limits: NearbyLimits) -> Self {
        Self {
            directory: PgDirectory::new(pool),
            limits,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

/// Machine-readable error code; each one fixes the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    NotFound,
    RateLimited,
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl HealthData {
    const UP: Self = Self {
        status: "ok",
        database: "ok",
    };
    const DEGRADED: Self = Self {
        status: "degraded",
        database: "unavailable",
    };
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, ErrorCode::ValidationError, message)
    }

    pub(super) fn user_not_found(request_id: impl Into<String>, id: &str) -> Self {
        Self::new(request_id, ErrorCode::NotFound, format!("user '{id}' not found"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.error.code.status(), Json(self)).into_response()
    }
}

/// Clamp a caller-supplied limit into `[1, limits.max]`, defaulting when absent.
pub(super) fn normalize_limit(limit: Option<i64>, limits: NearbyLimits) -> NonZeroUsize {
    let Some(requested) = limit else {
        return limits.default;
    };
    let requested = usize::try_from(requested.max(1)).unwrap_or(usize::MAX);
    NonZeroUsize::new(requested)
        .unwrap_or(NonZeroUsize::MIN)
        .min(limits.max)
}

pub(super) fn map_db_error(request_id: String, error: &gharsewa_db::DbError) -> ApiError {
    tracing::error!(error = %error, "directory store request failed");
    ApiError::new(request_id, ErrorCode::InternalError, "directory store unavailable")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/providers/nearby",
            get(providers::list_nearby_providers),
        )
        .route("/api/v1/users/{id}", get(users::get_user))
        .route(
            "/api/v1/users/{id}/location",
            put(users::record_user_location),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let (status, data) = match gharsewa_db::health_check(state.directory.pool()).await {
        Ok(()) => (StatusCode::OK, HealthData::UP),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, HealthData::DEGRADED)
        }
    };
    (
        status,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
