use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiError, ErrorCode};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Rate-limit bucket shared by callers that present no bearer token.
const ANONYMOUS_CALLER: &str = "anonymous";

/// Request id carried in request extensions for handlers and error bodies.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    fn of(req: &Request) -> String {
        req.extensions()
            .get::<Self>()
            .map(|id| id.0.clone())
            .unwrap_or_default()
    }
}

/// Bearer keys accepted on the directory routes.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Reads comma-separated keys from `GHARSEWA_API_KEYS`.
    ///
    /// An empty list is only accepted in development, where it turns auth off.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("GHARSEWA_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    pub(crate) fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let api_keys: HashSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .collect();
        let enabled = !api_keys.is_empty();

        anyhow::ensure!(
            enabled || is_development,
            "GHARSEWA_API_KEYS must list at least one bearer token outside development"
        );
        if !enabled {
            tracing::warn!("GHARSEWA_API_KEYS is empty; directory routes are unauthenticated");
        }

        Ok(Self {
            api_keys: Arc::new(api_keys),
            enabled,
        })
    }

    /// Checks every configured key in constant time.
    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(subtle::Choice::from(0), |found, key| {
                found | key.as_bytes().ct_eq(token.as_bytes())
            })
            .into()
    }
}

#[derive(Debug)]
struct CallerWindow {
    opened: Instant,
    used: usize,
}

/// Fixed-window request budget, tracked separately for each bearer token.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    callers: Arc<Mutex<HashMap<String, CallerWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            callers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request against `caller`; `false` once its window is spent.
    async fn admit(&self, caller: &str) -> bool {
        let now = Instant::now();
        let window = self.window;
        let mut callers = self.callers.lock().await;

        callers.retain(|_, slot| now.duration_since(slot.opened) < window);
        let slot = callers
            .entry(caller.to_owned())
            .or_insert(CallerWindow {
                opened: now,
                used: 0,
            });

        if slot.used >= self.max_requests {
            return false;
        }
        slot.used += 1;
        true
    }
}

/// Propagates an inbound `x-request-id` or mints a `UUIDv4`, and echoes it on
/// the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get(REQUEST_ID_HEADER).map(HeaderValue::to_str) {
        Some(Ok(inbound)) if !inbound.is_empty() => inbound.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    let echoed = HeaderValue::from_str(&id).ok();
    req.extensions_mut().insert(RequestId(id));

    let mut res = next.run(req).await;
    if let Some(value) = echoed {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    let admitted = !auth.enabled
        || bearer_token(req.headers().get(AUTHORIZATION)).is_some_and(|token| auth.allows(token));
    if admitted {
        return next.run(req).await;
    }

    ApiError::new(
        RequestId::of(&req),
        ErrorCode::Unauthorized,
        "missing or invalid bearer token",
    )
    .into_response()
}

/// Runs inside [`require_bearer_auth`], so the bucket key is an accepted key
/// whenever auth is on.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(req.headers().get(AUTHORIZATION)).unwrap_or(ANONYMOUS_CALLER);
    if limiter.admit(caller).await {
        return next.run(req).await;
    }

    let request_id = RequestId::of(&req);
    tracing::warn!(request_id = %request_id, uri = %req.uri(), "rate limit exceeded");
    ApiError::new(request_id, ErrorCode::RateLimited, "rate limit exceeded").into_response()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
