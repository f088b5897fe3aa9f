//! Request handler for the time endpoint.

use axum::extract::{Query, State};
use axum::http::header::{HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::ident;
use crate::ratelimit::{Decision, RateLimiter};
use crate::timezone;

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: RateLimiter,
    pub limit: u64,
    pub window_secs: u64,
}

/// Query parameters accepted by the time endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TimeQuery {
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    simple: Option<String>,
}

impl TimeQuery {
    fn wants_simple(&self) -> bool {
        self.simple.as_deref() == Some("true")
    }

    fn wants_text(&self) -> bool {
        self.format.as_deref() == Some("text")
    }
}

/// Serve the current Pakistan Standard Time.
///
/// Resolves the client address from proxy headers, checks the rate limit for
/// it, then renders the payload in the requested shape. Quota metadata is
/// reported on every response, including denials.
pub async fn time_handler(
    State(state): State<AppState>,
    Query(query): Query<TimeQuery>,
    headers: HeaderMap,
) -> Response {
    let client = ident::client_ip(&headers);

    let decision = match state
        .limiter
        .check(&client, state.limit, state.window_secs)
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            error!(error = %e, "Rate limit check rejected configured parameters");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response();
        }
    };

    let mut response_headers = quota_headers(&decision);

    if !decision.success {
        warn!(client = %client, "Rate limit exceeded");
        response_headers.insert(
            RETRY_AFTER,
            HeaderValue::from(decision.retry_after_secs(crate::ratelimit::epoch_ms())),
        );
        let body = json!({
            "error": "Too many requests",
            "limit": decision.limit,
            "reset": decision.reset,
        });
        return (StatusCode::TOO_MANY_REQUESTS, response_headers, Json(body)).into_response();
    }

    debug!(client = %client, remaining = decision.remaining, "Serving current time");

    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=1"));

    let now = timezone::now_pkt();
    if query.wants_simple() {
        return (response_headers, Json(timezone::simple_response(now))).into_response();
    }

    if query.wants_text() {
        response_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        return (response_headers, timezone::text_response(now)).into_response();
    }

    (
        response_headers,
        Json(timezone::full_response(now, Utc::now())),
    )
        .into_response()
}

fn quota_headers(decision: &Decision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(RATELIMIT_LIMIT.clone(), HeaderValue::from(decision.limit));
    headers.insert(
        RATELIMIT_REMAINING.clone(),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(RATELIMIT_RESET.clone(), HeaderValue::from(decision.reset));
    headers
}
