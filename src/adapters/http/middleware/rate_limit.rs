//! Rate limiting middleware for axum.
//!
//! Checks the global ceiling first, then the caller's IP window. Status is
//! reported in standard headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Unix timestamp when the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)
//!
//! A failing limiter lets requests through.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::ports::{RateLimitDenied, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter};

/// Rate limiter middleware state.
///
/// Forwarded headers are only believed when the socket peer is one of
/// `trusted_proxies`.
#[derive(Clone)]
pub struct RateLimiterState {
    limiter: Arc<dyn RateLimiter>,
    trusted_proxies: Arc<[IpAddr]>,
}

impl RateLimiterState {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            limiter,
            trusted_proxies: Arc::from(Vec::new()),
        }
    }

    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::from(proxies);
        self
    }
}

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

pub async fn rate_limit_middleware(
    State(state): State<RateLimiterState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    match state.limiter.check(RateLimitKey::global()).await {
        Ok(RateLimitResult::Denied(denied)) => return rate_limit_response(&denied),
        Ok(RateLimitResult::Allowed(_)) => {}
        Err(e) => tracing::warn!(error = %e, "Rate limiter unavailable for global check"),
    }

    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());
    let client_ip = client_ip(request.headers(), peer, &state.trusted_proxies);

    let ip_status = match client_ip {
        Some(ip) => match state.limiter.check(RateLimitKey::ip(&ip.to_string())).await {
            Ok(RateLimitResult::Denied(denied)) => {
                tracing::info!(client_ip = %ip, "Rate limit exceeded");
                return rate_limit_response(&denied);
            }
            Ok(RateLimitResult::Allowed(status)) => Some(status),
            Err(e) => {
                tracing::warn!(error = %e, "Rate limiter unavailable for IP check");
                None
            }
        },
        None => {
            tracing::debug!("No peer address on request; per-IP limit skipped");
            None
        }
    };

    let mut response = next.run(request).await;
    if let Some(status) = ip_status {
        add_rate_limit_headers(response.headers_mut(), &status);
    }
    response
}

/// Address the per-IP window is keyed on.
///
/// An untrusted peer is the client. Behind a trusted proxy, `X-Forwarded-For`
/// is walked from the right (the hop our proxy appended) and the first
/// address that is not itself a trusted proxy wins. Entries further left are
/// client-supplied and never consulted.
fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted: &[IpAddr]) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted.contains(&peer) {
        return Some(peer);
    }

    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .collect();

    for hop in hops.into_iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted.contains(&ip) => continue,
            Ok(ip) => return Some(ip),
            Err(_) => break,
        }
    }
    Some(peer)
}

fn rate_limit_response(denied: &RateLimitDenied) -> Response {
    tracing::debug!(scope = %denied.scope, retry_after = denied.retry_after_secs, "Request throttled");

    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new("RATE_LIMIT_EXCEEDED", denied.message.clone())),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(denied.limit));
    headers.insert(headers::X_RATELIMIT_REMAINING.clone(), HeaderValue::from(0u32));
    headers.insert(
        axum::http::header::RETRY_AFTER,
        HeaderValue::from(denied.retry_after_secs),
    );
    response
}

fn add_rate_limit_headers(headers: &mut HeaderMap, status: &RateLimitStatus) {
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(status.limit));
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(status.remaining),
    );
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(status.reset_at.as_unix_secs()),
    );
}
