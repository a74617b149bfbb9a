//! Application router: routes, middleware, and cross-cutting layers.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::error::fallback_not_found;
use super::middleware::{auth_middleware, AuthState, RateLimiterState};
use super::payment::{health, payment_router, PaymentAppState};

/// Build the full HTTP application.
///
/// - `GET /health` - liveness, no auth
/// - `/api/payments/*` - session-authenticated, rate limited when a limiter is given
/// - `POST /api/webhook` - signature-authenticated
pub fn build_router(
    state: PaymentAppState,
    session_validator: AuthState,
    rate_limiter: Option<RateLimiterState>,
    server: &ServerConfig,
) -> Router {
    let api = payment_router(rate_limiter)
        .with_state(state)
        .layer(middleware::from_fn_with_state(session_validator, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(fallback_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    server.request_timeout_secs,
                )))
                .layer(cors_layer(&server.cors_origins_list())),
        )
}

/// Any origin when none are configured (development), otherwise the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}
