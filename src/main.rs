//! Zenith payments service entry point.
//!
//! Loads configuration from `ZENITH__*` environment variables (and `.env`),
//! wires adapters to the payment handlers, and serves the HTTP API until
//! SIGINT or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use zenith_payments::adapters::audit::TracingAuditLog;
use zenith_payments::adapters::auth::JwtSessionValidator;
use zenith_payments::adapters::http::middleware::RateLimiterState;
use zenith_payments::adapters::http::{build_router, PaymentAppState};
use zenith_payments::adapters::memory::InMemoryPaymentStore;
use zenith_payments::adapters::postgres::{
    PostgresAuditLog, PostgresEntitlementRepository, PostgresPaymentRepository,
};
use zenith_payments::adapters::razorpay::{RazorpayConfig, RazorpayGateway};
use zenith_payments::adapters::rate_limiter::InMemoryRateLimiter;
use zenith_payments::config::{AppConfig, DatabaseConfig, LogFormat, ServerConfig};
use zenith_payments::ports::{AuditLog, EntitlementRepository, PaymentRepository, RateLimiter};

type Stores = (
    Arc<dyn PaymentRepository>,
    Arc<dyn EntitlementRepository>,
    Arc<dyn AuditLog>,
);

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    match server.effective_log_format() {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn connect_stores(database: Option<&DatabaseConfig>) -> anyhow::Result<Stores> {
    let Some(database) = database else {
        warn!("No database configured; payments are kept in memory and lost on restart");
        let store = Arc::new(InMemoryPaymentStore::new());
        let payments: Arc<dyn PaymentRepository> = store.clone();
        let entitlements: Arc<dyn EntitlementRepository> = store;
        let audit_log: Arc<dyn AuditLog> = Arc::new(TracingAuditLog::new());
        return Ok((payments, entitlements, audit_log));
    };

    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(database.connection_url())
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(max_connections = database.max_connections, "Database pool ready");

    if database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply database migrations")?;
        info!("Database migrations applied");
    }

    let payments: Arc<dyn PaymentRepository> =
        Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let entitlements: Arc<dyn EntitlementRepository> =
        Arc::new(PostgresEntitlementRepository::new(pool.clone()));
    let audit_log: Arc<dyn AuditLog> = Arc::new(PostgresAuditLog::new(pool));
    Ok((payments, entitlements, audit_log))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        gateway_mode = if config.payment.is_live_mode() { "live" } else { "test" },
        "Starting Zenith payments service"
    );

    let (payments, entitlements, audit_log) = connect_stores(config.database.as_ref()).await?;

    let gateway_config = RazorpayConfig::new(
        config.payment.razorpay_key_id.clone(),
        config.payment.razorpay_key_secret.clone(),
    )
    .with_base_url(config.payment.api_base_url.clone())
    .with_timeout(Duration::from_secs(config.payment.gateway_timeout_secs));
    let gateway = RazorpayGateway::new(gateway_config).context("failed to build gateway client")?;

    let state = PaymentAppState::new(
        Arc::new(gateway),
        payments,
        entitlements,
        audit_log,
        &config.payment,
        &config.ebook,
    );

    let session_validator = Arc::new(JwtSessionValidator::new(&config.auth));

    let rate_limiter = if config.rate_limit.enabled {
        let limiter: Arc<dyn RateLimiter> =
            Arc::new(InMemoryRateLimiter::new(config.rate_limit.clone()));
        let trusted_proxies = config.rate_limit.trusted_proxy_list()?;
        if !trusted_proxies.is_empty() {
            info!(count = trusted_proxies.len(), "Honouring X-Forwarded-For from trusted proxies");
        }
        Some(RateLimiterState::new(limiter).with_trusted_proxies(trusted_proxies))
    } else {
        warn!("Rate limiting disabled");
        None
    };

    let app = build_router(state, session_validator, rate_limiter, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}
