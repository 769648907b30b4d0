//! Indibiz admin portal
//!
//! Server-rendered admin dashboard and public registration form for the
//! Indibiz onboarding API. Every record lives upstream; this process only
//! renders pages, keeps the session token in a cookie and forwards
//! mutations.

mod api;
mod auth;
mod config;
mod error;
mod flash;
mod form;
mod pagination;
mod resources;
mod routes;
mod state;
mod table;
mod validation;
mod views;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    let _ = dotenvy::dotenv();

    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Indibiz admin portal...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");
    info!(
        "🔗 Upstream API: {} (timeout {}s)",
        settings.api.base_url,
        settings.api.timeout.as_secs()
    );
    if !settings.cookie.secure {
        info!("🍪 Cookies are not marked Secure (APP_ENV is not production)");
    }

    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    let state = Arc::new(
        AppState::new(settings).map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?,
    );

    // Build the router
    let app = create_router(state);

    info!("🌐 Server listening on http://{}", addr);
    info!("   GET  /daftar           - Public registration form");
    info!("   GET  /login            - Admin login");
    info!("   GET  /admin/dashboard  - Admin dashboard");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,indibiz_admin=debug,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
