//! Route definitions and router setup
//!
//! Public pages (login, intake), the guarded `/admin` area and the bits of
//! chrome every page needs (theme toggle, stylesheet).

mod auth;
mod dashboard;
mod intake;

use crate::auth::route_guard;
use crate::error::AppError;
use crate::resources::{
    self, datel::DatelResource, kategori_paket::KategoriPaketResource, promo::PromoResource,
    sales::SalesResource, settings::SettingsResource,
};
use crate::state::SharedState;
use crate::views::Theme;
use axum::{
    http::{header, HeaderMap, Uri},
    middleware::from_fn,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

const STYLESHEET: &str = include_str!("../static/app.css");

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState) -> Router {
    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/", get(|| async { Redirect::to("/daftar") }))
        .route("/static/app.css", get(stylesheet))
        .route("/theme", post(toggle_theme))

        // Session
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))

        // Public intake
        .route("/daftar", get(intake::start).post(intake::step))

        // Admin area
        .route("/admin", get(|| async { Redirect::to("/admin/dashboard") }))
        .route("/admin/dashboard", get(dashboard::dashboard))
        .merge(resources::routes::<DatelResource>())
        .merge(resources::routes::<KategoriPaketResource>())
        .merge(resources::routes::<PromoResource>())
        .merge(resources::routes::<SalesResource>())
        .merge(resources::routes::<SettingsResource>())
        .fallback(not_found)

        // Apply middleware and state
        .layer(from_fn(route_guard))
        .layer(middleware)
        .with_state(state)
}

/// Unknown paths render the error page
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Halaman {} tidak ditemukan", uri.path()))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}

/// Where to go after a form posted from some page: back to that page when the
/// referer is one of ours, else home
fn back_to(headers: &HeaderMap) -> String {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| url::Url::parse(v).ok());

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    match (referer, host) {
        (Some(url), Some(host)) if url.host_str().is_some() && url_authority(&url) == host => {
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        }
        _ => "/".to_string(),
    }
}

fn url_authority(url: &url::Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}

/// POST /theme
async fn toggle_theme(jar: CookieJar, headers: HeaderMap) -> impl IntoResponse {
    let theme = Theme::from_jar(&jar).toggled();
    (jar.add(theme.cookie()), Redirect::to(&back_to(&headers)))
}
