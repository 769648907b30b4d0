//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::api::ApiError;
use crate::auth::expired_session_cookie;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use tracing::{error, info};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Template error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Session expiry must end the session, never become a toast
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Api(e) if e.is_unauthorized())
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(e) => e.user_message(),
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg) => {
                msg.clone()
            }
            AppError::Render(_) | AppError::Config(_) => {
                "Terjadi kesalahan pada server".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_session_expired() {
            info!("Session expired, clearing token and redirecting to login");
            let jar = CookieJar::new().add(expired_session_cookie());
            return (jar, Redirect::to("/login")).into_response();
        }

        let (status, title) = match &self {
            AppError::Api(ApiError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "Server tidak merespons")
            }
            AppError::Api(ApiError::Network(e)) => {
                error!("Upstream unreachable: {:?}", e);
                (StatusCode::BAD_GATEWAY, "Gagal terhubung ke server")
            }
            AppError::Api(ApiError::Status { status, .. }) if status.is_client_error() => {
                (*status, "Permintaan ditolak")
            }
            AppError::Api(e) => {
                error!("Upstream error: {}", e);
                (StatusCode::BAD_GATEWAY, "Kesalahan server API")
            }
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "Permintaan tidak valid")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Halaman tidak ditemukan"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Akses ditolak"),
            AppError::Render(e) => {
                error!("Template error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Terjadi kesalahan")
            }
            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Terjadi kesalahan")
            }
        };

        (status, Html(error_page(status, title, &self.user_message()))).into_response()
    }
}

/// Standalone error page, independent of the template registry
fn error_page(status: StatusCode, title: &str, message: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="id">
<head><meta charset="utf-8"><title>{code} - {title}</title>
<meta name="viewport" content="width=device-width, initial-scale=1"></head>
<body class="error-page">
<main>
<h1>{code}</h1>
<h2>{title}</h2>
<p>{message}</p>
<p><a href="/admin/dashboard">Kembali ke dashboard</a></p>
</main>
</body>
</html>"#,
        code = status.as_u16(),
        title = handlebars::html_escape(title),
        message = handlebars::html_escape(message),
    )
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
