//! Route guard and session extractor
//!
//! The guard only looks at whether a token cookie is present; the upstream
//! API is the one that decides whether the token is still good.

use crate::api::ApiError;
use crate::auth::{decode_display_user, session_token, DisplayUser};
use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

fn is_admin_path(path: &str) -> bool {
    path == "/admin" || path.starts_with("/admin/")
}

/// Redirect anonymous `/admin/*` requests to the login page and logged-in
/// visitors of the login page to the dashboard
pub async fn route_guard(request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let authenticated = session_token(&jar).is_some();
    let path = request.uri().path();

    if is_admin_path(path) && !authenticated {
        debug!("Anonymous request to {}, redirecting to login", path);
        return Redirect::to(LOGIN_PATH).into_response();
    }

    if path == LOGIN_PATH && authenticated {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }

    next.run(request).await
}

/// Token and display user of the current request
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: DisplayUser,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar)
            .ok_or_else(|| AppError::Api(ApiError::Unauthorized("No session cookie".to_string())))?;
        let user = decode_display_user(&token);

        Ok(Self { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/login", get(|| async { "login" }))
            .route("/admin/dashboard", get(|| async { "dashboard" }))
            .route("/daftar", get(|| async { "intake" }))
            .layer(middleware::from_fn(route_guard))
    }

    async fn send(uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    fn location(response: &Response) -> Option<&str> {
        response.headers().get("location").and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_anonymous_admin_request_goes_to_login() {
        let response = send("/admin/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn test_logged_in_login_request_goes_to_dashboard() {
        let response = send("/login", Some("token=abc")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/admin/dashboard"));
    }

    #[tokio::test]
    async fn test_passthrough_cases() {
        assert_eq!(send("/admin/dashboard", Some("token=abc")).await.status(), StatusCode::OK);
        assert_eq!(send("/login", None).await.status(), StatusCode::OK);
        assert_eq!(send("/daftar", None).await.status(), StatusCode::OK);
        assert_eq!(send("/login", Some("token=")).await.status(), StatusCode::OK);
    }

    #[test]
    fn test_admin_path_matching() {
        assert!(is_admin_path("/admin"));
        assert!(is_admin_path("/admin/datel/1"));
        assert!(!is_admin_path("/administrator"));
    }
}
