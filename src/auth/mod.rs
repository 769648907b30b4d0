//! Authentication and session module
//!
//! Login/logout against the upstream API and the cookie that carries the
//! bearer token between requests.

mod jwt;
mod middleware;

pub use jwt::decode_display_user;
pub use middleware::{route_guard, Session};

use crate::api::{ApiClient, RequestOptions};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

/// Cookie holding the bearer token
pub const TOKEN_COOKIE: &str = "token";

/// Token cookie lifetime
pub const SESSION_DAYS: i64 = 1;

/// Upstream login endpoint
const LOGIN_PATH: &str = "/auth/login";

/// Portal roles, used to pick the navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Admin,
    Agency,
}

impl Role {
    pub fn from_claim(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "agency" | "agensi" | "mitra" => Role::Agency,
            _ => Role::Admin,
        }
    }

    pub fn can_manage_master_data(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Agency => write!(f, "agency"),
        }
    }
}

/// Who is logged in, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayUser {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username wajib diisi"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password wajib diisi"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: DisplayUser,
}

/// POST the credentials upstream
///
/// Returns `None` on any failure; the caller decides how to tell the user.
pub async fn login(api: &ApiClient, credentials: &Credentials) -> Option<LoginOutcome> {
    let body = json!({
        "username": credentials.username,
        "password": credentials.password,
    });

    let response = match api.post(LOGIN_PATH, &body, &RequestOptions::public()).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Login failed for '{}': {}", credentials.username, e);
            return None;
        }
    };

    let parsed: LoginResponse = match response.json() {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Login response not understood: {}", e);
            return None;
        }
    };

    let token = parsed
        .data
        .and_then(|d| d.token)
        .filter(|t| parsed.success && !t.is_empty());

    let Some(token) = token else {
        warn!("Login rejected for '{}'", credentials.username);
        return None;
    };

    let user = decode_display_user(&token);
    info!("User '{}' logged in as {}", user.name, user.role);

    Some(LoginOutcome { token, user })
}

/// Cookie that stores the token for one day
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .max_age(time::Duration::days(SESSION_DAYS))
        .same_site(SameSite::Strict)
        .http_only(true)
        .secure(secure)
        .build()
}

/// Removal cookie for the token, valid whether or not the request had one
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((TOKEN_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Token carried by the request, if any
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Drop the token cookie; reports whether there was one
pub fn logout(jar: CookieJar) -> (CookieJar, bool) {
    let had_token = session_token(&jar).is_some();
    if had_token {
        (jar.add(expired_session_cookie()), true)
    } else {
        (jar, false)
    }
}
