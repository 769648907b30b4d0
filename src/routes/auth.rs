//! Login and logout pages

use crate::auth::{self, session_cookie, Credentials};
use crate::error::AppResult;
use crate::flash::{self, Flash};
use crate::form::summarize_errors;
use crate::state::SharedState;
use crate::views::{Shell, Theme};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::info;
use validator::Validate;

fn render_login(
    state: &SharedState,
    jar: CookieJar,
    username: &str,
    toast: Option<Flash>,
) -> AppResult<Response> {
    let shell = Shell::public("Masuk", Theme::from_jar(&jar), toast);
    let html = state
        .views
        .page("login", &shell, &json!({ "username": username }))?;
    Ok((jar, html).into_response())
}

/// GET /login
pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> AppResult<Response> {
    let (jar, toast) = flash::take(jar);
    render_login(&state, jar, "", toast)
}

/// POST /login
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    if let Err(errors) = credentials.validate() {
        let toast = Flash::error(summarize_errors(&errors));
        return render_login(&state, jar, &credentials.username, Some(toast));
    }

    let Some(outcome) = auth::login(&state.api, &credentials).await else {
        let toast = Flash::error("Login gagal. Periksa username dan password Anda.");
        return render_login(&state, jar, &credentials.username, Some(toast));
    };

    let jar = jar.add(session_cookie(outcome.token, state.secure_cookies()));
    let jar = flash::set(jar, Flash::success(format!("Selamat datang, {}", outcome.user.name)));

    Ok((jar, Redirect::to("/admin/dashboard")).into_response())
}

/// POST /logout
pub async fn logout(jar: CookieJar) -> Response {
    let (jar, had_token) = auth::logout(jar);
    if had_token {
        info!("Session ended by user");
    }

    let jar = flash::set(jar, Flash::success("Anda telah keluar"));
    (jar, Redirect::to("/login")).into_response()
}
