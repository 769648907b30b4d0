//! Landing page with resource totals

use crate::api::{ApiClient, ListEnvelope, RequestOptions};
use crate::auth::{Role, Session};
use crate::error::{AppError, AppResult};
use crate::flash;
use crate::state::SharedState;
use crate::views::{Shell, Theme};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Serialize)]
struct Stat {
    label: &'static str,
    href: String,
    total: Option<u64>,
    failed: bool,
}

/// (label, upstream path) pairs shown to a role
fn counted(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Admin => &[
            ("Datel", "datel"),
            ("Kategori Paket", "kategori-paket"),
            ("Promo", "promo"),
            ("Sales", "sales"),
        ],
        Role::Agency => &[("Sales", "sales")],
    }
}

/// Total records of a resource, read from a one-row page
async fn count(api: &ApiClient, token: &str, path: &str) -> Result<u64, AppError> {
    let opts = RequestOptions::authed(token).param("page", 1).param("limit", 1);
    let envelope: ListEnvelope<Value> = api.get(&format!("/{}", path), &opts).await?.json()?;
    Ok(envelope.result.pagination.total)
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, toast) = flash::take(jar);

    let mut stats = Vec::new();
    for &(label, path) in counted(session.user.role) {
        let total = match count(&state.api, &session.token, path).await {
            Ok(total) => Some(total),
            Err(e) if e.is_session_expired() => return Err(e),
            Err(e) => {
                warn!("Counting {} failed: {}", path, e);
                None
            }
        };
        stats.push(Stat {
            label,
            href: format!("/admin/{}", path),
            total,
            failed: total.is_none(),
        });
    }

    let shell = Shell::admin("Dashboard", "/admin/dashboard", &session.user, Theme::from_jar(&jar), toast);
    let html = state.views.page("dashboard", &shell, &json!({ "stats": stats }))?;

    Ok((jar, html).into_response())
}

#[cfg(test)]
mod tests {
    use crate::resources::test_support::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn total(n: u64) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "result": {"data": [], "pagination": {"page": 1, "limit": 1, "total": n, "totalPages": n}}
        }))
    }

    #[tokio::test]
    async fn test_admin_sees_every_total() {
        let server = MockServer::start().await;
        for (p, n) in [("/datel", 12), ("/kategori-paket", 4), ("/promo", 7)] {
            Mock::given(method("GET"))
                .and(path(p))
                .and(query_param("limit", "1"))
                .respond_with(total(n))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/sales"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/dashboard", &token_for("admin"))).await;
        assert_eq!(response.status(), 200);
        let html = body_text(response).await;
        assert!(html.contains("Selamat datang, Rina"));
        assert!(html.contains(">12<"));
        assert!(html.contains(">7<"));
        assert!(html.contains(">-<"));
    }

    #[tokio::test]
    async fn test_agency_only_counts_sales() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sales"))
            .respond_with(total(3))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/dashboard", &token_for("agency"))).await;
        let html = body_text(response).await;
        assert!(html.contains("Sales"));
        assert!(!html.contains("Kategori Paket"));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
