//! Resource CRUD pages
//!
//! Every admin resource follows the same recipe: fetch one page upstream,
//! render it in the data table, open the form dialog for add/edit, send the
//! mutation upstream and redirect back to the list so it is fetched again.
//! A [`Resource`] implementation only describes the record shape.

pub mod datel;
pub mod kategori_paket;
pub mod promo;
pub mod sales;
pub mod settings;

use crate::api::{ApiClient, ListEnvelope, Page, RequestOptions};
use crate::auth::Session;
use crate::error::{AppError, AppResult};
use crate::flash::{self, Flash};
use crate::form::{apply_errors, summarize_errors, FormDialog, FormField, SelectOption};
use crate::pagination::PageRequest;
use crate::state::SharedState;
use crate::table::{Column, DataTable, ListState, Row, RowAction};
use crate::views::{Shell, Theme};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

/// Upper bound for lookup lists feeding select fields
const LOOKUP_LIMIT: u32 = 100;

/// Record id as sent by the API, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl RecordId {
    /// Parse a form value; numeric strings become numbers
    pub fn from_input(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => RecordId::Number(n),
            Err(_) => RecordId::Text(raw.to_string()),
        })
    }
}

/// `{ nama }` reference embedded in some records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "crate::validation::lenient_string")]
    pub nama: String,
}

/// Fixed set of values offered by a select field
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(&self) -> &'static str;
    fn label(&self) -> &'static str;

    fn options() -> Vec<SelectOption> {
        Self::ALL
            .iter()
            .map(|c| SelectOption::new(c.code(), c.label()))
            .collect()
    }

    fn parse(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code.trim())
    }
}

/// Record field holding a choice code; unknown codes and null become `None`
pub fn lenient_choice<'de, D, C>(deserializer: D) -> Result<Option<C>, D::Error>
where
    D: Deserializer<'de>,
    C: Choice,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_str)
        .and_then(C::parse))
}

/// Validator body shared by the per-field choice checks
pub fn validate_choice<C: Choice>(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if C::parse(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("choice");
        err.message = Some(message.into());
        Err(err)
    }
}

/// Flat field values, taken from a record or a submitted form
#[derive(Debug, Clone, Default)]
pub struct Values(Map<String, Value>);

impl Values {
    pub fn of<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => matches!(s.as_str(), "true" | "1" | "on"),
            _ => false,
        }
    }
}

/// Select field fed by another resource's records
#[derive(Debug, Clone, Copy)]
pub struct Lookup {
    pub field: &'static str,
    pub path: &'static str,
    /// Record key used as the option label
    pub label: &'static str,
}

pub type Lookups = HashMap<&'static str, Vec<SelectOption>>;

/// Shape of one admin resource
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Serialize + Send + Sync + 'static;
    type Form: DeserializeOwned + Serialize + Validate + Send + Sync + 'static;

    /// Upstream path and route segment
    const PATH: &'static str;
    const TITLE: &'static str;
    /// Whether agency users may manage this resource
    const AGENCY_ACCESS: bool = false;

    fn columns() -> Vec<Column>;
    fn id(record: &Self::Record) -> String;
    fn cells(record: &Self::Record) -> Vec<String>;
    fn fields(values: &Values, lookups: &Lookups) -> Vec<FormField>;
    /// JSON body for POST/PUT
    fn payload(form: Self::Form) -> AppResult<Value>;

    fn lookups() -> &'static [Lookup] {
        &[]
    }
}

/// Routes for one resource under `/admin/{PATH}`
pub fn routes<R: Resource>() -> Router<SharedState> {
    let base = format!("/admin/{}", R::PATH);
    Router::new()
        .route(&base, get(index::<R>).post(create::<R>))
        .route(&format!("{}/bulk-delete", base), post(bulk_delete::<R>))
        .route(&format!("{}/{{id}}", base), post(update::<R>))
        .route(&format!("{}/{{id}}/delete", base), post(remove::<R>))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub edit: Option<String>,
    pub new: Option<String>,
}

impl ListQuery {
    fn list_state<R: Resource>(&self) -> ListState {
        ListState::new(format!("/admin/{}", R::PATH), PageRequest::new(self.page, self.limit))
            .search(self.q.as_deref())
            .sort(self.sort.as_deref(), self.dir.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkDelete {
    #[serde(default)]
    pub ids: Vec<String>,
}

fn ensure_access<R: Resource>(session: &Session) -> AppResult<()> {
    if R::AGENCY_ACCESS || session.user.role.can_manage_master_data() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{} hanya untuk admin", R::TITLE)))
    }
}

/// Upstream path of one record; ids are restricted to URL-safe characters
fn record_path<R: Resource>(id: &str) -> AppResult<String> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::BadRequest(format!("ID tidak valid: {}", id)));
    }
    Ok(format!("/{}/{}", R::PATH, id))
}

/// GET one page of records
pub async fn fetch_page<R: Resource>(
    api: &ApiClient,
    token: &str,
    request: PageRequest,
) -> AppResult<Page<R::Record>> {
    let opts = RequestOptions::authed(token)
        .param("page", request.page)
        .param("limit", request.limit);
    let envelope: ListEnvelope<R::Record> = api.get(&format!("/{}", R::PATH), &opts).await?.json()?;
    debug!(
        "Fetched {} {} record(s), page {}/{}",
        envelope.result.data.len(),
        R::PATH,
        envelope.result.pagination.page,
        envelope.result.pagination.total_pages
    );
    Ok(envelope.result)
}

/// Options for every lookup the resource declares
pub async fn fetch_lookups(api: &ApiClient, token: &str, lookups: &[Lookup]) -> AppResult<Lookups> {
    let mut resolved = Lookups::new();

    for lookup in lookups {
        let opts = RequestOptions::authed(token)
            .param("page", 1)
            .param("limit", LOOKUP_LIMIT);
        let result = match api.get(&format!("/{}", lookup.path), &opts).await {
            Ok(response) => response.json::<ListEnvelope<Value>>().map_err(AppError::from),
            Err(e) => Err(AppError::from(e)),
        };

        let options = match result {
            Ok(envelope) => envelope
                .result
                .data
                .iter()
                .filter_map(|item| {
                    let values = Values::of(item);
                    let id = values.text("id");
                    (!id.is_empty()).then(|| SelectOption::new(id, values.text(lookup.label)))
                })
                .collect(),
            Err(e) if e.is_session_expired() => return Err(e),
            Err(e) => {
                warn!("Lookup '{}' for field '{}' failed: {}", lookup.path, lookup.field, e);
                Vec::new()
            }
        };

        resolved.insert(lookup.field, options);
    }

    Ok(resolved)
}

/// Keep the record's current choice selectable when it is past the lookup page
async fn keep_selected(
    api: &ApiClient,
    token: &str,
    lookups: &[Lookup],
    resolved: &mut Lookups,
    values: &Values,
) -> AppResult<()> {
    for lookup in lookups {
        let current = values.text(lookup.field);
        let options = resolved.entry(lookup.field).or_default();
        if current.is_empty() || options.iter().any(|o| o.value == current) {
            continue;
        }

        let valid = current
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        let label = if valid {
            let path = format!("/{}/{}", lookup.path, current);
            match api.get(&path, &RequestOptions::authed(token)).await {
                Ok(response) => ["/data", "/result", ""].iter().find_map(|prefix| {
                    response
                        .data
                        .pointer(&format!("{}/{}", prefix, lookup.label))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                }),
                Err(e) if e.is_unauthorized() => return Err(e.into()),
                Err(e) => {
                    warn!("Lookup {} for field '{}' failed: {}", path, lookup.field, e);
                    None
                }
            }
        } else {
            None
        };

        let label = label.unwrap_or_else(|| format!("#{}", current));
        options.push(SelectOption::new(current, label));
    }
    Ok(())
}

/// What the dialog is doing, if open
enum DialogMode<'a> {
    Create,
    Edit(&'a str),
}

async fn build_dialog<R: Resource>(
    state: &SharedState,
    session: &Session,
    list: &ListState,
    mode: DialogMode<'_>,
    values: &Values,
    errors: Option<&ValidationErrors>,
) -> AppResult<FormDialog> {
    let mut lookups = fetch_lookups(&state.api, &session.token, R::lookups()).await?;
    keep_selected(&state.api, &session.token, R::lookups(), &mut lookups, values).await?;
    let mut fields = R::fields(values, &lookups);
    if let Some(errors) = errors {
        apply_errors(&mut fields, errors);
    }

    let (title, action, submit) = match mode {
        DialogMode::Create => (format!("Tambah {}", R::TITLE), list.action_href(""), "Simpan"),
        DialogMode::Edit(id) => (
            format!("Edit {}", R::TITLE),
            list.action_href(&format!("/{}", id)),
            "Simpan Perubahan",
        ),
    };

    Ok(FormDialog::new(title, action, list.href())
        .description(format!("Lengkapi data {} lalu simpan.", R::TITLE.to_lowercase()))
        .submit_label(submit)
        .fields(fields))
}

fn render_list<R: Resource>(
    state: &SharedState,
    session: &Session,
    jar: CookieJar,
    list: &ListState,
    page: &Page<R::Record>,
    dialog: Option<FormDialog>,
    toast: Option<Flash>,
) -> AppResult<Response> {
    let rows = page
        .data
        .iter()
        .map(|record| Row {
            id: R::id(record),
            cells: R::cells(record),
        })
        .collect();

    let table = DataTable::new(R::columns(), rows).selectable(true);
    let table_view = table.view(list, &page.pagination, |row| {
        vec![
            RowAction::link("Edit", list.href_extra("edit", &row.id)),
            RowAction::destructive(
                "Hapus",
                list.action_href(&format!("/{}/delete", row.id)),
                format!("Hapus {} ini?", R::TITLE.to_lowercase()),
            ),
        ]
    });

    let shell = Shell::admin(R::TITLE, &list.base, &session.user, Theme::from_jar(&jar), toast);
    let html = state.views.page(
        "resource",
        &shell,
        &json!({
            "title": R::TITLE,
            "new_href": list.href_extra("new", "1"),
            "table": table_view,
            "dialog": dialog,
        }),
    )?;

    Ok((jar, html).into_response())
}

/// Turn a failed call into a toast unless the session is gone
fn toast_or_expire(err: AppError, context: &str) -> AppResult<Flash> {
    if err.is_session_expired() {
        return Err(err);
    }
    error!("{}: {}", context, err);
    Ok(Flash::error(format!("{}: {}", context, err.user_message())))
}

fn redirect_with(jar: CookieJar, list: &ListState, flash: Flash) -> Response {
    (flash::set(jar, flash), Redirect::to(&list.href())).into_response()
}

/// GET /admin/{resource}
pub async fn index<R: Resource>(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    ensure_access::<R>(&session)?;
    let (jar, mut toast) = flash::take(jar);
    let list = query.list_state::<R>();

    let page = match fetch_page::<R>(&state.api, &session.token, list.request).await {
        Ok(page) => page,
        Err(e) => {
            toast = Some(toast_or_expire(e, &format!("Gagal memuat data {}", R::TITLE))?);
            Page::empty(list.request.page, list.request.limit)
        }
    };

    let dialog = if let Some(id) = query.edit.as_deref() {
        match page.data.iter().find(|r| R::id(r) == id) {
            Some(record) => Some(
                build_dialog::<R>(&state, &session, &list, DialogMode::Edit(id), &Values::of(record), None)
                    .await?,
            ),
            None => {
                toast = Some(Flash::error(format!("{} dengan ID {} tidak ditemukan", R::TITLE, id)));
                None
            }
        }
    } else if query.new.is_some() {
        Some(build_dialog::<R>(&state, &session, &list, DialogMode::Create, &Values::default(), None).await?)
    } else {
        None
    };

    render_list::<R>(&state, &session, jar, &list, &page, dialog, toast)
}

/// Re-render the list with the dialog open and errors on the fields
async fn reject_form<R: Resource>(
    state: &SharedState,
    session: &Session,
    jar: CookieJar,
    list: &ListState,
    mode: DialogMode<'_>,
    form: &R::Form,
    errors: &ValidationErrors,
) -> AppResult<Response> {
    debug!("{} form rejected: {}", R::PATH, errors);
    let toast = Flash::error(summarize_errors(errors));

    let page = match fetch_page::<R>(&state.api, &session.token, list.request).await {
        Ok(page) => page,
        Err(e) => {
            toast_or_expire(e, &format!("Gagal memuat data {}", R::TITLE))?;
            Page::empty(list.request.page, list.request.limit)
        }
    };

    let dialog = build_dialog::<R>(state, session, list, mode, &Values::of(form), Some(errors)).await?;
    render_list::<R>(state, session, jar, list, &page, Some(dialog), Some(toast))
}

/// POST /admin/{resource}
pub async fn create<R: Resource>(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
    Form(form): Form<R::Form>,
) -> AppResult<Response> {
    ensure_access::<R>(&session)?;
    let list = query.list_state::<R>();

    if let Err(errors) = form.validate() {
        return reject_form::<R>(&state, &session, jar, &list, DialogMode::Create, &form, &errors).await;
    }

    let result = async {
        let payload = R::payload(form)?;
        state
            .api
            .post(&format!("/{}", R::PATH), &payload, &RequestOptions::authed(&session.token))
            .await?;
        Ok::<_, AppError>(())
    }
    .await;

    let flash = match result {
        Ok(()) => {
            info!("{} created by {}", R::TITLE, session.user.name);
            Flash::success(format!("{} berhasil ditambahkan", R::TITLE))
        }
        Err(e) => toast_or_expire(e, &format!("Gagal menambahkan {}", R::TITLE))?,
    };

    Ok(redirect_with(jar, &list, flash))
}

/// POST /admin/{resource}/{id}
pub async fn update<R: Resource>(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    Form(form): Form<R::Form>,
) -> AppResult<Response> {
    ensure_access::<R>(&session)?;
    let list = query.list_state::<R>();
    let path = record_path::<R>(&id)?;

    if let Err(errors) = form.validate() {
        return reject_form::<R>(&state, &session, jar, &list, DialogMode::Edit(&id), &form, &errors).await;
    }

    let result = async {
        let payload = R::payload(form)?;
        state
            .api
            .put(&path, &payload, &RequestOptions::authed(&session.token))
            .await?;
        Ok::<_, AppError>(())
    }
    .await;

    let flash = match result {
        Ok(()) => {
            info!("{} {} updated by {}", R::TITLE, id, session.user.name);
            Flash::success(format!("{} berhasil diperbarui", R::TITLE))
        }
        Err(e) => toast_or_expire(e, &format!("Gagal memperbarui {}", R::TITLE))?,
    };

    Ok(redirect_with(jar, &list, flash))
}

/// POST /admin/{resource}/{id}/delete
pub async fn remove<R: Resource>(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    ensure_access::<R>(&session)?;
    let list = query.list_state::<R>();
    let path = record_path::<R>(&id)?;

    let flash = match state
        .api
        .delete(&path, &RequestOptions::authed(&session.token))
        .await
    {
        Ok(_) => {
            info!("{} {} deleted by {}", R::TITLE, id, session.user.name);
            Flash::success(format!("{} berhasil dihapus", R::TITLE))
        }
        Err(e) => toast_or_expire(e.into(), &format!("Gagal menghapus {}", R::TITLE))?,
    };

    Ok(redirect_with(jar, &list, flash))
}

/// POST /admin/{resource}/bulk-delete
///
/// Deletes run one after another; a failure does not stop the rest.
pub async fn bulk_delete<R: Resource>(
    State(state): State<SharedState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<ListQuery>,
    axum_extra::extract::Form(selection): axum_extra::extract::Form<BulkDelete>,
) -> AppResult<Response> {
    ensure_access::<R>(&session)?;
    let list = query.list_state::<R>();

    if selection.ids.is_empty() {
        return Ok(redirect_with(jar, &list, Flash::error("Pilih data yang akan dihapus")));
    }

    let opts = RequestOptions::authed(&session.token);
    let mut deleted = 0usize;
    let mut failed = 0usize;

    for id in &selection.ids {
        let path = match record_path::<R>(id) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping {}: {}", id, e);
                failed += 1;
                continue;
            }
        };
        match state.api.delete(&path, &opts).await {
            Ok(_) => deleted += 1,
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                warn!("Bulk delete of {} {} failed: {}", R::PATH, id, e);
                failed += 1;
            }
        }
    }

    info!("{}: {} deleted, {} failed", R::PATH, deleted, failed);
    let flash = if failed == 0 {
        Flash::success(format!("{} data {} dihapus", deleted, R::TITLE))
    } else {
        Flash::error(format!("{} data dihapus, {} gagal dihapus", deleted, failed))
    };

    Ok(redirect_with(jar, &list, flash))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::auth::TOKEN_COOKIE;
    use crate::config::{ApiConfig, CookieConfig, ServerConfig, Settings};
    use crate::flash::{Flash, FLASH_COOKIE};
    use crate::routes::create_router;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use axum::Router;
    use axum_extra::extract::cookie::Cookie;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::MockServer;

    pub fn app(server: &MockServer) -> Router {
        let settings = Settings {
            server: ServerConfig::default(),
            api: ApiConfig::new(&server.uri(), Duration::from_secs(5)).unwrap(),
            cookie: CookieConfig::default(),
        };
        create_router(Arc::new(AppState::new(settings).unwrap()))
    }

    pub fn token_for(role: &str) -> String {
        encode(
            &Header::default(),
            &json!({"nama": "Rina", "role": role}),
            &EncodingKey::from_secret(b"upstream"),
        )
        .unwrap()
    }

    pub async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    pub fn get_page(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("cookie", format!("{}={}", TOKEN_COOKIE, token))
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_form(uri: &str, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("cookie", format!("{}={}", TOKEN_COOKIE, token))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub fn location(response: &Response) -> Option<String> {
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// Toast queued by a redirect, decoded from its cookie
    pub fn flash_of(response: &Response) -> Option<Flash> {
        set_cookies(response)
            .into_iter()
            .filter_map(|c| Cookie::parse_encoded(c).ok())
            .find(|c| c.name() == FLASH_COOKIE)
            .and_then(|c| serde_json::from_str(c.value()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::datel::DatelResource;
    use test_support::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn datel_page() -> Value {
        json!({
            "result": {
                "data": [
                    {"id": 1, "nama": "Datel Bandung", "kode_sto": "BDG", "wilayah": "Jabar", "categori": "HERO", "sub_area": "INNER"},
                    {"id": 2, "nama": "Datel Cimahi", "kode_sto": "CMI", "wilayah": "Jabar", "categori": "NON_HERO", "sub_area": "OUTER"}
                ],
                "pagination": {"page": 1, "limit": 10, "total": 2, "totalPages": 1}
            }
        })
    }

    #[test]
    fn test_record_id_parsing_and_display() {
        assert_eq!(RecordId::from_input("42"), Some(RecordId::Number(42)));
        assert_eq!(RecordId::from_input("abc-1"), Some(RecordId::Text("abc-1".into())));
        assert_eq!(RecordId::from_input("  "), None);
        let id: RecordId = serde_json::from_str("\"9f1c\"").unwrap();
        assert_eq!(id.to_string(), "9f1c");
    }

    #[test]
    fn test_values_stringify() {
        let values = Values::of(&json!({"a": 1, "b": null, "c": "x", "d": true}));
        assert_eq!(values.text("a"), "1");
        assert_eq!(values.text("b"), "");
        assert_eq!(values.text("c"), "x");
        assert!(values.flag("d"));
        assert!(!values.flag("missing"));
    }

    #[test]
    fn test_record_path_rejects_unsafe_ids() {
        assert_eq!(record_path::<DatelResource>("12").unwrap(), "/datel/12");
        assert!(record_path::<DatelResource>("../etc").is_err());
        assert!(record_path::<DatelResource>("").is_err());
    }

    #[tokio::test]
    async fn test_index_renders_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .and(query_param("page", "1"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(datel_page()))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel", &token_for("admin"))).await;
        assert_eq!(response.status(), 200);
        let html = body_text(response).await;
        assert!(html.contains("Datel Bandung"));
        assert!(html.contains("Datel Cimahi"));
        assert!(html.contains("Menampilkan 1 - 2 dari 2 data"));
    }

    #[tokio::test]
    async fn test_index_tolerates_null_and_unknown_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "data": [
                        {"id": 1, "nama": "Datel Bandung", "kode_sto": "BDG", "wilayah": "Jabar", "categori": "HERO", "sub_area": "INNER"},
                        {"id": 2, "nama": "Datel Sumedang", "kode_sto": null, "wilayah": null, "categori": "GOLD", "sub_area": null}
                    ],
                    "pagination": {"page": 1, "limit": 10, "total": 2, "totalPages": 1}
                }
            })))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel", &token_for("admin"))).await;
        let html = body_text(response).await;
        assert!(html.contains("Datel Bandung"));
        assert!(html.contains("Datel Sumedang"));
        assert!(!html.contains("Gagal memuat data"));
    }

    #[tokio::test]
    async fn test_index_accepts_sql_style_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kategori-paket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {
                    "data": [{"id": 4, "nama": "Indibiz Basic", "created_at": "2025-01-05 08:30:00", "updated_at": null}],
                    "pagination": {"page": 1, "limit": 10, "total": 1, "totalPages": 1}
                }
            })))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/kategori-paket", &token_for("admin"))).await;
        let html = body_text(response).await;
        assert!(html.contains("Indibiz Basic"));
        assert!(html.contains("05 Jan 2025 08:30"));
    }

    #[tokio::test]
    async fn test_index_search_is_local_to_the_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(datel_page()))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel?q=cimahi", &token_for("admin"))).await;
        let html = body_text(response).await;
        assert!(html.contains("Datel Cimahi"));
        assert!(!html.contains("Datel Bandung"));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| !r.url.query().unwrap_or("").contains("q=")));
    }

    #[tokio::test]
    async fn test_index_upstream_failure_shows_empty_table_with_toast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "DB down"})))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel", &token_for("admin"))).await;
        assert_eq!(response.status(), 200);
        let html = body_text(response).await;
        assert!(html.contains("Tidak ada data"));
        assert!(html.contains("DB down"));
    }

    #[tokio::test]
    async fn test_index_upstream_401_ends_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel", &token_for("admin"))).await;
        assert_eq!(response.status(), 303);
        assert_eq!(location(&response).as_deref(), Some("/login"));
        let cookies = set_cookies(&response);
        assert_eq!(cookies.iter().filter(|c| c.starts_with("token=")).count(), 1);
    }

    #[tokio::test]
    async fn test_edit_opens_prefilled_dialog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(datel_page()))
            .mount(&server)
            .await;

        let response = send(app(&server), get_page("/admin/datel?edit=2", &token_for("admin"))).await;
        let html = body_text(response).await;
        assert!(html.contains("Edit Datel"));
        assert!(html.contains("Simpan Perubahan"));
        assert!(html.contains("value=\"CMI\""));
        assert!(html.contains("<option value=\"NON_HERO\" selected>"));
    }

    #[tokio::test]
    async fn test_create_posts_and_redirects_with_toast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/datel"))
            .and(body_json(json!({
                "nama": "Datel Garut",
                "kode_sto": "GRT",
                "wilayah": "Jabar",
                "categori": "HERO",
                "sub_area": "OUTER"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form(
                "/admin/datel?page=2&limit=20",
                &token_for("admin"),
                "nama=Datel+Garut&kode_sto=GRT&wilayah=Jabar&categori=HERO&sub_area=OUTER",
            ),
        )
        .await;

        assert_eq!(response.status(), 303);
        assert_eq!(location(&response).as_deref(), Some("/admin/datel?page=2&limit=20"));
        assert!(set_cookies(&response).iter().any(|c| c.starts_with("flash=")));
    }

    #[tokio::test]
    async fn test_mutation_redirect_keeps_search_and_sort() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/datel/2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form(
                "/admin/datel/2/delete?page=1&limit=10&q=jabar&sort=nama&dir=desc",
                &token_for("admin"),
                "",
            ),
        )
        .await;

        assert_eq!(
            location(&response).as_deref(),
            Some("/admin/datel?page=1&limit=10&q=jabar&sort=nama&dir=desc")
        );
    }

    #[tokio::test]
    async fn test_invalid_form_rerenders_dialog_without_calling_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/datel"))
            .respond_with(ResponseTemplate::new(200).set_body_json(datel_page()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form("/admin/datel", &token_for("admin"), "nama=&kode_sto=X&wilayah=Y&categori=GOLD&sub_area=INNER"),
        )
        .await;

        assert_eq!(response.status(), 200);
        let html = body_text(response).await;
        assert!(html.contains("Nama wajib diisi"));
        assert!(html.contains("Lengkapi data datel lalu simpan."));
    }

    #[tokio::test]
    async fn test_update_puts_to_record_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/datel/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form(
                "/admin/datel/7?page=1&limit=10",
                &token_for("admin"),
                "nama=A&kode_sto=B&wilayah=C&categori=HERO&sub_area=INNER",
            ),
        )
        .await;

        assert_eq!(response.status(), 303);
    }

    #[tokio::test]
    async fn test_delete_failure_becomes_toast() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/datel/3"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Masih dipakai sales"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(app(&server), post_form("/admin/datel/3/delete", &token_for("admin"), "")).await;
        assert_eq!(response.status(), 303);
        let cookies = set_cookies(&response);
        let flash = cookies.iter().find(|c| c.starts_with("flash=")).unwrap();
        assert!(flash.contains("error"), "{}", flash);
    }

    #[tokio::test]
    async fn test_bulk_delete_is_sequential_and_counts_failures() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/datel/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/datel/2"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form("/admin/datel/bulk-delete", &token_for("admin"), "ids=1&ids=2"),
        )
        .await;

        assert_eq!(response.status(), 303);
        assert_eq!(location(&response).as_deref(), Some("/admin/datel?page=1&limit=10"));
        assert_eq!(
            flash_of(&response),
            Some(Flash::error("1 data dihapus, 1 gagal dihapus"))
        );
    }

    #[tokio::test]
    async fn test_bulk_delete_stops_and_ends_session_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/datel/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/datel/2"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/datel/3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form("/admin/datel/bulk-delete", &token_for("admin"), "ids=1&ids=2&ids=3"),
        )
        .await;

        assert_eq!(response.status(), 303);
        assert_eq!(location(&response).as_deref(), Some("/login"));
        let cookies = set_cookies(&response);
        let removals: Vec<_> = cookies.iter().filter(|c| c.starts_with("token=")).collect();
        assert_eq!(removals.len(), 1);
        assert!(removals[0].contains("Max-Age=0"));
        assert_eq!(flash_of(&response), None);
    }

    #[tokio::test]
    async fn test_bulk_delete_all_succeeded_reports_count() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;

        let response = send(
            app(&server),
            post_form("/admin/datel/bulk-delete", &token_for("admin"), "ids=1&ids=2"),
        )
        .await;

        assert_eq!(flash_of(&response), Some(Flash::success("2 data Datel dihapus")));
    }

    #[tokio::test]
    async fn test_agency_cannot_open_master_data() {
        let server = MockServer::start().await;
        let response = send(app(&server), get_page("/admin/datel", &token_for("agency"))).await;
        assert_eq!(response.status(), 403);
    }
}
