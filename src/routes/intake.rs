//! Public multi-step registration form
//!
//! The wizard keeps no server-side state. Every step posts all values
//! entered so far as hidden inputs, and the handler decides which step to
//! show next from `step` and `action`.

use crate::api::{ApiResponse, ListEnvelope, RequestOptions};
use crate::error::AppResult;
use crate::flash::Flash;
use crate::form::{apply_errors, summarize_errors, FormField, SelectOption};
use crate::resources::{RecordId, Values};
use crate::state::SharedState;
use crate::validation::{validate_latitude, validate_longitude, PHONE_RE};
use crate::views::{Shell, Theme};
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

/// Upstream endpoint receiving submissions
const SUBMIT_PATH: &str = "/pendaftaran";

/// Public list feeding the package select
const KATEGORI_PATH: &str = "/kategori-paket";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Step {
    Pic = 1,
    Usaha = 2,
    Layanan = 3,
    Review = 4,
}

impl Step {
    const ALL: [Step; 4] = [Step::Pic, Step::Usaha, Step::Layanan, Step::Review];

    fn from_number(n: u8) -> Self {
        match n {
            2 => Step::Usaha,
            3 => Step::Layanan,
            4 => Step::Review,
            _ => Step::Pic,
        }
    }

    fn number(self) -> u8 {
        self as u8
    }

    fn label(self) -> &'static str {
        match self {
            Step::Pic => "Data PIC",
            Step::Usaha => "Data Usaha",
            Step::Layanan => "Layanan",
            Step::Review => "Konfirmasi",
        }
    }

    fn next(self) -> Self {
        Step::from_number(self.number() + 1)
    }

    fn prev(self) -> Self {
        Step::from_number(self.number().saturating_sub(1))
    }

    /// Names of the inputs shown on this step
    fn field_names(self) -> &'static [&'static str] {
        match self {
            Step::Pic => &["nama_pic", "no_hp_pic", "email_pic"],
            Step::Usaha => &["nama_usaha", "jenis_usaha", "alamat", "latitude", "longitude"],
            Step::Layanan => &["kategori_paket_id", "kode_sales", "catatan"],
            Step::Review => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardAction {
    #[default]
    Next,
    Back,
    Submit,
}

/// Everything the wizard carries between steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Intake {
    #[serde(skip_serializing)]
    pub step: u8,
    #[serde(skip_serializing)]
    pub action: WizardAction,
    pub nama_pic: String,
    pub no_hp_pic: String,
    pub email_pic: String,
    pub nama_usaha: String,
    pub jenis_usaha: String,
    pub alamat: String,
    pub latitude: String,
    pub longitude: String,
    pub kategori_paket_id: String,
    pub kode_sales: String,
    pub catatan: String,
}

#[derive(Debug, Validate)]
struct PicStep {
    #[validate(length(min = 1, max = 100, message = "Nama PIC wajib diisi"))]
    nama_pic: String,
    #[validate(regex(path = *PHONE_RE, message = "Nomor HP harus nomor seluler Indonesia"))]
    no_hp_pic: String,
    #[validate(email(message = "Format email tidak valid"))]
    email_pic: Option<String>,
}

#[derive(Debug, Validate)]
struct UsahaStep {
    #[validate(length(min = 1, max = 150, message = "Nama usaha wajib diisi"))]
    nama_usaha: String,
    #[validate(length(min = 1, max = 100, message = "Jenis usaha wajib diisi"))]
    jenis_usaha: String,
    #[validate(length(min = 5, max = 500, message = "Alamat wajib diisi lengkap"))]
    alamat: String,
    #[validate(custom(function = "validate_latitude"))]
    latitude: String,
    #[validate(custom(function = "validate_longitude"))]
    longitude: String,
}

#[derive(Debug, Validate)]
struct LayananStep {
    #[validate(length(min = 1, message = "Kategori paket wajib dipilih"))]
    kategori_paket_id: String,
    #[validate(length(max = 30, message = "Kode sales maksimal 30 karakter"))]
    kode_sales: String,
    #[validate(length(max = 500, message = "Catatan maksimal 500 karakter"))]
    catatan: String,
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

impl Intake {
    fn validate_step(&self, step: Step) -> Result<(), ValidationErrors> {
        match step {
            Step::Pic => PicStep {
                nama_pic: trimmed(&self.nama_pic),
                no_hp_pic: trimmed(&self.no_hp_pic),
                email_pic: non_empty(&self.email_pic).map(str::to_string),
            }
            .validate(),
            Step::Usaha => UsahaStep {
                nama_usaha: trimmed(&self.nama_usaha),
                jenis_usaha: trimmed(&self.jenis_usaha),
                alamat: trimmed(&self.alamat),
                latitude: trimmed(&self.latitude),
                longitude: trimmed(&self.longitude),
            }
            .validate(),
            Step::Layanan => LayananStep {
                kategori_paket_id: trimmed(&self.kategori_paket_id),
                kode_sales: trimmed(&self.kode_sales),
                catatan: trimmed(&self.catatan),
            }
            .validate(),
            Step::Review => Ok(()),
        }
    }

    /// First step that fails validation, with its errors
    fn first_invalid(&self) -> Option<(Step, ValidationErrors)> {
        [Step::Pic, Step::Usaha, Step::Layanan]
            .into_iter()
            .find_map(|step| self.validate_step(step).err().map(|e| (step, e)))
    }

    fn payload(&self) -> Value {
        let number = |raw: &str| raw.trim().parse::<f64>().ok();

        json!({
            "nama_pic": self.nama_pic.trim(),
            "no_hp_pic": self.no_hp_pic.trim(),
            "email_pic": non_empty(&self.email_pic),
            "nama_usaha": self.nama_usaha.trim(),
            "jenis_usaha": self.jenis_usaha.trim(),
            "alamat": self.alamat.trim(),
            "latitude": number(&self.latitude),
            "longitude": number(&self.longitude),
            "kategori_paket_id": RecordId::from_input(&self.kategori_paket_id),
            "kode_sales": non_empty(&self.kode_sales),
            "catatan": non_empty(&self.catatan),
        })
    }
}

#[derive(Debug, Serialize)]
struct StepView {
    number: u8,
    label: &'static str,
    current: bool,
    done: bool,
}

#[derive(Debug, Serialize)]
struct Hidden {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct ReviewItem {
    label: &'static str,
    value: String,
}

/// Package options, or `None` when the public list is unavailable
async fn kategori_options(state: &SharedState) -> Option<Vec<SelectOption>> {
    let opts = RequestOptions::public().param("page", 1).param("limit", 100);
    let result = match state.api.get(KATEGORI_PATH, &opts).await {
        Ok(response) => response.json::<ListEnvelope<Value>>(),
        Err(e) => Err(e),
    };

    match result {
        Ok(envelope) => Some(
            envelope
                .result
                .data
                .iter()
                .map(Values::of)
                .map(|v| SelectOption::new(v.text("id"), v.text("nama")))
                .collect(),
        ),
        Err(e) => {
            warn!("Kategori paket list unavailable, falling back to free text: {}", e);
            None
        }
    }
}

fn map_link(latitude: &str, longitude: &str) -> Option<String> {
    let lat: f64 = latitude.trim().parse().ok()?;
    let lng: f64 = longitude.trim().parse().ok()?;
    if validate_latitude(latitude).is_err() || validate_longitude(longitude).is_err() {
        return None;
    }
    Some(format!(
        r#"<a href="https://www.google.com/maps?q={lat},{lng}" target="_blank" rel="noopener">Lihat lokasi {lat}, {lng} di peta</a>"#
    ))
}

async fn step_fields(state: &SharedState, step: Step, values: &Values) -> Vec<FormField> {
    match step {
        Step::Pic => vec![
            FormField::text("nama_pic", "Nama PIC")
                .value(values.text("nama_pic"))
                .required(),
            FormField::tel("no_hp_pic", "No. HP PIC")
                .value(values.text("no_hp_pic"))
                .placeholder("08xxxxxxxxxx")
                .required(),
            FormField::email("email_pic", "Email PIC").value(values.text("email_pic")),
        ],
        Step::Usaha => {
            let mut fields = vec![
                FormField::text("nama_usaha", "Nama Usaha")
                    .value(values.text("nama_usaha"))
                    .required(),
                FormField::text("jenis_usaha", "Jenis Usaha")
                    .value(values.text("jenis_usaha"))
                    .placeholder("Kafe, toko, kantor...")
                    .required(),
                FormField::textarea("alamat", "Alamat")
                    .value(values.text("alamat"))
                    .required(),
                FormField::number("latitude", "Latitude")
                    .value(values.text("latitude"))
                    .placeholder("-6.9147")
                    .required(),
                FormField::number("longitude", "Longitude")
                    .value(values.text("longitude"))
                    .placeholder("107.6098")
                    .required(),
            ];
            if let Some(link) = map_link(&values.text("latitude"), &values.text("longitude")) {
                fields.push(FormField::custom("peta", "Peta", link));
            }
            fields
        }
        Step::Layanan => {
            let kategori = match kategori_options(state).await {
                Some(options) => FormField::select("kategori_paket_id", "Kategori Paket", options),
                None => FormField::text("kategori_paket_id", "Kategori Paket")
                    .help("Daftar paket sedang tidak tersedia, isi ID paket bila diketahui"),
            };
            vec![
                kategori.value(values.text("kategori_paket_id")).required(),
                FormField::text("kode_sales", "Kode Sales")
                    .value(values.text("kode_sales"))
                    .help("Opsional, isi bila dibantu oleh sales kami"),
                FormField::textarea("catatan", "Catatan").value(values.text("catatan")),
            ]
        }
        Step::Review => Vec::new(),
    }
}

fn review_items(intake: &Intake, kategori_label: Option<String>) -> Vec<ReviewItem> {
    let kategori = kategori_label.unwrap_or_else(|| intake.kategori_paket_id.clone());
    vec![
        ReviewItem { label: "Nama PIC", value: intake.nama_pic.clone() },
        ReviewItem { label: "No. HP PIC", value: intake.no_hp_pic.clone() },
        ReviewItem { label: "Email PIC", value: intake.email_pic.clone() },
        ReviewItem { label: "Nama Usaha", value: intake.nama_usaha.clone() },
        ReviewItem { label: "Jenis Usaha", value: intake.jenis_usaha.clone() },
        ReviewItem { label: "Alamat", value: intake.alamat.clone() },
        ReviewItem {
            label: "Koordinat",
            value: format!("{}, {}", intake.latitude.trim(), intake.longitude.trim()),
        },
        ReviewItem { label: "Kategori Paket", value: kategori },
        ReviewItem { label: "Kode Sales", value: intake.kode_sales.clone() },
        ReviewItem { label: "Catatan", value: intake.catatan.clone() },
    ]
}

async fn render_step(
    state: &SharedState,
    jar: CookieJar,
    intake: &Intake,
    step: Step,
    errors: Option<&ValidationErrors>,
    toast: Option<Flash>,
) -> AppResult<Response> {
    let values = Values::of(intake);
    let shown = step.field_names();

    let carry: Vec<Hidden> = Step::ALL
        .iter()
        .flat_map(|s| s.field_names())
        .filter(|name| !shown.contains(name))
        .map(|name| Hidden {
            name: name.to_string(),
            value: values.text(name),
        })
        .collect();

    let mut fields = step_fields(state, step, &values).await;
    if let Some(errors) = errors {
        apply_errors(&mut fields, errors);
    }

    let steps: Vec<StepView> = Step::ALL
        .iter()
        .map(|&s| StepView {
            number: s.number(),
            label: s.label(),
            current: s == step,
            done: s < step,
        })
        .collect();

    let review = if step == Step::Review {
        let chosen = intake.kategori_paket_id.trim();
        let label = kategori_options(state)
            .await
            .and_then(|options| options.into_iter().find(|o| o.value == chosen))
            .map(|o| o.label);
        Some(review_items(intake, label))
    } else {
        None
    };

    let shell = Shell::public("Pendaftaran", Theme::from_jar(&jar), toast);
    let html = state.views.page(
        "intake",
        &shell,
        &json!({
            "steps": steps,
            "step": step.number(),
            "carry": carry,
            "fields": fields,
            "review": review,
            "can_go_back": step != Step::Pic,
        }),
    )?;

    Ok((jar, html).into_response())
}

/// GET /daftar
pub async fn start(State(state): State<SharedState>, jar: CookieJar) -> AppResult<Response> {
    render_step(&state, jar, &Intake::default(), Step::Pic, None, None).await
}

/// POST /daftar
pub async fn step(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(intake): Form<Intake>,
) -> AppResult<Response> {
    let current = Step::from_number(intake.step);

    match intake.action {
        WizardAction::Back => render_step(&state, jar, &intake, current.prev(), None, None).await,
        WizardAction::Next => match intake.validate_step(current) {
            Ok(()) => render_step(&state, jar, &intake, current.next(), None, None).await,
            Err(errors) => {
                let toast = Flash::error(summarize_errors(&errors));
                render_step(&state, jar, &intake, current, Some(&errors), Some(toast)).await
            }
        },
        WizardAction::Submit => submit(state, jar, intake).await,
    }
}

/// Reference number from the submission response, wherever the API put it
fn registration_reference(response: &ApiResponse) -> Option<String> {
    ["id", "kode", "no_registrasi"].iter().find_map(|key| {
        let found = response
            .data
            .pointer(&format!("/data/{}", key))
            .or_else(|| response.data.pointer(&format!("/result/{}", key)))?;
        match found {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

async fn submit(state: SharedState, jar: CookieJar, intake: Intake) -> AppResult<Response> {
    if let Some((step, errors)) = intake.first_invalid() {
        let toast = Flash::error(summarize_errors(&errors));
        return render_step(&state, jar, &intake, step, Some(&errors), Some(toast)).await;
    }

    let response = match state
        .api
        .post(SUBMIT_PATH, &intake.payload(), &RequestOptions::public())
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("Submission for '{}' failed: {}", intake.nama_usaha, e);
            let toast = Flash::error(format!("Pendaftaran gagal dikirim: {}", e.user_message()));
            return render_step(&state, jar, &intake, Step::Review, None, Some(toast)).await;
        }
    };

    let reference = registration_reference(&response);

    info!("Registration received for '{}'", intake.nama_usaha);

    let shell = Shell::public(
        "Pendaftaran Terkirim",
        Theme::from_jar(&jar),
        Some(Flash::success("Pendaftaran berhasil dikirim")),
    );
    let html = state.views.page(
        "intake_done",
        &shell,
        &json!({
            "nama_pic": intake.nama_pic.trim(),
            "nama_usaha": intake.nama_usaha.trim(),
            "no_hp_pic": intake.no_hp_pic.trim(),
            "reference": reference,
        }),
    )?;

    Ok((jar, html).into_response())
}
