//! Promo master data

use super::{lenient_choice, validate_choice, Choice, Lookups, RecordId, Resource, Values};
use crate::error::{AppError, AppResult};
use crate::form::FormField;
use crate::table::Column;
use crate::validation::{
    date_input_value, empty_as_none, lenient_bool, lenient_number, lenient_string, lenient_text,
    validate_amount, validate_date,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Jenis {
    Diskon,
    Cashback,
    Bonus,
    Dll,
}

impl Choice for Jenis {
    const ALL: &'static [Self] = &[Jenis::Diskon, Jenis::Cashback, Jenis::Bonus, Jenis::Dll];

    fn code(&self) -> &'static str {
        match self {
            Jenis::Diskon => "DISKON",
            Jenis::Cashback => "CASHBACK",
            Jenis::Bonus => "BONUS",
            Jenis::Dll => "DLL",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Jenis::Diskon => "Diskon",
            Jenis::Cashback => "Cashback",
            Jenis::Bonus => "Bonus",
            Jenis::Dll => "Lainnya",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promo {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub deskripsi: Option<String>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub jenis: Option<Jenis>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub diskon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mulai: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub akhir: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_global: bool,
}

fn validate_jenis(value: &str) -> Result<(), ValidationError> {
    validate_choice::<Jenis>(value, "Jenis promo tidak dikenal")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PromoForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Nama promo wajib diisi"))]
    pub nama: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 500, message = "Deskripsi maksimal 500 karakter"))]
    pub deskripsi: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_jenis"))]
    pub jenis: String,
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub diskon: String,
    #[serde(default)]
    #[validate(custom(function = "validate_date"))]
    pub mulai: String,
    #[serde(default)]
    #[validate(custom(function = "validate_date"))]
    pub akhir: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_global: bool,
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn format_date(raw: Option<&str>) -> String {
    match raw.map(date_input_value) {
        Some(date) if !date.is_empty() => date,
        _ => "-".to_string(),
    }
}

pub struct PromoResource;

impl Resource for PromoResource {
    type Record = Promo;
    type Form = PromoForm;

    const PATH: &'static str = "promo";
    const TITLE: &'static str = "Promo";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("nama", "Nama"),
            Column::new("jenis", "Jenis"),
            Column::new("diskon", "Nilai"),
            Column::new("mulai", "Mulai"),
            Column::new("akhir", "Berakhir"),
            Column::new("is_global", "Global"),
        ]
    }

    fn id(record: &Promo) -> String {
        record.id.to_string()
    }

    fn cells(record: &Promo) -> Vec<String> {
        vec![
            record.nama.clone(),
            record.jenis.map(|j| j.label()).unwrap_or("-").to_string(),
            record.diskon.map(format_amount).unwrap_or_else(|| "-".to_string()),
            format_date(record.mulai.as_deref()),
            format_date(record.akhir.as_deref()),
            if record.is_global { "Ya" } else { "Tidak" }.to_string(),
        ]
    }

    fn fields(values: &Values, _lookups: &Lookups) -> Vec<FormField> {
        vec![
            FormField::text("nama", "Nama Promo")
                .value(values.text("nama"))
                .required(),
            FormField::textarea("deskripsi", "Deskripsi").value(values.text("deskripsi")),
            FormField::select("jenis", "Jenis", Jenis::options())
                .value(values.text("jenis"))
                .required(),
            FormField::number("diskon", "Nilai")
                .value(values.text("diskon"))
                .help("Persentase atau nominal, tergantung jenis promo")
                .required(),
            FormField::date("mulai", "Mulai")
                .value(date_input_value(&values.text("mulai")))
                .required(),
            FormField::date("akhir", "Berakhir")
                .value(date_input_value(&values.text("akhir")))
                .required(),
            FormField::checkbox("is_global", "Berlaku untuk semua paket", values.flag("is_global")),
        ]
    }

    fn payload(form: PromoForm) -> AppResult<Value> {
        let diskon: f64 = form
            .diskon
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Nilai promo harus berupa angka".to_string()))?;

        Ok(json!({
            "nama": form.nama.trim(),
            "deskripsi": form.deskripsi,
            "jenis": form.jenis.trim(),
            "diskon": diskon,
            "mulai": form.mulai.trim(),
            "akhir": form.akhir.trim(),
            "is_global": form.is_global,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PromoForm {
        PromoForm {
            nama: "Ramadhan".into(),
            deskripsi: None,
            jenis: "DISKON".into(),
            diskon: "15".into(),
            mulai: "2025-03-01".into(),
            akhir: "2025-03-31".into(),
            is_global: false,
        }
    }

    #[test]
    fn test_lenient_record_fields() {
        let record: Promo = serde_json::from_value(json!({
            "id": 1, "nama": "Ramadhan", "jenis": "CASHBACK",
            "diskon": "12.50", "mulai": "2025-03-01T00:00:00.000Z",
            "akhir": null, "is_global": 1
        }))
        .unwrap();

        assert_eq!(
            PromoResource::cells(&record),
            vec!["Ramadhan", "Cashback", "12.50", "2025-03-01", "-", "Ya"]
        );
    }

    #[test]
    fn test_form_validation() {
        assert!(form().validate().is_ok());

        let mut bad = form();
        bad.diskon = "lima".into();
        bad.mulai = "01-03-2025".into();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("diskon"));
        assert!(errors.field_errors().contains_key("mulai"));
    }

    #[test]
    fn test_checkbox_absent_means_false() {
        let parsed: PromoForm = parse_form("nama=X&jenis=BONUS&diskon=0&mulai=2025-01-01&akhir=2025-01-02");
        assert!(!parsed.is_global);
        let parsed: PromoForm =
            parse_form("nama=X&jenis=BONUS&diskon=0&mulai=2025-01-01&akhir=2025-01-02&is_global=true");
        assert!(parsed.is_global);
    }

    fn parse_form(body: &str) -> PromoForm {
        let map: serde_json::Map<String, Value> = url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        serde_json::from_value(Value::Object(map)).unwrap()
    }

    #[test]
    fn test_payload_sends_numeric_diskon() {
        let payload = PromoResource::payload(form()).unwrap();
        assert_eq!(payload["diskon"], json!(15.0));
        assert_eq!(payload["is_global"], json!(false));
        assert_eq!(payload["deskripsi"], Value::Null);
    }
}
