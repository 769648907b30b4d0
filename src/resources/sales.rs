//! Sales force, managed by admins and agencies

use super::{Lookup, Lookups, NamedRef, RecordId, Resource, Values};
use crate::error::{AppError, AppResult};
use crate::form::FormField;
use crate::table::Column;
use crate::validation::{empty_as_none, lenient_string, lenient_text, PHONE_RE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sales {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kode_sales: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub no_hp: Option<String>,
    #[serde(default)]
    pub datel_id: Option<RecordId>,
    /// Joined datel, when the API includes it
    #[serde(default)]
    pub datel: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SalesForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Nama sales wajib diisi"))]
    pub nama: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "Kode sales wajib diisi"))]
    pub kode_sales: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Format email tidak valid"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(regex(path = *PHONE_RE, message = "Nomor HP tidak valid"))]
    pub no_hp: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Datel wajib dipilih"))]
    pub datel_id: String,
}

pub struct SalesResource;

impl Resource for SalesResource {
    type Record = Sales;
    type Form = SalesForm;

    const PATH: &'static str = "sales";
    const TITLE: &'static str = "Sales";
    const AGENCY_ACCESS: bool = true;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("nama", "Nama"),
            Column::new("kode_sales", "Kode Sales"),
            Column::unsortable("email", "Email"),
            Column::unsortable("no_hp", "No. HP"),
            Column::new("datel", "Datel"),
        ]
    }

    fn id(record: &Sales) -> String {
        record.id.to_string()
    }

    fn cells(record: &Sales) -> Vec<String> {
        let datel = match (&record.datel, &record.datel_id) {
            (Some(datel), _) => datel.nama.clone(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => "-".to_string(),
        };

        vec![
            record.nama.clone(),
            record.kode_sales.clone(),
            record.email.clone().unwrap_or_else(|| "-".to_string()),
            record.no_hp.clone().unwrap_or_else(|| "-".to_string()),
            datel,
        ]
    }

    fn lookups() -> &'static [Lookup] {
        &[Lookup {
            field: "datel_id",
            path: "datel",
            label: "nama",
        }]
    }

    fn fields(values: &Values, lookups: &Lookups) -> Vec<FormField> {
        let datel_options = lookups.get("datel_id").cloned().unwrap_or_default();

        vec![
            FormField::text("nama", "Nama")
                .value(values.text("nama"))
                .required(),
            FormField::text("kode_sales", "Kode Sales")
                .value(values.text("kode_sales"))
                .placeholder("SPV0001")
                .required(),
            FormField::email("email", "Email").value(values.text("email")),
            FormField::tel("no_hp", "No. HP")
                .value(values.text("no_hp"))
                .placeholder("08xxxxxxxxxx"),
            FormField::select("datel_id", "Datel", datel_options)
                .value(values.text("datel_id"))
                .required(),
        ]
    }

    fn payload(form: SalesForm) -> AppResult<Value> {
        let datel_id = RecordId::from_input(&form.datel_id)
            .ok_or_else(|| AppError::Validation("Datel wajib dipilih".to_string()))?;

        Ok(json!({
            "nama": form.nama.trim(),
            "kode_sales": form.kode_sales.trim(),
            "email": form.email,
            "no_hp": form.no_hp,
            "datel_id": datel_id,
        }))
    }
}
