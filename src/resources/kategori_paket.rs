//! Kategori paket (package category) master data

use super::{Lookups, RecordId, Resource, Values};
use crate::error::AppResult;
use crate::form::FormField;
use crate::table::Column;
use crate::validation::{display_timestamp, lenient_string, lenient_text};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KategoriPaket {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct KategoriPaketForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Nama kategori wajib diisi"))]
    pub nama: String,
}

fn format_timestamp(value: Option<&str>) -> String {
    value.map(display_timestamp).unwrap_or_else(|| "-".to_string())
}

pub struct KategoriPaketResource;

impl Resource for KategoriPaketResource {
    type Record = KategoriPaket;
    type Form = KategoriPaketForm;

    const PATH: &'static str = "kategori-paket";
    const TITLE: &'static str = "Kategori Paket";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("nama", "Nama"),
            Column::new("created_at", "Dibuat"),
            Column::new("updated_at", "Diperbarui"),
        ]
    }

    fn id(record: &KategoriPaket) -> String {
        record.id.to_string()
    }

    fn cells(record: &KategoriPaket) -> Vec<String> {
        vec![
            record.nama.clone(),
            format_timestamp(record.created_at.as_deref()),
            format_timestamp(record.updated_at.as_deref()),
        ]
    }

    fn fields(values: &Values, _lookups: &Lookups) -> Vec<FormField> {
        vec![FormField::text("nama", "Nama Kategori")
            .value(values.text("nama"))
            .placeholder("Indibiz Basic")
            .required()]
    }

    fn payload(form: KategoriPaketForm) -> AppResult<Value> {
        Ok(json!({ "nama": form.nama.trim() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_render_or_dash() {
        let record: KategoriPaket = serde_json::from_value(json!({
            "id": "k-1",
            "nama": "Indibiz Basic",
            "created_at": "2025-01-05T08:30:00Z",
            "updated_at": null
        }))
        .unwrap();

        assert_eq!(KategoriPaketResource::id(&record), "k-1");
        assert_eq!(
            KategoriPaketResource::cells(&record),
            vec!["Indibiz Basic", "05 Jan 2025 08:30", "-"]
        );
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let form = KategoriPaketForm { nama: String::new() };
        assert!(form.validate().is_err());
        assert_eq!(
            KategoriPaketResource::payload(KategoriPaketForm { nama: "  Pro ".into() }).unwrap(),
            json!({"nama": "Pro"})
        );
    }
}
