//! Application settings stored upstream as key/value pairs

use super::{Lookups, RecordId, Resource, Values};
use crate::error::AppResult;
use crate::form::FormField;
use crate::table::Column;
use crate::validation::{empty_as_none, lenient_string, lenient_text, SETTING_KEY_RE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub deskripsi: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SettingForm {
    #[serde(default)]
    #[validate(regex(
        path = *SETTING_KEY_RE,
        message = "Key hanya huruf kecil, angka, titik dan garis bawah"
    ))]
    pub key: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 2000, message = "Value wajib diisi"))]
    pub value: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(max = 255, message = "Deskripsi maksimal 255 karakter"))]
    pub deskripsi: Option<String>,
}

/// Values may be stored as any JSON scalar; show them without quotes
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct SettingsResource;

impl Resource for SettingsResource {
    type Record = Setting;
    type Form = SettingForm;

    const PATH: &'static str = "settings";
    const TITLE: &'static str = "Settings";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("key", "Key"),
            Column::new("value", "Value"),
            Column::unsortable("deskripsi", "Deskripsi"),
        ]
    }

    fn id(record: &Setting) -> String {
        record.id.to_string()
    }

    fn cells(record: &Setting) -> Vec<String> {
        vec![
            record.key.clone(),
            display_value(&record.value),
            record.deskripsi.clone().unwrap_or_default(),
        ]
    }

    fn fields(values: &Values, _lookups: &Lookups) -> Vec<FormField> {
        vec![
            FormField::text("key", "Key")
                .value(values.text("key"))
                .placeholder("whatsapp.admin")
                .required(),
            FormField::textarea("value", "Value")
                .value(values.text("value"))
                .required(),
            FormField::text("deskripsi", "Deskripsi").value(values.text("deskripsi")),
        ]
    }

    fn payload(form: SettingForm) -> AppResult<Value> {
        Ok(json!({
            "key": form.key.trim(),
            "value": form.value,
            "deskripsi": form.deskripsi,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_values_display_plainly() {
        let record: Setting =
            serde_json::from_value(json!({"id": 1, "key": "max.promo", "value": 3})).unwrap();
        assert_eq!(SettingsResource::cells(&record), vec!["max.promo", "3", ""]);
        assert_eq!(display_value(&json!("on")), "on");
    }

    #[test]
    fn test_key_format() {
        let form = SettingForm {
            key: "Bad Key".into(),
            value: "x".into(),
            deskripsi: None,
        };
        assert!(form.validate().unwrap_err().field_errors().contains_key("key"));

        let form = SettingForm {
            key: "whatsapp.admin".into(),
            ..form
        };
        assert!(form.validate().is_ok());
    }
}
