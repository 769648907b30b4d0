//! Shared form validators and lenient deserializers
//!
//! HTML forms submit everything as strings, and the upstream API is not
//! consistent about numbers and booleans, so both directions get a little
//! tolerance here.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::ValidationError;

/// Indonesian mobile number: 08xx, 628xx or +628xx
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,10}$").expect("valid phone regex"));

/// Lowercase dotted identifier used for setting keys
pub static SETTING_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_.]*$").expect("valid setting key regex"));

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// `YYYY-MM-DD` as produced by `<input type="date">`
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| invalid("date", "Tanggal harus berformat YYYY-MM-DD"))
}

/// Non-negative decimal number
pub fn validate_amount(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(()),
        _ => Err(invalid("amount", "Harus berupa angka positif")),
    }
}

pub fn validate_latitude(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(v) if (-90.0..=90.0).contains(&v) => Ok(()),
        _ => Err(invalid("latitude", "Latitude harus di antara -90 dan 90")),
    }
}

pub fn validate_longitude(value: &str) -> Result<(), ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(v) if (-180.0..=180.0).contains(&v) => Ok(()),
        _ => Err(invalid("longitude", "Longitude harus di antara -180 dan 180")),
    }
}

/// Cut an upstream timestamp down to what a date input accepts
pub fn date_input_value(raw: &str) -> String {
    let raw = raw.trim();
    match raw.get(..10) {
        Some(prefix) if NaiveDate::parse_from_str(prefix, DATE_FORMAT).is_ok() => prefix.to_string(),
        _ => String::new(),
    }
}

/// Upstream timestamp (RFC 3339, SQL style or bare date) for display
pub fn display_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return t.with_timezone(&Utc).format("%d %b %Y %H:%M").to_string();
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return t.format("%d %b %Y %H:%M").to_string();
        }
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(d) => d.format("%d %b %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Record text that may arrive as null or as a number
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Optional record text; null, blanks and non-scalars become `None`
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Blank form inputs become `None`
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Number or numeric string
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Bool, 0/1 or "true"/"false"
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim(), "true" | "1" | "on"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_numbers() {
        for ok in ["081234567890", "6281234567", "+6285712345678"] {
            assert!(PHONE_RE.is_match(ok), "{}", ok);
        }
        for bad in ["12345", "0212345678", "08123", "+1 555 0100"] {
            assert!(!PHONE_RE.is_match(bad), "{}", bad);
        }
    }

    #[test]
    fn test_dates() {
        assert!(validate_date("2025-02-28").is_ok());
        assert!(validate_date("2025-02-30").is_err());
        assert!(validate_date("28/02/2025").is_err());
        assert_eq!(date_input_value("2025-03-01T00:00:00.000Z"), "2025-03-01");
        assert_eq!(date_input_value("soon"), "");
    }

    #[test]
    fn test_display_timestamp_accepts_common_shapes() {
        assert_eq!(display_timestamp("2025-01-05T08:30:00Z"), "05 Jan 2025 08:30");
        assert_eq!(display_timestamp("2025-01-05T15:30:00+07:00"), "05 Jan 2025 08:30");
        assert_eq!(display_timestamp("2025-01-05 08:30:00"), "05 Jan 2025 08:30");
        assert_eq!(display_timestamp("2025-01-05T08:30:00.123"), "05 Jan 2025 08:30");
        assert_eq!(display_timestamp("2025-01-05"), "05 Jan 2025");
        assert_eq!(display_timestamp("kemarin"), "kemarin");
    }

    #[test]
    fn test_amounts_and_coordinates() {
        assert!(validate_amount("12.5").is_ok());
        assert!(validate_amount("-1").is_err());
        assert!(validate_amount("sepuluh").is_err());
        assert!(validate_latitude("-6.9147").is_ok());
        assert!(validate_latitude("91").is_err());
        assert!(validate_longitude("107.6098").is_ok());
        assert!(validate_longitude("").is_err());
    }

    #[test]
    fn test_lenient_deserializers() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_number")]
            diskon: Option<f64>,
            #[serde(default, deserialize_with = "lenient_bool")]
            is_global: bool,
            #[serde(default, deserialize_with = "empty_as_none")]
            email: Option<String>,
        }

        let row: Row =
            serde_json::from_str(r#"{"diskon":"15.50","is_global":1,"email":"  "}"#).unwrap();
        assert_eq!(row.diskon, Some(15.5));
        assert!(row.is_global);
        assert_eq!(row.email, None);

        let row: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(row.diskon, None);
        assert!(!row.is_global);
    }

    #[test]
    fn test_record_text_tolerates_null_and_numbers() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient_string")]
            kode: String,
            #[serde(default, deserialize_with = "lenient_text")]
            no_hp: Option<String>,
        }

        let row: Row = serde_json::from_str(r#"{"kode":null,"no_hp":81234567890}"#).unwrap();
        assert_eq!(row.kode, "");
        assert_eq!(row.no_hp.as_deref(), Some("81234567890"));

        let row: Row = serde_json::from_str(r#"{"kode":42,"no_hp":" "}"#).unwrap();
        assert_eq!(row.kode, "42");
        assert_eq!(row.no_hp, None);
    }
}
