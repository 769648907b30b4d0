//! Datel (telecom area) master data

use super::{lenient_choice, validate_choice, Choice, Lookups, RecordId, Resource, Values};
use crate::error::AppResult;
use crate::form::FormField;
use crate::table::Column;
use crate::validation::lenient_string;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Categori {
    Hero,
    NonHero,
}

impl Choice for Categori {
    const ALL: &'static [Self] = &[Categori::Hero, Categori::NonHero];

    fn code(&self) -> &'static str {
        match self {
            Categori::Hero => "HERO",
            Categori::NonHero => "NON_HERO",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Categori::Hero => "Hero",
            Categori::NonHero => "Non Hero",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubArea {
    Inner,
    Outer,
}

impl Choice for SubArea {
    const ALL: &'static [Self] = &[SubArea::Inner, SubArea::Outer];

    fn code(&self) -> &'static str {
        match self {
            SubArea::Inner => "INNER",
            SubArea::Outer => "OUTER",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SubArea::Inner => "Inner",
            SubArea::Outer => "Outer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datel {
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nama: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub kode_sto: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wilayah: String,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub categori: Option<Categori>,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub sub_area: Option<SubArea>,
}

fn validate_categori(value: &str) -> Result<(), ValidationError> {
    validate_choice::<Categori>(value, "Kategori harus HERO atau NON_HERO")
}

fn validate_sub_area(value: &str) -> Result<(), ValidationError> {
    validate_choice::<SubArea>(value, "Sub area harus INNER atau OUTER")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DatelForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Nama wajib diisi"))]
    pub nama: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Kode STO wajib diisi"))]
    pub kode_sto: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Wilayah wajib diisi"))]
    pub wilayah: String,
    #[serde(default)]
    #[validate(custom(function = "validate_categori"))]
    pub categori: String,
    #[serde(default)]
    #[validate(custom(function = "validate_sub_area"))]
    pub sub_area: String,
}

pub struct DatelResource;

impl Resource for DatelResource {
    type Record = Datel;
    type Form = DatelForm;

    const PATH: &'static str = "datel";
    const TITLE: &'static str = "Datel";

    fn columns() -> Vec<Column> {
        vec![
            Column::new("nama", "Nama"),
            Column::new("kode_sto", "Kode STO"),
            Column::new("wilayah", "Wilayah"),
            Column::new("categori", "Kategori"),
            Column::new("sub_area", "Sub Area"),
        ]
    }

    fn id(record: &Datel) -> String {
        record.id.to_string()
    }

    fn cells(record: &Datel) -> Vec<String> {
        vec![
            record.nama.clone(),
            record.kode_sto.clone(),
            record.wilayah.clone(),
            record.categori.map(|c| c.label()).unwrap_or("-").to_string(),
            record.sub_area.map(|s| s.label()).unwrap_or("-").to_string(),
        ]
    }

    fn fields(values: &Values, _lookups: &Lookups) -> Vec<FormField> {
        vec![
            FormField::text("nama", "Nama")
                .value(values.text("nama"))
                .placeholder("Datel Bandung")
                .required(),
            FormField::text("kode_sto", "Kode STO")
                .value(values.text("kode_sto"))
                .required(),
            FormField::text("wilayah", "Wilayah")
                .value(values.text("wilayah"))
                .required(),
            FormField::select("categori", "Kategori", Categori::options())
                .value(values.text("categori"))
                .required(),
            FormField::select("sub_area", "Sub Area", SubArea::options())
                .value(values.text("sub_area"))
                .required(),
        ]
    }

    fn payload(form: DatelForm) -> AppResult<Value> {
        Ok(json!({
            "nama": form.nama.trim(),
            "kode_sto": form.kode_sto.trim(),
            "wilayah": form.wilayah.trim(),
            "categori": form.categori.trim(),
            "sub_area": form.sub_area.trim(),
        }))
    }
}
