//! Declarative form dialog
//!
//! Callers describe fields and own their values; the dialog only renders
//! them. Validation happens in the caller, which maps errors back onto the
//! fields with [`apply_errors`].

use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Select,
    Checkbox,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    /// HTML input type for text fields (`text`, `email`, `tel`, `date`)
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help: Option<String>,
    pub options: Vec<SelectOption>,
    /// Caller-supplied markup for custom fields
    pub html: Option<String>,
    pub error: Option<String>,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            input_type: "text",
            value: String::new(),
            checked: false,
            required: false,
            placeholder: None,
            help: None,
            options: Vec::new(),
            html: None,
            error: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: &str, label: &str) -> Self {
        Self::text(name, label).input_type("email")
    }

    pub fn tel(name: &str, label: &str) -> Self {
        Self::text(name, label).input_type("tel")
    }

    pub fn date(name: &str, label: &str) -> Self {
        Self::text(name, label).input_type("date")
    }

    pub fn number(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Textarea)
    }

    pub fn select(name: &str, label: &str, options: Vec<SelectOption>) -> Self {
        Self {
            options,
            ..Self::new(name, label, FieldKind::Select)
        }
    }

    pub fn checkbox(name: &str, label: &str, checked: bool) -> Self {
        Self {
            checked,
            ..Self::new(name, label, FieldKind::Checkbox)
        }
    }

    pub fn custom(name: &str, label: &str, html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Self::new(name, label, FieldKind::Custom)
        }
    }

    fn input_type(mut self, input_type: &'static str) -> Self {
        self.input_type = input_type;
        self
    }

    /// Set the current value; for selects this also marks the chosen option
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        for option in &mut self.options {
            option.selected = option.value == self.value;
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Modal form rendered by the `form_dialog` partial
#[derive(Debug, Clone, Serialize)]
pub struct FormDialog {
    pub title: String,
    pub description: Option<String>,
    pub action: String,
    pub cancel_href: String,
    pub submit_label: String,
    pub fields: Vec<FormField>,
}

impl FormDialog {
    pub fn new(title: impl Into<String>, action: impl Into<String>, cancel_href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            action: action.into(),
            cancel_href: cancel_href.into(),
            submit_label: "Simpan".to_string(),
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    pub fn fields(mut self, fields: Vec<FormField>) -> Self {
        self.fields = fields;
        self
    }
}

/// Copy validation messages onto the matching fields, first message wins
pub fn apply_errors(fields: &mut [FormField], errors: &ValidationErrors) {
    for (name, field_errors) in errors.field_errors() {
        let name: &str = name.as_ref();
        let Some(field) = fields.iter_mut().find(|f| f.name == name) else {
            continue;
        };
        if let Some(first) = field_errors.first() {
            field.error = Some(
                first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} tidak valid", field.label)),
            );
        }
    }
}

/// Flatten validation errors into one line for a toast
pub fn summarize_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(name, errs)| {
            let name: &str = name.as_ref();
            let name = name.to_string();
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} tidak valid", name))
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join(", ")
}
