use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Control kind for a form field. Closed set: descriptor data carrying any
/// other string lands on `Unknown`, which renders as a plain text control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Password,
    Number,
    Checkbox,
    #[serde(other)]
    Unknown,
}

/// One form input as described by the caller: name, label, kind, constraints.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub help_text: Option<String>,
}

/// A whole form: ordered fields plus optional title, submit label and
/// initial values. Loaded from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub submit_label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub values: BTreeMap<String, FormValue>,
}

/// A user-entered value. Untagged so YAML/JSON scalars map directly:
/// `true` -> Bool, `42` -> Number, anything else -> Text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FormValue {
    /// String shown in the control for this value.
    pub fn display(&self) -> String {
        match self {
            FormValue::Text(s) => s.clone(),
            FormValue::Number(n) => trim_float(*n),
            FormValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FormValue::Bool(true))
    }
}

/// Current values keyed by field name. Owned by the caller; the form widget
/// only reads it and proposes updates via effects.
pub type FormValues = BTreeMap<String, FormValue>;

/// Displayed value for a field: the map entry coerced to string, empty when
/// absent. The widget holds no copy of form data.
pub fn display_value(values: &FormValues, name: &str) -> String {
    values.get(name).map(|v| v.display()).unwrap_or_default()
}

/// Convert a raw edited string to the value implied by the field's type.
/// Number fields parse to f64; a raw string that does not parse (empty, a
/// lone '-') passes through as Text so the caller never sees NaN and the
/// display always round-trips.
pub fn coerce_edit(field_type: FieldType, raw: String) -> FormValue {
    match field_type {
        FieldType::Number => match raw.trim().parse::<f64>() {
            Ok(n) => FormValue::Number(n),
            Err(_) => FormValue::Text(raw),
        },
        _ => FormValue::Text(raw),
    }
}

pub fn trim_float(v: f64) -> String {
    let mut s = format!("{v:.6}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s.is_empty() {
        s.push('0');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_defaults_to_text() {
        let spec: FieldSpec = serde_yaml::from_str("name: email\nlabel: Email\n").unwrap();
        assert_eq!(spec.field_type, FieldType::Text);
        assert!(!spec.required);
        assert!(spec.help_text.is_none());
    }

    #[test]
    fn unknown_type_string_hits_default_arm() {
        let spec: FieldSpec =
            serde_yaml::from_str("name: color\nlabel: Color\ntype: select\n").unwrap();
        assert_eq!(spec.field_type, FieldType::Unknown);
    }

    #[test]
    fn form_spec_parses_fields_and_initial_values() {
        let yaml = r#"
title: Account
submit_label: Create
fields:
  - name: age
    label: Age
    type: number
    required: true
  - name: bio
    label: Bio
    type: textarea
    help_text: A few lines about you.
values:
  age: 30
  active: true
  bio: hello
"#;
        let spec: FormSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.title.as_deref(), Some("Account"));
        assert_eq!(spec.submit_label.as_deref(), Some("Create"));
        assert_eq!(spec.fields.len(), 2);
        assert!(spec.fields[0].required);
        assert_eq!(spec.values.get("age"), Some(&FormValue::Number(30.0)));
        assert_eq!(spec.values.get("active"), Some(&FormValue::Bool(true)));
        assert_eq!(
            spec.values.get("bio"),
            Some(&FormValue::Text("hello".into()))
        );
    }

    #[test]
    fn coerce_number_parses_to_f64() {
        assert_eq!(
            coerce_edit(FieldType::Number, "42".into()),
            FormValue::Number(42.0)
        );
        assert_eq!(
            coerce_edit(FieldType::Number, "3.5".into()),
            FormValue::Number(3.5)
        );
    }

    #[test]
    fn coerce_number_passes_unparseable_raw_through_as_text() {
        assert_eq!(
            coerce_edit(FieldType::Number, String::new()),
            FormValue::Text(String::new())
        );
        assert_eq!(
            coerce_edit(FieldType::Number, "-".into()),
            FormValue::Text("-".into())
        );
    }

    #[test]
    fn coerce_text_keeps_exact_string() {
        assert_eq!(
            coerce_edit(FieldType::Text, "  spaced  ".into()),
            FormValue::Text("  spaced  ".into())
        );
        assert_eq!(
            coerce_edit(FieldType::Unknown, "x".into()),
            FormValue::Text("x".into())
        );
    }

    #[test]
    fn display_value_defaults_to_empty_when_absent() {
        let values = FormValues::new();
        assert_eq!(display_value(&values, "missing"), "");
    }

    #[test]
    fn display_trims_float_noise() {
        assert_eq!(FormValue::Number(42.0).display(), "42");
        assert_eq!(FormValue::Number(0.5).display(), "0.5");
        assert_eq!(FormValue::Bool(true).display(), "true");
    }
}
