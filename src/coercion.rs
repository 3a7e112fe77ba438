//! Field Coercion Engine: raw form text to typed values.
//!
//! Numbers parse as integers; empty or malformed input falls back to 0 without
//! an error. Every other type passes through unchanged. `required` is not
//! enforced here.

use std::collections::HashMap;

use crate::error::JournalError;
use crate::models::{FieldDefinition, FieldType, FieldValue, Record, Schema};
use crate::schema_store::FieldRequest;

/// Key-value form accessor supplied by the caller.
pub trait FormInput {
    fn value(&self, key: &str) -> Option<&str>;
}

impl FormInput for HashMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FormInput for [(&str, &str)] {
    fn value(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

/// Converts one raw value according to its field definition.
pub fn coerce(raw: &str, field: &FieldDefinition) -> FieldValue {
    match field.field_type {
        FieldType::Number => FieldValue::Integer(parse_integer(raw, &field.name)),
        FieldType::Date | FieldType::Text | FieldType::Textarea => FieldValue::Text(raw.to_string()),
    }
}

fn parse_integer(raw: &str, field: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    match raw.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            tracing::debug!(field, raw, "Numeric input not an integer, stored as 0");
            0
        }
    }
}

/// Builds a full record from a form, one value per schema field.
/// Keys missing from the form count as empty input.
pub fn coerce_form<F: FormInput + ?Sized>(schema: &Schema, form: &F) -> Record {
    let mut record = Record::new();
    for field in schema.fields() {
        let raw = form.value(&field.name).unwrap_or("");
        record.set(field.name.clone(), coerce(raw, field));
    }
    record
}

/// Parses the field-management form (`field_name`, `field_label`,
/// `field_type`, `field_required`, `field_min`, `field_max`).
pub fn parse_field_request<F: FormInput + ?Sized>(form: &F) -> Result<FieldRequest, JournalError> {
    let type_raw = form.value("field_type").unwrap_or("text");
    let field_type = type_raw
        .parse::<FieldType>()
        .map_err(|_| JournalError::Validation(format!("Unknown field type '{type_raw}'")))?;

    Ok(FieldRequest {
        name: form.value("field_name").map(str::to_string),
        label: form.value("field_label").unwrap_or("").trim().to_string(),
        field_type,
        required: form.value("field_required") == Some("on"),
        min: parse_bound(form.value("field_min"), "minimum")?,
        max: parse_bound(form.value("field_max"), "maximum")?,
    })
}

fn parse_bound(raw: Option<&str>, which: &str) -> Result<Option<i64>, JournalError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| JournalError::Validation(format!("Field {which} must be a whole number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number() -> FieldDefinition {
        FieldDefinition::new("mood_score", "Mood", FieldType::Number, true, Some(1), Some(10))
    }

    #[test]
    fn numbers_parse_as_integers() {
        assert_eq!(coerce("7", &number()), FieldValue::Integer(7));
        assert_eq!(coerce(" 12 ", &number()), FieldValue::Integer(12));
        assert_eq!(coerce("-3", &number()), FieldValue::Integer(-3));
    }

    #[test]
    fn malformed_numbers_fall_back_to_zero() {
        assert_eq!(coerce("", &number()), FieldValue::Integer(0));
        assert_eq!(coerce("abc", &number()), FieldValue::Integer(0));
        assert_eq!(coerce("7.5", &number()), FieldValue::Integer(0));
    }

    #[test]
    fn bounds_are_not_enforced() {
        assert_eq!(coerce("99", &number()), FieldValue::Integer(99));
    }

    #[test]
    fn other_types_pass_through() {
        let notes = FieldDefinition::new("notes", "Notes", FieldType::Textarea, true, None, None);
        assert_eq!(coerce("  spaced  ", &notes), FieldValue::Text("  spaced  ".into()));
        let date = FieldDefinition::new("date", "Date", FieldType::Date, true, None, None);
        assert_eq!(coerce("not a date", &date), FieldValue::Text("not a date".into()));
    }

    #[test]
    fn form_yields_value_for_every_field() {
        let schema = Schema::builtin();
        let form: &[(&str, &str)] = &[("date", "2025-02-01"), ("mood_score", "6"), ("notes", "calm")];
        let record = coerce_form(&schema, form);
        for name in schema.names() {
            assert!(record.contains(name));
        }
        assert_eq!(record.number("mood_score"), Some(6.0));
        assert_eq!(record.number("panic_intensity"), Some(0.0));
        assert_eq!(record.text("thoughts"), "");
        assert_eq!(record.text("notes"), "calm");
    }

    #[test]
    fn field_request_parses_form() {
        let mut form = HashMap::new();
        form.insert("field_label".to_string(), " Anxiety ".to_string());
        form.insert("field_type".to_string(), "number".to_string());
        form.insert("field_required".to_string(), "on".to_string());
        form.insert("field_min".to_string(), "0".to_string());
        form.insert("field_max".to_string(), "".to_string());
        let req = parse_field_request(&form).unwrap();
        assert_eq!(req.label, "Anxiety");
        assert_eq!(req.field_type, FieldType::Number);
        assert!(req.required);
        assert_eq!(req.min, Some(0));
        assert_eq!(req.max, None);
    }

    #[test]
    fn field_request_defaults_to_text_and_rejects_bad_bounds() {
        let form: &[(&str, &str)] = &[("field_label", "Mantra")];
        let req = parse_field_request(form).unwrap();
        assert_eq!(req.field_type, FieldType::Text);
        assert!(!req.required);

        let bad: &[(&str, &str)] = &[("field_label", "X"), ("field_min", "low")];
        assert!(matches!(parse_field_request(bad), Err(JournalError::Validation(_))));

        let bad_type: &[(&str, &str)] = &[("field_label", "X"), ("field_type", "checkbox")];
        assert!(matches!(parse_field_request(bad_type), Err(JournalError::Validation(_))));
    }
}
