//! Field management commands.

use crate::coercion::{parse_field_request, FormInput};
use crate::core_state::CoreState;
use crate::db::{self, DatabaseError};
use crate::models::{FieldDefinition, Schema};

use super::{surface, NoticeSink, WRITE_FAILURES};

pub fn list_fields(state: &CoreState) -> Result<Schema, DatabaseError> {
    state.load_schema()
}

/// Adds a field from the management form. Existing entries gain the column
/// immediately.
pub fn add_field<S: NoticeSink, F: FormInput + ?Sized>(
    state: &CoreState,
    form: &F,
    sink: &mut S,
) -> Result<Option<FieldDefinition>, DatabaseError> {
    let added = parse_field_request(form).and_then(|request| state.schema_store().add_field(&request));
    let field = match added {
        Ok(field) => field,
        Err(e) => return surface(e, sink, &WRITE_FAILURES).map(|_| None),
    };

    let conn = state.open_db()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
    if count > 0 {
        db::ensure_columns(&conn, [field.name.as_str()])?;
    }

    sink.success(format!("Field \"{}\" added successfully!", field.label));
    Ok(Some(field))
}

/// Replaces label, type, required flag and bounds of an existing field.
/// The name never changes.
pub fn edit_field<S: NoticeSink, F: FormInput + ?Sized>(
    state: &CoreState,
    name: &str,
    form: &F,
    sink: &mut S,
) -> Result<Option<FieldDefinition>, DatabaseError> {
    let edited = parse_field_request(form).and_then(|request| state.schema_store().edit_field(name, &request));
    match edited {
        Ok(field) => {
            sink.success(format!("Field \"{}\" updated successfully!", field.label));
            Ok(Some(field))
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| None),
    }
}

/// Drops a field from the schema. Stored values stay in the database.
pub fn remove_field<S: NoticeSink>(state: &CoreState, name: &str, sink: &mut S) -> Result<bool, DatabaseError> {
    match state.schema_store().remove_field(name) {
        Ok(Some(_)) => {
            sink.success("Field deleted successfully!");
            Ok(true)
        }
        Ok(None) => {
            tracing::debug!(field = name, "Remove requested for unknown field");
            Ok(false)
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| false),
    }
}

pub fn reset_fields<S: NoticeSink>(state: &CoreState, sink: &mut S) -> Result<Schema, DatabaseError> {
    let schema = state.schema_store().reset()?;
    sink.success("Fields reset to default configuration!");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{entries, Notice};
    use crate::models::{FieldType, FieldValue, NoticeLevel};

    fn setup() -> (tempfile::TempDir, CoreState) {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path());
        state.initialize().unwrap();
        (dir, state)
    }

    #[test]
    fn add_field_backfills_existing_entries() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        let entry: [(&str, &str); 1] = [("date", "2025-04-01")];
        entries::add_entry(&state, &entry[..], &mut sink).unwrap();

        let form: [(&str, &str); 3] = [("field_name", ""), ("field_label", "Pain Level"), ("field_type", "number")];
        let field = add_field(&state, &form[..], &mut sink).unwrap().unwrap();
        assert_eq!(field.name, "pain_level");
        assert_eq!(sink.last().unwrap().message, "Field \"Pain Level\" added successfully!");

        let listing = entries::list_entries(&state, &mut sink).unwrap();
        assert!(listing.entries.has_column("pain_level"));
        assert_eq!(listing.entries.get(0).unwrap().get("pain_level"), Some(&FieldValue::Integer(0)));
    }

    #[test]
    fn add_field_requires_label() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        let form: [(&str, &str); 2] = [("field_label", "  "), ("field_type", "text")];
        assert!(add_field(&state, &form[..], &mut sink).unwrap().is_none());
        assert_eq!(sink[0].level, NoticeLevel::Danger);
        assert_eq!(sink[0].message, "Field name and label are required!");
        assert_eq!(list_fields(&state).unwrap(), Schema::builtin());
    }

    #[test]
    fn edit_keeps_name_and_reports_unknown() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        let form: [(&str, &str); 4] = [
            ("field_label", "Mood (1-10)"),
            ("field_type", "number"),
            ("field_min", "1"),
            ("field_max", "10"),
        ];
        let field = edit_field(&state, "mood_score", &form[..], &mut sink).unwrap().unwrap();
        assert_eq!(field.name, "mood_score");
        assert_eq!(field.field_type, FieldType::Number);
        assert_eq!(sink[0].message, "Field \"Mood (1-10)\" updated successfully!");

        assert!(edit_field(&state, "nope", &form[..], &mut sink).unwrap().is_none());
        assert_eq!(sink[1].message, "Field not found!");
    }

    #[test]
    fn protected_fields_cannot_be_removed() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        assert!(!remove_field(&state, "notes", &mut sink).unwrap());
        assert_eq!(sink[0].level, NoticeLevel::Danger);
        assert!(list_fields(&state).unwrap().contains("notes"));

        assert!(remove_field(&state, "mood_score", &mut sink).unwrap());
        assert_eq!(sink[1].message, "Field deleted successfully!");
        assert!(!remove_field(&state, "mood_score", &mut sink).unwrap());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn reset_restores_defaults() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        remove_field(&state, "mood_score", &mut sink).unwrap();
        let schema = reset_fields(&state, &mut sink).unwrap();
        assert_eq!(schema, Schema::builtin());
        assert_eq!(sink.last().unwrap().message, "Fields reset to default configuration!");
    }
}
