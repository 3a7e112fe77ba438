//! Journal entry commands: list, add, edit, patch, delete.
//!
//! Every command loads the schema and the records, mutates, and saves in
//! full. Entries are addressed by position.

use crate::coercion::{coerce, coerce_form, FormInput};
use crate::core_state::CoreState;
use crate::db::{self, DatabaseError};
use crate::models::{Record, RecordCollection, Schema};

use super::{surface, NoticeSink, WRITE_FAILURES};

/// Everything the entry list view needs.
#[derive(Debug, Clone)]
pub struct EntryListing {
    pub schema: Schema,
    pub entries: RecordCollection,
}

/// Loads all entries reconciled against the current schema.
pub fn list_entries<S: NoticeSink>(state: &CoreState, sink: &mut S) -> Result<EntryListing, DatabaseError> {
    let schema = state.load_schema()?;
    let conn = state.open_db()?;
    let entries = db::load_records(&conn, &schema)?;
    if entries.is_empty() {
        sink.warning("No data found. Please add your first entry!");
    }
    Ok(EntryListing { schema, entries })
}

/// The entry at `index`, for pre-filling an edit form. `None` when the index
/// is out of range.
pub fn get_entry(state: &CoreState, index: usize) -> Result<Option<Record>, DatabaseError> {
    let schema = state.load_schema()?;
    let conn = state.open_db()?;
    let entries = db::load_records(&conn, &schema)?;
    Ok(entries.get(index).cloned())
}

/// Appends an entry built from the form. Returns its index.
pub fn add_entry<S: NoticeSink, F: FormInput + ?Sized>(
    state: &CoreState,
    form: &F,
    sink: &mut S,
) -> Result<Option<usize>, DatabaseError> {
    let schema = state.load_schema()?;
    let record = coerce_form(&schema, form);
    let mut conn = state.open_db()?;
    match db::append_record(&mut conn, &schema, record) {
        Ok(index) => {
            tracing::info!(index, "Entry added");
            sink.success("New entry added successfully!");
            Ok(Some(index))
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| None),
    }
}

/// Overwrites the entry at `index` with the form's values.
pub fn edit_entry<S: NoticeSink, F: FormInput + ?Sized>(
    state: &CoreState,
    index: usize,
    form: &F,
    sink: &mut S,
) -> Result<bool, DatabaseError> {
    let schema = state.load_schema()?;
    let record = coerce_form(&schema, form);
    let mut conn = state.open_db()?;
    match db::update_record(&mut conn, &schema, index, record) {
        Ok(()) => {
            tracing::info!(index, "Entry updated");
            sink.success("Entry updated successfully!");
            Ok(true)
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| false),
    }
}

/// Changes only the fields the form carries; every other field keeps its
/// stored value.
pub fn patch_entry<S: NoticeSink, F: FormInput + ?Sized>(
    state: &CoreState,
    index: usize,
    form: &F,
    sink: &mut S,
) -> Result<bool, DatabaseError> {
    let schema = state.load_schema()?;
    let mut patch = Record::new();
    for field in schema.fields() {
        if let Some(raw) = form.value(&field.name) {
            patch.set(field.name.clone(), coerce(raw, field));
        }
    }
    let mut conn = state.open_db()?;
    match db::update_record(&mut conn, &schema, index, patch) {
        Ok(()) => {
            tracing::info!(index, "Entry patched");
            sink.success("Entry updated successfully!");
            Ok(true)
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| false),
    }
}

/// Removes the entry at `index`; later entries shift down.
pub fn delete_entry<S: NoticeSink>(state: &CoreState, index: usize, sink: &mut S) -> Result<bool, DatabaseError> {
    let schema = state.load_schema()?;
    let mut conn = state.open_db()?;
    match db::delete_record(&mut conn, &schema, index) {
        Ok(_) => {
            tracing::info!(index, "Entry deleted");
            sink.success("Entry deleted successfully!");
            Ok(true)
        }
        Err(e) => surface(e, sink, &WRITE_FAILURES).map(|_| false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Notice;
    use crate::models::{FieldValue, NoticeLevel};

    fn setup() -> (tempfile::TempDir, CoreState) {
        let dir = tempfile::tempdir().unwrap();
        let state = CoreState::new(dir.path());
        state.initialize().unwrap();
        (dir, state)
    }

    fn add(state: &CoreState, date: &str, mood: &str) {
        let form: [(&str, &str); 2] = [("date", date), ("mood_score", mood)];
        let mut sink: Vec<Notice> = Vec::new();
        add_entry(state, &form[..], &mut sink).unwrap();
    }

    #[test]
    fn empty_journal_warns() {
        let (_dir, state) = setup();
        let mut sink: Vec<Notice> = Vec::new();
        let listing = list_entries(&state, &mut sink).unwrap();
        assert!(listing.entries.is_empty());
        assert_eq!(sink[0].level, NoticeLevel::Warning);
        assert_eq!(sink[0].message, "No data found. Please add your first entry!");
    }

    #[test]
    fn added_entry_is_coerced_and_reconciled() {
        let (_dir, state) = setup();
        let form: [(&str, &str); 3] = [("date", "2025-02-01"), ("mood_score", "6"), ("panic_intensity", "lots")];
        let mut sink: Vec<Notice> = Vec::new();
        let index = add_entry(&state, &form[..], &mut sink).unwrap();
        assert_eq!(index, Some(0));
        assert_eq!(sink[0].message, "New entry added successfully!");

        let listing = list_entries(&state, &mut Vec::<Notice>::new()).unwrap();
        let entry = listing.entries.get(0).unwrap();
        assert_eq!(entry.get("mood_score"), Some(&FieldValue::Integer(6)));
        assert_eq!(entry.get("panic_intensity"), Some(&FieldValue::Integer(0)));
        for field in listing.schema.fields() {
            assert!(entry.contains(&field.name), "{}", field.name);
        }
    }

    #[test]
    fn delete_shifts_later_entries() {
        let (_dir, state) = setup();
        for (i, day) in ["01", "02", "03", "04", "05"].iter().enumerate() {
            add(&state, &format!("2025-03-{day}"), &(i + 1).to_string());
        }
        let mut sink: Vec<Notice> = Vec::new();
        assert!(delete_entry(&state, 2, &mut sink).unwrap());
        assert_eq!(sink[0].message, "Entry deleted successfully!");

        let moved = get_entry(&state, 2).unwrap().unwrap();
        assert_eq!(moved.text("date"), "2025-03-04");

        let form: [(&str, &str); 2] = [("date", "2025-03-04"), ("mood_score", "9")];
        assert!(edit_entry(&state, 2, &form[..], &mut sink).unwrap());
        let edited = get_entry(&state, 2).unwrap().unwrap();
        assert_eq!(edited.number("mood_score"), Some(9.0));
        assert_eq!(get_entry(&state, 3).unwrap().unwrap().text("date"), "2025-03-05");
    }

    #[test]
    fn stale_index_is_a_danger_notice() {
        let (_dir, state) = setup();
        add(&state, "2025-01-01", "3");
        let mut sink: Vec<Notice> = Vec::new();
        assert!(!delete_entry(&state, 4, &mut sink).unwrap());
        assert_eq!(sink[0].level, NoticeLevel::Danger);

        let form: [(&str, &str); 1] = [("date", "2025-01-09")];
        assert!(!edit_entry(&state, 7, &form[..], &mut sink).unwrap());
        assert_eq!(sink[1].level, NoticeLevel::Danger);
        assert_eq!(get_entry(&state, 0).unwrap().unwrap().text("date"), "2025-01-01");
    }

    #[test]
    fn patch_keeps_fields_not_given() {
        let (_dir, state) = setup();
        let form: [(&str, &str); 3] = [("date", "2025-05-01"), ("mood_score", "4"), ("notes", "kept")];
        add_entry(&state, &form[..], &mut Vec::<Notice>::new()).unwrap();

        let mut sink: Vec<Notice> = Vec::new();
        let change: [(&str, &str); 2] = [("mood_score", "8"), ("not_a_field", "x")];
        assert!(patch_entry(&state, 0, &change[..], &mut sink).unwrap());
        assert_eq!(sink[0].message, "Entry updated successfully!");

        let entry = get_entry(&state, 0).unwrap().unwrap();
        assert_eq!(entry.number("mood_score"), Some(8.0));
        assert_eq!(entry.text("date"), "2025-05-01");
        assert_eq!(entry.text("notes"), "kept");
        assert!(!entry.contains("not_a_field"));

        assert!(!patch_entry(&state, 3, &change[..], &mut sink).unwrap());
        assert_eq!(sink[1].level, NoticeLevel::Danger);
    }
}
