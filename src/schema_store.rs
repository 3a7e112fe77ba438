//! Schema Store: the field configuration persisted as one JSON document.
//!
//! Every operation re-reads the file, mutates, and writes it back in full.
//! There is no in-memory copy shared between calls.

use std::path::{Path, PathBuf};

use crate::db::DatabaseError;
use crate::error::JournalError;
use crate::models::{is_protected, FieldDefinition, FieldType, Schema};

/// User input for adding or editing a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    /// Explicit name; derived from `label` when empty.
    pub name: Option<String>,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl FieldRequest {
    pub fn new(label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: None,
            label: label.into(),
            field_type,
            required: false,
            min: None,
            max: None,
        }
    }
}

/// Label → field name: trimmed, lowercased, spaces become underscores.
///
/// Distinct labels can collide: "Pain Level" and "pain level" both map to
/// `pain_level`.
pub fn derive_field_name(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// Adds `request` to `schema`. A colliding name overwrites the earlier
/// definition in place.
pub fn apply_add(schema: &mut Schema, request: &FieldRequest) -> Result<FieldDefinition, JournalError> {
    let label = request.label.trim();
    let raw_name = request
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(label);
    let name = derive_field_name(raw_name);

    if name.is_empty() || label.is_empty() {
        return Err(JournalError::Validation("Field name and label are required!".into()));
    }
    if name == "position" {
        return Err(JournalError::Validation("'position' is a reserved field name".into()));
    }

    let field = FieldDefinition::new(
        name.clone(),
        label,
        request.field_type,
        request.required,
        request.min,
        request.max,
    );
    if let Some(previous) = schema.upsert(field.clone()) {
        tracing::warn!(
            field = %name,
            previous_label = %previous.label,
            new_label = %label,
            "Field name collision; existing definition overwritten"
        );
    }
    Ok(field)
}

/// Replaces the definition of an existing field, keeping its position.
pub fn apply_edit(
    schema: &mut Schema,
    name: &str,
    request: &FieldRequest,
) -> Result<FieldDefinition, JournalError> {
    if !schema.contains(name) {
        return Err(JournalError::FieldNotFound(name.to_string()));
    }
    let label = request.label.trim();
    if label.is_empty() {
        return Err(JournalError::Validation("Field label is required!".into()));
    }
    let field = FieldDefinition::new(
        name,
        label,
        request.field_type,
        request.required,
        request.min,
        request.max,
    );
    schema.upsert(field.clone());
    Ok(field)
}

/// Removes a field. Protected names fail; unknown names are a no-op.
pub fn apply_remove(schema: &mut Schema, name: &str) -> Result<Option<FieldDefinition>, JournalError> {
    if is_protected(name) {
        return Err(JournalError::ProtectedField(name.to_string()));
    }
    Ok(schema.remove(name))
}

/// File-backed schema store.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    path: PathBuf,
}

impl SchemaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted schema, or the built-in defaults when nothing is persisted.
    pub fn load(&self) -> Result<Schema, DatabaseError> {
        if !self.path.exists() {
            return Ok(Schema::builtin());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let schema: Schema = serde_json::from_str(&raw)?;
        Ok(schema)
    }

    /// Total overwrite, in field order.
    pub fn save(&self, schema: &Schema) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(schema)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), fields = schema.len(), "Saved schema");
        Ok(())
    }

    /// Writes the default schema on first run. Returns true when it did.
    pub fn initialize(&self) -> Result<bool, DatabaseError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&Schema::builtin())?;
        tracing::info!(path = %self.path.display(), "Initialized default schema");
        Ok(true)
    }

    pub fn add_field(&self, request: &FieldRequest) -> Result<FieldDefinition, JournalError> {
        let mut schema = self.load()?;
        let field = apply_add(&mut schema, request)?;
        self.save(&schema)?;
        tracing::info!(field = %field.name, field_type = %field.field_type, "Field added");
        Ok(field)
    }

    pub fn edit_field(&self, name: &str, request: &FieldRequest) -> Result<FieldDefinition, JournalError> {
        let mut schema = self.load()?;
        let field = apply_edit(&mut schema, name, request)?;
        self.save(&schema)?;
        tracing::info!(field = %name, "Field updated");
        Ok(field)
    }

    pub fn remove_field(&self, name: &str) -> Result<Option<FieldDefinition>, JournalError> {
        let mut schema = self.load()?;
        let removed = apply_remove(&mut schema, name)?;
        if removed.is_some() {
            self.save(&schema)?;
            tracing::info!(field = %name, "Field removed");
        }
        Ok(removed)
    }

    /// Restores the built-in schema, discarding custom fields.
    pub fn reset(&self) -> Result<Schema, DatabaseError> {
        let schema = Schema::builtin();
        self.save(&schema)?;
        tracing::info!("Schema reset to defaults");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SchemaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SchemaStore::new(dir.path().join("fields_config.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), Schema::builtin());
    }

    #[test]
    fn initialize_only_writes_once() {
        let (_dir, store) = store();
        assert!(store.initialize().unwrap());
        assert!(!store.initialize().unwrap());
        assert!(store.path().exists());
    }

    #[test]
    fn save_then_load_round_trips_order_and_bounds() {
        let (_dir, store) = store();
        let mut schema = Schema::builtin();
        schema.upsert(FieldDefinition::new("zeta", "Zeta", FieldType::Number, true, Some(-3), None));
        store.save(&schema).unwrap();
        let back = store.load().unwrap();
        assert_eq!(back, schema);
        let names: Vec<&str> = back.names().collect();
        assert_eq!(names.last(), Some(&"zeta"));
    }

    #[test]
    fn absent_bounds_stay_absent_after_round_trip() {
        let (_dir, store) = store();
        std::fs::write(
            store.path(),
            r#"{"date": {"label": "Date", "type": "date", "required": true}}"#,
        )
        .unwrap();
        let schema = store.load().unwrap();
        store.save(&schema).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("\"min\""));
        assert_eq!(store.load().unwrap(), schema);
    }

    #[test]
    fn add_derives_name_from_label() {
        let (_dir, store) = store();
        let mut req = FieldRequest::new("  Anxiety Level ", FieldType::Number);
        req.min = Some(0);
        req.max = Some(10);
        let field = store.add_field(&req).unwrap();
        assert_eq!(field.name, "anxiety_level");
        assert_eq!(field.label, "Anxiety Level");
        let schema = store.load().unwrap();
        assert_eq!(schema.get("anxiety_level").unwrap().max(), Some(10));
    }

    #[test]
    fn add_prefers_explicit_name() {
        let mut schema = Schema::builtin();
        let mut req = FieldRequest::new("Walk", FieldType::Number);
        req.name = Some("Walk KM".into());
        let field = apply_add(&mut schema, &req).unwrap();
        assert_eq!(field.name, "walk_km");
    }

    #[test]
    fn add_rejects_empty_label_without_writing() {
        let (_dir, store) = store();
        let err = store.add_field(&FieldRequest::new("   ", FieldType::Text)).unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn colliding_labels_overwrite_first_definition() {
        let mut schema = Schema::builtin();
        apply_add(&mut schema, &FieldRequest::new("Pain Level", FieldType::Number)).unwrap();
        apply_add(&mut schema, &FieldRequest::new("pain level", FieldType::Text)).unwrap();
        let field = schema.get("pain_level").unwrap();
        assert_eq!(field.label, "pain level");
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(schema.names().filter(|n| *n == "pain_level").count(), 1);
    }

    #[test]
    fn remove_protected_field_fails() {
        let (_dir, store) = store();
        for name in ["date", "notes", "thoughts", "remarks"] {
            let err = store.remove_field(name).unwrap_err();
            assert!(matches!(err, JournalError::ProtectedField(_)));
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn remove_unknown_field_is_noop() {
        let (_dir, store) = store();
        assert!(store.remove_field("nope").unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn remove_then_readd_restores_field() {
        let (_dir, store) = store();
        store.remove_field("appetite").unwrap().unwrap();
        assert!(!store.load().unwrap().contains("appetite"));
        store.add_field(&FieldRequest::new("Appetite", FieldType::Number)).unwrap();
        assert!(store.load().unwrap().contains("appetite"));
    }

    #[test]
    fn edit_keeps_position_and_rejects_unknown() {
        let (_dir, store) = store();
        let mut req = FieldRequest::new("Mood (0-10)", FieldType::Number);
        req.min = Some(0);
        store.edit_field("mood_score", &req).unwrap();
        let schema = store.load().unwrap();
        assert_eq!(schema.names().nth(1), Some("mood_score"));
        assert_eq!(schema.get("mood_score").unwrap().label, "Mood (0-10)");

        let err = store.edit_field("missing", &req).unwrap_err();
        assert!(matches!(err, JournalError::FieldNotFound(_)));
        let err = store
            .edit_field("mood_score", &FieldRequest::new("", FieldType::Number))
            .unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));
    }

    #[test]
    fn protected_fields_can_be_redefined() {
        let mut schema = Schema::builtin();
        apply_edit(&mut schema, "notes", &FieldRequest::new("Daily Notes", FieldType::Textarea)).unwrap();
        assert_eq!(schema.get("notes").unwrap().label, "Daily Notes");
    }

    #[test]
    fn reset_discards_custom_fields() {
        let (_dir, store) = store();
        store.add_field(&FieldRequest::new("Custom", FieldType::Number)).unwrap();
        store.reset().unwrap();
        assert_eq!(store.load().unwrap(), Schema::builtin());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let (_dir, store) = store();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.load(), Err(DatabaseError::Json(_))));
    }
}
