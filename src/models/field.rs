//! Field definitions and the ordered schema that governs records.
//!
//! The schema is persisted as a JSON object keyed by field name. Key order is
//! display order, so (de)serialization goes through `Vec`, never a hash map.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::enums::FieldType;

/// Fields that can be redefined but never removed.
pub const PROTECTED_FIELDS: &[&str] = &["date", "notes", "thoughts", "remarks"];

pub fn is_protected(name: &str) -> bool {
    PROTECTED_FIELDS.contains(&name)
}

/// One schema entry.
///
/// `min`/`max` keep the persisted shape: `None` means the key was absent,
/// `Some(None)` means an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(skip)]
    pub name: String,
    pub label: String,
    #[serde(rename = "type", deserialize_with = "lenient_field_type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bound")]
    pub min: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "bound")]
    pub max: Option<Option<i64>>,
}

impl FieldDefinition {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
        required: bool,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required,
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn min(&self) -> Option<i64> {
        self.min.flatten()
    }

    pub fn max(&self) -> Option<i64> {
        self.max.flatten()
    }
}

/// Unknown type names in a hand-edited schema load as `text`.
fn lenient_field_type<'de, D: Deserializer<'de>>(d: D) -> Result<FieldType, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        tracing::warn!(field_type = %raw, "Unknown field type, treating as text");
        FieldType::Text
    }))
}

mod bound {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<i64>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<i64>>, D::Error> {
        Option::<i64>::deserialize(d).map(Some)
    }
}

/// Ordered set of field definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        let mut schema = Schema::default();
        for field in fields {
            schema.upsert(field);
        }
        schema
    }

    /// Built-in default field set used on first run and by `reset`.
    pub fn builtin() -> Self {
        use FieldType::*;
        fn f(name: &str, label: &str, t: FieldType, req: bool, min: Option<i64>, max: Option<i64>) -> FieldDefinition {
            FieldDefinition::new(name, label, t, req, min, max)
        }
        Schema::new(vec![
            f("date", "Date", Date, true, None, None),
            f("mood_score", "Mood Score", Number, true, Some(1), Some(10)),
            f("panic_intensity", "Panic Intensity", Number, true, Some(1), Some(10)),
            f("headache_intensity", "Headache Intensity", Number, true, Some(1), Some(10)),
            f("sleep_hours", "Sleep Hours", Number, true, Some(0), Some(24)),
            f("hope_score", "Hope Score", Number, true, Some(1), Some(10)),
            f("sedation_feeling", "Sedation Feeling", Number, true, Some(1), Some(10)),
            f("med1_mg", "Medication 1 (mg)", Number, true, Some(0), None),
            f("med2_mg", "Medication 2 (mg)", Number, true, Some(0), None),
            f("med3_mg", "Medication 3 (mg)", Number, true, Some(0), None),
            f("med4_mg", "Medication 4 (mg)", Number, true, Some(0), None),
            f("energy_level", "Energy Level", Number, false, Some(1), Some(10)),
            f("appetite", "Appetite", Number, false, Some(1), Some(10)),
            f("social_interaction", "Social Interaction", Number, false, Some(1), Some(10)),
            f("exercise_minutes", "Exercise (minutes)", Number, false, Some(0), None),
            f("therapy_session", "Therapy Session", Text, false, None, None),
            f("notes", "Notes", Textarea, true, None, None),
            f("thoughts", "Personal Thoughts", Textarea, false, None, None),
            f("remarks", "Remarks", Textarea, false, None, None),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.field_type.is_numeric())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Inserts or replaces by name. A replaced field keeps its position.
    /// Returns the previous definition when one was overwritten.
    pub fn upsert(&mut self, field: FieldDefinition) -> Option<FieldDefinition> {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => Some(std::mem::replace(existing, field)),
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldDefinition> {
        let pos = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(pos))
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field name to field definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut schema = Schema::default();
                while let Some((name, mut field)) = access.next_entry::<String, FieldDefinition>()? {
                    field.name = name;
                    schema.upsert(field);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_order_and_protected_fields() {
        let schema = Schema::builtin();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names.first(), Some(&"date"));
        assert_eq!(names.last(), Some(&"remarks"));
        assert_eq!(schema.len(), 19);
        for p in PROTECTED_FIELDS {
            assert!(schema.contains(p), "default schema must carry {p}");
        }
        assert!(!schema.contains("die_thoughts"));
    }

    #[test]
    fn serialization_keeps_insertion_order() {
        let schema = Schema::builtin();
        let json = serde_json::to_string(&schema).unwrap();
        let date_pos = json.find("\"date\"").unwrap();
        let mood_pos = json.find("\"mood_score\"").unwrap();
        let remarks_pos = json.find("\"remarks\"").unwrap();
        assert!(date_pos < mood_pos && mood_pos < remarks_pos);

        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn null_and_absent_bounds_survive_round_trip() {
        let json = r#"{
            "a": {"label": "A", "type": "number", "required": true, "min": null, "max": 5},
            "b": {"label": "B", "type": "text", "required": false}
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        let a = schema.get("a").unwrap();
        assert_eq!(a.min, Some(None));
        assert_eq!(a.max, Some(Some(5)));
        let b = schema.get("b").unwrap();
        assert_eq!(b.min, None);
        assert_eq!(b.max(), None);

        let out = serde_json::to_value(&schema).unwrap();
        assert!(out["a"]["min"].is_null());
        assert!(out["a"].as_object().unwrap().contains_key("min"));
        assert!(!out["b"].as_object().unwrap().contains_key("min"));
        assert_eq!(out["a"]["max"], 5);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut schema = Schema::builtin();
        let previous = schema.upsert(FieldDefinition::new(
            "mood_score", "Mood", FieldType::Number, false, None, None,
        ));
        assert_eq!(previous.unwrap().label, "Mood Score");
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names[1], "mood_score");
        assert_eq!(schema.get("mood_score").unwrap().label, "Mood");
    }

    #[test]
    fn remove_returns_definition() {
        let mut schema = Schema::builtin();
        assert!(schema.remove("appetite").is_some());
        assert!(schema.remove("appetite").is_none());
        assert!(!schema.contains("appetite"));
    }

    #[test]
    fn numeric_fields_filter_by_type() {
        let schema = Schema::builtin();
        assert!(schema.numeric_fields().all(|f| f.field_type == FieldType::Number));
        assert!(schema.numeric_fields().any(|f| f.name == "sleep_hours"));
        assert!(!schema.numeric_fields().any(|f| f.name == "notes"));
    }

    #[test]
    fn unknown_type_in_stored_schema_loads_as_text() {
        let json = r#"{"date": {"label": "Date", "type": "date"}, "mood_checkbox": {"label": "Mood?", "type": "checkbox"}}"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get("mood_checkbox").unwrap().field_type, FieldType::Text);
        assert_eq!(schema.get("date").unwrap().field_type, FieldType::Date);
    }
}
