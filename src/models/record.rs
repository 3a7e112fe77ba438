//! Journal records and the positional collection they live in.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::Schema;
use crate::error::JournalError;

/// A typed cell value. Mirrors the SQLite storage classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Empty,
}

impl FieldValue {
    /// Numeric view of the value. Numeric text parses, anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Real(v) if v.is_finite() => Some(*v),
            FieldValue::Real(_) => None,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            FieldValue::Empty => None,
        }
    }

    pub fn as_text(&self) -> String {
        self.to_string()
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Real(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// One journal row: field name to value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric view of one field (`None` when missing or non-numeric).
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    /// Text view of one field (empty when missing).
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(FieldValue::as_text).unwrap_or_default()
    }
}

/// Ordered rows plus the column set they span.
///
/// Indices are positional: deleting a row shifts every later row down by one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordCollection {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut collection = Self { columns, records: Vec::new() };
        for record in records {
            collection.register_columns(&record);
            collection.records.push(record);
        }
        collection
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Backfills every schema field missing from the data with its zero value.
    /// Columns outside the schema are left alone.
    pub fn reconcile(&mut self, schema: &Schema) {
        for field in schema.fields() {
            if !self.has_column(&field.name) {
                self.columns.push(field.name.clone());
            }
            for record in &mut self.records {
                if !record.contains(&field.name) {
                    record.set(field.name.clone(), field.field_type.zero_value());
                }
            }
        }
    }

    /// Appends a row and returns its index.
    pub fn append(&mut self, record: Record) -> usize {
        self.register_columns(&record);
        self.records.push(record);
        self.records.len() - 1
    }

    /// Overwrites the fields present in `record`; other columns keep their values.
    pub fn update(&mut self, index: usize, record: Record) -> Result<(), JournalError> {
        let len = self.records.len();
        self.register_columns(&record);
        let target = self
            .records
            .get_mut(index)
            .ok_or(JournalError::RecordNotFound { index, len })?;
        for (name, value) in record.values {
            target.values.insert(name, value);
        }
        Ok(())
    }

    /// Removes a row and compacts the indices after it.
    pub fn delete(&mut self, index: usize) -> Result<Record, JournalError> {
        if index >= self.records.len() {
            return Err(JournalError::RecordNotFound { index, len: self.records.len() });
        }
        Ok(self.records.remove(index))
    }

    fn register_columns(&mut self, record: &Record) {
        for key in record.keys() {
            if !self.has_column(key) {
                self.columns.push(key.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::FieldType;
    use crate::models::field::FieldDefinition;

    fn row(day: i64) -> Record {
        Record::new()
            .with("date", FieldValue::Text(format!("2025-01-0{day}")))
            .with("mood_score", FieldValue::Integer(day))
    }

    fn five_rows() -> RecordCollection {
        RecordCollection::new(vec![], (1..=5).map(row).collect())
    }

    #[test]
    fn reconcile_backfills_every_schema_field() {
        let schema = Schema::builtin();
        let mut data = five_rows();
        data.reconcile(&schema);
        for record in data.iter() {
            for name in schema.names() {
                assert!(record.contains(name), "missing {name}");
            }
        }
        assert_eq!(data.get(0).unwrap().get("sleep_hours"), Some(&FieldValue::Integer(0)));
        assert_eq!(
            data.get(0).unwrap().get("notes"),
            Some(&FieldValue::Text(String::new()))
        );
        // existing values are untouched
        assert_eq!(data.get(2).unwrap().number("mood_score"), Some(3.0));
    }

    #[test]
    fn reconcile_keeps_columns_outside_schema() {
        let mut data = RecordCollection::new(
            vec![],
            vec![Record::new().with("legacy", FieldValue::Integer(4))],
        );
        data.reconcile(&Schema::builtin());
        assert!(data.has_column("legacy"));
        assert_eq!(data.get(0).unwrap().number("legacy"), Some(4.0));
    }

    #[test]
    fn remove_then_readd_keeps_column_set() {
        let mut schema = Schema::builtin();
        schema.upsert(FieldDefinition::new("pain", "Pain", FieldType::Number, false, None, None));
        let mut data = five_rows();
        data.reconcile(&schema);
        let before: Vec<String> = data.columns().to_vec();

        let removed = schema.remove("pain").unwrap();
        schema.upsert(removed);
        data.reconcile(&schema);
        assert_eq!(data.columns(), before.as_slice());
    }

    #[test]
    fn delete_reindexes_following_rows() {
        let mut data = five_rows();
        data.delete(2).unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data.get(2).unwrap().number("mood_score"), Some(4.0));
        assert_eq!(data.get(3).unwrap().number("mood_score"), Some(5.0));

        data.update(2, Record::new().with("mood_score", FieldValue::Integer(9)))
            .unwrap();
        let edited = data.get(2).unwrap();
        assert_eq!(edited.number("mood_score"), Some(9.0));
        assert_eq!(edited.text("date"), "2025-01-04");
    }

    #[test]
    fn out_of_range_index_is_not_found() {
        let mut data = five_rows();
        assert!(matches!(
            data.delete(5),
            Err(JournalError::RecordNotFound { index: 5, len: 5 })
        ));
        assert!(data.update(7, Record::new()).is_err());
    }

    #[test]
    fn append_returns_new_index_and_registers_columns() {
        let mut data = five_rows();
        let idx = data.append(Record::new().with("energy_level", FieldValue::Integer(3)));
        assert_eq!(idx, 5);
        assert!(data.has_column("energy_level"));
    }

    #[test]
    fn numeric_view_parses_text_and_rejects_blank() {
        assert_eq!(FieldValue::Text(" 12 ".into()).as_f64(), Some(12.0));
        assert_eq!(FieldValue::Text(String::new()).as_f64(), None);
        assert_eq!(FieldValue::Text("abc".into()).as_f64(), None);
        assert_eq!(FieldValue::Real(f64::NAN).as_f64(), None);
        assert_eq!(FieldValue::Empty.as_f64(), None);
    }
}
