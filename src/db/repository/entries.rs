//! Record Store: journal entries in a single `entries` table.
//!
//! One column per field name, added on demand. Columns are never dropped:
//! removing a field from the schema leaves its data in place. Every mutation
//! is a full load-mutate-save inside one transaction.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};

use crate::db::{entry_columns, quote_ident, DatabaseError};
use crate::error::JournalError;
use crate::models::{FieldValue, Record, RecordCollection, Schema};

/// Loads every entry in positional order and reconciles it against `schema`.
pub fn load_records(conn: &Connection, schema: &Schema) -> Result<RecordCollection, DatabaseError> {
    let columns = entry_columns(conn)?;

    let mut records = Vec::new();
    if !columns.is_empty() {
        let select_list = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {select_list} FROM entries ORDER BY position");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (i, name) in columns.iter().enumerate() {
                if let Some(value) = from_sql(row.get_ref(i)?) {
                    record.set(name.clone(), value);
                }
            }
            records.push(record);
        }
    } else {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        records.resize_with(count as usize, Record::new);
    }

    let mut collection = RecordCollection::new(columns, records);
    collection.reconcile(schema);
    tracing::debug!(
        rows = collection.len(),
        columns = collection.columns().len(),
        "Loaded journal entries"
    );
    Ok(collection)
}

/// Replaces the stored entries with `records` (full overwrite).
pub fn save_records(conn: &mut Connection, records: &RecordCollection) -> Result<(), DatabaseError> {
    let tx = conn.transaction()?;
    ensure_columns(&tx, records.columns().iter().map(String::as_str))?;
    tx.execute("DELETE FROM entries", [])?;

    let columns = records.columns();
    let mut column_list = String::from("position");
    let mut placeholders = String::from("?1");
    for (i, name) in columns.iter().enumerate() {
        column_list.push_str(", ");
        column_list.push_str(&quote_ident(name));
        placeholders.push_str(&format!(", ?{}", i + 2));
    }
    let sql = format!("INSERT INTO entries ({column_list}) VALUES ({placeholders})");

    {
        let mut stmt = tx.prepare(&sql)?;
        for (position, record) in records.iter().enumerate() {
            let mut values = Vec::with_capacity(columns.len() + 1);
            values.push(Value::Integer(position as i64));
            for name in columns {
                values.push(record.get(name).map(to_sql).unwrap_or(Value::Null));
            }
            stmt.execute(params_from_iter(values))?;
        }
    }

    tx.commit()?;
    tracing::debug!(rows = records.len(), "Saved journal entries");
    Ok(())
}

/// Adds a column for every name the table does not have yet. SQLite column
/// names are case-insensitive, so `Mood` already covers `mood`.
/// Returns how many columns were created.
pub fn ensure_columns<'a>(
    conn: &Connection,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<usize, DatabaseError> {
    let mut existing = entry_columns(conn)?;
    let mut added = 0;
    for name in names {
        if name == "position" {
            return Err(DatabaseError::ConstraintViolation(
                "'position' is reserved for the entry index".into(),
            ));
        }
        if existing.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            continue;
        }
        conn.execute_batch(&format!("ALTER TABLE entries ADD COLUMN {}", quote_ident(name)))?;
        tracing::info!(column = name, "Added journal column");
        existing.push(name.to_string());
        added += 1;
    }
    Ok(added)
}

/// Appends a record and returns its index.
pub fn append_record(
    conn: &mut Connection,
    schema: &Schema,
    record: Record,
) -> Result<usize, JournalError> {
    let mut records = load_records(conn, schema)?;
    let index = records.append(record);
    save_records(conn, &records)?;
    Ok(index)
}

/// Overwrites the record at `index` with the fields present in `record`.
pub fn update_record(
    conn: &mut Connection,
    schema: &Schema,
    index: usize,
    record: Record,
) -> Result<(), JournalError> {
    let mut records = load_records(conn, schema)?;
    records.update(index, record)?;
    save_records(conn, &records)?;
    Ok(())
}

/// Deletes the record at `index`; later records move down by one.
pub fn delete_record(
    conn: &mut Connection,
    schema: &Schema,
    index: usize,
) -> Result<Record, JournalError> {
    let mut records = load_records(conn, schema)?;
    let removed = records.delete(index)?;
    save_records(conn, &records)?;
    Ok(removed)
}

fn from_sql(value: ValueRef<'_>) -> Option<FieldValue> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) => Some(FieldValue::Integer(v)),
        ValueRef::Real(v) => Some(FieldValue::Real(v)),
        ValueRef::Text(bytes) => Some(FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(bytes) => Some(FieldValue::Text(String::from_utf8_lossy(bytes).into_owned())),
    }
}

fn to_sql(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => Value::Integer(*v),
        FieldValue::Real(v) => Value::Real(*v),
        FieldValue::Text(s) => Value::Text(s.clone()),
        FieldValue::Empty => Value::Null,
    }
}
