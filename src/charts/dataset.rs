//! Chart input: the records with a parseable date, in chronological order.

use chrono::{NaiveDate, NaiveDateTime};

use crate::metrics::{self, TOTAL_MEDICATION};
use crate::models::{Record, RecordCollection, Schema};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses an entry date in any of the accepted layouts.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub struct Dataset<'s> {
    schema: &'s Schema,
    dates: Vec<NaiveDateTime>,
    records: RecordCollection,
    total_medication: Vec<f64>,
}

impl<'s> Dataset<'s> {
    /// Drops rows whose date does not parse and sorts the rest.
    /// `None` when no row survives.
    pub fn prepare(schema: &'s Schema, records: &RecordCollection) -> Option<Self> {
        let mut rows: Vec<(NaiveDateTime, Record)> = records
            .iter()
            .filter_map(|r| parse_entry_date(&r.text("date")).map(|d| (d, r.clone())))
            .collect();
        let dropped = records.len() - rows.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Skipping entries with unparseable dates");
        }
        if rows.is_empty() {
            return None;
        }
        rows.sort_by_key(|(date, _)| *date);

        let (dates, kept): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let records = RecordCollection::new(records.columns().to_vec(), kept);
        let total_medication = metrics::total_medication(&records);
        Some(Self {
            schema,
            dates,
            records,
            total_medication,
        })
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    pub fn records(&self) -> &RecordCollection {
        &self.records
    }

    pub fn first_date(&self) -> Option<NaiveDateTime> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDateTime> {
        self.dates.last().copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.records.has_column(name)
    }

    /// Numeric view of one column, `None` where a row has no number.
    pub fn series(&self, name: &str) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.number(name)).collect()
    }

    pub fn total_medication(&self) -> &[f64] {
        &self.total_medication
    }

    pub fn total_medication_sum(&self) -> f64 {
        self.total_medication.iter().sum()
    }

    /// Columns where every non-blank value is a number and at least one is.
    /// The date and the derived total are never included.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.records
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|name| *name != "date" && *name != TOTAL_MEDICATION)
            .filter(|name| {
                let mut any = false;
                for record in self.records.iter() {
                    match record.get(name) {
                        Some(value) if !value.is_blank() => {
                            if value.as_f64().is_none() {
                                return false;
                            }
                            any = true;
                        }
                        _ => {}
                    }
                }
                any
            })
            .collect()
    }
}
