//! Derived Metrics Engine: total medication, summary statistics and the
//! correlation matrix behind the correlation chart.

use serde::Serialize;

use crate::models::{Record, RecordCollection, Schema};

/// Medication fields summed into the derived total.
pub const MEDICATION_FIELDS: &[&str] = &["med1_mg", "med2_mg", "med3_mg", "med4_mg"];

/// Name of the derived (never persisted) total medication column.
pub const TOTAL_MEDICATION: &str = "total_med_mg";

/// Sum of the medication fields of one record; non-numeric counts as 0.
pub fn record_total_medication(record: &Record) -> f64 {
    MEDICATION_FIELDS
        .iter()
        .map(|name| record.number(name).unwrap_or(0.0))
        .sum()
}

/// Derived total medication, one value per record.
pub fn total_medication(records: &RecordCollection) -> Vec<f64> {
    records.iter().map(record_total_medication).collect()
}

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryRow {
    pub fn mean_display(&self) -> String {
        format!("{:.1}", self.mean)
    }

    pub fn min_display(&self) -> String {
        format!("{:.0}", self.min)
    }

    pub fn max_display(&self) -> String {
        format!("{:.0}", self.max)
    }
}

/// Mean/min/max for every numeric schema field present in the data.
/// Fields without a single numeric value are left out.
pub fn summary_statistics(records: &RecordCollection, schema: &Schema) -> Vec<SummaryRow> {
    schema
        .numeric_fields()
        .filter(|field| records.has_column(&field.name))
        .filter_map(|field| {
            let values: Vec<f64> = records.iter().filter_map(|r| r.number(&field.name)).collect();
            if values.is_empty() {
                return None;
            }
            let sum: f64 = values.iter().sum();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(SummaryRow {
                name: field.name.clone(),
                label: field.label.clone(),
                mean: sum / values.len() as f64,
                min,
                max,
            })
        })
        .collect()
}

/// Pearson correlation over the positions where both series have a value.
/// `None` when fewer than two pairs remain or either side has no variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Square matrix of pairwise correlations, labelled by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let values = columns
        .iter()
        .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
        .collect();
    CorrelationMatrix {
        labels: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    }
}
