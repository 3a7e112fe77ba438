//! Chart Generation Pipeline.
//!
//! Records → [`Dataset`] (valid dates only, sorted) → catalog predicates →
//! figures → PNG artifacts. A failure while rendering any chart aborts the
//! whole call; nothing partial is returned.

pub mod canvas;
pub mod catalog;
pub mod dataset;
pub mod figure;
pub mod font;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

pub use catalog::{ChartId, ChartSpec, CATALOG};
pub use dataset::{parse_entry_date, Dataset};
pub use figure::Figure;

use crate::error::JournalError;
use crate::models::{RecordCollection, Schema};
use canvas::Canvas;

/// Where a chart will be shown. Print variants are smaller and carry the
/// report's shorter headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Screen,
    Print,
}

impl Presentation {
    pub fn canvas_size(self, figure: &Figure) -> (u32, u32) {
        match (self, figure) {
            (Presentation::Screen, Figure::Heatmap(_)) => (1000, 800),
            (Presentation::Screen, _) => (1200, 600),
            (Presentation::Print, _) => (720, 420),
        }
    }

    pub fn line_width(self) -> f64 {
        match self {
            Presentation::Screen => 3.5,
            Presentation::Print => 3.0,
        }
    }

    pub fn marker_radius(self) -> f64 {
        match self {
            Presentation::Screen => 4.5,
            Presentation::Print => 3.5,
        }
    }
}

/// One rendered chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub id: ChartId,
    pub title: String,
    pub png: Vec<u8>,
}

impl ChartArtifact {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn to_inline(&self) -> InlineChart {
        InlineChart {
            title: self.title.clone(),
            image: self.to_base64(),
        }
    }
}

/// Payload for inline display: title plus base64 PNG.
#[derive(Debug, Clone, Serialize)]
pub struct InlineChart {
    pub title: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct ChartSet {
    pub charts: Vec<ChartArtifact>,
    /// Entries that survived date filtering.
    pub entry_count: usize,
}

/// Catalog entries whose predicate holds, in catalog order.
pub fn applicable_charts(dataset: &Dataset<'_>) -> Vec<&'static ChartSpec> {
    CATALOG.iter().filter(|spec| (spec.applies)(dataset)).collect()
}

/// Builds and rasterises one chart.
pub fn render_chart(
    spec: &ChartSpec,
    dataset: &Dataset<'_>,
    presentation: Presentation,
) -> Result<Canvas, JournalError> {
    let figure = (spec.build)(dataset, presentation);
    let (width, height) = presentation.canvas_size(&figure);
    figure.render(width, height).map_err(|e| {
        tracing::error!(chart = spec.title, error = %e, "Chart rendering failed");
        e
    })
}

/// Renders every applicable chart for interactive display.
pub fn generate_charts(schema: &Schema, records: &RecordCollection) -> Result<ChartSet, JournalError> {
    let dataset = Dataset::prepare(schema, records).ok_or(JournalError::NoVisualizableData)?;

    let mut charts = Vec::new();
    for spec in applicable_charts(&dataset) {
        let canvas = render_chart(spec, &dataset, Presentation::Screen)?;
        charts.push(ChartArtifact {
            id: spec.id,
            title: spec.title.to_string(),
            png: canvas.encode_png()?,
        });
    }

    tracing::info!(
        charts = charts.len(),
        entries = dataset.len(),
        skipped = records.len() - dataset.len(),
        "Generated charts"
    );
    Ok(ChartSet {
        charts,
        entry_count: dataset.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDefinition, FieldType, FieldValue, Record};
    use image::GenericImageView;

    fn entry(date: &str, mood: i64, panic: i64, headache: i64, sleep: i64, med: i64) -> Record {
        Record::new()
            .with("date", FieldValue::Text(date.into()))
            .with("mood_score", FieldValue::Integer(mood))
            .with("panic_intensity", FieldValue::Integer(panic))
            .with("headache_intensity", FieldValue::Integer(headache))
            .with("sleep_hours", FieldValue::Integer(sleep))
            .with("med1_mg", FieldValue::Integer(med))
    }

    fn sample() -> RecordCollection {
        RecordCollection::new(
            vec![],
            vec![
                entry("2025-01-03", 5, 3, 2, 7, 50),
                entry("2025-01-01", 3, 6, 5, 5, 50),
                entry("2025-01-02", 4, 4, 4, 6, 25),
            ],
        )
    }

    #[test]
    fn empty_collection_is_not_visualizable() {
        let err = generate_charts(&Schema::builtin(), &RecordCollection::default()).unwrap_err();
        assert!(matches!(err, JournalError::NoVisualizableData));
    }

    #[test]
    fn all_invalid_dates_are_not_visualizable() {
        let data = RecordCollection::new(vec![], vec![entry("someday", 1, 1, 1, 1, 0), entry("", 2, 2, 2, 2, 0)]);
        let err = generate_charts(&Schema::builtin(), &data).unwrap_err();
        assert!(matches!(err, JournalError::NoVisualizableData));
    }

    #[test]
    fn generates_applicable_charts_in_catalog_order() {
        let set = generate_charts(&Schema::builtin(), &sample()).unwrap();
        let ids: Vec<ChartId> = set.charts.iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![
                ChartId::SymptomTrend,
                ChartId::MedicationDosage,
                ChartId::HeadacheVsMedication,
                ChartId::Sleep,
                ChartId::Correlation,
            ]
        );
        assert_eq!(set.entry_count, 3);
    }

    #[test]
    fn artifacts_are_decodable_png() {
        let set = generate_charts(&Schema::builtin(), &sample()).unwrap();
        let first = &set.charts[0];
        let decoded = image::load_from_memory(&first.png).unwrap();
        assert_eq!(decoded.dimensions(), (1200, 600));

        let heatmap = set.charts.iter().find(|c| c.id == ChartId::Correlation).unwrap();
        let decoded = image::load_from_memory(&heatmap.png).unwrap();
        assert_eq!(decoded.dimensions(), (1000, 800));
    }

    #[test]
    fn invalid_rows_are_skipped_not_fatal() {
        let mut data = sample();
        data.append(entry("not-a-date", 9, 9, 9, 9, 9));
        let set = generate_charts(&Schema::builtin(), &data).unwrap();
        assert_eq!(set.entry_count, 3);
    }

    #[test]
    fn base64_payload_round_trips() {
        let set = generate_charts(&Schema::builtin(), &sample()).unwrap();
        let inline = set.charts[0].to_inline();
        assert_eq!(inline.title, "Mood, Panic, and Headache Trends");
        assert_eq!(STANDARD.decode(inline.image).unwrap(), set.charts[0].png);
    }

    #[test]
    fn print_canvas_is_smaller() {
        let schema = Schema::builtin();
        let data = sample();
        let ds = Dataset::prepare(&schema, &data).unwrap();
        let spec = catalog::spec(ChartId::Sleep).unwrap();
        let canvas = render_chart(spec, &ds, Presentation::Print).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (720, 420));
    }

    fn full_entry(day: u32, custom: &str) -> Record {
        let base = day as i64;
        let mut record = entry(&format!("2025-04-{day:02}"), 3 + base % 5, 2 + base % 4, 1 + base % 6, 5 + base % 3, 25 * base);
        for (i, name) in [
            "hope_score",
            "sedation_feeling",
            "med2_mg",
            "med3_mg",
            "med4_mg",
            "energy_level",
            "appetite",
            "social_interaction",
            "exercise_minutes",
            "die_thoughts",
        ]
        .iter()
        .enumerate()
        {
            record.set(*name, FieldValue::Integer((base * (i as i64 + 1)) % 10));
        }
        record.set(custom, FieldValue::Integer(base * 2));
        record
    }

    fn schema_with(custom: &str, label: &str) -> Schema {
        let mut schema = Schema::builtin();
        schema.upsert(FieldDefinition::new(custom, label, FieldType::Number, false, None, None));
        schema
    }

    #[test]
    fn full_dataset_renders_every_chart() {
        let schema = schema_with("pain_level", "Pain Level");
        let data = RecordCollection::new(vec![], (1..=6).map(|d| full_entry(d, "pain_level")).collect());
        let set = generate_charts(&schema, &data).unwrap();

        let ids: Vec<ChartId> = set.charts.iter().map(|c| c.id).collect();
        let catalog: Vec<ChartId> = CATALOG.iter().map(|s| s.id).collect();
        assert_eq!(ids, catalog);

        for chart in &set.charts {
            let decoded = image::load_from_memory(&chart.png).unwrap();
            let expected = if chart.id == ChartId::Correlation { (1000, 800) } else { (1200, 600) };
            assert_eq!(decoded.dimensions(), expected, "{}", chart.title);
        }
    }

    #[test]
    fn long_custom_field_name_does_not_break_gallery() {
        let name = "hours_spent_on_guided_breathing_and_meditation_exercises_daily";
        let schema = schema_with(name, "Breathing and meditation (hours per day)");
        let data = RecordCollection::new(vec![], (1..=3).map(|d| full_entry(d, name)).collect());
        let set = generate_charts(&schema, &data).unwrap();
        assert_eq!(set.charts.len(), CATALOG.len());
        assert!(set.charts.iter().any(|c| c.id == ChartId::Correlation));
        assert!(set.charts.iter().any(|c| c.id == ChartId::CustomFields));
    }
}
