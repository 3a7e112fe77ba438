//! The ordered chart catalog.
//!
//! Each entry pairs a predicate over the prepared dataset with a builder that
//! describes the figure. Entries are independent: a false predicate skips
//! only that chart.

use super::canvas::{Color, Dash, Marker, Stroke, BLACK, DARK_GREY, LIGHT_GREY, MID_GREY};
use super::dataset::Dataset;
use super::figure::{AreaFill, BarChart, Figure, Heatmap, ReferenceLine, SecondaryAxis, Series, TrendChart};
use super::Presentation;
use crate::metrics::{correlation_matrix, MEDICATION_FIELDS};

/// Fields with a dedicated chart; any other numeric schema field is "custom".
pub const PREDEFINED_FIELDS: &[&str] = &[
    "mood_score",
    "panic_intensity",
    "headache_intensity",
    "sleep_hours",
    "hope_score",
    "sedation_feeling",
    "med1_mg",
    "med2_mg",
    "med3_mg",
    "med4_mg",
    "energy_level",
    "appetite",
    "social_interaction",
    "exercise_minutes",
    "die_thoughts",
];

/// Legacy distress-intensity column, charted when present in stored data.
pub const DISTRESS_FIELD: &str = "die_thoughts";

const SYMPTOM_FIELDS: [&str; 3] = ["mood_score", "panic_intensity", "headache_intensity"];
const WELLNESS_FIELDS: [(&str, &str); 3] = [
    ("energy_level", "Energy"),
    ("appetite", "Appetite"),
    ("social_interaction", "Social"),
];

const PALETTE: [Color; 4] = [BLACK, DARK_GREY, MID_GREY, LIGHT_GREY];
const MARKERS: [Marker; 4] = [Marker::Circle, Marker::Square, Marker::Triangle, Marker::Diamond];
const DASHES: [Dash; 4] = [Dash::Solid, Dash::Dashed, Dash::DashDot, Dash::Dotted];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    SymptomTrend,
    MedicationDosage,
    HeadacheVsMedication,
    Wellness,
    Sleep,
    Correlation,
    Exercise,
    MoodVsHope,
    DistressIntensity,
    CustomFields,
}

impl ChartId {
    /// Stable identifier, used for file names.
    pub fn slug(self) -> &'static str {
        match self {
            ChartId::SymptomTrend => "symptom_trend",
            ChartId::MedicationDosage => "medication_dosage",
            ChartId::HeadacheVsMedication => "headache_vs_medication",
            ChartId::Wellness => "wellness",
            ChartId::Sleep => "sleep",
            ChartId::Correlation => "correlation",
            ChartId::Exercise => "exercise",
            ChartId::MoodVsHope => "mood_vs_hope",
            ChartId::DistressIntensity => "distress_intensity",
            ChartId::CustomFields => "custom_fields",
        }
    }
}

pub struct ChartSpec {
    pub id: ChartId,
    pub title: &'static str,
    pub applies: fn(&Dataset<'_>) -> bool,
    pub build: fn(&Dataset<'_>, Presentation) -> Figure,
}

pub static CATALOG: [ChartSpec; 10] = [
    ChartSpec {
        id: ChartId::SymptomTrend,
        title: "Mood, Panic, and Headache Trends",
        applies: has_symptom_trio,
        build: symptom_trend,
    },
    ChartSpec {
        id: ChartId::MedicationDosage,
        title: "Medication Tracking",
        applies: has_any_medication,
        build: medication_dosage,
    },
    ChartSpec {
        id: ChartId::HeadacheVsMedication,
        title: "Headache vs Medication Relationship",
        applies: has_headache_and_medication,
        build: headache_vs_medication,
    },
    ChartSpec {
        id: ChartId::Wellness,
        title: "Wellness Tracking",
        applies: has_any_wellness,
        build: wellness,
    },
    ChartSpec {
        id: ChartId::Sleep,
        title: "Sleep Tracking",
        applies: has_sleep,
        build: sleep,
    },
    ChartSpec {
        id: ChartId::Correlation,
        title: "Correlation Analysis",
        applies: has_correlatable_columns,
        build: correlation,
    },
    ChartSpec {
        id: ChartId::Exercise,
        title: "Exercise Log",
        applies: has_exercise,
        build: exercise,
    },
    ChartSpec {
        id: ChartId::MoodVsHope,
        title: "Emotional Well-being",
        applies: has_mood_and_hope,
        build: mood_vs_hope,
    },
    ChartSpec {
        id: ChartId::DistressIntensity,
        title: "Death Thoughts Tracking",
        applies: has_distress,
        build: distress_intensity,
    },
    ChartSpec {
        id: ChartId::CustomFields,
        title: "Custom Fields Tracking",
        applies: has_custom_fields,
        build: custom_fields,
    },
];

pub fn spec(id: ChartId) -> Option<&'static ChartSpec> {
    CATALOG.iter().find(|s| s.id == id)
}

// ─── Predicates ───

fn has_symptom_trio(ds: &Dataset<'_>) -> bool {
    SYMPTOM_FIELDS.iter().all(|f| ds.has_column(f))
}

fn has_any_medication(ds: &Dataset<'_>) -> bool {
    MEDICATION_FIELDS.iter().any(|f| ds.has_column(f))
}

fn has_headache_and_medication(ds: &Dataset<'_>) -> bool {
    ds.has_column("headache_intensity") && ds.total_medication_sum() > 0.0
}

fn has_any_wellness(ds: &Dataset<'_>) -> bool {
    WELLNESS_FIELDS.iter().any(|(f, _)| ds.has_column(f))
}

fn has_sleep(ds: &Dataset<'_>) -> bool {
    ds.has_column("sleep_hours")
}

fn has_correlatable_columns(ds: &Dataset<'_>) -> bool {
    ds.numeric_columns().len() >= 2
}

fn has_exercise(ds: &Dataset<'_>) -> bool {
    ds.has_column("exercise_minutes")
}

fn has_mood_and_hope(ds: &Dataset<'_>) -> bool {
    ds.has_column("mood_score") && ds.has_column("hope_score")
}

fn has_distress(ds: &Dataset<'_>) -> bool {
    ds.has_column(DISTRESS_FIELD)
}

fn has_custom_fields(ds: &Dataset<'_>) -> bool {
    !custom_field_names(ds).is_empty()
}

/// Numeric schema fields without a dedicated chart that exist in the data,
/// as (name, label) in schema order.
pub fn custom_field_names(ds: &Dataset<'_>) -> Vec<(String, String)> {
    ds.schema()
        .numeric_fields()
        .filter(|f| !PREDEFINED_FIELDS.contains(&f.name.as_str()) && ds.has_column(&f.name))
        .map(|f| (f.name.clone(), f.label.clone()))
        .collect()
}

// ─── Builders ───

fn line(
    p: Presentation,
    label: Option<&str>,
    values: Vec<Option<f64>>,
    color: Color,
    dash: Dash,
    marker: Marker,
) -> Series {
    Series {
        label: label.map(str::to_string),
        values,
        stroke: Stroke::solid(color, p.line_width()).with_dash(dash),
        marker,
        marker_radius: p.marker_radius(),
    }
}

fn trend(ds: &Dataset<'_>, heading: &str, y_label: &str, series: Vec<Series>) -> TrendChart {
    TrendChart {
        heading: heading.to_string(),
        x_label: "Date".to_string(),
        y_label: y_label.to_string(),
        dates: ds.dates().to_vec(),
        series,
        secondary: None,
        reference_lines: Vec::new(),
        area_fill: None,
    }
}

fn symptom_trend(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let heading = match p {
        Presentation::Screen => "Mood, Panic, and Headache Over Time",
        Presentation::Print => "Core Symptoms",
    };
    let series = vec![
        line(p, Some("Mood"), ds.series("mood_score"), BLACK, Dash::Solid, Marker::Circle),
        line(p, Some("Panic"), ds.series("panic_intensity"), BLACK, Dash::Dashed, Marker::Square),
        line(p, Some("Headache"), ds.series("headache_intensity"), MID_GREY, Dash::Dotted, Marker::Triangle),
    ];
    Figure::Trend(trend(ds, heading, "Score (1-10)", series))
}

fn medication_dosage(ds: &Dataset<'_>, p: Presentation) -> Figure {
    // Numbered by position among the present columns, not by field name.
    let series = MEDICATION_FIELDS
        .iter()
        .filter(|f| ds.has_column(f))
        .enumerate()
        .map(|(i, f)| {
            let label = format!("Med {}", i + 1);
            line(p, Some(label.as_str()), ds.series(f), PALETTE[i % 4], DASHES[i % 4], MARKERS[i % 4])
        })
        .collect();
    Figure::Trend(trend(ds, "Medication Dosages Over Time", "Dosage (mg)", series))
}

fn headache_vs_medication(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let headache = line(p, Some("Headache"), ds.series("headache_intensity"), BLACK, Dash::Solid, Marker::Circle);
    let total = line(
        p,
        Some("Total Medication"),
        ds.total_medication().iter().map(|v| Some(*v)).collect(),
        MID_GREY,
        Dash::Dashed,
        Marker::Square,
    );
    let mut chart = trend(ds, "Headache vs Total Medication", "Headache Intensity", vec![headache]);
    chart.secondary = Some(SecondaryAxis {
        label: "Total Medication (mg)".to_string(),
        series: vec![total],
    });
    Figure::Trend(chart)
}

fn wellness(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let styles = [
        (BLACK, Dash::Solid, Marker::Circle),
        (DARK_GREY, Dash::Dashed, Marker::Square),
        (MID_GREY, Dash::DashDot, Marker::Triangle),
    ];
    let series = WELLNESS_FIELDS
        .iter()
        .zip(styles)
        .filter(|((field, _), _)| ds.has_column(field))
        .map(|((field, label), (color, dash, marker))| line(p, Some(*label), ds.series(field), color, dash, marker))
        .collect();
    Figure::Trend(trend(ds, "Wellness Metrics Over Time", "Score (1-10)", series))
}

fn sleep(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let recommended = match p {
        Presentation::Screen => "Recommended (7h)",
        Presentation::Print => "Recommended",
    };
    let mut chart = trend(
        ds,
        "Sleep Pattern",
        "Hours",
        vec![line(p, None, ds.series("sleep_hours"), BLACK, Dash::Solid, Marker::Circle)],
    );
    chart.reference_lines.push(ReferenceLine {
        value: 7.0,
        label: recommended.to_string(),
        stroke: Stroke::solid(MID_GREY, p.line_width() * 0.8).with_dash(Dash::Dashed),
    });
    Figure::Trend(chart)
}

fn correlation(ds: &Dataset<'_>, _p: Presentation) -> Figure {
    let columns: Vec<(String, Vec<Option<f64>>)> = ds
        .numeric_columns()
        .into_iter()
        .map(|name| (name.to_string(), ds.series(name)))
        .collect();
    Figure::Heatmap(Heatmap {
        heading: "Correlation Matrix".to_string(),
        matrix: correlation_matrix(&columns),
    })
}

fn exercise(ds: &Dataset<'_>, _p: Presentation) -> Figure {
    Figure::Bars(BarChart {
        heading: "Exercise Activity".to_string(),
        x_label: "Date".to_string(),
        y_label: "Minutes".to_string(),
        dates: ds.dates().to_vec(),
        values: ds.series("exercise_minutes"),
        color: BLACK,
    })
}

fn mood_vs_hope(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let series = vec![
        line(p, Some("Mood"), ds.series("mood_score"), BLACK, Dash::Solid, Marker::Circle),
        line(p, Some("Hope"), ds.series("hope_score"), MID_GREY, Dash::Dashed, Marker::Square),
    ];
    Figure::Trend(trend(ds, "Mood vs Hope Score", "Score (1-10)", series))
}

fn distress_intensity(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let mut series = line(p, None, ds.series(DISTRESS_FIELD), BLACK, Dash::Solid, Marker::Circle);
    series.stroke.width = p.line_width() * 1.2;
    series.marker_radius = p.marker_radius() * 1.3;
    let mut chart = trend(ds, "Death Thoughts Intensity Over Time", "Intensity (0-10)", vec![series]);
    chart.area_fill = Some(AreaFill {
        series: 0,
        color: BLACK,
        alpha: 0.2,
    });
    chart.reference_lines.push(ReferenceLine {
        value: 5.0,
        label: "Moderate Level".to_string(),
        stroke: Stroke::solid(LIGHT_GREY, p.line_width() * 0.6).with_dash(Dash::Dashed),
    });
    Figure::Trend(chart)
}

fn custom_fields(ds: &Dataset<'_>, p: Presentation) -> Figure {
    let series = custom_field_names(ds)
        .iter()
        .enumerate()
        .map(|(i, (name, label))| {
            line(p, Some(label.as_str()), ds.series(name), PALETTE[i % 4], DASHES[(i / 4) % 4], MARKERS[i % 4])
        })
        .collect();
    Figure::Trend(trend(ds, "Custom Metrics Over Time", "Value", series))
}
