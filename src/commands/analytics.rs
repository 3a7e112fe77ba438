//! Read-only analytics commands: chart gallery and PDF export.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::charts::{self, ChartSet};
use crate::core_state::CoreState;
use crate::db::{self, DatabaseError};
use crate::report;

use super::{surface, Artifact, ArtifactResponder, FailureMessages, NoticeSink};

const GRAPH_FAILURES: FailureMessages<'static> = FailureMessages {
    no_dates: "No valid date entries found. Please check your data.",
    rendering_prefix: "Error generating graphs",
};

const EXPORT_FAILURES: FailureMessages<'static> = FailureMessages {
    no_dates: "No valid date entries found for export.",
    rendering_prefix: "Error generating PDF",
};

/// Renders every applicable chart. `None` when there is nothing to show;
/// the reason has been sent to the sink.
pub fn generate_graphs<S: NoticeSink>(state: &CoreState, sink: &mut S) -> Result<Option<ChartSet>, DatabaseError> {
    let schema = state.load_schema()?;
    let conn = state.open_db()?;
    let records = db::load_records(&conn, &schema)?;
    drop(conn);

    if records.is_empty() {
        sink.warning("No data available for visualization. Please add entries first.");
        return Ok(None);
    }

    match charts::generate_charts(&schema, &records) {
        Ok(set) => Ok(Some(set)),
        Err(e) => surface(e, sink, &GRAPH_FAILURES).map(|_| None),
    }
}

/// Builds the PDF report, writes it to the exports directory and hands it
/// to the responder. Returns the written path.
pub fn export_report<S: NoticeSink, R: ArtifactResponder>(
    state: &CoreState,
    generated_at: NaiveDateTime,
    sink: &mut S,
    responder: &mut R,
) -> Result<Option<PathBuf>, DatabaseError> {
    let schema = state.load_schema()?;
    let conn = state.open_db()?;
    let records = db::load_records(&conn, &schema)?;
    drop(conn);

    if records.is_empty() {
        sink.warning("No data to export!");
        return Ok(None);
    }

    let written = report::generate_report(&schema, &records, generated_at)
        .and_then(|bytes| report::export_report_to_file(&bytes, &state.exports_dir(), generated_at));
    let path = match written {
        Ok(path) => path,
        Err(e) => return surface(e, sink, &EXPORT_FAILURES).map(|_| None),
    };

    responder.deliver(&Artifact {
        file_name: report::report_filename(generated_at),
        mime_type: "application/pdf",
        path: path.clone(),
    });
    Ok(Some(path))
}
