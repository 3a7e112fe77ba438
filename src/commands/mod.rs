//! Command layer: the operations a front end invokes.
//!
//! Commands are thin. They open state, call into the stores and pipelines,
//! and turn domain outcomes into notices. Storage failures are the only
//! errors returned to the caller; everything else becomes a notice.

pub mod analytics;
pub mod entries;
pub mod fields;

use std::path::PathBuf;

use serde::Serialize;

use crate::db::DatabaseError;
use crate::error::JournalError;
use crate::models::NoticeLevel;

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Fire-and-forget sink for notices (flash messages, log lines, ...).
pub trait NoticeSink {
    fn notify(&mut self, level: NoticeLevel, message: String);

    fn success(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Success, message.into());
    }

    fn warning(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Warning, message.into());
    }

    fn danger(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.notify(NoticeLevel::Danger, message.into());
    }
}

impl NoticeSink for Vec<Notice> {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.push(Notice { level, message });
    }
}

/// A finished file ready to hand over to the user.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub path: PathBuf,
}

/// Delivers a finished artifact (download response, CLI output, ...).
pub trait ArtifactResponder {
    fn deliver(&mut self, artifact: &Artifact);
}

impl ArtifactResponder for Vec<Artifact> {
    fn deliver(&mut self, artifact: &Artifact) {
        self.push(artifact.clone());
    }
}

/// Messages used when a read path has nothing to show or fails to render.
pub(crate) struct FailureMessages<'a> {
    pub no_dates: &'a str,
    pub rendering_prefix: &'a str,
}

/// Routes a domain failure to the sink. Storage failures are handed back.
pub(crate) fn surface<S: NoticeSink>(
    err: JournalError,
    sink: &mut S,
    messages: &FailureMessages<'_>,
) -> Result<(), DatabaseError> {
    match err {
        JournalError::Database(db) => return Err(db),
        JournalError::Validation(msg) => sink.danger(msg),
        JournalError::ProtectedField(_) => {
            sink.danger("Cannot delete protected fields (date, notes, thoughts, remarks)!")
        }
        JournalError::FieldNotFound(_) => sink.danger("Field not found!"),
        e @ JournalError::RecordNotFound { .. } => sink.danger(e.to_string()),
        JournalError::NoVisualizableData => sink.warning(messages.no_dates),
        JournalError::Rendering(msg) => sink.danger(format!("{}: {msg}", messages.rendering_prefix)),
    }
    Ok(())
}

/// Failure messages for write paths, where charts never render.
pub(crate) const WRITE_FAILURES: FailureMessages<'static> = FailureMessages {
    no_dates: "No valid date entries found. Please check your data.",
    rendering_prefix: "Error",
};
