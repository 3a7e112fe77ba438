//! Domain error taxonomy shared by the stores, the chart pipeline and the
//! report assembler. Storage failures are wrapped, everything else maps to
//! a user-facing notice in the command layer.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum JournalError {
    /// Missing or malformed add/edit inputs. Nothing was persisted.
    #[error("{0}")]
    Validation(String),

    #[error("Cannot delete protected field '{0}' (date, notes, thoughts, remarks)")]
    ProtectedField(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("No entry at index {index} ({len} entries)")]
    RecordNotFound { index: usize, len: usize },

    /// The dataset is empty or has no row with a parseable date.
    #[error("No valid date entries found")]
    NoVisualizableData,

    /// Any failure while drawing charts or building the PDF.
    #[error("Rendering failed: {0}")]
    Rendering(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl JournalError {
    pub fn rendering(context: &str, err: impl std::fmt::Display) -> Self {
        JournalError::Rendering(format!("{context}: {err}"))
    }
}
