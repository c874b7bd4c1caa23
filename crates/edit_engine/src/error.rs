//! Error types for editing operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// A command's precondition does not hold (no selection, no current cell...)
    #[error("Precondition not met: {0}")]
    Precondition(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Undo stack is empty")]
    UndoStackEmpty,

    #[error("Redo stack is empty")]
    RedoStackEmpty,
}

impl EditError {
    /// Whether this error should be swallowed rather than shown
    pub fn is_precondition(&self) -> bool {
        matches!(self, EditError::Precondition(_))
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
