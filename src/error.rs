use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinflowError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported file type: {0} (use CSV or text)")]
    UnsupportedFileType(String),

    #[error("Could not read file: {0}")]
    UnreadableFile(String),

    #[error("Could not identify valid transactions")]
    NoValidTransactions,

    #[error("No imports to undo")]
    NothingToUndo,

    #[error("Unknown {kind}: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, FinflowError>;
