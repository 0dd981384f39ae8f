use thiserror::Error;

/// Errors surfaced by loading, classification and the solution generator.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown urgency level: {0}")]
    UnknownUrgency(String),

    #[error("insufficient data: {0}")]
    DataInsufficient(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
