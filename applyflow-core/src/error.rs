use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyFlowError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Another writer kept winning the compare-and-swap on the job list.
    #[error("Conflict: {key} changed concurrently {attempts} times in a row")]
    Conflict { key: String, attempts: u32 },

    #[error("Timed out waiting for lock on {0}")]
    LockTimeout(String),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ApplyFlowError>;
