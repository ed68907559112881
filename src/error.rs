use thiserror::Error;

/// Central error type for the music-splitter-core crate.
#[derive(Debug, Error)]
pub enum SplitterError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Chunking failed: {0}")]
    Chunking(String),

    #[error("Separation failed: {0}")]
    Separation(String),

    #[error("Merge failed: {0}")]
    Merge(String),

    #[error("outputs not found")]
    OutputMissing,

    #[error("Job `{0}` not found")]
    RecordNotFound(String),
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for SplitterError {
    fn from(e: std::io::Error) -> Self {
        SplitterError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for SplitterError {
    fn from(e: serde_json::Error) -> Self {
        SplitterError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, SplitterError>;
