//! Error types for the enumeration driver

/// Result type for enumeration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running an enumeration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or inconsistent search configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure reading the pattern checklist file
    #[error("pattern file {path}: {source}")]
    PatternFile {
        path: std::path::PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Core arithmetic / parsing error
    #[error(transparent)]
    Core(#[from] so6_core::Error),

    /// Output or input stream failure; fatal for the run
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation failure: configuration in, summary out
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}
