use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A data-integrity precondition on the inputs does not hold.
    #[error("assertion failed: {0}")]
    FatalAssertion(String),

    /// A symbol was requested that the HGNC metadata does not know.
    #[error("unknown hugo symbol: {0}")]
    UnknownSymbol(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn assertion(msg: impl Into<String>) -> Self {
        PipelineError::FatalAssertion(msg.into())
    }
}
