//! Error types for the locus service.

use locus_core::LocusError;
use thiserror::Error;

/// Errors surfaced by [`LocusService`](crate::LocusService) and the batch reader.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Parsing, resolution or aggregation failed.
    #[error(transparent)]
    Locus(#[from] LocusError),

    /// A result could not be rendered to JSON.
    #[error("failed to render projection: {0}")]
    Render(#[from] serde_json::Error),

    /// A batch file could not be read.
    #[error("failed to read batch file: {0}")]
    Batch(#[from] csv::Error),

    /// A batch line is not a valid locus.
    #[error("line {line}: {source}")]
    BatchLine {
        /// 1-based line number.
        line: u64,
        /// Parse error for the line.
        #[source]
        source: LocusError,
    },
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
