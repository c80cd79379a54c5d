use std::io;
use thiserror::Error;

use naha_core::FormatError;

/// Error type for naha-io table operations.
#[derive(Error, Debug)]
pub enum TableError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The CSV layer rejected a row or field.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The table is readable but doesn't have the expected shape.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result type alias for naha-io table operations.
pub type Result<T> = std::result::Result<T, TableError>;
