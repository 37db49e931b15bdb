//! Error types for sodsplit

use thiserror::Error;

/// sodsplit error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction error: {0}")]
    Extract(String),

    #[error("Output generation error: {0}")]
    Emit(String),

    #[error("Verification error: {0}")]
    Verify(String),

    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for sodsplit
pub type Result<T> = std::result::Result<T, Error>;
