//! Unified error types for the recoloring pipeline.

use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input archive or an expected part of it is missing
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Embedded object does not have the annotated-semantics shape
    #[error("Malformed formula: {0}")]
    MalformedFormula(String),

    /// No style in the body document inherits from the formula family
    #[error("No style inherits from the '{0}' family")]
    NoMatchingStyle(String),

    /// Styles qualify but no frame in the body document uses any of them
    #[error("No frame uses a formula style")]
    NoMatchingFrame,

    /// Building or replacing the output archive failed
    #[error("Repackage failed: {0}")]
    Repackage(String),

    /// XML content does not have the expected shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
