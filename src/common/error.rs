//! Error handling primitives shared across the pipeline stages and the web layer.

use std::path::PathBuf;

/// Stable error codes reported in logs and exit paths.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Configuration or parameter error.
    Config = 1,
    /// Expected column missing from a frame (input or schema drift).
    DataMissing = 2,
    /// Requested model artefact was not available.
    ModelMissing = 3,
    /// Input failed validation.
    InvalidInput = 4,
    /// IO, serialization and other internal failures.
    Internal = 5,
    /// A data file holds a value that cannot be used.
    MalformedData = 6,
}

/// Canonical error type for the crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    #[error("Input data is missing expected feature: {column}")]
    SchemaDrift { column: String },

    #[error("Model artefact not found: {}", path.display())]
    ModelMissing { path: PathBuf },

    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Malformed data in '{column}': {reason}")]
    MalformedData { column: String, reason: String },

    #[error("Shape mismatch: {0}")]
    Shape(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// IO helper that keeps the offending path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Machine readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Config(_) => ErrorCode::Config,
            Error::MissingColumn { .. } | Error::SchemaDrift { .. } => ErrorCode::DataMissing,
            Error::ModelMissing { .. } => ErrorCode::ModelMissing,
            Error::InvalidInput { .. } => ErrorCode::InvalidInput,
            Error::MalformedData { .. } => ErrorCode::MalformedData,
            Error::Io { .. } | Error::Csv(_) | Error::Serialization(_) | Error::Shape(_) => {
                ErrorCode::Internal
            }
        }
    }
}
