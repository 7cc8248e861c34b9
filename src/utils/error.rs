//! Error types and handling
//!
//! Common error types used across the server.

use crate::archive::naming::NameError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid artifact name: {0}")]
    ArtifactName(#[from] NameError),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Unauthenticated connection")]
    Unauthenticated,
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::ArtifactName(_) => "ARTIFACT_NAME_ERROR",
            AppError::Archive(_) => "ARCHIVE_ERROR",
            AppError::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

/// Error response body for HTTP clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
