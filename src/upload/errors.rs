//! # Upload Errors

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("No file provided in field '{0}'")]
    MissingFile(String),

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("File too large: {0} bytes (max: {1})")]
    FileTooLarge(u64, u64),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("I/O error: {0}")]
    IoError(String),

    /// A third-party service could not take the file
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl UploadError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::MissingFile(_) => 400,
            UploadError::Malformed(_) => 400,
            UploadError::InvalidFileName(_) => 400,
            UploadError::FileTooLarge(_, _) => 413,
            UploadError::IoError(_) => 500,
            UploadError::UpstreamUnavailable(_) => 500,
        }
    }
}
