use std::time::Duration;

use axum::http::StatusCode;
use sheet_to_midi::SheetError;
use thiserror::Error;

/// The request did not carry a usable file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Invalid upload: {0}")]
    Multipart(String),
}

/// Everything that can stop a conversion before a tab is produced
///
/// Tab stage failures are not listed here: they are reported inside a
/// successful response, see [`crate::pipeline::tab_text`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Conversion failed: {0}")]
    Internal(String),
}

impl ConvertError {
    pub fn status(&self) -> StatusCode {
        match self {
            ConvertError::Upload(_) => StatusCode::BAD_REQUEST,
            ConvertError::Sheet(SheetError::ImageDecode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ConvertError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
