// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for recognition operations
pub type Result<T> = std::result::Result<T, RecognitionError>;

/// Errors that can occur while recognizing a floor plan
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load plan source: {0}")]
    SourceLoadFailure(String),

    #[error("No lines detected on the plan. Try a sharper or higher-contrast image.")]
    NoLinesDetected,

    #[error("Metadata extraction failed: {0}")]
    MetadataExtractionFailure(String),

    #[error("Invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid opening: {0}")]
    InvalidOpening(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecognitionError {
    /// Whether the pipeline may continue after this error
    ///
    /// Only metadata problems are recoverable; every geometry or source
    /// failure aborts the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RecognitionError::MetadataExtractionFailure(_))
    }
}

impl From<image::ImageError> for RecognitionError {
    fn from(err: image::ImageError) -> Self {
        RecognitionError::SourceLoadFailure(err.to_string())
    }
}
