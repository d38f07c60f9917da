// src/errors.rs
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("{0}")]
    Format(String),

    #[error("Unable to read PNG dimensions")]
    UnreadableDimensions,

    #[error("Unsupported file type. Please upload a PNG or PDF artwork file.")]
    UnsupportedFileType { content_type: String, filename: String },

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis task failed: {0}")]
    Task(String),
}

impl ArtworkError {
    /// JSON body handed to the UI layer when an analysis attempt fails.
    pub fn error_payload(&self) -> Value {
        let category = match self {
            ArtworkError::Format(_) => "Invalid file format",
            ArtworkError::UnreadableDimensions => "Unreadable dimensions",
            ArtworkError::UnsupportedFileType { .. } => "Unsupported file type",
            ArtworkError::Decode(_) => "Image processing error",
            ArtworkError::Pdf(_) => "PDF processing error",
            ArtworkError::Serialization(_) => "Data processing error",
            ArtworkError::Validation(_) => "Validation error",
            ArtworkError::Task(_) => "Analysis error",
        };

        json!({
            "error": category,
            "message": self.to_string()
        })
    }
}

impl From<tokio::task::JoinError> for ArtworkError {
    fn from(err: tokio::task::JoinError) -> Self {
        ArtworkError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_dimensions_message_is_user_facing() {
        let err = ArtworkError::UnreadableDimensions;
        assert_eq!(err.to_string(), "Unable to read PNG dimensions");
        assert_eq!(err.error_payload()["error"], "Unreadable dimensions");
    }

    #[test]
    fn payload_carries_display_message() {
        let err = ArtworkError::UnsupportedFileType {
            content_type: "text/plain".to_string(),
            filename: "notes.txt".to_string(),
        };
        let payload = err.error_payload();
        assert_eq!(payload["error"], "Unsupported file type");
        assert_eq!(
            payload["message"],
            "Unsupported file type. Please upload a PNG or PDF artwork file."
        );
    }
}
