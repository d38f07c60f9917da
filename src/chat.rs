// src/chat.rs
// Context payload for the artwork chat assistant. The assistant endpoint
// treats `quality` and `colors` as opaque JSON.
use serde::Serialize;
use serde_json::Value;

use crate::errors::ArtworkError;
use crate::models::{ArtworkAnalysis, ColorReport, QualityReport};

#[derive(Debug, Clone, Serialize)]
pub struct ChatContext<'a> {
    question: String,
    quality: &'a QualityReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    colors: Option<&'a ColorReport>,
}

impl<'a> ChatContext<'a> {
    pub fn new(question: &str, analysis: &'a ArtworkAnalysis) -> Result<Self, ArtworkError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ArtworkError::Validation(
                "Question must not be empty".to_string(),
            ));
        }

        Ok(Self {
            question: question.to_string(),
            quality: &analysis.quality,
            colors: analysis.colors.as_ref(),
        })
    }

    pub fn to_json(&self) -> Result<Value, ArtworkError> {
        serde_json::to_value(self).map_err(|e| ArtworkError::Serialization(e.to_string()))
    }
}
