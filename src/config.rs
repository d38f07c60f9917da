// src/config.rs
use serde::{Deserialize, Serialize};

use crate::errors::ArtworkError;

/// Tuning for palette extraction. Defaults are the shipped thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorExtractorConfig {
    /// Longer edge of the canvas pixels are sampled from.
    pub max_dimension: u32,
    /// Upper bound on visited pixel positions; sets the sampling stride.
    pub max_sample_pixels: u32,
    /// Quantization step per channel.
    pub bucket_size: u8,
    /// Pixels below this alpha carry no visible color.
    pub min_alpha: u8,
    /// Pixels with every channel at or above this are background white.
    pub light_threshold: u8,
    /// HSL saturation (0..=1) below which a color counts as a gray.
    pub min_saturation: f64,
    /// Max pairwise channel difference for a pixel to count as achromatic.
    pub grayscale_tolerance: u8,
    /// Achromatic pixels darker than this are kept as intentional ink.
    pub dark_threshold: u8,
    /// Ranking boost per unit of mean bucket saturation.
    pub saturation_weight: f64,
    /// Size of the `top` palette (4x4 grid).
    pub top_count: usize,
}

impl Default for ColorExtractorConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            max_sample_pixels: 120_000,
            bucket_size: 12,
            min_alpha: 32,
            light_threshold: 240,
            min_saturation: 0.08,
            grayscale_tolerance: 10,
            dark_threshold: 100,
            saturation_weight: 0.5,
            top_count: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub enabled: bool,
    pub max_dimension: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_dimension: 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub colors: ColorExtractorConfig,
    pub preview: PreviewConfig,
}

impl AnalyzerConfig {
    /// Parses a (possibly partial) JSON document; missing fields keep their
    /// defaults.
    pub fn from_json(raw: &str) -> Result<Self, ArtworkError> {
        let config: AnalyzerConfig = serde_json::from_str(raw)
            .map_err(|e| ArtworkError::Serialization(format!("Invalid analyzer config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ArtworkError> {
        let colors = &self.colors;
        if colors.max_dimension == 0 {
            return Err(ArtworkError::Validation(
                "colors.max_dimension must be positive".to_string(),
            ));
        }
        if colors.max_sample_pixels == 0 {
            return Err(ArtworkError::Validation(
                "colors.max_sample_pixels must be positive".to_string(),
            ));
        }
        if colors.bucket_size == 0 {
            return Err(ArtworkError::Validation(
                "colors.bucket_size must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&colors.min_saturation) {
            return Err(ArtworkError::Validation(
                "colors.min_saturation must be within 0..=1".to_string(),
            ));
        }
        if colors.saturation_weight < 0.0 {
            return Err(ArtworkError::Validation(
                "colors.saturation_weight must not be negative".to_string(),
            ));
        }
        if self.preview.max_dimension == 0 {
            return Err(ArtworkError::Validation(
                "preview.max_dimension must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
