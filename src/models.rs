// src/models.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::print_size;

/// A file handed over by the picker / drop zone, owned by one analysis.
#[derive(Debug, Clone)]
pub struct ArtworkUpload {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub data: Bytes,
    pub uploaded_at: DateTime<Utc>,
}

impl ArtworkUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            content_type: content_type.into(),
            size: data.len(),
            data,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Png,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageCategory {
    Raster,
    Vector,
}

/// Ordered worst to best so ratings compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityRating {
    Poor,
    Good,
    Optimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDimensions {
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintDimensions {
    pub w_in: f64,
    pub h_in: f64,
    pub w_cm: f64,
    pub h_cm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSizes {
    #[serde(rename = "at300dpi")]
    pub at_300_dpi: PrintDimensions,
    #[serde(rename = "at150dpi")]
    pub at_150_dpi: PrintDimensions,
}

/// Standard print resolution tiers shown in the size slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DpiTier {
    Dpi300,
    Dpi250,
    Dpi200,
    Dpi150,
    Dpi100,
    Dpi72,
}

impl DpiTier {
    pub const ALL: [DpiTier; 6] = [
        DpiTier::Dpi300,
        DpiTier::Dpi250,
        DpiTier::Dpi200,
        DpiTier::Dpi150,
        DpiTier::Dpi100,
        DpiTier::Dpi72,
    ];

    pub fn dpi(self) -> u32 {
        match self {
            DpiTier::Dpi300 => 300,
            DpiTier::Dpi250 => 250,
            DpiTier::Dpi200 => 200,
            DpiTier::Dpi150 => 150,
            DpiTier::Dpi100 => 100,
            DpiTier::Dpi72 => 72,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaStats {
    pub present: bool,
    pub min: u8,
    pub max: u8,
    pub transparent_percent: f64,
    pub semi_transparent_percent: f64,
    pub opaque_percent: f64,
    pub transparent_count: u64,
    pub semi_transparent_count: u64,
    pub opaque_count: u64,
    pub sample_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub file_type: FileType,
    #[serde(rename = "fileSizeMB")]
    pub file_size_mb: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<PixelDimensions>,
    pub dpi: Option<u32>,
    #[serde(rename = "hasICC")]
    pub has_icc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icc_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u8>,
    pub has_alpha: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_stats: Option<AlphaStats>,
    pub image_category: ImageCategory,
    pub recommended_sizes: RecommendedSizes,
    pub aspect_ratio: String,
    pub rating: QualityRating,
    pub notes: Vec<String>,
}

impl QualityReport {
    /// Print size at any tier, derived on demand. Raster sizes shrink as the
    /// tier drops; vector sources keep their physical size at every tier.
    pub fn size_at(&self, tier: DpiTier) -> PrintDimensions {
        match (self.image_category, self.pixels) {
            (ImageCategory::Raster, Some(pixels)) => {
                print_size::size_from_pixels_at_dpi(pixels.w, pixels.h, tier.dpi())
            }
            _ => self.recommended_sizes.at_300_dpi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub rgb: [u8; 3],
    pub hex: String,
    pub percent: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorReport {
    pub top: Vec<ColorSwatch>,
    pub all_grouped: Vec<ColorSwatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_stats: Option<AlphaStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkPreview {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkAnalysis {
    pub id: Uuid,
    pub filename: String,
    pub quality: QualityReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<ArtworkPreview>,
    pub analyzed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}
