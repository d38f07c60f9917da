// src/lib.rs
//! Print-readiness analysis for uploaded PNG and PDF artwork: DPI and print
//! sizes, ICC profile and transparency, a quality rating, and a dominant
//! color palette.

pub mod chat;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use crate::chat::ChatContext;
pub use crate::config::{AnalyzerConfig, ColorExtractorConfig, PreviewConfig};
pub use crate::errors::ArtworkError;
pub use crate::models::*;
pub use crate::services::{
    AnalysisSession, ArtworkAnalyzer, ImageProcessor, LopdfPageSource, PdfPageSource, PixelBuffer,
    PixelSource, detect_artwork_type,
};
