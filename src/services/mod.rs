// src/services/mod.rs
pub mod color_extractor;
pub mod image_processor;
pub mod orchestrator;
pub mod palette_export;
pub mod pdf_analyzer;
pub mod png_analyzer;
pub mod png_reader;
pub mod print_size;

pub use image_processor::{ImageProcessor, PixelBuffer, PixelSource};
pub use orchestrator::{AnalysisSession, ArtworkAnalyzer, detect_artwork_type};
pub use pdf_analyzer::{LopdfPageSource, PageViewport, PdfPageSource};
