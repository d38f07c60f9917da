// src/services/orchestrator.rs
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use bytes::Bytes;
use futures_util::future::{AbortHandle, Abortable};
use log::{debug, info, warn};
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::errors::ArtworkError;
use crate::models::{ArtworkAnalysis, ArtworkPreview, ArtworkUpload, ColorReport, FileType, QualityReport};
use crate::services::color_extractor::extract_color_report;
use crate::services::image_processor::{ImageProcessor, PixelSource};
use crate::services::pdf_analyzer::{LopdfPageSource, PdfPageSource, analyze_pdf};
use crate::services::png_analyzer::analyze_png;

const PNG_MIME_TYPES: [&str; 2] = ["image/png", "image/x-png"];
const PDF_MIME_TYPES: [&str; 1] = ["application/pdf"];

/// MIME type wins; the file extension is only consulted when the MIME type
/// is unknown or missing.
pub fn detect_artwork_type(content_type: &str, filename: &str) -> Option<FileType> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if PNG_MIME_TYPES.contains(&mime.as_str()) {
        return Some(FileType::Png);
    }
    if PDF_MIME_TYPES.contains(&mime.as_str()) {
        return Some(FileType::Pdf);
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => Some(FileType::Png),
        Some("pdf") => Some(FileType::Pdf),
        _ => None,
    }
}

pub struct ArtworkAnalyzer {
    pixel_source: Arc<dyn PixelSource>,
    pdf_source: Arc<dyn PdfPageSource>,
    image_processor: Arc<ImageProcessor>,
    config: AnalyzerConfig,
}

impl ArtworkAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_sources(
            config,
            Arc::new(ImageProcessor::new()),
            Arc::new(LopdfPageSource::new()),
        )
    }

    pub fn with_sources(
        config: AnalyzerConfig,
        pixel_source: Arc<dyn PixelSource>,
        pdf_source: Arc<dyn PdfPageSource>,
    ) -> Self {
        Self {
            pixel_source,
            pdf_source,
            image_processor: Arc::new(ImageProcessor::new()),
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub async fn analyze(&self, upload: &ArtworkUpload) -> Result<ArtworkAnalysis, ArtworkError> {
        let start = Instant::now();

        let file_type = detect_artwork_type(&upload.content_type, &upload.filename).ok_or_else(
            || ArtworkError::UnsupportedFileType {
                content_type: upload.content_type.clone(),
                filename: upload.filename.clone(),
            },
        )?;

        info!(
            "Analyzing {} as {:?} ({} bytes)",
            upload.filename, file_type, upload.size
        );

        let (quality, colors, preview) = match file_type {
            FileType::Png => {
                let (quality, colors) = self.analyze_raster(upload.data.clone()).await?;
                let preview = if self.config.preview.enabled {
                    self.render_preview(upload.data.clone()).await
                } else {
                    None
                };
                (quality, colors, preview)
            }
            FileType::Pdf => {
                let quality = analyze_pdf(self.pdf_source.as_ref(), upload.data.clone()).await?;
                (quality, None, None)
            }
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Analysis of {} finished in {}ms: rating={:?}",
            upload.filename, processing_time_ms, quality.rating
        );

        Ok(ArtworkAnalysis {
            id: upload.id,
            filename: upload.filename.clone(),
            quality,
            colors,
            preview,
            analyzed_at: chrono::Utc::now(),
            processing_time_ms,
        })
    }

    /// Header metadata and palette extraction run side by side; only the
    /// metadata is allowed to fail the analysis.
    async fn analyze_raster(
        &self,
        data: Bytes,
    ) -> Result<(QualityReport, Option<ColorReport>), ArtworkError> {
        let header_bytes = data.clone();
        let quality_task = tokio::task::spawn_blocking(move || analyze_png(&header_bytes));

        let (quality, colors) = tokio::join!(quality_task, self.extract_colors(data));
        let mut quality = quality??;

        let colors = match colors {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Color extraction failed, continuing without palette: {}", e);
                None
            }
        };

        // Measured pixel alpha beats the format's alpha capability flag.
        if let Some(stats) = colors.as_ref().and_then(|report| report.alpha_stats) {
            quality.alpha_stats = Some(stats);
        }

        Ok((quality, colors))
    }

    async fn extract_colors(&self, data: Bytes) -> Result<ColorReport, ArtworkError> {
        let buffer = self.pixel_source.decode_rgba(data).await?;
        let config = self.config.colors.clone();
        let report =
            tokio::task::spawn_blocking(move || extract_color_report(&buffer, &config)).await?;
        debug!(
            "Palette: {} top colors of {} buckets",
            report.top.len(),
            report.all_grouped.len()
        );
        Ok(report)
    }

    async fn render_preview(&self, data: Bytes) -> Option<ArtworkPreview> {
        let processor = Arc::clone(&self.image_processor);
        let max_dimension = self.config.preview.max_dimension;
        let result =
            tokio::task::spawn_blocking(move || processor.render_preview(&data, max_dimension))
                .await
                .map_err(ArtworkError::from)
                .and_then(|preview| preview);

        match result {
            Ok(preview) => Some(preview),
            Err(e) => {
                warn!("Failed to generate artwork preview: {}", e);
                None
            }
        }
    }
}

/// Tracks the one analysis a user is waiting on. Submitting a new upload
/// aborts the previous analysis and its result is dropped.
pub struct AnalysisSession {
    analyzer: Arc<ArtworkAnalyzer>,
    in_flight: Mutex<Option<(Uuid, AbortHandle)>>,
}

impl AnalysisSession {
    pub fn new(analyzer: Arc<ArtworkAnalyzer>) -> Self {
        Self {
            analyzer,
            in_flight: Mutex::new(None),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, Option<(Uuid, AbortHandle)>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `Ok(None)` when a later upload superseded this one.
    pub async fn submit(
        &self,
        upload: ArtworkUpload,
    ) -> Result<Option<ArtworkAnalysis>, ArtworkError> {
        let upload_id = upload.id;
        let (handle, registration) = AbortHandle::new_pair();

        let previous = self.in_flight().replace((upload_id, handle));
        if let Some((previous_id, previous_handle)) = previous {
            debug!("Upload {} supersedes {}", upload_id, previous_id);
            previous_handle.abort();
        }

        let analyzer = Arc::clone(&self.analyzer);
        let outcome = Abortable::new(async move { analyzer.analyze(&upload).await }, registration).await;

        {
            let mut in_flight = self.in_flight();
            if matches!(in_flight.as_ref(), Some((id, _)) if *id == upload_id) {
                *in_flight = None;
            }
        }

        match outcome {
            Ok(result) => result.map(Some),
            Err(_aborted) => {
                info!("Discarding superseded analysis {}", upload_id);
                Ok(None)
            }
        }
    }

    /// Aborts whatever is in flight, e.g. when the view is torn down.
    pub fn cancel(&self) {
        if let Some((id, handle)) = self.in_flight().take() {
            debug!("Cancelling analysis {}", id);
            handle.abort();
        }
    }
}
