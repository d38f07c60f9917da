// src/services/pdf_analyzer.rs
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::errors::ArtworkError;
use crate::models::{FileType, ImageCategory, QualityReport};
use crate::services::print_size::{self, POINTS_PER_INCH};

/// Resolution vector art is assumed to rasterize at when rating it.
const IMPLICIT_VECTOR_DPI: f64 = 300.0;
// Guards against reference cycles in malformed page trees.
const MAX_PARENT_DEPTH: usize = 32;

/// First-page size in PDF points (1/72 inch) at scale 1, rotation applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageViewport {
    pub width: f64,
    pub height: f64,
}

#[async_trait]
pub trait PdfPageSource: Send + Sync {
    async fn first_page_viewport(&self, data: Bytes) -> Result<PageViewport, ArtworkError>;
}

/// Reads page geometry with `lopdf` on the blocking pool.
#[derive(Debug, Default)]
pub struct LopdfPageSource;

impl LopdfPageSource {
    pub fn new() -> Self {
        Self
    }

    pub fn read_viewport(data: &[u8]) -> Result<PageViewport, ArtworkError> {
        let doc = Document::load_mem(data)
            .map_err(|e| ArtworkError::Pdf(format!("Failed to load PDF: {}", e)))?;

        let page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or_else(|| ArtworkError::Pdf("PDF has no pages".to_string()))?;

        let page_box = inherited_attribute(&doc, page_id, b"CropBox")
            .and_then(|obj| rectangle(&doc, obj))
            .or_else(|| {
                inherited_attribute(&doc, page_id, b"MediaBox").and_then(|obj| rectangle(&doc, obj))
            })
            .ok_or_else(|| ArtworkError::Pdf("First page has no MediaBox".to_string()))?;

        let rotate = inherited_attribute(&doc, page_id, b"Rotate")
            .and_then(|obj| number(&doc, obj))
            .map(|deg| (deg as i64).rem_euclid(360))
            .unwrap_or(0);

        let (width, height) = (page_box[2] - page_box[0], page_box[3] - page_box[1]);
        Ok(if rotate == 90 || rotate == 270 {
            PageViewport {
                width: height,
                height: width,
            }
        } else {
            PageViewport { width, height }
        })
    }
}

#[async_trait]
impl PdfPageSource for LopdfPageSource {
    async fn first_page_viewport(&self, data: Bytes) -> Result<PageViewport, ArtworkError> {
        tokio::task::spawn_blocking(move || LopdfPageSource::read_viewport(&data)).await?
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match resolve(doc, obj)? {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// `[llx lly urx ury]`, normalised so the lower-left corner comes first.
fn rectangle(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let Object::Array(items) = resolve(doc, obj)? else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }

    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(doc, item)?;
    }
    let [x0, y0, x1, y1] = values;
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

/// Looks the key up on the page, then up the `Parent` chain.
fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict: &Dictionary = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

pub async fn analyze_pdf(
    source: &dyn PdfPageSource,
    data: Bytes,
) -> Result<QualityReport, ArtworkError> {
    let file_size = data.len();
    let viewport = source.first_page_viewport(data).await?;
    debug!("PDF first page: {}x{} pt", viewport.width, viewport.height);
    Ok(quality_from_viewport(viewport, file_size))
}

pub fn quality_from_viewport(viewport: PageViewport, file_size: usize) -> QualityReport {
    let width_in = viewport.width / POINTS_PER_INCH;
    let height_in = viewport.height / POINTS_PER_INCH;
    let width_px = (width_in * IMPLICIT_VECTOR_DPI).round() as u32;
    let height_px = (height_in * IMPLICIT_VECTOR_DPI).round() as u32;

    let mut notes = print_size::base_notes();
    notes.push(
        "Vector PDF detected. DPI and scaling are determined at print time; verify artwork before rasterization."
            .to_string(),
    );

    QualityReport {
        file_type: FileType::Pdf,
        file_size_mb: print_size::file_size_mb(file_size),
        pixels: None,
        dpi: None,
        has_icc: false,
        icc_profile: None,
        bit_depth: None,
        has_alpha: false,
        alpha_stats: None,
        image_category: ImageCategory::Vector,
        recommended_sizes: print_size::recommended_sizes_from_physical(width_in, height_in),
        aspect_ratio: print_size::aspect_ratio_label(viewport.width, viewport.height),
        rating: print_size::quality_rating(None, width_px, height_px),
        notes,
    }
}
