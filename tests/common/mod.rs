// tests/common/mod.rs
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use artcheck::{ArtworkError, ImageProcessor, PixelBuffer, PixelSource};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode fixture");
    out
}

/// Red square on white paper.
pub fn artwork(width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    for y in height / 4..height * 3 / 4 {
        for x in width / 4..width * 3 / 4 {
            img.put_pixel(x, y, Rgba([220, 20, 30, 255]));
        }
    }
    img
}

fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    let mut body = tag.to_vec();
    body.extend_from_slice(data);
    out.extend_from_slice(&body);
    out.extend_from_slice(&crc32fast::hash(&body).to_be_bytes());
    out
}

/// Inserts a metre-unit `pHYs` chunk right after IHDR.
pub fn with_dpi(png: &[u8], dpi: u32) -> Vec<u8> {
    let pixels_per_meter = (f64::from(dpi) * 39.370_078_74).round() as u32;
    let mut data = Vec::new();
    data.extend_from_slice(&pixels_per_meter.to_be_bytes());
    data.extend_from_slice(&pixels_per_meter.to_be_bytes());
    data.push(1);

    // signature (8) + IHDR (4 + 4 + 13 + 4)
    let ihdr_end = 33;
    let mut out = png[..ihdr_end].to_vec();
    out.extend(chunk(b"pHYs", &data));
    out.extend_from_slice(&png[ihdr_end..]);
    out
}

/// Counts decodes, optionally stalling the first one.
#[derive(Default)]
pub struct SpySource {
    pub calls: AtomicUsize,
    pub stall_first: Option<Duration>,
}

impl SpySource {
    pub fn stalling(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            stall_first: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PixelSource for SpySource {
    async fn decode_rgba(&self, data: Bytes) -> Result<PixelBuffer, ArtworkError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let (0, Some(delay)) = (call, self.stall_first) {
            tokio::time::sleep(delay).await;
        }
        ImageProcessor::new().decode_rgba(data).await
    }
}

pub struct FailingSource;

#[async_trait]
impl PixelSource for FailingSource {
    async fn decode_rgba(&self, _data: Bytes) -> Result<PixelBuffer, ArtworkError> {
        Err(ArtworkError::Decode("no canvas available".to_string()))
    }
}

/// Minimal one-page US Letter PDF.
pub fn letter_pdf() -> Vec<u8> {
    use lopdf::{Document, Object, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("write fixture pdf");
    out
}
