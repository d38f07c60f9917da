// src/services/image_processor.rs
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use image::{GenericImageView, ImageFormat as ImgFormat};

use crate::errors::ArtworkError;
use crate::models::ArtworkPreview;

/// Decoded raster, 4 bytes per pixel (R, G, B, A), row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }
}

/// Turns uploaded bytes into a pixel buffer. Any host decoder can sit
/// behind this; `ImageProcessor` uses the `image` crate.
#[async_trait]
pub trait PixelSource: Send + Sync {
    async fn decode_rgba(&self, data: Bytes) -> Result<PixelBuffer, ArtworkError>;
}

#[derive(Debug, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(data: &[u8]) -> Result<PixelBuffer, ArtworkError> {
        let img = image::load_from_memory(data)
            .map_err(|e| ArtworkError::Decode(format!("Invalid image format: {}", e)))?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(PixelBuffer::new(width, height, rgba.into_raw()))
    }

    /// PNG data URL of the artwork, downscaled so neither edge exceeds
    /// `max_size`.
    pub fn render_preview(&self, data: &[u8], max_size: u32) -> Result<ArtworkPreview, ArtworkError> {
        let img = image::load_from_memory(data)
            .map_err(|e| ArtworkError::Decode(format!("Failed to load image: {}", e)))?;

        let (width, height) = img.dimensions();

        let img = if width <= max_size && height <= max_size {
            img
        } else {
            let ratio = (max_size as f32 / width.max(height) as f32).min(1.0);
            let new_width = ((width as f32 * ratio) as u32).max(1);
            let new_height = ((height as f32 * ratio) as u32).max(1);
            img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
        };

        let mut output = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| ArtworkError::Decode(format!("Failed to encode preview: {}", e)))?;

        let (width, height) = img.dimensions();
        Ok(ArtworkPreview {
            data_url: format!(
                "data:image/png;base64,{}",
                general_purpose::STANDARD.encode(&output)
            ),
            width,
            height,
        })
    }
}

#[async_trait]
impl PixelSource for ImageProcessor {
    async fn decode_rgba(&self, data: Bytes) -> Result<PixelBuffer, ArtworkError> {
        tokio::task::spawn_blocking(move || ImageProcessor::decode(&data)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut std::io::Cursor::new(&mut out), ImgFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn decodes_to_rgba() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        let buffer = ImageProcessor::decode(&encode_png(&img)).unwrap();
        assert_eq!((buffer.width, buffer.height), (3, 2));
        assert_eq!(buffer.rgba.len(), 3 * 2 * 4);
        assert_eq!(&buffer.rgba[..4], &[10, 20, 30, 128]);
    }

    #[test]
    fn rejects_non_images() {
        let err = ImageProcessor::decode(b"definitely not pixels").unwrap_err();
        assert!(matches!(err, ArtworkError::Decode(_)));
    }

    #[test]
    fn preview_is_bounded() {
        let img = RgbaImage::from_pixel(400, 100, Rgba([200, 0, 0, 255]));
        let preview = ImageProcessor::new()
            .render_preview(&encode_png(&img), 200)
            .unwrap();
        assert_eq!((preview.width, preview.height), (200, 50));
        assert!(preview.data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn small_preview_keeps_size() {
        let img = RgbaImage::from_pixel(40, 30, Rgba([0, 0, 200, 255]));
        let preview = ImageProcessor::new()
            .render_preview(&encode_png(&img), 1024)
            .unwrap();
        assert_eq!((preview.width, preview.height), (40, 30));
    }

    #[tokio::test]
    async fn decodes_on_blocking_pool() {
        let img = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 255]));
        let buffer = ImageProcessor::new()
            .decode_rgba(Bytes::from(encode_png(&img)))
            .await
            .unwrap();
        assert_eq!(buffer.width, 5);
    }
}
