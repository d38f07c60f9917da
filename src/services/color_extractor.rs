// src/services/color_extractor.rs
//! Dominant-color palette and alpha distribution from a decoded raster.
//!
//! The image is drawn onto a bounded canvas, sampled on a square grid,
//! and every sample contributes to the alpha tally. Samples that carry a
//! visible, non-background color are quantized into buckets, which are then
//! ranked by frequency boosted by saturation so vivid ink outranks large
//! muted areas.

use std::collections::HashMap;

use image::{GenericImageView, ImageBuffer, Rgba};
use image::imageops::{self, FilterType};
use log::debug;

use crate::config::ColorExtractorConfig;
use crate::models::{AlphaStats, ColorReport, ColorSwatch};
use crate::services::image_processor::PixelBuffer;
use crate::services::print_size::round_to;

#[derive(Debug, Default)]
struct Bucket {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
    saturation: f64,
}

struct RankedBucket {
    swatch: ColorSwatch,
    weight: f64,
}

#[derive(Debug)]
struct AlphaTally {
    sample_size: u64,
    transparent: u64,
    semi_transparent: u64,
    opaque: u64,
    min: u8,
    max: u8,
}

impl AlphaTally {
    fn new() -> Self {
        Self {
            sample_size: 0,
            transparent: 0,
            semi_transparent: 0,
            opaque: 0,
            min: u8::MAX,
            max: u8::MIN,
        }
    }

    fn record(&mut self, alpha: u8) {
        self.sample_size += 1;
        self.min = self.min.min(alpha);
        self.max = self.max.max(alpha);
        match alpha {
            0 => self.transparent += 1,
            u8::MAX => self.opaque += 1,
            _ => self.semi_transparent += 1,
        }
    }

    fn finish(&self) -> Option<AlphaStats> {
        if self.sample_size == 0 {
            return None;
        }
        let percent = |count: u64| round_to(count as f64 / self.sample_size as f64 * 100.0, 2);
        Some(AlphaStats {
            present: self.transparent > 0 || self.semi_transparent > 0,
            min: self.min,
            max: self.max,
            transparent_percent: percent(self.transparent),
            semi_transparent_percent: percent(self.semi_transparent),
            opaque_percent: percent(self.opaque),
            transparent_count: self.transparent,
            semi_transparent_count: self.semi_transparent,
            opaque_count: self.opaque,
            sample_size: self.sample_size,
        })
    }
}

/// HSL saturation in 0..=1.
pub fn hsl_saturation(r: u8, g: u8, b: u8) -> f64 {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta == 0.0 {
        return 0.0;
    }

    let lightness = (max + min) / 2.0;
    if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    }
}

/// Near-white paper or a washed-out gray/beige. Dark achromatic pixels are
/// kept: they are usually deliberate black or gray ink.
pub fn is_background(r: u8, g: u8, b: u8, config: &ColorExtractorConfig) -> bool {
    let light = config.light_threshold;
    if r >= light && g >= light && b >= light {
        return true;
    }

    if hsl_saturation(r, g, b) < config.min_saturation {
        let tolerance = config.grayscale_tolerance;
        let achromatic =
            r.abs_diff(g) < tolerance && g.abs_diff(b) < tolerance && r.abs_diff(b) < tolerance;
        let dark = r.max(g).max(b) < config.dark_threshold;
        return !(achromatic && dark);
    }

    false
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Nearest multiple of `step`, ties rounding up.
fn quantize(value: u8, step: u8) -> u16 {
    let step = u16::from(step.max(1));
    (u16::from(value) + step / 2) / step * step
}

pub fn sampling_stride(width: u32, height: u32, max_sample_pixels: u32) -> u32 {
    let area = f64::from(width) * f64::from(height);
    let stride = (area / f64::from(max_sample_pixels.max(1))).sqrt().floor() as u32;
    stride.max(1)
}

/// Borrows the buffer as an image. `None` when the buffer cannot back a
/// canvas at all.
fn source_view(buffer: &PixelBuffer) -> Option<ImageBuffer<Rgba<u8>, &[u8]>> {
    let expected = u64::from(buffer.width) * u64::from(buffer.height) * 4;
    if expected == 0 || buffer.rgba.len() as u64 != expected {
        return None;
    }
    ImageBuffer::from_raw(buffer.width, buffer.height, buffer.rgba.as_slice())
}

/// Canvas size when the longer edge exceeds `max_dimension`, `None` when the
/// source already fits.
fn scaled_size(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    let scale = f64::from(max_dimension) / f64::from(longer);
    if scale >= 1.0 {
        return None;
    }
    let width = ((f64::from(width) * scale).round() as u32).max(1);
    let height = ((f64::from(height) * scale).round() as u32).max(1);
    Some((width, height))
}

pub fn extract_color_report(buffer: &PixelBuffer, config: &ColorExtractorConfig) -> ColorReport {
    let Some(source) = source_view(buffer) else {
        debug!(
            "No canvas for {}x{} buffer ({} bytes), skipping palette",
            buffer.width,
            buffer.height,
            buffer.rgba.len()
        );
        return ColorReport::default();
    };

    match scaled_size(buffer.width, buffer.height, config.max_dimension) {
        Some((width, height)) => {
            let canvas = imageops::resize(&source, width, height, FilterType::Triangle);
            palette_from_canvas(&canvas, config)
        }
        None => palette_from_canvas(&source, config),
    }
}

fn palette_from_canvas<C>(canvas: &C, config: &ColorExtractorConfig) -> ColorReport
where
    C: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = canvas.dimensions();
    let stride = sampling_stride(width, height, config.max_sample_pixels);

    let mut tally = AlphaTally::new();
    let mut index: HashMap<[u16; 3], usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            let [r, g, b, alpha] = canvas.get_pixel(x, y).0;
            tally.record(alpha);

            if alpha < config.min_alpha || is_background(r, g, b, config) {
                continue;
            }

            let key = [
                quantize(r, config.bucket_size),
                quantize(g, config.bucket_size),
                quantize(b, config.bucket_size),
            ];
            let slot = *index.entry(key).or_insert_with(|| {
                buckets.push(Bucket::default());
                buckets.len() - 1
            });
            let bucket = &mut buckets[slot];
            bucket.r += u64::from(r);
            bucket.g += u64::from(g);
            bucket.b += u64::from(b);
            bucket.count += 1;
            bucket.saturation += hsl_saturation(r, g, b);
        }
    }

    let alpha_stats = tally.finish();
    debug!(
        "Sampled {} of {}x{} pixels (stride {}), {} color buckets",
        tally.sample_size,
        width,
        height,
        stride,
        buckets.len()
    );

    if buckets.is_empty() {
        return ColorReport {
            top: Vec::new(),
            all_grouped: Vec::new(),
            alpha_stats,
        };
    }

    let total: u64 = buckets.iter().map(|b| b.count).sum();
    let mut ranked: Vec<RankedBucket> = buckets
        .iter()
        .map(|bucket| {
            let count = bucket.count as f64;
            let mean = |sum: u64| (sum as f64 / count).round() as u8;
            let rgb = [mean(bucket.r), mean(bucket.g), mean(bucket.b)];
            let mean_saturation = bucket.saturation / count;

            RankedBucket {
                swatch: ColorSwatch {
                    rgb,
                    hex: to_hex(rgb),
                    percent: round_to(count / total as f64 * 100.0, 2),
                    count: bucket.count,
                },
                weight: count * (1.0 + mean_saturation * config.saturation_weight),
            }
        })
        .collect();

    // Stable, so equal weights keep first-seen order.
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let all_grouped: Vec<ColorSwatch> = ranked.into_iter().map(|r| r.swatch).collect();
    let top = all_grouped.iter().take(config.top_count).cloned().collect();

    ColorReport {
        top,
        all_grouped,
        alpha_stats,
    }
}
