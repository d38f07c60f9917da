// src/services/print_size.rs
use crate::models::{PrintDimensions, QualityRating, RecommendedSizes};

pub const CM_PER_INCH: f64 = 2.54;
pub const POINTS_PER_INCH: f64 = 72.0;

const OPTIMAL_DPI: u32 = 300;
const GOOD_DPI: u32 = 150;
// Short-edge pixel counts equivalent to the DPI thresholds on a 15in edge.
const OPTIMAL_SHORT_EDGE: u32 = 4500;
const GOOD_SHORT_EDGE: u32 = 2250;

const ASPECT_SCALE: f64 = 1000.0;

pub const DTF_GUIDELINES: [&str; 2] = [
    "Keep text ≥ 2.5 mm x-height and hairlines ≥ 0.5 mm for DTF prints.",
    "Avoid semi-transparent layers; use solid colors for best adhesion.",
];

/// Half-up rounding to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn size_from_pixels_at_dpi(width: u32, height: u32, dpi: u32) -> PrintDimensions {
    let dpi = f64::from(dpi.max(1));
    size_from_inches(f64::from(width) / dpi, f64::from(height) / dpi)
}

pub fn size_from_inches(width_in: f64, height_in: f64) -> PrintDimensions {
    PrintDimensions {
        w_in: round_to(width_in, 2),
        h_in: round_to(height_in, 2),
        w_cm: round_to(width_in * CM_PER_INCH, 2),
        h_cm: round_to(height_in * CM_PER_INCH, 2),
    }
}

pub fn recommended_sizes(width: u32, height: u32) -> RecommendedSizes {
    RecommendedSizes {
        at_300_dpi: size_from_pixels_at_dpi(width, height, OPTIMAL_DPI),
        at_150_dpi: size_from_pixels_at_dpi(width, height, GOOD_DPI),
    }
}

/// Vector art prints at the same physical size whatever the tier.
pub fn recommended_sizes_from_physical(width_in: f64, height_in: f64) -> RecommendedSizes {
    let size = size_from_inches(width_in, height_in);
    RecommendedSizes {
        at_300_dpi: size,
        at_150_dpi: size,
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// `"16:9 (1.78:1)"` style label. Accepts fractional inputs such as PDF
/// point sizes.
pub fn aspect_ratio_label(width: f64, height: f64) -> String {
    if width <= 0.0 || height <= 0.0 {
        return "N/A".to_string();
    }

    let width_scaled = (width * ASPECT_SCALE).round() as u64;
    let height_scaled = (height * ASPECT_SCALE).round() as u64;
    if width_scaled == 0 || height_scaled == 0 {
        return "N/A".to_string();
    }

    let divisor = gcd(width_scaled, height_scaled);
    let decimal = round_to(width / height, 2);
    format!(
        "{}:{} ({}:1)",
        width_scaled / divisor,
        height_scaled / divisor,
        decimal
    )
}

pub fn quality_rating(dpi: Option<u32>, width: u32, height: u32) -> QualityRating {
    match dpi {
        Some(dpi) if dpi >= OPTIMAL_DPI => QualityRating::Optimal,
        Some(dpi) if dpi >= GOOD_DPI => QualityRating::Good,
        Some(_) => QualityRating::Poor,
        None => {
            let short_edge = width.min(height);
            if short_edge >= OPTIMAL_SHORT_EDGE {
                QualityRating::Optimal
            } else if short_edge >= GOOD_SHORT_EDGE {
                QualityRating::Good
            } else {
                QualityRating::Poor
            }
        }
    }
}

pub fn base_notes() -> Vec<String> {
    DTF_GUIDELINES.iter().map(|note| note.to_string()).collect()
}

pub fn file_size_mb(bytes: usize) -> f64 {
    round_to(bytes as f64 / (1024.0 * 1024.0), 2)
}
