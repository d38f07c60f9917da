// src/services/png_analyzer.rs
use log::debug;

use crate::errors::ArtworkError;
use crate::models::{FileType, ImageCategory, PixelDimensions, QualityReport};
use crate::services::png_reader::parse_png_metadata;
use crate::services::print_size;

pub fn analyze_png(bytes: &[u8]) -> Result<QualityReport, ArtworkError> {
    let meta = parse_png_metadata(bytes)?;

    if !meta.has_dimensions() {
        return Err(ArtworkError::UnreadableDimensions);
    }

    debug!(
        "PNG header: {}x{} depth={} color_type={} dpi={:?}",
        meta.width, meta.height, meta.bit_depth, meta.color_type, meta.dpi
    );

    let mut notes = print_size::base_notes();
    if meta.dpi.is_none() {
        notes.push("No embedded DPI value found (pHYs chunk missing).".to_string());
    }
    if meta.has_alpha {
        notes.push("Alpha channel detected in artwork.".to_string());
    } else {
        notes.push("No alpha channel detected.".to_string());
    }
    match &meta.icc_profile {
        Some(name) => notes.push(format!("Embedded ICC profile: {}.", name)),
        None => notes.push("No embedded ICC profile detected.".to_string()),
    }

    Ok(QualityReport {
        file_type: FileType::Png,
        file_size_mb: print_size::file_size_mb(bytes.len()),
        pixels: Some(PixelDimensions {
            w: meta.width,
            h: meta.height,
        }),
        dpi: meta.dpi,
        has_icc: meta.icc_profile.is_some(),
        icc_profile: meta.icc_profile,
        bit_depth: Some(meta.bit_depth),
        has_alpha: meta.has_alpha,
        alpha_stats: None,
        image_category: ImageCategory::Raster,
        recommended_sizes: print_size::recommended_sizes(meta.width, meta.height),
        aspect_ratio: print_size::aspect_ratio_label(
            f64::from(meta.width),
            f64::from(meta.height),
        ),
        rating: print_size::quality_rating(meta.dpi, meta.width, meta.height),
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DpiTier, PrintDimensions, QualityRating};
    use crate::services::png_reader::tests::{chunk, ihdr, phys, png};

    #[test]
    fn print_ready_png_at_300_dpi() {
        let report = analyze_png(&png(&[ihdr(3000, 1500, 8, 2), phys(11811, 1)])).unwrap();

        assert_eq!(report.file_type, FileType::Png);
        assert_eq!(report.dpi, Some(300));
        assert_eq!(
            report.recommended_sizes.at_300_dpi,
            PrintDimensions {
                w_in: 10.0,
                h_in: 5.0,
                w_cm: 25.4,
                h_cm: 12.7
            }
        );
        assert_eq!(report.rating, QualityRating::Optimal);
        assert_eq!(report.image_category, ImageCategory::Raster);
        assert_eq!(report.pixels, Some(PixelDimensions { w: 3000, h: 1500 }));
        assert!(report.alpha_stats.is_none());
        assert!(!report.notes.iter().any(|n| n.contains("pHYs")));
    }

    #[test]
    fn missing_dpi_falls_back_to_pixel_edges() {
        let report = analyze_png(&png(&[ihdr(3000, 1500, 8, 2)])).unwrap();

        assert_eq!(report.dpi, None);
        assert_eq!(report.rating, QualityRating::Poor);
        assert!(
            report
                .notes
                .contains(&"No embedded DPI value found (pHYs chunk missing).".to_string())
        );
    }

    #[test]
    fn notes_follow_guidelines_in_order() {
        let mut icc = b"sRGB IEC61966-2.1".to_vec();
        icc.push(0);
        let report =
            analyze_png(&png(&[ihdr(1920, 1080, 8, 6), phys(11811, 1), chunk(b"iCCP", &icc)]))
                .unwrap();

        assert_eq!(report.notes.len(), 4);
        assert_eq!(report.notes[..2], print_size::base_notes()[..]);
        assert_eq!(report.notes[2], "Alpha channel detected in artwork.");
        assert_eq!(report.notes[3], "Embedded ICC profile: sRGB IEC61966-2.1.");
        assert!(report.has_icc);
        assert_eq!(report.aspect_ratio, "16:9 (1.78:1)");
    }

    #[test]
    fn zero_dimensions_are_unreadable() {
        let err = analyze_png(&png(&[ihdr(0, 1500, 8, 2)])).unwrap_err();
        assert!(matches!(err, ArtworkError::UnreadableDimensions));
        assert_eq!(err.to_string(), "Unable to read PNG dimensions");
    }

    #[test]
    fn derived_tiers_shrink_with_dpi() {
        let report = analyze_png(&png(&[ihdr(3000, 1500, 8, 2)])).unwrap();
        assert_eq!(report.size_at(DpiTier::Dpi300), report.recommended_sizes.at_300_dpi);
        assert_eq!(report.size_at(DpiTier::Dpi150), report.recommended_sizes.at_150_dpi);
        assert_eq!(report.size_at(DpiTier::Dpi250).w_in, 12.0);
        assert_eq!(report.size_at(DpiTier::Dpi72).w_in, 41.67);

        let widths: Vec<f64> = DpiTier::ALL.iter().map(|&tier| report.size_at(tier).w_in).collect();
        assert!(widths.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn serializes_with_report_field_names() {
        let report = analyze_png(&png(&[ihdr(3000, 1500, 8, 2)])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fileType"], "png");
        assert_eq!(json["imageCategory"], "Raster");
        assert!(json["dpi"].is_null());
        assert_eq!(json["pixels"]["w"], 3000);
        assert_eq!(json["recommendedSizes"]["at300dpi"]["w_in"], 10.0);
        assert_eq!(json["hasICC"], false);
        assert!(json.get("alphaStats").is_none());
    }
}
