// src/services/palette_export.rs
use crate::errors::ArtworkError;
use crate::models::ColorReport;

/// `hex,percent,count` rows for the top palette, or every bucket when the
/// top palette is empty.
pub fn palette_csv(report: &ColorReport) -> String {
    let rows = if report.top.is_empty() {
        &report.all_grouped
    } else {
        &report.top
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push("hex,percent,count".to_string());
    lines.extend(
        rows.iter()
            .map(|swatch| format!("{},{:.2},{}", swatch.hex, swatch.percent, swatch.count)),
    );
    lines.join("\n")
}

pub fn palette_json(report: &ColorReport) -> Result<String, ArtworkError> {
    serde_json::to_string_pretty(report).map_err(|e| ArtworkError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColorSwatch;

    fn swatch(hex: &str, percent: f64, count: u64) -> ColorSwatch {
        ColorSwatch {
            rgb: [0, 0, 0],
            hex: hex.to_string(),
            percent,
            count,
        }
    }

    #[test]
    fn csv_lists_top_palette() {
        let report = ColorReport {
            top: vec![swatch("#FF0000", 62.5, 5), swatch("#0000FF", 37.5, 3)],
            all_grouped: vec![
                swatch("#FF0000", 62.5, 5),
                swatch("#0000FF", 37.5, 3),
                swatch("#00FF00", 0.0, 0),
            ],
            alpha_stats: None,
        };
        assert_eq!(
            palette_csv(&report),
            "hex,percent,count\n#FF0000,62.50,5\n#0000FF,37.50,3"
        );
    }

    #[test]
    fn csv_falls_back_to_grouped_colors() {
        let report = ColorReport {
            top: Vec::new(),
            all_grouped: vec![swatch("#123456", 100.0, 9)],
            alpha_stats: None,
        };
        assert_eq!(palette_csv(&report), "hex,percent,count\n#123456,100.00,9");
        assert_eq!(palette_csv(&ColorReport::default()), "hex,percent,count");
    }

    #[test]
    fn json_uses_report_field_names() {
        let json = palette_json(&ColorReport::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["top"].as_array().unwrap().is_empty());
        assert!(value["allGrouped"].as_array().unwrap().is_empty());
    }
}
