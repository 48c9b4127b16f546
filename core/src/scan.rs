//! Decode QR symbols from still images

use std::path::Path;

use crate::{Error, Result};

/// Decode every QR symbol found in an image file.
///
/// Returns the decoded payload strings, or an empty vector when the
/// image contains no readable symbol. Grids that are detected but fail
/// to decode are skipped with a warning.
pub fn scan_image(path: &Path) -> Result<Vec<String>> {
    let img = image::open(path)
        .map_err(|e| Error::Image(format!("failed to load image: {}", e)))?
        .to_luma8();

    let mut prepared = rqrr::PreparedImage::prepare(img);
    let grids = prepared.detect_grids();

    let mut decoded = Vec::new();
    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => decoded.push(content),
            Err(e) => tracing::warn!("skipping undecodable grid: {}", e),
        }
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;
    use crate::style::{EccLevel, StyleOptions};

    #[test]
    fn test_scan_roundtrip() {
        let payload = "https://example.com/scan-me";
        let code = render::encode(payload, EccLevel::M).unwrap();
        let style = StyleOptions {
            module_size: 8,
            border: 4,
            ..StyleOptions::default()
        };
        let img = render::rasterize(&code, &style);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbol.png");
        render::save_image(&img, &path).unwrap();

        let decoded = scan_image(&path).unwrap();
        assert_eq!(decoded, vec![payload.to_string()]);
    }

    #[test]
    fn test_scan_blank_image_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        let blank = image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
        blank.save(&path).unwrap();

        let decoded = scan_image(&path).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_scan_missing_file_errors() {
        let err = scan_image(Path::new("/nonexistent/symbol.png"));
        assert!(matches!(err, Err(Error::Image(_))));
    }
}
