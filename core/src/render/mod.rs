//! Symbol encoding and rasterization
//!
//! Encoding and error correction are delegated to the `qrcode` crate;
//! this module paints the resulting module grid into image buffers and
//! produces the exportable artifacts (PNG/JPEG files, SVG markup, a
//! standalone HTML page).

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{imageops, Rgba, RgbaImage};
use qrcode::{Color as ModuleColor, QrCode};

use crate::style::{EccLevel, StyleOptions};
use crate::{Error, Result};

/// Logo edge length as a share of the symbol edge
const LOGO_RATIO: (u32, u32) = (3, 10);

/// Encode a formatted payload at the requested error correction level.
///
/// The symbol version is fitted to the data automatically.
pub fn encode(payload: &str, ecc: EccLevel) -> Result<QrCode> {
    QrCode::with_error_correction_level(payload.as_bytes(), ecc.as_ec_level())
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// The symbol's module grid: width and row-major dark flags.
pub fn modules(code: &QrCode) -> (usize, Vec<bool>) {
    let width = code.width();
    let dark = code
        .to_colors()
        .into_iter()
        .map(|c| c == ModuleColor::Dark)
        .collect();
    (width, dark)
}

/// Paint the module grid into an RGBA image.
///
/// Each module becomes a `module_size` pixel square; a quiet zone of
/// `border` modules surrounds the symbol.
pub fn rasterize(code: &QrCode, style: &StyleOptions) -> RgbaImage {
    let (width, dark) = modules(code);
    let module_size = style.module_size.max(1);
    let border = style.border;

    let fg = Rgba([style.fg.r, style.fg.g, style.fg.b, 255]);
    let bg = Rgba([style.bg.r, style.bg.g, style.bg.b, 255]);

    let edge = (width as u32 + 2 * border) * module_size;
    let mut img = RgbaImage::from_pixel(edge, edge, bg);

    for (i, is_dark) in dark.iter().enumerate() {
        if !is_dark {
            continue;
        }
        let mx = (i % width) as u32 + border;
        let my = (i / width) as u32 + border;
        for dy in 0..module_size {
            for dx in 0..module_size {
                img.put_pixel(mx * module_size + dx, my * module_size + dy, fg);
            }
        }
    }

    img
}

/// Overlay a logo image centered on the symbol.
///
/// The logo is resized to 30% of the symbol edge; callers should use a
/// high error correction level so the covered modules stay recoverable.
pub fn embed_logo(img: &mut RgbaImage, logo_path: &Path) -> Result<()> {
    let logo = image::open(logo_path)
        .map_err(|e| Error::Image(format!("failed to load logo: {}", e)))?
        .to_rgba8();

    let target = (img.width() * LOGO_RATIO.0 / LOGO_RATIO.1).max(1);
    let resized = imageops::resize(&logo, target, target, imageops::FilterType::Lanczos3);

    let x = (img.width() - resized.width()) / 2;
    let y = (img.height() - resized.height()) / 2;
    imageops::overlay(img, &resized, x as i64, y as i64);

    Ok(())
}

/// Encode the image as PNG bytes in memory.
pub fn png_bytes(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| Error::Image(e.to_string()))?;
    Ok(buf)
}

/// Save the image to a file, inferring the format from the extension.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let result = if ext == "jpg" || ext == "jpeg" {
        image::DynamicImage::ImageRgba8(img.clone()).to_rgb8().save(path)
    } else {
        img.save(path)
    };

    result.map_err(|e| Error::Image(e.to_string()))
}

/// Render the symbol as an SVG document string.
pub fn to_svg(code: &QrCode, style: &StyleOptions) -> String {
    use qrcode::render::svg;

    let fg = style.fg.to_hex();
    let bg = style.bg.to_hex();

    code.render::<svg::Color>()
        .min_dimensions(200, 200)
        .dark_color(svg::Color(&fg))
        .light_color(svg::Color(&bg))
        .build()
}

/// Build a standalone HTML page embedding the symbol as a data URL.
pub fn to_html(img: &RgbaImage) -> Result<String> {
    let data_url = format!("data:image/png;base64,{}", BASE64.encode(png_bytes(img)?));

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>QR Code</title>
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; margin: 50px; }}
        .qr-container {{ max-width: 500px; margin: 0 auto; padding: 20px;
                        border: 1px solid #ccc; border-radius: 10px; }}
        img {{ max-width: 100%; height: auto; }}
    </style>
</head>
<body>
    <div class="qr-container">
        <h2>Your QR Code</h2>
        <img src="{}" alt="QR Code">
        <p>Scan with a QR code reader app</p>
    </div>
</body>
</html>"#,
        data_url
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Rgb;

    fn style() -> StyleOptions {
        StyleOptions::default()
    }

    #[test]
    fn test_encode_succeeds() {
        let code = encode("hello", EccLevel::M).unwrap();
        // Version 1 symbols are 21 modules wide.
        assert_eq!(code.width(), 21);
    }

    #[test]
    fn test_rasterize_dimensions() {
        let code = encode("hello", EccLevel::M).unwrap();
        let img = rasterize(&code, &style());
        // (21 modules + 2 * 2 border) * 5 px
        assert_eq!(img.width(), 125);
        assert_eq!(img.height(), 125);
    }

    #[test]
    fn test_quiet_zone_is_background() {
        let code = encode("hello", EccLevel::M).unwrap();
        let img = rasterize(&code, &style());
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_finder_pattern_is_foreground() {
        let code = encode("hello", EccLevel::M).unwrap();
        let s = style();
        let img = rasterize(&code, &s);
        // Top-left module of the finder pattern, just inside the quiet zone.
        let offset = s.border * s.module_size;
        assert_eq!(img.get_pixel(offset, offset), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_custom_colors() {
        let code = encode("hello", EccLevel::M).unwrap();
        let custom = StyleOptions {
            fg: Rgb { r: 0, g: 0, b: 0x80 },
            bg: Rgb { r: 0xF0, g: 0xF0, b: 0xF0 },
            ..StyleOptions::default()
        };
        let img = rasterize(&code, &custom);
        assert_eq!(img.get_pixel(0, 0), &Rgba([0xF0, 0xF0, 0xF0, 255]));
        let offset = custom.border * custom.module_size;
        assert_eq!(img.get_pixel(offset, offset), &Rgba([0, 0, 0x80, 255]));
    }

    #[test]
    fn test_png_bytes_magic() {
        let code = encode("hello", EccLevel::M).unwrap();
        let img = rasterize(&code, &style());
        let bytes = png_bytes(&img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']);
    }

    #[test]
    fn test_svg_contains_colors() {
        let code = encode("hello", EccLevel::M).unwrap();
        let svg = to_svg(&code, &style());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#000000"));
        assert!(svg.contains("#FFFFFF"));
    }

    #[test]
    fn test_html_embeds_data_url() {
        let code = encode("hello", EccLevel::M).unwrap();
        let img = rasterize(&code, &style());
        let html = to_html(&img).unwrap();
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_embed_logo_paints_center() {
        let code = encode("hello", EccLevel::H).unwrap();
        let mut img = rasterize(&code, &style());

        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        let logo = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255]));
        logo.save(&logo_path).unwrap();

        embed_logo(&mut img, &logo_path).unwrap();
        let center = img.width() / 2;
        assert_eq!(img.get_pixel(center, center), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_missing_logo_errors() {
        let code = encode("hello", EccLevel::M).unwrap();
        let mut img = rasterize(&code, &style());
        let err = embed_logo(&mut img, Path::new("/nonexistent/logo.png"));
        assert!(matches!(err, Err(crate::Error::Image(_))));
    }
}
