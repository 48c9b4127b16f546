//! Scan command implementation.

use std::path::Path;

use qrforge_core::scan::scan_image;

/// Decode QR codes from an image file and print the payloads.
pub fn scan(image: &Path) -> anyhow::Result<()> {
    let decoded = scan_image(image)?;

    if decoded.is_empty() {
        println!("No QR code found in {}", image.display());
        return Ok(());
    }

    for (i, content) in decoded.iter().enumerate() {
        if decoded.len() > 1 {
            println!("\x1b[1mSymbol {}:\x1b[0m", i + 1);
        }
        println!("{}", content);
    }

    Ok(())
}
