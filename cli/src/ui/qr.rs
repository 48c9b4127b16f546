//! Terminal QR code preview.

use qrforge_core::{render, QrCode};

/// Print a QR code to the terminal.
///
/// Uses Unicode block characters for compact display where
/// each character represents 2 vertical modules.
pub fn print_qr_code(code: &QrCode) {
    let (width, dark) = render::modules(code);

    // Unicode block characters:
    // ▀ = top black, bottom white
    // ▄ = top white, bottom black
    // █ = both black
    // (space) = both white

    let quiet = "  ";

    // Top quiet zone
    println!("{}{}", quiet, " ".repeat(width + 4));

    for y in (0..dark.len()).step_by(width * 2) {
        print!("{}  ", quiet);
        for x in 0..width {
            let top = dark.get(y + x).copied().unwrap_or(false);
            let bottom = dark.get(y + width + x).copied().unwrap_or(false);

            let ch = match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            print!("{}", ch);
        }
        println!("  ");
    }

    // Bottom quiet zone
    println!("{}{}", quiet, " ".repeat(width + 4));
}
