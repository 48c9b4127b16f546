//! Templates command implementation.

use qrforge_core::style::builtin_templates;

/// List the built-in style templates.
pub fn templates() {
    println!("\n\x1b[1mBuilt-in templates\x1b[0m");
    for template in builtin_templates() {
        let s = &template.style;
        println!(
            "  \x1b[1m{:<14}\x1b[0m fg {} on bg {}, module {} px, border {}, ECC {}",
            template.name,
            s.fg,
            s.bg,
            s.module_size,
            s.border,
            s.ecc.label(),
        );
    }
    println!();
}
