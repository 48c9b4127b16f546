//! Symbol styling: colors, error correction, built-in templates

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Named foreground colors offered by the generator
pub const FOREGROUND_COLORS: &[(&str, &str)] = &[
    ("Black", "#000000"),
    ("Red", "#FF0000"),
    ("Green", "#00AA00"),
    ("Blue", "#0000FF"),
    ("Purple", "#800080"),
    ("Navy", "#000080"),
    ("Teal", "#008080"),
    ("Maroon", "#800000"),
    ("Orange", "#FFA500"),
    ("Brown", "#A52A2A"),
    ("Magenta", "#FF00FF"),
    ("Gold", "#FFD700"),
    ("Crimson", "#DC143C"),
    ("Forest Green", "#228B22"),
    ("Royal Blue", "#4169E1"),
];

/// Named background colors offered by the generator
pub const BACKGROUND_COLORS: &[(&str, &str)] = &[
    ("White", "#FFFFFF"),
    ("Light Gray", "#F0F0F0"),
    ("Light Pink", "#FFE0E0"),
    ("Light Green", "#E0FFE0"),
    ("Light Blue", "#E0E0FF"),
    ("Light Yellow", "#FFFFC0"),
    ("Light Cyan", "#C0FFFF"),
    ("Light Purple", "#FFE0FF"),
    ("Beige", "#F5F5DC"),
    ("Mint", "#F5FFFA"),
    ("Lavender", "#E6E6FA"),
    ("Ivory", "#FFFFF0"),
    ("Cream", "#FFFDD0"),
    ("Sky Blue", "#87CEEB"),
    ("Peach", "#FFDAB9"),
];

/// An RGB color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse a `#RRGGBB` hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Validation(format!("invalid color '{}'", s)));
        }
        // Length and digit checks above make these infallible.
        Ok(Rgb {
            r: u8::from_str_radix(&hex[0..2], 16).unwrap_or(0),
            g: u8::from_str_radix(&hex[2..4], 16).unwrap_or(0),
            b: u8::from_str_radix(&hex[4..6], 16).unwrap_or(0),
        })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Resolve a color from a palette name or a raw `#RRGGBB` string.
pub fn resolve_color(input: &str) -> Result<Rgb> {
    let named = FOREGROUND_COLORS
        .iter()
        .chain(BACKGROUND_COLORS.iter())
        .find(|(name, _)| name.eq_ignore_ascii_case(input));

    match named {
        Some((_, hex)) => Rgb::from_hex(hex),
        None => Rgb::from_hex(input),
    }
}

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EccLevel {
    L,
    M,
    Q,
    H,
}

impl EccLevel {
    /// Approximate share of the symbol recoverable after damage.
    pub fn percent(&self) -> u8 {
        match self {
            EccLevel::L => 7,
            EccLevel::M => 15,
            EccLevel::Q => 25,
            EccLevel::H => 30,
        }
    }

    /// Display label, e.g. `M (15%)`.
    pub fn label(&self) -> String {
        format!("{:?} ({}%)", self, self.percent())
    }

    /// Parse from a letter or a `M (15%)` style label.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('L') => Ok(EccLevel::L),
            Some('M') => Ok(EccLevel::M),
            Some('Q') => Ok(EccLevel::Q),
            Some('H') => Ok(EccLevel::H),
            _ => Err(Error::Validation(format!(
                "unknown error correction level '{}' (expected L, M, Q or H)",
                s
            ))),
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            EccLevel::L => "L",
            EccLevel::M => "M",
            EccLevel::Q => "Q",
            EccLevel::H => "H",
        }
    }

    pub(crate) fn as_ec_level(&self) -> qrcode::EcLevel {
        match self {
            EccLevel::L => qrcode::EcLevel::L,
            EccLevel::M => qrcode::EcLevel::M,
            EccLevel::Q => qrcode::EcLevel::Q,
            EccLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Rendering options for a generated symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOptions {
    /// Module (dark cell) color
    pub fg: Rgb,
    /// Background color
    pub bg: Rgb,
    /// Pixel size of each module
    pub module_size: u32,
    /// Quiet zone width in modules
    pub border: u32,
    /// Error correction level
    pub ecc: EccLevel,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            fg: Rgb::BLACK,
            bg: Rgb::WHITE,
            module_size: 5,
            border: 2,
            ecc: EccLevel::M,
        }
    }
}

/// A named built-in style preset
#[derive(Debug, Clone)]
pub struct Template {
    pub name: &'static str,
    pub style: StyleOptions,
}

/// The built-in style templates.
pub fn builtin_templates() -> Vec<Template> {
    fn make(name: &'static str, fg: &str, bg: &str, module_size: u32, border: u32, ecc: EccLevel) -> Template {
        Template {
            name,
            style: StyleOptions {
                // Palette entries are valid hex by construction.
                fg: resolve_color(fg).unwrap_or(Rgb::BLACK),
                bg: resolve_color(bg).unwrap_or(Rgb::WHITE),
                module_size,
                border,
                ecc,
            },
        }
    }

    vec![
        make("Standard", "Black", "White", 5, 2, EccLevel::M),
        make("Professional", "Navy", "Light Gray", 6, 2, EccLevel::H),
        make("Colorful", "Purple", "Light Yellow", 7, 3, EccLevel::Q),
        make("High Contrast", "Black", "Light Yellow", 8, 4, EccLevel::H),
        make("Modern", "Royal Blue", "White", 6, 2, EccLevel::M),
        make("Corporate", "Teal", "White", 5, 2, EccLevel::M),
    ]
}

/// Look up a built-in template by name, case-insensitively.
pub fn template(name: &str) -> Result<StyleOptions> {
    builtin_templates()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map(|t| t.style)
        .ok_or_else(|| Error::NotFound(format!("no template named '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgb::from_hex("#4169E1").unwrap();
        assert_eq!(c, Rgb { r: 0x41, g: 0x69, b: 0xE1 });
        assert_eq!(c.to_hex(), "#4169E1");
    }

    #[test]
    fn test_hex_without_hash() {
        assert_eq!(Rgb::from_hex("000080").unwrap(), Rgb { r: 0, g: 0, b: 0x80 });
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GGGGGG").is_err());
        assert!(Rgb::from_hex("").is_err());
    }

    #[test]
    fn test_resolve_named_color() {
        assert_eq!(resolve_color("Black").unwrap(), Rgb::BLACK);
        assert_eq!(resolve_color("forest green").unwrap(), Rgb { r: 0x22, g: 0x8B, b: 0x22 });
        assert_eq!(resolve_color("Sky Blue").unwrap(), Rgb { r: 0x87, g: 0xCE, b: 0xEB });
    }

    #[test]
    fn test_resolve_falls_back_to_hex() {
        assert_eq!(resolve_color("#123456").unwrap(), Rgb { r: 0x12, g: 0x34, b: 0x56 });
        assert!(resolve_color("Not A Color").is_err());
    }

    #[test]
    fn test_ecc_parse() {
        assert_eq!(EccLevel::parse("M").unwrap(), EccLevel::M);
        assert_eq!(EccLevel::parse("h").unwrap(), EccLevel::H);
        assert_eq!(EccLevel::parse("Q (25%)").unwrap(), EccLevel::Q);
        assert!(EccLevel::parse("X").is_err());
    }

    #[test]
    fn test_ecc_label() {
        assert_eq!(EccLevel::M.label(), "M (15%)");
        assert_eq!(EccLevel::H.label(), "H (30%)");
    }

    #[test]
    fn test_default_style() {
        let style = StyleOptions::default();
        assert_eq!(style.fg, Rgb::BLACK);
        assert_eq!(style.bg, Rgb::WHITE);
        assert_eq!(style.module_size, 5);
        assert_eq!(style.border, 2);
        assert_eq!(style.ecc, EccLevel::M);
    }

    #[test]
    fn test_builtin_templates() {
        let professional = template("professional").unwrap();
        assert_eq!(professional.fg, Rgb { r: 0, g: 0, b: 0x80 });
        assert_eq!(professional.ecc, EccLevel::H);
        assert_eq!(professional.module_size, 6);

        assert_eq!(builtin_templates().len(), 6);
        assert!(template("Futuristic").is_err());
    }

    #[test]
    fn test_style_serde_roundtrip() {
        let style = template("Colorful").unwrap();
        let json = serde_json::to_string(&style).unwrap();
        let back: StyleOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, style);
    }
}
