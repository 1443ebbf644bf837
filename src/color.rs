use anyhow::{bail, Result};
use palette::Srgb;

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
pub const WHITE: Color = Color {
    r: 255,
    g: 255,
    b: 255,
};

/// Luminance above which overlay text switches from white to black.
/// Comparison is strict: a color landing exactly on the threshold gets
/// white text.
pub const CONTRAST_THRESHOLD: f64 = 186.0;

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `FF8800`.
    /// Exactly 6 hex digits are required; the leading `#` is optional
    /// (palette's parser also accepts the 3-digit shorthand, which the
    /// element data format does not allow).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("invalid hex color {hex:?}: expected exactly 6 hex digits");
        }
        let srgb = digits
            .parse::<Srgb<u8>>()
            .map_err(|e| anyhow::anyhow!("invalid hex color {hex:?}: {e}"))?;
        Ok(Self::from_srgb_u8(srgb))
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Serialize to uppercase hex `#RRGGBB`, the form drawn on the image.
    pub fn to_hex_upper(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Create from `palette::Srgb<u8>`.
    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self {
            r: srgb.red,
            g: srgb.green,
            b: srgb.blue,
        }
    }

    /// Perceived luminance over the 8-bit channels, in `[0, 255]`.
    ///
    /// Uses the Rec. 601 weights `0.299 R + 0.587 G + 0.114 B`. This is the
    /// formula the rendered output depends on; do not swap in the WCAG
    /// linearized variant.
    pub fn luminance(self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Black or white, whichever stays legible on top of this color.
    pub fn contrast_color(self) -> Color {
        if self.luminance() > CONTRAST_THRESHOLD {
            BLACK
        } else {
            WHITE
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
