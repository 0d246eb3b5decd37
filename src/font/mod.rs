//! # Font Management
//!
//! The three report templates use the Helvetica family exclusively, so the
//! engine resolves every request against the standard PDF fonts; no
//! embedding, no subsetting. Measurement uses the AFM advance widths in
//! [`metrics`].

pub mod metrics;

pub use metrics::StandardFontMetrics;
use std::collections::HashMap;

/// A font registry that maps weight + style onto a standard PDF font.
pub struct FontRegistry {
    fonts: HashMap<FontKey, StandardFont>,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub weight: u32,
    pub italic: bool,
}

/// The standard PDF fonts the reports draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// The PDF BaseFont name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            // Oblique shares the upright advance widths.
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
        }
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert(FontKey { weight: 400, italic: false }, StandardFont::Helvetica);
        fonts.insert(FontKey { weight: 700, italic: false }, StandardFont::HelveticaBold);
        fonts.insert(FontKey { weight: 400, italic: true }, StandardFont::HelveticaOblique);
        fonts.insert(FontKey { weight: 700, italic: true }, StandardFont::HelveticaBoldOblique);
        Self { fonts }
    }

    /// Look up a font, snapping the weight to 400/700 and falling back to
    /// upright Helvetica.
    pub fn resolve(&self, weight: u32, italic: bool) -> StandardFont {
        let snapped = if weight >= 600 { 700 } else { 400 };
        self.fonts
            .get(&FontKey { weight: snapped, italic })
            .copied()
            .unwrap_or(StandardFont::Helvetica)
    }
}

/// Shared font context used by layout and PDF serialization.
/// Provides text measurement with AFM glyph metrics.
pub struct FontContext {
    registry: FontRegistry,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
        }
    }

    /// Advance width of a single character, in the same unit as `font_size`.
    pub fn char_width(&self, ch: char, weight: u32, italic: bool, font_size: f64) -> f64 {
        self.registry
            .resolve(weight, italic)
            .metrics()
            .char_width(ch, font_size)
    }

    /// Measure the width of a string.
    pub fn measure_string(&self, text: &str, weight: u32, italic: bool, font_size: f64) -> f64 {
        self.registry
            .resolve(weight, italic)
            .metrics()
            .measure_string(text, font_size)
    }

    pub fn resolve(&self, weight: u32, italic: bool) -> StandardFont {
        self.registry.resolve(weight, italic)
    }
}
