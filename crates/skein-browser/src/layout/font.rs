//! Font descriptors and the font metrics capability supplied by the host.

/// Stroke weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

/// Glyph slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slant {
    #[default]
    Roman,
    Italic,
}

/// Everything a host needs to pick a concrete font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontDescriptor {
    /// Point size, at least 1.
    pub size: u16,
    pub weight: Weight,
    pub slant: Slant,
}

impl FontDescriptor {
    pub fn new(size: u16, weight: Weight, slant: Slant) -> Self {
        Self {
            size: size.max(1),
            weight,
            slant,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == Weight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.slant == Slant::Italic
    }
}

/// Vertical metrics for one font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyph.
    pub descent: f32,
    /// Recommended baseline-to-baseline distance.
    pub linespace: f32,
}

/// Text measurement capability provided by the rendering host.
pub trait FontMetrics {
    /// Advance width of `text` set in `font`.
    fn measure(&self, text: &str, font: &FontDescriptor) -> f32;

    /// Vertical metrics of `font`.
    fn metrics(&self, font: &FontDescriptor) -> LineMetrics;
}

/// Approximate metrics for hosts without a font system: a fixed advance
/// of half the point size per character, three quarters of the size
/// above the baseline and one quarter below. Bold glyphs are a sixteenth
/// of the size wider.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMetrics;

impl FontMetrics for MonospaceMetrics {
    fn measure(&self, text: &str, font: &FontDescriptor) -> f32 {
        let size = f32::from(font.size);
        let advance = if font.is_bold() {
            size / 2.0 + size / 16.0
        } else {
            size / 2.0
        };
        text.chars().count() as f32 * advance
    }

    fn metrics(&self, font: &FontDescriptor) -> LineMetrics {
        let size = f32::from(font.size);
        LineMetrics {
            ascent: size * 0.75,
            descent: size * 0.25,
            linespace: size,
        }
    }
}
