//! Text style state driven by tag tokens.

use super::font::{FontDescriptor, Slant, Weight};
use crate::html::TagKind;

/// Size change applied by `<small>` (and undone by `</small>`).
pub const SMALL_STEP: i32 = 2;

/// Size change applied by `<big>` (and undone by `</big>`).
pub const BIG_STEP: i32 = 4;

/// Current weight, slant, size, and whether text is inside `<body>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleState {
    pub weight: Weight,
    pub slant: Slant,
    /// May drift below 1 under deeply nested `<small>`; the font
    /// descriptor clamps it.
    pub size: i32,
    pub in_body: bool,
}

impl StyleState {
    /// Defaults at the start of every layout.
    pub fn new(base_size: u16) -> Self {
        Self {
            weight: Weight::Normal,
            slant: Slant::Roman,
            size: i32::from(base_size),
            in_body: false,
        }
    }

    /// Apply a tag's style effect. Tags that only affect line breaking
    /// (and unrecognized tags) leave the state untouched.
    pub fn apply(&mut self, tag: TagKind) {
        match tag {
            TagKind::BodyOpen => self.in_body = true,
            TagKind::BodyClose => self.in_body = false,
            TagKind::BoldOpen => self.weight = Weight::Bold,
            TagKind::BoldClose => self.weight = Weight::Normal,
            TagKind::ItalicOpen => self.slant = Slant::Italic,
            TagKind::ItalicClose => self.slant = Slant::Roman,
            TagKind::SmallOpen => self.size -= SMALL_STEP,
            TagKind::SmallClose => self.size += SMALL_STEP,
            TagKind::BigOpen => self.size += BIG_STEP,
            TagKind::BigClose => self.size -= BIG_STEP,
            TagKind::LineBreak | TagKind::ParagraphClose | TagKind::Other => {},
        }
    }

    /// Font for text laid out under this state.
    pub fn font(&self) -> FontDescriptor {
        let size = self.size.clamp(1, i32::from(u16::MAX)) as u16;
        FontDescriptor::new(size, self.weight, self.slant)
    }
}
