//! HTML tokenizing: the token types, the tokenizer, and the entity table.

pub mod entities;
pub mod tokenizer;

pub use tokenizer::tokenize;

/// A single token in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of character data with entities already decoded.
    Text(String),
    /// Everything between `<` and `>`, verbatim. Closing tags keep their
    /// leading `/` (`/body`, `/p`).
    Tag(String),
}

/// The tags the layout engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    BodyOpen,
    BodyClose,
    BoldOpen,
    BoldClose,
    ItalicOpen,
    ItalicClose,
    SmallOpen,
    SmallClose,
    BigOpen,
    BigClose,
    LineBreak,
    ParagraphClose,
    /// Any other tag. Has no effect on layout.
    Other,
}

impl TagKind {
    /// Classify raw tag text.
    ///
    /// Only the first whitespace-separated word counts (attributes are
    /// ignored) and a trailing `/` is dropped, so `body class=x` and
    /// `br/` are recognized. Matching is case-sensitive.
    pub fn classify(tag: &str) -> Self {
        let name = tag.split_whitespace().next().unwrap_or("");
        let name = match name.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => name,
        };
        match name {
            "body" => TagKind::BodyOpen,
            "/body" => TagKind::BodyClose,
            "b" => TagKind::BoldOpen,
            "/b" => TagKind::BoldClose,
            "i" => TagKind::ItalicOpen,
            "/i" => TagKind::ItalicClose,
            "small" => TagKind::SmallOpen,
            "/small" => TagKind::SmallClose,
            "big" => TagKind::BigOpen,
            "/big" => TagKind::BigClose,
            "br" => TagKind::LineBreak,
            "/p" => TagKind::ParagraphClose,
            _ => TagKind::Other,
        }
    }
}
