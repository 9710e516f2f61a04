//! Single-pass markup tokenizer.
//!
//! Splits a document into [`Token::Text`] and [`Token::Tag`] tokens,
//! decoding character references inside text. There is no tree
//! construction and no error recovery: an unterminated `<` swallows the
//! rest of the input and emits nothing for it.

use super::Token;
use super::entities::decode_entity;

/// What the scanner is accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Tag,
    Entity,
}

/// Tokenize `body` eagerly into an ordered token list.
pub fn tokenize(body: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut tag = String::new();
    let mut entity = String::new();
    let mut mode = Mode::Text;

    for c in body.chars() {
        match mode {
            Mode::Tag => {
                if c == '>' {
                    tokens.push(Token::Tag(std::mem::take(&mut tag)));
                    mode = Mode::Text;
                } else {
                    tag.push(c);
                }
            },
            Mode::Entity => {
                if c == ';' {
                    decode_entity(&entity, &mut text);
                    entity.clear();
                    mode = Mode::Text;
                } else {
                    entity.push(c);
                }
            },
            Mode::Text => match c {
                '<' => {
                    flush_text(&mut text, &mut tokens);
                    mode = Mode::Tag;
                },
                '&' => mode = Mode::Entity,
                _ => text.push(c),
            },
        }
    }

    match mode {
        // A reference never closed by `;` is kept as literal text.
        Mode::Entity => {
            text.push('&');
            text.push_str(&entity);
        },
        Mode::Tag => log::debug!("unterminated tag dropped ({} chars)", tag.len()),
        Mode::Text => {},
    }
    flush_text(&mut text, &mut tokens);

    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}
