//! Splitting plain text into word, space and symbol blocks.

use crate::block::{Block, BlockKind};
use crate::error::RenderError;
use crate::event::Event;
use crate::listener::Listener;

/// A piece of tokenized text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Space,
    SpecialSymbol(char),
    NewLine,
}

impl Token<'_> {
    #[must_use]
    pub fn to_block(self) -> Block {
        Block::new(match self {
            Token::Word(word) => BlockKind::Word(word.to_owned()),
            Token::Space => BlockKind::Space,
            Token::SpecialSymbol(symbol) => BlockKind::SpecialSymbol(symbol),
            Token::NewLine => BlockKind::NewLine,
        })
    }

    #[must_use]
    pub fn to_event(self) -> Event<'static> {
        match self {
            Token::Word(word) => Event::word(word.to_owned()),
            Token::Space => Event::Space,
            Token::SpecialSymbol(symbol) => Event::SpecialSymbol(symbol),
            Token::NewLine => Event::NewLine,
        }
    }
}

/// Whether `c` becomes a special symbol rather than part of a word.
#[must_use]
pub fn is_special_symbol(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Tokenize `text`.
///
/// Runs of spaces and tabs collapse into one space; `\r\n` and `\n` are new
/// lines; each ASCII punctuation character is a special symbol.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        let is_break = c == ' ' || c == '\t' || c == '\n' || c == '\r' || is_special_symbol(c);
        if !is_break {
            word_start.get_or_insert(index);
            continue;
        }
        if let Some(start) = word_start.take() {
            tokens.push(Token::Word(&text[start..index]));
        }
        match c {
            ' ' | '\t' => {
                if tokens.last() != Some(&Token::Space) {
                    tokens.push(Token::Space);
                }
            }
            '\r' => {
                if chars.peek().map(|&(_, n)| n) == Some('\n') {
                    chars.next();
                }
                tokens.push(Token::NewLine);
            }
            '\n' => tokens.push(Token::NewLine),
            symbol => tokens.push(Token::SpecialSymbol(symbol)),
        }
    }
    if let Some(start) = word_start {
        tokens.push(Token::Word(&text[start..]));
    }
    tokens
}

/// Blocks for `text`.
#[must_use]
pub fn text_blocks(text: &str) -> Vec<Block> {
    tokenize(text).into_iter().map(Token::to_block).collect()
}

/// Emit `text` as events.
pub fn emit_text(text: &str, listener: &mut dyn Listener) -> Result<(), RenderError> {
    for token in tokenize(text) {
        listener.event(token.to_event())?;
    }
    Ok(())
}
