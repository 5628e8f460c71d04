//! Tokens produced by the lexer and the consumable stream the parser reads them from.
//!
//! A [`Token`] is immutable once created. Bracket tokens carry their glyph, which maps to
//! one of four [`BracketFamily`] values; an opening bracket may only be closed by a glyph
//! of the same family.
//!
//! [`Tokens`] is owned by exactly one parser invocation. It always ends in an
//! [`TokenKind::Eof`] token, and that final token is never handed out more than
//! "virtually": [`Tokens::next`] keeps returning it instead of running dry.

use std::collections::VecDeque;
use std::fmt;

use crate::chars;

/// The kind of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    Text,
    Plus,
    Minus,
    Times,
    Obelus,
    Power,
    OpenBracket,
    CloseBracket,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "NUMBER",
            TokenKind::Text => "TEXT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Obelus => "OBELUS",
            TokenKind::Power => "POWER",
            TokenKind::OpenBracket => "OPEN_BRACKET",
            TokenKind::CloseBracket => "CLOSE_BRACKET",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// The four bracket families. The discriminant is the family code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketFamily {
    Round = 1,
    Curly = 2,
    Square = 3,
    Angle = 4,
}

impl BracketFamily {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Data attached to a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Number(f64),
    Text(String),
    Bracket(char),
}

/// A single lexical token with the character offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
    pub payload: Payload,
}

impl Token {
    pub fn number(position: usize, value: f64) -> Self {
        Self {
            kind: TokenKind::Number,
            position,
            payload: Payload::Number(value),
        }
    }

    pub fn text(position: usize, value: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Text,
            position,
            payload: Payload::Text(value.into()),
        }
    }

    /// A token without payload (`+ - * / ^` and end of input).
    pub fn bare(kind: TokenKind, position: usize) -> Self {
        Self {
            kind,
            position,
            payload: Payload::None,
        }
    }

    pub fn open_bracket(position: usize, glyph: char) -> Self {
        Self {
            kind: TokenKind::OpenBracket,
            position,
            payload: Payload::Bracket(glyph),
        }
    }

    pub fn close_bracket(position: usize, glyph: char) -> Self {
        Self {
            kind: TokenKind::CloseBracket,
            position,
            payload: Payload::Bracket(glyph),
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::bare(TokenKind::Eof, position)
    }

    /// The numeric value of a `Number` token.
    pub fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(value) => Some(value),
            _ => None,
        }
    }

    /// The text of a `Text` token.
    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The glyph of a bracket token.
    pub fn bracket_glyph(&self) -> Option<char> {
        match self.payload {
            Payload::Bracket(glyph) => Some(glyph),
            _ => None,
        }
    }

    /// The family of a bracket token.
    pub fn bracket_family(&self) -> Option<BracketFamily> {
        self.bracket_glyph().and_then(chars::bracket_family)
    }
}

/// Consumable queue of tokens, terminated by an `Eof` token.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokens {
    tokens: VecDeque<Token>,
}

impl Tokens {
    /// Wraps a token sequence. An `Eof` token is appended when the sequence does not
    /// already end in one.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut tokens: VecDeque<Token> = tokens.into();
        let ends_in_eof = matches!(tokens.back(), Some(token) if token.kind == TokenKind::Eof);
        if !ends_in_eof {
            let position = tokens.back().map_or(0, |token| token.position + 1);
            tokens.push_back(Token::eof(position));
        }
        Self { tokens }
    }

    /// The next token, without consuming it.
    pub fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof and `next` never removes it.
        &self.tokens[0]
    }

    /// Consumes and returns the next token. Once only `Eof` is left, it is returned
    /// again on every call.
    pub fn next(&mut self) -> Token {
        if self.tokens.len() == 1 {
            return self.tokens[0].clone();
        }
        match self.tokens.pop_front() {
            Some(token) => token,
            None => Token::eof(0),
        }
    }

    /// Pushes tokens back to the front of the stream, keeping their order.
    pub fn prepend(&mut self, tokens: impl IntoIterator<Item = Token>) {
        let tokens: Vec<Token> = tokens.into_iter().collect();
        for token in tokens.into_iter().rev() {
            self.tokens.push_front(token);
        }
    }

    /// Number of tokens left, including the final `Eof`.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The kinds of the remaining tokens, mostly useful in tests and traces.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|token| token.kind).collect()
    }
}

impl IntoIterator for Tokens {
    type Item = Token;
    type IntoIter = std::collections::vec_deque::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
