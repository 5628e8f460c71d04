//! Tokenizer: turns formula text into a [`Tokens`] stream.
//!
//! The lexer does not know which letter runs are function names; `sinx` comes out as a
//! single `Text` token and the parser decides what it means.

use log::trace;

use crate::chars;
use crate::errors::LexingError;
use crate::token::{Token, TokenKind, Tokens};

struct Lexer {
    input: Vec<char>,
    pointer: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        // The trailing blank closes any run still open at the end of the input.
        let input = source.chars().chain(std::iter::once(' ')).collect();
        Self {
            input,
            pointer: 0,
            tokens: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pointer).copied()
    }

    fn run(mut self) -> Result<Tokens, LexingError> {
        while let Some(c) = self.current() {
            let token = if chars::is_digit(c) {
                self.number()?
            } else if chars::is_letter(c) {
                self.text()
            } else if let Some(token) = self.single(c) {
                self.pointer += 1;
                token
            } else if chars::is_whitespace(c) {
                self.pointer += 1;
                continue;
            } else {
                return Err(LexingError {
                    character: c,
                    position: self.pointer,
                });
            };
            trace!("token {} at {}: {:?}", token.kind, token.position, token.payload);
            self.tokens.push(token);
        }
        self.tokens.push(Token::eof(self.pointer));
        Ok(Tokens::new(self.tokens))
    }

    fn number(&mut self) -> Result<Token, LexingError> {
        let start = self.pointer;
        let mut literal = String::new();
        let mut seen_separator = false;
        while let Some(c) = self.current() {
            if chars::is_digit(c) {
                literal.push(c);
            } else if chars::is_decimal_separator(c) {
                if seen_separator {
                    return Err(LexingError {
                        character: c,
                        position: self.pointer,
                    });
                }
                seen_separator = true;
                literal.push('.');
            } else {
                break;
            }
            self.pointer += 1;
        }
        let value = literal.parse::<f64>().map_err(|_| LexingError {
            character: self.input[start],
            position: start,
        })?;
        Ok(Token::number(start, value))
    }

    fn text(&mut self) -> Token {
        let start = self.pointer;
        let mut text = String::new();
        while let Some(c) = self.current().filter(|c| chars::is_letter(*c)) {
            text.push(c);
            self.pointer += 1;
        }
        Token::text(start, text)
    }

    fn single(&self, c: char) -> Option<Token> {
        let position = self.pointer;
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Obelus,
            '^' => TokenKind::Power,
            _ if chars::is_opening_bracket(c) => return Some(Token::open_bracket(position, c)),
            _ if chars::is_closing_bracket(c) => return Some(Token::close_bracket(position, c)),
            _ => return None,
        };
        Some(Token::bare(kind, position))
    }
}

/// Splits `source` into tokens.
///
/// Positions are character offsets into `source`. The returned stream always ends with
/// an `Eof` token placed after the implicit trailing blank.
///
/// # Errors
/// A [`LexingError`] for characters outside the accepted alphabet and for a second
/// decimal separator in one number.
pub fn tokenize(source: &str) -> Result<Tokens, LexingError> {
    Lexer::new(source).run()
}
