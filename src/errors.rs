//! Error types for the graphly crate.
//!
//! This module defines the errors that can occur while turning a typed formula into a
//! tree, rewriting it, and compiling it to machine code. The main error types are:
//!
//! - `LexingError`: A character the tokenizer cannot classify, or a malformed number
//! - `ParseError`: Token sequences that do not match the grammar
//! - `SimplifierError`: Failures reported by an external simplification routine
//! - `BuilderError`: Errors during JIT compilation with Cranelift
//! - `FormulaError`: High-level errors when working with a formula as a whole
//!
//! Every error that points at the input carries the character offset it refers to.

use cranelift_codegen::CodegenError;
use cranelift_module::ModuleError;
use thiserror::Error;

use crate::token::TokenKind;

/// A character the tokenizer cannot place.
///
/// Raised for characters that are no digit, letter, operator, bracket or whitespace, and
/// for the second decimal separator inside one number literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unexpected character '{character}' at position {position}")]
pub struct LexingError {
    pub character: char,
    pub position: usize,
}

/// Errors raised while building a tree from tokens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input could not be tokenized
    #[error(transparent)]
    Lexing(#[from] LexingError),
    /// The grammar required one kind of token but another one came up
    #[error("expected {expected} but found {found} at position {position}")]
    Syntax {
        found: TokenKind,
        expected: TokenKind,
        position: usize,
    },
    /// A closing bracket from another family than the opening one
    #[error("bracket '{closing}' at position {position} does not close '{opening}'")]
    BracketMismatch {
        opening: char,
        closing: char,
        position: usize,
    },
    /// Brackets, signs, powers or function applications nested past the parser's limit
    #[error("formula nests deeper than {limit} levels at position {position}")]
    TooDeep { limit: usize, position: usize },
}

impl ParseError {
    /// Character offset the error refers to.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lexing(err) => err.position,
            ParseError::Syntax { position, .. }
            | ParseError::BracketMismatch { position, .. }
            | ParseError::TooDeep { position, .. } => *position,
        }
    }
}

/// Failure reported by a simplification routine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("simplifier failed: {0}")]
pub struct SimplifierError(pub String);

/// Errors that can occur during JIT compilation of formulas.
///
/// This enum represents the failure modes of lowering a formula tree into machine code
/// using Cranelift as the JIT compiler backend.
#[derive(Error, Debug)]
pub enum BuilderError {
    /// Error when the target machine architecture is not supported
    #[error("host machine is not supported: {0}")]
    HostMachineNotSupported(String),
    /// Error during Cranelift code generation
    #[error("codegen error: {0}")]
    CodegenError(CodegenError),
    /// Error in the Cranelift JIT module
    #[error("module error: {0}")]
    ModuleError(Box<ModuleError>),
    /// Error when defining the JIT function
    #[error("function error: {0}")]
    FunctionError(String),
    /// Error when declaring the JIT function or one of the natives it calls
    #[error("declaration error: {0}")]
    DeclarationError(String),
}

impl From<ModuleError> for BuilderError {
    fn from(err: ModuleError) -> Self {
        BuilderError::ModuleError(Box::new(err))
    }
}

/// High-level errors that can occur when working with formulas.
///
/// Wraps the lower-level errors of every stage from parsing to compilation.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Error when the source text does not tokenize or parse
    #[error("Failed to parse formula: {0}")]
    Parse(#[from] ParseError),
    /// Error when a formula mentions more distinct variables than the input allows
    #[error("Too many variables: {count} used ({variables}), at most {allowed} allowed")]
    TooManyVariables {
        count: usize,
        allowed: usize,
        variables: String,
    },
    /// Error when the simplifier fails
    #[error("Failed to simplify formula: {0}")]
    Simplifier(#[from] SimplifierError),
    /// Error when JIT compiling the formula
    #[error("Failed to build JIT function: {0}")]
    BuildFunction(#[from] BuilderError),
    /// Error when the input length is not the same as the number of variables
    #[error("Invalid input length: expected {expected}, got {got}")]
    InvalidInputLength { expected: usize, got: usize },
}

impl From<LexingError> for FormulaError {
    fn from(err: LexingError) -> Self {
        FormulaError::Parse(ParseError::Lexing(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_positions() {
        let err = LexingError {
            character: '#',
            position: 4,
        };
        assert_eq!(err.to_string(), "unexpected character '#' at position 4");

        let err = ParseError::BracketMismatch {
            opening: '(',
            closing: ']',
            position: 4,
        };
        assert_eq!(err.position(), 4);
        assert!(err.to_string().contains("']'"));
    }

    #[test]
    fn test_lexing_error_lifts_into_formula_error() {
        let err: FormulaError = LexingError {
            character: '.',
            position: 3,
        }
        .into();
        match err {
            FormulaError::Parse(parse) => assert_eq!(parse.position(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
