//! Parsing, differentiation and fast sampling of formulas typed by a user.
//!
//! This crate turns free-form input such as `2x + sin x^2` into an immutable expression tree.
//! The tree can be evaluated, rendered back to text or TeX, and symbolically differentiated.
//! For plotting, a formula is sampled over an x range, either by walking the tree or through
//! a function compiled with [Cranelift](https://github.com/bytecodealliance/wasmtime/tree/main/cranelift).
//!
//! # Features
//!
//! - Forgiving input: implicit multiplication, mixed bracket kinds, `sinx` and `cosPI`
//! - TeX rendering and a fully parenthesised canonical form
//! - Symbolic derivatives, including the slope of implicit curves
//! - JIT-compiled sampling and a weighted choice of the y range to plot
//!
//! # Example
//!
//! ```rust
//! use graphly::Formula;
//!
//! let formula = Formula::new("2x + y^2").unwrap();
//! assert_eq!(formula.canonical(), "((2 * x) + (y ^ 2))");
//!
//! // Compile and evaluate at (x=1, y=2)
//! let compiled = formula.compile().unwrap();
//! assert_eq!(compiled.eval(&[1.0, 2.0]).unwrap(), 6.0);
//!
//! // d/dx
//! assert_eq!(formula.derivative("x").eval_at(1.0), 2.0);
//! ```

pub use formula::{CompiledFormula, Formula, InputKind};

pub mod prelude {
    pub use crate::backends::vector::Vector;
    pub use crate::builder::build_function;
    pub use crate::derivations::{derive_and_simplify, derive_implicit, derive_smart};
    pub use crate::errors::{FormulaError, ParseError};
    pub use crate::expr::Node;
    pub use crate::formula::{CompiledFormula, Formula, InputKind};
    pub use crate::parser::parse_str;
    pub use crate::sampling::SamplingConfig;
    pub use crate::simplify::{Algebraic, Passthrough, Simplifier};
}

/// Containers accepted by compiled formulas
pub mod backends {
    pub mod vector;
}
/// JIT compilation functionality using Cranelift
pub mod builder;
/// Character classes used by the lexer
pub mod chars;
/// Derivatives as offered to the user
pub mod derivations;
/// Symbolic differentiation
pub mod diff;
/// Error types for the various failure modes
pub mod errors;
/// Expression tree representation
pub mod expr;
/// High-level formula handling
pub mod formula;
/// The named functions a formula may apply
pub mod functions;
/// Tokenizer for typed formulas
pub mod lexer;
/// Recursive-descent parser
pub mod parser;
/// Sampling and plot range selection
pub mod sampling;
/// Hooks for an external simplifier
pub mod simplify;
/// TeX rendering
pub mod tex;
/// Tokens and the stream the parser reads
pub mod token;
/// Type aliases shared across modules
pub mod types;
/// Native math routines linked into JIT-compiled code
pub(crate) mod operators;
