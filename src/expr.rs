//! Expression module for representing parsed formulas.
//!
//! This module defines the immutable tree every other part of the crate works on. The
//! main types are:
//!
//! - `Node`: An enum representing the kinds of tree elements
//! - `BinaryOp`: The five binary operators and their numeric rules
//! - `Constant`: The named constants `e` and `π`
//!
//! The tree is built recursively using `Box<Node>` for children and can be:
//! - Evaluated against a set of variable bindings
//! - Printed in a canonical, fully parenthesised form that parses again
//! - Rendered as LaTeX (see [`crate::tex`])
//! - Symbolically differentiated (see [`crate::diff`])
//! - JIT compiled into machine code (see [`crate::builder`])
//!
//! # Tree Structure
//! - Leaf nodes: numbers, variables and constants
//! - Binary operations: `+ - * / ^`
//! - Function applications: one of the [`Function`] table entries with one argument
//!
//! Unary minus has no node of its own: negating a number literal produces the negative
//! literal and negating anything else produces `-1 * x`.
//!
//! Every operation returns new trees; nodes are never mutated after construction.

use std::f64::consts::{E, PI};
use std::fmt;

use itertools::Itertools;
use log::debug;

use crate::functions::Function;
use crate::types::Bindings;

/// Indentation used per level by [`Node::tree`].
pub const INDENT: &str = "  ";

/// The binary operators, from loosest to tightest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOp {
    /// The operator as written in canonical form.
    pub fn glyph(self) -> char {
        match self {
            BinaryOp::Plus => '+',
            BinaryOp::Minus => '-',
            BinaryOp::Times => '*',
            BinaryOp::Divide => '/',
            BinaryOp::Power => '^',
        }
    }

    /// Rule name used by tree dumps.
    pub fn rule_name(self) -> &'static str {
        match self {
            BinaryOp::Plus => "PLUS",
            BinaryOp::Minus => "MINUS",
            BinaryOp::Times => "TIMES",
            BinaryOp::Divide => "OBELUS",
            BinaryOp::Power => "POWER",
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Plus => left + right,
            BinaryOp::Minus => left - right,
            BinaryOp::Times => left * right,
            BinaryOp::Divide => left / right,
            BinaryOp::Power => left.powf(right),
        }
    }

    /// `+` and `-`.
    pub fn is_additive(self) -> bool {
        matches!(self, BinaryOp::Plus | BinaryOp::Minus)
    }
}

/// A named mathematical constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Euler,
    Pi,
}

impl Constant {
    /// Every accepted spelling, longest first.
    pub const NAMES: [(&'static str, Constant); 5] = [
        ("euler", Constant::Euler),
        ("pi", Constant::Pi),
        ("Pi", Constant::Pi),
        ("PI", Constant::Pi),
        ("e", Constant::Euler),
    ];

    /// Resolves a constant name: `e`, `euler`, `pi`, `Pi` or `PI`.
    pub fn from_name(name: &str) -> Option<Constant> {
        Self::NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, constant)| *constant)
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Euler => E,
            Constant::Pi => PI,
        }
    }

    /// The name printed in canonical form.
    pub fn name(self) -> &'static str {
        match self {
            Constant::Euler => "e",
            Constant::Pi => "PI",
        }
    }

    pub fn tex(self) -> &'static str {
        match self {
            Constant::Euler => "e",
            Constant::Pi => "\\pi",
        }
    }

    pub fn rule_name(self) -> &'static str {
        match self {
            Constant::Euler => "EULER",
            Constant::Pi => "PI",
        }
    }
}

/// A literal as text the parser reads back to the same value. Infinities and NaN, which
/// only arise from overflowing literals or folding, are written as divisions by zero.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "(0 / 0)".to_string()
    } else if value == f64::INFINITY {
        "(1 / 0)".to_string()
    } else if value == f64::NEG_INFINITY {
        "(-1 / 0)".to_string()
    } else {
        format!("{value}")
    }
}

/// An element of a formula tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A numeric literal
    Number(f64),
    /// A named free variable
    Variable(String),
    /// A named constant
    Constant(Constant),
    /// A binary operation
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// A function applied to one argument
    Function {
        function: Function,
        argument: Box<Node>,
    },
}

impl Node {
    pub fn number(value: f64) -> Node {
        Node::Number(value)
    }

    pub fn variable(name: impl Into<String>) -> Node {
        Node::Variable(name.into())
    }

    pub fn euler() -> Node {
        Node::Constant(Constant::Euler)
    }

    pub fn pi() -> Node {
        Node::Constant(Constant::Pi)
    }

    pub fn zero() -> Node {
        Node::Number(0.0)
    }

    pub fn one() -> Node {
        Node::Number(1.0)
    }

    pub fn negative_one() -> Node {
        Node::Number(-1.0)
    }

    /// `1 / 2`, the exponent of a square root.
    pub fn half() -> Node {
        Node::divide(Node::one(), Node::number(2.0))
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn plus(left: Node, right: Node) -> Node {
        Node::binary(BinaryOp::Plus, left, right)
    }

    pub fn minus(left: Node, right: Node) -> Node {
        Node::binary(BinaryOp::Minus, left, right)
    }

    pub fn times(left: Node, right: Node) -> Node {
        Node::binary(BinaryOp::Times, left, right)
    }

    pub fn divide(left: Node, right: Node) -> Node {
        Node::binary(BinaryOp::Divide, left, right)
    }

    pub fn power(left: Node, right: Node) -> Node {
        Node::binary(BinaryOp::Power, left, right)
    }

    pub fn apply(function: Function, argument: Node) -> Node {
        Node::Function {
            function,
            argument: Box::new(argument),
        }
    }

    /// Negation: number literals fold into their negative, anything else becomes `-1 * x`.
    pub fn negate(node: Node) -> Node {
        match node {
            Node::Number(value) => Node::Number(-value),
            other => Node::times(Node::negative_one(), other),
        }
    }

    /// Evaluates the tree.
    ///
    /// Variables missing from `bindings` evaluate to `0`.
    pub fn evaluate(&self, bindings: &Bindings) -> f64 {
        match self {
            Node::Number(value) => *value,
            Node::Variable(name) => match bindings.get(name) {
                Some(value) => *value,
                None => {
                    debug!("variable {name} is unbound, evaluating as 0");
                    0.0
                }
            },
            Node::Constant(constant) => constant.value(),
            Node::Binary { op, left, right } => {
                op.apply(left.evaluate(bindings), right.evaluate(bindings))
            }
            Node::Function { function, argument } => function.apply(argument.evaluate(bindings)),
        }
    }

    /// Canonical text: binary nodes as `(l op r)`, functions as `name(arg)`.
    ///
    /// With `substitute` set, every variable prints as that name instead of its own.
    pub fn format(&self, substitute: Option<&str>) -> String {
        match self {
            Node::Number(value) => format_number(*value),
            Node::Variable(name) => substitute.unwrap_or(name).to_string(),
            Node::Constant(constant) => constant.name().to_string(),
            Node::Binary { op, left, right } => format!(
                "({} {} {})",
                left.format(substitute),
                op.glyph(),
                right.format(substitute)
            ),
            Node::Function { function, argument } => function.format(&argument.format(substitute)),
        }
    }

    /// Whether `name` occurs anywhere in the tree.
    pub fn has_variable(&self, name: &str) -> bool {
        match self {
            Node::Number(_) | Node::Constant(_) => false,
            Node::Variable(own) => own == name,
            Node::Binary { left, right, .. } => left.has_variable(name) || right.has_variable(name),
            Node::Function { argument, .. } => argument.has_variable(name),
        }
    }

    /// Distinct variable names in pre-order, first occurrence first.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.into_iter().unique().map(str::to_string).collect()
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Node::Number(_) | Node::Constant(_) => {}
            Node::Variable(name) => names.push(name),
            Node::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Node::Function { argument, .. } => argument.collect_variables(names),
        }
    }

    /// Structural comparison through the canonical form.
    pub fn same_as(&self, other: &Node) -> bool {
        self.format(None) == other.format(None)
    }

    /// `true` for number literals.
    pub fn is_number(&self) -> bool {
        matches!(self, Node::Number(_))
    }

    /// The operator of a binary node.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            Node::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Debug dump with one node per line.
    pub fn tree(&self) -> String {
        let mut lines = Vec::new();
        self.tree_lines("", &mut lines);
        lines.join("\n")
    }

    fn tree_lines(&self, indent: &str, lines: &mut Vec<String>) {
        let deeper = format!("{indent}{INDENT}");
        match self {
            Node::Number(value) => lines.push(format!("{indent}{value}")),
            Node::Variable(name) => lines.push(format!("{indent}VARIABLE({name})")),
            Node::Constant(constant) => lines.push(format!("{indent}{}", constant.rule_name())),
            Node::Binary { op, left, right } => {
                lines.push(format!("{indent}{}", op.rule_name()));
                left.tree_lines(&deeper, lines);
                right.tree_lines(&deeper, lines);
            }
            Node::Function { function, argument } => {
                lines.push(format!("{indent}{}", function.rule_name()));
                argument.tree_lines(&deeper, lines);
            }
        }
    }

    /// LaTeX rendering.
    pub fn to_tex(&self) -> String {
        crate::tex::render(self)
    }

    /// Derivative with respect to `variable`.
    pub fn derive(&self, variable: &str) -> Node {
        crate::diff::differentiate(self, variable)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, f64)]) -> Bindings {
        pairs.iter().map(|(name, value)| (name.to_string(), *value)).collect()
    }

    #[test]
    fn test_evaluate() {
        let node = Node::plus(
            Node::times(Node::number(2.0), Node::variable("x")),
            Node::power(Node::variable("y"), Node::number(2.0)),
        );
        assert_eq!(node.evaluate(&bind(&[("x", 1.0), ("y", 2.0)])), 6.0);
        assert_eq!(Node::pi().evaluate(&Bindings::new()), PI);
        assert_eq!(
            Node::apply(Function::Sin, Node::zero()).evaluate(&Bindings::new()),
            0.0
        );
    }

    #[test]
    fn test_unbound_variable_is_zero() {
        let node = Node::plus(Node::variable("z"), Node::number(3.0));
        assert_eq!(node.evaluate(&Bindings::new()), 3.0);
    }

    #[test]
    fn test_literal_ignores_bindings() {
        let node = Node::number(4.5);
        assert_eq!(node.evaluate(&bind(&[("x", 9.0)])), 4.5);
    }

    #[test]
    fn test_format() {
        let node = Node::divide(
            Node::apply(Function::Sin, Node::plus(Node::variable("t"), Node::one())),
            Node::times(Node::negative_one(), Node::euler()),
        );
        assert_eq!(node.format(None), "(sin((t + 1)) / (-1 * e))");
        assert_eq!(node.format(Some("x")), "(sin((x + 1)) / (-1 * e))");
        assert_eq!(node.to_string(), node.format(None));
        assert_eq!(Node::number(0.25).format(None), "0.25");
        assert_eq!(Node::pi().format(None), "PI");
    }

    #[test]
    fn test_non_finite_literals_parse_back() {
        let huge = format!("1{}", "0".repeat(400));
        let node = crate::parser::parse_str(&huge).unwrap();
        assert_eq!(node, Node::number(f64::INFINITY));
        assert_eq!(node.format(None), "(1 / 0)");

        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            let again = crate::parser::parse_str(&Node::number(value).format(None)).unwrap();
            assert_eq!(again.evaluate(&Bindings::new()), value);
            assert!(again.variables().is_empty());
        }
        let nan = crate::parser::parse_str(&Node::number(f64::NAN).format(None)).unwrap();
        assert!(nan.evaluate(&Bindings::new()).is_nan());
        assert_eq!(
            Node::times(Node::number(f64::NEG_INFINITY), Node::variable("x")).format(None),
            "((-1 / 0) * x)"
        );
    }

    #[test]
    fn test_negate() {
        assert_eq!(Node::negate(Node::number(2.5)), Node::number(-2.5));
        assert_eq!(
            Node::negate(Node::variable("x")),
            Node::times(Node::number(-1.0), Node::variable("x"))
        );
    }

    #[test]
    fn test_variables_are_unique_in_first_seen_order() {
        let node = Node::plus(
            Node::times(Node::variable("y"), Node::variable("x")),
            Node::apply(Function::Cos, Node::variable("y")),
        );
        assert_eq!(node.variables(), vec!["y".to_string(), "x".to_string()]);
        assert!(node.has_variable("x"));
        assert!(!node.has_variable("z"));
        assert!(Node::pi().variables().is_empty());
    }

    #[test]
    fn test_tree() {
        let node = Node::plus(
            Node::variable("x"),
            Node::apply(Function::Sin, Node::pi()),
        );
        assert_eq!(node.tree(), "PLUS\n  VARIABLE(x)\n  SIN\n    PI");
    }

    #[test]
    fn test_same_as() {
        let a = Node::times(Node::number(2.0), Node::variable("x"));
        let b = Node::times(Node::number(2.0), Node::variable("x"));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&Node::variable("x")));
    }
}
