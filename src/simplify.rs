//! Simplification of formula trees through an injected port.
//!
//! A [`Simplifier`] receives the canonical text of a tree and answers with text in the
//! same grammar, which is parsed back into a tree. Any closure
//! `Fn(&str) -> Result<String, String>` is a simplifier, so an external algebra service
//! can be plugged in without this crate knowing about it. Two simplifiers ship with the
//! crate: [`Passthrough`] returns its input unchanged and [`Algebraic`] applies
//! [`reduce`], a small set of identity and folding rules.

use log::debug;

use crate::errors::{FormulaError, SimplifierError};
use crate::expr::{BinaryOp, Node};
use crate::parser::parse_str;

/// Rewrites canonical formula text into an equivalent, ideally shorter, text.
pub trait Simplifier {
    fn simplify(&self, canonical: &str) -> Result<String, SimplifierError>;
}

impl<F> Simplifier for F
where
    F: Fn(&str) -> Result<String, String>,
{
    fn simplify(&self, canonical: &str) -> Result<String, SimplifierError> {
        self(canonical).map_err(SimplifierError)
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Simplifier for Passthrough {
    fn simplify(&self, canonical: &str) -> Result<String, SimplifierError> {
        Ok(canonical.to_string())
    }
}

/// Applies [`reduce`] to the parsed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Algebraic;

impl Simplifier for Algebraic {
    fn simplify(&self, canonical: &str) -> Result<String, SimplifierError> {
        let node = parse_str(canonical).map_err(|err| SimplifierError(err.to_string()))?;
        Ok(reduce(&node).format(None))
    }
}

/// Sends `node` through `simplifier` and parses the answer.
///
/// # Errors
/// [`FormulaError::Simplifier`] when the port fails and [`FormulaError::Parse`] when its
/// answer is not in the accepted grammar.
pub fn simplify(node: &Node, simplifier: &dyn Simplifier) -> Result<Node, FormulaError> {
    let canonical = node.format(None);
    let answer = simplifier.simplify(&canonical)?;
    debug!("simplified {canonical} to {answer}");
    Ok(parse_str(&answer)?)
}

fn folded(op: BinaryOp, a: f64, b: f64) -> Option<Node> {
    let value = op.apply(a, b);
    value.is_finite().then_some(Node::number(value))
}

/// Identity rules and constant folding, applied bottom up.
pub fn reduce(node: &Node) -> Node {
    let Node::Binary { op, left, right } = node else {
        return match node {
            Node::Function { function, argument } => Node::apply(*function, reduce(argument)),
            leaf => leaf.clone(),
        };
    };
    let l = reduce(left);
    let r = reduce(right);
    if let (Node::Number(a), Node::Number(b)) = (&l, &r) {
        // Fold constants: 1 + 2 -> 3
        if let Some(value) = folded(*op, *a, *b) {
            return value;
        }
    }
    match (op, &l, &r) {
        // Identity: x + 0 -> x
        (BinaryOp::Plus, expr, Node::Number(0.0)) | (BinaryOp::Plus, Node::Number(0.0), expr) => {
            expr.clone()
        }
        (BinaryOp::Minus, expr, Node::Number(0.0)) => expr.clone(),
        (BinaryOp::Minus, Node::Number(0.0), expr) => negated(expr),
        // Zero: x - x -> 0
        (BinaryOp::Minus, a, b) if a.same_as(b) => Node::zero(),
        (BinaryOp::Times, Node::Number(0.0), _) | (BinaryOp::Times, _, Node::Number(0.0)) => {
            Node::zero()
        }
        (BinaryOp::Times, Node::Number(1.0), expr) | (BinaryOp::Times, expr, Node::Number(1.0)) => {
            expr.clone()
        }
        (BinaryOp::Times, Node::Number(-1.0), expr) | (BinaryOp::Times, expr, Node::Number(-1.0)) => {
            negated(expr)
        }
        (BinaryOp::Divide, Node::Number(0.0), divisor) if !divisor.is_number() => Node::zero(),
        (BinaryOp::Divide, expr, Node::Number(1.0)) => expr.clone(),
        // Exponents: x^0 -> 1, x^1 -> x, 1^x -> 1
        (BinaryOp::Power, _, Node::Number(0.0)) | (BinaryOp::Power, Node::Number(1.0), _) => {
            Node::one()
        }
        (BinaryOp::Power, expr, Node::Number(1.0)) => expr.clone(),
        _ => Node::binary(*op, l, r),
    }
}

/// Negation that cancels an existing `-1 * x`.
fn negated(node: &Node) -> Node {
    match node {
        Node::Binary {
            op: BinaryOp::Times,
            left,
            right,
        } if **left == Node::negative_one() => (**right).clone(),
        other => Node::negate(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduced(source: &str) -> String {
        reduce(&parse_str(source).unwrap()).format(None)
    }

    #[test]
    fn test_reduce_identities() {
        assert_eq!(reduced("x + 0"), "x");
        assert_eq!(reduced("0 - x"), "(-1 * x)");
        assert_eq!(reduced("0 - -x"), "x");
        assert_eq!(reduced("sin(x) - sin(x)"), "0");
        assert_eq!(reduced("1 * x * 1"), "x");
        assert_eq!(reduced("0 * x + 2"), "2");
        assert_eq!(reduced("x^1 + x^0"), "(x + 1)");
        assert_eq!(reduced("0 / x"), "0");
        assert_eq!(reduced("x / 1"), "x");
    }

    #[test]
    fn test_reduce_folds_constants() {
        assert_eq!(reduced("2 + 3 * 4"), "14");
        assert_eq!(reduced("x * (2^3)"), "(x * 8)");
        assert_eq!(reduced("1 / 0"), "(1 / 0)");
    }

    #[test]
    fn test_reduce_derivative() {
        let node = parse_str("x^3").unwrap();
        assert_eq!(reduce(&node.derive("x")).format(None), "(3 * (x ^ 2))");
    }

    #[test]
    fn test_passthrough() {
        let node = parse_str("2x + 1").unwrap();
        assert_eq!(simplify(&node, &Passthrough).unwrap(), node);
    }

    #[test]
    fn test_algebraic_simplifier() {
        let node = parse_str("(x + 0) * 1").unwrap();
        assert_eq!(simplify(&node, &Algebraic).unwrap(), Node::variable("x"));
    }

    #[test]
    fn test_closure_simplifier() {
        let node = parse_str("x + x").unwrap();
        let doubling = |canonical: &str| -> Result<String, String> {
            assert_eq!(canonical, "(x + x)");
            Ok("2x".to_string())
        };
        assert_eq!(simplify(&node, &doubling).unwrap().format(None), "(2 * x)");
    }

    #[test]
    fn test_simplifier_failures_surface() {
        let node = parse_str("x").unwrap();
        let failing = |_: &str| -> Result<String, String> { Err("offline".to_string()) };
        assert!(matches!(
            simplify(&node, &failing),
            Err(FormulaError::Simplifier(SimplifierError(reason))) if reason == "offline"
        ));
        let garbage = |_: &str| -> Result<String, String> { Ok("x +".to_string()) };
        assert!(matches!(
            simplify(&node, &garbage),
            Err(FormulaError::Parse(_))
        ));
    }
}
