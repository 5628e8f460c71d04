//! Derivatives the way a plotting front end asks for them.
//!
//! These helpers pick the differentiation variable on their own and run the result
//! through a [`Simplifier`] so it can be shown to a user.

use crate::diff::differentiate;
use crate::errors::FormulaError;
use crate::expr::Node;
use crate::simplify::{simplify, Simplifier};

/// The variable a single-variable formula is about: the first one mentioned.
pub fn smart_variable(node: &Node) -> Option<String> {
    node.variables().into_iter().next()
}

/// Differentiates by `variable` and simplifies the result.
pub fn derive_and_simplify(
    node: &Node,
    variable: &str,
    simplifier: &dyn Simplifier,
) -> Result<Node, FormulaError> {
    simplify(&differentiate(node, variable), simplifier)
}

/// Differentiates by the first variable of `node`. A formula without variables has
/// derivative `0`.
pub fn derive_smart(node: &Node, simplifier: &dyn Simplifier) -> Result<Node, FormulaError> {
    match smart_variable(node) {
        Some(variable) => derive_and_simplify(node, &variable, simplifier),
        None => simplify(&Node::zero(), simplifier),
    }
}

/// `dy/dx` of the curve `F(x, y) = 0`, that is `-(dF/dx) / (dF/dy)`.
pub fn derive_implicit(node: &Node, simplifier: &dyn Simplifier) -> Result<Node, FormulaError> {
    let by_x = derive_and_simplify(node, "x", simplifier)?;
    let by_y = derive_and_simplify(node, "y", simplifier)?;
    Ok(Node::negate(Node::divide(by_x, by_y)))
}

/// Canonical text with every variable printed as `x`.
pub fn format_smart(node: &Node) -> String {
    node.format(Some("x"))
}
