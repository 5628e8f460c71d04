//! Symbolic differentiation.
//!
//! Subtrees that do not mention the variable differentiate to `0` without being visited,
//! which keeps product and quotient rules from blowing up on constant factors. The
//! results are not simplified; see [`crate::simplify`] for that.

use crate::expr::{BinaryOp, Constant, Node};
use crate::functions::Function;

/// Derivative of `node` with respect to `variable`.
pub fn differentiate(node: &Node, variable: &str) -> Node {
    if !node.has_variable(variable) {
        return Node::zero();
    }
    match node {
        Node::Number(_) | Node::Constant(_) => Node::zero(),
        // Only reached for the variable itself.
        Node::Variable(_) => Node::one(),
        Node::Binary { op, left, right } => binary(*op, left, right, variable),
        Node::Function { function, argument } => {
            // d/dx f(u) = f'(u) * du/dx
            Node::times(
                function.outer_derivative(argument),
                differentiate(argument, variable),
            )
        }
    }
}

fn binary(op: BinaryOp, a: &Node, b: &Node, variable: &str) -> Node {
    let a_depends = a.has_variable(variable);
    let b_depends = b.has_variable(variable);
    let d = |node: &Node| differentiate(node, variable);
    match op {
        BinaryOp::Plus => {
            if !b_depends {
                d(a)
            } else if !a_depends {
                d(b)
            } else {
                Node::plus(d(a), d(b))
            }
        }
        BinaryOp::Minus => {
            if !b_depends {
                d(a)
            } else if !a_depends {
                Node::negate(d(b))
            } else {
                Node::minus(d(a), d(b))
            }
        }
        BinaryOp::Times => {
            if !b_depends {
                Node::times(b.clone(), d(a))
            } else if !a_depends {
                Node::times(a.clone(), d(b))
            } else {
                // d/dx(a * b) = a' * b + a * b'
                Node::plus(
                    Node::times(d(a), b.clone()),
                    Node::times(a.clone(), d(b)),
                )
            }
        }
        BinaryOp::Divide => {
            if !b_depends {
                Node::divide(d(a), b.clone())
            } else if !a_depends {
                // d/dx(a / b) = a * d/dx(b^-1)
                Node::times(
                    a.clone(),
                    d(&Node::power(b.clone(), Node::negative_one())),
                )
            } else {
                // d/dx(a / b) = (a' * b - a * b') / b^2
                Node::divide(
                    Node::minus(
                        Node::times(d(a), b.clone()),
                        Node::times(a.clone(), d(b)),
                    ),
                    Node::power(b.clone(), Node::number(2.0)),
                )
            }
        }
        BinaryOp::Power => power(a, b, a_depends, b_depends, variable),
    }
}

fn power(a: &Node, b: &Node, a_depends: bool, b_depends: bool, variable: &str) -> Node {
    if *b == Node::one() {
        return differentiate(a, variable);
    }
    if !b_depends {
        // d/dx(a^n) = n * a^(n-1) * a'
        let lowered = match b {
            Node::Number(n) => Node::number(n - 1.0),
            _ => Node::minus(b.clone(), Node::one()),
        };
        return Node::times(
            Node::times(b.clone(), Node::power(a.clone(), lowered)),
            differentiate(a, variable),
        );
    }
    if !a_depends {
        if let Node::Constant(Constant::Euler) = a {
            // d/dx(e^u) = e^u * u'
            return Node::times(Node::power(a.clone(), b.clone()), differentiate(b, variable));
        }
        // d/dx(c^u) = c^u * ln(c) * u'
        return Node::times(
            Node::times(
                Node::power(a.clone(), b.clone()),
                Node::apply(Function::Ln, a.clone()),
            ),
            differentiate(b, variable),
        );
    }
    // a^b = e^(b * ln(a))
    let rewritten = Node::power(
        Node::euler(),
        Node::times(b.clone(), Node::apply(Function::Ln, a.clone())),
    );
    differentiate(&rewritten, variable)
}
