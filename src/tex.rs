//! LaTeX rendering of formula trees.
//!
//! Grouping is kept to what the typeset result needs: fractions and exponents already
//! group visually, so only operands that would otherwise read differently get
//! `\left(` `\right)`.

use crate::expr::{BinaryOp, Node};

fn bracketed(tex: String) -> String {
    format!("\\left({tex}\\right)")
}

fn is_additive(node: &Node) -> bool {
    node.binary_op().is_some_and(BinaryOp::is_additive)
}

fn is_application(node: &Node) -> bool {
    matches!(node, Node::Function { .. })
}

fn group_if(node: &Node, condition: bool) -> String {
    let tex = render(node);
    if condition {
        bracketed(tex)
    } else {
        tex
    }
}

/// Renders `node` as LaTeX.
///
/// Sums are never grouped, the right side of a difference is grouped when it is a sum
/// or difference, and a product groups a sum, difference or function application on the
/// left and a sum or difference on the right. A power groups an additive exponent, and
/// its base whenever the base is any binary node or a function application, not only
/// when it is itself a power, so that `(x + 1)^2` and `sin(x)^2` keep their meaning.
/// Infinite and NaN literals render as `\infty`, `-\infty` and `\mathrm{NaN}`.
pub fn render(node: &Node) -> String {
    match node {
        Node::Number(value) if value.is_nan() => "\\mathrm{NaN}".to_string(),
        Node::Number(value) if value.is_infinite() => {
            let sign = if *value < 0.0 { "-" } else { "" };
            format!("{sign}\\infty")
        }
        Node::Number(value) => format!("{value}"),
        Node::Variable(name) => name.clone(),
        Node::Constant(constant) => constant.tex().to_string(),
        Node::Binary { op, left, right } => match op {
            BinaryOp::Plus => format!("{} + {}", render(left), render(right)),
            BinaryOp::Minus => format!(
                "{} - {}",
                render(left),
                group_if(right, is_additive(right))
            ),
            BinaryOp::Times => format!(
                "{{{}}} \\cdot {{{}}}",
                group_if(left, is_additive(left) || is_application(left)),
                group_if(right, is_additive(right))
            ),
            BinaryOp::Divide => format!("\\frac{{{}}}{{{}}}", render(left), render(right)),
            BinaryOp::Power => format!(
                "{{{}}}^{{{}}}",
                group_if(left, left.binary_op().is_some() || is_application(left)),
                group_if(right, is_additive(right))
            ),
        },
        Node::Function { function, argument } => {
            let grouped = argument.binary_op().is_some() || is_application(argument);
            format!("{}{{{}}}", function.tex(), group_if(argument, grouped))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn tex(source: &str) -> String {
        parse_str(source).unwrap().to_tex()
    }

    #[test]
    fn test_sums_are_never_grouped() {
        assert_eq!(tex("x + (y + 1)"), "x + y + 1");
        assert_eq!(tex("x - y + 1"), "x - y + 1");
    }

    #[test]
    fn test_difference_groups_additive_right() {
        assert_eq!(tex("x - (y + 1)"), "x - \\left(y + 1\\right)");
        assert_eq!(tex("x - 2y"), "x - {2} \\cdot {y}");
    }

    #[test]
    fn test_product_grouping() {
        assert_eq!(tex("2x"), "{2} \\cdot {x}");
        assert_eq!(
            tex("(x + 1)(x - 1)"),
            "{\\left(x + 1\\right)} \\cdot {\\left(x - 1\\right)}"
        );
        assert_eq!(
            tex("sin(x) * 2"),
            "{\\left(\\sin{x}\\right)} \\cdot {2}"
        );
    }

    #[test]
    fn test_fraction() {
        assert_eq!(tex("(x + 1) / 2"), "\\frac{x + 1}{2}");
    }

    #[test]
    fn test_power_grouping() {
        assert_eq!(tex("x^2"), "{x}^{2}");
        assert_eq!(tex("(x^2)^3"), "{\\left({x}^{2}\\right)}^{3}");
        assert_eq!(tex("(x + 1)^2"), "{\\left(x + 1\\right)}^{2}");
        assert_eq!(tex("2^(x - 1)"), "{2}^{\\left(x - 1\\right)}");
        assert_eq!(tex("sin(x)^2"), "{\\left(\\sin{x}\\right)}^{2}");
    }

    #[test]
    fn test_non_finite_literals() {
        assert_eq!(render(&Node::number(f64::INFINITY)), "\\infty");
        assert_eq!(
            render(&Node::times(Node::number(f64::NEG_INFINITY), Node::variable("x"))),
            "{-\\infty} \\cdot {x}"
        );
        assert_eq!(render(&Node::number(f64::NAN)), "\\mathrm{NaN}");
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(tex("sin x"), "\\sin{x}");
        assert_eq!(tex("cos(2x)"), "\\cos{\\left({2} \\cdot {x}\\right)}");
        assert_eq!(tex("ln(sqrt x)"), "\\ln{\\left(\\sqrt{x}\\right)}");
        assert_eq!(tex("pi e"), "{\\pi} \\cdot {e}");
        assert_eq!(tex("arccot x"), "\\text{arccot}{x}");
    }
}
