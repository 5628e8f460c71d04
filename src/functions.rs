//! The table of unary functions a formula may apply.
//!
//! Every [`Function`] knows its accepted names, how to compute itself, how to print itself
//! in canonical and TeX form, and its outer derivative for the chain rule. The canonical
//! form only uses names the parser accepts, so cotangent and friends are expanded into
//! primitives when printed.

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use crate::expr::Node;

/// A unary function known to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sqrt,
    Ln,
    /// Base 10 logarithm
    Log,
    Sin,
    Sinh,
    ArcSin,
    ArcSinh,
    Cos,
    Cosh,
    ArcCos,
    ArcCosh,
    Tan,
    Tanh,
    ArcTan,
    ArcTanh,
    Cot,
    Coth,
    ArcCot,
}

/// Every spelling the parser accepts, mapped to its function.
const NAMES: &[(&str, Function)] = &[
    ("sqrt", Function::Sqrt),
    ("ln", Function::Ln),
    ("log", Function::Log),
    ("sin", Function::Sin),
    ("sinh", Function::Sinh),
    ("asin", Function::ArcSin),
    ("arcsin", Function::ArcSin),
    ("asinh", Function::ArcSinh),
    ("arcsinh", Function::ArcSinh),
    ("cos", Function::Cos),
    ("cosin", Function::Cos),
    ("cosh", Function::Cosh),
    ("cosinh", Function::Cosh),
    ("acos", Function::ArcCos),
    ("acosin", Function::ArcCos),
    ("arccos", Function::ArcCos),
    ("arccosin", Function::ArcCos),
    ("acosh", Function::ArcCosh),
    ("arccosh", Function::ArcCosh),
    ("tan", Function::Tan),
    ("tg", Function::Tan),
    ("tanh", Function::Tanh),
    ("tgh", Function::Tanh),
    ("atan", Function::ArcTan),
    ("atg", Function::ArcTan),
    ("arctan", Function::ArcTan),
    ("arctg", Function::ArcTan),
    ("atanh", Function::ArcTanh),
    ("atgh", Function::ArcTanh),
    ("arctanh", Function::ArcTanh),
    ("arctgh", Function::ArcTanh),
    ("cot", Function::Cot),
    ("cotan", Function::Cot),
    ("cotg", Function::Cot),
    ("coth", Function::Coth),
    ("cotanh", Function::Coth),
    ("cotgh", Function::Coth),
    ("acot", Function::ArcCot),
    ("acotan", Function::ArcCot),
    ("acotg", Function::ArcCot),
    ("arccot", Function::ArcCot),
    ("arccotan", Function::ArcCot),
    ("arccotg", Function::ArcCot),
];

impl Function {
    pub const ALL: [Function; 18] = [
        Function::Sqrt,
        Function::Ln,
        Function::Log,
        Function::Sin,
        Function::Sinh,
        Function::ArcSin,
        Function::ArcSinh,
        Function::Cos,
        Function::Cosh,
        Function::ArcCos,
        Function::ArcCosh,
        Function::Tan,
        Function::Tanh,
        Function::ArcTan,
        Function::ArcTanh,
        Function::Cot,
        Function::Coth,
        Function::ArcCot,
    ];

    /// Looks a name or alias up. Matching is exact and case sensitive.
    pub fn from_name(name: &str) -> Option<Function> {
        NAMES
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, function)| *function)
    }

    /// All accepted spellings of this function.
    pub fn aliases(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .iter()
            .filter(move |(_, function)| *function == self)
            .map(|(name, _)| *name)
    }

    /// Applies the numeric rule.
    pub fn apply(self, u: f64) -> f64 {
        match self {
            Function::Sqrt => u.sqrt(),
            Function::Ln => u.ln(),
            Function::Log => u.log10(),
            Function::Sin => u.sin(),
            Function::Sinh => u.sinh(),
            Function::ArcSin => u.asin(),
            Function::ArcSinh => u.asinh(),
            Function::Cos => u.cos(),
            Function::Cosh => u.cosh(),
            Function::ArcCos => u.acos(),
            Function::ArcCosh => u.acosh(),
            Function::Tan => u.tan(),
            Function::Tanh => u.tanh(),
            Function::ArcTan => u.atan(),
            Function::ArcTanh => u.atanh(),
            Function::Cot => 1.0 / u.tan(),
            Function::Coth => 1.0 / u.tanh(),
            Function::ArcCot => FRAC_PI_2 - u.atan(),
        }
    }

    /// Canonical text for an application to an already formatted argument.
    ///
    /// Cotangent, hyperbolic cotangent and inverse cotangent are written out in
    /// primitives so the result parses again.
    pub fn format(self, u: &str) -> String {
        match self {
            Function::Cot => format!("(1 / tan({u}))"),
            Function::Coth => format!("((e^(2 * {u}) + 1) / (e^(2 * {u}) - 1))"),
            Function::ArcCot => format!("((PI / 2) - atan({u}))"),
            _ => format!("{}({u})", self.canonical_name()),
        }
    }

    /// The shortest accepted name, used when printing.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Sin => "sin",
            Function::Sinh => "sinh",
            Function::ArcSin => "asin",
            Function::ArcSinh => "asinh",
            Function::Cos => "cos",
            Function::Cosh => "cosh",
            Function::ArcCos => "acos",
            Function::ArcCosh => "acosh",
            Function::Tan => "tan",
            Function::Tanh => "tanh",
            Function::ArcTan => "atan",
            Function::ArcTanh => "atanh",
            Function::Cot => "cot",
            Function::Coth => "coth",
            Function::ArcCot => "acot",
        }
    }

    /// Rule name used by tree dumps.
    pub fn rule_name(self) -> &'static str {
        match self {
            Function::Sqrt => "SQRT",
            Function::Ln => "LN",
            Function::Log => "LOG",
            Function::Sin => "SIN",
            Function::Sinh => "SINH",
            Function::ArcSin => "ARCSIN",
            Function::ArcSinh => "ARCSINH",
            Function::Cos => "COS",
            Function::Cosh => "COSH",
            Function::ArcCos => "ARCCOS",
            Function::ArcCosh => "ARCCOSH",
            Function::Tan => "TAN",
            Function::Tanh => "TANH",
            Function::ArcTan => "ARCTAN",
            Function::ArcTanh => "ARCTANH",
            Function::Cot => "COTAN",
            Function::Coth => "COTANH",
            Function::ArcCot => "ARCCOTAN",
        }
    }

    /// LaTeX command placed in front of the argument.
    pub fn tex(self) -> &'static str {
        match self {
            Function::Sqrt => "\\sqrt",
            Function::Ln => "\\ln",
            Function::Log => "\\log",
            Function::Sin => "\\sin",
            Function::Sinh => "\\sinh",
            Function::ArcSin => "\\arcsin",
            Function::ArcSinh => "\\text{arsinh}",
            Function::Cos => "\\cos",
            Function::Cosh => "\\cosh",
            Function::ArcCos => "\\arccos",
            Function::ArcCosh => "\\text{arcosh}",
            Function::Tan => "\\tan",
            Function::Tanh => "\\tanh",
            Function::ArcTan => "\\arctan",
            Function::ArcTanh => "\\text{artanh}",
            Function::Cot => "\\cot",
            Function::Coth => "\\coth",
            Function::ArcCot => "\\text{arccot}",
        }
    }

    /// `f'(u)`, built on the undifferentiated argument `u`.
    pub fn outer_derivative(self, u: &Node) -> Node {
        let u = u.clone();
        let squared = || Node::power(u.clone(), Node::number(2.0));
        match self {
            // 1 / (2 * sqrt(u))
            Function::Sqrt => Node::divide(
                Node::one(),
                Node::times(Node::number(2.0), Node::apply(Function::Sqrt, u)),
            ),
            Function::Ln => Node::divide(Node::one(), u),
            // 1 / (u * ln(10))
            Function::Log => Node::divide(
                Node::one(),
                Node::times(u, Node::apply(Function::Ln, Node::number(10.0))),
            ),
            Function::Sin => Node::apply(Function::Cos, u),
            Function::Sinh => Node::apply(Function::Cosh, u),
            // 1 / (1 - u^2)^(1/2)
            Function::ArcSin => Node::divide(
                Node::one(),
                Node::power(Node::minus(Node::one(), squared()), Node::half()),
            ),
            Function::ArcSinh => Node::divide(
                Node::one(),
                Node::apply(Function::Sqrt, Node::plus(squared(), Node::one())),
            ),
            Function::Cos => Node::negate(Node::apply(Function::Sin, u)),
            Function::Cosh => Node::apply(Function::Sinh, u),
            Function::ArcCos => Node::divide(
                Node::negative_one(),
                Node::power(Node::minus(Node::one(), squared()), Node::half()),
            ),
            Function::ArcCosh => Node::divide(
                Node::one(),
                Node::apply(Function::Sqrt, Node::minus(squared(), Node::one())),
            ),
            // 1 / cos(u)^2
            Function::Tan => Node::divide(
                Node::one(),
                Node::power(Node::apply(Function::Cos, u), Node::number(2.0)),
            ),
            Function::Tanh => Node::minus(
                Node::one(),
                Node::power(Node::apply(Function::Tanh, u), Node::number(2.0)),
            ),
            Function::ArcTan => Node::divide(Node::one(), Node::plus(Node::one(), squared())),
            Function::ArcTanh => Node::divide(Node::one(), Node::minus(Node::one(), squared())),
            // -1 / sin(u)^2
            Function::Cot => Node::divide(
                Node::negative_one(),
                Node::power(Node::apply(Function::Sin, u), Node::number(2.0)),
            ),
            Function::Coth => Node::minus(
                Node::one(),
                Node::power(Node::apply(Function::Coth, u), Node::number(2.0)),
            ),
            Function::ArcCot => {
                Node::divide(Node::negative_one(), Node::plus(Node::one(), squared()))
            }
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bindings;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(Function::from_name("tg"), Some(Function::Tan));
        assert_eq!(Function::from_name("arccotg"), Some(Function::ArcCot));
        assert_eq!(Function::from_name("cosinh"), Some(Function::Cosh));
        assert_eq!(Function::from_name("Sin"), None);
        assert_eq!(Function::from_name("sinx"), None);
        for function in Function::ALL {
            assert!(function.aliases().count() >= 1);
            assert_eq!(Function::from_name(function.canonical_name()), Some(function));
        }
    }

    #[test]
    fn test_apply() {
        assert_eq!(Function::Sqrt.apply(9.0), 3.0);
        assert_eq!(Function::Log.apply(1000.0), 3.0);
        assert!((Function::Cot.apply(1.0) - 1.0 / 1f64.tan()).abs() < 1e-12);
        assert!((Function::ArcCot.apply(1.0) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        let coth = (2f64.exp() + 1.0) / (2f64.exp() - 1.0);
        assert!((Function::Coth.apply(1.0) - coth).abs() < 1e-12);
    }

    #[test]
    fn test_format_expands_cotangents() {
        assert_eq!(Function::Cot.format("x"), "(1 / tan(x))");
        assert_eq!(Function::ArcCot.format("x"), "((PI / 2) - atan(x))");
        assert_eq!(Function::Coth.format("x"), "((e^(2 * x) + 1) / (e^(2 * x) - 1))");
        assert_eq!(Function::ArcTan.format("(x + 1)"), "atan((x + 1))");
    }

    #[test]
    fn test_outer_derivatives_match_finite_differences() {
        let h = 1e-6;
        for function in Function::ALL {
            let x0 = match function {
                Function::ArcCosh => 1.5,
                _ => 0.4,
            };
            let expected = (function.apply(x0 + h) - function.apply(x0 - h)) / (2.0 * h);
            let mut bindings = Bindings::new();
            bindings.insert("x".to_string(), x0);
            let actual = function
                .outer_derivative(&Node::variable("x"))
                .evaluate(&bindings);
            assert!(
                (actual - expected).abs() < 1e-4,
                "{function}: {actual} vs {expected}"
            );
        }
    }
}
