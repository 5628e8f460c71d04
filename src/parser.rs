//! Recursive-descent parser from [`Tokens`] to a [`Node`] tree.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! Expression -> Term { (+ | -) Term }
//! Term       -> Power { (* | / | implicit) Power }
//! Power      -> Factor [ ^ Power ]
//! Factor     -> TEXT | - Factor | open Expression close | NUMBER
//! ```
//!
//! Sums and products are left associative and share one table driven loop. Powers are
//! right associative, so `a^b^c` is `a^(b^c)`. A number, text or opening bracket right
//! after a complete power multiplies implicitly: `2x`, `x(x+1)` and `2 sin x` all parse.
//!
//! Every power and factor counts one level of nesting. Input nesting deeper than
//! [`MAX_DEPTH`] levels is rejected instead of exhausting the stack.

use log::{debug, trace};

use crate::errors::ParseError;
use crate::expr::{BinaryOp, Constant, Node};
use crate::functions::Function;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind, Tokens};

/// One row of an associative level: the token that triggers the operator, the operator
/// itself and whether the token is consumed. Implicit multiplication leaves its token
/// in place for the right operand.
type Associative = (TokenKind, BinaryOp, bool);

const EXPRESSIONS: &[Associative] = &[
    (TokenKind::Plus, BinaryOp::Plus, true),
    (TokenKind::Minus, BinaryOp::Minus, true),
];

const TERMS: &[Associative] = &[
    (TokenKind::Times, BinaryOp::Times, true),
    (TokenKind::Number, BinaryOp::Times, false),
    (TokenKind::Text, BinaryOp::Times, false),
    (TokenKind::OpenBracket, BinaryOp::Times, false),
    (TokenKind::Obelus, BinaryOp::Divide, true),
];

/// Most powers and factors that may be open at once.
pub const MAX_DEPTH: usize = 512;

/// Parser state for one invocation.
pub struct Parser {
    tokens: Tokens,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Tokens) -> Self {
        Self { tokens, depth: 0 }
    }

    /// Parses one expression and requires the input to end right after it.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let node = self.expression()?;
        self.expect(TokenKind::Eof)?;
        debug!("parsed {node}");
        Ok(node)
    }

    fn expect(&self, expected: TokenKind) -> Result<(), ParseError> {
        let found = self.tokens.peek();
        if found.kind != expected {
            return Err(ParseError::Syntax {
                found: found.kind,
                expected,
                position: found.position,
            });
        }
        Ok(())
    }

    /// Folds operands of one left associative level.
    fn associative(
        &mut self,
        table: &[Associative],
        next: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        let mut left = next(self)?;
        loop {
            let kind = self.tokens.peek().kind;
            let Some(&(_, op, consumes)) = table.iter().find(|(trigger, _, _)| *trigger == kind)
            else {
                return Ok(left);
            };
            if consumes {
                self.tokens.next();
            }
            trace!("{} with {kind}", op.rule_name());
            let right = next(self)?;
            left = Node::binary(op, left, right);
        }
    }

    /// Runs one recursive rule one level deeper.
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Node, ParseError>,
    ) -> Result<Node, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                position: self.tokens.peek().position,
            });
        }
        self.depth += 1;
        let node = rule(self);
        self.depth -= 1;
        node
    }

    fn expression(&mut self) -> Result<Node, ParseError> {
        self.associative(EXPRESSIONS, Self::term)
    }

    fn term(&mut self) -> Result<Node, ParseError> {
        self.associative(TERMS, Self::power)
    }

    fn power(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::power_rule)
    }

    fn power_rule(&mut self) -> Result<Node, ParseError> {
        let base = self.factor()?;
        if self.tokens.peek().kind != TokenKind::Power {
            return Ok(base);
        }
        self.tokens.next();
        let exponent = self.power()?;
        Ok(Node::power(base, exponent))
    }

    fn factor(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::factor_rule)
    }

    fn factor_rule(&mut self) -> Result<Node, ParseError> {
        match self.tokens.peek().kind {
            TokenKind::Text => {
                let token = self.tokens.next();
                self.text(token)
            }
            TokenKind::Minus => {
                self.tokens.next();
                Ok(Node::negate(self.factor()?))
            }
            TokenKind::OpenBracket => {
                let opening = self.tokens.next();
                let inside = self.expression()?;
                self.expect(TokenKind::CloseBracket)?;
                let closing = self.tokens.next();
                if opening.bracket_family() != closing.bracket_family() {
                    return Err(ParseError::BracketMismatch {
                        opening: opening.bracket_glyph().unwrap_or('?'),
                        closing: closing.bracket_glyph().unwrap_or('?'),
                        position: closing.position,
                    });
                }
                Ok(inside)
            }
            _ => {
                self.expect(TokenKind::Number)?;
                let token = self.tokens.next();
                Ok(Node::number(token.as_number().unwrap_or_default()))
            }
        }
    }

    /// Resolves a letter run: constant, function, function glued to a constant or to a
    /// one-letter argument, or variable, in that order.
    fn text(&mut self, token: Token) -> Result<Node, ParseError> {
        let text = token.as_text().unwrap_or_default();
        if let Some(constant) = Constant::from_name(text) {
            return Ok(Node::Constant(constant));
        }
        if let Some(function) = Function::from_name(text) {
            let argument = self.factor()?;
            return Ok(Node::apply(function, argument));
        }
        for (name, constant) in Constant::NAMES {
            let prefix = text.strip_suffix(name);
            if let Some(function) = prefix.and_then(Function::from_name) {
                return Ok(Node::apply(function, Node::Constant(constant)));
            }
        }
        let mut chars = text.chars();
        if let Some(last) = chars.next_back() {
            if let Some(function) = Function::from_name(chars.as_str()) {
                trace!("splitting {text} into {function} applied to {last}");
                let position = token.position + chars.as_str().chars().count();
                self.tokens.prepend([Token::text(position, last.to_string())]);
                let argument = self.factor()?;
                return Ok(Node::apply(function, argument));
            }
        }
        Ok(Node::variable(text))
    }
}

/// Parses a token stream into a tree.
///
/// # Errors
/// [`ParseError::Syntax`] when a token does not fit the grammar,
/// [`ParseError::BracketMismatch`] when brackets of different families pair up and
/// [`ParseError::TooDeep`] when the input nests past [`MAX_DEPTH`].
pub fn parse(tokens: Tokens) -> Result<Node, ParseError> {
    Parser::new(tokens).parse()
}

/// Tokenizes and parses `source` in one step.
pub fn parse_str(source: &str) -> Result<Node, ParseError> {
    parse(tokenize(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bindings;

    fn eval(source: &str, pairs: &[(&str, f64)]) -> f64 {
        let bindings: Bindings = pairs.iter().map(|(n, v)| (n.to_string(), *v)).collect();
        parse_str(source).unwrap().evaluate(&bindings)
    }

    fn canonical(source: &str) -> String {
        parse_str(source).unwrap().format(None)
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(canonical("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(canonical("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(canonical("8 / 4 / 2"), "((8 / 4) / 2)");
        assert_eq!(canonical("x^y^2"), "(x ^ (y ^ 2))");
        assert_eq!(eval("x^y^2", &[("x", 2.0), ("y", 2.0)]), 16.0);
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(canonical("2x"), canonical("2*x"));
        assert_eq!(canonical("x(x+1)"), "(x * (x + 1))");
        assert_eq!(canonical("2 sin(x)"), "(2 * sin(x))");
        assert_eq!(canonical("2x/3"), "((2 * x) / 3)");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(parse_str("-3").unwrap(), Node::number(-3.0));
        assert_eq!(parse_str("--3").unwrap(), Node::number(3.0));
        assert_eq!(canonical("-x"), "(-1 * x)");
        assert_eq!(canonical("2 - -x"), "(2 - (-1 * x))");
        assert_eq!(canonical("-x^2"), "((-1 * x) ^ 2)");
    }

    #[test]
    fn test_text_disambiguation() {
        assert_eq!(parse_str("e").unwrap(), Node::euler());
        assert_eq!(parse_str("PI").unwrap(), Node::pi());
        assert_eq!(canonical("sinx"), "sin(x)");
        assert_eq!(canonical("cosPI"), "cos(PI)");
        assert_eq!(canonical("tge"), "tan(e)");
        assert_eq!(canonical("coseuler"), "cos(e)");
        assert_eq!(canonical("sinpi + 1"), "(sin(PI) + 1)");
        assert_eq!(canonical("sin(x+1)"), "sin((x + 1))");
        assert_eq!(canonical("sqrt 4"), "sqrt(4)");
        assert_eq!(canonical("speed"), "speed");
        assert_eq!(eval("sinx", &[("x", 0.0)]), 0.0);
        assert_eq!(eval("sin(x+1)", &[("x", -1.0)]), 0.0);
    }

    #[test]
    fn test_concatenated_functions_stay_one_variable() {
        assert_eq!(parse_str("sincos").unwrap(), Node::variable("sincos"));
        assert_eq!(canonical("sin cos x"), "sin(cos(x))");
    }

    #[test]
    fn test_power_binds_to_the_application() {
        assert_eq!(canonical("sinx^2"), "(sin(x) ^ 2)");
        assert_eq!(canonical("sin x^2"), "(sin(x) ^ 2)");
        assert_eq!(canonical("sin(x^2)"), "sin((x ^ 2))");
    }

    #[test]
    fn test_brackets() {
        assert_eq!(canonical("[x + 1] * {2} * <3>"), "(((x + 1) * 2) * 3)");
        assert_eq!(
            parse_str("(2+3]"),
            Err(ParseError::BracketMismatch {
                opening: '(',
                closing: ']',
                position: 4
            })
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse_str("(2+3))"),
            Err(ParseError::Syntax {
                found: TokenKind::CloseBracket,
                expected: TokenKind::Eof,
                position: 5
            })
        ));
        assert!(matches!(
            parse_str("(2+3"),
            Err(ParseError::Syntax {
                expected: TokenKind::CloseBracket,
                ..
            })
        ));
        assert!(matches!(
            parse_str("2 +"),
            Err(ParseError::Syntax {
                found: TokenKind::Eof,
                expected: TokenKind::Number,
                ..
            })
        ));
        assert!(matches!(parse_str(""), Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(canonical(&nested(100)), "x");
        assert!(matches!(
            parse_str(&nested(1000)),
            Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                ..
            })
        ));
        let signs = format!("{}1", "-".repeat(5000));
        assert!(matches!(
            parse_str(&signs),
            Err(ParseError::TooDeep { .. })
        ));
        let powers = vec!["2"; 5000].join("^");
        assert!(matches!(
            parse_str(&powers),
            Err(ParseError::TooDeep { .. })
        ));
        assert_eq!(parse_str(&format!("{}1", "-".repeat(100))).unwrap(), Node::number(1.0));
    }

    #[test]
    fn test_lexing_errors_pass_through() {
        assert!(matches!(parse_str("3.5.2"), Err(ParseError::Lexing(_))));
    }

    #[test]
    fn test_literal_round_trip() {
        for value in [0.0, 1.0, 2.5, 1234.5678, -7.0, 0.001] {
            let node = Node::number(value);
            assert_eq!(parse_str(&node.format(None)).unwrap(), node);
        }
    }

    #[test]
    fn test_canonical_form_parses_back() {
        for source in ["cotx + 1", "coth(2x)", "arccot(x) / x", "sqrt(x)^3", "-x^2 + 2^-x"] {
            let node = parse_str(source).unwrap();
            let again = parse_str(&node.format(None)).unwrap();
            for x in [0.3, 0.7, 1.9] {
                let mut bindings = Bindings::new();
                bindings.insert("x".to_string(), x);
                let (a, b) = (node.evaluate(&bindings), again.evaluate(&bindings));
                assert!((a - b).abs() < 1e-9, "{source}: {a} vs {b}");
            }
        }
    }
}
