//! Character classification used by the tokenizer.
//!
//! All predicates are pure functions over a single `char`. Only ASCII digits and
//! letters start numbers and identifiers; everything else is either a recognised
//! operator / bracket glyph, whitespace, or a lexing error.

use crate::token::BracketFamily;

/// ASCII `0`-`9`.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// ASCII `a`-`z` and `A`-`Z`. Digits and underscores never continue an identifier.
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Anything that trims to nothing.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Both `.` and `,` are accepted as the decimal separator of a number literal.
pub fn is_decimal_separator(c: char) -> bool {
    matches!(c, '.' | ',')
}

/// The five single-character arithmetic operators.
pub fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^')
}

/// Returns the family of a bracket glyph, opening or closing.
pub fn bracket_family(c: char) -> Option<BracketFamily> {
    match c {
        '(' | ')' => Some(BracketFamily::Round),
        '{' | '}' => Some(BracketFamily::Curly),
        '[' | ']' => Some(BracketFamily::Square),
        '<' | '>' => Some(BracketFamily::Angle),
        _ => None,
    }
}

/// `true` for the four opening glyphs `( { [ <`.
pub fn is_opening_bracket(c: char) -> bool {
    matches!(c, '(' | '{' | '[' | '<')
}

/// `true` for the four closing glyphs `) } ] >`.
pub fn is_closing_bracket(c: char) -> bool {
    matches!(c, ')' | '}' | ']' | '>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_and_letters() {
        assert!(is_digit('0'));
        assert!(is_digit('9'));
        assert!(!is_digit('a'));
        assert!(is_letter('a'));
        assert!(is_letter('Z'));
        assert!(!is_letter('_'));
        assert!(!is_letter('7'));
        assert!(!is_letter('π'));
    }

    #[test]
    fn test_whitespace_and_operators() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(!is_whitespace('x'));
        for c in ['+', '-', '*', '/', '^'] {
            assert!(is_operator(c));
        }
        assert!(!is_operator('%'));
        assert!(is_decimal_separator(','));
        assert!(is_decimal_separator('.'));
    }

    #[test]
    fn test_bracket_families() {
        assert_eq!(bracket_family('('), bracket_family(')'));
        assert_eq!(bracket_family('<'), Some(BracketFamily::Angle));
        assert_ne!(bracket_family('('), bracket_family(']'));
        assert_eq!(bracket_family('x'), None);
        assert!(is_opening_bracket('{'));
        assert!(is_closing_bracket('>'));
        assert!(!is_opening_bracket(')'));
    }
}
