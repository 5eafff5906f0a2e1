//! Literal parsers for the expression grammar

use crate::ast::Expression;

use crate::parser::combinators::{BoxedParser, attempt};
use crate::parser::primitives::{digits, letters, whitespace};
use crate::parser::state::{ParseError, ParseState, Parser};

/// number := digits{1,} whitespace
///
/// Digit runs too large for a finite `f64` are rejected.
pub fn number() -> BoxedParser<Expression> {
    let digits = digits();
    let whitespace = whitespace();

    BoxedParser::new(move |state: &mut ParseState| {
        attempt(state, |state| {
            let text = digits.parse(state)?;
            let value: f64 = text.parse().map_err(|_| ParseError)?;
            // too many digits for an f64; `inf` would print as an identifier
            if !value.is_finite() {
                return Err(ParseError);
            }
            whitespace.parse(state)?;
            Ok(Expression::number(value))
        })
    })
}

/// identifier := letters{1,} whitespace
pub fn identifier() -> BoxedParser<Expression> {
    (letters() - whitespace()) >> |name: String| Expression::identifier(name)
}
