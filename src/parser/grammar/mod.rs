//! Grammar for arithmetic expressions
//!
//! This module contains the parsing rules organized by category:
//! - `literal`: numbers and identifiers
//! - `operator`: the operator of each precedence layer
//! - `expression`: the precedence layers and the assembled grammar
//!
//! Every token parser consumes the whitespace that *follows* it. Whitespace in
//! front of the first token is not skipped.

mod expression;
mod literal;
mod operator;

pub use expression::{Dialect, ExpressionGrammar, MAX_NESTING_DEPTH};
pub use literal::{identifier, number};
pub use operator::{add_op, cmp_op, mul_op};

use tracing::debug;

use crate::ast::Expression;

use super::primitives::end_of_stream;
use super::state::{ParseResult, ParseState, Parser};

/// How much of the input a parse has to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consumption {
    /// The expression must extend to the end of the input.
    #[default]
    Complete,
    /// The expression may be followed by unparsed text.
    Prefix,
}

/// Run `grammar` over `input`, returning the tree and the byte offset where
/// parsing stopped.
pub fn parse_with(
    grammar: &ExpressionGrammar,
    input: &str,
    consumption: Consumption,
) -> ParseResult<(Expression, usize)> {
    let mut state = ParseState::new(input);

    let result = grammar.expression().parse(&mut state).and_then(|expression| {
        if consumption == Consumption::Complete {
            end_of_stream().parse(&mut state)?;
        }
        Ok(expression)
    });

    match result {
        Ok(expression) => {
            debug!(consumed = state.position(), len = input.len(), "parsed expression");
            Ok((expression, state.position()))
        }
        Err(err) => {
            debug!(?consumption, stopped_at = state.position(), "no expression");
            Err(err)
        }
    }
}

/// Parse `input` as one complete expression. Trailing text is a failure.
pub fn parse(grammar: &ExpressionGrammar, input: &str) -> ParseResult<Expression> {
    parse_with(grammar, input, Consumption::Complete).map(|(expression, _)| expression)
}

/// Parse an expression at the start of `input` and hand back the unparsed rest.
pub fn parse_prefix<'a>(
    grammar: &ExpressionGrammar,
    input: &'a str,
) -> ParseResult<(Expression, &'a str)> {
    parse_with(grammar, input, Consumption::Prefix)
        .map(|(expression, consumed)| (expression, &input[consumed..]))
}

/// Parse with the default grammar, requiring the whole input to be consumed.
pub fn parse_expression(input: &str) -> ParseResult<Expression> {
    parse(&ExpressionGrammar::default(), input)
}
