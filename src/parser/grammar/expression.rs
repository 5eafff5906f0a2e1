//! Expression parsers, layered by operator precedence
//!
//! ```text
//! term          := number | identifier | sub_expression
//! sub_expression := "(" whitespace expression ")" whitespace
//! level1        := term   (mul_op term)*
//! level2        := level1 (add_op level1)*
//! level3        := level2 (cmp_op level2)*
//! expression    := level3 | level2       (depending on the dialect)
//! ```

use tracing::debug;

use crate::ast::{BinaryOperator, Expression};

use crate::parser::combinators::{BoxedParser, Forward, between, chain_left, choice};
use crate::parser::primitives::{literal, whitespace};
use crate::parser::state::{ParseError, ParseState, Parser};

use super::literal::{identifier, number};
use super::operator::{add_op, cmp_op, mul_op};

/// Which operators the grammar understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `+ - * /` only.
    Arithmetic,
    /// Arithmetic plus `=` and `<>`, binding loosest.
    #[default]
    Comparison,
}

/// Deepest parenthesized nesting the grammar accepts. Each level recurses
/// through the whole precedence stack, so input beyond this is rejected rather
/// than risking the call stack.
pub const MAX_NESTING_DEPTH: usize = 64;

fn make_binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::binary(operator, left, right)
}

/// sub_expression := "(" whitespace expression ")" whitespace
fn sub_expression(expression: BoxedParser<Expression>) -> BoxedParser<Expression> {
    let group = between(
        literal("(") - whitespace(),
        expression,
        literal(")") - whitespace(),
    );

    BoxedParser::new(move |state: &mut ParseState| {
        if !state.enter_nesting(MAX_NESTING_DEPTH) {
            debug!(position = state.position(), "nesting limit reached");
            return Err(ParseError);
        }
        let result = group.parse(state);
        state.leave_nesting();
        result
    })
}

/// term := number | identifier | sub_expression
fn term(expression: BoxedParser<Expression>) -> BoxedParser<Expression> {
    choice([number(), identifier(), sub_expression(expression)]).label("term")
}

/// The assembled, recursive expression grammar.
///
/// Building the grammar is the expensive part; one instance can parse any
/// number of inputs.
pub struct ExpressionGrammar {
    dialect: Dialect,
    expression: BoxedParser<Expression>,
}

impl ExpressionGrammar {
    pub fn new(dialect: Dialect) -> Self {
        // Parenthesized terms refer back to the whole expression, which does
        // not exist until every layer below it is built.
        let placeholder = Forward::new();

        let level1 = chain_left(term(placeholder.parser()), mul_op(), make_binary);
        let level2 = chain_left(level1, add_op(), make_binary);
        let top = match dialect {
            Dialect::Arithmetic => level2,
            Dialect::Comparison => chain_left(level2, cmp_op(), make_binary),
        };

        let expression = placeholder.define(top.label("expression"));

        Self {
            dialect,
            expression,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The root parser. It stays usable for as long as any clone of it is alive.
    pub fn expression(&self) -> BoxedParser<Expression> {
        self.expression.clone()
    }
}

impl Default for ExpressionGrammar {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}
