//! Fully parenthesized printer for expression trees
//!
//! Every binary node is wrapped in parentheses, so the output never depends
//! on precedence and parses back to the same tree.

use std::fmt::{self, Display};

use tracing::error;

use crate::ast::{
    BinaryExpression, Expression, IdentifierExpression, NumberLiteralExpression, Visitor,
};

/// Rendered in place of an operator that has no source text.
pub const UNKNOWN_SYMBOL: &str = "<UNK>";

pub struct Stringifier {
    buffer: String,
}

impl Stringifier {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    fn write_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

impl Default for Stringifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for Stringifier {
    type Output = ();

    fn visit_binary(&mut self, binary: &BinaryExpression) {
        let symbol = binary.operator.symbol().unwrap_or_else(|| {
            error!(operator = ?binary.operator, "binary expression without operator symbol");
            UNKNOWN_SYMBOL
        });

        self.write_str("(");
        binary.left.accept(self);
        self.write_str(" ");
        self.write_str(symbol);
        self.write_str(" ");
        binary.right.accept(self);
        self.write_str(")");
    }

    fn visit_number_literal(&mut self, number: &NumberLiteralExpression) {
        self.write_str(&number.value.to_string());
    }

    fn visit_identifier(&mut self, identifier: &IdentifierExpression) {
        self.write_str(&identifier.name);
    }
}

/// Render `expression` as fully parenthesized infix text.
pub fn stringify(expression: &Expression) -> String {
    let mut stringifier = Stringifier::new();
    expression.accept(&mut stringifier);
    stringifier.finish()
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}
