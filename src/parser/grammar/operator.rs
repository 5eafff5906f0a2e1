//! Operator parsers, one per precedence layer

use crate::ast::BinaryOperator;

use crate::parser::combinators::{BoxedParser, choice};
use crate::parser::primitives::{char_in_map, literal, whitespace};

/// Operator table for a set of single-character symbols. Characters without
/// an operator have no entry.
fn operator_table(symbols: &'static str) -> Vec<Option<BinaryOperator>> {
    symbols
        .chars()
        .map(|c| match BinaryOperator::from_symbol(c.encode_utf8(&mut [0; 4])) {
            BinaryOperator::Unknown => None,
            operator => Some(operator),
        })
        .collect()
}

fn single_char_operator(symbols: &'static str) -> BoxedParser<BinaryOperator> {
    char_in_map(symbols, operator_table(symbols)) - whitespace()
}

/// mul_op := ("*" | "/") whitespace
pub fn mul_op() -> BoxedParser<BinaryOperator> {
    single_char_operator("*/")
}

/// add_op := ("+" | "-") whitespace
pub fn add_op() -> BoxedParser<BinaryOperator> {
    single_char_operator("+-")
}

/// cmp_op := ("=" | "<>") whitespace
pub fn cmp_op() -> BoxedParser<BinaryOperator> {
    let symbols = ["=", "<>"].map(|symbol| {
        literal(symbol) >> |text: String| BinaryOperator::from_symbol(&text)
    });
    choice(symbols).filter(|operator| operator.is_comparison()) - whitespace()
}
