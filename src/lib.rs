//! # Parsley - backtracking parser combinators
//!
//! Parsley is a small parsing engine built from composable combinators that
//! run over a mutable cursor into a string, together with a grammar for
//! arithmetic expressions that exercises it.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Grammar] → Expression tree (ast::Expression)
//!     ↓
//! [Stringifier] → fully parenthesized text
//! ```
//!
//! There is no separate lexer: the character-level primitives are the
//! leaves of the grammar, and every token parser swallows the whitespace that
//! follows it.
//!
//! ## Backtracking contract
//!
//! A parser that fails leaves the cursor ([`parser::ParseState`]) exactly
//! where it found it, position and indent level alike. Composite combinators
//! take a [`parser::Snapshot`] before delegating and restore it on any
//! failure, which is what lets `or`, `choice`, `optional` and `chain_left` try
//! alternatives one after another on the same cursor.
//!
//! ## Recursive grammars
//!
//! A [`parser::Forward`] is a placeholder that can be handed out before the
//! parser it stands for exists, and defined once that parser is assembled.
//! The expression grammar uses one for parenthesized sub-expressions.
//!
//! ## Module Structure
//!
//! - [`parser`] - cursor, combinators, primitives and the expression grammar
//! - [`ast`] - expression tree and its visitor
//! - [`fmt`] - printing trees back to text
//!
//! ## Example
//!
//! ```
//! let tree = parsley::parse_expression("1 + 2 * x").unwrap();
//! assert_eq!(parsley::stringify(&tree), "(1 + (2 * x))");
//! ```

pub mod ast;
pub mod fmt;
pub mod parser;

pub use ast::{BinaryOperator, Expression};
pub use fmt::stringify;
pub use parser::{
    Consumption, Dialect, ExpressionGrammar, ParseError, ParseResult, parse, parse_expression,
    parse_prefix,
};
