//! Expression tree produced by the grammar in [`crate::parser`].
//!
//! The tree is a closed sum type. Traversal goes through [`Visitor`] or plain
//! pattern matching.

pub mod expression;

pub use expression::*;
