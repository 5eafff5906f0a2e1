//! Printing expression trees back to source text.

pub mod stringify;

pub use stringify::*;
