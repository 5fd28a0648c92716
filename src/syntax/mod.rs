//! Syntax layer: the raw AST produced by the parser, plus parse errors.
//!
//! The semantic layer wraps these nodes; it never stores syntax nodes beyond
//! the lifetime of one document version.

pub mod ast;
mod error;

pub use error::ParseError;
