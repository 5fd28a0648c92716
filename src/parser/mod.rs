//! Parser: Logos lexer and recursive-descent parser for Solidity source.
//!
//! `parse` is the boundary the semantic layer builds on: it either returns a
//! complete `SourceUnit` or fails with the first offending location. Error
//! recovery is deliberately not done here — the semantic builder blanks the
//! offending line and retries (see `crate::semantic::builder`).

mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::parse;
