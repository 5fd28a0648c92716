//! Foundation types: byte-offset spans, positions, line index.

mod line_index;
mod span;

pub use line_index::LineIndex;
pub use span::{Position, Span};
