use thiserror::Error;

/// A parse failure with the location that triggered it.
///
/// The parser is strict: it reports the first offending token and stops.
/// Recovery (blanking the offending line and retrying) happens in the
/// semantic builder, which needs the line number carried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// 0-indexed line of the offending token.
    pub line: usize,
    /// 0-indexed column of the offending token.
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}
