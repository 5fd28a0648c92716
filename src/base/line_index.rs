use super::span::{Position, Span};

/// Maps between byte offsets and line/column positions.
///
/// Built once per text snapshot; used by parse recovery (blanking a single
/// line) and completion (inspecting the raw current line).
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. `starts[0]` is always 0.
    starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self {
            starts,
            text_len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line number (0-indexed) containing the given byte offset.
    pub fn line_at(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }

    /// Convert a byte offset to a line/column position.
    pub fn position_at(&self, offset: usize) -> Position {
        let line = self.line_at(offset);
        Position::new(line, offset - self.starts[line])
    }

    /// Convert a line/column position back to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end.
    pub fn offset_at(&self, position: Position) -> usize {
        let Some(&start) = self.starts.get(position.line) else {
            return self.text_len;
        };
        let end = self.line_end(position.line);
        (start + position.column).min(end)
    }

    /// Span of line `line`, excluding the trailing newline.
    pub fn line_span(&self, line: usize) -> Option<Span> {
        let start = *self.starts.get(line)?;
        Some(Span::new(start, self.line_end(line)))
    }

    /// Text of line `line`, excluding the trailing newline.
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> Option<&'t str> {
        let span = self.line_span(line)?;
        text.get(span.start..span.end)
    }

    fn line_end(&self, line: usize) -> usize {
        match self.starts.get(line + 1) {
            // Back off past the newline (and a \r preceding it).
            Some(&next) => next.saturating_sub(1),
            None => self.text_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at() {
        let index = LineIndex::new("ab\ncde\n\nf");
        assert_eq!(index.position_at(0), Position::new(0, 0));
        assert_eq!(index.position_at(3), Position::new(1, 0));
        assert_eq!(index.position_at(5), Position::new(1, 2));
        assert_eq!(index.position_at(7), Position::new(2, 0));
        assert_eq!(index.position_at(8), Position::new(3, 0));
    }

    #[test]
    fn test_offset_roundtrip() {
        let text = "first\nsecond line\nthird";
        let index = LineIndex::new(text);
        for offset in 0..text.len() {
            assert_eq!(index.offset_at(index.position_at(offset)), offset);
        }
    }

    #[test]
    fn test_line_text() {
        let text = "pragma solidity ^0.8.0;\ncontract A {}\n";
        let index = LineIndex::new(text);
        assert_eq!(index.line_text(text, 0), Some("pragma solidity ^0.8.0;"));
        assert_eq!(index.line_text(text, 1), Some("contract A {}"));
        assert_eq!(index.line_text(text, 2), Some(""));
        assert_eq!(index.line_text(text, 3), None);
    }

    #[test]
    fn test_column_clamps_to_line_end() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset_at(Position::new(0, 99)), 2);
    }
}
