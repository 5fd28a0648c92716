//! Document construction with parse recovery.
//!
//! The parser is strict; editors are not. When a parse fails, the offending
//! line is blanked (same-length whitespace, newlines kept, so every other
//! span stays valid) and the parse retried. Each attempt removes one line,
//! so the loop is bounded by the line count; if the reported line is already
//! blank the text is beyond salvage and an empty document is returned.

use std::path::Path;

use crate::base::LineIndex;
use crate::parser::parse;

use super::nodes::ParsedDocument;

/// Build the semantic tree for one file version. Never fails.
pub fn build_document(path: &Path, text: &str) -> ParsedDocument {
    let mut working = text.to_string();
    loop {
        match parse(&working) {
            Ok(unit) => {
                // Spans index into the (possibly blanked) working text, which
                // is the same length as the original on every byte that
                // survived, so the original text is kept for display.
                return ParsedDocument::from_unit(path, text, &unit);
            }
            Err(error) => {
                tracing::trace!(
                    "parse error in {} at {}:{}: {}",
                    path.display(),
                    error.line,
                    error.column,
                    error.message
                );
                let Some(blanked) = blank_line(&working, error.line) else {
                    tracing::debug!(
                        "giving up on {} after unrecoverable parse error",
                        path.display()
                    );
                    return ParsedDocument::empty(path, text);
                };
                working = blanked;
            }
        }
    }
}

/// Replace line `line` with same-length whitespace. Returns `None` when the
/// line is out of range or already blank, which ends the retry loop.
fn blank_line(text: &str, line: usize) -> Option<String> {
    let index = LineIndex::new(text);
    let span = index.line_span(line)?;
    let contents = &text[span.start..span.end];
    if contents.trim().is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    for ch in contents.chars() {
        out.push(if ch == '\n' || ch == '\r' { ch } else { ' ' });
    }
    out.push_str(&text[span.end..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_source_builds_directly() {
        let doc = build_document(Path::new("/a.sol"), "contract A { uint256 x; }");
        assert_eq!(doc.contracts.len(), 1);
        assert_eq!(doc.contracts[0].variables.len(), 1);
    }

    #[test]
    fn test_blank_line_preserves_length() {
        let text = "abc\ndef\nghi";
        let blanked = blank_line(text, 1).unwrap();
        assert_eq!(blanked.len(), text.len());
        assert_eq!(blanked, "abc\n   \nghi");
    }

    #[test]
    fn test_broken_line_is_recovered_around() {
        let source = "contract A { uint256 x; }\n???bad???\ncontract B { uint256 y; }\n";
        let doc = build_document(Path::new("/a.sol"), source);
        assert_eq!(doc.contracts.len(), 2);
        assert_eq!(doc.contracts[0].name, "A");
        assert_eq!(doc.contracts[1].name, "B");
        // Spans still index the original text.
        let b = &doc.contracts[1];
        assert_eq!(&source[b.name_span.start..b.name_span.end], "B");
    }

    #[test]
    fn test_unsalvageable_text_yields_empty_document() {
        // A single broken line: blanking it leaves nothing to fail on, so
        // this actually recovers to an empty unit; unbalanced braces across
        // every line are what exhaust recovery.
        let doc = build_document(Path::new("/a.sol"), "contract A {");
        assert!(doc.contracts.is_empty());
        assert_eq!(doc.text, "contract A {");
    }

    #[test]
    fn test_dangling_statement_keeps_enclosing_contract() {
        // `emit ` errors at the `}` on the next line; only the emit line may
        // be blanked, or the whole contract unravels.
        let source =
            "contract C {\n    event Moved(uint256 v);\n    function f() public {\n        emit \n    }\n}\n";
        let doc = build_document(Path::new("/c.sol"), source);
        assert_eq!(doc.contracts.len(), 1);
        assert_eq!(doc.contracts[0].events.len(), 1);
        assert!(doc.contracts[0].function_named("f").is_some());
    }

    #[test]
    fn test_broken_function_keeps_other_members() {
        let source = "contract A {\n  function good() public {}\n  function bad( {\n  uint256 z;\n}\n";
        let doc = build_document(Path::new("/a.sol"), source);
        assert_eq!(doc.contracts.len(), 1);
        assert!(doc.contracts[0].function_named("good").is_some());
    }
}
