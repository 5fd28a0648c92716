//! Hover information.

use std::path::Path;

use crate::base::LineIndex;
use crate::semantic::type_ref::SymbolTarget;
use crate::semantic::workspace::Workspace;

use super::goto::symbol_at;

/// Result of a hover request: a fenced signature block, the doc comment of
/// the declaration when it carries one, and the declaration's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown contents.
    pub contents: String,
    pub target: SymbolTarget,
}

pub fn hover(workspace: &Workspace, path: &Path, offset: usize) -> Option<HoverResult> {
    let symbol = symbol_at(workspace, path, offset)?;

    let mut contents = format!("```solidity\n{}\n```", symbol.detail);
    if let Some(declaring) = workspace.get(&symbol.target.path) {
        if let Some(doc_text) = doc_comment_above(
            &declaring.text,
            &declaring.line_index,
            symbol.target.span.start,
        ) {
            contents.push_str("\n\n---\n\n");
            contents.push_str(&doc_text);
        }
    }

    Some(HoverResult {
        contents,
        target: symbol.target,
    })
}

/// The `///` or `/** */` comment block ending on the line above `offset`.
fn doc_comment_above(text: &str, index: &LineIndex, offset: usize) -> Option<String> {
    let decl_line = index.line_at(offset);
    if decl_line == 0 {
        return None;
    }

    let mut lines: Vec<&str> = Vec::new();
    let mut line = decl_line;
    while line > 0 {
        line -= 1;
        let contents = index.line_text(text, line)?.trim();
        if let Some(stripped) = contents.strip_prefix("///") {
            lines.push(stripped.trim());
            continue;
        }
        // A block comment is collected only when its tail sits directly
        // above the declaration.
        if lines.is_empty() && contents.ends_with("*/") {
            return block_comment_above(text, index, line);
        }
        break;
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

fn block_comment_above(text: &str, index: &LineIndex, tail_line: usize) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();
    let mut line = tail_line;
    loop {
        let contents = index.line_text(text, line)?.trim();
        let is_head = contents.starts_with("/**");
        let cleaned = contents
            .trim_start_matches("/**")
            .trim_end_matches("*/")
            .trim_start_matches('*')
            .trim();
        if !cleaned.is_empty() {
            lines.push(cleaned);
        }
        if is_head {
            lines.reverse();
            return if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            };
        }
        if line == 0 {
            return None;
        }
        line -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::AnalysisHost;

    #[test]
    fn test_hover_shows_signature_block() {
        let source = "contract C { function f(uint256 a) public returns (bool) {} }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("f(uint256").unwrap();
        let result = host.analysis().hover(Path::new("/c.sol"), offset).unwrap();
        assert!(result.contents.starts_with("```solidity\n"));
        assert!(result.contents.contains("function f(uint256 a) public returns (bool)"));
    }

    #[test]
    fn test_hover_includes_doc_comment() {
        let source = "contract C {\n/// @notice Total supply.\nuint256 total;\nfunction f() public { total; }\n}";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("total; }").unwrap();
        let result = host.analysis().hover(Path::new("/c.sol"), offset).unwrap();
        assert!(result.contents.contains("uint256 total"));
        assert!(result.contents.contains("@notice Total supply."));
    }

    #[test]
    fn test_hover_on_literal_is_none() {
        let source = "contract C { function f() public { 42; } }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("42").unwrap();
        assert!(host.analysis().hover(Path::new("/c.sol"), offset).is_none());
    }

    #[test]
    fn test_block_doc_comment() {
        let source = "/**\n * A token.\n */\ncontract Token {}";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/t.sol"), source);

        let offset = source.find("Token").unwrap();
        let result = host.analysis().hover(Path::new("/t.sol"), offset).unwrap();
        assert!(result.contents.contains("A token."));
    }
}
