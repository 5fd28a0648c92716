//! Raw source documents and tolerant import scanning.
//!
//! Import extraction must work on code that does not parse — a half-typed
//! file still needs its import graph — so it is a regex scan over the raw
//! text, not a parser pass.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::Span;

/// Matches every Solidity import form loosely enough to survive broken code:
/// `import "p";`, `import {A, B as C} from "p";`, `import * as ns from "p";`,
/// `import "p" as ns;` — capture 1 is the symbol list, 2/3 the specifier.
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:\{([^}]*)\}\s+from\s+|\*\s*as\s+\w+\s+from\s+)?\s*(?:"([^"\n]+)"|'([^'\n]+)')"#)
        .expect("import regex")
});

/// One scanned import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImport {
    pub specifier: String,
    /// Span of the specifier text (without quotes) in the raw document.
    pub specifier_span: Span,
    /// Named symbols (`{A, B as C}` keeps the local names `A`, `C`).
    pub symbols: Vec<SmolStr>,
    /// `import * as ns from "p"` / `import "p" as ns`.
    pub is_namespace_alias: bool,
}

/// A raw text snapshot of one file plus its scanned imports.
///
/// Mutated in place only to rewrite import specifiers once resolved; any
/// other text change produces a new document version upstream.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
    pub imports: Vec<RawImport>,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let imports = extract_imports(&text);
        Self {
            path: path.into(),
            text,
            imports,
        }
    }

    /// Rewrite an unresolved specifier to its resolved absolute path so a
    /// later parse sees text it can use directly. Relative specifiers are
    /// left untouched. Returns whether anything changed.
    pub fn rewrite_import(&mut self, old_specifier: &str, resolved: &Path) -> bool {
        if old_specifier.starts_with('.') {
            return false;
        }
        let Some(import) = self
            .imports
            .iter()
            .find(|i| i.specifier == old_specifier)
        else {
            return false;
        };
        let span = import.specifier_span;
        if self.text.get(span.start..span.end) != Some(old_specifier) {
            return false;
        }
        let replacement = resolved.to_string_lossy().replace('\\', "/");
        tracing::trace!(
            "rewriting import '{}' -> '{}' in {}",
            old_specifier,
            replacement,
            self.path.display()
        );
        self.text.replace_range(span.start..span.end, &replacement);
        self.imports = extract_imports(&self.text);
        true
    }
}

/// Scan raw text for import statements. Tolerant of unparsable code.
pub fn extract_imports(text: &str) -> Vec<RawImport> {
    let mut imports = Vec::new();
    for captures in IMPORT_RE.captures_iter(text) {
        let Some(path_match) = captures.get(2).or_else(|| captures.get(3)) else {
            continue;
        };
        let symbols = captures
            .get(1)
            .map(|symbol_list| {
                symbol_list
                    .as_str()
                    .split(',')
                    .filter_map(|entry| {
                        let entry = entry.trim();
                        if entry.is_empty() {
                            return None;
                        }
                        // `A as B` binds the local name `B`.
                        let local = entry
                            .split_whitespace()
                            .next_back()
                            .unwrap_or(entry);
                        Some(SmolStr::new(local))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let full = captures.get(0).map(|m| m.as_str()).unwrap_or("");
        let after = &text[path_match.end()..];
        let is_namespace_alias = full.contains('*')
            || after
                .trim_start_matches(['"', '\''])
                .trim_start()
                .starts_with("as ");

        imports.push(RawImport {
            specifier: path_match.as_str().to_string(),
            specifier_span: Span::new(path_match.start(), path_match.end()),
            symbols,
            is_namespace_alias,
        });
    }
    imports
}

/// Holds the raw text of every known file.
#[derive(Debug, Default)]
pub struct SourceDocumentStore {
    documents: FxHashMap<PathBuf, SourceDocument>,
}

impl SourceDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document, reading from disk when no text is supplied. An
    /// existing entry is replaced only when the text actually changed.
    pub fn load(&mut self, path: &Path, text: Option<String>) -> Option<&SourceDocument> {
        let text = match text {
            Some(text) => text,
            None => {
                if self.documents.contains_key(path) {
                    return self.documents.get(path);
                }
                std::fs::read_to_string(path).ok()?
            }
        };
        match self.documents.get(path) {
            Some(existing) if existing.text == text => {}
            _ => {
                self.documents
                    .insert(path.to_path_buf(), SourceDocument::new(path, text));
            }
        }
        self.documents.get(path)
    }

    pub fn get(&self, path: &Path) -> Option<&SourceDocument> {
        self.documents.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut SourceDocument> {
        self.documents.get_mut(path)
    }

    pub fn remove(&mut self, path: &Path) -> Option<SourceDocument> {
        self.documents.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.documents.keys()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_import() {
        let imports = extract_imports("pragma solidity ^0.8.0;\nimport \"./Foo.sol\";\n");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifier, "./Foo.sol");
        assert!(imports[0].symbols.is_empty());
        assert!(!imports[0].is_namespace_alias);
    }

    #[test]
    fn test_extract_symbol_import() {
        let imports = extract_imports("import {A, B as C} from \"@oz/Token.sol\";");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifier, "@oz/Token.sol");
        assert_eq!(imports[0].symbols, vec![SmolStr::new("A"), SmolStr::new("C")]);
    }

    #[test]
    fn test_extract_namespace_import() {
        let imports = extract_imports("import * as oz from './Token.sol';");
        assert_eq!(imports.len(), 1);
        assert!(imports[0].is_namespace_alias);
    }

    #[test]
    fn test_extract_survives_broken_code() {
        let text = "import \"./A.sol\";\ncontract {{{ function ) \nimport './B.sol';";
        let imports = extract_imports(text);
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[1].specifier, "./B.sol");
    }

    #[test]
    fn test_specifier_span_indexes_raw_text() {
        let text = "import \"lib/X.sol\";";
        let imports = extract_imports(text);
        let span = imports[0].specifier_span;
        assert_eq!(&text[span.start..span.end], "lib/X.sol");
    }

    #[test]
    fn test_rewrite_import() {
        let mut doc = SourceDocument::new("/p/src/A.sol", "import \"oz/Token.sol\";\n");
        let changed = doc.rewrite_import("oz/Token.sol", Path::new("/p/lib/oz/Token.sol"));
        assert!(changed);
        assert_eq!(doc.text, "import \"/p/lib/oz/Token.sol\";\n");
        assert_eq!(doc.imports[0].specifier, "/p/lib/oz/Token.sol");
    }

    #[test]
    fn test_rewrite_leaves_relative_imports() {
        let mut doc = SourceDocument::new("/p/src/A.sol", "import \"./Token.sol\";\n");
        assert!(!doc.rewrite_import("./Token.sol", Path::new("/p/src/Token.sol")));
        assert_eq!(doc.imports[0].specifier, "./Token.sol");
    }

    #[test]
    fn test_store_reuses_unchanged_text() {
        let mut store = SourceDocumentStore::new();
        store.load(Path::new("/a.sol"), Some("contract A {}".into()));
        let first = store.get(Path::new("/a.sol")).unwrap().text.clone();
        store.load(Path::new("/a.sol"), Some("contract A {}".into()));
        assert_eq!(store.get(Path::new("/a.sol")).unwrap().text, first);
        assert_eq!(store.len(), 1);
    }
}
