//! Completion suggestions.
//!
//! Context detection works over the raw current line, not the parsed tree:
//! the line being typed is usually the one the parse recovery blanked, so
//! the tree has nothing useful to say about it.

use std::path::Path;

use smol_str::SmolStr;

use crate::semantic::resolver::{
    ScopeContext, document_context, member_symbols_of, resolve_member, resolve_name,
    visible_symbols,
};
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind};
use crate::semantic::workspace::Workspace;

/// Kind of completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Contract,
    Function,
    Variable,
    Field,
    Struct,
    Enum,
    EnumValue,
    Event,
    Error,
    Type,
    Module,
    Keyword,
    File,
}

impl CompletionKind {
    fn from_symbol(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Contract | SymbolKind::Interface | SymbolKind::Library => {
                CompletionKind::Contract
            }
            SymbolKind::Function | SymbolKind::Modifier => CompletionKind::Function,
            SymbolKind::StateVariable
            | SymbolKind::LocalVariable
            | SymbolKind::Parameter
            | SymbolKind::Constant => CompletionKind::Variable,
            SymbolKind::StructField => CompletionKind::Field,
            SymbolKind::Struct => CompletionKind::Struct,
            SymbolKind::Enum => CompletionKind::Enum,
            SymbolKind::EnumValue => CompletionKind::EnumValue,
            SymbolKind::Event => CompletionKind::Event,
            SymbolKind::Error => CompletionKind::Error,
            SymbolKind::CustomType => CompletionKind::Type,
            SymbolKind::Import => CompletionKind::Module,
        }
    }
}

/// A completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: SmolStr,
    pub kind: CompletionKind,
    pub detail: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<SmolStr>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
        }
    }

    fn from_symbol(symbol: &ResolvedSymbol) -> Self {
        Self {
            label: symbol.name().clone(),
            kind: CompletionKind::from_symbol(symbol.kind),
            detail: Some(symbol.detail.clone()),
        }
    }
}

/// Built-in globals and keywords offered alongside scope symbols.
const BUILTINS: &[&str] = &[
    "msg", "block", "tx", "this", "require", "assert", "revert", "keccak256", "abi",
];

const KEYWORDS: &[&str] = &[
    "address", "bool", "string", "bytes", "bytes32", "uint256", "int256", "mapping", "memory",
    "storage", "calldata", "public", "private", "internal", "external", "view", "pure", "payable",
    "returns", "return", "if", "else", "for", "while", "emit", "new", "delete", "import",
    "contract", "library", "interface", "struct", "enum", "event", "error", "function", "using",
];

pub fn completions(workspace: &Workspace, path: &Path, offset: usize) -> Vec<CompletionItem> {
    let Some(document) = workspace.get(path) else {
        return Vec::new();
    };
    let offset = offset.min(document.text.len());
    let line = document.line_index.line_at(offset);
    let Some(line_span) = document.line_index.line_span(line) else {
        return Vec::new();
    };
    let prefix = &document.text[line_span.start..offset];

    let ctx = document_context(workspace, document, offset);

    // Detectors in order; the first matching context wins.
    if inside_import_string(prefix) {
        return import_path_items(workspace, path);
    }
    if let Some(segments) = member_access_chain(prefix) {
        return member_items(&ctx, &segments);
    }
    if after_word(prefix, "emit") {
        return filtered_scope_items(&ctx, |s| s.kind == SymbolKind::Event);
    }
    if after_word(prefix, "revert") {
        return filtered_scope_items(&ctx, |s| s.kind == SymbolKind::Error);
    }

    let mut items: Vec<CompletionItem> = visible_symbols(&ctx)
        .iter()
        .map(CompletionItem::from_symbol)
        .collect();
    for builtin in BUILTINS {
        items.push(CompletionItem::new(*builtin, CompletionKind::Variable));
    }
    for keyword in KEYWORDS {
        items.push(CompletionItem::new(*keyword, CompletionKind::Keyword));
    }
    items
}

/// Inside the quoted specifier of an import statement?
fn inside_import_string(prefix: &str) -> bool {
    let trimmed = prefix.trim_start();
    if !trimmed.starts_with("import") {
        return false;
    }
    let quotes = prefix.chars().filter(|c| *c == '"' || *c == '\'').count();
    quotes % 2 == 1
}

fn import_path_items(workspace: &Workspace, current: &Path) -> Vec<CompletionItem> {
    workspace
        .documents()
        .filter(|document| document.path != current)
        .map(|document| {
            CompletionItem::new(
                SmolStr::new(document.path.to_string_lossy()),
                CompletionKind::File,
            )
        })
        .collect()
}

/// Does the word immediately before the cursor's partial identifier equal
/// `word`?
fn after_word(prefix: &str, word: &str) -> bool {
    let head = prefix
        .trim_end_matches(|c: char| c.is_alphanumeric() || c == '_' || c == '$')
        .trim_end();
    head.ends_with(word)
        && head[..head.len() - word.len()]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '$'))
}

/// `a.b.` before the cursor yields `["a", "b"]`; a trailing partial segment
/// after the final dot is ignored.
fn member_access_chain(prefix: &str) -> Option<Vec<String>> {
    let head = prefix.trim_end_matches(|c: char| c.is_alphanumeric() || c == '_' || c == '$');
    if !head.ends_with('.') {
        return None;
    }
    let chain_start = head[..head.len() - 1]
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let chain = &head[chain_start..head.len() - 1];
    if chain.is_empty() {
        return None;
    }
    let segments: Vec<String> = chain.split('.').map(str::to_string).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn member_items(ctx: &ScopeContext<'_>, segments: &[String]) -> Vec<CompletionItem> {
    let mut current = match resolve_name(ctx, &segments[0]) {
        Some(symbol) => symbol,
        None => return Vec::new(),
    };
    for segment in &segments[1..] {
        match resolve_member(ctx, &current, segment) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }
    member_symbols_of(ctx, &current)
        .iter()
        .map(CompletionItem::from_symbol)
        .collect()
}

fn filtered_scope_items(
    ctx: &ScopeContext<'_>,
    keep: impl Fn(&ResolvedSymbol) -> bool,
) -> Vec<CompletionItem> {
    visible_symbols(ctx)
        .iter()
        .filter(|symbol| keep(symbol))
        .map(CompletionItem::from_symbol)
        .collect()
}
