//! Scope-aware name resolution.
//!
//! Resolution walks an ordered list of scope strategies, innermost first:
//! function locals, parameters and returns, contract members (including
//! inherited ones, depth-first over the inheritance list), module-level
//! symbols, then symbols provided by imports. Member-access chains resolve
//! each link against the type of the previous link.

mod members;
mod scopes;
mod using;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::semantic::nodes::{ParsedContract, ParsedDocument, ParsedExpression, ParsedFunction};
use crate::semantic::type_ref::ResolvedSymbol;
use crate::semantic::workspace::Workspace;

pub use members::{member_symbols_of, resolve_member};
pub use scopes::{ScopeStrategy, strategies};
pub use using::{extension_functions, resolve_extension, visible_usings};

/// Everything a lookup needs to know about where the cursor is.
#[derive(Clone, Copy)]
pub struct ScopeContext<'a> {
    pub workspace: &'a Workspace,
    pub document: &'a ParsedDocument,
    pub contract: Option<&'a ParsedContract>,
    pub function: Option<&'a ParsedFunction>,
    pub offset: usize,
}

impl<'a> ScopeContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        document: &'a ParsedDocument,
        contract: Option<&'a ParsedContract>,
        function: Option<&'a ParsedFunction>,
        offset: usize,
    ) -> Self {
        Self {
            workspace,
            document,
            contract,
            function,
            offset,
        }
    }

    /// Search this document and everything reachable through its imports,
    /// translating names across `as`-renamed selective imports at each hop.
    /// A visited set guards import cycles.
    pub fn search_reachable<T>(
        &self,
        name: &str,
        find: &impl Fn(&'a ParsedDocument, &str) -> Option<T>,
    ) -> Option<T> {
        let mut visited = FxHashSet::default();
        self.search_from(self.document, name, &mut visited, find)
    }

    fn search_from<T>(
        &self,
        document: &'a ParsedDocument,
        name: &str,
        visited: &mut FxHashSet<std::path::PathBuf>,
        find: &impl Fn(&'a ParsedDocument, &str) -> Option<T>,
    ) -> Option<T> {
        if !visited.insert(document.path.clone()) {
            return None;
        }
        if let Some(found) = find(document, name) {
            return Some(found);
        }
        for (index, import) in document.imports.iter().enumerate() {
            // Namespace imports expose nothing directly.
            if import.alias.is_some() {
                continue;
            }
            if import.is_selective() && !import.provides(name) {
                continue;
            }
            let source_name = import.source_name(name);
            let Some(target) = self.workspace.imported_document(&document.path, index) else {
                continue;
            };
            if let Some(found) = self.search_from(target, &source_name, visited, find) {
                return Some(found);
            }
        }
        None
    }

    /// Contract/library/interface by name, with the document declaring it.
    pub fn find_contract(
        &self,
        name: &str,
    ) -> Option<(&'a ParsedDocument, &'a ParsedContract)> {
        self.search_reachable(name, &|document, name| {
            document.contract_named(name).map(|c| (document, c))
        })
    }

    /// Documents this context's file directly imports, resolved.
    pub fn imported_documents(&self) -> Vec<&'a ParsedDocument> {
        (0..self.document.imports.len())
            .filter_map(|index| {
                self.workspace
                    .imported_document(&self.document.path, index)
                    .map(|arc| arc.as_ref())
            })
            .collect()
    }
}

/// Resolve a bare name at the context, innermost scope first.
pub fn resolve_name(ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
    if name == "this" {
        if let Some(contract) = ctx.contract {
            return Some(contract.symbol(&ctx.document.path));
        }
    }
    for strategy in strategies() {
        if let Some(symbol) = strategy.lookup(ctx, name) {
            tracing::trace!("'{}' resolved by {} scope", name, strategy.name());
            return Some(symbol);
        }
    }
    None
}

/// Resolve an expression chain link, memoized on the node for this document
/// version. Base-less links resolve as names; member links resolve against
/// the resolved base.
pub fn resolve_expression<'e>(
    ctx: &ScopeContext<'_>,
    expression: &'e ParsedExpression,
) -> Option<&'e ResolvedSymbol> {
    expression.resolve_with(|node| match &node.base {
        None => resolve_name(ctx, &node.name),
        Some(base) => {
            let base_symbol = resolve_expression(ctx, base)?.clone();
            resolve_member(ctx, &base_symbol, &node.name)
        }
    })
}

/// Every symbol visible at the context, deduplicated by name with the
/// innermost declaration winning.
pub fn visible_symbols(ctx: &ScopeContext<'_>) -> Vec<ResolvedSymbol> {
    let mut symbols = Vec::new();
    for strategy in strategies() {
        strategy.collect(ctx, &mut symbols);
    }
    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    symbols.retain(|symbol| seen.insert(symbol.name().clone()));
    symbols
}

/// Shorthand used by the ide layer: a module-scope context for a document.
pub fn document_context<'a>(
    workspace: &'a Workspace,
    document: &'a ParsedDocument,
    offset: usize,
) -> ScopeContext<'a> {
    let contract = document.contract_at(offset);
    let function = contract
        .and_then(|c| c.function_at(offset))
        .or_else(|| document.functions.iter().find(|f| f.span.contains(offset)));
    ScopeContext::new(workspace, document, contract, function, offset)
}
