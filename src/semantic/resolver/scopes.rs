//! The ordered scope strategies.
//!
//! Each strategy answers two questions: "does this scope bind `name`?" and
//! "what does this scope contribute to completion?". Keeping them separate
//! objects makes the precedence order explicit and each scope testable on
//! its own.

use rustc_hash::FxHashSet;

use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind};

use super::ScopeContext;
use super::members::{member_in_hierarchy, members_in_hierarchy};

pub trait ScopeStrategy {
    fn name(&self) -> &'static str;
    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol>;
    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>);
}

/// Resolution order, innermost first.
pub fn strategies() -> [&'static dyn ScopeStrategy; 5] {
    [
        &LocalVariableScope,
        &ParameterScope,
        &ContractMemberScope,
        &ModuleScope,
        &ImportScope,
    ]
}

/// Locals declared before the cursor in the enclosing function body.
pub struct LocalVariableScope;

impl ScopeStrategy for LocalVariableScope {
    fn name(&self) -> &'static str {
        "local"
    }

    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
        let function = ctx.function?;
        function
            .locals_in_scope(ctx.offset)
            .into_iter()
            // Innermost shadowing declaration wins.
            .rev()
            .find(|local| local.name == name)
            .map(|local| local.symbol(&ctx.document.path, SymbolKind::LocalVariable))
    }

    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>) {
        let Some(function) = ctx.function else {
            return;
        };
        for local in function.locals_in_scope(ctx.offset).into_iter().rev() {
            out.push(local.symbol(&ctx.document.path, SymbolKind::LocalVariable));
        }
    }
}

/// Parameters and named return values of the enclosing function.
pub struct ParameterScope;

impl ScopeStrategy for ParameterScope {
    fn name(&self) -> &'static str {
        "parameter"
    }

    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
        let function = ctx.function?;
        function
            .params
            .iter()
            .chain(&function.returns)
            .find(|param| param.name == name)
            .map(|param| param.symbol(&ctx.document.path, SymbolKind::Parameter))
    }

    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>) {
        let Some(function) = ctx.function else {
            return;
        };
        for param in function.params.iter().chain(&function.returns) {
            out.push(param.symbol(&ctx.document.path, SymbolKind::Parameter));
        }
    }
}

/// Members of the enclosing contract, including inherited ones.
pub struct ContractMemberScope;

impl ScopeStrategy for ContractMemberScope {
    fn name(&self) -> &'static str {
        "contract"
    }

    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
        let contract = ctx.contract?;
        let mut visited = FxHashSet::default();
        member_in_hierarchy(ctx, ctx.document, contract, name, &mut visited)
    }

    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>) {
        let Some(contract) = ctx.contract else {
            return;
        };
        let mut visited = FxHashSet::default();
        members_in_hierarchy(ctx, ctx.document, contract, out, &mut visited);
    }
}

/// Module-level declarations of the current file.
pub struct ModuleScope;

impl ScopeStrategy for ModuleScope {
    fn name(&self) -> &'static str {
        "module"
    }

    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
        ctx.document.module_symbol_named(name)
    }

    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>) {
        ctx.document.module_symbols(out);
    }
}

/// Symbols brought into scope by this file's imports, transitively.
pub struct ImportScope;

impl ScopeStrategy for ImportScope {
    fn name(&self) -> &'static str {
        "import"
    }

    fn lookup(&self, ctx: &ScopeContext<'_>, name: &str) -> Option<ResolvedSymbol> {
        // A namespace alias is itself a symbol.
        for import in &ctx.document.imports {
            if import.alias.as_deref() == Some(name) {
                return import.namespace_symbol(&ctx.document.path);
            }
        }
        // The reachable search starts at the current document; its own
        // module symbols are the previous strategy's job, so skip them here.
        ctx.search_reachable(name, &|document, name| {
            if std::ptr::eq(document, ctx.document) {
                return None;
            }
            document.module_symbol_named(name)
        })
    }

    fn collect(&self, ctx: &ScopeContext<'_>, out: &mut Vec<ResolvedSymbol>) {
        for import in &ctx.document.imports {
            if let Some(namespace) = import.namespace_symbol(&ctx.document.path) {
                out.push(namespace);
            }
        }
        for (index, import) in ctx.document.imports.iter().enumerate() {
            let Some(target) = ctx.workspace.imported_document(&ctx.document.path, index) else {
                continue;
            };
            if import.alias.is_some() {
                continue;
            }
            if import.is_selective() {
                for symbol in &import.symbols {
                    if let Some(mut resolved) = target.module_symbol_named(&symbol.name) {
                        // Surface the local (possibly aliased) name.
                        resolved.target.name = symbol.local_name().clone();
                        out.push(resolved);
                    }
                }
            } else {
                target.module_symbols(out);
            }
        }
    }
}
