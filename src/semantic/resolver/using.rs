//! `using L for T` directives and the pseudo-members they attach.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::semantic::nodes::{ParsedContract, ParsedUsing};
use crate::semantic::type_ref::{ResolvedSymbol, TypeDescriptor};
use crate::syntax::ast;

use super::ScopeContext;

/// All using directives in force at the context: document-global ones,
/// the enclosing contract's, and those of its base contracts.
pub fn visible_usings<'a>(ctx: &ScopeContext<'a>) -> Vec<&'a ParsedUsing> {
    let mut usings: Vec<&'a ParsedUsing> = ctx.document.usings.iter().collect();
    if let Some(contract) = ctx.contract {
        let mut visited = FxHashSet::default();
        collect_contract_usings(ctx, contract, &mut usings, &mut visited);
    }
    usings
}

fn collect_contract_usings<'a>(
    ctx: &ScopeContext<'a>,
    contract: &'a ParsedContract,
    out: &mut Vec<&'a ParsedUsing>,
    visited: &mut FxHashSet<SmolStr>,
) {
    if !visited.insert(contract.name.clone()) {
        return;
    }
    out.extend(contract.usings.iter());
    for base in &contract.inherits {
        if let Some((_, base_contract)) = ctx.find_contract(&base.name) {
            collect_contract_usings(ctx, base_contract, out, visited);
        }
    }
}

/// Does a library function extend values of `value_type`? True when its
/// first parameter's type is compatible with it.
fn extends_type(function: &crate::semantic::nodes::ParsedFunction, value_type: &TypeDescriptor) -> bool {
    if function.kind != ast::FunctionKind::Function {
        return false;
    }
    match function.params.first() {
        Some(first) => first.type_desc().is_compatible_with(value_type),
        None => false,
    }
}

/// Library functions attached to values of `value_type` by the directives
/// in force, as pseudo-members (the first parameter is the receiver).
pub fn extension_functions(
    ctx: &ScopeContext<'_>,
    value_type: &TypeDescriptor,
) -> Vec<ResolvedSymbol> {
    let mut out = Vec::new();
    for using in visible_usings(ctx) {
        if !using.applies_to(value_type) {
            continue;
        }
        let Some((document, library)) = ctx.find_contract(&using.library) else {
            tracing::debug!("using directive names unknown library '{}'", using.library);
            continue;
        };
        if library.kind != ast::ContractKind::Library {
            continue;
        }
        for function in &library.functions {
            if extends_type(function, value_type) {
                out.push(function.symbol(&document.path));
            }
        }
    }
    out
}

/// Resolve one pseudo-member by name.
pub fn resolve_extension(
    ctx: &ScopeContext<'_>,
    value_type: &TypeDescriptor,
    name: &str,
) -> Option<ResolvedSymbol> {
    extension_functions(ctx, value_type)
        .into_iter()
        .find(|symbol| symbol.name() == name)
}
