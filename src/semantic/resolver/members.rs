//! Member access: resolving `.name` against what the base resolved to.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::semantic::nodes::{ParsedContract, ParsedDocument, ParsedEnum, ParsedStruct};
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind, TypeDescriptor};

use super::ScopeContext;
use super::using::{extension_functions, resolve_extension};

/// Look up a member on a contract, walking the inheritance list depth-first.
/// `visited` guards inheritance cycles by contract name.
pub fn member_in_hierarchy<'a>(
    ctx: &ScopeContext<'a>,
    document: &'a ParsedDocument,
    contract: &'a ParsedContract,
    name: &str,
    visited: &mut FxHashSet<SmolStr>,
) -> Option<ResolvedSymbol> {
    if !visited.insert(contract.name.clone()) {
        return None;
    }
    if let Some(member) = contract.member_named(name, &document.path) {
        return Some(member);
    }
    for base in &contract.inherits {
        let Some((base_doc, base_contract)) = ctx.find_contract(&base.name) else {
            continue;
        };
        if let Some(member) = member_in_hierarchy(ctx, base_doc, base_contract, name, visited) {
            return Some(member);
        }
    }
    None
}

/// Collect all members of a contract and its bases, derived-most first.
pub fn members_in_hierarchy<'a>(
    ctx: &ScopeContext<'a>,
    document: &'a ParsedDocument,
    contract: &'a ParsedContract,
    out: &mut Vec<ResolvedSymbol>,
    visited: &mut FxHashSet<SmolStr>,
) {
    if !visited.insert(contract.name.clone()) {
        return;
    }
    contract.member_symbols(&document.path, out);
    for base in &contract.inherits {
        if let Some((base_doc, base_contract)) = ctx.find_contract(&base.name) {
            members_in_hierarchy(ctx, base_doc, base_contract, out, visited);
        }
    }
}

/// A struct definition visible from the context, by (possibly dotted) name.
fn find_struct<'a>(ctx: &ScopeContext<'a>, name: &str) -> Option<(&'a ParsedDocument, &'a ParsedStruct)> {
    if let Some((owner, member)) = name.split_once('.') {
        let (document, contract) = ctx.find_contract(owner)?;
        return contract
            .structs
            .iter()
            .find(|s| s.name == member)
            .map(|s| (document, s));
    }
    if let Some(contract) = ctx.contract {
        if let Some(s) = contract.structs.iter().find(|s| s.name == name) {
            return Some((ctx.document, s));
        }
    }
    ctx.search_reachable(name, &|document, name| {
        document
            .structs
            .iter()
            .find(|s| s.name == name)
            .map(|s| (document, s))
    })
}

fn find_enum<'a>(ctx: &ScopeContext<'a>, name: &str) -> Option<(&'a ParsedDocument, &'a ParsedEnum)> {
    if let Some((owner, member)) = name.split_once('.') {
        let (document, contract) = ctx.find_contract(owner)?;
        return contract
            .enums
            .iter()
            .find(|e| e.name == member)
            .map(|e| (document, e));
    }
    if let Some(contract) = ctx.contract {
        if let Some(e) = contract.enums.iter().find(|e| e.name == name) {
            return Some((ctx.document, e));
        }
    }
    ctx.search_reachable(name, &|document, name| {
        document
            .enums
            .iter()
            .find(|e| e.name == name)
            .map(|e| (document, e))
    })
}

/// Resolve `.name` on a resolved base symbol.
pub fn resolve_member(
    ctx: &ScopeContext<'_>,
    base: &ResolvedSymbol,
    name: &str,
) -> Option<ResolvedSymbol> {
    match base.kind {
        // Static access on a contract, interface, or library name.
        SymbolKind::Contract | SymbolKind::Interface | SymbolKind::Library => {
            let (document, contract) = ctx.find_contract(base.name())?;
            let mut visited = FxHashSet::default();
            member_in_hierarchy(ctx, document, contract, name, &mut visited)
        }
        // `State.Idle`.
        SymbolKind::Enum => {
            let (document, definition) = find_enum(ctx, base.name())?;
            definition.value_symbol(&document.path, name)
        }
        // `ns.Symbol` through an `import * as ns`.
        SymbolKind::Import => resolve_through_namespace(ctx, base, name),
        // A typed value: struct field, contract instance member, or a
        // using-for extension on the value's type.
        _ => {
            let value_type = base.type_desc.clone()?;
            resolve_typed_member(ctx, &value_type, name)
        }
    }
}

fn resolve_typed_member(
    ctx: &ScopeContext<'_>,
    value_type: &TypeDescriptor,
    name: &str,
) -> Option<ResolvedSymbol> {
    if !value_type.is_array && !value_type.is_mapping {
        if let Some((document, definition)) = find_struct(ctx, &value_type.base) {
            if let Some(field) = definition.field_named(name) {
                return Some(field.symbol(&document.path, SymbolKind::StructField));
            }
        }
        if let Some((document, contract)) = ctx.find_contract(&value_type.base) {
            let mut visited = FxHashSet::default();
            if let Some(member) = member_in_hierarchy(ctx, document, contract, name, &mut visited)
            {
                return Some(member);
            }
        }
    }
    resolve_extension(ctx, value_type, name)
}

fn resolve_through_namespace(
    ctx: &ScopeContext<'_>,
    base: &ResolvedSymbol,
    name: &str,
) -> Option<ResolvedSymbol> {
    let (index, _) = ctx
        .document
        .imports
        .iter()
        .enumerate()
        .find(|(_, import)| import.alias.as_ref() == Some(base.name()))?;
    let target = ctx.workspace.imported_document(&ctx.document.path, index)?;
    target.module_symbol_named(name)
}

/// Every member reachable through `.` on the base, for completion: direct
/// and inherited members for contracts, enum values, struct fields, and
/// using-for extensions for typed values.
pub fn member_symbols_of(ctx: &ScopeContext<'_>, base: &ResolvedSymbol) -> Vec<ResolvedSymbol> {
    let mut out = Vec::new();
    match base.kind {
        SymbolKind::Contract | SymbolKind::Interface | SymbolKind::Library => {
            if let Some((document, contract)) = ctx.find_contract(base.name()) {
                let mut visited = FxHashSet::default();
                members_in_hierarchy(ctx, document, contract, &mut out, &mut visited);
            }
        }
        SymbolKind::Enum => {
            if let Some((document, definition)) = find_enum(ctx, base.name()) {
                for value in &definition.values {
                    if let Some(symbol) = definition.value_symbol(&document.path, &value.name) {
                        out.push(symbol);
                    }
                }
            }
        }
        SymbolKind::Import => {
            if let Some((index, _)) = ctx
                .document
                .imports
                .iter()
                .enumerate()
                .find(|(_, import)| import.alias.as_ref() == Some(base.name()))
            {
                if let Some(target) = ctx.workspace.imported_document(&ctx.document.path, index) {
                    target.module_symbols(&mut out);
                }
            }
        }
        _ => {
            if let Some(value_type) = &base.type_desc {
                if !value_type.is_array && !value_type.is_mapping {
                    if let Some((document, definition)) = find_struct(ctx, &value_type.base) {
                        for field in &definition.fields {
                            out.push(field.symbol(&document.path, SymbolKind::StructField));
                        }
                    }
                    if let Some((document, contract)) = ctx.find_contract(&value_type.base) {
                        let mut visited = FxHashSet::default();
                        members_in_hierarchy(ctx, document, contract, &mut out, &mut visited);
                    }
                }
                out.extend(extension_functions(ctx, value_type));
            }
        }
    }
    out
}
