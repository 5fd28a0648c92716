//! Find-all-references.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::semantic::nodes::{ParsedContract, ParsedDocument, ParsedFunction};
use crate::semantic::resolver::{ScopeContext, resolve_expression, resolve_name};
use crate::semantic::type_ref::{Location, SymbolTarget};
use crate::semantic::workspace::Workspace;

use super::goto::{resolve_type_name, symbol_at};

/// All references to the symbol under the cursor: the declaration first,
/// then every use in the declaring document and in every document that
/// reaches it through imports. Identity is `{path, name, span}` equality,
/// so references survive document rebuilds.
pub fn find_references(workspace: &Workspace, path: &Path, offset: usize) -> Vec<Location> {
    let Some(symbol) = symbol_at(workspace, path, offset) else {
        return Vec::new();
    };
    let target = symbol.target;

    let mut scan_paths = vec![target.path.clone()];
    for referencing in workspace.documents_that_reference(&target.path) {
        if !scan_paths.contains(&referencing) {
            scan_paths.push(referencing);
        }
    }

    let mut locations = vec![target.location()];
    for scan_path in &scan_paths {
        if let Some(document) = workspace.get(scan_path) {
            scan_document(workspace, document, &target, &mut locations);
        }
    }

    let mut seen = FxHashSet::default();
    locations.retain(|location| seen.insert(location.clone()));
    locations
}

/// Ask every node of one document whether it resolves to the target.
fn scan_document(
    workspace: &Workspace,
    document: &ParsedDocument,
    target: &SymbolTarget,
    out: &mut Vec<Location>,
) {
    // Import symbol lists reference the declarations they pull in.
    for (index, import) in document.imports.iter().enumerate() {
        let Some(imported) = workspace.imported_document(&document.path, index) else {
            continue;
        };
        for symbol in &import.symbols {
            if let Some(resolved) = imported.module_symbol_named(&symbol.name) {
                if resolved.target == *target {
                    out.push(Location::new(document.path.clone(), symbol.span));
                }
            }
        }
    }

    for contract in &document.contracts {
        scan_contract(workspace, document, contract, target, out);
    }
    for function in &document.functions {
        scan_function(workspace, document, None, function, target, out);
    }
    for constant in &document.constants {
        let ctx = ScopeContext::new(workspace, document, None, None, constant.span.start);
        check_type(&ctx, document, &constant.type_name, target, out);
    }
    for using in &document.usings {
        scan_using(workspace, document, None, using, target, out);
    }
}

fn scan_contract(
    workspace: &Workspace,
    document: &ParsedDocument,
    contract: &ParsedContract,
    target: &SymbolTarget,
    out: &mut Vec<Location>,
) {
    let ctx = ScopeContext::new(
        workspace,
        document,
        Some(contract),
        None,
        contract.span.start,
    );

    for base in &contract.inherits {
        if let Some((base_doc, base_contract)) = ctx.find_contract(&base.name) {
            if base_contract.symbol(&base_doc.path).target == *target {
                out.push(Location::new(document.path.clone(), base.span));
            }
        }
    }
    for variable in &contract.variables {
        check_type(&ctx, document, &variable.type_name, target, out);
    }
    for s in &contract.structs {
        for field in &s.fields {
            check_type(&ctx, document, &field.type_name, target, out);
        }
    }
    for using in &contract.usings {
        scan_using(workspace, document, Some(contract), using, target, out);
    }
    for function in &contract.functions {
        scan_function(workspace, document, Some(contract), function, target, out);
    }
}

fn scan_function(
    workspace: &Workspace,
    document: &ParsedDocument,
    contract: Option<&ParsedContract>,
    function: &ParsedFunction,
    target: &SymbolTarget,
    out: &mut Vec<Location>,
) {
    let ctx = ScopeContext::new(
        workspace,
        document,
        contract,
        Some(function),
        function.span.start,
    );

    for param in &function.params {
        check_type(&ctx, document, &param.type_name, target, out);
    }
    for return_type in &function.return_types {
        check_type(&ctx, document, return_type, target, out);
    }
    for invocation in &function.modifiers {
        if let Some(resolved) = resolve_name(&ctx, &invocation.name) {
            if resolved.target == *target {
                out.push(Location::new(document.path.clone(), invocation.span));
            }
        }
    }

    let body = function.body_index();
    for local in &body.locals {
        let ctx = ScopeContext::new(
            workspace,
            document,
            contract,
            Some(function),
            local.variable.span.start,
        );
        check_type(&ctx, document, &local.variable.type_name, target, out);
    }
    for chain in &body.expressions {
        for link in chain.chain() {
            let ctx = ScopeContext::new(
                workspace,
                document,
                contract,
                Some(function),
                link.name_span.start,
            );
            if let Some(resolved) = resolve_expression(&ctx, link) {
                if resolved.target == *target {
                    out.push(Location::new(document.path.clone(), link.name_span));
                }
            }
        }
    }
}

fn scan_using(
    workspace: &Workspace,
    document: &ParsedDocument,
    contract: Option<&ParsedContract>,
    using: &crate::semantic::nodes::ParsedUsing,
    target: &SymbolTarget,
    out: &mut Vec<Location>,
) {
    let ctx = ScopeContext::new(workspace, document, contract, None, using.span.start);
    if let Some((library_doc, library)) = ctx.find_contract(&using.library) {
        if library.symbol(&library_doc.path).target == *target {
            out.push(Location::new(document.path.clone(), using.library_span));
        }
    }
    if let Some(target_type) = &using.target {
        check_type(&ctx, document, target_type, target, out);
    }
}

fn check_type(
    ctx: &ScopeContext<'_>,
    document: &ParsedDocument,
    type_name: &crate::syntax::ast::TypeName,
    target: &SymbolTarget,
    out: &mut Vec<Location>,
) {
    if let Some(resolved) = resolve_type_name(ctx, type_name) {
        if resolved.target == *target {
            out.push(Location::new(document.path.clone(), type_name.span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::AnalysisHost;
    use std::path::PathBuf;

    #[test]
    fn test_references_include_declaration_first() {
        let source = "contract C { uint256 total; function f() public { total = total; } }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("total;").unwrap();
        let references = host.analysis().find_references(Path::new("/c.sol"), offset);
        assert!(references.len() >= 3);
        assert_eq!(references[0].span.start, offset);
    }

    #[test]
    fn test_references_follow_importers_not_strangers() {
        let a = "struct S { uint256 v; }";
        let b = "import \"/a.sol\";\ncontract B { S state; }";
        let c = "import \"/b.sol\";\ncontract C { S other; }";
        let d = "contract D {}";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/a.sol"), a);
        host.set_file_content(Path::new("/b.sol"), b);
        host.set_file_content(Path::new("/c.sol"), c);
        host.set_file_content(Path::new("/d.sol"), d);

        let offset = a.find("S").unwrap();
        let references = host.analysis().find_references(Path::new("/a.sol"), offset);

        let paths: Vec<_> = references.iter().map(|r| r.path.clone()).collect();
        assert!(paths.contains(&PathBuf::from("/a.sol")));
        assert!(paths.contains(&PathBuf::from("/b.sol")));
        assert!(paths.contains(&PathBuf::from("/c.sol")));
        assert!(!paths.contains(&PathBuf::from("/d.sol")));
    }

    #[test]
    fn test_references_are_deduplicated() {
        let source = "contract C { uint256 x; function f() public { x = 1; } }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("x;").unwrap();
        let references = host.analysis().find_references(Path::new("/c.sol"), offset);
        let mut unique = references.clone();
        unique.dedup();
        assert_eq!(references.len(), unique.len());
    }
}
