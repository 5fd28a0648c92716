//! Go-to-definition.

use std::path::Path;

use crate::base::Span;
use crate::semantic::nodes::{ParsedDocument, SelectedNode, Selection};
use crate::semantic::resolver::{
    ScopeContext, resolve_expression, resolve_name,
};
use crate::semantic::type_ref::{Location, ResolvedSymbol, TypeReference};
use crate::semantic::workspace::Workspace;
use crate::syntax::ast;

/// Resolve the cursor to its declaration.
///
/// An import specifier jumps to the start of the imported file; everything
/// else resolves through the scope resolver. One entry per result: resolved
/// with a location, or an unresolved marker when the cursor sat on a name
/// that binds to nothing.
pub fn goto_definition(workspace: &Workspace, path: &Path, offset: usize) -> Vec<TypeReference> {
    let Some(document) = workspace.get(path) else {
        return Vec::new();
    };
    let Some(selection) = document.select_at(offset) else {
        return Vec::new();
    };

    if let SelectedNode::Import(import) = &selection.node {
        let Some(index) = document
            .imports
            .iter()
            .position(|i| std::ptr::eq(i, *import))
        else {
            return Vec::new();
        };
        return match workspace.imported_document(path, index) {
            Some(target) => vec![TypeReference {
                is_selected: true,
                location: Some(Location::new(target.path.clone(), Span::new(0, 0))),
                target: None,
            }],
            None => vec![TypeReference::unresolved()],
        };
    }

    let ctx = ScopeContext::new(
        workspace,
        document,
        selection.contract,
        selection.function,
        offset,
    );
    match symbol_for_selection(&ctx, document, &selection) {
        Some(symbol) => vec![TypeReference::resolved(symbol.target)],
        None => match selection.node {
            SelectedNode::Document => Vec::new(),
            _ => vec![TypeReference::unresolved()],
        },
    }
}

/// The symbol the cursor denotes: a use resolves to its declaration, a
/// declaration resolves to itself.
pub(crate) fn symbol_at(
    workspace: &Workspace,
    path: &Path,
    offset: usize,
) -> Option<ResolvedSymbol> {
    let document = workspace.get(path)?;
    let selection = document.select_at(offset)?;
    let ctx = ScopeContext::new(
        workspace,
        document,
        selection.contract,
        selection.function,
        offset,
    );
    symbol_for_selection(&ctx, document, &selection)
}

pub(crate) fn symbol_for_selection(
    ctx: &ScopeContext<'_>,
    document: &ParsedDocument,
    selection: &Selection<'_>,
) -> Option<ResolvedSymbol> {
    let path = &document.path;
    match &selection.node {
        SelectedNode::Import(_) | SelectedNode::Document => None,
        SelectedNode::ImportSymbol { import, symbol } => {
            let index = document
                .imports
                .iter()
                .position(|i| std::ptr::eq(i, *import))?;
            let target = ctx.workspace.imported_document(path, index)?;
            target.module_symbol_named(&symbol.name)
        }
        SelectedNode::Contract(contract) => Some(contract.symbol(path)),
        SelectedNode::Inheritance { base, .. } => {
            let (base_doc, base_contract) = ctx.find_contract(&base.name)?;
            Some(base_contract.symbol(&base_doc.path))
        }
        SelectedNode::Function(function) => Some(function.symbol(path)),
        SelectedNode::Modifier { invocation, .. } => resolve_name(ctx, &invocation.name),
        SelectedNode::Variable { variable, kind } => Some(variable.symbol(path, *kind)),
        SelectedNode::TypeName(type_name) => resolve_type_name(ctx, type_name),
        SelectedNode::Struct(s) => Some(s.symbol(path)),
        SelectedNode::Enum(e) => Some(e.symbol(path)),
        SelectedNode::EnumValue { owner, value } => owner.value_symbol(path, &value.name),
        SelectedNode::Event(e) => Some(e.symbol(path)),
        SelectedNode::Error(e) => Some(e.symbol(path)),
        SelectedNode::CustomType(t) => Some(t.symbol(path)),
        SelectedNode::Using(using) => {
            let (library_doc, library) = ctx.find_contract(&using.library)?;
            Some(library.symbol(&library_doc.path))
        }
        SelectedNode::Expression(expression) => resolve_expression(ctx, expression).cloned(),
    }
}

/// Resolve a type annotation to the declaration it names. Elementary types
/// name nothing; dotted names (`L.T`) resolve the owner first.
pub(crate) fn resolve_type_name(
    ctx: &ScopeContext<'_>,
    type_name: &ast::TypeName,
) -> Option<ResolvedSymbol> {
    let base: &str = &type_name.base;
    if is_elementary(base) {
        return None;
    }
    if let Some((owner, member)) = base.split_once('.') {
        let (owner_doc, owner_contract) = ctx.find_contract(owner)?;
        return owner_contract.member_named(member, &owner_doc.path);
    }
    resolve_name(ctx, base)
}

fn is_elementary(name: &str) -> bool {
    matches!(name, "bool" | "address" | "string")
        || name.starts_with("uint")
        || name.starts_with("int")
        || name.starts_with("bytes")
        || name == "byte"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::AnalysisHost;
    use std::path::PathBuf;

    #[test]
    fn test_goto_state_variable_from_use() {
        let source = "contract C { uint256 total; function f() public { total = 1; } }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("total = 1").unwrap();
        let results = host.analysis().goto_definition(Path::new("/c.sol"), offset);
        assert_eq!(results.len(), 1);
        let target = results[0].target.as_ref().expect("resolved");
        assert_eq!(target.name, "total");
        let decl_offset = source.find("total;").unwrap();
        assert_eq!(target.span.start, decl_offset);
    }

    #[test]
    fn test_goto_across_files() {
        let a = "contract Token { function mint() public {} }";
        let b = "import \"/a.sol\";\ncontract B is Token {}";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/a.sol"), a);
        host.set_file_content(Path::new("/b.sol"), b);

        let offset = b.find("Token {}").unwrap();
        let results = host.analysis().goto_definition(Path::new("/b.sol"), offset);
        let target = results[0].target.as_ref().expect("resolved");
        assert_eq!(target.path, PathBuf::from("/a.sol"));
        assert_eq!(target.name, "Token");
    }

    #[test]
    fn test_goto_import_specifier_jumps_to_file() {
        let a = "contract A {}";
        let b = "import \"/a.sol\";\ncontract B {}";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/a.sol"), a);
        host.set_file_content(Path::new("/b.sol"), b);

        let offset = b.find("/a.sol").unwrap();
        let results = host.analysis().goto_definition(Path::new("/b.sol"), offset);
        let location = results[0].location.as_ref().expect("location");
        assert_eq!(location.path, PathBuf::from("/a.sol"));
        assert_eq!(location.span, Span::new(0, 0));
    }

    #[test]
    fn test_goto_type_annotation() {
        let source = "contract C { struct S { uint256 v; } S state; }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("S state").unwrap();
        let results = host.analysis().goto_definition(Path::new("/c.sol"), offset);
        let target = results[0].target.as_ref().expect("resolved");
        assert_eq!(target.name, "S");
    }

    #[test]
    fn test_goto_on_unknown_name_is_unresolved() {
        let source = "contract C { function f() public { ghost; } }";
        let mut host = AnalysisHost::new();
        host.set_file_content(Path::new("/c.sol"), source);

        let offset = source.find("ghost").unwrap();
        let results = host.analysis().goto_definition(Path::new("/c.sol"), offset);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_selected);
        assert!(results[0].target.is_none());
    }
}
