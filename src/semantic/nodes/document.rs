//! The per-file semantic tree and cursor selection.

use std::path::{Path, PathBuf};

use crate::base::{LineIndex, Span};
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind};
use crate::syntax::ast;

use super::contract::{InheritanceRef, ParsedContract};
use super::expression::ParsedExpression;
use super::function::{ParsedFunction, ParsedModifierInvocation};
use super::items::{
    ParsedCustomType, ParsedEnum, ParsedEnumValue, ParsedError, ParsedEvent, ParsedImport,
    ParsedImportSymbol, ParsedStruct, ParsedUsing, ParsedVariable,
};

/// The semantic tree of one file version.
///
/// Collections are disjoint per declaration kind and ordered as declared.
/// The tree never changes after construction; a text edit builds a new one.
#[derive(Debug)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub text: String,
    pub line_index: LineIndex,
    pub span: Span,
    pub imports: Vec<ParsedImport>,
    pub contracts: Vec<ParsedContract>,
    pub functions: Vec<ParsedFunction>,
    pub structs: Vec<ParsedStruct>,
    pub enums: Vec<ParsedEnum>,
    pub events: Vec<ParsedEvent>,
    pub errors: Vec<ParsedError>,
    pub constants: Vec<ParsedVariable>,
    pub custom_types: Vec<ParsedCustomType>,
    pub usings: Vec<ParsedUsing>,
}

impl ParsedDocument {
    /// A document with no declarations, for text nothing could be parsed of.
    pub fn empty(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            line_index: LineIndex::new(&text),
            span: Span::new(0, text.len()),
            text,
            imports: Vec::new(),
            contracts: Vec::new(),
            functions: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            events: Vec::new(),
            errors: Vec::new(),
            constants: Vec::new(),
            custom_types: Vec::new(),
            usings: Vec::new(),
        }
    }

    /// Lower a parsed source unit into the semantic tree.
    pub fn from_unit(path: impl Into<PathBuf>, text: impl Into<String>, unit: &ast::SourceUnit) -> Self {
        let mut document = Self::empty(path, text);
        for item in &unit.items {
            match item {
                ast::SourceItem::Pragma(_) => {}
                ast::SourceItem::Import(directive) => {
                    document.imports.push(ParsedImport::from_directive(directive));
                }
                ast::SourceItem::Contract(def) => {
                    document.contracts.push(ParsedContract::from_definition(def));
                }
                ast::SourceItem::Function(def) => {
                    document.functions.push(ParsedFunction::from_definition(def));
                }
                ast::SourceItem::Variable(decl) => {
                    document
                        .constants
                        .push(ParsedVariable::from_declaration(decl));
                }
                ast::SourceItem::Struct(def) => {
                    document.structs.push(ParsedStruct::from_definition(def));
                }
                ast::SourceItem::Enum(def) => {
                    document.enums.push(ParsedEnum::from_definition(def));
                }
                ast::SourceItem::Event(def) => {
                    document.events.push(ParsedEvent::from_definition(def));
                }
                ast::SourceItem::Error(def) => {
                    document.errors.push(ParsedError::from_definition(def));
                }
                ast::SourceItem::Using(directive) => {
                    document.usings.push(ParsedUsing::from_directive(directive));
                }
                ast::SourceItem::TypeDef(def) => {
                    document
                        .custom_types
                        .push(ParsedCustomType::from_definition(def));
                }
            }
        }
        document
    }

    pub fn contract_named(&self, name: &str) -> Option<&ParsedContract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Module-level symbol lookup, in declaration-kind order.
    pub fn module_symbol_named(&self, name: &str) -> Option<ResolvedSymbol> {
        if let Some(contract) = self.contract_named(name) {
            return Some(contract.symbol(&self.path));
        }
        if let Some(function) = self
            .functions
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
        {
            return Some(function.symbol(&self.path));
        }
        if let Some(s) = self.structs.iter().find(|s| s.name == name) {
            return Some(s.symbol(&self.path));
        }
        if let Some(e) = self.enums.iter().find(|e| e.name == name) {
            return Some(e.symbol(&self.path));
        }
        if let Some(e) = self.events.iter().find(|e| e.name == name) {
            return Some(e.symbol(&self.path));
        }
        if let Some(e) = self.errors.iter().find(|e| e.name == name) {
            return Some(e.symbol(&self.path));
        }
        if let Some(c) = self.constants.iter().find(|c| c.name == name) {
            return Some(c.symbol(&self.path, SymbolKind::Constant));
        }
        if let Some(t) = self.custom_types.iter().find(|t| t.name == name) {
            return Some(t.symbol(&self.path));
        }
        None
    }

    /// Every module-level symbol, for completion.
    pub fn module_symbols(&self, out: &mut Vec<ResolvedSymbol>) {
        for contract in &self.contracts {
            out.push(contract.symbol(&self.path));
        }
        for function in &self.functions {
            if function.name.is_some() {
                out.push(function.symbol(&self.path));
            }
        }
        for s in &self.structs {
            out.push(s.symbol(&self.path));
        }
        for e in &self.enums {
            out.push(e.symbol(&self.path));
        }
        for e in &self.events {
            out.push(e.symbol(&self.path));
        }
        for e in &self.errors {
            out.push(e.symbol(&self.path));
        }
        for c in &self.constants {
            out.push(c.symbol(&self.path, SymbolKind::Constant));
        }
        for t in &self.custom_types {
            out.push(t.symbol(&self.path));
        }
    }

    /// The contract whose span contains `offset`.
    pub fn contract_at(&self, offset: usize) -> Option<&ParsedContract> {
        self.contracts.iter().find(|c| c.span.contains(offset))
    }

    /// Select the node under a cursor offset.
    ///
    /// Returns `None` when the offset is past the end of the text. Probe
    /// order is fixed: imports, contracts (descending into members),
    /// free functions, structs, enums, events, errors, constants, custom
    /// types, using directives, then the document itself as the fallback.
    pub fn select_at(&self, offset: usize) -> Option<Selection<'_>> {
        if offset > self.text.len() {
            return None;
        }

        for import in &self.imports {
            if !import.span.contains(offset) {
                continue;
            }
            for symbol in &import.symbols {
                if symbol.span.contains(offset) {
                    return Some(Selection::plain(SelectedNode::ImportSymbol {
                        import,
                        symbol,
                    }));
                }
            }
            return Some(Selection::plain(SelectedNode::Import(import)));
        }

        for contract in &self.contracts {
            if contract.span.contains(offset) {
                return Some(self.select_in_contract(contract, offset));
            }
        }

        for function in &self.functions {
            if function.span.contains(offset) {
                return Some(self.select_in_function(None, function, offset));
            }
        }
        if let Some(selection) = probe_structs(&self.structs, offset, None) {
            return Some(selection);
        }
        if let Some(selection) = probe_enums(&self.enums, offset, None) {
            return Some(selection);
        }
        if let Some(selection) = probe_events(&self.events, offset, None) {
            return Some(selection);
        }
        if let Some(selection) = probe_errors(&self.errors, offset, None) {
            return Some(selection);
        }
        for constant in &self.constants {
            if constant.span.contains(offset) {
                return Some(Selection::plain(probe_variable(
                    constant,
                    offset,
                    SymbolKind::Constant,
                )));
            }
        }
        for custom_type in &self.custom_types {
            if custom_type.span.contains(offset) {
                if custom_type.underlying.span.contains(offset) {
                    return Some(Selection::plain(SelectedNode::TypeName(
                        &custom_type.underlying,
                    )));
                }
                return Some(Selection::plain(SelectedNode::CustomType(custom_type)));
            }
        }
        if let Some(selection) = probe_usings(&self.usings, offset, None) {
            return Some(selection);
        }

        Some(Selection::plain(SelectedNode::Document))
    }

    fn select_in_contract<'a>(
        &'a self,
        contract: &'a ParsedContract,
        offset: usize,
    ) -> Selection<'a> {
        for function in &contract.functions {
            if function.span.contains(offset) {
                return self.select_in_function(Some(contract), function, offset);
            }
        }
        for variable in &contract.variables {
            if variable.span.contains(offset) {
                return Selection {
                    contract: Some(contract),
                    function: None,
                    node: probe_variable(variable, offset, SymbolKind::StateVariable),
                };
            }
        }
        if let Some(selection) = probe_structs(&contract.structs, offset, Some(contract)) {
            return selection;
        }
        if let Some(selection) = probe_enums(&contract.enums, offset, Some(contract)) {
            return selection;
        }
        if let Some(selection) = probe_events(&contract.events, offset, Some(contract)) {
            return selection;
        }
        if let Some(selection) = probe_errors(&contract.errors, offset, Some(contract)) {
            return selection;
        }
        for custom_type in &contract.custom_types {
            if custom_type.span.contains(offset) {
                return Selection {
                    contract: Some(contract),
                    function: None,
                    node: SelectedNode::CustomType(custom_type),
                };
            }
        }
        if let Some(selection) = probe_usings(&contract.usings, offset, Some(contract)) {
            return selection;
        }
        for base in &contract.inherits {
            if base.span.contains(offset) {
                return Selection {
                    contract: Some(contract),
                    function: None,
                    node: SelectedNode::Inheritance { contract, base },
                };
            }
        }
        Selection {
            contract: Some(contract),
            function: None,
            node: SelectedNode::Contract(contract),
        }
    }

    fn select_in_function<'a>(
        &'a self,
        contract: Option<&'a ParsedContract>,
        function: &'a ParsedFunction,
        offset: usize,
    ) -> Selection<'a> {
        let wrap = |node| Selection {
            contract,
            function: Some(function),
            node,
        };

        for param in function.params.iter().chain(&function.returns) {
            if param.span.contains(offset) {
                return wrap(probe_variable(param, offset, SymbolKind::Parameter));
            }
        }
        // Unnamed returns have no binding to select, only a type annotation.
        for return_type in &function.return_types {
            if return_type.span.contains(offset) {
                return wrap(SelectedNode::TypeName(return_type));
            }
        }
        for invocation in &function.modifiers {
            if invocation.span.contains(offset) {
                return wrap(SelectedNode::Modifier {
                    function,
                    invocation,
                });
            }
        }

        let body = function.body_index();
        for local in &body.locals {
            if local.variable.type_name.span.contains(offset) {
                return wrap(SelectedNode::TypeName(&local.variable.type_name));
            }
            if local.variable.name_span.contains(offset) {
                return wrap(SelectedNode::Variable {
                    variable: &local.variable,
                    kind: SymbolKind::LocalVariable,
                });
            }
        }
        if let Some(expression) = function.expression_at(offset) {
            return wrap(SelectedNode::Expression(expression));
        }

        // The function itself is the target only on its name; a literal or
        // blank spot in the body names nothing.
        if function
            .name_span
            .is_some_and(|name_span| name_span.contains(offset))
        {
            return wrap(SelectedNode::Function(function));
        }
        wrap(SelectedNode::Document)
    }
}

/// The node a cursor offset lands on, with its owning scope.
#[derive(Debug)]
pub struct Selection<'a> {
    pub contract: Option<&'a ParsedContract>,
    pub function: Option<&'a ParsedFunction>,
    pub node: SelectedNode<'a>,
}

impl<'a> Selection<'a> {
    fn plain(node: SelectedNode<'a>) -> Self {
        Self {
            contract: None,
            function: None,
            node,
        }
    }
}

#[derive(Debug)]
pub enum SelectedNode<'a> {
    Import(&'a ParsedImport),
    ImportSymbol {
        import: &'a ParsedImport,
        symbol: &'a ParsedImportSymbol,
    },
    Contract(&'a ParsedContract),
    Inheritance {
        contract: &'a ParsedContract,
        base: &'a InheritanceRef,
    },
    Function(&'a ParsedFunction),
    Modifier {
        function: &'a ParsedFunction,
        invocation: &'a ParsedModifierInvocation,
    },
    Variable {
        variable: &'a ParsedVariable,
        kind: SymbolKind,
    },
    /// A type annotation position (`MyStruct x`, `using L for MyType`).
    TypeName(&'a ast::TypeName),
    Struct(&'a ParsedStruct),
    Enum(&'a ParsedEnum),
    EnumValue {
        owner: &'a ParsedEnum,
        value: &'a ParsedEnumValue,
    },
    Event(&'a ParsedEvent),
    Error(&'a ParsedError),
    CustomType(&'a ParsedCustomType),
    Using(&'a ParsedUsing),
    Expression(&'a ParsedExpression),
    Document,
}

fn probe_variable<'a>(
    variable: &'a ParsedVariable,
    offset: usize,
    kind: SymbolKind,
) -> SelectedNode<'a> {
    if variable.type_name.span.contains(offset) && !variable.name_span.contains(offset) {
        SelectedNode::TypeName(&variable.type_name)
    } else {
        SelectedNode::Variable { variable, kind }
    }
}

fn probe_structs<'a>(
    structs: &'a [ParsedStruct],
    offset: usize,
    contract: Option<&'a ParsedContract>,
) -> Option<Selection<'a>> {
    for s in structs {
        if !s.span.contains(offset) {
            continue;
        }
        for field in &s.fields {
            if field.span.contains(offset) {
                return Some(Selection {
                    contract,
                    function: None,
                    node: probe_variable(field, offset, SymbolKind::StructField),
                });
            }
        }
        return Some(Selection {
            contract,
            function: None,
            node: SelectedNode::Struct(s),
        });
    }
    None
}

fn probe_enums<'a>(
    enums: &'a [ParsedEnum],
    offset: usize,
    contract: Option<&'a ParsedContract>,
) -> Option<Selection<'a>> {
    for e in enums {
        if !e.span.contains(offset) {
            continue;
        }
        for value in &e.values {
            if value.span.contains(offset) {
                return Some(Selection {
                    contract,
                    function: None,
                    node: SelectedNode::EnumValue { owner: e, value },
                });
            }
        }
        return Some(Selection {
            contract,
            function: None,
            node: SelectedNode::Enum(e),
        });
    }
    None
}

fn probe_events<'a>(
    events: &'a [ParsedEvent],
    offset: usize,
    contract: Option<&'a ParsedContract>,
) -> Option<Selection<'a>> {
    for e in events {
        if !e.span.contains(offset) {
            continue;
        }
        for param in &e.params {
            if param.span.contains(offset) {
                return Some(Selection {
                    contract,
                    function: None,
                    node: probe_variable(param, offset, SymbolKind::Parameter),
                });
            }
        }
        return Some(Selection {
            contract,
            function: None,
            node: SelectedNode::Event(e),
        });
    }
    None
}

fn probe_errors<'a>(
    errors: &'a [ParsedError],
    offset: usize,
    contract: Option<&'a ParsedContract>,
) -> Option<Selection<'a>> {
    for e in errors {
        if !e.span.contains(offset) {
            continue;
        }
        for param in &e.params {
            if param.span.contains(offset) {
                return Some(Selection {
                    contract,
                    function: None,
                    node: probe_variable(param, offset, SymbolKind::Parameter),
                });
            }
        }
        return Some(Selection {
            contract,
            function: None,
            node: SelectedNode::Error(e),
        });
    }
    None
}

fn probe_usings<'a>(
    usings: &'a [ParsedUsing],
    offset: usize,
    contract: Option<&'a ParsedContract>,
) -> Option<Selection<'a>> {
    for using in usings {
        if !using.span.contains(offset) {
            continue;
        }
        if let Some(target) = &using.target {
            if target.span.contains(offset) {
                return Some(Selection {
                    contract,
                    function: None,
                    node: SelectedNode::TypeName(target),
                });
            }
        }
        return Some(Selection {
            contract,
            function: None,
            node: SelectedNode::Using(using),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn document(source: &str) -> ParsedDocument {
        let unit = parse(source).expect("parse");
        ParsedDocument::from_unit(Path::new("/doc.sol"), source, &unit)
    }

    #[test]
    fn test_select_outside_text_is_none() {
        let doc = document("contract C {}");
        assert!(doc.select_at(1000).is_none());
    }

    #[test]
    fn test_select_import_specifier() {
        let source = "import \"./Other.sol\";\ncontract C {}";
        let doc = document(source);
        let offset = source.find("Other").unwrap();
        match doc.select_at(offset).unwrap().node {
            SelectedNode::Import(import) => assert_eq!(import.specifier, "./Other.sol"),
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_select_state_variable_and_its_type() {
        let source = "contract C { MyType public value; }";
        let doc = document(source);

        let type_offset = source.find("MyType").unwrap();
        match doc.select_at(type_offset).unwrap().node {
            SelectedNode::TypeName(type_name) => assert_eq!(type_name.base, "MyType"),
            other => panic!("unexpected selection: {other:?}"),
        }

        let name_offset = source.find("value").unwrap();
        let selection = doc.select_at(name_offset).unwrap();
        assert!(selection.contract.is_some());
        match selection.node {
            SelectedNode::Variable { variable, kind } => {
                assert_eq!(variable.name, "value");
                assert_eq!(kind, SymbolKind::StateVariable);
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_select_expression_inside_function_body() {
        let source = "contract C { uint256 total; function f() public { total = 1; } }";
        let doc = document(source);
        let offset = source.find("total = 1").unwrap();
        let selection = doc.select_at(offset).unwrap();
        assert!(selection.function.is_some());
        match selection.node {
            SelectedNode::Expression(expression) => assert_eq!(expression.name, "total"),
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_select_inheritance_entry() {
        let source = "contract C is Base {}";
        let doc = document(source);
        let offset = source.find("Base").unwrap();
        match doc.select_at(offset).unwrap().node {
            SelectedNode::Inheritance { base, .. } => assert_eq!(base.name, "Base"),
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_select_enum_value() {
        let source = "contract C { enum State { Idle, Busy } }";
        let doc = document(source);
        let offset = source.find("Busy").unwrap();
        match doc.select_at(offset).unwrap().node {
            SelectedNode::EnumValue { owner, value } => {
                assert_eq!(owner.name, "State");
                assert_eq!(value.name, "Busy");
            }
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_select_literal_in_body_is_document() {
        let source = "contract C { function f() public { 42; } }";
        let doc = document(source);
        let offset = source.find("42").unwrap();
        let selection = doc.select_at(offset).unwrap();
        assert!(selection.function.is_some());
        assert!(matches!(selection.node, SelectedNode::Document));
    }

    #[test]
    fn test_select_unnamed_return_type() {
        let source = "contract C { struct S { uint256 v; } function f() public returns (S) {} }";
        let doc = document(source);
        let offset = source.find("(S)").unwrap() + 1;
        match doc.select_at(offset).unwrap().node {
            SelectedNode::TypeName(type_name) => assert_eq!(type_name.base, "S"),
            other => panic!("unexpected selection: {other:?}"),
        }
    }

    #[test]
    fn test_fallback_is_document() {
        let source = "contract C {}          \n";
        let doc = document(source);
        let selection = doc.select_at(source.len() - 1).unwrap();
        assert!(matches!(selection.node, SelectedNode::Document));
    }
}
