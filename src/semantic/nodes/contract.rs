//! Contract, library, and interface nodes.

use std::path::Path;

use smol_str::SmolStr;

use crate::base::Span;
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind, SymbolTarget, TypeDescriptor};
use crate::syntax::ast;

use super::function::ParsedFunction;
use super::items::{
    ParsedCustomType, ParsedEnum, ParsedError, ParsedEvent, ParsedStruct, ParsedUsing,
    ParsedVariable,
};

/// One entry of the `is` inheritance list, by name. Resolution to the base
/// contract happens lazily through the scope resolver, never at build time.
#[derive(Debug, Clone)]
pub struct InheritanceRef {
    pub name: SmolStr,
    pub span: Span,
}

#[derive(Debug)]
pub struct ParsedContract {
    pub name: SmolStr,
    pub name_span: Span,
    pub kind: ast::ContractKind,
    pub is_abstract: bool,
    pub inherits: Vec<InheritanceRef>,
    pub functions: Vec<ParsedFunction>,
    pub variables: Vec<ParsedVariable>,
    pub structs: Vec<ParsedStruct>,
    pub enums: Vec<ParsedEnum>,
    pub events: Vec<ParsedEvent>,
    pub errors: Vec<ParsedError>,
    pub usings: Vec<ParsedUsing>,
    pub custom_types: Vec<ParsedCustomType>,
    pub span: Span,
}

impl ParsedContract {
    pub fn from_definition(def: &ast::ContractDefinition) -> Self {
        let mut contract = Self {
            name: def.name.clone(),
            name_span: def.name_span,
            kind: def.kind,
            is_abstract: def.is_abstract,
            inherits: def
                .inherits
                .iter()
                .map(|i| InheritanceRef {
                    name: i.name.clone(),
                    span: i.span,
                })
                .collect(),
            functions: Vec::new(),
            variables: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            events: Vec::new(),
            errors: Vec::new(),
            usings: Vec::new(),
            custom_types: Vec::new(),
            span: def.span,
        };
        for member in &def.members {
            match member {
                ast::ContractMember::Function(f) => {
                    contract.functions.push(ParsedFunction::from_definition(f));
                }
                ast::ContractMember::Variable(v) => {
                    contract.variables.push(ParsedVariable::from_declaration(v));
                }
                ast::ContractMember::Struct(s) => {
                    contract.structs.push(ParsedStruct::from_definition(s));
                }
                ast::ContractMember::Enum(e) => {
                    contract.enums.push(ParsedEnum::from_definition(e));
                }
                ast::ContractMember::Event(e) => {
                    contract.events.push(ParsedEvent::from_definition(e));
                }
                ast::ContractMember::Error(e) => {
                    contract.errors.push(ParsedError::from_definition(e));
                }
                ast::ContractMember::Using(u) => {
                    contract.usings.push(ParsedUsing::from_directive(u));
                }
                ast::ContractMember::TypeDef(t) => {
                    contract
                        .custom_types
                        .push(ParsedCustomType::from_definition(t));
                }
            }
        }
        contract
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        match self.kind {
            ast::ContractKind::Contract => SymbolKind::Contract,
            ast::ContractKind::Library => SymbolKind::Library,
            ast::ContractKind::Interface => SymbolKind::Interface,
        }
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        let keyword = match self.kind {
            ast::ContractKind::Contract => "contract",
            ast::ContractKind::Library => "library",
            ast::ContractKind::Interface => "interface",
        };
        let detail = if self.is_abstract {
            format!("abstract {} {}", keyword, self.name)
        } else {
            format!("{} {}", keyword, self.name)
        };
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            self.symbol_kind(),
            Some(TypeDescriptor::new(self.name.clone(), false, false)),
            detail,
        )
    }

    pub fn function_named(&self, name: &str) -> Option<&ParsedFunction> {
        self.functions
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
    }

    pub fn variable_named(&self, name: &str) -> Option<&ParsedVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Direct member lookup: functions, then state variables, then type-like
    /// members. Inherited members are the resolver's concern.
    pub fn member_named(&self, name: &str, path: &Path) -> Option<ResolvedSymbol> {
        if let Some(function) = self.function_named(name) {
            return Some(function.symbol(path));
        }
        if let Some(variable) = self.variable_named(name) {
            return Some(variable.symbol(path, SymbolKind::StateVariable));
        }
        if let Some(s) = self.structs.iter().find(|s| s.name == name) {
            return Some(s.symbol(path));
        }
        if let Some(e) = self.enums.iter().find(|e| e.name == name) {
            return Some(e.symbol(path));
        }
        if let Some(e) = self.events.iter().find(|e| e.name == name) {
            return Some(e.symbol(path));
        }
        if let Some(e) = self.errors.iter().find(|e| e.name == name) {
            return Some(e.symbol(path));
        }
        if let Some(t) = self.custom_types.iter().find(|t| t.name == name) {
            return Some(t.symbol(path));
        }
        None
    }

    /// Every direct member as a resolved symbol, in declaration-kind order.
    pub fn member_symbols(&self, path: &Path, out: &mut Vec<ResolvedSymbol>) {
        for function in &self.functions {
            if function.name.is_some() {
                out.push(function.symbol(path));
            }
        }
        for variable in &self.variables {
            out.push(variable.symbol(path, SymbolKind::StateVariable));
        }
        for s in &self.structs {
            out.push(s.symbol(path));
        }
        for e in &self.enums {
            out.push(e.symbol(path));
        }
        for e in &self.events {
            out.push(e.symbol(path));
        }
        for e in &self.errors {
            out.push(e.symbol(path));
        }
        for t in &self.custom_types {
            out.push(t.symbol(path));
        }
    }

    /// The function or special member containing `offset`, if any.
    pub fn function_at(&self, offset: usize) -> Option<&ParsedFunction> {
        self.functions.iter().find(|f| f.span.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn contract(source: &str) -> ParsedContract {
        let unit = parse(source).expect("parse");
        for item in &unit.items {
            if let ast::SourceItem::Contract(def) = item {
                return ParsedContract::from_definition(def);
            }
        }
        panic!("no contract in source");
    }

    #[test]
    fn test_members_sorted_into_collections() {
        let c = contract(
            "contract C is Base {\n\
             uint256 public total;\n\
             struct S { uint256 a; }\n\
             enum E { A, B }\n\
             event Moved(uint256 amount);\n\
             error Denied();\n\
             function f() public {}\n\
             }",
        );
        assert_eq!(c.inherits.len(), 1);
        assert_eq!(c.variables.len(), 1);
        assert_eq!(c.structs.len(), 1);
        assert_eq!(c.enums.len(), 1);
        assert_eq!(c.events.len(), 1);
        assert_eq!(c.errors.len(), 1);
        assert_eq!(c.functions.len(), 1);
    }

    #[test]
    fn test_member_lookup_prefers_functions() {
        let c = contract("contract C { function f() public {} uint256 f2; }");
        let member = c.member_named("f", Path::new("/c.sol")).expect("member");
        assert_eq!(member.kind, SymbolKind::Function);
        let variable = c.member_named("f2", Path::new("/c.sol")).expect("member");
        assert_eq!(variable.kind, SymbolKind::StateVariable);
    }

    #[test]
    fn test_library_symbol_detail() {
        let c = contract("library Math { }");
        let symbol = c.symbol(Path::new("/m.sol"));
        assert_eq!(symbol.kind, SymbolKind::Library);
        assert_eq!(symbol.detail, "library Math");
    }
}
