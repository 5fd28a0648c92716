//! Leaf declaration nodes: variables, structs, enums, events, errors,
//! custom value types, using directives, and imports.

use std::path::Path;

use smol_str::SmolStr;

use crate::base::Span;
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind, SymbolTarget, TypeDescriptor};
use crate::syntax::ast;

/// Render a type the way it was written.
pub fn type_display(type_name: &ast::TypeName) -> String {
    let mut out = String::new();
    if type_name.is_mapping {
        out.push_str("mapping(... => ");
        out.push_str(&type_name.base);
        out.push(')');
    } else {
        out.push_str(&type_name.base);
        if type_name.is_payable {
            out.push_str(" payable");
        }
    }
    if type_name.is_array {
        out.push_str("[]");
    }
    out
}

/// A typed named slot: state variable, parameter, return value, local,
/// struct field, or file-level constant. The distinction lives in the
/// `SymbolKind` the owner passes to [`ParsedVariable::symbol`].
#[derive(Debug, Clone)]
pub struct ParsedVariable {
    pub name: SmolStr,
    pub name_span: Span,
    pub type_name: ast::TypeName,
    pub attributes: Vec<SmolStr>,
    pub span: Span,
}

impl ParsedVariable {
    pub fn from_declaration(decl: &ast::VariableDeclaration) -> Self {
        Self {
            name: decl.name.clone(),
            name_span: decl.name_span,
            type_name: decl.type_name.clone(),
            attributes: decl.attributes.clone(),
            span: decl.span,
        }
    }

    pub fn from_parameter(param: &ast::Parameter) -> Option<Self> {
        let name = param.name.clone()?;
        let name_span = param.name_span?;
        Some(Self {
            name,
            name_span,
            type_name: param.type_name.clone(),
            attributes: Vec::new(),
            span: param.span,
        })
    }

    pub fn from_field(field: &ast::StructField) -> Self {
        Self {
            name: field.name.clone(),
            name_span: field.name_span,
            type_name: field.type_name.clone(),
            attributes: Vec::new(),
            span: field.span,
        }
    }

    pub fn type_desc(&self) -> TypeDescriptor {
        TypeDescriptor::from_type_name(&self.type_name)
    }

    pub fn is_constant(&self) -> bool {
        self.attributes.iter().any(|a| a == "constant" || a == "immutable")
    }

    pub fn symbol(&self, path: &Path, kind: SymbolKind) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            kind,
            Some(self.type_desc()),
            format!("{} {}", type_display(&self.type_name), self.name),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParsedStruct {
    pub name: SmolStr,
    pub name_span: Span,
    pub fields: Vec<ParsedVariable>,
    pub span: Span,
}

impl ParsedStruct {
    pub fn from_definition(def: &ast::StructDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            fields: def.fields.iter().map(ParsedVariable::from_field).collect(),
            span: def.span,
        }
    }

    pub fn field_named(&self, name: &str) -> Option<&ParsedVariable> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            SymbolKind::Struct,
            Some(TypeDescriptor::new(self.name.clone(), false, false)),
            format!("struct {}", self.name),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParsedEnumValue {
    pub name: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParsedEnum {
    pub name: SmolStr,
    pub name_span: Span,
    pub values: Vec<ParsedEnumValue>,
    pub span: Span,
}

impl ParsedEnum {
    pub fn from_definition(def: &ast::EnumDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            values: def
                .values
                .iter()
                .map(|v| ParsedEnumValue {
                    name: v.name.clone(),
                    span: v.span,
                })
                .collect(),
            span: def.span,
        }
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            SymbolKind::Enum,
            Some(TypeDescriptor::new(self.name.clone(), false, false)),
            format!("enum {}", self.name),
        )
    }

    pub fn value_symbol(&self, path: &Path, name: &str) -> Option<ResolvedSymbol> {
        let value = self.values.iter().find(|v| v.name == name)?;
        Some(ResolvedSymbol::new(
            SymbolTarget::new(path, value.name.clone(), value.span),
            SymbolKind::EnumValue,
            Some(TypeDescriptor::new(self.name.clone(), false, false)),
            format!("{}.{}", self.name, value.name),
        ))
    }
}

fn params_display(params: &[ParsedVariable]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", type_display(&p.type_name), p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct ParsedEvent {
    pub name: SmolStr,
    pub name_span: Span,
    pub params: Vec<ParsedVariable>,
    pub span: Span,
}

impl ParsedEvent {
    pub fn from_definition(def: &ast::EventDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            params: def
                .params
                .iter()
                .filter_map(ParsedVariable::from_parameter)
                .collect(),
            span: def.span,
        }
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            SymbolKind::Event,
            None,
            format!("event {}({})", self.name, params_display(&self.params)),
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParsedError {
    pub name: SmolStr,
    pub name_span: Span,
    pub params: Vec<ParsedVariable>,
    pub span: Span,
}

impl ParsedError {
    pub fn from_definition(def: &ast::ErrorDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            params: def
                .params
                .iter()
                .filter_map(ParsedVariable::from_parameter)
                .collect(),
            span: def.span,
        }
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            SymbolKind::Error,
            None,
            format!("error {}({})", self.name, params_display(&self.params)),
        )
    }
}

/// `type Price is uint128;`
#[derive(Debug, Clone)]
pub struct ParsedCustomType {
    pub name: SmolStr,
    pub name_span: Span,
    pub underlying: ast::TypeName,
    pub span: Span,
}

impl ParsedCustomType {
    pub fn from_definition(def: &ast::TypeDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            underlying: def.underlying.clone(),
            span: def.span,
        }
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        ResolvedSymbol::new(
            SymbolTarget::new(path, self.name.clone(), self.name_span),
            SymbolKind::CustomType,
            Some(TypeDescriptor::new(self.name.clone(), false, false)),
            format!("type {} is {}", self.name, type_display(&self.underlying)),
        )
    }
}

/// `using L for T;` — `target` is `None` for the wildcard form.
#[derive(Debug, Clone)]
pub struct ParsedUsing {
    pub library: SmolStr,
    pub library_span: Span,
    pub target: Option<ast::TypeName>,
    pub span: Span,
}

impl ParsedUsing {
    pub fn from_directive(directive: &ast::UsingDirective) -> Self {
        Self {
            library: directive.library.clone(),
            library_span: directive.library_span,
            target: directive.target.clone(),
            span: directive.span,
        }
    }

    /// Does this directive apply to a value of the given type?
    pub fn applies_to(&self, value_type: &TypeDescriptor) -> bool {
        match &self.target {
            None => true,
            Some(target) => TypeDescriptor::from_type_name(target).is_compatible_with(value_type),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParsedImportSymbol {
    pub name: SmolStr,
    /// Local binding name, when renamed with `as`.
    pub alias: Option<SmolStr>,
    pub span: Span,
}

impl ParsedImportSymbol {
    /// The name this symbol is visible under in the importing file.
    pub fn local_name(&self) -> &SmolStr {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedImport {
    pub specifier: String,
    pub specifier_span: Span,
    pub symbols: Vec<ParsedImportSymbol>,
    /// Namespace alias (`import * as ns` / `import "p" as ns`).
    pub alias: Option<SmolStr>,
    pub span: Span,
}

impl ParsedImport {
    pub fn from_directive(directive: &ast::ImportDirective) -> Self {
        Self {
            specifier: directive.path.clone(),
            specifier_span: directive.path_span,
            symbols: directive
                .symbols
                .iter()
                .map(|s| ParsedImportSymbol {
                    name: s.name.clone(),
                    alias: s.alias.clone(),
                    span: s.span,
                })
                .collect(),
            alias: directive.alias.clone(),
            span: directive.span,
        }
    }

    /// Whether a symbol list restricts what this import brings into scope.
    pub fn is_selective(&self) -> bool {
        !self.symbols.is_empty()
    }

    /// Does this import make `name` visible (directly, not via namespace)?
    pub fn provides(&self, name: &str) -> bool {
        if self.alias.is_some() {
            return false;
        }
        !self.is_selective() || self.symbols.iter().any(|s| s.local_name() == name)
    }

    /// The declared name behind a possibly-aliased local name.
    pub fn source_name(&self, local: &str) -> SmolStr {
        self.symbols
            .iter()
            .find(|s| s.local_name() == local)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| SmolStr::new(local))
    }

    pub fn namespace_symbol(&self, path: &Path) -> Option<ResolvedSymbol> {
        let alias = self.alias.as_ref()?;
        Some(ResolvedSymbol::new(
            SymbolTarget::new(path, alias.clone(), self.specifier_span),
            SymbolKind::Import,
            None,
            format!("import \"{}\" as {}", self.specifier, alias),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint_type() -> ast::TypeName {
        ast::TypeName {
            base: SmolStr::new("uint"),
            is_array: false,
            is_mapping: false,
            is_payable: false,
            span: Span::new(0, 4),
        }
    }

    #[test]
    fn test_variable_symbol_detail() {
        let variable = ParsedVariable {
            name: SmolStr::new("total"),
            name_span: Span::new(5, 10),
            type_name: uint_type(),
            attributes: vec![],
            span: Span::new(0, 10),
        };
        let symbol = variable.symbol(Path::new("/a.sol"), SymbolKind::StateVariable);
        assert_eq!(symbol.detail, "uint total");
        assert_eq!(symbol.type_desc.as_ref().unwrap().base, "uint256");
    }

    #[test]
    fn test_wildcard_using_applies_to_everything() {
        let using = ParsedUsing {
            library: SmolStr::new("L"),
            library_span: Span::new(6, 7),
            target: None,
            span: Span::new(0, 16),
        };
        assert!(using.applies_to(&TypeDescriptor::new("uint256", false, false)));
        assert!(using.applies_to(&TypeDescriptor::new("bool", false, false)));
    }

    #[test]
    fn test_selective_import_provides() {
        let import = ParsedImport {
            specifier: "./A.sol".into(),
            specifier_span: Span::new(20, 27),
            symbols: vec![ParsedImportSymbol {
                name: SmolStr::new("Token"),
                alias: Some(SmolStr::new("T")),
                span: Span::new(8, 18),
            }],
            alias: None,
            span: Span::new(0, 29),
        };
        assert!(import.provides("T"));
        assert!(!import.provides("Token"));
        assert_eq!(import.source_name("T"), "Token");
    }
}
