//! Symbol identity, resolved-symbol payloads, and type descriptors.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::ast;

/// A place in a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub path: PathBuf,
    pub span: Span,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, span: Span) -> Self {
        Self {
            path: path.into(),
            span,
        }
    }
}

/// Identity of a declaration.
///
/// Documents are rebuilt wholesale on every change, so node addresses are
/// worthless across versions; two symbols are the same declaration exactly
/// when path, name, and declaration span agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolTarget {
    pub path: PathBuf,
    pub name: SmolStr,
    pub span: Span,
}

impl SymbolTarget {
    pub fn new(path: &Path, name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            path: path.to_path_buf(),
            name: name.into(),
            span,
        }
    }

    pub fn location(&self) -> Location {
        Location::new(self.path.clone(), self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Contract,
    Interface,
    Library,
    Function,
    Modifier,
    StateVariable,
    LocalVariable,
    Parameter,
    Constant,
    Struct,
    StructField,
    Enum,
    EnumValue,
    Event,
    Error,
    CustomType,
    /// A namespace alias introduced by an import.
    Import,
}

/// The outcome of resolving a name: where it is declared, what kind of
/// thing it is, its value type when it has one, and a display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub target: SymbolTarget,
    pub kind: SymbolKind,
    pub type_desc: Option<TypeDescriptor>,
    pub detail: String,
}

impl ResolvedSymbol {
    pub fn new(
        target: SymbolTarget,
        kind: SymbolKind,
        type_desc: Option<TypeDescriptor>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            target,
            kind,
            type_desc,
            detail: detail.into(),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.target.name
    }
}

/// A value type stripped down to what member resolution needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub base: SmolStr,
    pub is_array: bool,
    pub is_mapping: bool,
}

impl TypeDescriptor {
    pub fn new(base: impl Into<SmolStr>, is_array: bool, is_mapping: bool) -> Self {
        Self {
            base: normalize_base(&base.into()),
            is_array,
            is_mapping,
        }
    }

    pub fn from_type_name(type_name: &ast::TypeName) -> Self {
        // `address payable` coerces to `address` for compatibility checks.
        Self::new(type_name.base.clone(), type_name.is_array, type_name.is_mapping)
    }

    /// Type compatibility: normalized equality. Aliased integer widths
    /// (`uint` ≡ `uint256`) and payability are folded by `normalize_base`.
    pub fn is_compatible_with(&self, other: &TypeDescriptor) -> bool {
        self == other
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_mapping {
            write!(f, "mapping(... => {})", self.base)?;
        } else {
            write!(f, "{}", self.base)?;
        }
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

fn normalize_base(base: &str) -> SmolStr {
    match base {
        "uint" => SmolStr::new_static("uint256"),
        "int" => SmolStr::new_static("int256"),
        "byte" => SmolStr::new_static("bytes1"),
        "address payable" => SmolStr::new_static("address"),
        other => SmolStr::new(other),
    }
}

/// The uniform answer to "what does the cursor point at".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    /// Whether the query offset sat on a selectable node at all.
    pub is_selected: bool,
    pub location: Option<Location>,
    pub target: Option<SymbolTarget>,
}

impl TypeReference {
    pub fn resolved(target: SymbolTarget) -> Self {
        Self {
            is_selected: true,
            location: Some(target.location()),
            target: Some(target),
        }
    }

    pub fn unresolved() -> Self {
        Self {
            is_selected: true,
            location: None,
            target: None,
        }
    }

    pub fn none() -> Self {
        Self {
            is_selected: false,
            location: None,
            target: None,
        }
    }
}
