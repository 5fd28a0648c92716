//! # Semantic Analysis
//!
//! Turns raw syntax trees into per-file semantic documents with lazily
//! resolved symbols, and links documents across the import graph.
//!
//! A [`ParsedDocument`] is immutable for a given text version; symbol
//! resolution results are memoized on the nodes themselves and live exactly
//! as long as that version. Cross-document links are path handles owned by
//! the [`Workspace`], never pointers between documents, so cyclic import
//! graphs cannot leak.

pub mod builder;
pub mod linker;
pub mod nodes;
pub mod resolver;
pub mod type_ref;
pub mod workspace;

pub use builder::build_document;
pub use linker::{LinkTable, ReferenceWalk};
pub use nodes::{
    ParsedContract, ParsedCustomType, ParsedDocument, ParsedEnum, ParsedError, ParsedEvent,
    ParsedExpression, ParsedFunction, ParsedImport, ParsedStruct, ParsedUsing, ParsedVariable,
    SelectedNode, Selection,
};
pub use resolver::{
    ScopeContext, document_context, extension_functions, member_symbols_of, resolve_expression,
    resolve_member, resolve_name, visible_symbols,
};
pub use type_ref::{
    Location, ResolvedSymbol, SymbolKind, SymbolTarget, TypeDescriptor, TypeReference,
};
pub use workspace::Workspace;
