//! Per-file semantic nodes.
//!
//! Nodes wrap the raw syntax tree with resolution-oriented accessors. A node
//! tree is immutable for one text version; lazy state (`OnceCell`) is scoped
//! to that version and thrown away with it.

mod contract;
mod document;
mod expression;
mod function;
mod items;

pub use contract::{InheritanceRef, ParsedContract};
pub use document::{ParsedDocument, SelectedNode, Selection};
pub use expression::{ExpressionKind, ParsedExpression};
pub use function::{BodyIndex, LocalVariable, ParsedFunction, ParsedModifierInvocation};
pub use items::{
    ParsedCustomType, ParsedEnum, ParsedEnumValue, ParsedError, ParsedEvent, ParsedImport,
    ParsedImportSymbol, ParsedStruct, ParsedUsing, ParsedVariable, type_display,
};
