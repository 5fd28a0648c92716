//! # soli-base
//!
//! Core library for Solidity parsing, AST, and semantic analysis.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → editor features (goto-def, references, hover, completion)
//!   ↓
//! semantic  → per-file semantic documents, scope resolution, workspace cache
//!   ↓
//! project   → import resolution, remappings, dependency packages
//!   ↓
//! syntax    → AST types, ParseError
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → primitives (Span, Position, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → project → semantic → ide)
// ============================================================================

/// Foundation types: Span, Position, LineIndex
pub mod base;

/// Parser: Logos lexer, recursive-descent parser
pub mod parser;

/// Syntax: AST types, ParseError
pub mod syntax;

/// Project management: import resolution, remappings, packages
pub mod project;

/// Semantic analysis: parsed documents, scope resolution, workspace
pub mod semantic;

/// IDE features: goto-definition, find-references, hover, completion
pub mod ide;

// Re-export foundation types
pub use base::{LineIndex, Position, Span};

// Re-export the main entry points
pub use ide::{Analysis, AnalysisHost};
pub use project::{ImportResolver, Project};
pub use semantic::Workspace;
