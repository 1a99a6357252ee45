//! # strom-base
//!
//! Core library for Strom language analysis: lossless parsing, symbol
//! indexing, name resolution, and editor features.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! workspace → document lifecycle, query entry points
//!   ↓
//! ide       → editor features (definition, hover, completion, ...)
//!   ↓
//! semantic  → symbol table, indexer, resolver, cursor context
//!   ↓
//! parser    → logos lexer, recursive-descent parser, rowan CST, AST
//!   ↓
//! base      → primitives (Position, Range, LineIndex)
//! ```

/// Foundation types: Position, Range, LineIndex
pub mod base;

/// Parser: logos lexer, recursive-descent parser, rowan CST, typed AST
pub mod parser;

/// Semantic model: symbols, indexing, name resolution, cursor context
pub mod semantic;

/// IDE features: definition, hover, completion, signature help,
/// implementations
pub mod ide;

/// Workspace: open documents and query entry points
pub mod workspace;

// Re-export commonly needed items
pub use base::{LineIndex, Position, Range};
pub use semantic::{Project, QueryError, QueryResult};
pub use workspace::{TextChange, Workspace, WorkspaceHandle};
