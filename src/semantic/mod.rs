//! Semantic analysis: symbols, indexing, and name resolution.

pub mod context;
mod indexer;
mod project;
pub mod resolver;
pub mod symbols;

pub use indexer::index_document;
pub use project::Project;

use thiserror::Error;

/// Failures a query can surface. `NotFound` is not an error: handlers
/// express it as an empty result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("request cancelled")]
    Cancelled,
}

pub type QueryResult<T> = Result<T, QueryError>;
