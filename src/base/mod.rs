//! Foundation types for the Strom toolchain.
//!
//! This module provides the fundamental types used throughout the crate:
//! - [`Position`], [`Range`] - Line/column positions for symbols and queries
//! - [`LineIndex`] - Line/column to byte offset conversion
//!
//! This module has NO dependencies on other strom modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::{Position, Range};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
