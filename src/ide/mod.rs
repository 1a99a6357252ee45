//! IDE features over the semantic model.
//!
//! Each function corresponds to one editor request and follows the same
//! shape: classify the cursor, resolve through [`crate::semantic::resolver`],
//! and render the answer with the crate's own types. No protocol types
//! appear here; the server layer converts at its boundary.

mod completion;
mod definition;
mod hover;
mod implementations;
mod signature_help;

pub use completion::{CompletionItem, CompletionKind, completions};
pub use definition::goto_definition;
pub use hover::{HoverResult, hover};
pub use implementations::find_implementations;
pub use signature_help::{SignatureHelp, signature_help};

use smol_str::SmolStr;

use crate::base::{LineIndex, Range};

/// Read-only view of one open document, borrowed from the workspace.
#[derive(Clone, Copy)]
pub struct DocumentView<'a> {
    pub uri: &'a str,
    pub text: &'a str,
    pub line_index: &'a LineIndex,
}

/// A place in some document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: SmolStr,
    pub range: Range,
}
