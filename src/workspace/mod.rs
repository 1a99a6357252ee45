//! Document lifecycle and query entry points.
//!
//! A [`Workspace`] owns the text, parse, and line index of every open
//! document plus the shared [`Project`] symbol table. Editors drive it
//! with open/update/close notifications; queries borrow a consistent
//! view and take a cancellation token so abandoned requests stop early.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::base::{LineIndex, Position, Range};
use crate::ide::{
    self, CompletionItem, DocumentView, HoverResult, Location, SignatureHelp,
};
use crate::parser::{AstNode, Parse, SourceFile, parse};
use crate::semantic::{Project, QueryResult, index_document};

/// One edit to a document. A change without a range replaces the whole
/// text, mirroring the LSP content-change shape.
#[derive(Debug, Clone)]
pub struct TextChange {
    pub range: Option<Range>,
    pub text: String,
}

impl TextChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn ranged(range: Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// One open document.
pub struct Document {
    pub text: String,
    pub line_index: LineIndex,
    pub parse: Parse,
    pub version: i32,
}

/// All open documents and their combined symbol table.
#[derive(Default)]
pub struct Workspace {
    project: Project,
    documents: FxHashMap<SmolStr, Document>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn document(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    // =========================================================================
    // Document lifecycle
    // =========================================================================

    pub fn open_document(&mut self, uri: &str, text: impl Into<String>, version: i32) {
        info!(uri, version, "open document");
        self.set_document(uri, text.into(), version);
    }

    /// Apply edits in order. Ranged changes splice into the current text
    /// through the line index; each change sees the result of the one
    /// before it.
    pub fn update_document(&mut self, uri: &str, changes: Vec<TextChange>, version: i32) {
        let Some(doc) = self.documents.get(uri) else {
            return;
        };
        let mut text = doc.text.clone();
        for change in changes {
            match change.range {
                None => text = change.text,
                Some(range) => {
                    let index = LineIndex::new(&text);
                    let start = u32::from(index.offset(range.start, &text)) as usize;
                    let end = u32::from(index.offset(range.end, &text)) as usize;
                    text.replace_range(start..end, &change.text);
                }
            }
        }
        self.set_document(uri, text, version);
    }

    pub fn close_document(&mut self, uri: &str) {
        info!(uri, "close document");
        self.documents.remove(uri);
        self.project.remove_document(uri);
    }

    fn set_document(&mut self, uri: &str, text: String, version: i32) {
        let parse = parse(&text);
        let line_index = LineIndex::new(&text);

        self.project.remove_document(uri);
        if let Some(file) = SourceFile::cast(parse.syntax()) {
            let ids = index_document(
                &mut self.project,
                uri,
                &file_stem(uri),
                &text,
                &line_index,
                &file,
            );
            self.project.install_document(uri, ids);
        }

        self.documents.insert(
            SmolStr::new(uri),
            Document {
                text,
                line_index,
                parse,
                version,
            },
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn definition(
        &self,
        uri: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<Location>> {
        match self.view(uri) {
            Some(doc) => Ok(ide::goto_definition(&self.project, doc, position, cancel)?
                .into_iter()
                .collect()),
            None => Ok(Vec::new()),
        }
    }

    pub fn hover(
        &self,
        uri: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> QueryResult<Option<HoverResult>> {
        match self.view(uri) {
            Some(doc) => ide::hover(&self.project, doc, position, cancel),
            None => Ok(None),
        }
    }

    pub fn completions(
        &self,
        uri: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<CompletionItem>> {
        match self.view(uri) {
            Some(doc) => ide::completions(&self.project, doc, position, cancel),
            None => Ok(Vec::new()),
        }
    }

    pub fn signature_help(
        &self,
        uri: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> QueryResult<Option<SignatureHelp>> {
        match self.view(uri) {
            Some(doc) => ide::signature_help(&self.project, doc, position, cancel),
            None => Ok(None),
        }
    }

    pub fn implementations(
        &self,
        uri: &str,
        position: Position,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<Location>> {
        match self.view(uri) {
            Some(doc) => ide::find_implementations(&self.project, doc, position, cancel),
            None => Ok(Vec::new()),
        }
    }

    fn view<'a>(&'a self, uri: &'a str) -> Option<DocumentView<'a>> {
        self.documents.get(uri).map(|doc| DocumentView {
            uri,
            text: &doc.text,
            line_index: &doc.line_index,
        })
    }
}

/// Shared handle for a server with concurrent notification and request
/// handlers.
#[derive(Clone, Default)]
pub struct WorkspaceHandle {
    inner: Arc<RwLock<Workspace>>,
}

impl WorkspaceHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, Workspace> {
        self.inner.write()
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, Workspace> {
        self.inner.read()
    }
}

/// Default module name for files without a `module` declaration: the file
/// stem lower-cased, with non-alphanumeric characters replaced by `_`,
/// capped at 31 characters.
fn file_stem(uri: &str) -> String {
    let name = uri.rsplit(['/', '\\']).next().unwrap_or(uri);
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(31)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_normalizes_into_a_module_name() {
        assert_eq!(file_stem("file:///home/dev/app.strom"), "app");
        assert_eq!(file_stem("C:\\src\\My-File.strom"), "my_file");
        assert_eq!(file_stem("plain"), "plain");
        assert_eq!(
            file_stem("file:///a_very_long_file_name_over_the_limit.strom"),
            "a_very_long_file_name_over_the_"
        );
    }

    #[test]
    fn reopening_replaces_symbols() {
        let mut workspace = Workspace::new();
        workspace.open_document("file:///a.strom", "module app;\nint alpha = 1;\n", 1);
        assert_eq!(workspace.project().symbol_count(), 2);

        workspace.update_document(
            "file:///a.strom",
            vec![TextChange::full("module app;\nint beta = 2;\n")],
            2,
        );
        assert_eq!(workspace.project().symbol_count(), 2);
        let names: Vec<_> = workspace
            .project()
            .all_symbols()
            .map(|(_, s)| s.name.clone())
            .collect();
        assert!(names.iter().any(|n| n == "beta"));
        assert!(!names.iter().any(|n| n == "alpha"));
    }

    #[test]
    fn ranged_changes_splice_into_the_text() {
        let mut workspace = Workspace::new();
        workspace.open_document("file:///a.strom", "module app;\nint alpha = 1;\n", 1);

        // Rename `alpha` to `gamma`, then bump the initializer.
        workspace.update_document(
            "file:///a.strom",
            vec![
                TextChange::ranged(Range::from_coords(1, 4, 1, 9), "gamma"),
                TextChange::ranged(Range::from_coords(1, 12, 1, 13), "42"),
            ],
            2,
        );

        let doc = workspace.document("file:///a.strom").unwrap();
        assert_eq!(doc.text, "module app;\nint gamma = 42;\n");
        assert_eq!(doc.version, 2);
        let names: Vec<_> = workspace
            .project()
            .all_symbols()
            .map(|(_, s)| s.name.clone())
            .collect();
        assert!(names.iter().any(|n| n == "gamma"));
    }

    #[test]
    fn closing_drops_the_document() {
        let mut workspace = Workspace::new();
        workspace.open_document("file:///a.strom", "module app;\n", 1);
        workspace.close_document("file:///a.strom");
        assert!(workspace.document("file:///a.strom").is_none());
        assert_eq!(workspace.project().symbol_count(), 0);
    }
}
