//! Cursor context classification.
//!
//! Queries start by asking what the cursor sits on: a comment, a literal,
//! an import path, a module-path window (`a::b::`), or an identifier with
//! its preceding access path. Classification is text-driven: the scanner
//! walks backward from the cursor, collecting the `.`-chain and any `::`
//! qualifier, skipping over parenthesized call arguments.

use smol_str::SmolStr;

use crate::base::{LineIndex, Position, Range};
use crate::parser::{SyntaxKind, tokenize};
use crate::semantic::resolver::{Word, WordSpan};
use crate::semantic::symbols::ModulePath;

/// What the cursor is on.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorContext {
    pub position: Position,
    pub kind: ContextKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextKind {
    /// Inside a comment or doc comment.
    Comment,
    /// Inside a string, char, or number literal.
    Literal,
    /// Inside an `import` (or `module`) declaration path.
    ImportPath { partial: String, range: Range },
    /// An identifier window, possibly with a qualifier and access path.
    Word {
        word: Word,
        /// True when the window contains `:` and no `.`: the user is
        /// writing a module path.
        module_path_window: bool,
        /// The whole written window (qualifier + chain + word), for
        /// whole-path replacement edits.
        window_range: Range,
    },
    /// Nothing useful under the cursor.
    Empty,
}

/// Classify the cursor for completion: the word covers only the text
/// typed up to the cursor.
pub fn context_at(text: &str, line_index: &LineIndex, position: Position) -> CursorContext {
    classify(text, line_index, position, false)
}

/// Classify the cursor for definition/hover: the word extends to the full
/// token under the cursor.
pub fn context_at_token(text: &str, line_index: &LineIndex, position: Position) -> CursorContext {
    classify(text, line_index, position, true)
}

fn classify(
    text: &str,
    line_index: &LineIndex,
    position: Position,
    extend_right: bool,
) -> CursorContext {
    let offset = u32::from(line_index.offset(position, text)) as usize;

    if let Some(kind) = token_context(text, offset) {
        return CursorContext { position, kind };
    }
    if let Some(kind) = import_context(text, line_index, offset) {
        return CursorContext { position, kind };
    }

    let scan = scan_window(text, offset, extend_right);
    if scan.word.is_empty()
        && scan.access_path.is_empty()
        && scan.module_prefix.is_empty()
    {
        return CursorContext {
            position,
            kind: ContextKind::Empty,
        };
    }

    let window = &text[scan.window_start..scan.word_end];
    let module_path_window = window.contains(':') && !window.contains('.');

    let word = Word {
        text: SmolStr::new(&scan.word),
        range: range_of(line_index, text, scan.word_start, scan.word_end),
        module_prefix: ModulePath::new(scan.module_prefix),
        access_path: scan
            .access_path
            .into_iter()
            .map(|(s, e, t)| WordSpan::new(t, range_of(line_index, text, s, e)))
            .collect(),
    };
    let window_range = range_of(line_index, text, scan.window_start, scan.word_end);

    CursorContext {
        position,
        kind: ContextKind::Word {
            word,
            module_path_window,
            window_range,
        },
    }
}

// =============================================================================
// Token-level checks
// =============================================================================

/// Comment and literal detection via the lexer.
fn token_context(text: &str, offset: usize) -> Option<ContextKind> {
    for token in tokenize(text) {
        let start = u32::from(token.offset) as usize;
        let end = start + token.text.len();
        if start >= offset {
            break;
        }
        if offset >= end {
            continue;
        }
        // Cursor strictly inside the token.
        return match token.kind {
            SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT | SyntaxKind::DOC_COMMENT => {
                Some(ContextKind::Comment)
            }
            SyntaxKind::STRING | SyntaxKind::CHAR => Some(ContextKind::Literal),
            SyntaxKind::INT_NUMBER | SyntaxKind::FLOAT_NUMBER => Some(ContextKind::Literal),
            _ => None,
        };
    }
    None
}

/// Detect `import a::b` and `module a::b` path positions: the statement
/// the cursor is in starts with the keyword and has not ended yet.
fn import_context(text: &str, line_index: &LineIndex, offset: usize) -> Option<ContextKind> {
    let mut statement_start: Option<(SyntaxKind, usize)> = None;
    for token in tokenize(text) {
        let start = u32::from(token.offset) as usize;
        if start >= offset {
            break;
        }
        match token.kind {
            SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::R_BRACE => {
                statement_start = None
            }
            SyntaxKind::IMPORT_KW | SyntaxKind::MODULE_KW => {
                statement_start = Some((token.kind, start + token.text.len()));
            }
            _ => {}
        }
    }
    let (_, path_start) = statement_start?;
    let partial = text.get(path_start..offset)?.trim().to_string();
    let range = range_of(line_index, text, path_start, offset);
    Some(ContextKind::ImportPath { partial, range })
}

// =============================================================================
// Backward window scanner
// =============================================================================

struct WindowScan {
    word: String,
    word_start: usize,
    word_end: usize,
    /// (start, end, text) per element, root first.
    access_path: Vec<(usize, usize, SmolStr)>,
    module_prefix: Vec<SmolStr>,
    window_start: usize,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_window(text: &str, offset: usize, extend_right: bool) -> WindowScan {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    let mut word_start = offset;
    while word_start > 0 && is_ident_byte(bytes[word_start - 1]) {
        word_start -= 1;
    }
    let mut word_end = offset;
    if extend_right {
        while word_end < bytes.len() && is_ident_byte(bytes[word_end]) {
            word_end += 1;
        }
    }

    // Collect `.`-chain elements right to left, skipping call parens:
    // `a.b().c` yields [a, b] for the word `c`.
    let mut access_path: Vec<(usize, usize, SmolStr)> = Vec::new();
    let mut pos = word_start;
    while pos > 0 && bytes[pos - 1] == b'.' {
        let mut element_end = pos - 1;
        if element_end > 0 && bytes[element_end - 1] == b')' {
            match skip_balanced_back(bytes, element_end - 1) {
                Some(open) => element_end = open,
                None => break,
            }
        }
        let mut element_start = element_end;
        while element_start > 0 && is_ident_byte(bytes[element_start - 1]) {
            element_start -= 1;
        }
        if element_start == element_end {
            break;
        }
        access_path.push((
            element_start,
            element_end,
            SmolStr::new(&text[element_start..element_end]),
        ));
        pos = element_start;
    }
    access_path.reverse();

    // Module qualifier before the chain root.
    let mut module_prefix: Vec<SmolStr> = Vec::new();
    while pos >= 2 && &bytes[pos - 2..pos] == b"::" {
        let segment_end = pos - 2;
        let mut segment_start = segment_end;
        while segment_start > 0 && is_ident_byte(bytes[segment_start - 1]) {
            segment_start -= 1;
        }
        if segment_start == segment_end {
            // A lone leading `::` still widens the window.
            pos = segment_end;
            break;
        }
        module_prefix.push(SmolStr::new(&text[segment_start..segment_end]));
        pos = segment_start;
    }
    module_prefix.reverse();

    WindowScan {
        word: text[word_start..word_end].to_string(),
        word_start,
        word_end,
        access_path,
        module_prefix,
        window_start: pos,
    }
}

/// From a `)` at `close`, step back to the matching `(`.
fn skip_balanced_back(bytes: &[u8], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = close + 1;
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b')' | b']' => depth += 1,
            b'(' | b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// =============================================================================
// Call detection for signature help
// =============================================================================

/// If the cursor is between the parentheses of a call, return the callee
/// word and the zero-based argument index the cursor occupies.
pub fn call_at(text: &str, line_index: &LineIndex, position: Position) -> Option<(Word, u32)> {
    let offset = u32::from(line_index.offset(position, text)) as usize;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut commas = 0u32;
    let mut i = offset.min(bytes.len());
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b')' | b']' => depth += 1,
            b'(' if depth == 0 => {
                let scan = scan_window(text, i, false);
                if scan.word.is_empty() {
                    return None;
                }
                let word = Word {
                    text: SmolStr::new(&scan.word),
                    range: range_of(line_index, text, scan.word_start, scan.word_end),
                    module_prefix: ModulePath::new(scan.module_prefix),
                    access_path: scan
                        .access_path
                        .into_iter()
                        .map(|(s, e, t)| WordSpan::new(t, range_of(line_index, text, s, e)))
                        .collect(),
                };
                return Some((word, commas));
            }
            b'(' | b'[' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => commas += 1,
            b';' | b'{' | b'}' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

fn range_of(line_index: &LineIndex, text: &str, start: usize, end: usize) -> Range {
    Range::new(
        line_index.position(crate::base::TextSize::new(start as u32), text),
        line_index.position(crate::base::TextSize::new(end as u32), text),
    )
}
