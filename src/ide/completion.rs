//! The completion engine.
//!
//! What gets suggested depends on the cursor window:
//! - after `.`: members of the symbol the access path resolves to
//! - inside a module path (`a::b::`): modules, plus symbols of the
//!   qualified module once a partial name follows
//! - inside an `import`: module paths
//! - a plain identifier: locals, everything loadable from the cursor's
//!   module, module names, and keywords

use smol_str::SmolStr;
use tokio_util::sync::CancellationToken;

use crate::base::{Position, Range};
use crate::parser::keywords::KEYWORDS;
use crate::semantic::context::{ContextKind, context_at};
use crate::semantic::resolver::{Resolver, Walker, Word};
use crate::semantic::symbols::{
    FunctionKind, ModulePath, Symbol, SymbolId, SymbolKind, VariableKind,
};
use crate::semantic::{Project, QueryResult};

use super::DocumentView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Module,
    Struct,
    Enum,
    EnumMember,
    Interface,
    Function,
    Method,
    Macro,
    Variable,
    Constant,
    Field,
    Fault,
    TypeAlias,
    TypeParameter,
    Keyword,
}

impl CompletionKind {
    /// LSP `CompletionItemKind` number.
    pub fn to_lsp(self) -> u32 {
        match self {
            CompletionKind::Module => 9,
            CompletionKind::Struct => 22,
            CompletionKind::Enum => 13,
            CompletionKind::EnumMember => 20,
            CompletionKind::Interface => 8,
            CompletionKind::Function => 3,
            CompletionKind::Method => 2,
            CompletionKind::Macro => 3,
            CompletionKind::Variable => 6,
            CompletionKind::Constant => 21,
            CompletionKind::Field => 5,
            CompletionKind::Fault => 13,
            CompletionKind::TypeAlias => 7,
            CompletionKind::TypeParameter => 25,
            CompletionKind::Keyword => 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: SmolStr,
    pub kind: CompletionKind,
    /// Shown after the label: kind or type information.
    pub detail: Option<String>,
    pub documentation: Option<String>,
    /// Range of written text the insertion replaces.
    pub replace_range: Option<Range>,
}

impl CompletionItem {
    fn new(label: impl Into<SmolStr>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            replace_range: None,
        }
    }

    fn from_symbol(symbol: &Symbol) -> Self {
        let kind = match &symbol.kind {
            SymbolKind::Module(_) => CompletionKind::Module,
            SymbolKind::Variable(data) => match data.kind {
                VariableKind::Constant => CompletionKind::Constant,
                _ => CompletionKind::Variable,
            },
            SymbolKind::Function(data) => match data.kind {
                FunctionKind::Macro => CompletionKind::Macro,
                FunctionKind::Method | FunctionKind::InterfaceMethod => CompletionKind::Method,
                FunctionKind::Function => CompletionKind::Function,
            },
            SymbolKind::Struct(_) | SymbolKind::Bitstruct(_) => CompletionKind::Struct,
            SymbolKind::StructMember(_) => CompletionKind::Field,
            SymbolKind::Enum(_) => CompletionKind::Enum,
            SymbolKind::Enumerator(_) | SymbolKind::FaultConstant => CompletionKind::EnumMember,
            SymbolKind::Fault => CompletionKind::Fault,
            SymbolKind::Interface => CompletionKind::Interface,
            SymbolKind::Def(_) | SymbolKind::Distinct(_) => CompletionKind::TypeAlias,
            SymbolKind::GenericParameter => CompletionKind::TypeParameter,
        };
        let mut item = Self::new(symbol.name.clone(), kind);
        item.detail = Some(match symbol.value_type() {
            Some(type_ref) => format!("{} {type_ref}", symbol.kind_name()),
            None => symbol.kind_name().to_string(),
        });
        if let Some(doc) = &symbol.doc {
            if !doc.is_empty() {
                item.documentation = Some(doc.display_body());
            }
        }
        item
    }
}

pub fn completions(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Vec<CompletionItem>> {
    let context = context_at(doc.text, doc.line_index, position);
    let resolver = Resolver::new(project, cancel);

    let mut items = match context.kind {
        ContextKind::Comment | ContextKind::Literal | ContextKind::Empty => Vec::new(),
        ContextKind::ImportPath { partial, range } => {
            module_items(project, &partial, Some(range))
        }
        ContextKind::Word {
            word,
            module_path_window,
            window_range,
        } => {
            if word.has_access_path() {
                member_items(&resolver, &word, position, doc.uri)?
            } else if module_path_window {
                module_path_items(&resolver, &word, window_range, position, doc.uri)?
            } else if word.text.is_empty() {
                Vec::new()
            } else {
                scope_items(&resolver, &word, position, doc.uri)?
            }
        }
    };

    items.sort_by(|a, b| {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.label.cmp(&b.label))
    });
    items.dedup_by(|a, b| a.label == b.label && a.kind == b.kind);
    Ok(items)
}

fn matches_prefix(name: &str, prefix: &str) -> bool {
    prefix.is_empty() || name.to_lowercase().starts_with(&prefix.to_lowercase())
}

// =============================================================================
// Member completion (after `.`)
// =============================================================================

fn member_items(
    resolver: &Resolver<'_>,
    word: &Word,
    position: Position,
    uri: &str,
) -> QueryResult<Vec<CompletionItem>> {
    let mut walker = Walker::new(resolver);
    let Some((id, state)) = walker.walk_prefix(word, position, uri)? else {
        return Ok(Vec::new());
    };
    let members = walker.members_for_completion(id, state)?;

    let mut items = Vec::new();
    for member in members {
        let Some(symbol) = resolver.project().symbol(member) else {
            continue;
        };
        if !matches_prefix(&symbol.name, &word.text) {
            continue;
        }
        let mut item = CompletionItem::from_symbol(symbol);
        // Replace only what the user typed after the dot.
        item.replace_range = Some(word.range);
        items.push(item);
    }
    Ok(items)
}

// =============================================================================
// Module path completion (`a::b::`)
// =============================================================================

fn module_path_items(
    resolver: &Resolver<'_>,
    word: &Word,
    window_range: Range,
    position: Position,
    uri: &str,
) -> QueryResult<Vec<CompletionItem>> {
    let written = if word.text.is_empty() {
        format!("{}::", word.module_prefix)
    } else {
        format!("{}::{}", word.module_prefix, word.text)
    };
    let mut items = module_items(resolver.project(), &written, Some(window_range));

    // Once a partial symbol name follows the qualifier, the qualified
    // modules' own symbols compete with deeper module paths.
    if !word.text.is_empty() {
        let context = resolver.context_module(uri, position);
        for (path, _) in resolver.project().modules() {
            if *path != word.module_prefix && !path.ends_with(&word.module_prefix) {
                continue;
            }
            for id in resolver.project().module_root_symbols(path) {
                let Some(symbol) = resolver.project().symbol(id) else {
                    continue;
                };
                if !matches_prefix(&symbol.name, &word.text)
                    || !resolver.is_visible(symbol, &context)
                {
                    continue;
                }
                let mut item = CompletionItem::from_symbol(symbol);
                item.replace_range = Some(word.range);
                items.push(item);
            }
        }
    }
    Ok(items)
}

/// Modules whose full path starts with the written text.
fn module_items(
    project: &Project,
    written: &str,
    replace_range: Option<Range>,
) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    for (path, _) in project.modules() {
        let text = path.to_string();
        if !matches_prefix(&text, written) {
            continue;
        }
        let mut item = CompletionItem::new(text, CompletionKind::Module);
        item.detail = Some("module".to_string());
        item.replace_range = replace_range;
        items.push(item);
    }
    items
}

// =============================================================================
// Plain identifier completion
// =============================================================================

fn scope_items(
    resolver: &Resolver<'_>,
    word: &Word,
    position: Position,
    uri: &str,
) -> QueryResult<Vec<CompletionItem>> {
    let project = resolver.project();
    let context = resolver.context_module(uri, position);
    let mut items = Vec::new();

    for local in visible_locals(project, uri, position) {
        let Some(symbol) = project.symbol(local) else {
            continue;
        };
        if matches_prefix(&symbol.name, &word.text) {
            items.push(CompletionItem::from_symbol(symbol));
        }
    }

    for module in resolver.loadable_modules(&context) {
        resolver.check_cancelled()?;
        for id in project.module_root_symbols(&module) {
            let Some(symbol) = project.symbol(id) else {
                continue;
            };
            if matches_prefix(&symbol.name, &word.text)
                && resolver.is_visible(symbol, &context)
            {
                items.push(CompletionItem::from_symbol(symbol));
            }
        }
    }

    items.extend(module_name_items(project, &word.text));

    for keyword in KEYWORDS {
        if matches_prefix(keyword, &word.text) {
            items.push(CompletionItem::new(*keyword, CompletionKind::Keyword));
        }
    }
    Ok(items)
}

/// Locals and parameters of the enclosing function that are in scope and
/// declared before the cursor.
fn visible_locals(project: &Project, uri: &str, position: Position) -> Vec<SymbolId> {
    let Some(function) = project.function_at(uri, position) else {
        return Vec::new();
    };
    let Some(symbol) = project.symbol(function) else {
        return Vec::new();
    };
    symbol
        .children
        .iter()
        .copied()
        .filter(|&id| {
            project.symbol(id).is_some_and(|local| {
                local
                    .scope()
                    .is_some_and(|scope| scope.contains(position))
                    && local.ident_range.start <= position
            })
        })
        .collect()
}

/// Bare module names, suggested by their last segment.
fn module_name_items(project: &Project, prefix: &str) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let mut seen: Vec<&ModulePath> = Vec::new();
    for (path, _) in project.modules() {
        let Some(last) = path.last() else {
            continue;
        };
        if !matches_prefix(last, prefix) || seen.contains(&path) {
            continue;
        }
        seen.push(path);
        let mut item = CompletionItem::new(last.clone(), CompletionKind::Module);
        item.detail = Some(format!("module {path}"));
        items.push(item);
    }
    items
}
