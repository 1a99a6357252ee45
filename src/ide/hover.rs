//! Hover rendering.

use std::fmt::Write as _;

use tokio_util::sync::CancellationToken;

use crate::base::{Position, Range};
use crate::semantic::context::{ContextKind, context_at_token};
use crate::semantic::resolver::Resolver;
use crate::semantic::symbols::{FunctionKind, Symbol, SymbolKind, VariableKind};
use crate::semantic::{Project, QueryResult};

use super::DocumentView;

/// Result of a hover request: markdown contents plus the range of the
/// hovered word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub contents: String,
    pub range: Range,
}

pub fn hover(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Option<HoverResult>> {
    let context = context_at_token(doc.text, doc.line_index, position);
    let ContextKind::Word { word, .. } = context.kind else {
        return Ok(None);
    };
    if word.text.is_empty() {
        return Ok(None);
    }

    let resolver = Resolver::new(project, cancel);
    let Some(id) = resolver.find_declaration(&word, position, doc.uri)? else {
        return Ok(None);
    };
    let Some(symbol) = project.symbol(id) else {
        return Ok(None);
    };

    Ok(Some(HoverResult {
        contents: render(project, symbol),
        range: word.range,
    }))
}

/// Markdown for one symbol: a fenced declaration, the owning module, and
/// the doc comment.
fn render(project: &Project, symbol: &Symbol) -> String {
    let mut out = format!("```strom\n{}\n```", declaration_line(project, symbol));
    if !symbol.module.is_empty() && !matches!(symbol.kind, SymbolKind::Module(_)) {
        let _ = write!(out, "\n\nIn module **{}**", symbol.module);
    }
    if let Some(doc) = &symbol.doc {
        if !doc.is_empty() {
            let _ = write!(out, "\n\n{}", doc.display_body());
        }
    }
    out
}

fn declaration_line(project: &Project, symbol: &Symbol) -> String {
    match &symbol.kind {
        SymbolKind::Module(_) => format!("module {}", symbol.module),
        SymbolKind::Variable(data) => {
            let type_text = data
                .type_ref
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default();
            match data.kind {
                VariableKind::Constant => format!("const {type_text} {}", symbol.name),
                _ if type_text.is_empty() => symbol.name.to_string(),
                _ => format!("{type_text} {}", symbol.name),
            }
        }
        SymbolKind::Function(data) => {
            let keyword = match data.kind {
                FunctionKind::Macro => "macro",
                _ => "fn",
            };
            let ret = data
                .return_type
                .as_ref()
                .map(|t| format!("{t} "))
                .unwrap_or_default();
            let mut params = param_list(project, &data.params);
            if let Some(body) = &data.body_param {
                let _ = write!(params, "; {body}");
            }
            format!("{keyword} {ret}{}({params})", symbol.full_name())
        }
        SymbolKind::Struct(data) if data.is_union => format!("union {}", symbol.name),
        SymbolKind::Struct(data) => {
            if data.interfaces.is_empty() {
                format!("struct {}", symbol.name)
            } else {
                let list: Vec<String> =
                    data.interfaces.iter().map(|i| i.to_string()).collect();
                format!("struct {} ({})", symbol.name, list.join(", "))
            }
        }
        SymbolKind::Bitstruct(data) => match &data.backing_type {
            Some(backing) => format!("bitstruct {} : {backing}", symbol.name),
            None => format!("bitstruct {}", symbol.name),
        },
        SymbolKind::StructMember(data) if data.is_substruct => {
            format!("struct {}", symbol.name)
        }
        SymbolKind::StructMember(data) => {
            let type_text = data
                .type_ref
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_default();
            match data.bit_range {
                Some((low, high)) => format!("{type_text} {} : {low}..{high}", symbol.name),
                None => format!("{type_text} {}", symbol.name),
            }
        }
        SymbolKind::Enum(data) => match &data.backing_type {
            Some(backing) => format!("enum {} : {backing}", symbol.name),
            None => format!("enum {}", symbol.name),
        },
        SymbolKind::Enumerator(data) => match (&data.value, parent_name(project, symbol)) {
            (Some(value), _) => format!("{}: {value}", symbol.name),
            (None, Some(parent)) => format!("{parent}.{}", symbol.name),
            (None, None) => symbol.name.to_string(),
        },
        SymbolKind::Fault => format!("fault {}", symbol.name),
        SymbolKind::FaultConstant => match parent_name(project, symbol) {
            Some(parent) => format!("{parent}.{}", symbol.name),
            None => symbol.name.to_string(),
        },
        SymbolKind::Interface => format!("interface {}", symbol.name),
        SymbolKind::Def(data) => format!("def {} = {}", symbol.name, data.target),
        SymbolKind::Distinct(data) if data.is_inline => {
            format!("distinct {} = inline {}", symbol.name, data.base_type)
        }
        SymbolKind::Distinct(data) => {
            format!("distinct {} = {}", symbol.name, data.base_type)
        }
        SymbolKind::GenericParameter => format!("{} (type parameter)", symbol.name),
    }
}

fn parent_name(project: &Project, symbol: &Symbol) -> Option<String> {
    symbol
        .parent
        .and_then(|p| project.symbol(p))
        .map(|p| p.name.to_string())
}

pub(super) fn param_list(project: &Project, params: &[crate::semantic::symbols::SymbolId]) -> String {
    let rendered: Vec<String> = params
        .iter()
        .filter_map(|&id| project.symbol(id))
        .map(|param| match param.value_type() {
            Some(type_ref) => format!("{type_ref} {}", param.name),
            None => param.name.to_string(),
        })
        .collect();
    rendered.join(", ")
}
