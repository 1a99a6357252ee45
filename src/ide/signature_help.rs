//! Signature help inside call parentheses.

use tokio_util::sync::CancellationToken;

use crate::base::Position;
use crate::semantic::context::call_at;
use crate::semantic::resolver::Resolver;
use crate::semantic::symbols::SymbolKind;
use crate::semantic::{Project, QueryResult};

use super::DocumentView;
use super::hover::param_list;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    /// Full signature text, e.g. `fn void process(int a, int b)`.
    pub label: String,
    /// One rendered `Type name` per parameter, in order.
    pub parameters: Vec<String>,
    /// Index of the parameter the cursor is on, clamped to the list.
    pub active_parameter: u32,
    pub documentation: Option<String>,
}

pub fn signature_help(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Option<SignatureHelp>> {
    let Some((word, active)) = call_at(doc.text, doc.line_index, position) else {
        return Ok(None);
    };

    let resolver = Resolver::new(project, cancel);
    let Some(id) = resolver.find_declaration(&word, position, doc.uri)? else {
        return Ok(None);
    };
    let Some(symbol) = project.symbol(id) else {
        return Ok(None);
    };
    let SymbolKind::Function(data) = &symbol.kind else {
        return Ok(None);
    };

    let parameters: Vec<String> = data
        .params
        .iter()
        .filter_map(|&param| project.symbol(param))
        .map(|param| match param.value_type() {
            Some(type_ref) => format!("{type_ref} {}", param.name),
            None => param.name.to_string(),
        })
        .collect();
    let ret = data
        .return_type
        .as_ref()
        .map(|t| format!("{t} "))
        .unwrap_or_default();
    let keyword = match data.kind {
        crate::semantic::symbols::FunctionKind::Macro => "macro",
        _ => "fn",
    };
    let mut rendered = param_list(project, &data.params);
    if let Some(body) = &data.body_param {
        rendered.push_str("; ");
        rendered.push_str(body);
    }
    let label = format!("{keyword} {ret}{}({rendered})", symbol.full_name());
    // Typing past the declared list keeps the last parameter active.
    let active_parameter = if parameters.is_empty() {
        0
    } else {
        active.min(parameters.len() as u32 - 1)
    };

    Ok(Some(SignatureHelp {
        label,
        parameters,
        active_parameter,
        documentation: symbol
            .doc
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| d.display_body()),
    }))
}
