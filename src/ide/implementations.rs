//! Find-implementations for interfaces and their methods.

use tokio_util::sync::CancellationToken;

use crate::base::Position;
use crate::semantic::context::{ContextKind, context_at_token};
use crate::semantic::resolver::Resolver;
use crate::semantic::symbols::{FunctionKind, Symbol, SymbolId, SymbolKind, TypeRef};
use crate::semantic::{Project, QueryResult};

use super::{DocumentView, Location};

/// For a cursor on an interface name, the structs and bitstructs
/// implementing it. For a cursor on an interface method, the matching
/// methods on those implementors.
pub fn find_implementations(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Vec<Location>> {
    let Some(id) = symbol_under_cursor(project, doc, position, cancel)? else {
        return Ok(Vec::new());
    };
    let Some(symbol) = project.symbol(id) else {
        return Ok(Vec::new());
    };

    match &symbol.kind {
        SymbolKind::Interface => Ok(implementing_structs(project, symbol)
            .into_iter()
            .filter_map(|struct_id| location_of(project, struct_id))
            .collect()),
        SymbolKind::Function(data) if data.kind == FunctionKind::InterfaceMethod => {
            let Some(interface) = symbol.parent.and_then(|p| project.symbol(p)) else {
                return Ok(Vec::new());
            };
            let resolver = Resolver::new(project, cancel);
            let mut out = Vec::new();
            for struct_id in implementing_structs(project, interface) {
                resolver.check_cancelled()?;
                let Some(st) = project.symbol(struct_id) else {
                    continue;
                };
                if let Some(method) = resolver.find_method(&st.name, &symbol.name, &st.module)
                {
                    if let Some(location) = location_of(project, method) {
                        out.push(location);
                    }
                }
            }
            Ok(out)
        }
        _ => Ok(Vec::new()),
    }
}

/// Prefer the declaration whose name token covers the cursor; otherwise
/// resolve the word as a use site.
fn symbol_under_cursor(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Option<SymbolId>> {
    if let Some(id) = project.declaration_at(doc.uri, position) {
        return Ok(Some(id));
    }
    let context = context_at_token(doc.text, doc.line_index, position);
    let ContextKind::Word { word, .. } = context.kind else {
        return Ok(None);
    };
    if word.text.is_empty() {
        return Ok(None);
    }
    Resolver::new(project, cancel).find_declaration(&word, position, doc.uri)
}

fn implementing_structs(project: &Project, interface: &Symbol) -> Vec<SymbolId> {
    project
        .all_symbols()
        .filter(|(_, symbol)| {
            let written = match &symbol.kind {
                SymbolKind::Struct(data) => &data.interfaces,
                SymbolKind::Bitstruct(data) => &data.interfaces,
                _ => return false,
            };
            written.iter().any(|w| names_interface(w, interface))
        })
        .map(|(id, _)| id)
        .collect()
}

/// A written interface reference matches by short name, by full path, or
/// by a `::Name` path suffix.
fn names_interface(written: &TypeRef, interface: &Symbol) -> bool {
    if written.name != interface.name {
        return false;
    }
    written.module.is_empty()
        || written.module == interface.module
        || interface.module.ends_with(&written.module)
}

fn location_of(project: &Project, id: SymbolId) -> Option<Location> {
    project.symbol(id).map(|symbol| Location {
        uri: symbol.uri.clone(),
        range: symbol.ident_range,
    })
}
