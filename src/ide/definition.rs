//! Go-to-definition.

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::Position;
use crate::semantic::context::{ContextKind, context_at_token};
use crate::semantic::resolver::Resolver;
use crate::semantic::{Project, QueryResult};

use super::{DocumentView, Location};

/// Resolve the identifier under the cursor to its declaration site.
pub fn goto_definition(
    project: &Project,
    doc: DocumentView<'_>,
    position: Position,
    cancel: &CancellationToken,
) -> QueryResult<Option<Location>> {
    let context = context_at_token(doc.text, doc.line_index, position);
    let ContextKind::Word { word, .. } = context.kind else {
        return Ok(None);
    };
    if word.text.is_empty() {
        return Ok(None);
    }

    let resolver = Resolver::new(project, cancel);
    let Some(id) = resolver.find_declaration(&word, position, doc.uri)? else {
        trace!(word = %word.text, "definition not found");
        return Ok(None);
    };
    Ok(project.symbol(id).map(|symbol| Location {
        uri: symbol.uri.clone(),
        range: symbol.ident_range,
    }))
}
