//! The name resolver.
//!
//! Resolution follows a fixed order: locals in the enclosing function,
//! the cursor's module (across all files declaring it), implicitly
//! imported ancestor/descendant modules, explicitly imported modules
//! (breadth-first, cycle-guarded), and finally module names themselves.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::base::Position;
use crate::parser::keywords;
use crate::semantic::symbols::{ModulePath, Symbol, SymbolId, SymbolKind, TypeRef};
use crate::semantic::{Project, QueryError, QueryResult};

use super::access_path::Walker;
use super::word::Word;

/// Termination safeguards for a single query.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Maximum resolver invocations per query.
    pub resolver_hops: usize,
    /// Maximum access-path walker iterations per query.
    pub walker_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            resolver_hops: 500,
            walker_steps: 1000,
        }
    }
}

/// Exact module-path match outranks a suffix match from a partial import.
const SCORE_EXACT: u32 = 100;
const SCORE_SUFFIX: u32 = 2;

/// One query's resolution state over a read-only project view.
pub struct Resolver<'a> {
    project: &'a Project,
    cancel: &'a CancellationToken,
    limits: Limits,
    hops: AtomicUsize,
}

impl<'a> Resolver<'a> {
    pub fn new(project: &'a Project, cancel: &'a CancellationToken) -> Self {
        Self::with_limits(project, cancel, Limits::default())
    }

    pub fn with_limits(
        project: &'a Project,
        cancel: &'a CancellationToken,
        limits: Limits,
    ) -> Self {
        Self {
            project,
            cancel,
            limits,
            hops: AtomicUsize::new(0),
        }
    }

    pub fn project(&self) -> &'a Project {
        self.project
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub(crate) fn check_cancelled(&self) -> QueryResult<()> {
        if self.cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        Ok(())
    }

    fn guard_hops(&self) -> bool {
        let hops = self.hops.fetch_add(1, Ordering::Relaxed);
        if hops >= self.limits.resolver_hops {
            warn!(hops, "resolver hop limit reached, giving up");
            return false;
        }
        true
    }

    // =========================================================================
    // Entry point
    // =========================================================================

    /// Resolve the declaration a word refers to at a cursor position.
    pub fn find_declaration(
        &self,
        word: &Word,
        cursor: Position,
        uri: &str,
    ) -> QueryResult<Option<SymbolId>> {
        self.check_cancelled()?;
        if keywords::is_keyword(&word.text) {
            return Ok(None);
        }
        if word.has_access_path() {
            return Walker::new(self).walk(word, cursor, uri);
        }
        trace!(word = %word.text, "resolving identifier");
        self.find_standalone(word, cursor, uri)
    }

    /// Resolve a word that has no access path.
    pub(crate) fn find_standalone(
        &self,
        word: &Word,
        cursor: Position,
        uri: &str,
    ) -> QueryResult<Option<SymbolId>> {
        if !self.guard_hops() {
            return Ok(None);
        }
        let context = self.context_module(uri, cursor);

        if word.has_module_prefix() {
            return Ok(self.find_with_prefix(&word.text, &word.module_prefix, &context));
        }

        if let Some(id) = self.find_local(&word.text, cursor, uri) {
            return Ok(Some(id));
        }

        let mut traversed = FxHashSet::default();
        if let Some(id) = self.find_from_module(&word.text, &context, &context, &mut traversed)? {
            return Ok(Some(id));
        }

        // A bare word can still name a module (`foo` in `foo::tick`).
        Ok(self.find_module_named(&word.text, &traversed))
    }

    /// The module the cursor sits in, falling back to an empty path for
    /// unknown documents.
    pub fn context_module(&self, uri: &str, cursor: Position) -> ModulePath {
        self.project
            .section_at(uri, cursor)
            .and_then(|id| self.project.symbol(id))
            .map(|s| s.module.clone())
            .unwrap_or_default()
    }

    // =========================================================================
    // Locals
    // =========================================================================

    /// Find a local or parameter of the enclosing function. Later
    /// declarations shadow earlier ones; a declaration is only visible
    /// after its own ident and inside its block.
    fn find_local(&self, name: &str, cursor: Position, uri: &str) -> Option<SymbolId> {
        let function = self.project.function_at(uri, cursor)?;
        let mut best: Option<(Position, SymbolId)> = None;
        for &child in &self.project.symbol(function)?.children {
            let Some(symbol) = self.project.symbol(child) else {
                continue;
            };
            if symbol.name != name {
                continue;
            }
            let Some(scope) = symbol.scope() else {
                continue;
            };
            if !scope.contains(cursor) || symbol.ident_range.start > cursor {
                continue;
            }
            match best {
                Some((start, _)) if start >= symbol.ident_range.start => {}
                _ => best = Some((symbol.ident_range.start, child)),
            }
        }
        best.map(|(_, id)| id)
    }

    // =========================================================================
    // Module searches
    // =========================================================================

    /// Search a module and everything visible from it: its own root,
    /// implicit ancestor/descendant modules, then explicit imports
    /// breadth-first with cycle protection.
    fn find_from_module(
        &self,
        name: &str,
        start: &ModulePath,
        context: &ModulePath,
        traversed: &mut FxHashSet<ModulePath>,
    ) -> QueryResult<Option<SymbolId>> {
        self.check_cancelled()?;
        traversed.insert(start.clone());
        if let Some(id) = self.find_in_module_root(name, start, context, true) {
            return Ok(Some(id));
        }

        // Ancestors and descendants are visible without an import.
        for (path, _) in self.project.modules() {
            if traversed.contains(path) || !start.is_implicitly_imported(path) {
                continue;
            }
            traversed.insert(path.clone());
            if let Some(id) = self.find_in_module_root(name, path, context, true) {
                return Ok(Some(id));
            }
        }

        // Explicit imports, breadth-first across the import graph.
        let mut queue: VecDeque<ModulePath> = VecDeque::new();
        self.enqueue_imports(start, traversed, &mut queue);
        while let Some(import) = queue.pop_front() {
            self.check_cancelled()?;
            if !self.guard_hops() {
                return Ok(None);
            }
            // Partial import paths (`import io;`) match by suffix.
            let matches: Vec<ModulePath> = self
                .project
                .modules()
                .filter(|(path, _)| **path == import || path.ends_with(&import))
                .map(|(path, _)| path.clone())
                .collect();
            for path in matches {
                if traversed.contains(&path) {
                    continue;
                }
                traversed.insert(path.clone());
                if let Some(id) = self.find_in_module_root(name, &path, context, true) {
                    return Ok(Some(id));
                }
                self.enqueue_imports(&path, traversed, &mut queue);
            }
        }
        Ok(None)
    }

    fn enqueue_imports(
        &self,
        module: &ModulePath,
        traversed: &FxHashSet<ModulePath>,
        queue: &mut VecDeque<ModulePath>,
    ) {
        for &section in self.project.module_sections(module) {
            let Some(symbol) = self.project.symbol(section) else {
                continue;
            };
            if let SymbolKind::Module(data) = &symbol.kind {
                for import in &data.imports {
                    if !traversed.contains(import) && !queue.contains(import) {
                        queue.push_back(import.clone());
                    }
                }
            }
        }
    }

    /// Exact-name lookup among a module's top-level declarations. With
    /// `deep`, enumerators and fault constants are reachable unqualified.
    pub(crate) fn find_in_module_root(
        &self,
        name: &str,
        module: &ModulePath,
        context: &ModulePath,
        deep: bool,
    ) -> Option<SymbolId> {
        for id in self.project.module_root_symbols(module) {
            let Some(symbol) = self.project.symbol(id) else {
                continue;
            };
            if !self.is_visible(symbol, context) {
                continue;
            }
            if symbol.name == name {
                return Some(id);
            }
            if !deep {
                continue;
            }
            match &symbol.kind {
                SymbolKind::Enum(_) | SymbolKind::Fault => {
                    for &child in &symbol.children {
                        if self.project.symbol(child).is_some_and(|c| c.name == name) {
                            return Some(child);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Module-prefixed lookup (`foo::tick`). Exact path matches beat
    /// suffix matches from partial imports; ties keep the first hit.
    fn find_with_prefix(
        &self,
        name: &str,
        prefix: &ModulePath,
        context: &ModulePath,
    ) -> Option<SymbolId> {
        let mut best: Option<(u32, SymbolId)> = None;
        for (path, _) in self.project.modules() {
            let score = if path == prefix {
                SCORE_EXACT
            } else if path.ends_with(prefix) {
                SCORE_SUFFIX
            } else {
                continue;
            };
            if best.as_ref().is_some_and(|(s, _)| *s >= score) {
                continue;
            }
            if let Some(id) = self.find_in_module_root(name, path, context, true) {
                best = Some((score, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Match a bare word against the modules visited during this resolve.
    fn find_module_named(
        &self,
        name: &str,
        traversed: &FxHashSet<ModulePath>,
    ) -> Option<SymbolId> {
        for path in traversed {
            if path.last().is_some_and(|last| last == name) || path.to_string() == name {
                if let Some(&section) = self.project.module_sections(path).first() {
                    return Some(section);
                }
            }
        }
        None
    }

    /// Visibility filter: private symbols are only reachable from their
    /// own module subtree.
    pub(crate) fn is_visible(&self, symbol: &Symbol, context: &ModulePath) -> bool {
        match symbol.visibility {
            crate::semantic::symbols::Visibility::Public => true,
            crate::semantic::symbols::Visibility::Private => {
                context.is_implicitly_imported(&symbol.module)
            }
        }
    }

    // =========================================================================
    // Type resolution
    // =========================================================================

    /// Resolve a written type to its declaring symbol. Builtins resolve
    /// to nothing.
    pub(crate) fn resolve_type(
        &self,
        type_ref: &TypeRef,
        context: &ModulePath,
    ) -> QueryResult<Option<SymbolId>> {
        self.check_cancelled()?;
        if !type_ref.is_resolvable() {
            return Ok(None);
        }
        if !self.guard_hops() {
            return Ok(None);
        }
        if type_ref.is_qualified() {
            return Ok(self.find_with_prefix(&type_ref.name, &type_ref.module, context));
        }
        let mut traversed = FxHashSet::default();
        self.find_from_module(&type_ref.name, context, context, &mut traversed)
    }

    /// Convert a value-bearing symbol to the symbol of its type.
    /// Inspectable symbols are returned unchanged.
    pub(crate) fn resolve(&self, id: SymbolId) -> QueryResult<Option<SymbolId>> {
        let Some(symbol) = self.project.symbol(id) else {
            return Ok(None);
        };
        if symbol.is_inspectable() {
            return Ok(Some(id));
        }
        let context = symbol.module.clone();
        match symbol.value_type() {
            Some(type_ref) => {
                let type_ref = type_ref.clone();
                self.resolve_type(&type_ref, &context)
            }
            None => Ok(None),
        }
    }

    /// Look up the method `type_name.method` among the functions of the
    /// module that owns the type, falling back to implicitly visible
    /// modules.
    pub(crate) fn find_method(
        &self,
        type_name: &str,
        method: &str,
        module: &ModulePath,
    ) -> Option<SymbolId> {
        let exact = |path: &ModulePath| {
            self.project
                .find_by_fqn(&method_query(path, type_name, method))
                .into_iter()
                .find(|&id| {
                    self.project
                        .symbol(id)
                        .is_some_and(|s| matches!(s.kind, SymbolKind::Function(_)))
                })
        };
        if let Some(id) = exact(module) {
            return Some(id);
        }
        for (path, _) in self.project.modules() {
            if path != module && module.is_implicitly_imported(path) {
                if let Some(id) = exact(path) {
                    return Some(id);
                }
            }
        }
        None
    }

    /// All methods declared for `type_name` in and around its module.
    pub(crate) fn methods_of(&self, type_name: &str, module: &ModulePath) -> Vec<SymbolId> {
        let mut out = Vec::new();
        for (path, _) in self.project.modules() {
            if path != module && !module.is_implicitly_imported(path) {
                continue;
            }
            out.extend(
                self.project
                    .find_by_fqn(&method_query(path, type_name, "*"))
                    .into_iter()
                    .filter(|&id| {
                        self.project
                            .symbol(id)
                            .is_some_and(|s| matches!(s.kind, SymbolKind::Function(_)))
                    }),
            );
        }
        out
    }

    /// Generic parameter names of a module, if it declares any.
    pub(crate) fn generic_params(&self, module: &ModulePath) -> Vec<smol_str::SmolStr> {
        for &section in self.project.module_sections(module) {
            if let Some(SymbolKind::Module(data)) =
                self.project.symbol(section).map(|s| &s.kind)
            {
                if !data.generic_params.is_empty() {
                    return data.generic_params.clone();
                }
            }
        }
        Vec::new()
    }

    /// Modules visible from `context` without explicit imports, plus the
    /// ones its sections import. Used by the completion engine.
    pub fn loadable_modules(&self, context: &ModulePath) -> Vec<ModulePath> {
        let mut out: Vec<ModulePath> = Vec::new();
        let mut push = |path: &ModulePath| {
            if !out.contains(path) {
                out.push(path.clone());
            }
        };
        for (path, _) in self.project.modules() {
            if context.is_implicitly_imported(path) {
                push(path);
            }
        }
        for &section in self.project.module_sections(context) {
            if let Some(SymbolKind::Module(data)) =
                self.project.symbol(section).map(|s| &s.kind)
            {
                for import in &data.imports {
                    for (path, _) in self.project.modules() {
                        if path == import || path.ends_with(import) {
                            push(path);
                        }
                    }
                }
            }
        }
        out
    }
}

/// FQN query for `Type.method` within a module. `*` as the method lists
/// every method of the type.
fn method_query(path: &ModulePath, type_name: &str, method: &str) -> String {
    if path.is_empty() {
        format!("{type_name}.{method}")
    } else {
        format!("{path}::{type_name}.{method}")
    }
}
