//! Project-wide symbol storage.
//!
//! All symbols live in one arena. Each document owns a slice of ids; when
//! a document is reindexed its old ids are freed and reused. Module
//! sections are indexed by module path so the resolver can enumerate a
//! module's symbols across files.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{Position, Range};
use crate::semantic::symbols::{ModulePath, Symbol, SymbolId, SymbolKind};

/// The symbol table for every open document.
#[derive(Debug, Default)]
pub struct Project {
    arena: Vec<Option<Symbol>>,
    free: Vec<SymbolId>,
    /// Every symbol id belonging to a document, for wholesale removal.
    by_document: FxHashMap<SmolStr, Vec<SymbolId>>,
    /// Module-section symbols per module path. Insertion order is kept so
    /// completion output is stable.
    modules: IndexMap<ModulePath, Vec<SymbolId>>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Arena access
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.arena.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.arena.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    /// Allocate a slot, reusing a freed one when available.
    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        if let Some(id) = self.free.pop() {
            self.arena[id.index()] = Some(symbol);
            id
        } else {
            let id = SymbolId::new(self.arena.len());
            self.arena.push(Some(symbol));
            id
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    // =========================================================================
    // Document lifecycle
    // =========================================================================

    /// Register a freshly indexed document. `ids` must contain every symbol
    /// allocated for it, including nested ones.
    pub fn install_document(&mut self, uri: &str, ids: Vec<SymbolId>) {
        for &id in &ids {
            let Some(symbol) = self.symbol(id) else {
                continue;
            };
            if matches!(symbol.kind, SymbolKind::Module(_)) {
                let path = symbol.module.clone();
                self.modules.entry(path).or_default().push(id);
            }
        }
        debug!(uri, symbols = ids.len(), "indexed document");
        self.by_document.insert(SmolStr::new(uri), ids);
    }

    /// Drop every symbol of a document and free its arena slots.
    pub fn remove_document(&mut self, uri: &str) {
        let Some(ids) = self.by_document.remove(uri) else {
            return;
        };
        for &id in &ids {
            if let Some(slot) = self.arena.get_mut(id.index()) {
                *slot = None;
            }
            self.free.push(id);
        }
        for sections in self.modules.values_mut() {
            sections.retain(|id| !ids.contains(id));
        }
        self.modules.retain(|_, sections| !sections.is_empty());
        debug!(uri, removed = ids.len(), "removed document symbols");
    }

    pub fn document_symbols(&self, uri: &str) -> &[SymbolId] {
        self.by_document.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_document(&self, uri: &str) -> bool {
        self.by_document.contains_key(uri)
    }

    // =========================================================================
    // Module lookup
    // =========================================================================

    /// Module-section symbols declaring exactly `path`, across all files.
    pub fn module_sections(&self, path: &ModulePath) -> &[SymbolId] {
        self.modules.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All known module paths with their section symbols.
    pub fn modules(&self) -> impl Iterator<Item = (&ModulePath, &[SymbolId])> {
        self.modules.iter().map(|(path, ids)| (path, ids.as_slice()))
    }

    /// Top-level symbols of a module across every declaring file.
    pub fn module_root_symbols<'a>(
        &'a self,
        path: &ModulePath,
    ) -> impl Iterator<Item = SymbolId> + 'a {
        self.module_sections(path)
            .iter()
            .filter_map(|id| self.symbol(*id))
            .flat_map(|section| section.children.iter().copied())
    }

    /// The module section containing a position in a document.
    pub fn section_at(&self, uri: &str, position: Position) -> Option<SymbolId> {
        self.document_symbols(uri)
            .iter()
            .copied()
            .filter(|id| {
                self.symbol(*id).is_some_and(|s| {
                    matches!(s.kind, SymbolKind::Module(_)) && s.decl_range.contains(position)
                })
            })
            .last()
    }

    /// The innermost function whose body encloses a position.
    pub fn function_at(&self, uri: &str, position: Position) -> Option<SymbolId> {
        let mut best: Option<(SymbolId, Range)> = None;
        for &id in self.document_symbols(uri) {
            let Some(symbol) = self.symbol(id) else {
                continue;
            };
            let SymbolKind::Function(data) = &symbol.kind else {
                continue;
            };
            let Some(body) = data.body_range else {
                continue;
            };
            if !body.contains(position) {
                continue;
            }
            match best {
                Some((_, prev)) if prev.encloses(body) => best = Some((id, body)),
                None => best = Some((id, body)),
                _ => {}
            }
        }
        best.map(|(id, _)| id)
    }

    /// The innermost symbol whose name range covers a position. Used by
    /// find-implementations to see what declaration the cursor is on.
    pub fn declaration_at(&self, uri: &str, position: Position) -> Option<SymbolId> {
        self.document_symbols(uri)
            .iter()
            .copied()
            .filter(|id| {
                self.symbol(*id)
                    .is_some_and(|s| s.ident_range.contains(position))
            })
            .min_by_key(|id| {
                let range = self.symbol(*id).map(|s| s.decl_range).unwrap_or_default();
                (
                    range.end.line.saturating_sub(range.start.line),
                    range.end.character.saturating_sub(range.start.character),
                )
            })
    }

    /// Every live symbol, for workspace-wide scans.
    pub fn all_symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.arena
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (SymbolId::new(i), s)))
    }

    /// Case-sensitive lookup by fully qualified name. A trailing `*` makes
    /// the query a prefix match, so `app::Color.*` lists every method of
    /// `Color` declared in module `app`.
    pub fn find_by_fqn(&self, query: &str) -> Vec<SymbolId> {
        match query.strip_suffix('*') {
            Some(prefix) => self
                .all_symbols()
                .filter(|(_, symbol)| symbol.fqn().starts_with(prefix))
                .map(|(id, _)| id)
                .collect(),
            None => self
                .all_symbols()
                .filter(|(_, symbol)| symbol.fqn() == query)
                .map(|(id, _)| id)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::symbols::{ModuleData, Visibility};
    use smol_str::SmolStr;

    fn module_symbol(path: &str, uri: &str) -> Symbol {
        Symbol {
            name: SmolStr::new(path),
            module: ModulePath::from_text(path),
            uri: SmolStr::new(uri),
            ident_range: Range::default(),
            decl_range: Range::from_coords(0, 0, 100, 0),
            visibility: Visibility::Public,
            doc: None,
            parent: None,
            children: Vec::new(),
            kind: SymbolKind::Module(ModuleData::default()),
        }
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut project = Project::new();
        let id = project.alloc(module_symbol("app", "a.strom"));
        project.install_document("a.strom", vec![id]);
        project.remove_document("a.strom");
        assert!(project.symbol(id).is_none());

        let id2 = project.alloc(module_symbol("other", "b.strom"));
        assert_eq!(id, id2);
        assert_eq!(project.symbol_count(), 1);
    }

    #[test]
    fn fqn_queries_support_method_wildcards() {
        use crate::semantic::symbols::{FunctionData, FunctionKind};

        let mut project = Project::new();
        let section = project.alloc(module_symbol("app", "a.strom"));
        let mut mix = module_symbol("app", "a.strom");
        mix.name = SmolStr::new("mix");
        mix.kind = SymbolKind::Function(FunctionData {
            kind: FunctionKind::Method,
            return_type: None,
            type_prefix: Some(SmolStr::new("Color")),
            params: Vec::new(),
            body_param: None,
            body_range: None,
        });
        let mix = project.alloc(mix);
        project.install_document("a.strom", vec![section, mix]);

        assert_eq!(project.find_by_fqn("app::Color.mix"), vec![mix]);
        assert_eq!(project.find_by_fqn("app::Color.*"), vec![mix]);
        assert!(project.find_by_fqn("app::Color.blend").is_empty());
    }

    #[test]
    fn module_index_spans_documents() {
        let mut project = Project::new();
        let a = project.alloc(module_symbol("app", "a.strom"));
        let b = project.alloc(module_symbol("app", "b.strom"));
        project.install_document("a.strom", vec![a]);
        project.install_document("b.strom", vec![b]);
        assert_eq!(
            project.module_sections(&ModulePath::from_text("app")),
            &[a, b]
        );

        project.remove_document("a.strom");
        assert_eq!(
            project.module_sections(&ModulePath::from_text("app")),
            &[b]
        );
    }
}
