//! The access-path walker.
//!
//! Given a dotted chain like `obj.sub.method()`, the walker resolves the
//! root in scope, then consumes one step at a time: fields on structs,
//! enumerators on enum types, associated values on enum instances,
//! constants on faults, and methods on any type via the synthetic
//! `Type.method` name. Value symbols are converted to their type between
//! steps.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use crate::base::Position;
use crate::semantic::symbols::{SymbolId, SymbolKind, TypeRef};
use crate::semantic::QueryResult;

use super::name_resolver::Resolver;
use super::word::{Word, WordSpan};

/// Distinct provenance: how the walker arrived at the current symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FromDistinct {
    #[default]
    Not,
    Inline,
    NonInline,
}

/// Walker position state carried between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkState {
    /// True while the symbol stands for the type itself (`Color.`), false
    /// once we hold a value (`v.`).
    pub members_readable: bool,
    pub from_distinct: FromDistinct,
}

impl Default for WalkState {
    fn default() -> Self {
        Self {
            members_readable: true,
            from_distinct: FromDistinct::Not,
        }
    }
}

pub struct Walker<'a, 'r> {
    resolver: &'r Resolver<'a>,
    /// Generic-parameter bindings captured while stepping through
    /// generic-module types.
    bindings: FxHashMap<SmolStr, TypeRef>,
    steps: usize,
}

impl<'a, 'r> Walker<'a, 'r> {
    pub fn new(resolver: &'r Resolver<'a>) -> Self {
        Self {
            resolver,
            bindings: FxHashMap::default(),
            steps: 0,
        }
    }

    /// Resolve a full chain to its final symbol.
    pub fn walk(
        &mut self,
        word: &Word,
        cursor: Position,
        uri: &str,
    ) -> QueryResult<Option<SymbolId>> {
        let chain = word.full_chain();
        self.walk_chain(&chain, word, cursor, uri)
            .map(|result| result.map(|(id, _)| id))
    }

    /// Resolve only the prefix of a chain (everything before the final
    /// word), returning the symbol to enumerate members on. Used by the
    /// completion engine.
    pub fn walk_prefix(
        &mut self,
        word: &Word,
        cursor: Position,
        uri: &str,
    ) -> QueryResult<Option<(SymbolId, WalkState)>> {
        self.walk_chain(&word.access_path.clone(), word, cursor, uri)
    }

    fn walk_chain(
        &mut self,
        chain: &[WordSpan],
        word: &Word,
        cursor: Position,
        uri: &str,
    ) -> QueryResult<Option<(SymbolId, WalkState)>> {
        let Some(root) = chain.first() else {
            return Ok(None);
        };
        let root_word = Word {
            text: root.text.clone(),
            range: root.range,
            module_prefix: word.module_prefix.clone(),
            access_path: Vec::new(),
        };
        let Some(mut current) = self.resolver.find_standalone(&root_word, cursor, uri)? else {
            return Ok(None);
        };

        let mut state = WalkState {
            members_readable: self
                .resolver
                .project()
                .symbol(current)
                .is_some_and(|s| s.is_type()),
            from_distinct: FromDistinct::Not,
        };

        for step in &chain[1..] {
            self.resolver.check_cancelled()?;
            match self.consume_step(current, &step.text, &mut state)? {
                Some(next) => {
                    trace!(step = %step.text, "access path step resolved");
                    current = next;
                    state.members_readable = false;
                }
                None => return Ok(None),
            }
        }
        Ok(Some((current, state)))
    }

    /// Resolve one `.name` step against the current symbol.
    fn consume_step(
        &mut self,
        from: SymbolId,
        name: &str,
        state: &mut WalkState,
    ) -> QueryResult<Option<SymbolId>> {
        let mut current = from;
        loop {
            if !self.tick()? {
                return Ok(None);
            }
            let Some(symbol) = self.resolver.project().symbol(current) else {
                return Ok(None);
            };
            match &symbol.kind {
                SymbolKind::Distinct(data) => {
                    // Distinct-own methods are always reachable.
                    if let Some(id) =
                        self.resolver
                            .find_method(&symbol.name, name, &symbol.module)
                    {
                        return Ok(Some(id));
                    }
                    // The type name never exposes the base; non-inline
                    // instances expose nothing beyond their own methods.
                    if state.members_readable || !data.is_inline {
                        state.from_distinct = FromDistinct::NonInline;
                        return Ok(None);
                    }
                    state.from_distinct = FromDistinct::Inline;
                    let base = data.base_type.clone();
                    let module = symbol.module.clone();
                    match self.resolve_written_type(&base, &module)? {
                        Some(next) => {
                            current = next;
                            continue;
                        }
                        None => return Ok(None),
                    }
                }
                // Substructs carry their fields as children directly.
                SymbolKind::StructMember(data) if data.is_substruct => {
                    return Ok(self.find_child(current, name));
                }
                _ if !symbol.is_inspectable() => {
                    match self.chase_value_type(current)? {
                        Some(next) => {
                            state.members_readable = false;
                            current = next;
                            continue;
                        }
                        None => return Ok(None),
                    }
                }
                SymbolKind::Struct(_) | SymbolKind::Bitstruct(_) => {
                    let mut visited = FxHashSet::default();
                    if let Some(id) = self.find_field(current, name, &mut visited)? {
                        return Ok(Some(id));
                    }
                    let (type_name, module) = (symbol.name.clone(), symbol.module.clone());
                    return Ok(self.resolver.find_method(&type_name, name, &module));
                }
                SymbolKind::Enum(_) => {
                    if state.members_readable {
                        if let Some(id) = self.find_child(current, name) {
                            return Ok(Some(id));
                        }
                    } else if let Some(id) = self.find_assoc_value(current, name) {
                        return Ok(Some(id));
                    }
                    let (type_name, module) = (symbol.name.clone(), symbol.module.clone());
                    return Ok(self.resolver.find_method(&type_name, name, &module));
                }
                SymbolKind::Enumerator(data) => {
                    for &assoc in &data.assoc_values {
                        if self
                            .resolver
                            .project()
                            .symbol(assoc)
                            .is_some_and(|s| s.name == name)
                        {
                            return Ok(Some(assoc));
                        }
                    }
                    return Ok(self.parent_method(symbol.parent, name));
                }
                SymbolKind::Fault => {
                    if state.members_readable {
                        if let Some(id) = self.find_child(current, name) {
                            return Ok(Some(id));
                        }
                    }
                    let (type_name, module) = (symbol.name.clone(), symbol.module.clone());
                    return Ok(self.resolver.find_method(&type_name, name, &module));
                }
                SymbolKind::FaultConstant => {
                    return Ok(self.parent_method(symbol.parent, name));
                }
                SymbolKind::Interface => {
                    return Ok(self.find_child(current, name));
                }
                _ => return Ok(None),
            }
        }
    }

    // =========================================================================
    // Member lookups
    // =========================================================================

    /// Direct child by name.
    fn find_child(&self, parent: SymbolId, name: &str) -> Option<SymbolId> {
        let symbol = self.resolver.project().symbol(parent)?;
        symbol.children.iter().copied().find(|&id| {
            self.resolver
                .project()
                .symbol(id)
                .is_some_and(|s| s.name == name)
        })
    }

    /// Field lookup on a struct, hoisting `inline` members' fields. The
    /// first inline member that resolves wins.
    fn find_field(
        &mut self,
        struct_id: SymbolId,
        name: &str,
        visited: &mut FxHashSet<SymbolId>,
    ) -> QueryResult<Option<SymbolId>> {
        if !visited.insert(struct_id) {
            return Ok(None);
        }
        if let Some(id) = self.find_child(struct_id, name) {
            return Ok(Some(id));
        }
        let Some(symbol) = self.resolver.project().symbol(struct_id) else {
            return Ok(None);
        };
        let inline_members: Vec<SymbolId> = symbol
            .children
            .iter()
            .copied()
            .filter(|&id| {
                matches!(
                    self.resolver.project().symbol(id).map(|s| &s.kind),
                    Some(SymbolKind::StructMember(data)) if data.is_inline
                )
            })
            .collect();
        for member in inline_members {
            if let Some(parent_type) = self.chase_value_type(member)? {
                if let Some(id) = self.find_field(parent_type, name, visited)? {
                    return Ok(Some(id));
                }
            }
        }
        Ok(None)
    }

    /// Associated value of an enum accessed through an instance. The
    /// bindings mirror the enum's parameter list on every enumerator.
    fn find_assoc_value(&self, enum_id: SymbolId, name: &str) -> Option<SymbolId> {
        let symbol = self.resolver.project().symbol(enum_id)?;
        let first = symbol.children.iter().copied().find(|&id| {
            matches!(
                self.resolver.project().symbol(id).map(|s| &s.kind),
                Some(SymbolKind::Enumerator(_))
            )
        })?;
        self.find_child(first, name)
    }

    fn parent_method(&self, parent: Option<SymbolId>, name: &str) -> Option<SymbolId> {
        let parent = self.resolver.project().symbol(parent?)?;
        self.resolver
            .find_method(&parent.name, name, &parent.module)
    }

    // =========================================================================
    // Type chasing and generic substitution
    // =========================================================================

    /// Resolve a value symbol's written type, applying generic bindings.
    fn chase_value_type(&mut self, id: SymbolId) -> QueryResult<Option<SymbolId>> {
        let Some(symbol) = self.resolver.project().symbol(id) else {
            return Ok(None);
        };
        let Some(type_ref) = symbol.value_type() else {
            return Ok(None);
        };
        let (type_ref, module) = (type_ref.clone(), symbol.module.clone());
        self.resolve_written_type(&type_ref, &module)
    }

    fn resolve_written_type(
        &mut self,
        type_ref: &TypeRef,
        context: &crate::semantic::symbols::ModulePath,
    ) -> QueryResult<Option<SymbolId>> {
        let type_ref = self.substitute(type_ref);
        let resolved = self.resolver.resolve_type(&type_ref, context)?;
        if let Some(id) = resolved {
            self.capture_bindings(id, &type_ref);
        }
        Ok(resolved)
    }

    /// Replace a generic parameter name with its bound concrete type.
    fn substitute(&self, type_ref: &TypeRef) -> TypeRef {
        match self.bindings.get(&type_ref.name) {
            Some(bound) => bound.clone(),
            None => type_ref.clone(),
        }
    }

    /// When a reference like `List(<int>)` lands on a type declared in a
    /// generic module, bind the module's parameters to the written
    /// arguments for subsequent member-type resolution.
    fn capture_bindings(&mut self, type_symbol: SymbolId, type_ref: &TypeRef) {
        if type_ref.generic_args.is_empty() {
            return;
        }
        let Some(symbol) = self.resolver.project().symbol(type_symbol) else {
            return;
        };
        let params = self.resolver.generic_params(&symbol.module);
        for (param, arg) in params.iter().zip(&type_ref.generic_args) {
            let concrete = self.substitute(arg);
            self.bindings.insert(param.clone(), concrete);
        }
    }

    /// Step budget against pathological alias chains.
    fn tick(&mut self) -> QueryResult<bool> {
        self.resolver.check_cancelled()?;
        self.steps += 1;
        if self.steps > self.resolver.limits().walker_steps {
            tracing::warn!(steps = self.steps, "access path walker step limit reached");
            return Ok(false);
        }
        Ok(true)
    }

    // =========================================================================
    // Completion support
    // =========================================================================

    /// Every member reachable after a trailing `.`, honoring the same
    /// rules as [`Self::consume_step`].
    pub fn members_for_completion(
        &mut self,
        from: SymbolId,
        state: WalkState,
    ) -> QueryResult<Vec<SymbolId>> {
        let mut current = from;
        let mut state = state;
        loop {
            if !self.tick()? {
                return Ok(Vec::new());
            }
            let Some(symbol) = self.resolver.project().symbol(current) else {
                return Ok(Vec::new());
            };
            match &symbol.kind {
                SymbolKind::Distinct(data) => {
                    let mut out =
                        self.resolver.methods_of(&symbol.name, &symbol.module);
                    if !state.members_readable && data.is_inline {
                        let base = data.base_type.clone();
                        let module = symbol.module.clone();
                        if let Some(base_id) = self.resolve_written_type(&base, &module)? {
                            let mut inline_state = state;
                            inline_state.from_distinct = FromDistinct::Inline;
                            out.extend(
                                self.members_for_completion(base_id, inline_state)?,
                            );
                        }
                    }
                    return Ok(out);
                }
                SymbolKind::StructMember(data) if data.is_substruct => {
                    return Ok(symbol.children.to_vec());
                }
                _ if !symbol.is_inspectable() => match self.chase_value_type(current)? {
                    Some(next) => {
                        state.members_readable = false;
                        current = next;
                    }
                    None => return Ok(Vec::new()),
                },
                SymbolKind::Struct(_) | SymbolKind::Bitstruct(_) => {
                    let mut out = Vec::new();
                    let mut visited = FxHashSet::default();
                    self.collect_fields(current, &mut out, &mut visited)?;
                    out.extend(self.resolver.methods_of(&symbol.name, &symbol.module));
                    return Ok(out);
                }
                SymbolKind::Enum(_) => {
                    let mut out = Vec::new();
                    if state.members_readable {
                        out.extend(symbol.children.iter().copied());
                    } else if let Some(first) = symbol.children.first().copied() {
                        if let Some(enumerator) = self.resolver.project().symbol(first) {
                            out.extend(enumerator.children.iter().copied());
                        }
                    }
                    out.extend(self.resolver.methods_of(&symbol.name, &symbol.module));
                    return Ok(out);
                }
                SymbolKind::Enumerator(data) => {
                    let mut out = data.assoc_values.clone();
                    if let Some(parent) = symbol.parent.and_then(|p| self.resolver.project().symbol(p))
                    {
                        out.extend(self.resolver.methods_of(&parent.name, &parent.module));
                    }
                    return Ok(out);
                }
                SymbolKind::Fault => {
                    let mut out = Vec::new();
                    if state.members_readable {
                        out.extend(symbol.children.iter().copied());
                    }
                    out.extend(self.resolver.methods_of(&symbol.name, &symbol.module));
                    return Ok(out);
                }
                SymbolKind::FaultConstant => {
                    let Some(parent) =
                        symbol.parent.and_then(|p| self.resolver.project().symbol(p))
                    else {
                        return Ok(Vec::new());
                    };
                    return Ok(self.resolver.methods_of(&parent.name, &parent.module));
                }
                SymbolKind::Interface => {
                    return Ok(symbol.children.to_vec());
                }
                _ => return Ok(Vec::new()),
            }
        }
    }

    /// Fields of a struct including hoisted inline-member fields.
    fn collect_fields(
        &mut self,
        struct_id: SymbolId,
        out: &mut Vec<SymbolId>,
        visited: &mut FxHashSet<SymbolId>,
    ) -> QueryResult<()> {
        if !visited.insert(struct_id) {
            return Ok(());
        }
        let Some(symbol) = self.resolver.project().symbol(struct_id) else {
            return Ok(());
        };
        let children = symbol.children.clone();
        out.extend(children.iter().copied());
        for id in children {
            if matches!(
                self.resolver.project().symbol(id).map(|s| &s.kind),
                Some(SymbolKind::StructMember(data)) if data.is_inline
            ) {
                if let Some(parent_type) = self.chase_value_type(id)? {
                    self.collect_fields(parent_type, out, visited)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{LineIndex, Position, Range};
    use crate::parser::{AstNode, SourceFile, parse};
    use crate::semantic::symbols::ModulePath;
    use crate::semantic::{Project, index_document};
    use smol_str::SmolStr;
    use tokio_util::sync::CancellationToken;

    fn project_with(docs: &[(&str, &str, &str)]) -> Project {
        let mut project = Project::new();
        for (uri, stem, text) in docs {
            let parse = parse(text);
            let file = SourceFile::cast(parse.syntax()).unwrap();
            let line_index = LineIndex::new(text);
            let ids = index_document(&mut project, uri, stem, text, &line_index, &file);
            project.install_document(uri, ids);
        }
        project
    }

    fn chain(words: &[&str]) -> Word {
        let spans: Vec<WordSpan> = words
            .iter()
            .map(|w| WordSpan::new(SmolStr::new(*w), Range::default()))
            .collect();
        let (last, rest) = spans.split_last().unwrap();
        Word {
            text: last.text.clone(),
            range: last.range,
            module_prefix: ModulePath::default(),
            access_path: rest.to_vec(),
        }
    }

    fn walk(project: &Project, uri: &str, word: &Word, cursor: Position) -> Option<SymbolId> {
        let cancel = CancellationToken::new();
        let resolver = crate::semantic::resolver::Resolver::new(project, &cancel);
        Walker::new(&resolver).walk(word, cursor, uri).unwrap()
    }

    #[test]
    fn generic_bindings_flow_through_member_types() {
        let project = project_with(&[
            (
                "file:///list.strom",
                "list",
                "module list(<Elem>);\n\
                 struct List {\n\
                 \x20   Elem head;\n\
                 }\n\
                 struct Point {\n\
                 \x20   int x;\n\
                 }\n",
            ),
            (
                "file:///app.strom",
                "app",
                "module app;\n\
                 import list;\n\
                 fn void use() {\n\
                 \x20   List(<Point>) items;\n\
                 \x20   items.head.x;\n\
                 }\n",
            ),
        ]);

        let word = chain(&["items", "head", "x"]);
        let id = walk(&project, "file:///app.strom", &word, Position::new(4, 15)).unwrap();
        let symbol = project.symbol(id).unwrap();
        assert_eq!(symbol.name, "x");
        assert_eq!(symbol.uri, "file:///list.strom");
    }

    #[test]
    fn inline_member_cycles_do_not_loop() {
        let project = project_with(&[(
            "file:///cycle.strom",
            "cycle",
            "module cycle;\n\
             struct A {\n\
             \x20   inline B b;\n\
             }\n\
             struct B {\n\
             \x20   inline A a;\n\
             }\n\
             fn void go() {\n\
             \x20   A value;\n\
             \x20   value.missing;\n\
             }\n",
        )]);

        let word = chain(&["value", "missing"]);
        assert!(walk(&project, "file:///cycle.strom", &word, Position::new(9, 12)).is_none());
    }

    #[test]
    fn completion_members_respect_type_versus_instance() {
        let text = "module colors;\n\
                    enum Color : int (String label) {\n\
                    \x20   RED(\"red\")\n\
                    }\n\
                    fn void pick() {\n\
                    \x20   Color c;\n\
                    }\n";
        let project = project_with(&[("file:///colors.strom", "colors", text)]);
        let cancel = CancellationToken::new();
        let resolver = crate::semantic::resolver::Resolver::new(&project, &cancel);

        // Type position: enumerators.
        let mut walker = Walker::new(&resolver);
        let word = chain(&["Color", ""]);
        let (id, state) = walker
            .walk_prefix(&word, Position::new(5, 10), "file:///colors.strom")
            .unwrap()
            .unwrap();
        let names: Vec<SmolStr> = walker
            .members_for_completion(id, state)
            .unwrap()
            .iter()
            .filter_map(|&m| project.symbol(m).map(|s| s.name.clone()))
            .collect();
        assert!(names.contains(&SmolStr::new("RED")));
        assert!(!names.contains(&SmolStr::new("label")));

        // Instance position: associated values.
        let mut walker = Walker::new(&resolver);
        let word = chain(&["c", ""]);
        let (id, state) = walker
            .walk_prefix(&word, Position::new(5, 12), "file:///colors.strom")
            .unwrap()
            .unwrap();
        let names: Vec<SmolStr> = walker
            .members_for_completion(id, state)
            .unwrap()
            .iter()
            .filter_map(|&m| project.symbol(m).map(|s| s.name.clone()))
            .collect();
        assert!(names.contains(&SmolStr::new("label")));
        assert!(!names.contains(&SmolStr::new("RED")));
    }
}
