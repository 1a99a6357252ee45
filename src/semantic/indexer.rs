//! Lowers a parsed document into symbols.
//!
//! The indexer walks the typed AST once, grouping top-level items into
//! module sections and allocating one symbol per declared name. Function
//! bodies are scanned for local declarations so the resolver can handle
//! scoped lookups.

use rowan::TextRange;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::{LineIndex, Range};
use crate::parser::{self, AstNode, Item, SourceFile, SyntaxNode, doc_comment_text};
use crate::semantic::Project;
use crate::semantic::symbols::{
    BitstructData, DefData, DistinctData, DocComment, EnumData, EnumeratorData, FunctionData,
    FunctionKind, MemberData, ModuleData, ModulePath, StructData, Symbol, SymbolId, SymbolKind,
    TypeRef, VariableData, VariableKind, Visibility,
};

/// Index one document, returning every allocated symbol id. The caller is
/// expected to pass the result to [`Project::install_document`].
pub fn index_document(
    project: &mut Project,
    uri: &str,
    file_stem: &str,
    text: &str,
    line_index: &LineIndex,
    file: &SourceFile,
) -> Vec<SymbolId> {
    let mut indexer = Indexer {
        project,
        uri: SmolStr::new(uri),
        text,
        line_index,
        ids: Vec::new(),
    };
    indexer.run(file_stem, file);
    indexer.ids
}

struct Indexer<'a> {
    project: &'a mut Project,
    uri: SmolStr,
    text: &'a str,
    line_index: &'a LineIndex,
    ids: Vec<SymbolId>,
}

impl Indexer<'_> {
    fn run(&mut self, file_stem: &str, file: &SourceFile) {
        let mut section: Option<SymbolId> = None;
        let end_of_file = self.range(TextRange::up_to(crate::base::TextSize::of(self.text)));

        for item in file.items() {
            match item {
                Item::Module(decl) => {
                    let path = decl
                        .path()
                        .map(|p| ModulePath::new(p.segments()))
                        .unwrap_or_else(|| ModulePath::from_file_stem(file_stem));
                    self.close_section(section, &decl);
                    section = Some(self.open_section(path, Some(&decl), end_of_file));
                }
                Item::Import(decl) => {
                    let section_id = self.section_or_default(&mut section, file_stem, end_of_file);
                    let paths: Vec<ModulePath> = decl
                        .paths()
                        .map(|p| ModulePath::new(p.segments()))
                        .collect();
                    if let Some(SymbolKind::Module(data)) = self
                        .project
                        .symbol_mut(section_id)
                        .map(|s| &mut s.kind)
                    {
                        // First occurrence wins; repeats are dropped.
                        for path in paths {
                            if !data.imports.contains(&path) {
                                data.imports.push(path);
                            }
                        }
                    }
                }
                other => {
                    let section_id =
                        self.section_or_default(&mut section, file_stem, end_of_file);
                    self.index_item(&other, section_id);
                }
            }
        }

        // Files may legally contain nothing but a module declaration.
        if section.is_none() && file.items().next().is_none() {
            trace!(uri = %self.uri, "empty document");
        }
    }

    /// End the current section at the start of the next module declaration.
    fn close_section(&mut self, section: Option<SymbolId>, next: &parser::ModuleDecl) {
        if let Some(id) = section {
            let next_start = self.range(next.syntax().text_range()).start;
            if let Some(symbol) = self.project.symbol_mut(id) {
                symbol.decl_range.end = next_start;
            }
        }
    }

    fn open_section(
        &mut self,
        path: ModulePath,
        decl: Option<&parser::ModuleDecl>,
        end_of_file: Range,
    ) -> SymbolId {
        let (ident_range, start, visibility, generic_params) = match decl {
            Some(decl) => {
                let ident_range = decl
                    .path()
                    .map(|p| self.range(p.syntax().text_range()))
                    .unwrap_or_default();
                let start = self.range(decl.syntax().text_range()).start;
                let visibility = if decl.is_private() {
                    Visibility::Private
                } else {
                    Visibility::Public
                };
                (ident_range, start, visibility, decl.generic_params())
            }
            None => (Range::default(), Range::default().start, Visibility::Public, Vec::new()),
        };

        let id = self.alloc(Symbol {
            name: SmolStr::new(path.to_string()),
            module: path.clone(),
            uri: self.uri.clone(),
            ident_range,
            decl_range: Range::new(start, end_of_file.end),
            visibility,
            doc: decl.and_then(|d| self.doc_of(d.syntax())),
            parent: None,
            children: Vec::new(),
            kind: SymbolKind::Module(ModuleData {
                imports: Vec::new(),
                generic_params: generic_params.clone(),
            }),
        });

        for param in generic_params {
            let child = self.alloc(Symbol {
                name: param,
                module: path.clone(),
                uri: self.uri.clone(),
                ident_range,
                decl_range: ident_range,
                visibility: Visibility::Public,
                doc: None,
                parent: Some(id),
                children: Vec::new(),
                kind: SymbolKind::GenericParameter,
            });
            self.attach(id, child);
        }

        id
    }

    fn section_or_default(
        &mut self,
        section: &mut Option<SymbolId>,
        file_stem: &str,
        end_of_file: Range,
    ) -> SymbolId {
        if let Some(id) = *section {
            return id;
        }
        let path = ModulePath::from_file_stem(file_stem);
        let id = self.open_section(path, None, end_of_file);
        *section = Some(id);
        id
    }

    // =========================================================================
    // Items
    // =========================================================================

    fn index_item(&mut self, item: &Item, parent: SymbolId) {
        match item {
            Item::Const(decl) => {
                if let Some(name) = decl.name() {
                    let kind = SymbolKind::Variable(VariableData {
                        type_ref: decl.type_ref().map(|t| TypeRef::from_ast(&t)),
                        kind: VariableKind::Constant,
                        scope: None,
                    });
                    let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
                    self.attach(parent, id);
                }
            }
            Item::Global(decl) => {
                let type_ref = decl.type_ref().map(|t| TypeRef::from_ast(&t));
                for name in decl.names() {
                    let kind = SymbolKind::Variable(VariableData {
                        type_ref: type_ref.clone(),
                        kind: VariableKind::Global,
                        scope: None,
                    });
                    let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
                    self.attach(parent, id);
                }
            }
            Item::Struct(decl) => self.index_struct(decl, parent),
            Item::Bitstruct(decl) => self.index_bitstruct(decl, parent),
            Item::Enum(decl) => self.index_enum(decl, parent),
            Item::Fault(decl) => self.index_fault(decl, parent),
            Item::Interface(decl) => self.index_interface(decl, parent),
            Item::Def(decl) => {
                if let (Some(name), Some(target)) = (decl.name(), decl.target()) {
                    let target = TypeRef::from_ast(&target);
                    let aliases_type = target.builtin
                        || target
                            .name
                            .chars()
                            .next()
                            .is_some_and(|c| c.is_uppercase());
                    let kind = SymbolKind::Def(DefData {
                        target,
                        aliases_type,
                    });
                    let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
                    self.attach(parent, id);
                }
            }
            Item::Distinct(decl) => {
                if let Some(name) = decl.name() {
                    let kind = SymbolKind::Distinct(DistinctData {
                        base_type: decl
                            .base_type()
                            .map(|t| TypeRef::from_ast(&t))
                            .unwrap_or_default(),
                        is_inline: decl.is_inline(),
                    });
                    let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
                    self.attach(parent, id);
                }
            }
            Item::Function(decl) => {
                if let Some(id) = self.index_function(decl, parent, FunctionKind::Function) {
                    self.attach(parent, id);
                }
            }
            Item::Module(_) | Item::Import(_) => {}
        }
    }

    fn index_struct(&mut self, decl: &parser::StructDecl, parent: SymbolId) {
        let Some(name) = decl.name() else { return };
        let kind = SymbolKind::Struct(StructData {
            is_union: decl.is_union(),
            interfaces: decl
                .interfaces()
                .iter()
                .map(TypeRef::from_ast)
                .collect(),
        });
        let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
        if let Some(body) = decl.body() {
            self.index_struct_body(&body, id);
        }
        self.attach(parent, id);
    }

    fn index_struct_body(&mut self, body: &parser::StructBody, parent: SymbolId) {
        for member in body.members() {
            match member {
                parser::StructMemberKind::Field(field) => {
                    let type_ref = field.type_ref().map(|t| TypeRef::from_ast(&t));
                    let bit_range = field.bit_range().and_then(|r| r.bounds());
                    for name in field.names() {
                        let kind = SymbolKind::StructMember(MemberData {
                            type_ref: type_ref.clone(),
                            is_inline: field.is_inline(),
                            bit_range,
                            is_substruct: false,
                        });
                        let id = self.symbol_from_tokens(&name, field.syntax(), parent, kind);
                        self.attach(parent, id);
                    }
                }
                parser::StructMemberKind::SubStruct(sub) => {
                    let name = sub
                        .name()
                        .map(|t| SmolStr::new(t.text()))
                        .unwrap_or_default();
                    let ident_range = sub
                        .name()
                        .map(|t| self.range(t.text_range()))
                        .unwrap_or_else(|| self.range(sub.syntax().text_range()));
                    let id = self.alloc_at(
                        name,
                        ident_range,
                        self.range(sub.syntax().text_range()),
                        Some(parent),
                        self.doc_of(sub.syntax()),
                        SymbolKind::StructMember(MemberData {
                            type_ref: None,
                            is_inline: false,
                            bit_range: None,
                            is_substruct: true,
                        }),
                    );
                    if let Some(body) = sub.body() {
                        self.index_struct_body(&body, id);
                    }
                    self.attach(parent, id);
                }
            }
        }
    }

    fn index_bitstruct(&mut self, decl: &parser::BitstructDecl, parent: SymbolId) {
        let Some(name) = decl.name() else { return };
        let kind = SymbolKind::Bitstruct(BitstructData {
            backing_type: decl.backing_type().map(|t| TypeRef::from_ast(&t)),
            interfaces: decl
                .interfaces()
                .iter()
                .map(TypeRef::from_ast)
                .collect(),
        });
        let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);
        if let Some(body) = decl.body() {
            self.index_struct_body(&body, id);
        }
        self.attach(parent, id);
    }

    fn index_enum(&mut self, decl: &parser::EnumDecl, parent: SymbolId) {
        let Some(name) = decl.name() else { return };
        let kind = SymbolKind::Enum(EnumData {
            backing_type: decl.backing_type().map(|t| TypeRef::from_ast(&t)),
        });
        let id = self.symbol_from_tokens(&name, decl.syntax(), parent, kind);

        let assoc_params: Vec<(SmolStr, Option<TypeRef>)> = decl
            .assoc_params()
            .iter()
            .filter_map(|p| {
                p.name().map(|n| {
                    (
                        SmolStr::new(n.text()),
                        p.type_ref().map(|t| TypeRef::from_ast(&t)),
                    )
                })
            })
            .collect();

        for enumerator in decl.enumerators() {
            let Some(name) = enumerator.name() else {
                continue;
            };
            let enumerator_id = self.symbol_from_tokens(
                &name,
                enumerator.syntax(),
                id,
                SymbolKind::Enumerator(EnumeratorData {
                    value: enumerator.value_text(),
                    assoc_values: Vec::new(),
                }),
            );
            let mut assoc_ids = Vec::new();
            for (param_name, param_type) in &assoc_params {
                let assoc = self.alloc_at(
                    param_name.clone(),
                    self.range(name.text_range()),
                    self.range(enumerator.syntax().text_range()),
                    Some(enumerator_id),
                    None,
                    SymbolKind::StructMember(MemberData {
                        type_ref: param_type.clone(),
                        is_inline: false,
                        bit_range: None,
                        is_substruct: false,
                    }),
                );
                self.attach(enumerator_id, assoc);
                assoc_ids.push(assoc);
            }
            if let Some(SymbolKind::Enumerator(data)) = self
                .project
                .symbol_mut(enumerator_id)
                .map(|s| &mut s.kind)
            {
                data.assoc_values = assoc_ids;
            }
            self.attach(id, enumerator_id);
        }
        self.attach(parent, id);
    }

    fn index_fault(&mut self, decl: &parser::FaultDecl, parent: SymbolId) {
        match decl.name() {
            Some(name) => {
                let id =
                    self.symbol_from_tokens(&name, decl.syntax(), parent, SymbolKind::Fault);
                for constant in decl.constants() {
                    if let Some(name) = constant.name() {
                        let child = self.symbol_from_tokens(
                            &name,
                            constant.syntax(),
                            id,
                            SymbolKind::FaultConstant,
                        );
                        self.attach(id, child);
                    }
                }
                self.attach(parent, id);
            }
            // `faultdef` constants live directly in the module.
            None => {
                for constant in decl.constants() {
                    if let Some(name) = constant.name() {
                        let id = self.symbol_from_tokens(
                            &name,
                            constant.syntax(),
                            parent,
                            SymbolKind::FaultConstant,
                        );
                        self.attach(parent, id);
                    }
                }
            }
        }
    }

    fn index_interface(&mut self, decl: &parser::InterfaceDecl, parent: SymbolId) {
        let Some(name) = decl.name() else { return };
        let id = self.symbol_from_tokens(&name, decl.syntax(), parent, SymbolKind::Interface);
        for method in decl.methods() {
            if let Some(method_id) =
                self.index_function(&method, id, FunctionKind::InterfaceMethod)
            {
                self.attach(id, method_id);
            }
        }
        self.attach(parent, id);
    }

    fn index_function(
        &mut self,
        decl: &parser::FnDecl,
        parent: SymbolId,
        default_kind: FunctionKind,
    ) -> Option<SymbolId> {
        let name = decl.name()?;
        let type_prefix = decl.type_prefix().map(|t| SmolStr::new(t.text()));
        let kind = if decl.is_macro() {
            FunctionKind::Macro
        } else if type_prefix.is_some() {
            FunctionKind::Method
        } else {
            default_kind
        };
        let body_range = decl.body().map(|b| self.range(b.syntax().text_range()));

        let id = self.symbol_from_tokens(
            &name,
            decl.syntax(),
            parent,
            SymbolKind::Function(FunctionData {
                kind,
                return_type: decl.return_type().map(|t| TypeRef::from_ast(&t)),
                type_prefix: type_prefix.clone(),
                params: Vec::new(),
                body_param: decl
                    .param_list()
                    .and_then(|list| list.trailing_body())
                    .map(|body| body.display_text()),
                body_range,
            }),
        );

        // Parameters are visible across the whole declaration.
        let param_scope = self.range(decl.syntax().text_range());
        let mut param_ids = Vec::new();
        for param in decl.params() {
            let (param_name, type_ref) = if param.is_self() {
                let receiver = type_prefix.clone().map(TypeRef::named);
                (SmolStr::new("self"), receiver)
            } else {
                let Some(name) = param.name() else { continue };
                (
                    SmolStr::new(name.text()),
                    param.type_ref().map(|t| TypeRef::from_ast(&t)),
                )
            };
            let param_id = self.alloc_at(
                param_name,
                self.range(
                    param
                        .name()
                        .map(|t| t.text_range())
                        .unwrap_or_else(|| param.syntax().text_range()),
                ),
                self.range(param.syntax().text_range()),
                Some(id),
                None,
                SymbolKind::Variable(VariableData {
                    type_ref,
                    kind: VariableKind::Parameter,
                    scope: Some(param_scope),
                }),
            );
            self.attach(id, param_id);
            param_ids.push(param_id);
        }
        if let Some(SymbolKind::Function(data)) =
            self.project.symbol_mut(id).map(|s| &mut s.kind)
        {
            data.params = param_ids;
        }

        if let Some(body) = decl.body() {
            self.index_block(&body, id);
        }
        Some(id)
    }

    /// Collect local declarations. Each local is visible within its
    /// enclosing block.
    fn index_block(&mut self, block: &parser::Block, function: SymbolId) {
        let scope = self.range(block.syntax().text_range());
        for local in block.local_decls() {
            let type_ref = local.type_ref().map(|t| TypeRef::from_ast(&t));
            for name in local.names() {
                let id = self.alloc_at(
                    SmolStr::new(name.text()),
                    self.range(name.text_range()),
                    self.range(local.syntax().text_range()),
                    Some(function),
                    None,
                    SymbolKind::Variable(VariableData {
                        type_ref: type_ref.clone(),
                        kind: VariableKind::Local,
                        scope: Some(scope),
                    }),
                );
                self.attach(function, id);
            }
        }
        for nested in block.all_nested_blocks() {
            let nested_scope = self.range(nested.syntax().text_range());
            for local in nested.local_decls() {
                let type_ref = local.type_ref().map(|t| TypeRef::from_ast(&t));
                for name in local.names() {
                    let id = self.alloc_at(
                        SmolStr::new(name.text()),
                        self.range(name.text_range()),
                        self.range(local.syntax().text_range()),
                        Some(function),
                        None,
                        SymbolKind::Variable(VariableData {
                            type_ref: type_ref.clone(),
                            kind: VariableKind::Local,
                            scope: Some(nested_scope),
                        }),
                    );
                    self.attach(function, id);
                }
            }
        }
    }

    // =========================================================================
    // Allocation helpers
    // =========================================================================

    fn symbol_from_tokens(
        &mut self,
        name: &crate::parser::SyntaxToken,
        node: &SyntaxNode,
        parent: SymbolId,
        kind: SymbolKind,
    ) -> SymbolId {
        self.alloc_at(
            SmolStr::new(name.text()),
            self.range(name.text_range()),
            self.range(node.text_range()),
            Some(parent),
            self.doc_of(node),
            kind,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn alloc_at(
        &mut self,
        name: SmolStr,
        ident_range: Range,
        decl_range: Range,
        parent: Option<SymbolId>,
        doc: Option<DocComment>,
        kind: SymbolKind,
    ) -> SymbolId {
        // Privacy cascades from the enclosing section or container.
        let (module, visibility) = parent
            .and_then(|p| self.project.symbol(p))
            .map(|s| (s.module.clone(), s.visibility))
            .unwrap_or_default();
        self.alloc(Symbol {
            name,
            module,
            uri: self.uri.clone(),
            ident_range,
            decl_range,
            visibility,
            doc,
            parent,
            children: Vec::new(),
            kind,
        })
    }

    fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.project.alloc(symbol);
        self.ids.push(id);
        id
    }

    fn attach(&mut self, parent: SymbolId, child: SymbolId) {
        if let Some(symbol) = self.project.symbol_mut(parent) {
            symbol.children.push(child);
        }
    }

    fn doc_of(&self, node: &SyntaxNode) -> Option<DocComment> {
        doc_comment_text(node).map(|raw| DocComment::parse(&raw))
    }

    fn range(&self, range: TextRange) -> Range {
        Range::new(
            self.line_index.position(range.start(), self.text),
            self.line_index.position(range.end(), self.text),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn index(text: &str) -> (Project, Vec<SymbolId>) {
        let mut project = Project::new();
        let parse = parse(text);
        let file = SourceFile::cast(parse.syntax()).unwrap();
        let line_index = LineIndex::new(text);
        let ids = index_document(&mut project, "file:///t.strom", "t", text, &line_index, &file);
        project.install_document("file:///t.strom", ids.clone());
        (project, ids)
    }

    fn find<'a>(project: &'a Project, name: &str) -> &'a Symbol {
        project
            .all_symbols()
            .map(|(_, s)| s)
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("symbol {name} not indexed"))
    }

    #[test]
    fn groups_items_into_module_sections() {
        let (project, _) = index(
            "module alpha;\nint a;\nmodule beta;\nint b;\n",
        );
        assert_eq!(find(&project, "a").module, ModulePath::from_text("alpha"));
        assert_eq!(find(&project, "b").module, ModulePath::from_text("beta"));
    }

    #[test]
    fn default_module_comes_from_file_stem() {
        let (project, _) = index("int lonely;\n");
        assert_eq!(find(&project, "lonely").module, ModulePath::from_text("t"));
    }

    #[test]
    fn repeated_imports_are_stored_once() {
        let (project, _) = index(
            "module app;\nimport std::io;\nimport std::io;\nimport net;\n",
        );
        let section = find(&project, "app");
        let SymbolKind::Module(data) = &section.kind else {
            panic!("expected a module section");
        };
        assert_eq!(
            data.imports,
            vec![ModulePath::from_text("std::io"), ModulePath::from_text("net")]
        );
    }

    #[test]
    fn bitstructs_record_their_interface_list() {
        let (project, _) = index(
            "module app;\nbitstruct Flags : int (Printable) { int raw : 0..7; }\n",
        );
        let flags = find(&project, "Flags");
        let SymbolKind::Bitstruct(data) = &flags.kind else {
            panic!("expected a bitstruct");
        };
        assert_eq!(data.interfaces.len(), 1);
        assert_eq!(data.interfaces[0].name, "Printable");
        assert_eq!(find(&project, "raw").parent, Some(project.find_by_fqn("app::Flags")[0]));
    }

    #[test]
    fn initializers_do_not_declare_locals() {
        let (project, _) = index(
            "module app;\nfn void main() {\n    int x = seed;\n}\n",
        );
        let names: Vec<_> = project
            .all_symbols()
            .map(|(_, s)| s.name.clone())
            .collect();
        assert!(names.iter().any(|n| n == "x"));
        assert!(!names.iter().any(|n| n == "seed"));
    }

    #[test]
    fn macros_keep_their_trailing_body_param() {
        let (project, _) = index(
            "module app;\nmacro int twice(int x; @body(int y)) { }\n",
        );
        let SymbolKind::Function(data) = &find(&project, "twice").kind else {
            panic!("expected a macro");
        };
        assert_eq!(data.body_param.as_deref(), Some("@body(int y)"));
    }

    #[test]
    fn methods_get_receiver_prefix_and_self_param() {
        let (project, _) = index("fn void Obj.free(&self) { int tmp; }\n");
        let method = find(&project, "free");
        let SymbolKind::Function(data) = &method.kind else {
            panic!("expected a function");
        };
        assert_eq!(data.kind, FunctionKind::Method);
        assert_eq!(data.type_prefix.as_deref(), Some("Obj"));

        let self_param = find(&project, "self");
        let SymbolKind::Variable(var) = &self_param.kind else {
            panic!()
        };
        assert_eq!(var.type_ref.as_ref().unwrap().name, "Obj");

        let local = find(&project, "tmp");
        assert!(local.scope().is_some());
    }

    #[test]
    fn enumerators_carry_associated_values() {
        let (project, _) = index(
            "enum Color : int (String name, int weight) { RED(\"red\", 1) }\n",
        );
        let red = find(&project, "RED");
        let SymbolKind::Enumerator(data) = &red.kind else {
            panic!()
        };
        assert_eq!(data.assoc_values.len(), 2);
        let weight = find(&project, "weight");
        assert!(matches!(weight.kind, SymbolKind::StructMember(_)));
    }

    #[test]
    fn anonymous_fault_constants_live_at_module_root() {
        let (project, _) = index("module m;\nfaultdef NOT_FOUND;\n");
        let constant = find(&project, "NOT_FOUND");
        let parent = project.symbol(constant.parent.unwrap()).unwrap();
        assert!(matches!(parent.kind, SymbolKind::Module(_)));
    }

    #[test]
    fn private_section_marks_symbols_private() {
        let (project, _) = index("module secret @private;\nint hidden;\n");
        assert_eq!(find(&project, "hidden").visibility, Visibility::Private);
    }

    #[test]
    fn reindexing_replaces_symbols() {
        let text_v1 = "module m;\nint old_name;\n";
        let text_v2 = "module m;\nint new_name;\n";
        let mut project = Project::new();
        for text in [text_v1, text_v2] {
            project.remove_document("file:///t.strom");
            let parse = parse(text);
            let file = SourceFile::cast(parse.syntax()).unwrap();
            let line_index = LineIndex::new(text);
            let ids =
                index_document(&mut project, "file:///t.strom", "t", text, &line_index, &file);
            project.install_document("file:///t.strom", ids);
        }
        assert!(
            project
                .all_symbols()
                .all(|(_, s)| s.name != "old_name")
        );
        find(&project, "new_name");
    }
}
