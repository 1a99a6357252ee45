//! Typed AST wrappers over the untyped rowan CST.
//!
//! This module provides strongly-typed accessors for Strom syntax nodes.
//! Each struct wraps a SyntaxNode and provides methods to access children.

use rowan::NodeOrToken;
use smol_str::SmolStr;

use super::syntax_kind::SyntaxKind;
use super::{SyntaxNode, SyntaxToken};

/// Trait for AST nodes that wrap a SyntaxNode
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

// ============================================================================
// Helper macros
// ============================================================================

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self(node))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> + use<N> {
    parent.children().filter_map(N::cast)
}

/// First direct IDENT token of a node.
fn ident_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|t| t.kind() == SyntaxKind::IDENT)
}

/// Direct IDENT tokens of a node.
fn ident_tokens(node: &SyntaxNode) -> impl Iterator<Item = SyntaxToken> + use<> {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .filter(|t| t.kind() == SyntaxKind::IDENT)
}

fn has_token(node: &SyntaxNode, kind: SyntaxKind) -> bool {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .any(|t| t.kind() == kind)
}

/// IDENT tokens between the first TYPE_REF child and the `=` of the
/// initializer, if any. These are the declared names of variable-style
/// declarations; identifiers inside the initializer expression are not
/// names.
fn names_after_type(node: &SyntaxNode) -> Vec<SyntaxToken> {
    let mut seen_type = false;
    let mut names = Vec::new();
    for element in node.children_with_tokens() {
        match element {
            NodeOrToken::Node(n) if n.kind() == SyntaxKind::TYPE_REF => seen_type = true,
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::EQ => break,
            NodeOrToken::Token(t) if seen_type && t.kind() == SyntaxKind::IDENT => names.push(t),
            _ => {}
        }
    }
    names
}

/// The doc comment attached to a declaration, if any. Doc comments are
/// trivia tokens directly preceding the declaration node.
pub fn doc_comment_text(node: &SyntaxNode) -> Option<SmolStr> {
    let mut element = node.prev_sibling_or_token();
    while let Some(el) = element {
        match &el {
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::DOC_COMMENT => {
                return Some(SmolStr::new(t.text()));
            }
            NodeOrToken::Token(t) if t.kind() == SyntaxKind::WHITESPACE => {
                element = el.prev_sibling_or_token();
                continue;
            }
            _ => return None,
        }
    }
    None
}

// ============================================================================
// Root
// ============================================================================

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn items(&self) -> impl Iterator<Item = Item> + use<> {
        self.0.children().filter_map(Item::cast)
    }

    pub fn module_decls(&self) -> impl Iterator<Item = ModuleDecl> + use<> {
        children(&self.0)
    }
}

/// Any top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    Module(ModuleDecl),
    Import(ImportDecl),
    Const(ConstDecl),
    Global(GlobalDecl),
    Struct(StructDecl),
    Bitstruct(BitstructDecl),
    Enum(EnumDecl),
    Fault(FaultDecl),
    Interface(InterfaceDecl),
    Def(DefDecl),
    Distinct(DistinctDecl),
    Function(FnDecl),
}

impl AstNode for Item {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::MODULE_DECL
                | SyntaxKind::IMPORT_DECL
                | SyntaxKind::CONST_DECL
                | SyntaxKind::GLOBAL_DECL
                | SyntaxKind::STRUCT_DECL
                | SyntaxKind::BITSTRUCT_DECL
                | SyntaxKind::ENUM_DECL
                | SyntaxKind::FAULT_DECL
                | SyntaxKind::INTERFACE_DECL
                | SyntaxKind::DEF_DECL
                | SyntaxKind::DISTINCT_DECL
                | SyntaxKind::FN_DECL
                | SyntaxKind::MACRO_DECL
        )
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::MODULE_DECL => Some(Self::Module(ModuleDecl(node))),
            SyntaxKind::IMPORT_DECL => Some(Self::Import(ImportDecl(node))),
            SyntaxKind::CONST_DECL => Some(Self::Const(ConstDecl(node))),
            SyntaxKind::GLOBAL_DECL => Some(Self::Global(GlobalDecl(node))),
            SyntaxKind::STRUCT_DECL => Some(Self::Struct(StructDecl(node))),
            SyntaxKind::BITSTRUCT_DECL => Some(Self::Bitstruct(BitstructDecl(node))),
            SyntaxKind::ENUM_DECL => Some(Self::Enum(EnumDecl(node))),
            SyntaxKind::FAULT_DECL => Some(Self::Fault(FaultDecl(node))),
            SyntaxKind::INTERFACE_DECL => Some(Self::Interface(InterfaceDecl(node))),
            SyntaxKind::DEF_DECL => Some(Self::Def(DefDecl(node))),
            SyntaxKind::DISTINCT_DECL => Some(Self::Distinct(DistinctDecl(node))),
            SyntaxKind::FN_DECL | SyntaxKind::MACRO_DECL => Some(Self::Function(FnDecl(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Module(n) => n.syntax(),
            Self::Import(n) => n.syntax(),
            Self::Const(n) => n.syntax(),
            Self::Global(n) => n.syntax(),
            Self::Struct(n) => n.syntax(),
            Self::Bitstruct(n) => n.syntax(),
            Self::Enum(n) => n.syntax(),
            Self::Fault(n) => n.syntax(),
            Self::Interface(n) => n.syntax(),
            Self::Def(n) => n.syntax(),
            Self::Distinct(n) => n.syntax(),
            Self::Function(n) => n.syntax(),
        }
    }
}

// ============================================================================
// Modules and imports
// ============================================================================

ast_node!(ModuleDecl, MODULE_DECL);

impl ModuleDecl {
    pub fn path(&self) -> Option<ModulePath> {
        child(&self.0)
    }

    pub fn generic_params(&self) -> Vec<SmolStr> {
        child::<GenericParamList>(&self.0)
            .map(|list| list.names())
            .unwrap_or_default()
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        children(&self.0)
    }

    pub fn is_private(&self) -> bool {
        self.attributes().any(|a| a.name() == "@private")
    }
}

ast_node!(ModulePath, MODULE_PATH);

impl ModulePath {
    pub fn segments(&self) -> Vec<SmolStr> {
        ident_tokens(&self.0)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }

    pub fn text(&self) -> String {
        self.segments().join("::")
    }
}

ast_node!(GenericParamList, GENERIC_PARAM_LIST);

impl GenericParamList {
    pub fn names(&self) -> Vec<SmolStr> {
        ident_tokens(&self.0)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }
}

ast_node!(Attribute, ATTRIBUTE);

impl Attribute {
    pub fn name(&self) -> SmolStr {
        self.0
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .find(|t| t.kind() == SyntaxKind::AT_IDENT)
            .map(|t| SmolStr::new(t.text()))
            .unwrap_or_default()
    }
}

ast_node!(ImportDecl, IMPORT_DECL);

impl ImportDecl {
    pub fn paths(&self) -> impl Iterator<Item = ModulePath> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Variables and constants
// ============================================================================

ast_node!(ConstDecl, CONST_DECL);

impl ConstDecl {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        // With an explicit type the name follows it; otherwise it is the
        // first ident.
        if self.type_ref().is_some() {
            names_after_type(&self.0).into_iter().next()
        } else {
            ident_token(&self.0)
        }
    }
}

ast_node!(GlobalDecl, GLOBAL_DECL);

impl GlobalDecl {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn names(&self) -> Vec<SyntaxToken> {
        names_after_type(&self.0)
    }
}

// ============================================================================
// Structs, unions, bitstructs
// ============================================================================

ast_node!(StructDecl, STRUCT_DECL);

impl StructDecl {
    pub fn is_union(&self) -> bool {
        has_token(&self.0, SyntaxKind::UNION_KW)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn interfaces(&self) -> Vec<TypeRef> {
        child::<InterfaceList>(&self.0)
            .map(|list| list.types().collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<StructBody> {
        child(&self.0)
    }
}

ast_node!(InterfaceList, INTERFACE_LIST);

impl InterfaceList {
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + use<> {
        children(&self.0)
    }
}

ast_node!(StructBody, STRUCT_BODY);

impl StructBody {
    pub fn members(&self) -> impl Iterator<Item = StructMemberKind> + use<> {
        self.0.children().filter_map(StructMemberKind::cast)
    }
}

/// A plain member or a nested struct/union.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructMemberKind {
    Field(StructMember),
    SubStruct(SubStruct),
}

impl AstNode for StructMemberKind {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, SyntaxKind::STRUCT_MEMBER | SyntaxKind::SUB_STRUCT)
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::STRUCT_MEMBER => Some(Self::Field(StructMember(node))),
            SyntaxKind::SUB_STRUCT => Some(Self::SubStruct(SubStruct(node))),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Field(n) => n.syntax(),
            Self::SubStruct(n) => n.syntax(),
        }
    }
}

ast_node!(StructMember, STRUCT_MEMBER);

impl StructMember {
    pub fn is_inline(&self) -> bool {
        has_token(&self.0, SyntaxKind::INLINE_KW)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn names(&self) -> Vec<SyntaxToken> {
        names_after_type(&self.0)
    }

    pub fn bit_range(&self) -> Option<BitRange> {
        child(&self.0)
    }
}

ast_node!(SubStruct, SUB_STRUCT);

impl SubStruct {
    pub fn is_union(&self) -> bool {
        has_token(&self.0, SyntaxKind::UNION_KW)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn body(&self) -> Option<StructBody> {
        child(&self.0)
    }
}

ast_node!(BitRange, BIT_RANGE);

impl BitRange {
    /// The `(low, high)` bit bounds. A single-bit field repeats the bound.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let mut numbers = self
            .0
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .filter(|t| t.kind() == SyntaxKind::INT_NUMBER)
            .filter_map(|t| t.text().parse::<u32>().ok());
        let low = numbers.next()?;
        Some((low, numbers.next().unwrap_or(low)))
    }
}

ast_node!(BitstructDecl, BITSTRUCT_DECL);

impl BitstructDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn backing_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn interfaces(&self) -> Vec<TypeRef> {
        child::<InterfaceList>(&self.0)
            .map(|list| list.types().collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<StructBody> {
        child(&self.0)
    }
}

// ============================================================================
// Enums and faults
// ============================================================================

ast_node!(EnumDecl, ENUM_DECL);

impl EnumDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn backing_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn assoc_params(&self) -> Vec<Param> {
        child::<EnumParamList>(&self.0)
            .map(|list| list.params().collect())
            .unwrap_or_default()
    }

    pub fn enumerators(&self) -> Vec<Enumerator> {
        child::<EnumBody>(&self.0)
            .map(|body| body.enumerators().collect())
            .unwrap_or_default()
    }
}

ast_node!(EnumParamList, ENUM_PARAM_LIST);

impl EnumParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + use<> {
        children(&self.0)
    }
}

ast_node!(EnumBody, ENUM_BODY);

impl EnumBody {
    pub fn enumerators(&self) -> impl Iterator<Item = Enumerator> + use<> {
        children(&self.0)
    }
}

ast_node!(Enumerator, ENUMERATOR);

impl Enumerator {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    /// Raw text after `=`, or the parenthesized associated values.
    pub fn value_text(&self) -> Option<SmolStr> {
        let mut after_eq = false;
        let mut parts = String::new();
        for element in self.0.children_with_tokens() {
            if let NodeOrToken::Token(t) = &element {
                match t.kind() {
                    SyntaxKind::EQ => {
                        after_eq = true;
                        continue;
                    }
                    SyntaxKind::IDENT if !after_eq && parts.is_empty() => continue,
                    _ => {}
                }
                if after_eq || !matches!(t.kind(), SyntaxKind::WHITESPACE) {
                    parts.push_str(t.text());
                }
            }
        }
        let trimmed = parts.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(SmolStr::new(trimmed))
        }
    }
}

ast_node!(FaultDecl, FAULT_DECL);

impl FaultDecl {
    /// Anonymous for `faultdef` constants.
    pub fn name(&self) -> Option<SyntaxToken> {
        if has_token(&self.0, SyntaxKind::FAULTDEF_KW) {
            None
        } else {
            ident_token(&self.0)
        }
    }

    pub fn constants(&self) -> impl Iterator<Item = FaultConstant> + use<> {
        children(&self.0)
    }
}

ast_node!(FaultConstant, FAULT_CONSTANT);

impl FaultConstant {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }
}

// ============================================================================
// Interfaces, aliases, distinct types
// ============================================================================

ast_node!(InterfaceDecl, INTERFACE_DECL);

impl InterfaceDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn methods(&self) -> impl Iterator<Item = FnDecl> + use<> {
        self.0.children().filter_map(FnDecl::cast)
    }
}

ast_node!(DefDecl, DEF_DECL);

impl DefDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn target(&self) -> Option<TypeRef> {
        child(&self.0)
    }
}

ast_node!(DistinctDecl, DISTINCT_DECL);

impl DistinctDecl {
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_token(&self.0)
    }

    pub fn is_inline(&self) -> bool {
        has_token(&self.0, SyntaxKind::INLINE_KW)
    }

    pub fn base_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }
}

// ============================================================================
// Functions and macros
// ============================================================================

/// A function, method, or macro. `FN_DECL` and `MACRO_DECL` share shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FnDecl(SyntaxNode);

impl AstNode for FnDecl {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, SyntaxKind::FN_DECL | SyntaxKind::MACRO_DECL)
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self(node))
        } else {
            None
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl FnDecl {
    pub fn is_macro(&self) -> bool {
        self.0.kind() == SyntaxKind::MACRO_DECL
    }

    pub fn return_type(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    /// For `fn void Type.method(...)`, the `Type` part.
    pub fn type_prefix(&self) -> Option<SyntaxToken> {
        let names: Vec<_> = ident_tokens(&self.0).collect();
        if names.len() >= 2 {
            Some(names[0].clone())
        } else {
            None
        }
    }

    /// The declared name: `method` in `fn void Type.method(...)`.
    pub fn name(&self) -> Option<SyntaxToken> {
        ident_tokens(&self.0).last()
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child(&self.0)
    }

    pub fn params(&self) -> Vec<Param> {
        self.param_list()
            .map(|list| list.params().collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<Block> {
        child(&self.0)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Param> + use<> {
        children(&self.0)
    }

    pub fn trailing_body(&self) -> Option<TrailingBodyParam> {
        child(&self.0)
    }
}

ast_node!(Param, PARAM);

impl Param {
    pub fn is_self(&self) -> bool {
        self.type_ref().is_none()
            && ident_tokens(&self.0).any(|t| t.text() == "self")
    }

    pub fn by_reference(&self) -> bool {
        has_token(&self.0, SyntaxKind::AMP)
    }

    pub fn is_variadic(&self) -> bool {
        has_token(&self.0, SyntaxKind::ELLIPSIS)
    }

    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn name(&self) -> Option<SyntaxToken> {
        if self.type_ref().is_some() {
            names_after_type(&self.0).into_iter().next()
        } else {
            ident_token(&self.0)
        }
    }
}

ast_node!(TrailingBodyParam, TRAILING_BODY_PARAM);

impl TrailingBodyParam {
    /// The `@body(...)` text after the `;` separator.
    pub fn display_text(&self) -> SmolStr {
        let text = self.0.text().to_string();
        SmolStr::new(text.trim_start_matches(';').trim())
    }
}

// ============================================================================
// Types
// ============================================================================

ast_node!(TypeRef, TYPE_REF);

impl TypeRef {
    /// Path segments: `["std", "io", "File"]` for `std::io::File`.
    pub fn segments(&self) -> Vec<SmolStr> {
        ident_tokens(&self.0)
            .map(|t| SmolStr::new(t.text()))
            .collect()
    }

    /// The final (type name) segment.
    pub fn name(&self) -> Option<SmolStr> {
        self.segments().pop()
    }

    /// Leading module qualifier, empty for unqualified types.
    pub fn module_path(&self) -> Vec<SmolStr> {
        let mut segments = self.segments();
        segments.pop();
        segments
    }

    pub fn pointer_count(&self) -> u8 {
        self.0
            .children_with_tokens()
            .filter_map(NodeOrToken::into_token)
            .filter(|t| t.kind() == SyntaxKind::STAR)
            .count() as u8
    }

    pub fn is_optional(&self) -> bool {
        has_token(&self.0, SyntaxKind::QUESTION)
    }

    pub fn generic_args(&self) -> Vec<TypeRef> {
        child::<TypeArgList>(&self.0)
            .map(|list| list.types().collect())
            .unwrap_or_default()
    }
}

ast_node!(TypeArgList, TYPE_ARG_LIST);

impl TypeArgList {
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + use<> {
        children(&self.0)
    }
}

// ============================================================================
// Function bodies
// ============================================================================

ast_node!(Block, BLOCK);

impl Block {
    pub fn local_decls(&self) -> impl Iterator<Item = LocalDecl> + use<> {
        children(&self.0)
    }

    pub fn blocks(&self) -> impl Iterator<Item = Block> + use<> {
        children(&self.0)
    }

    /// Blocks nested anywhere below, including through opaque statements.
    pub fn all_nested_blocks(&self) -> impl Iterator<Item = Block> + use<> {
        self.0.descendants().skip(1).filter_map(Block::cast)
    }
}

ast_node!(LocalDecl, LOCAL_DECL);

impl LocalDecl {
    pub fn type_ref(&self) -> Option<TypeRef> {
        child(&self.0)
    }

    pub fn names(&self) -> Vec<SyntaxToken> {
        if self.type_ref().is_some() {
            return names_after_type(&self.0);
        }
        // `var x = ...` form, skip the `var` token itself and stop at the
        // initializer.
        let mut names = Vec::new();
        for element in self.0.children_with_tokens() {
            match element {
                NodeOrToken::Token(t) if t.kind() == SyntaxKind::EQ => break,
                NodeOrToken::Token(t)
                    if t.kind() == SyntaxKind::IDENT
                        && !matches!(t.text(), "var" | "static" | "tlocal") =>
                {
                    names.push(t);
                }
                _ => {}
            }
        }
        names
    }
}
