//! Syntax kinds for the rowan-based CST.
//!
//! This enum defines all node and token kinds in the Strom syntax tree.
//! Tokens are leaf nodes (identifiers, keywords, punctuation); nodes are
//! composite (modules, declarations, statements).

/// All syntax kinds (tokens and nodes) in Strom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,
    /// `<* ... *>` documentation comment, attached to the next declaration
    DOC_COMMENT,

    // =========================================================================
    // TOKENS
    // =========================================================================
    IDENT,       // identifier (includes builtin type names and soft keywords)
    AT_IDENT,    // @private, @param, ...
    DOLLAR_IDENT, // $if, $sizeof, ... (compile-time keywords)
    INT_NUMBER,  // 42, 0xff
    FLOAT_NUMBER, // 3.14
    STRING,      // "hello"
    CHAR,        // 'c'

    // Punctuation
    L_BRACE,     // {
    R_BRACE,     // }
    L_BRACKET,   // [
    R_BRACKET,   // ]
    L_PAREN,     // (
    R_PAREN,     // )
    SEMICOLON,   // ;
    COLON,       // :
    COLON_COLON, // ::
    DOT,         // .
    DOT_DOT,     // ..
    ELLIPSIS,    // ...
    COMMA,       // ,
    EQ,          // =
    EQ_EQ,       // ==
    BANG_EQ,     // !=
    LT,          // <
    GT,          // >
    LT_EQ,       // <=
    GT_EQ,       // >=
    PLUS,        // +
    MINUS,       // -
    STAR,        // *
    SLASH,       // /
    PERCENT,     // %
    AMP,         // &
    AMP_AMP,     // &&
    PIPE,        // |
    PIPE_PIPE,   // ||
    CARET,       // ^
    TILDE,       // ~
    BANG,        // !
    QUESTION,    // ?
    ARROW,       // ->

    // Structural keywords (the ones declaration parsing dispatches on;
    // control-flow and builtin-type words stay IDENT and are classified
    // through `keywords`)
    MODULE_KW,
    IMPORT_KW,
    FN_KW,
    MACRO_KW,
    STRUCT_KW,
    UNION_KW,
    BITSTRUCT_KW,
    ENUM_KW,
    FAULT_KW,
    FAULTDEF_KW,
    INTERFACE_KW,
    DEF_KW,
    DISTINCT_KW,
    TYPEDEF_KW,
    CONST_KW,
    INLINE_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    MODULE_DECL,
    MODULE_PATH,       // a::b::c
    GENERIC_PARAM_LIST, // (<Type1, Type2>)
    ATTRIBUTE,         // @private, @if(...)
    IMPORT_DECL,
    CONST_DECL,
    GLOBAL_DECL,
    STRUCT_DECL,       // struct and union
    STRUCT_BODY,
    STRUCT_MEMBER,     // field, inline field, bitfield
    SUB_STRUCT,        // nested struct/union member
    BIT_RANGE,         // : 0..3
    BITSTRUCT_DECL,
    ENUM_DECL,
    ENUM_PARAM_LIST,   // associated-value parameters
    ENUM_BODY,
    ENUMERATOR,
    FAULT_DECL,
    FAULT_CONSTANT,
    INTERFACE_DECL,
    DEF_DECL,
    DISTINCT_DECL,
    FN_DECL,
    MACRO_DECL,
    PARAM_LIST,
    PARAM,
    TRAILING_BODY_PARAM, // ; @body(...)
    TYPE_REF,
    TYPE_ARG_LIST,     // (<int, String>)
    BLOCK,
    LOCAL_DECL,
    EXPR_STMT,
    INTERFACE_LIST,    // (Printable, Viewable)

    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment).
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT | Self::DOC_COMMENT
        )
    }

    /// Check if this is a structural keyword token.
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::MODULE_KW as u16) && (self as u16) <= (Self::INLINE_KW as u16)
    }

    /// Check if this token is a literal.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::INT_NUMBER | Self::FLOAT_NUMBER | Self::STRING | Self::CHAR
        )
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StromLanguage {}

impl rowan::Language for StromLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<StromLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<StromLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<StromLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<StromLanguage>;
