//! Recursive descent parser for Strom
//!
//! Builds a rowan GreenNode tree from tokens.
//! Supports error recovery and produces a lossless CST.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse Strom source code into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    parser.finish()
}

const ITEM_START: &[SyntaxKind] = &[
    SyntaxKind::MODULE_KW,
    SyntaxKind::IMPORT_KW,
    SyntaxKind::FN_KW,
    SyntaxKind::MACRO_KW,
    SyntaxKind::STRUCT_KW,
    SyntaxKind::UNION_KW,
    SyntaxKind::BITSTRUCT_KW,
    SyntaxKind::ENUM_KW,
    SyntaxKind::FAULT_KW,
    SyntaxKind::FAULTDEF_KW,
    SyntaxKind::INTERFACE_KW,
    SyntaxKind::DEF_KW,
    SyntaxKind::DISTINCT_KW,
    SyntaxKind::TYPEDEF_KW,
    SyntaxKind::CONST_KW,
];

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn current_text(&self) -> &str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Look ahead `n` non-trivia tokens (0 = current).
    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_token(n).map(|t| t.kind).unwrap_or(SyntaxKind::ERROR)
    }

    fn nth_text(&self, n: usize) -> &str {
        self.nth_token(n).map(|t| t.text).unwrap_or("")
    }

    fn nth_token(&self, n: usize) -> Option<&Token<'a>> {
        let mut idx = self.pos;
        let mut count = 0;
        while idx < self.tokens.len() {
            if !self.tokens[idx].kind.is_trivia() {
                if count == n {
                    return Some(&self.tokens[idx]);
                }
                count += 1;
            }
            idx += 1;
        }
        None
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    fn bump_any(&mut self) {
        self.bump();
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        self.skip_trivia();
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {:?}", kind));
            false
        }
    }

    fn skip_trivia(&mut self) {
        while self.current().map(|t| t.kind.is_trivia()).unwrap_or(false) {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(TextSize::new(0)));
        self.errors.push(SyntaxError::new(message, range));
    }

    fn error_recover(&mut self, message: impl Into<String>, recovery: &[SyntaxKind]) {
        self.error(message);
        self.builder.start_node(SyntaxKind::ERROR.into());
        let mut consumed = false;
        while !self.at_eof() && !self.at_any(recovery) {
            self.bump_any();
            consumed = true;
        }
        if !consumed && !self.at_eof() {
            self.bump_any();
        }
        self.builder.finish_node();
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    // =========================================================================
    // Grammar: source file and items
    // =========================================================================

    fn parse_source_file(&mut self) {
        self.start_node(SyntaxKind::SOURCE_FILE);
        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            self.parse_item();
        }
        self.finish_node();
    }

    fn parse_item(&mut self) {
        match self.current_kind() {
            SyntaxKind::MODULE_KW => self.parse_module_decl(),
            SyntaxKind::IMPORT_KW => self.parse_import_decl(),
            SyntaxKind::STRUCT_KW | SyntaxKind::UNION_KW => self.parse_struct_decl(),
            SyntaxKind::BITSTRUCT_KW => self.parse_bitstruct_decl(),
            SyntaxKind::ENUM_KW => self.parse_enum_decl(),
            SyntaxKind::FAULT_KW => self.parse_fault_decl(),
            SyntaxKind::FAULTDEF_KW => self.parse_faultdef_decl(),
            SyntaxKind::INTERFACE_KW => self.parse_interface_decl(),
            SyntaxKind::DEF_KW => self.parse_def_decl(),
            SyntaxKind::DISTINCT_KW | SyntaxKind::TYPEDEF_KW => self.parse_distinct_decl(),
            SyntaxKind::CONST_KW => self.parse_const_decl(),
            SyntaxKind::FN_KW => self.parse_fn_decl(SyntaxKind::FN_DECL),
            SyntaxKind::MACRO_KW => self.parse_fn_decl(SyntaxKind::MACRO_DECL),
            SyntaxKind::IDENT => self.parse_global_decl(),
            _ => self.error_recover("expected a declaration", ITEM_START),
        }
    }

    /// `module a::b(<Type>) @private;`
    fn parse_module_decl(&mut self) {
        self.start_node(SyntaxKind::MODULE_DECL);
        self.bump(); // module
        self.parse_module_path();
        if self.nth(0) == SyntaxKind::L_PAREN && self.nth(1) == SyntaxKind::LT {
            self.parse_generic_param_list();
        }
        self.parse_attributes();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    fn parse_module_path(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::MODULE_PATH);
        self.expect(SyntaxKind::IDENT);
        while self.nth(0) == SyntaxKind::COLON_COLON && self.nth(1) == SyntaxKind::IDENT {
            self.eat(SyntaxKind::COLON_COLON);
            self.eat(SyntaxKind::IDENT);
        }
        self.finish_node();
    }

    /// `(<Type1, Type2>)`
    fn parse_generic_param_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::GENERIC_PARAM_LIST);
        self.eat(SyntaxKind::L_PAREN);
        self.eat(SyntaxKind::LT);
        loop {
            self.skip_trivia();
            if !self.eat(SyntaxKind::IDENT) {
                break;
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT);
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// `@private`, `@if(...)`
    fn parse_attributes(&mut self) {
        loop {
            self.skip_trivia();
            if !self.at(SyntaxKind::AT_IDENT) {
                break;
            }
            self.start_node(SyntaxKind::ATTRIBUTE);
            self.bump();
            if self.nth(0) == SyntaxKind::L_PAREN {
                self.bump_balanced_parens();
            }
            self.finish_node();
        }
    }

    /// `import a::b, c::d;`
    fn parse_import_decl(&mut self) {
        self.start_node(SyntaxKind::IMPORT_DECL);
        self.bump(); // import
        loop {
            self.parse_module_path();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.parse_attributes();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `def Alias = some::Target;` or `def shortcut = foo::bar_fn;`
    fn parse_def_decl(&mut self) {
        self.start_node(SyntaxKind::DEF_DECL);
        self.bump(); // def
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        if self.nth(0) == SyntaxKind::L_PAREN && self.nth(1) == SyntaxKind::LT {
            self.parse_generic_param_list();
        }
        self.parse_attributes();
        self.expect(SyntaxKind::EQ);
        self.skip_trivia();
        self.parse_type_ref();
        self.parse_attributes();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `distinct Meters = float;` and `typedef SuperInt = inline int;`
    fn parse_distinct_decl(&mut self) {
        self.start_node(SyntaxKind::DISTINCT_DECL);
        self.bump(); // distinct | typedef
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.parse_attributes();
        self.expect(SyntaxKind::EQ);
        self.skip_trivia();
        self.eat(SyntaxKind::INLINE_KW);
        self.skip_trivia();
        self.parse_type_ref();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `const int MAX = 10;` or `const MAX = 10;`
    fn parse_const_decl(&mut self) {
        self.start_node(SyntaxKind::CONST_DECL);
        self.bump(); // const
        self.skip_trivia();
        if self.nth(0) == SyntaxKind::IDENT && self.nth(1) != SyntaxKind::EQ
            && self.nth(1) != SyntaxKind::SEMICOLON
        {
            self.parse_type_ref();
        }
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.parse_attributes();
        if self.eat(SyntaxKind::EQ) {
            self.skip_expr_until(&[SyntaxKind::SEMICOLON]);
        }
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `Type name = value;` at module level, including `static`/`extern`/`tlocal`.
    fn parse_global_decl(&mut self) {
        self.start_node(SyntaxKind::GLOBAL_DECL);
        self.skip_trivia();
        while self.at(SyntaxKind::IDENT)
            && matches!(self.current_text(), "static" | "extern" | "tlocal")
        {
            self.bump();
            self.skip_trivia();
        }
        self.parse_type_ref();
        self.skip_trivia();
        if !self.at(SyntaxKind::IDENT) {
            self.error_recover("expected a variable name", ITEM_START);
            self.finish_node();
            return;
        }
        self.bump();
        while self.eat(SyntaxKind::COMMA) {
            self.skip_trivia();
            if !self.eat(SyntaxKind::IDENT) {
                break;
            }
        }
        self.parse_attributes();
        if self.eat(SyntaxKind::EQ) {
            self.skip_expr_until(&[SyntaxKind::SEMICOLON]);
        }
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `struct Name (Interface) @attr { members }` (also `union`)
    fn parse_struct_decl(&mut self) {
        self.start_node(SyntaxKind::STRUCT_DECL);
        self.bump(); // struct | union
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        if self.nth(0) == SyntaxKind::L_PAREN {
            self.parse_interface_list();
        }
        self.parse_attributes();
        self.parse_struct_body();
        self.finish_node();
    }

    fn parse_interface_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::INTERFACE_LIST);
        self.eat(SyntaxKind::L_PAREN);
        loop {
            self.skip_trivia();
            if !self.at(SyntaxKind::IDENT) {
                break;
            }
            self.parse_type_ref();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    fn parse_struct_body(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::STRUCT_BODY);
        if !self.expect(SyntaxKind::L_BRACE) {
            self.finish_node();
            return;
        }
        loop {
            self.skip_trivia();
            if self.at(SyntaxKind::R_BRACE) || self.at_eof() {
                break;
            }
            self.parse_struct_member();
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// One member: a field, an inline field, a bitfield, or a nested
    /// struct/union.
    fn parse_struct_member(&mut self) {
        if self.at(SyntaxKind::STRUCT_KW) || self.at(SyntaxKind::UNION_KW) {
            self.start_node(SyntaxKind::SUB_STRUCT);
            self.bump();
            self.skip_trivia();
            self.eat(SyntaxKind::IDENT); // anonymous substructs have no name
            self.parse_struct_body();
            self.eat(SyntaxKind::SEMICOLON);
            self.finish_node();
            return;
        }

        self.start_node(SyntaxKind::STRUCT_MEMBER);
        self.eat(SyntaxKind::INLINE_KW);
        self.skip_trivia();
        if !self.at(SyntaxKind::IDENT) {
            self.finish_node();
            self.error_recover(
                "expected a struct member",
                &[SyntaxKind::R_BRACE, SyntaxKind::SEMICOLON],
            );
            self.eat(SyntaxKind::SEMICOLON);
            return;
        }
        self.parse_type_ref();
        self.skip_trivia();
        self.eat(SyntaxKind::IDENT);
        while self.eat(SyntaxKind::COMMA) {
            self.skip_trivia();
            if !self.eat(SyntaxKind::IDENT) {
                break;
            }
        }
        if self.nth(0) == SyntaxKind::COLON {
            self.parse_bit_range();
        }
        self.parse_attributes();
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `: 0..3` or `: 7`
    fn parse_bit_range(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::BIT_RANGE);
        self.eat(SyntaxKind::COLON);
        self.eat(SyntaxKind::INT_NUMBER);
        if self.eat(SyntaxKind::DOT_DOT) {
            self.eat(SyntaxKind::INT_NUMBER);
        }
        self.finish_node();
    }

    /// `bitstruct Name : backing_type (Interface) { Type field : 0..3; }`
    fn parse_bitstruct_decl(&mut self) {
        self.start_node(SyntaxKind::BITSTRUCT_DECL);
        self.bump(); // bitstruct
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::COLON) {
            self.skip_trivia();
            self.parse_type_ref();
        }
        if self.nth(0) == SyntaxKind::L_PAREN {
            self.parse_interface_list();
        }
        self.parse_attributes();
        self.parse_struct_body();
        self.finish_node();
    }

    /// `enum Color : int (String name) { RED("red"), GREEN = 2 }`
    fn parse_enum_decl(&mut self) {
        self.start_node(SyntaxKind::ENUM_DECL);
        self.bump(); // enum
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::COLON) {
            self.skip_trivia();
            self.parse_type_ref();
            if self.nth(0) == SyntaxKind::L_PAREN {
                self.parse_enum_param_list();
            }
        }
        self.parse_attributes();
        self.parse_enum_body();
        self.finish_node();
    }

    fn parse_enum_param_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::ENUM_PARAM_LIST);
        self.eat(SyntaxKind::L_PAREN);
        loop {
            self.skip_trivia();
            if self.at(SyntaxKind::R_PAREN) || self.at_eof() {
                break;
            }
            self.parse_param();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    fn parse_enum_body(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::ENUM_BODY);
        if !self.expect(SyntaxKind::L_BRACE) {
            self.finish_node();
            return;
        }
        loop {
            self.skip_trivia();
            if self.at(SyntaxKind::R_BRACE) || self.at_eof() {
                break;
            }
            self.parse_enumerator();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// `RED`, `RED = 2`, `RED("red", 7)`
    fn parse_enumerator(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::ENUMERATOR);
        if !self.eat(SyntaxKind::IDENT) {
            self.finish_node();
            self.error_recover(
                "expected an enum value",
                &[SyntaxKind::COMMA, SyntaxKind::R_BRACE],
            );
            return;
        }
        if self.nth(0) == SyntaxKind::L_PAREN {
            self.bump_balanced_parens();
        } else if self.eat(SyntaxKind::EQ) {
            self.skip_expr_until(&[SyntaxKind::COMMA, SyntaxKind::R_BRACE]);
        }
        self.finish_node();
    }

    /// `fault IoError { FILE_NOT_FOUND, NO_PERMISSION }`
    fn parse_fault_decl(&mut self) {
        self.start_node(SyntaxKind::FAULT_DECL);
        self.bump(); // fault
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.parse_attributes();
        self.skip_trivia();
        if self.expect(SyntaxKind::L_BRACE) {
            loop {
                self.skip_trivia();
                if self.at(SyntaxKind::R_BRACE) || self.at_eof() {
                    break;
                }
                self.start_node(SyntaxKind::FAULT_CONSTANT);
                self.eat(SyntaxKind::IDENT);
                self.finish_node();
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// `faultdef NOT_FOUND, TIMED_OUT;` - constants without a named container
    fn parse_faultdef_decl(&mut self) {
        self.start_node(SyntaxKind::FAULT_DECL);
        self.bump(); // faultdef
        loop {
            self.skip_trivia();
            if !self.at(SyntaxKind::IDENT) {
                break;
            }
            self.start_node(SyntaxKind::FAULT_CONSTANT);
            self.bump();
            self.finish_node();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// `interface Printable { fn String to_string(); }`
    fn parse_interface_decl(&mut self) {
        self.start_node(SyntaxKind::INTERFACE_DECL);
        self.bump(); // interface
        self.skip_trivia();
        self.expect(SyntaxKind::IDENT);
        self.parse_attributes();
        self.skip_trivia();
        if self.expect(SyntaxKind::L_BRACE) {
            loop {
                self.skip_trivia();
                if self.at(SyntaxKind::R_BRACE) || self.at_eof() {
                    break;
                }
                if self.at(SyntaxKind::FN_KW) || self.at(SyntaxKind::MACRO_KW) {
                    let kind = if self.at(SyntaxKind::FN_KW) {
                        SyntaxKind::FN_DECL
                    } else {
                        SyntaxKind::MACRO_DECL
                    };
                    self.parse_fn_decl(kind);
                } else {
                    self.error_recover(
                        "expected a method signature",
                        &[SyntaxKind::FN_KW, SyntaxKind::R_BRACE],
                    );
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        self.finish_node();
    }

    /// `fn ReturnType name(params) {}`, `fn void Type.method(&self) {}`,
    /// `macro foo(x; @body) { }`
    fn parse_fn_decl(&mut self, node_kind: SyntaxKind) {
        self.start_node(node_kind);
        self.bump(); // fn | macro
        self.skip_trivia();

        // Macros may omit the return type. A name is directly followed by
        // `(` or by `.name(`.
        let has_return_type = !(self.nth(0) == SyntaxKind::IDENT
            && (self.nth(1) == SyntaxKind::L_PAREN
                || (self.nth(1) == SyntaxKind::DOT && self.nth(3) == SyntaxKind::L_PAREN)));
        if has_return_type {
            self.parse_type_ref();
            self.skip_trivia();
        }

        // `Type.method` or plain `name`
        self.expect(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::DOT) {
            self.skip_trivia();
            self.expect(SyntaxKind::IDENT);
        }

        self.parse_param_list();
        self.parse_attributes();
        self.skip_trivia();
        if self.at(SyntaxKind::L_BRACE) {
            self.parse_block();
        } else {
            self.expect(SyntaxKind::SEMICOLON);
        }
        self.finish_node();
    }

    fn parse_param_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::PARAM_LIST);
        if !self.expect(SyntaxKind::L_PAREN) {
            self.finish_node();
            return;
        }
        loop {
            self.skip_trivia();
            if self.at(SyntaxKind::R_PAREN) || self.at_eof() {
                break;
            }
            if self.at(SyntaxKind::SEMICOLON) {
                self.parse_trailing_body_param();
                break;
            }
            self.parse_param();
            if !self.eat(SyntaxKind::COMMA) {
                if self.at(SyntaxKind::SEMICOLON) {
                    self.parse_trailing_body_param();
                }
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    /// One parameter: `Type name`, `Type name = default`, `&self`, `self`,
    /// `...`, `Type... rest`.
    fn parse_param(&mut self) {
        self.start_node(SyntaxKind::PARAM);
        if self.eat(SyntaxKind::ELLIPSIS) {
            self.finish_node();
            return;
        }
        self.eat(SyntaxKind::AMP);
        self.skip_trivia();
        if self.at(SyntaxKind::IDENT) && self.current_text() == "self" {
            self.bump();
            self.finish_node();
            return;
        }
        self.parse_type_ref();
        self.eat(SyntaxKind::ELLIPSIS);
        self.skip_trivia();
        self.eat(SyntaxKind::IDENT);
        if self.eat(SyntaxKind::EQ) {
            self.skip_expr_until(&[
                SyntaxKind::COMMA,
                SyntaxKind::SEMICOLON,
                SyntaxKind::R_PAREN,
            ]);
        }
        self.finish_node();
    }

    /// `; @body(int x)` - the macro body parameter after the `;` separator
    fn parse_trailing_body_param(&mut self) {
        self.start_node(SyntaxKind::TRAILING_BODY_PARAM);
        self.eat(SyntaxKind::SEMICOLON);
        self.skip_trivia();
        if self.at(SyntaxKind::AT_IDENT) {
            self.bump();
            if self.nth(0) == SyntaxKind::L_PAREN {
                self.bump_balanced_parens();
            }
        }
        self.finish_node();
    }

    /// A type reference: `a::b::Name(<int>)**?` with optional array suffixes.
    fn parse_type_ref(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::TYPE_REF);
        self.expect(SyntaxKind::IDENT);
        while self.nth(0) == SyntaxKind::COLON_COLON && self.nth(1) == SyntaxKind::IDENT {
            self.eat(SyntaxKind::COLON_COLON);
            self.eat(SyntaxKind::IDENT);
        }
        if self.nth(0) == SyntaxKind::L_PAREN && self.nth(1) == SyntaxKind::LT {
            self.parse_type_arg_list();
        }
        loop {
            if self.eat(SyntaxKind::STAR) {
                continue;
            }
            if self.nth(0) == SyntaxKind::L_BRACKET {
                self.eat(SyntaxKind::L_BRACKET);
                while !self.at_eof() && !self.at(SyntaxKind::R_BRACKET) {
                    self.skip_trivia();
                    if self.at(SyntaxKind::R_BRACKET) {
                        break;
                    }
                    self.bump_any();
                }
                self.expect(SyntaxKind::R_BRACKET);
                continue;
            }
            break;
        }
        self.eat(SyntaxKind::QUESTION);
        self.finish_node();
    }

    /// `(<int, List(<char>)>)`
    fn parse_type_arg_list(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::TYPE_ARG_LIST);
        self.eat(SyntaxKind::L_PAREN);
        self.eat(SyntaxKind::LT);
        loop {
            self.skip_trivia();
            if !self.at(SyntaxKind::IDENT) {
                break;
            }
            self.parse_type_ref();
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.expect(SyntaxKind::GT);
        self.expect(SyntaxKind::R_PAREN);
        self.finish_node();
    }

    // =========================================================================
    // Function bodies
    // =========================================================================

    /// Parse a `{ ... }` block, recognizing local declarations and nested
    /// blocks. Everything else becomes opaque expression statements.
    fn parse_block(&mut self) {
        self.skip_trivia();
        self.start_node(SyntaxKind::BLOCK);
        self.eat(SyntaxKind::L_BRACE);
        loop {
            self.skip_trivia();
            if self.at(SyntaxKind::R_BRACE) || self.at_eof() {
                break;
            }
            if self.at(SyntaxKind::L_BRACE) {
                self.parse_block();
            } else if self.at_local_decl() {
                self.parse_local_decl();
            } else {
                self.parse_expr_stmt();
            }
        }
        self.expect(SyntaxKind::R_BRACE);
        self.finish_node();
    }

    /// Check whether the statement at the cursor looks like
    /// `TypeRef name (= | ; | ,)`. Raw lookahead, no tree building.
    fn at_local_decl(&self) -> bool {
        let mut n = 0usize;
        while self.nth(n) == SyntaxKind::IDENT
            && matches!(self.nth_text(n), "static" | "tlocal" | "var")
        {
            // `var x = ...` needs no type
            if self.nth_text(n) == "var" {
                return self.nth(n + 1) == SyntaxKind::IDENT;
            }
            n += 1;
        }
        if self.nth(n) != SyntaxKind::IDENT {
            return false;
        }
        n += 1;
        while self.nth(n) == SyntaxKind::COLON_COLON && self.nth(n + 1) == SyntaxKind::IDENT {
            n += 2;
        }
        // generic args: skip `(<` ... `>)`
        if self.nth(n) == SyntaxKind::L_PAREN && self.nth(n + 1) == SyntaxKind::LT {
            n += 2;
            while self.nth(n) != SyntaxKind::GT {
                if self.nth_token(n).is_none() {
                    return false;
                }
                n += 1;
            }
            n += 1;
            if self.nth(n) != SyntaxKind::R_PAREN {
                return false;
            }
            n += 1;
        }
        loop {
            match self.nth(n) {
                SyntaxKind::STAR => n += 1,
                SyntaxKind::L_BRACKET => {
                    while !matches!(self.nth(n), SyntaxKind::R_BRACKET) {
                        if self.nth_token(n).is_none() {
                            return false;
                        }
                        n += 1;
                    }
                    n += 1;
                }
                _ => break,
            }
        }
        self.nth(n) == SyntaxKind::IDENT
            && matches!(
                self.nth(n + 1),
                SyntaxKind::EQ | SyntaxKind::SEMICOLON | SyntaxKind::COMMA
            )
    }

    fn parse_local_decl(&mut self) {
        self.start_node(SyntaxKind::LOCAL_DECL);
        self.skip_trivia();
        // `var x = ...` declares an inferred-type local, no TYPE_REF node
        if self.at(SyntaxKind::IDENT) && self.current_text() == "var" {
            self.bump();
            self.skip_trivia();
            self.eat(SyntaxKind::IDENT);
            if self.eat(SyntaxKind::EQ) {
                self.skip_expr_until(&[SyntaxKind::SEMICOLON]);
            }
            self.expect(SyntaxKind::SEMICOLON);
            self.finish_node();
            return;
        }
        while self.at(SyntaxKind::IDENT) && matches!(self.current_text(), "static" | "tlocal") {
            self.bump();
            self.skip_trivia();
        }
        self.parse_type_ref();
        self.skip_trivia();
        self.eat(SyntaxKind::IDENT);
        while self.eat(SyntaxKind::COMMA) {
            self.skip_trivia();
            if !self.eat(SyntaxKind::IDENT) {
                break;
            }
        }
        if self.eat(SyntaxKind::EQ) {
            self.skip_expr_until(&[SyntaxKind::SEMICOLON]);
        }
        self.expect(SyntaxKind::SEMICOLON);
        self.finish_node();
    }

    /// An opaque statement. Consumes up to `;` at this nesting level,
    /// descending into nested blocks and balanced parens along the way.
    fn parse_expr_stmt(&mut self) {
        self.start_node(SyntaxKind::EXPR_STMT);
        loop {
            self.skip_trivia();
            match self.current_kind() {
                SyntaxKind::SEMICOLON => {
                    self.bump();
                    break;
                }
                SyntaxKind::L_BRACE => {
                    self.parse_block();
                    // Control-flow statements end with their block.
                    self.skip_trivia();
                    if !self.at_stmt_continuation() {
                        break;
                    }
                }
                SyntaxKind::L_PAREN => self.bump_balanced_parens(),
                SyntaxKind::R_BRACE => break,
                _ => {
                    if self.at_eof() {
                        break;
                    }
                    self.bump_any();
                }
            }
        }
        self.finish_node();
    }

    /// After a block inside a statement, `else`/`catch`-style words continue
    /// the same statement.
    fn at_stmt_continuation(&self) -> bool {
        self.at(SyntaxKind::IDENT) && matches!(self.current_text(), "else" | "catch" | "while")
    }

    // =========================================================================
    // Skipping helpers
    // =========================================================================

    /// Consume a `(`-balanced token group including nested parens, brackets
    /// and braces.
    fn bump_balanced_parens(&mut self) {
        self.skip_trivia();
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                _ => {}
            }
            if self.at_eof() {
                break;
            }
            self.bump_any();
            if depth == 0 {
                break;
            }
        }
    }

    /// Consume expression tokens until one of `stop` appears at this
    /// nesting level.
    fn skip_expr_until(&mut self, stop: &[SyntaxKind]) {
        loop {
            self.skip_trivia();
            let kind = self.current_kind();
            if self.at_eof() || stop.contains(&kind) {
                break;
            }
            match kind {
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => {
                    self.bump_balanced_parens()
                }
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => break,
                _ => self.bump_any(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxKind;

    fn top_level_kinds(input: &str) -> Vec<SyntaxKind> {
        parse(input)
            .syntax()
            .children()
            .map(|n| n.kind())
            .collect()
    }

    #[test]
    fn parses_module_and_import() {
        let parse = parse("module app::game;\nimport std::io, util;\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(
            top_level_kinds("module app::game;\nimport std::io, util;\n"),
            vec![SyntaxKind::MODULE_DECL, SyntaxKind::IMPORT_DECL]
        );
    }

    #[test]
    fn parses_struct_with_inline_member() {
        let parse = parse(
            "struct Cough {\n    inline Cat cat;\n    int volume;\n}\n",
        );
        assert!(parse.ok(), "{:?}", parse.errors);
        let root = parse.syntax();
        let body = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::STRUCT_BODY)
            .unwrap();
        let members: Vec<_> = body
            .children()
            .filter(|n| n.kind() == SyntaxKind::STRUCT_MEMBER)
            .collect();
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn parses_method_declaration() {
        let parse = parse("fn void Obj.free(&self) {\n    int zero = 0;\n}\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        let root = parse.syntax();
        assert!(root
            .descendants()
            .any(|n| n.kind() == SyntaxKind::LOCAL_DECL));
    }

    #[test]
    fn parses_typedef_with_inline_base() {
        let parse = parse("typedef SuperInt = inline int;\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        assert_eq!(
            top_level_kinds("typedef SuperInt = inline int;\n"),
            vec![SyntaxKind::DISTINCT_DECL]
        );
    }

    #[test]
    fn parses_enum_with_associated_values() {
        let src = "enum Color : int (String name, int weight) {\n    RED(\"red\", 1),\n    BLUE(\"blue\", 2),\n}\n";
        let parse = parse(src);
        assert!(parse.ok(), "{:?}", parse.errors);
        let enumerators = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::ENUMERATOR)
            .count();
        assert_eq!(enumerators, 2);
    }

    #[test]
    fn parses_faultdef_constants() {
        let parse = parse("faultdef NOT_FOUND, TIMED_OUT;\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        let constants = parse
            .syntax()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::FAULT_CONSTANT)
            .count();
        assert_eq!(constants, 2);
    }

    #[test]
    fn recovers_from_stray_tokens() {
        let parse = parse("??? struct Ok { int x; }\n");
        assert!(!parse.ok());
        assert!(parse
            .syntax()
            .descendants()
            .any(|n| n.kind() == SyntaxKind::STRUCT_DECL));
    }

    #[test]
    fn lossless_roundtrip() {
        let src = "module m;\nfn int add(int a, int b) { return a + b; }\n";
        assert_eq!(parse(src).syntax().text().to_string(), src);
    }

    #[test]
    fn distinguishes_call_from_local_decl() {
        let parse = parse("fn void f() {\n    Cough c;\n    c.fl();\n}\n");
        assert!(parse.ok(), "{:?}", parse.errors);
        let block = parse
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::BLOCK)
            .unwrap();
        let kinds: Vec<_> = block.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::LOCAL_DECL, SyntaxKind::EXPR_STMT]);
    }
}
