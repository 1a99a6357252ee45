//! Logos-based lexer for Strom
//!
//! Fast tokenization using the logos crate.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    // `<*` opens a doc comment, closed by `*>`
    #[regex(r"<\*([^*]|\*[^>])*\*>")]
    DocComment,

    // =========================================================================
    // LITERALS AND IDENTIFIERS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    AtIdent,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    DollarIdent,

    #[regex(r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|[0-9][0-9_]*")]
    Integer,

    #[regex(r"[0-9][0-9_]*\.[0-9_]+([eE][+-]?[0-9]+)?")]
    Decimal,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\]|\\.)'")]
    Char,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("::")]
    ColonColon,

    #[token("...")]
    Ellipsis,

    #[token("..")]
    DotDot,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("->")]
    Arrow,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,

    // =========================================================================
    // STRUCTURAL KEYWORDS
    // =========================================================================
    #[token("module")]
    ModuleKw,
    #[token("import")]
    ImportKw,
    #[token("fn")]
    FnKw,
    #[token("macro")]
    MacroKw,
    #[token("struct")]
    StructKw,
    #[token("union")]
    UnionKw,
    #[token("bitstruct")]
    BitstructKw,
    #[token("enum")]
    EnumKw,
    #[token("fault")]
    FaultKw,
    #[token("faultdef")]
    FaultdefKw,
    #[token("interface")]
    InterfaceKw,
    #[token("def")]
    DefKw,
    #[token("distinct")]
    DistinctKw,
    #[token("typedef")]
    TypedefKw,
    #[token("const")]
    ConstKw,
    #[token("inline")]
    InlineKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::DocComment => SyntaxKind::DOC_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::AtIdent => SyntaxKind::AT_IDENT,
            LogosToken::DollarIdent => SyntaxKind::DOLLAR_IDENT,
            LogosToken::Integer => SyntaxKind::INT_NUMBER,
            LogosToken::Decimal => SyntaxKind::FLOAT_NUMBER,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Char => SyntaxKind::CHAR,
            LogosToken::ColonColon => SyntaxKind::COLON_COLON,
            LogosToken::Ellipsis => SyntaxKind::ELLIPSIS,
            LogosToken::DotDot => SyntaxKind::DOT_DOT,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::Arrow => SyntaxKind::ARROW,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Amp => SyntaxKind::AMP,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Caret => SyntaxKind::CARET,
            LogosToken::Tilde => SyntaxKind::TILDE,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Question => SyntaxKind::QUESTION,
            LogosToken::ModuleKw => SyntaxKind::MODULE_KW,
            LogosToken::ImportKw => SyntaxKind::IMPORT_KW,
            LogosToken::FnKw => SyntaxKind::FN_KW,
            LogosToken::MacroKw => SyntaxKind::MACRO_KW,
            LogosToken::StructKw => SyntaxKind::STRUCT_KW,
            LogosToken::UnionKw => SyntaxKind::UNION_KW,
            LogosToken::BitstructKw => SyntaxKind::BITSTRUCT_KW,
            LogosToken::EnumKw => SyntaxKind::ENUM_KW,
            LogosToken::FaultKw => SyntaxKind::FAULT_KW,
            LogosToken::FaultdefKw => SyntaxKind::FAULTDEF_KW,
            LogosToken::InterfaceKw => SyntaxKind::INTERFACE_KW,
            LogosToken::DefKw => SyntaxKind::DEF_KW,
            LogosToken::DistinctKw => SyntaxKind::DISTINCT_KW,
            LogosToken::TypedefKw => SyntaxKind::TYPEDEF_KW,
            LogosToken::ConstKw => SyntaxKind::CONST_KW,
            LogosToken::InlineKw => SyntaxKind::INLINE_KW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn lexes_module_declaration() {
        assert_eq!(
            kinds("module app::io;"),
            vec![
                SyntaxKind::MODULE_KW,
                SyntaxKind::IDENT,
                SyntaxKind::COLON_COLON,
                SyntaxKind::IDENT,
                SyntaxKind::SEMICOLON,
            ]
        );
    }

    #[test]
    fn lexes_doc_comment() {
        let tokens = tokenize("<* Adds one.\n @param x \"value\" *>\nfn int f() {}");
        assert_eq!(tokens[0].kind, SyntaxKind::DOC_COMMENT);
        assert!(tokens[0].text.contains("@param"));
    }

    #[test]
    fn keeps_offsets_contiguous() {
        let input = "int x = 0xFF;";
        let tokens = tokenize(input);
        let mut expected = 0u32;
        for token in &tokens {
            assert_eq!(u32::from(token.offset), expected);
            expected += token.text.len() as u32;
        }
        assert_eq!(expected, input.len() as u32);
    }

    #[test]
    fn distinguishes_colon_colon_from_colon() {
        assert_eq!(
            kinds("a::b : 3..5"),
            vec![
                SyntaxKind::IDENT,
                SyntaxKind::COLON_COLON,
                SyntaxKind::IDENT,
                SyntaxKind::COLON,
                SyntaxKind::INT_NUMBER,
                SyntaxKind::DOT_DOT,
                SyntaxKind::INT_NUMBER,
            ]
        );
    }
}
