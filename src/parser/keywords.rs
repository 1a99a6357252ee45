//! Keyword tables for Strom.
//!
//! Structural keywords get their own token kinds; everything else here is
//! lexed as `IDENT` and classified by text. The completion engine offers
//! these words when a prefix matches, and the resolver refuses to treat
//! them as symbol names.

/// Every reserved word in the language, including builtin type names.
pub const KEYWORDS: &[&str] = &[
    "asm", "assert", "bitstruct", "break", "case", "catch", "const", "continue", "def", "default",
    "defer", "distinct", "do", "else", "enum", "extern", "false", "fault", "faultdef", "fn", "for",
    "foreach", "foreach_r", "if", "import", "inline", "interface", "macro", "module", "nextcase",
    "null", "return", "static", "struct", "switch", "tlocal", "true", "try", "typedef", "union",
    "var", "while",
    // builtin types
    "void", "bool", "char", "ichar", "short", "ushort", "int", "uint", "long", "ulong", "int128",
    "uint128", "iptr", "uptr", "isz", "usz", "float", "double", "float16", "float128", "any",
    "anyfault", "typeid",
    // compile-time keywords
    "$alignof", "$assert", "$case", "$default", "$defined", "$echo", "$else", "$endfor",
    "$endforeach", "$endif", "$endswitch", "$eval", "$evaltype", "$error", "$exec", "$extnameof",
    "$for", "$foreach", "$if", "$include", "$nameof", "$offsetof", "$qnameof", "$sizeof",
    "$stringify", "$switch", "$typefrom", "$typeof", "$vacount", "$vatype", "$vaconst", "$varef",
    "$vaarg", "$vaexpr", "$vasplat",
];

/// Builtin scalar and special type names.
pub const BUILTIN_TYPES: &[&str] = &[
    "void", "bool", "char", "ichar", "short", "ushort", "int", "uint", "long", "ulong", "int128",
    "uint128", "iptr", "uptr", "isz", "usz", "float", "double", "float16", "float128", "any",
    "anyfault", "typeid",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub fn is_builtin_type(word: &str) -> bool {
    BUILTIN_TYPES.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_are_keywords() {
        for ty in BUILTIN_TYPES {
            assert!(is_keyword(ty), "{ty} missing from keyword table");
        }
    }

    #[test]
    fn identifiers_are_not_keywords() {
        assert!(!is_keyword("emulator"));
        assert!(!is_keyword("Cough"));
        assert!(is_keyword("typedef"));
        assert!(is_keyword("$sizeof"));
    }
}
