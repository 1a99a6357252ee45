use smol_str::SmolStr;
use std::fmt;

use super::ModulePath;
use crate::parser::{self, keywords};

/// A resolved-enough reference to a type, as written in source.
///
/// Holds the spelled name and module qualifier; turning it into a symbol
/// is the resolver's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeRef {
    /// Explicit module qualifier, empty when unqualified.
    pub module: ModulePath,
    /// The type name itself.
    pub name: SmolStr,
    /// Number of `*` suffixes.
    pub pointer_count: u8,
    /// `?` suffix.
    pub optional: bool,
    /// Builtin scalar types never resolve to a symbol.
    pub builtin: bool,
    /// Generic arguments from `(<...>)`.
    pub generic_args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self {
            builtin: keywords::is_builtin_type(&name),
            name,
            ..Default::default()
        }
    }

    /// Build from a parsed type node.
    pub fn from_ast(node: &parser::TypeRef) -> Self {
        let name = node.name().unwrap_or_default();
        Self {
            module: ModulePath::new(node.module_path()),
            builtin: keywords::is_builtin_type(&name),
            name,
            pointer_count: node.pointer_count(),
            optional: node.is_optional(),
            generic_args: node.generic_args().iter().map(Self::from_ast).collect(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        !self.module.is_empty()
    }

    /// Whether a resolver lookup can possibly succeed.
    pub fn is_resolvable(&self) -> bool {
        !self.builtin && !self.name.is_empty()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.module.is_empty() {
            write!(f, "{}::", self.module)?;
        }
        f.write_str(&self.name)?;
        if !self.generic_args.is_empty() {
            f.write_str("(<")?;
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">)")?;
        }
        for _ in 0..self.pointer_count {
            f.write_str("*")?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}
