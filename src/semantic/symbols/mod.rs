//! The semantic data model: symbols and their supporting types.
//!
//! Symbols live in a flat arena owned by [`crate::semantic::Project`] and
//! reference each other through [`SymbolId`]. Each symbol records where it
//! was declared (document, name range, declaration range), which module it
//! belongs to, and a kind-specific payload.

mod doc_comment;
mod module_path;
mod type_ref;

pub use doc_comment::DocComment;
pub use module_path::ModulePath;
pub use type_ref::TypeRef;

use smol_str::SmolStr;

use crate::base::Range;

/// Unique identifier for a symbol in the arena.
/// Uses u32 for compact storage (supports ~4 billion symbols).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A named element in a Strom program.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: SmolStr,
    /// Module the symbol belongs to.
    pub module: ModulePath,
    /// Document the symbol was declared in.
    pub uri: SmolStr,
    /// Range of the name token.
    pub ident_range: Range,
    /// Range of the whole declaration.
    pub decl_range: Range,
    pub visibility: Visibility,
    pub doc: Option<DocComment>,
    pub parent: Option<SymbolId>,
    pub children: Vec<SymbolId>,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// One `module` section (or a file's default module).
    Module(ModuleData),
    Variable(VariableData),
    Function(FunctionData),
    Struct(StructData),
    Bitstruct(BitstructData),
    StructMember(MemberData),
    Enum(EnumData),
    Enumerator(EnumeratorData),
    Fault,
    FaultConstant,
    Interface,
    Def(DefData),
    Distinct(DistinctData),
    GenericParameter,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleData {
    /// Modules imported by this section, in source order.
    pub imports: Vec<ModulePath>,
    /// Generic parameter names from `module m(<Type>);`.
    pub generic_params: Vec<SmolStr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Global,
    Constant,
    Local,
    Parameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    pub type_ref: Option<TypeRef>,
    pub kind: VariableKind,
    /// For locals and parameters: the block in which the name is visible.
    pub scope: Option<Range>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    Method,
    Macro,
    InterfaceMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData {
    pub kind: FunctionKind,
    pub return_type: Option<TypeRef>,
    /// `Type` in `fn void Type.method(...)`.
    pub type_prefix: Option<SmolStr>,
    /// Parameter symbols, in declaration order.
    pub params: Vec<SymbolId>,
    /// `@body(...)` text of a macro's trailing block parameter.
    pub body_param: Option<SmolStr>,
    /// Range of the body block, when the function has one.
    pub body_range: Option<Range>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructData {
    pub is_union: bool,
    pub interfaces: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitstructData {
    pub backing_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberData {
    pub type_ref: Option<TypeRef>,
    /// `inline` members expose their type's members and methods on the
    /// parent struct.
    pub is_inline: bool,
    /// Bit bounds for bitstruct fields.
    pub bit_range: Option<(u32, u32)>,
    /// Set for anonymous or named substructs; their fields are children.
    pub is_substruct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumData {
    pub backing_type: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratorData {
    /// Explicit `= value` text.
    pub value: Option<SmolStr>,
    /// Associated-value symbols, mirroring the enum's parameter list.
    pub assoc_values: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefData {
    pub target: TypeRef,
    /// True when the target spells a type, false for identifier aliases
    /// (functions, constants).
    pub aliases_type: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistinctData {
    pub base_type: TypeRef,
    /// `inline` distinct types expose the base type's members and methods.
    pub is_inline: bool,
}

impl Symbol {
    /// Full name including the method receiver: `Obj.free` for methods,
    /// plain name otherwise.
    pub fn full_name(&self) -> String {
        match &self.kind {
            SymbolKind::Function(data) => match &data.type_prefix {
                Some(prefix) => format!("{prefix}.{}", self.name),
                None => self.name.to_string(),
            },
            _ => self.name.to_string(),
        }
    }

    /// Fully qualified name: `module::sub::Name`.
    pub fn fqn(&self) -> String {
        if self.module.is_empty() {
            self.full_name()
        } else {
            format!("{}::{}", self.module, self.full_name())
        }
    }

    /// Whether this symbol denotes a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Struct(_)
                | SymbolKind::Bitstruct(_)
                | SymbolKind::Enum(_)
                | SymbolKind::Fault
                | SymbolKind::Interface
                | SymbolKind::Distinct(_)
                | SymbolKind::GenericParameter
        ) || matches!(&self.kind, SymbolKind::Def(data) if data.aliases_type)
    }

    /// Whether the access-path walker may look up members on this symbol
    /// directly. Value-like symbols must first be converted to their type.
    pub fn is_inspectable(&self) -> bool {
        !matches!(
            self.kind,
            SymbolKind::Variable(_)
                | SymbolKind::Function(_)
                | SymbolKind::StructMember(_)
                | SymbolKind::Def(_)
                | SymbolKind::Distinct(_)
        )
    }

    /// The type to chase when converting a value symbol to its type symbol.
    pub fn value_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            SymbolKind::Variable(data) => data.type_ref.as_ref(),
            SymbolKind::StructMember(data) => data.type_ref.as_ref(),
            SymbolKind::Function(data) => data.return_type.as_ref(),
            SymbolKind::Def(data) => Some(&data.target),
            SymbolKind::Distinct(data) => Some(&data.base_type),
            _ => None,
        }
    }

    /// Short kind name for logs and labels.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SymbolKind::Module(_) => "module",
            SymbolKind::Variable(data) => match data.kind {
                VariableKind::Constant => "constant",
                VariableKind::Parameter => "parameter",
                _ => "variable",
            },
            SymbolKind::Function(data) => match data.kind {
                FunctionKind::Macro => "macro",
                FunctionKind::Method => "method",
                _ => "function",
            },
            SymbolKind::Struct(data) if data.is_union => "union",
            SymbolKind::Struct(_) => "struct",
            SymbolKind::Bitstruct(_) => "bitstruct",
            SymbolKind::StructMember(_) => "field",
            SymbolKind::Enum(_) => "enum",
            SymbolKind::Enumerator(_) => "enumerator",
            SymbolKind::Fault => "fault",
            SymbolKind::FaultConstant => "fault constant",
            SymbolKind::Interface => "interface",
            SymbolKind::Def(_) => "def",
            SymbolKind::Distinct(_) => "distinct",
            SymbolKind::GenericParameter => "type parameter",
        }
    }

    /// Scope restriction for locals and parameters.
    pub fn scope(&self) -> Option<Range> {
        match &self.kind {
            SymbolKind::Variable(data) => data.scope,
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Range;

    fn symbol(name: &str, kind: SymbolKind) -> Symbol {
        Symbol {
            name: SmolStr::new(name),
            module: ModulePath::from_text("app"),
            uri: SmolStr::new("file:///app.strom"),
            ident_range: Range::default(),
            decl_range: Range::default(),
            visibility: Visibility::Public,
            doc: None,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    #[test]
    fn method_full_name_includes_receiver() {
        let method = symbol(
            "free",
            SymbolKind::Function(FunctionData {
                kind: FunctionKind::Method,
                return_type: None,
                type_prefix: Some(SmolStr::new("Obj")),
                params: Vec::new(),
                body_param: None,
                body_range: None,
            }),
        );
        assert_eq!(method.full_name(), "Obj.free");
        assert_eq!(method.fqn(), "app::Obj.free");
    }

    #[test]
    fn value_symbols_are_not_inspectable() {
        let var = symbol(
            "x",
            SymbolKind::Variable(VariableData {
                type_ref: Some(TypeRef::named("Cough")),
                kind: VariableKind::Local,
                scope: None,
            }),
        );
        assert!(!var.is_inspectable());
        assert_eq!(var.value_type().unwrap().name, "Cough");

        let st = symbol(
            "Cough",
            SymbolKind::Struct(StructData {
                is_union: false,
                interfaces: Vec::new(),
            }),
        );
        assert!(st.is_inspectable());
        assert!(st.is_type());
    }

    #[test]
    fn distinct_chases_base_type_but_is_a_type() {
        let distinct = symbol(
            "SuperInt",
            SymbolKind::Distinct(DistinctData {
                base_type: TypeRef::named("int"),
                is_inline: true,
            }),
        );
        assert!(distinct.is_type());
        assert!(!distinct.is_inspectable());
    }
}
