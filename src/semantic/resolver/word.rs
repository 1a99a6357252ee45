use smol_str::SmolStr;

use crate::base::Range;
use crate::semantic::symbols::ModulePath;

/// One identifier with its source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    pub text: SmolStr,
    pub range: Range,
}

impl WordSpan {
    pub fn new(text: impl Into<SmolStr>, range: Range) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }
}

/// The identifier being resolved, together with everything the user wrote
/// in front of it.
///
/// For the cursor on `c` in `foo::bar.b.c`, the word is `c`, the access
/// path is `[bar, b]`, and the module prefix is `foo`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    pub text: SmolStr,
    pub range: Range,
    /// Explicit `a::b::` qualifier before the chain, empty if none.
    pub module_prefix: ModulePath,
    /// Identifiers before the word in the same `.`-chain, root first.
    pub access_path: Vec<WordSpan>,
}

impl Word {
    pub fn plain(text: impl Into<SmolStr>, range: Range) -> Self {
        Self {
            text: text.into(),
            range,
            ..Default::default()
        }
    }

    pub fn has_access_path(&self) -> bool {
        !self.access_path.is_empty()
    }

    pub fn has_module_prefix(&self) -> bool {
        !self.module_prefix.is_empty()
    }

    /// The full chain including the word itself, root first.
    pub fn full_chain(&self) -> Vec<WordSpan> {
        let mut chain = self.access_path.clone();
        chain.push(WordSpan::new(self.text.clone(), self.range));
        chain
    }
}
