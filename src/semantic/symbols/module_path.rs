use smol_str::SmolStr;
use std::fmt;

/// A `::`-separated module name, such as `app::game::engine`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ModulePath {
    segments: Vec<SmolStr>,
}

impl ModulePath {
    pub fn new(segments: Vec<SmolStr>) -> Self {
        Self { segments }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            segments: text
                .split("::")
                .filter(|s| !s.is_empty())
                .map(SmolStr::new)
                .collect(),
        }
    }

    /// The default module for a file without a `module` declaration: the
    /// file stem, lowercased, non-alphanumeric characters replaced with
    /// `_`, truncated to 31 characters.
    pub fn from_file_stem(stem: &str) -> Self {
        let mut name: String = stem
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        name.truncate(31);
        Self {
            segments: vec![SmolStr::new(name)],
        }
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&SmolStr> {
        self.segments.last()
    }

    /// Parent module path, or `None` at the root.
    pub fn parent(&self) -> Option<ModulePath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether `other`'s symbols are visible from `self` without an
    /// explicit import: the same module, an ancestor, or a descendant.
    pub fn is_implicitly_imported(&self, other: &ModulePath) -> bool {
        self == other || self.starts_with(other) || other.starts_with(self)
    }

    pub fn starts_with(&self, prefix: &ModulePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Whether this path ends with all segments of `suffix`, in order.
    /// `import io;` matches the module `std::io` this way.
    pub fn ends_with(&self, suffix: &ModulePath) -> bool {
        self.segments.len() >= suffix.segments.len()
            && self.segments[self.segments.len() - suffix.segments.len()..] == suffix.segments[..]
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str("::")?;
            }
            f.write_str(segment)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("app", "app", true)]
    #[case("app", "app::io", true)]
    #[case("app::io", "app", true)]
    #[case("app::io", "app::net", false)]
    #[case("app", "application", false)]
    fn implicit_import_relationships(
        #[case] from: &str,
        #[case] other: &str,
        #[case] expected: bool,
    ) {
        let from = ModulePath::from_text(from);
        let other = ModulePath::from_text(other);
        assert_eq!(from.is_implicitly_imported(&other), expected);
    }

    #[test]
    fn suffix_matching_for_partial_imports() {
        let module = ModulePath::from_text("std::core::io");
        assert!(module.ends_with(&ModulePath::from_text("io")));
        assert!(module.ends_with(&ModulePath::from_text("core::io")));
        assert!(!module.ends_with(&ModulePath::from_text("core")));
    }

    #[test]
    fn default_module_from_file_stem() {
        assert_eq!(
            ModulePath::from_file_stem("My File-2").to_string(),
            "my_file_2"
        );
        let long = "a".repeat(40);
        assert_eq!(ModulePath::from_file_stem(&long).to_string().len(), 31);
    }
}
