//! Name suffix normalization.

use std::fmt;

/// Normalized name suffix, e.g. `_shirt`. Empty means inert: nothing is renamed.
///
/// Comparison is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Suffix(String);

impl Suffix {
    /// Trim surrounding whitespace and trailing underscores, then make sure the
    /// result starts with a single leading underscore.
    ///
    /// Whitespace left exposed by removing underscores is trimmed too, so that
    /// normalizing twice is a no-op.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw
            .trim()
            .trim_end_matches(|c: char| c == '_' || c.is_whitespace());
        if trimmed.is_empty() {
            return Self(String::new());
        }
        if trimmed.starts_with('_') {
            Self(trimmed.to_string())
        } else {
            Self(format!("_{}", trimmed))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_inert(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_applied_to(&self, name: &str) -> bool {
        name.ends_with(self.0.as_str())
    }

    /// The suffixed name, or `None` if the suffix is inert or already present.
    pub fn apply(&self, name: &str) -> Option<String> {
        if self.is_inert() || self.is_applied_to(name) {
            None
        } else {
            Some(format!("{}{}", name, self.0))
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
