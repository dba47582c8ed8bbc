//! Hierarchical element names.
//!
//! Every element in a router carries a unique name made of `/`-separated
//! segments, e.g. `c/d/src`. The segments before the last one form the
//! element's *scope prefix*: the namespace a compound element exposes to the
//! stages nested inside it. Names are validated and split exactly once, at
//! construction; all later scope work walks string slices of the stored form.

use std::fmt;

use compact_str::{CompactString, format_compact};
use thiserror::Error;

/// Segment separator in hierarchical element names.
pub const SEPARATOR: char = '/';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("malformed element name {0:?}")]
    Malformed(String),
}

/// A validated hierarchical element name.
///
/// Invariants: at least one segment, every segment non-empty (no leading,
/// trailing, or doubled separators).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementName(CompactString);

impl ElementName {
    /// Parse a name, rejecting empty input and empty segments.
    ///
    /// Used both for absolute declaration names and for relative directive
    /// targets — the two share one grammar.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        if s.is_empty() || s.split(SEPARATOR).any(|seg| seg.is_empty()) {
            return Err(NameError::Malformed(s.to_string()));
        }
        Ok(ElementName(CompactString::from(s)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the name.
    pub fn leaf(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Scope prefix: all segments but the last. Empty (unscoped) for a
    /// top-level, single-segment name.
    pub fn prefix(&self) -> Prefix {
        match self.0.rfind(SEPARATOR) {
            Some(i) => Prefix(CompactString::from(&self.0[..i])),
            None => Prefix::empty(),
        }
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count() + 1
    }

    pub fn is_top_level(&self) -> bool {
        !self.0.contains(SEPARATOR)
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ElementName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The enclosing scope of `fqn`, or `None` at the top level.
///
/// `parent("a/b/c")` is `Some("a/b")`.
pub fn parent(fqn: &str) -> Option<&str> {
    fqn.rfind(SEPARATOR).map(|i| &fqn[..i])
}

/// Enclosing scopes of `fqn`, innermost first: `"a/b/c"` yields `"a/b"`, `"a"`.
pub fn ancestors(fqn: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent(fqn), |scope| parent(scope))
}

/// The scope under which a configuration instance's directives are
/// interpreted.
///
/// An empty prefix marks an *unscoped* instance whose directives may address
/// any element in the router, including whole compound stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Prefix(CompactString);

impl Prefix {
    pub fn empty() -> Self {
        Prefix(CompactString::new(""))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualify a relative target under this prefix.
    pub fn qualify(&self, target: &str) -> CompactString {
        if self.0.is_empty() {
            CompactString::from(target)
        } else {
            format_compact!("{}{}{}", self.0, SEPARATOR, target)
        }
    }

    /// Whether `fqn` lies strictly inside this scope.
    pub fn contains(&self, fqn: &str) -> bool {
        !self.0.is_empty()
            && fqn.len() > self.0.len()
            && fqn.starts_with(self.0.as_str())
            && fqn[self.0.len()..].starts_with(SEPARATOR)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<unscoped>")
        } else {
            f.write_str(&self.0)
        }
    }
}
