//! # Resource Paths
//!
//! Canonical, `/`-delimited names for the resources administrators act on
//! (CA instances, profiles, role management, ...).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Path separator.
pub const SEPARATOR: char = '/';

/// A normalized resource path.
///
/// A normalized path always starts with exactly one `/`, contains no empty
/// segments and carries no trailing `/`, except for the root path `/` itself.
///
/// # Example
///
/// ```
/// use pki_rules::ResourcePath;
///
/// let path = ResourcePath::new("ca//ManagementCA/");
/// assert_eq!(path.as_str(), "/ca/ManagementCA");
/// assert!(ResourcePath::root().is_ancestor_of(&path));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Normalize an arbitrary caller-supplied path.
    ///
    /// Repeated separators are collapsed, the trailing separator is trimmed and
    /// a leading separator is added when missing. An empty or blank input is
    /// the root path.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut normalized = String::with_capacity(raw.as_ref().len() + 1);
        for segment in raw.as_ref().trim().split(SEPARATOR) {
            if segment.is_empty() {
                continue;
            }
            normalized.push(SEPARATOR);
            normalized.push_str(segment);
        }
        if normalized.is_empty() {
            normalized.push(SEPARATOR);
        }
        Self(normalized)
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Number of segments below the root (`/` has depth 0).
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches(SEPARATOR).count()
        }
    }

    /// Get the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ResourcePath> {
        parent_of(&self.0).map(|p| Self(p.to_string()))
    }

    /// Iterate over this path and all of its ancestors.
    ///
    /// The path itself is yielded first and the root last, so the first
    /// match found while walking is always the most specific one.
    ///
    /// # Example
    ///
    /// ```
    /// use pki_rules::ResourcePath;
    ///
    /// let path = ResourcePath::new("/a/b");
    /// let walk: Vec<&str> = path.ancestors().collect();
    /// assert_eq!(walk, vec!["/a/b", "/a", "/"]);
    /// ```
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: Some(self.0.as_str()),
        }
    }

    /// Check if this path is a proper ancestor of `other`.
    ///
    /// The prefix must end at a segment boundary: `/ca` is an ancestor of
    /// `/ca/Root` but not of `/cafoo`.
    pub fn is_ancestor_of(&self, other: &ResourcePath) -> bool {
        if self.0.len() >= other.0.len() {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.0.starts_with(&self.0) && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Check if this path is a proper descendant of `other`.
    pub fn is_descendant_of(&self, other: &ResourcePath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Append a child segment (which is itself normalized).
    pub fn join(&self, child: impl AsRef<str>) -> ResourcePath {
        Self::new(format!("{}/{}", self.0, child.as_ref()))
    }
}

fn parent_of(path: &str) -> Option<&str> {
    if path.len() <= 1 {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) | None => Some("/"),
        Some(idx) => Some(&path[..idx]),
    }
}

/// Iterator returned by [`ResourcePath::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = parent_of(current);
        Some(current)
    }
}

impl Default for ResourcePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourcePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourcePath {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ResourcePath {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.0
    }
}
