//! # Rule Sets and Resolution
//!
//! A rule set is the ordered mapping of resource paths to rules held by one
//! role. Resolving a path walks upward from the path to the root and picks
//! the most specific rule that applies; when nothing applies the answer is
//! deny.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::path::ResourcePath;
use crate::rule::{LegacyRuleState, Rule, RuleScope, RuleState};

/// Outcome of resolving a path against one or more rule sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved state.
    pub state: RuleState,
    /// Scope of the rule that produced the state. The fail-closed default is
    /// reported as a subtree deny, since it covers every unlisted path.
    pub scope: RuleScope,
    /// Path of the rule that produced the state, `None` for the default.
    pub source: Option<ResourcePath>,
}

impl Resolution {
    /// The fail-closed default: deny, produced by no rule.
    pub fn default_deny() -> Self {
        Self {
            state: RuleState::Deny,
            scope: RuleScope::Subtree,
            source: None,
        }
    }

    fn from_rule(rule: &Rule, source: &str) -> Self {
        Self {
            state: rule.state,
            scope: rule.scope,
            source: Some(ResourcePath::new(source)),
        }
    }

    /// Check if the resolved state grants access.
    pub fn is_allow(&self) -> bool {
        self.state.is_allow()
    }

    /// Check if the resolution came from an explicit rule.
    pub fn is_explicit(&self) -> bool {
        self.source.is_some()
    }

    /// Specificity of the producing rule; longer source paths are more
    /// specific. The default has no specificity.
    pub fn specificity(&self) -> Option<usize> {
        self.source.as_ref().map(|p| p.as_str().len())
    }
}

/// Ordered mapping of resource paths to rules.
///
/// At most one rule is stored per path; inserting at an existing path
/// replaces the previous rule.
///
/// # Example
///
/// ```
/// use pki_rules::{ResourcePath, Rule, RuleSet, RuleState};
///
/// let mut rules = RuleSet::new();
/// rules.insert("/a", Rule::allow_subtree());
/// rules.insert("/a/b", Rule::deny_exact());
///
/// assert_eq!(rules.resolve(&ResourcePath::new("/a/b")).state, RuleState::Deny);
/// assert_eq!(rules.resolve(&ResourcePath::new("/a/b/c")).state, RuleState::Allow);
/// assert_eq!(rules.resolve(&ResourcePath::new("/z")).state, RuleState::Deny);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<ResourcePath, Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Set the rule for a path, replacing any existing rule there.
    ///
    /// # Returns
    ///
    /// The rule previously stored at the path, if any.
    pub fn insert(&mut self, path: impl Into<ResourcePath>, rule: Rule) -> Option<Rule> {
        self.rules.insert(path.into(), rule)
    }

    /// Builder-style [`RuleSet::insert`].
    pub fn with_rule(mut self, path: impl Into<ResourcePath>, rule: Rule) -> Self {
        self.insert(path, rule);
        self
    }

    /// Remove the rule at a path.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<Rule> {
        self.rules.remove(path)
    }

    /// Get the rule stored at exactly this path.
    pub fn get(&self, path: &ResourcePath) -> Option<&Rule> {
        self.rules.get(path)
    }

    /// Iterate over rules in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, ResourcePath, Rule> {
        self.rules.iter()
    }

    /// Paths carrying an allow rule.
    pub fn allowed_paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.rules
            .iter()
            .filter(|(_, rule)| rule.is_allow())
            .map(|(path, _)| path)
    }

    /// Get the count of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the effective rule for a path.
    ///
    /// Walks from `path` up to the root. A rule at the path itself always
    /// applies; a rule at a proper ancestor applies only if it is a subtree
    /// rule. The first applying rule on the walk is the most specific one
    /// and wins. If nothing applies the result is [`Resolution::default_deny`].
    pub fn resolve(&self, path: &ResourcePath) -> Resolution {
        for (depth, ancestor) in path.ancestors().enumerate() {
            if let Some(rule) = self.rules.get(ancestor) {
                if depth == 0 || rule.is_subtree() {
                    return Resolution::from_rule(rule, ancestor);
                }
            }
        }
        Resolution::default_deny()
    }

    /// Check if a path resolves to allow.
    pub fn is_allowed(&self, path: &ResourcePath) -> bool {
        self.resolve(path).is_allow()
    }

    /// Drop rules that do not change the resolved state of any path.
    ///
    /// A rule is redundant when, without it, its own path already resolves to
    /// the same state: an exact rule then changes nothing, and a subtree
    /// rule's descendants fall through to the same source its path does.
    /// The resolved state of every path is identical before and after.
    pub fn minimized(&self) -> RuleSet {
        let mut result = self.clone();
        let paths: Vec<ResourcePath> = self.rules.keys().rev().cloned().collect();
        for path in paths {
            if let Some(rule) = result.rules.remove(&path) {
                if result.resolve(&path).state != rule.state {
                    result.rules.insert(path, rule);
                }
            }
        }
        result
    }

    /// Import rules from the legacy `{state, recursive}` representation.
    ///
    /// Undecided entries are skipped. A later entry at the same path replaces
    /// an earlier one.
    pub fn from_legacy<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, LegacyRuleState, bool)>,
        P: Into<ResourcePath>,
    {
        let mut set = Self::new();
        for (path, state, recursive) in entries {
            if let Some(rule) = Rule::from_legacy(state, recursive) {
                set.insert(path, rule);
            }
        }
        set
    }
}

impl<P: Into<ResourcePath>> FromIterator<(P, Rule)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (P, Rule)>>(iter: T) -> Self {
        let mut set = RuleSet::new();
        for (path, rule) in iter {
            set.insert(path, rule);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = (&'a ResourcePath, &'a Rule);
    type IntoIter = btree_map::Iter<'a, ResourcePath, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
