//! # Access Trees
//!
//! The combined view of every rule set an administrator holds through its
//! roles. Each role resolves a path on its own; the most specific opinion
//! across roles wins, and a deny beats an allow at equal specificity.

use crate::path::ResourcePath;
use crate::rule::RuleScope;
use crate::ruleset::{Resolution, RuleSet};

/// Union of the rule sets of all roles an administrator belongs to.
///
/// # Example
///
/// ```
/// use pki_rules::{AccessTree, ResourcePath, Rule, RuleSet};
///
/// let admin = RuleSet::new().with_rule("/ca", Rule::allow_subtree());
/// let auditor = RuleSet::new().with_rule("/ca/Root", Rule::deny_exact());
/// let tree = AccessTree::from_rule_sets([admin, auditor]);
///
/// assert!(tree.is_allowed(&ResourcePath::new("/ca/Sub")));
/// assert!(!tree.is_allowed(&ResourcePath::new("/ca/Root")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTree {
    rule_sets: Vec<RuleSet>,
}

impl AccessTree {
    /// Create an empty tree, which denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from the rule sets of several roles.
    pub fn from_rule_sets<I>(rule_sets: I) -> Self
    where
        I: IntoIterator<Item = RuleSet>,
    {
        Self {
            rule_sets: rule_sets.into_iter().collect(),
        }
    }

    /// Add the rule set of one more role.
    pub fn push(&mut self, rule_set: RuleSet) {
        self.rule_sets.push(rule_set);
    }

    /// Number of contributing rule sets.
    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    /// Check if no role contributes to this tree.
    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }

    /// Resolve a path across all contributing rule sets.
    ///
    /// Only explicit resolutions take part. The one with the longest source
    /// path wins. At equal specificity a deny wins over an allow, and among
    /// allows a subtree rule is preferred. Without any explicit resolution
    /// the result is [`Resolution::default_deny`].
    pub fn resolve(&self, path: &ResourcePath) -> Resolution {
        let mut best: Option<Resolution> = None;
        for rule_set in &self.rule_sets {
            let candidate = rule_set.resolve(path);
            let Some(specificity) = candidate.specificity() else {
                continue;
            };
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    let current_specificity = current.specificity().unwrap_or(0);
                    if specificity > current_specificity {
                        Some(candidate)
                    } else if specificity == current_specificity {
                        Some(break_tie(current, candidate))
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best.unwrap_or_else(Resolution::default_deny)
    }

    /// Check if a path resolves to allow.
    pub fn is_allowed(&self, path: &ResourcePath) -> bool {
        self.resolve(path).is_allow()
    }
}

fn break_tie(current: Resolution, candidate: Resolution) -> Resolution {
    match (current.is_allow(), candidate.is_allow()) {
        (false, _) => current,
        (true, false) => candidate,
        (true, true) => {
            if current.scope == RuleScope::Exact && candidate.scope == RuleScope::Subtree {
                candidate
            } else {
                current
            }
        }
    }
}

impl FromIterator<RuleSet> for AccessTree {
    fn from_iter<T: IntoIterator<Item = RuleSet>>(iter: T) -> Self {
        Self::from_rule_sets(iter)
    }
}
