//! # Dominance
//!
//! An editor dominates a rule set when every grant in that rule set is a
//! grant the editor already holds. Checking dominance before a role is
//! written or handed out prevents privilege escalation: nobody can create,
//! widen or assign authority beyond their own.
//!
//! Only the candidate's own allow paths need to be examined. An unlisted
//! path inherits from its nearest listed subtree ancestor, and a subtree
//! grant is only admitted if the editor holds a subtree grant covering it.

use std::fmt;
use thiserror::Error;

use crate::path::ResourcePath;
use crate::rule::RuleScope;
use crate::ruleset::RuleSet;
use crate::tree::AccessTree;

/// Why a candidate grant is not covered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The editor is not allowed the path at all.
    NotAllowed,
    /// The candidate grants the whole subtree but the editor only holds the
    /// literal path.
    NotSubtree,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::NotAllowed => f.write_str("editor is not allowed"),
            ViolationKind::NotSubtree => f.write_str("editor lacks subtree access to"),
        }
    }
}

/// The first candidate grant the editor does not cover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {path}")]
pub struct DominanceViolation {
    /// Offending path of the candidate rule set.
    pub path: ResourcePath,
    /// What is missing.
    pub kind: ViolationKind,
}

/// Check that `editor` covers every allow rule of `candidate`.
///
/// Deny rules of the candidate are never examined; they only restrict.
///
/// # Errors
///
/// Returns the first uncovered path in path order.
pub fn check_dominance(editor: &AccessTree, candidate: &RuleSet) -> Result<(), DominanceViolation> {
    check_paths(editor, candidate, candidate.allowed_paths())
}

/// Check if `editor` dominates `candidate`.
///
/// # Example
///
/// ```
/// use pki_rules::{dominates, AccessTree, Rule, RuleSet};
///
/// let editor = AccessTree::from_rule_sets([RuleSet::new().with_rule("/bar", Rule::allow_exact())]);
/// let narrow = RuleSet::new().with_rule("/bar", Rule::allow_exact());
/// let wide = RuleSet::new().with_rule("/bar", Rule::allow_subtree());
///
/// assert!(dominates(&editor, &narrow));
/// assert!(!dominates(&editor, &wide));
/// ```
pub fn dominates(editor: &AccessTree, candidate: &RuleSet) -> bool {
    check_dominance(editor, candidate).is_ok()
}

/// Evaluate the dominance predicate at an explicit list of paths.
pub(crate) fn check_paths<'a, I>(
    editor: &AccessTree,
    candidate: &RuleSet,
    paths: I,
) -> Result<(), DominanceViolation>
where
    I: IntoIterator<Item = &'a ResourcePath>,
{
    for path in paths {
        let wanted = candidate.resolve(path);
        if !wanted.is_allow() {
            continue;
        }
        let held = editor.resolve(path);
        if !held.is_allow() {
            return Err(DominanceViolation {
                path: path.clone(),
                kind: ViolationKind::NotAllowed,
            });
        }
        if wanted.scope == RuleScope::Subtree && held.scope != RuleScope::Subtree {
            return Err(DominanceViolation {
                path: path.clone(),
                kind: ViolationKind::NotSubtree,
            });
        }
    }
    Ok(())
}
