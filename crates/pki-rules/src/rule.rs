//! # Access Rules
//!
//! A rule is the opinion a role holds about one resource path: allow or deny,
//! for the literal path only or for the whole subtree below it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a rule grants or restricts access.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// Access is granted.
    Allow,
    /// Access is refused.
    Deny,
}

impl RuleState {
    /// Get the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleState::Allow => "allow",
            RuleState::Deny => "deny",
        }
    }

    /// Parse a state from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "allow" | "accept" => Some(RuleState::Allow),
            "deny" | "decline" => Some(RuleState::Deny),
            _ => None,
        }
    }

    /// Check if this state grants access.
    pub fn is_allow(&self) -> bool {
        matches!(self, RuleState::Allow)
    }
}

/// How far a rule reaches below its own path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Applies to the literal path only.
    Exact,
    /// Applies to the path and every descendant not overridden by a more
    /// specific rule.
    Subtree,
}

impl RuleScope {
    /// Get the string representation of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleScope::Exact => "exact",
            RuleScope::Subtree => "subtree",
        }
    }

    /// Parse a scope from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(RuleScope::Exact),
            "subtree" | "recursive" => Some(RuleScope::Subtree),
            _ => None,
        }
    }
}

/// State of a rule in the historical rule representation, where recursion was
/// a separate flag and a rule could be left undecided.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LegacyRuleState {
    /// Granted.
    Accept,
    /// Refused.
    Decline,
    /// Undecided; carries no opinion.
    Unknown,
}

/// A single access rule.
///
/// # Example
///
/// ```
/// use pki_rules::{Rule, RuleScope, RuleState};
///
/// let rule = Rule::allow_subtree();
/// assert_eq!(rule.state, RuleState::Allow);
/// assert_eq!(rule.scope, RuleScope::Subtree);
/// assert_eq!(rule.to_string(), "allow/subtree");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Allow or deny.
    pub state: RuleState,
    /// Exact path only, or the whole subtree.
    pub scope: RuleScope,
}

impl Rule {
    /// Create a rule.
    pub fn new(state: RuleState, scope: RuleScope) -> Self {
        Self { state, scope }
    }

    /// Allow the path and everything below it.
    pub fn allow_subtree() -> Self {
        Self::new(RuleState::Allow, RuleScope::Subtree)
    }

    /// Allow the literal path only.
    pub fn allow_exact() -> Self {
        Self::new(RuleState::Allow, RuleScope::Exact)
    }

    /// Deny the path and everything below it.
    pub fn deny_subtree() -> Self {
        Self::new(RuleState::Deny, RuleScope::Subtree)
    }

    /// Deny the literal path only.
    pub fn deny_exact() -> Self {
        Self::new(RuleState::Deny, RuleScope::Exact)
    }

    /// Convert a rule from the legacy `{state, recursive}` representation.
    ///
    /// # Returns
    ///
    /// `None` for [`LegacyRuleState::Unknown`], which expresses no opinion.
    pub fn from_legacy(state: LegacyRuleState, recursive: bool) -> Option<Self> {
        let state = match state {
            LegacyRuleState::Accept => RuleState::Allow,
            LegacyRuleState::Decline => RuleState::Deny,
            LegacyRuleState::Unknown => return None,
        };
        let scope = if recursive {
            RuleScope::Subtree
        } else {
            RuleScope::Exact
        };
        Some(Self::new(state, scope))
    }

    /// Parse from the `state/scope` form (e.g. "allow/subtree").
    pub fn parse(s: &str) -> Option<Self> {
        let (state, scope) = s.split_once('/')?;
        Some(Self::new(
            RuleState::parse(state.trim())?,
            RuleScope::parse(scope.trim())?,
        ))
    }

    /// Check if this rule grants access.
    pub fn is_allow(&self) -> bool {
        self.state.is_allow()
    }

    /// Check if this rule reaches descendants.
    pub fn is_subtree(&self) -> bool {
        self.scope == RuleScope::Subtree
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state.as_str(), self.scope.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_constructors() {
        assert!(Rule::allow_subtree().is_allow());
        assert!(Rule::allow_subtree().is_subtree());
        assert!(!Rule::allow_exact().is_subtree());
        assert!(!Rule::deny_subtree().is_allow());
        assert_eq!(Rule::deny_exact().to_string(), "deny/exact");
    }

    #[test]
    fn test_rule_parse() {
        assert_eq!(Rule::parse("allow/subtree"), Some(Rule::allow_subtree()));
        assert_eq!(Rule::parse("DENY / exact"), Some(Rule::deny_exact()));
        assert_eq!(Rule::parse("accept/recursive"), Some(Rule::allow_subtree()));
        assert_eq!(Rule::parse("allow"), None);
        assert_eq!(Rule::parse("maybe/exact"), None);
    }

    #[test]
    fn test_legacy_conversion() {
        assert_eq!(
            Rule::from_legacy(LegacyRuleState::Accept, true),
            Some(Rule::allow_subtree())
        );
        assert_eq!(
            Rule::from_legacy(LegacyRuleState::Accept, false),
            Some(Rule::allow_exact())
        );
        assert_eq!(
            Rule::from_legacy(LegacyRuleState::Decline, true),
            Some(Rule::deny_subtree())
        );
        assert_eq!(Rule::from_legacy(LegacyRuleState::Unknown, true), None);
    }
}
