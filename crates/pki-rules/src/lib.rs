//! # PKI Access Rules
//!
//! This crate provides the access-rule model of the CA administration
//! platform: hierarchical resource paths, allow/deny rules with exact or
//! subtree scope, rule resolution and the dominance check that prevents
//! privilege escalation when roles are edited.
//!
//! ## Overview
//!
//! The pki-rules crate handles:
//! - **Resource paths**: Normalized `/`-delimited resource names
//! - **Rules**: Allow or deny, for one path or a whole subtree
//! - **Rule sets**: The rules held by one role, and their resolution
//! - **Access trees**: The combined view over all roles of an administrator
//! - **Dominance**: Whether an administrator covers every grant of a rule set
//!
//! ## Resolution
//!
//! ```text
//! /                      allow/subtree
//! /ca/ManagementCA       deny/exact
//!
//! /ca/ManagementCA       -> deny   (most specific rule)
//! /ca/ManagementCA/keys  -> allow  (exact deny does not reach below, inherits /)
//! /anything/else         -> allow  (inherits /)
//! ```
//!
//! Without any applying rule a path resolves to deny.
//!
//! ## Usage
//!
//! ```rust
//! use pki_rules::{dominates, AccessTree, ResourcePath, Rule, RuleSet};
//!
//! let mut rules = RuleSet::new();
//! rules.insert("/", Rule::allow_subtree());
//! rules.insert("/ca/ManagementCA", Rule::deny_exact());
//!
//! assert!(!rules.is_allowed(&ResourcePath::new("/ca/ManagementCA")));
//! assert!(rules.is_allowed(&ResourcePath::new("/ca/ManagementCA/keys")));
//!
//! let editor = AccessTree::from_rule_sets([rules.clone()]);
//! assert!(dominates(&editor, &rules));
//! ```

pub mod dominance;
pub mod path;
pub mod rule;
pub mod ruleset;
pub mod standard;
pub mod tree;

// Re-export main types for convenience
pub use dominance::{check_dominance, dominates, DominanceViolation, ViolationKind};
pub use path::ResourcePath;
pub use rule::{LegacyRuleState, Rule, RuleScope, RuleState};
pub use ruleset::{Resolution, RuleSet};
pub use tree::AccessTree;
