//! # PKI Authentication Tokens
//!
//! This crate provides the authentication-token side of CA administration
//! authorization: the token handed over by the authentication layer and the
//! criteria that bind tokens to roles.
//!
//! ## Overview
//!
//! The pki-auth crate handles:
//! - **Tokens**: Certificate, CLI and OAuth administrator tokens
//! - **DN parsing**: Subject DNs split into matchable attributes
//! - **Match criteria**: Trust anchor + attribute + operator + value
//! - **Matching**: Deciding whether a token is selected by a role member
//!
//! ## Usage
//!
//! ```rust
//! use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
//!
//! // Token for an administrator authenticated with a client certificate
//! let token = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin,O=Example,C=SE").unwrap();
//!
//! // Select every administrator from Example issued by ManagementCA
//! let criteria = MatchCriteria::new(
//!     "ManagementCA",
//!     MatchKey::Organization,
//!     MatchOperator::EqualsCaseInsensitive,
//!     "example",
//! );
//! assert!(criteria.matches(&token));
//!
//! // Tokens from another trust anchor are never selected
//! let foreign = AuthenticationToken::certificate("OtherCA", "CN=SuperAdmin,O=Example,C=SE").unwrap();
//! assert!(!criteria.matches(&foreign));
//! ```
//!
//! Certificate parsing and signature verification happen in the
//! authentication layer before a token is built.

pub mod dn;
pub mod error;
pub mod matching;
pub mod token;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use matching::{matches, MatchCriteria, MatchKey, MatchOperator};
pub use token::{AuthenticationToken, TokenType, LOCAL_TRUST_ANCHOR};
