//! Error types for authentication tokens
//!
//! This module defines the errors that can occur while building an
//! authentication token from the attributes supplied by the authentication
//! layer, or while validating membership match criteria.

use thiserror::Error;

use crate::matching::MatchKey;
use crate::token::TokenType;

/// Authentication error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Distinguished name could not be parsed
    #[error("Invalid distinguished name: {0}")]
    InvalidDn(String),

    /// Attribute value is not acceptable
    #[error("Invalid attribute value for {key}: {message}")]
    InvalidAttribute {
        /// Attribute key.
        key: String,
        /// Error message.
        message: String,
    },

    /// Match key does not exist for the token type
    #[error("Match key {key} does not apply to {token_type} tokens")]
    KeyNotApplicable {
        /// The match key.
        key: MatchKey,
        /// The token type it was used with.
        token_type: TokenType,
    },

    /// Unknown match key, operator or token type name
    #[error("Unknown {kind}: {value}")]
    Unknown {
        /// What was being parsed.
        kind: &'static str,
        /// The unrecognized input.
        value: String,
    },
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidDn(_) => "INVALID_DN",
            AuthError::InvalidAttribute { .. } => "INVALID_ATTRIBUTE",
            AuthError::KeyNotApplicable { .. } => "KEY_NOT_APPLICABLE",
            AuthError::Unknown { .. } => "UNKNOWN_VALUE",
        }
    }
}
