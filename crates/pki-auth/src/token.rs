//! Authentication tokens
//!
//! The authentication layer (client-certificate TLS, local CLI, OAuth)
//! verifies a principal and hands the authorization core a token: a
//! read-only bag of principal attributes plus the trust anchor the principal
//! was authenticated under. Signature and certificate verification happen
//! before a token is built and are not the concern of this crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::dn::{format_dn, parse_dn};
use crate::error::{AuthError, AuthResult};
use crate::matching::MatchKey;

/// Trust anchor used for locally authenticated command-line tokens.
pub const LOCAL_TRUST_ANCHOR: &str = "local";

/// Kind of authentication that produced a token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Client certificate (X.509)
    Certificate,
    /// Local command line user
    Cli,
    /// OAuth bearer token
    OAuth,
}

impl TokenType {
    /// Get the string representation of the token type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Certificate => "certificate",
            TokenType::Cli => "cli",
            TokenType::OAuth => "oauth",
        }
    }

    /// Parse a token type from its string representation (case-insensitive).
    pub fn parse(s: &str) -> AuthResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "certificate" | "x509" => Ok(TokenType::Certificate),
            "cli" => Ok(TokenType::Cli),
            "oauth" | "oauth2" => Ok(TokenType::OAuth),
            _ => Err(AuthError::Unknown {
                kind: "token type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated administrator.
///
/// # Example
///
/// ```
/// use pki_auth::{AuthenticationToken, MatchKey, TokenType};
///
/// let token = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin,O=Example,C=SE").unwrap();
/// assert_eq!(token.token_type(), TokenType::Certificate);
/// assert_eq!(token.attribute(MatchKey::CommonName), Some("SuperAdmin"));
/// assert_eq!(token.principal(), "CN=SuperAdmin,O=Example,C=SE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationToken {
    token_type: TokenType,
    trust_anchor_id: String,
    attributes: BTreeMap<MatchKey, Vec<String>>,
}

impl AuthenticationToken {
    /// Create a token with no attributes.
    pub fn new(token_type: TokenType, trust_anchor_id: impl Into<String>) -> Self {
        Self {
            token_type,
            trust_anchor_id: trust_anchor_id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Create a certificate token from the issuing CA and the subject DN.
    ///
    /// The normalized DN is stored as [`MatchKey::FullDn`]; recognized DN
    /// attributes are stored under their own keys. Unrecognized attribute
    /// types only take part in full-DN matching.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidDn`] if the DN cannot be parsed.
    pub fn certificate(trust_anchor_id: impl Into<String>, subject_dn: &str) -> AuthResult<Self> {
        let components = parse_dn(subject_dn)?;
        let mut token = Self::new(TokenType::Certificate, trust_anchor_id);
        token.push(MatchKey::FullDn, format_dn(&components));
        for component in components {
            if let Some(key) = MatchKey::parse(&component.attribute) {
                if key.token_type() == TokenType::Certificate && key != MatchKey::FullDn {
                    token.push(key, component.value);
                }
            }
        }
        Ok(token)
    }

    /// Create a locally authenticated command-line token.
    pub fn cli(username: impl Into<String>) -> Self {
        let mut token = Self::new(TokenType::Cli, LOCAL_TRUST_ANCHOR);
        token.push(MatchKey::Username, username.into());
        token
    }

    /// Create an OAuth token from the provider and the subject claim.
    pub fn oauth(provider: impl Into<String>, subject: impl Into<String>) -> Self {
        let mut token = Self::new(TokenType::OAuth, provider);
        token.push(MatchKey::OAuthSubject, subject.into());
        token
    }

    /// Add an attribute value.
    ///
    /// # Errors
    ///
    /// [`AuthError::KeyNotApplicable`] if the key is not an attribute of
    /// this token type.
    pub fn with_attribute(mut self, key: MatchKey, value: impl Into<String>) -> AuthResult<Self> {
        if key.token_type() != self.token_type {
            return Err(AuthError::KeyNotApplicable {
                key,
                token_type: self.token_type,
            });
        }
        self.push(key, value.into());
        Ok(self)
    }

    /// Set the certificate serial number (hex) of a certificate token.
    /// Ignored for other token types.
    pub fn with_certificate_serial(mut self, serial_hex: impl Into<String>) -> Self {
        if self.token_type == TokenType::Certificate {
            self.push(MatchKey::CertificateSerial, serial_hex.into());
        }
        self
    }

    fn push(&mut self, key: MatchKey, value: String) {
        self.attributes.entry(key).or_default().push(value);
    }

    /// Kind of authentication.
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Trust anchor the principal was authenticated under.
    pub fn trust_anchor_id(&self) -> &str {
        &self.trust_anchor_id
    }

    /// First value of an attribute.
    pub fn attribute(&self, key: MatchKey) -> Option<&str> {
        self.attributes
            .get(&key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of an attribute (empty if absent).
    pub fn attribute_values(&self, key: MatchKey) -> &[String] {
        self.attributes
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human-readable principal name for logs and audit records.
    pub fn principal(&self) -> &str {
        let key = match self.token_type {
            TokenType::Certificate => MatchKey::FullDn,
            TokenType::Cli => MatchKey::Username,
            TokenType::OAuth => MatchKey::OAuthSubject,
        };
        self.attribute(key).unwrap_or("<anonymous>")
    }
}

impl fmt::Display for AuthenticationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@{}",
            self.token_type,
            self.principal(),
            self.trust_anchor_id
        )
    }
}
