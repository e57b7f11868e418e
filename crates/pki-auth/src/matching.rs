//! Role membership matching
//!
//! A role member is not a user account: it is a rule that selects tokens.
//! It names a token type, the trust anchor the token must have been
//! authenticated under, one token attribute and a comparison against a value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};
use crate::token::{AuthenticationToken, TokenType};

/// Token attribute compared by a member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    /// Complete normalized subject DN
    FullDn,
    /// Subject CN
    CommonName,
    /// Subject UID
    Uid,
    /// Subject SERIALNUMBER (the DN attribute, not the certificate serial)
    DnSerialNumber,
    /// Subject O
    Organization,
    /// Subject OU
    OrganizationalUnit,
    /// Subject C
    Country,
    /// Subject E / emailAddress
    Email,
    /// Subject alternative name dNSName
    DnsName,
    /// Certificate serial number (hex)
    CertificateSerial,
    /// Local command-line username
    Username,
    /// OAuth subject claim
    OAuthSubject,
}

impl MatchKey {
    /// All match keys.
    pub fn all() -> &'static [MatchKey] {
        &[
            MatchKey::FullDn,
            MatchKey::CommonName,
            MatchKey::Uid,
            MatchKey::DnSerialNumber,
            MatchKey::Organization,
            MatchKey::OrganizationalUnit,
            MatchKey::Country,
            MatchKey::Email,
            MatchKey::DnsName,
            MatchKey::CertificateSerial,
            MatchKey::Username,
            MatchKey::OAuthSubject,
        ]
    }

    /// Get the string representation of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKey::FullDn => "FULL_DN",
            MatchKey::CommonName => "CN",
            MatchKey::Uid => "UID",
            MatchKey::DnSerialNumber => "SERIALNUMBER",
            MatchKey::Organization => "O",
            MatchKey::OrganizationalUnit => "OU",
            MatchKey::Country => "C",
            MatchKey::Email => "E",
            MatchKey::DnsName => "DNS_NAME",
            MatchKey::CertificateSerial => "CERT_SERIAL",
            MatchKey::Username => "USERNAME",
            MatchKey::OAuthSubject => "OAUTH_SUBJECT",
        }
    }

    /// Parse a key from its string representation (case-insensitive).
    ///
    /// DN attribute aliases (`SN`, `EMAILADDRESS`, ...) are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FULL_DN" | "DN" => Some(MatchKey::FullDn),
            "CN" | "COMMONNAME" => Some(MatchKey::CommonName),
            "UID" => Some(MatchKey::Uid),
            "SERIALNUMBER" | "SN" => Some(MatchKey::DnSerialNumber),
            "O" => Some(MatchKey::Organization),
            "OU" => Some(MatchKey::OrganizationalUnit),
            "C" => Some(MatchKey::Country),
            "E" | "EMAIL" | "EMAILADDRESS" => Some(MatchKey::Email),
            "DNS_NAME" | "DNSNAME" => Some(MatchKey::DnsName),
            "CERT_SERIAL" | "CERTIFICATE_SERIAL" => Some(MatchKey::CertificateSerial),
            "USERNAME" => Some(MatchKey::Username),
            "OAUTH_SUBJECT" | "SUB" => Some(MatchKey::OAuthSubject),
            _ => None,
        }
    }

    /// Token type this key is an attribute of.
    pub fn token_type(&self) -> TokenType {
        match self {
            MatchKey::Username => TokenType::Cli,
            MatchKey::OAuthSubject => TokenType::OAuth,
            _ => TokenType::Certificate,
        }
    }

    /// Whether values of this key compare case-insensitively regardless of
    /// the operator. Hex serial numbers have no meaningful case.
    fn ignores_case(&self) -> bool {
        matches!(self, MatchKey::CertificateSerial)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison between the token attribute and the member value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchOperator {
    /// Case-sensitive equality
    Equals,
    /// Case-insensitive equality
    EqualsCaseInsensitive,
    /// Case-sensitive inequality
    NotEquals,
    /// Case-insensitive inequality
    NotEqualsCaseInsensitive,
}

impl MatchOperator {
    /// Get the string representation of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperator::Equals => "EQUALS",
            MatchOperator::EqualsCaseInsensitive => "EQUALS_CASE_INSENSITIVE",
            MatchOperator::NotEquals => "NOT_EQUALS",
            MatchOperator::NotEqualsCaseInsensitive => "NOT_EQUALS_CASE_INSENSITIVE",
        }
    }

    /// Parse an operator from its string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "EQUALS" | "EQUALCASE" => Some(MatchOperator::Equals),
            "EQUALS_CASE_INSENSITIVE" | "EQUALCASEINS" => Some(MatchOperator::EqualsCaseInsensitive),
            "NOT_EQUALS" | "NOT_EQUALCASE" => Some(MatchOperator::NotEquals),
            "NOT_EQUALS_CASE_INSENSITIVE" | "NOT_EQUALCASEINS" => {
                Some(MatchOperator::NotEqualsCaseInsensitive)
            }
            _ => None,
        }
    }

    fn is_negated(&self) -> bool {
        matches!(
            self,
            MatchOperator::NotEquals | MatchOperator::NotEqualsCaseInsensitive
        )
    }

    fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            MatchOperator::EqualsCaseInsensitive | MatchOperator::NotEqualsCaseInsensitive
        )
    }
}

impl fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The token-selecting part of a role member.
///
/// # Example
///
/// ```
/// use pki_auth::{AuthenticationToken, MatchCriteria, MatchKey, MatchOperator};
///
/// let token = AuthenticationToken::certificate("ManagementCA", "CN=SuperAdmin,O=Example").unwrap();
/// let criteria = MatchCriteria::new("ManagementCA", MatchKey::CommonName, MatchOperator::Equals, "SuperAdmin");
///
/// assert!(criteria.matches(&token));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchCriteria {
    /// Token type the member selects
    pub token_type: TokenType,
    /// Trust anchor (issuing CA, OAuth provider) the token must come from
    pub trust_anchor_id: String,
    /// Compared attribute
    pub match_key: MatchKey,
    /// Comparison
    pub operator: MatchOperator,
    /// Compared value
    pub value: String,
}

impl MatchCriteria {
    /// Create criteria; the token type is implied by the match key.
    pub fn new(
        trust_anchor_id: impl Into<String>,
        match_key: MatchKey,
        operator: MatchOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            token_type: match_key.token_type(),
            trust_anchor_id: trust_anchor_id.into(),
            match_key,
            operator,
            value: value.into(),
        }
    }

    /// Check that the key belongs to the token type and the value is usable.
    pub fn validate(&self) -> AuthResult<()> {
        if self.match_key.token_type() != self.token_type {
            return Err(AuthError::KeyNotApplicable {
                key: self.match_key,
                token_type: self.token_type,
            });
        }
        if self.value.trim().is_empty() {
            return Err(AuthError::InvalidAttribute {
                key: self.match_key.to_string(),
                message: "match value must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Check if a token is selected by these criteria.
    pub fn matches(&self, token: &AuthenticationToken) -> bool {
        matches(token, self)
    }
}

/// Check if `token` is selected by `criteria`.
///
/// The token type and the trust anchor must match exactly; a token issued
/// under a different trust anchor never matches. A token lacking the
/// compared attribute never matches, not even with a negated operator.
/// For multi-valued attributes an equality matches if any value is equal,
/// an inequality only if no value is.
pub fn matches(token: &AuthenticationToken, criteria: &MatchCriteria) -> bool {
    if token.token_type() != criteria.token_type {
        return false;
    }
    if token.trust_anchor_id() != criteria.trust_anchor_id {
        return false;
    }
    let values = token.attribute_values(criteria.match_key);
    if values.is_empty() {
        return false;
    }

    let ignore_case = criteria.operator.is_case_insensitive() || criteria.match_key.ignores_case();
    let any_equal = values.iter().any(|value| {
        if ignore_case {
            value.eq_ignore_ascii_case(&criteria.value)
        } else {
            *value == criteria.value
        }
    });

    if criteria.operator.is_negated() {
        !any_equal
    } else {
        any_equal
    }
}
