//! Distinguished name parsing
//!
//! Splits a string-form subject DN (`CN=Admin,O=Example,C=SE`) into its
//! attribute/value pairs. Escaped separators (`\,`, `\+`, `\=`, `\\`) are
//! honoured; multi-valued RDNs joined with `+` are split into separate pairs.

use crate::error::{AuthError, AuthResult};

/// One `TYPE=value` pair of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnComponent {
    /// Attribute type, upper-cased (`CN`, `O`, ...)
    pub attribute: String,
    /// Unescaped value
    pub value: String,
    /// Joined to the previous component with `+` (same RDN)
    pub continues_rdn: bool,
}

/// Parse a DN into its components, in order of appearance.
///
/// # Errors
///
/// [`AuthError::InvalidDn`] for an empty DN, a component without `=`, an
/// empty attribute type or a dangling escape.
pub fn parse_dn(dn: &str) -> AuthResult<Vec<DnComponent>> {
    let mut components = Vec::new();
    for (raw, continues_rdn) in split_unescaped(dn)? {
        let (attribute, value) = split_component(&raw)
            .ok_or_else(|| AuthError::InvalidDn(format!("component '{}' has no '='", raw.trim())))?;
        let attribute = attribute.trim().to_uppercase();
        if attribute.is_empty() {
            return Err(AuthError::InvalidDn(format!(
                "component '{}' has no attribute type",
                raw.trim()
            )));
        }
        components.push(DnComponent {
            attribute,
            value: unescape(value.trim()),
            continues_rdn,
        });
    }
    if components.is_empty() {
        return Err(AuthError::InvalidDn("empty distinguished name".to_string()));
    }
    Ok(components)
}

/// Render components back to the normalized string form, keeping
/// multi-valued RDNs joined with `+`.
pub fn format_dn(components: &[DnComponent]) -> String {
    let mut out = String::new();
    for (idx, c) in components.iter().enumerate() {
        if idx > 0 {
            out.push(if c.continues_rdn { '+' } else { ',' });
        }
        out.push_str(&c.attribute);
        out.push('=');
        out.push_str(&escape(&c.value));
    }
    out
}

/// Split on unescaped `,` and `+`, keeping escapes in place. Each part is
/// flagged when it followed a `+`.
fn split_unescaped(dn: &str) -> AuthResult<Vec<(String, bool)>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut continues_rdn = false;
    let mut chars = dn.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| AuthError::InvalidDn("dangling escape".to_string()))?;
                current.push('\\');
                current.push(escaped);
            }
            ',' | '+' => {
                parts.push((std::mem::take(&mut current), continues_rdn));
                continues_rdn = c == '+';
            }
            _ => current.push(c),
        }
    }
    parts.push((current, continues_rdn));

    // a DN of only whitespace has no components at all
    if parts.len() == 1 && parts[0].0.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(parts)
}

/// Split `TYPE=value` on the first unescaped `=`.
fn split_component(raw: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (idx, c) in raw.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '=' if !escaped => return Some((&raw[..idx], &raw[idx + 1..])),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '=' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
