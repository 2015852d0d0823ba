//! RFC 8693 token type identifiers
//!
//! The `issued_token_type` of a token-exchange response names what kind of
//! token was issued. The five URNs registered by RFC 8693 Section 3 resolve to
//! dedicated variants; anything else is kept verbatim once it checks out as a
//! URI reference (RFC 3986 Section 4.1).

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::InvalidTokenType;

// Relative references are resolved against this to check their structure
static REFERENCE_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("https://token-type.invalid/").expect("Invalid base URI"));

/// `urn:ietf:params:oauth:token-type:access_token`
pub const ACCESS_TOKEN_URN: &str = "urn:ietf:params:oauth:token-type:access_token";
/// `urn:ietf:params:oauth:token-type:refresh_token`
pub const REFRESH_TOKEN_URN: &str = "urn:ietf:params:oauth:token-type:refresh_token";
/// `urn:ietf:params:oauth:token-type:id_token`
pub const ID_TOKEN_URN: &str = "urn:ietf:params:oauth:token-type:id_token";
/// `urn:ietf:params:oauth:token-type:saml1`
pub const SAML1_URN: &str = "urn:ietf:params:oauth:token-type:saml1";
/// `urn:ietf:params:oauth:token-type:saml2`
pub const SAML2_URN: &str = "urn:ietf:params:oauth:token-type:saml2";

/// Semantic type of an issued token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenTypeUri {
    /// OAuth 2.0 access token
    AccessToken,
    /// OAuth 2.0 refresh token
    RefreshToken,
    /// OpenID Connect ID token
    IdToken,
    /// Base64url-encoded SAML 1.1 assertion
    Saml1,
    /// Base64url-encoded SAML 2.0 assertion
    Saml2,
    /// Any other URI reference, exactly as received
    Other(String),
}

impl TokenTypeUri {
    /// Resolve a token type string
    ///
    /// Values other than the registered URNs are kept as given, without
    /// normalization, so they serialize back to the same text.
    ///
    /// # Errors
    /// Returns [`InvalidTokenType`] if `value` is empty or not a URI reference.
    pub fn parse(value: &str) -> Result<Self, InvalidTokenType> {
        Ok(match value {
            ACCESS_TOKEN_URN => Self::AccessToken,
            REFRESH_TOKEN_URN => Self::RefreshToken,
            ID_TOKEN_URN => Self::IdToken,
            SAML1_URN => Self::Saml1,
            SAML2_URN => Self::Saml2,
            other => {
                check_reference(other)?;
                Self::Other(other.to_string())
            }
        })
    }

    /// The URI string
    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessToken => ACCESS_TOKEN_URN,
            Self::RefreshToken => REFRESH_TOKEN_URN,
            Self::IdToken => ID_TOKEN_URN,
            Self::Saml1 => SAML1_URN,
            Self::Saml2 => SAML2_URN,
            Self::Other(uri) => uri,
        }
    }

    /// Whether this is one of the five registered token types
    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

fn check_reference(value: &str) -> Result<(), InvalidTokenType> {
    let reject = |reason: String| InvalidTokenType {
        value: value.to_string(),
        reason: reason.into(),
    };

    if value.is_empty() {
        return Err(reject("empty".to_string()));
    }

    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3);
                if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                    return Err(reject("malformed percent-encoding".to_string()));
                }
            }
            b if b.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=".contains(&b) => {}
            _ => return Err(reject("illegal character".to_string())),
        }
    }

    REFERENCE_BASE
        .join(value)
        .map(|_| ())
        .map_err(|e| reject(e.to_string()))
}

impl fmt::Display for TokenTypeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenTypeUri {
    type Err = InvalidTokenType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TokenTypeUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TokenTypeUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
