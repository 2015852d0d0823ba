//! JWS algorithm identifiers advertised in DPoP challenges

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::scope::is_legal_char;

/// JWS `alg` name a server accepts for DPoP proofs
///
/// Comparison and ordering are by name, so a parsed `"ES256"` equals
/// [`JwsAlgorithm::ES256`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JwsAlgorithm(Cow<'static, str>);

impl JwsAlgorithm {
    /// HMAC using SHA-256
    pub const HS256: Self = Self::from_static("HS256");
    /// HMAC using SHA-384
    pub const HS384: Self = Self::from_static("HS384");
    /// HMAC using SHA-512
    pub const HS512: Self = Self::from_static("HS512");
    /// RSASSA-PKCS1-v1_5 using SHA-256
    pub const RS256: Self = Self::from_static("RS256");
    /// RSASSA-PKCS1-v1_5 using SHA-384
    pub const RS384: Self = Self::from_static("RS384");
    /// RSASSA-PKCS1-v1_5 using SHA-512
    pub const RS512: Self = Self::from_static("RS512");
    /// RSASSA-PSS using SHA-256
    pub const PS256: Self = Self::from_static("PS256");
    /// RSASSA-PSS using SHA-384
    pub const PS384: Self = Self::from_static("PS384");
    /// RSASSA-PSS using SHA-512
    pub const PS512: Self = Self::from_static("PS512");
    /// ECDSA using P-256 and SHA-256
    pub const ES256: Self = Self::from_static("ES256");
    /// ECDSA using secp256k1 and SHA-256
    pub const ES256K: Self = Self::from_static("ES256K");
    /// ECDSA using P-384 and SHA-384
    pub const ES384: Self = Self::from_static("ES384");
    /// ECDSA using P-521 and SHA-512
    pub const ES512: Self = Self::from_static("ES512");
    /// Edwards-curve signatures
    pub const EDDSA: Self = Self::from_static("EdDSA");

    const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create an algorithm identifier
    ///
    /// # Panics
    /// Panics if `name` is empty or contains a space, `"`, `\` or a
    /// non-printable character.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(
            is_algorithm_name(&name),
            "invalid JWS algorithm name: {name:?}"
        );
        Self(Cow::Owned(name))
    }

    /// Parse an algorithm name from untrusted input
    pub fn parse(name: &str) -> Option<Self> {
        is_algorithm_name(name).then(|| Self(Cow::Owned(name.to_string())))
    }

    /// Algorithm name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_algorithm_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c != ' ' && is_legal_char(c))
}

impl fmt::Display for JwsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for JwsAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JwsAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid JWS algorithm name: {raw:?}")))
    }
}

#[cfg(feature = "jsonwebtoken")]
impl From<jsonwebtoken::Algorithm> for JwsAlgorithm {
    fn from(algorithm: jsonwebtoken::Algorithm) -> Self {
        // jsonwebtoken's Debug output is the registered JOSE name
        Self(Cow::Owned(format!("{algorithm:?}")))
    }
}

#[cfg(feature = "jsonwebtoken")]
impl TryFrom<&JwsAlgorithm> for jsonwebtoken::Algorithm {
    type Error = jsonwebtoken::errors::Error;

    fn try_from(algorithm: &JwsAlgorithm) -> Result<Self, Self::Error> {
        algorithm.as_str().parse()
    }
}
