//! Refresh tokens and token pairs
//!
//! A token endpoint answers with an access token and, optionally, a refresh
//! token in the same JSON object. [`TokenPair`] keeps the two together and
//! reports the union of their member names.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codec;
use crate::token::AccessToken;
use crate::value::TokenValue;

/// `refresh_token` parameter name
pub const REFRESH_TOKEN: &str = "refresh_token";

/// OAuth 2.0 refresh token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefreshToken {
    value: TokenValue,
}

impl RefreshToken {
    /// Wrap an existing refresh token value
    ///
    /// # Panics
    /// Panics if `value` is empty.
    pub fn new(value: impl Into<TokenValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Generate a random 256-bit refresh token
    #[must_use]
    pub fn generate() -> Self {
        Self::new(TokenValue::generate())
    }

    /// Token value
    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    /// Names of the JSON members [`to_json`](Self::to_json) emits
    pub fn parameter_names(&self) -> BTreeSet<&'static str> {
        BTreeSet::from([REFRESH_TOKEN])
    }

    /// Token response members for this token
    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = Map::new();
        object.insert(REFRESH_TOKEN.to_string(), Value::from(self.value.as_str()));
        object
    }
}

/// Access token with an optional refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
}

impl TokenPair {
    /// Pair an access token with an optional refresh token
    pub fn new(access_token: AccessToken, refresh_token: Option<RefreshToken>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    /// Access token
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Refresh token, if issued
    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// Split into the access and refresh tokens
    pub fn into_parts(self) -> (AccessToken, Option<RefreshToken>) {
        (self.access_token, self.refresh_token)
    }

    /// Union of both tokens' JSON member names
    pub fn parameter_names(&self) -> BTreeSet<&'static str> {
        let mut names = self.access_token.parameter_names();
        if let Some(refresh_token) = &self.refresh_token {
            names.extend(refresh_token.parameter_names());
        }
        names
    }

    /// Token response members for both tokens
    ///
    /// # Panics
    /// Panics if the access token's scheme is unknown.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = self.access_token.to_json();
        if let Some(refresh_token) = &self.refresh_token {
            object.extend(refresh_token.to_json());
        }
        object
    }

    /// Parse a token response carrying a Bearer or DPoP access token
    ///
    /// # Errors
    /// Returns [`ParseError`](crate::ParseError) if the access token is
    /// malformed or `refresh_token` is present but not a non-blank string.
    pub fn parse_json(object: &Map<String, Value>) -> crate::Result<Self> {
        codec::parse_token_pair(object)
    }
}

impl Serialize for TokenPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.access_token.scheme().is_serializable() {
            return Err(serde::ser::Error::custom(format!(
                "{} tokens cannot be serialized",
                self.access_token.scheme()
            )));
        }
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Self::parse_json(&object).map_err(serde::de::Error::custom)
    }
}
