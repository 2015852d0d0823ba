//! Access tokens
//!
//! [`AccessToken`] is a single value type for every scheme; the scheme
//! discriminant selects the wire keywords through
//! [`TokenScheme::info`](crate::TokenScheme::info). Tokens are immutable once
//! built and the `with_*` methods consume and return the token.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codec::{self, Params};
use crate::scheme::TokenScheme;
use crate::scope::Scope;
use crate::token_type::TokenTypeUri;
use crate::value::TokenValue;

/// `access_token` parameter name
pub const ACCESS_TOKEN: &str = "access_token";
/// `token_type` parameter name
pub const TOKEN_TYPE: &str = "token_type";
/// `expires_in` parameter name
pub const EXPIRES_IN: &str = "expires_in";
/// `scope` parameter name
pub const SCOPE: &str = "scope";
/// `issued_token_type` parameter name
pub const ISSUED_TOKEN_TYPE: &str = "issued_token_type";

/// OAuth 2.0 access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    scheme: TokenScheme,
    value: TokenValue,
    lifetime: u64,
    scope: Option<Scope>,
    issued_token_type: Option<TokenTypeUri>,
}

impl AccessToken {
    /// Create a token of `scheme` with the given value
    ///
    /// # Panics
    /// Panics if `value` is empty.
    pub fn new(scheme: TokenScheme, value: impl Into<TokenValue>) -> Self {
        Self {
            scheme,
            value: value.into(),
            lifetime: 0,
            scope: None,
            issued_token_type: None,
        }
    }

    /// Create a Bearer token
    pub fn bearer(value: impl Into<TokenValue>) -> Self {
        Self::new(TokenScheme::Bearer, value)
    }

    /// Create a DPoP-bound token
    pub fn dpop(value: impl Into<TokenValue>) -> Self {
        Self::new(TokenScheme::DPoP, value)
    }

    /// Create a token-exchange `N_A` token
    pub fn not_applicable(value: impl Into<TokenValue>) -> Self {
        Self::new(TokenScheme::NotApplicable, value)
    }

    /// Create a token whose scheme is not known
    ///
    /// Such tokens can be inspected but not serialized.
    pub fn unknown(value: impl Into<TokenValue>) -> Self {
        Self::new(TokenScheme::Unknown, value)
    }

    /// Create a token with a random 256-bit value
    #[must_use]
    pub fn generate(scheme: TokenScheme) -> Self {
        Self::new(scheme, TokenValue::generate())
    }

    /// Create a token with a random value of `byte_len` bytes
    ///
    /// # Panics
    /// Panics if `byte_len` is less than 2.
    #[must_use]
    pub fn generate_with_len(scheme: TokenScheme, byte_len: usize) -> Self {
        Self::new(scheme, TokenValue::generate_with_len(byte_len))
    }

    /// Set the lifetime in seconds, `0` for unspecified
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: u64) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Set the scope
    ///
    /// An empty scope is stored as no scope, since both read back the same
    /// from a token response.
    #[must_use]
    pub fn with_scope(mut self, scope: Option<Scope>) -> Self {
        self.scope = scope.filter(|s| !s.is_empty());
        self
    }

    /// Set the RFC 8693 issued token type
    #[must_use]
    pub fn with_issued_token_type(mut self, issued_token_type: Option<TokenTypeUri>) -> Self {
        self.issued_token_type = issued_token_type;
        self
    }

    /// Token scheme
    pub fn scheme(&self) -> TokenScheme {
        self.scheme
    }

    /// Token value
    pub fn value(&self) -> &TokenValue {
        &self.value
    }

    /// Lifetime in seconds, `0` if unspecified
    pub fn lifetime(&self) -> u64 {
        self.lifetime
    }

    /// Lifetime as a [`Duration`], if specified
    pub fn lifetime_duration(&self) -> Option<Duration> {
        (self.lifetime > 0).then(|| Duration::from_secs(self.lifetime))
    }

    /// Scope, if specified
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Issued token type, if specified
    pub fn issued_token_type(&self) -> Option<&TokenTypeUri> {
        self.issued_token_type.as_ref()
    }

    /// Names of the JSON members [`to_json`](Self::to_json) emits
    pub fn parameter_names(&self) -> BTreeSet<&'static str> {
        let mut names = BTreeSet::from([ACCESS_TOKEN, TOKEN_TYPE]);
        if self.lifetime > 0 {
            names.insert(EXPIRES_IN);
        }
        if self.scope.is_some() {
            names.insert(SCOPE);
        }
        if self.issued_token_type.is_some() {
            names.insert(ISSUED_TOKEN_TYPE);
        }
        names
    }

    /// Token response members for this token
    ///
    /// # Panics
    /// Panics if the scheme is [`TokenScheme::Unknown`].
    pub fn to_json(&self) -> Map<String, Value> {
        let token_type = self.serializable_token_type();

        let mut object = Map::new();
        object.insert(ACCESS_TOKEN.to_string(), Value::from(self.value.as_str()));
        object.insert(TOKEN_TYPE.to_string(), Value::from(token_type));
        if self.lifetime > 0 {
            object.insert(EXPIRES_IN.to_string(), Value::from(self.lifetime));
        }
        if let Some(scope) = &self.scope {
            object.insert(SCOPE.to_string(), Value::from(scope.to_string()));
        }
        if let Some(issued_token_type) = &self.issued_token_type {
            object.insert(
                ISSUED_TOKEN_TYPE.to_string(),
                Value::from(issued_token_type.as_str()),
            );
        }
        object
    }

    /// `Authorization` header value, `<Scheme> <value>`
    ///
    /// # Panics
    /// Panics if the scheme has no header keyword (`N_A` and unknown tokens).
    pub fn to_header(&self) -> String {
        let Some(keyword) = self.scheme.header_keyword() else {
            panic!("{} tokens have no Authorization header form", self.scheme);
        };
        format!("{keyword} {}", self.value.as_str())
    }

    /// Query or form parameters carrying this token
    ///
    /// # Panics
    /// Panics if the scheme is [`TokenScheme::Unknown`].
    pub fn to_params(&self) -> Params {
        self.serializable_token_type();
        Params::from([(ACCESS_TOKEN.to_string(), vec![self.value.as_str().to_string()])])
    }

    fn serializable_token_type(&self) -> &'static str {
        match self.scheme.token_type() {
            Some(token_type) => token_type,
            None => panic!("{} tokens cannot be serialized", self.scheme),
        }
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.scheme.is_serializable() {
            return Err(serde::ser::Error::custom(format!(
                "{} tokens cannot be serialized",
                self.scheme
            )));
        }
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let scheme = object
            .get(TOKEN_TYPE)
            .and_then(Value::as_str)
            .and_then(TokenScheme::from_token_type)
            .ok_or_else(|| serde::de::Error::custom("missing or unsupported token_type"))?;
        codec::parse_json(&object, scheme).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_minimal_json() {
        let token = AccessToken::bearer("abc");
        assert_eq!(
            Value::Object(token.to_json()),
            json!({"access_token": "abc", "token_type": "Bearer"})
        );
        assert_eq!(token.parameter_names(), BTreeSet::from(["access_token", "token_type"]));
    }

    #[test]
    fn test_empty_scope_is_no_scope() {
        let token = AccessToken::bearer("abc").with_scope(Some(Scope::default()));

        assert_eq!(token.scope(), None);
        assert_eq!(token, AccessToken::bearer("abc"));
        assert!(!token.to_json().contains_key(SCOPE));
        assert!(!token.parameter_names().contains(SCOPE));
        assert_eq!(codec::parse_json(&token.to_json(), TokenScheme::Bearer).unwrap(), token);
    }

    #[test]
    fn test_full_json() {
        let token = AccessToken::dpop("xyz")
            .with_lifetime(3600)
            .with_scope(Some(Scope::new(["read", "write"])))
            .with_issued_token_type(Some(TokenTypeUri::AccessToken));

        assert_eq!(
            Value::Object(token.to_json()),
            json!({
                "access_token": "xyz",
                "token_type": "DPoP",
                "expires_in": 3600,
                "scope": "read write",
                "issued_token_type": "urn:ietf:params:oauth:token-type:access_token"
            })
        );
        assert_eq!(token.parameter_names().len(), 5);
    }

    #[test]
    fn test_not_applicable_json() {
        let token = AccessToken::not_applicable("exchanged")
            .with_issued_token_type(Some(TokenTypeUri::IdToken));
        let json = token.to_json();
        assert_eq!(json["token_type"], "N_A");
        assert_eq!(json["issued_token_type"], "urn:ietf:params:oauth:token-type:id_token");
    }

    #[test]
    fn test_header() {
        assert_eq!(AccessToken::bearer("abc").to_header(), "Bearer abc");
        assert_eq!(AccessToken::dpop("abc").to_header(), "DPoP abc");
    }

    #[test]
    fn test_params() {
        let params = AccessToken::bearer("abc").to_params();
        assert_eq!(params.get("access_token"), Some(&vec!["abc".to_string()]));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_lifetime_duration() {
        assert_eq!(AccessToken::bearer("a").lifetime_duration(), None);
        assert_eq!(
            AccessToken::bearer("a").with_lifetime(60).lifetime_duration(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_generate() {
        let token = AccessToken::generate(TokenScheme::DPoP);
        assert_eq!(token.scheme(), TokenScheme::DPoP);
        assert_eq!(token.value().as_str().len(), 43);
        assert_eq!(AccessToken::generate_with_len(TokenScheme::Bearer, 3).value().as_str().len(), 4);
    }

    #[test]
    fn test_equality_covers_scheme() {
        assert_ne!(AccessToken::bearer("abc"), AccessToken::dpop("abc"));
        assert_ne!(
            AccessToken::bearer("abc"),
            AccessToken::bearer("abc").with_lifetime(1)
        );
    }

    #[test]
    #[should_panic(expected = "unknown tokens cannot be serialized")]
    fn test_unknown_json_panics() {
        let _ = AccessToken::unknown("abc").to_json();
    }

    #[test]
    #[should_panic(expected = "unknown tokens cannot be serialized")]
    fn test_unknown_params_panics() {
        let _ = AccessToken::unknown("abc").to_params();
    }

    #[test]
    #[should_panic(expected = "N_A tokens have no Authorization header form")]
    fn test_not_applicable_header_panics() {
        let _ = AccessToken::not_applicable("abc").to_header();
    }

    #[test]
    fn test_serde() {
        let token = AccessToken::bearer("abc").with_lifetime(60);
        let text = serde_json::to_string(&token).unwrap();
        assert_eq!(text, r#"{"access_token":"abc","token_type":"Bearer","expires_in":60}"#);

        let back: AccessToken = serde_json::from_str(&text).unwrap();
        assert_eq!(back, token);

        let na: AccessToken =
            serde_json::from_str(r#"{"access_token":"x","token_type":"N_A"}"#).unwrap();
        assert_eq!(na.scheme(), TokenScheme::NotApplicable);

        assert!(serde_json::to_string(&AccessToken::unknown("abc")).is_err());
        assert!(serde_json::from_str::<AccessToken>(r#"{"access_token":"x","token_type":"mac"}"#).is_err());
    }
}
