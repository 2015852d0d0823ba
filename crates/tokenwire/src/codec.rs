//! # Token Codec
//!
//! Decodes access tokens from the places a client can send them: a JSON token
//! response, the `Authorization` header and `access_token` query or form
//! parameters. Encoding lives on [`AccessToken`] itself
//! ([`to_json`](AccessToken::to_json), [`to_header`](AccessToken::to_header),
//! [`to_params`](AccessToken::to_params)).
//!
//! Every failure is a [`ParseError::Token`] carrying the standard
//! [`ChallengeError`] to send back, with the configured realm attached.
//!
//! The free functions use a codec with the default configuration.
//!
//! ## Authorization header failures
//!
//! | input | Bearer | DPoP |
//! |---|---|---|
//! | absent or blank | `missing_token` | `missing_token` |
//! | no value after the keyword | `invalid_request` | `invalid_request` |
//! | wrong keyword | `invalid_request` | `invalid_token` (`invalid_request` with [`SchemeErrorPolicy::Uniform`]) |
//! | blank value | `invalid_request` | `invalid_token` (`invalid_request` with [`SchemeErrorPolicy::Uniform`]) |

use std::borrow::Cow;
use std::collections::HashMap;

use http::HeaderMap;
use http::header::AUTHORIZATION;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use tracing::debug;

use crate::challenge::{ChallengeError, StandardError};
use crate::config::{CodecConfig, SchemeErrorPolicy};
use crate::error::{ConfigError, ParseError};
use crate::refresh::{REFRESH_TOKEN, RefreshToken, TokenPair};
use crate::scheme::TokenScheme;
use crate::scope::Scope;
use crate::token::{ACCESS_TOKEN, AccessToken, EXPIRES_IN, ISSUED_TOKEN_TYPE, SCOPE, TOKEN_TYPE};
use crate::token_type::TokenTypeUri;
use crate::value::TokenValue;

/// Multi-valued query or form parameters
pub type Params = HashMap<String, Vec<String>>;

static DEFAULT_CODEC: Lazy<TokenCodec> = Lazy::new(TokenCodec::default);

/// Decode a raw query string or `application/x-www-form-urlencoded` body
///
/// A leading `?` is ignored. Repeated keys keep every value in order.
pub fn parse_query(query: &str) -> Params {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = Params::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    params
}

/// Parse a JSON token response for an expected scheme
///
/// See [`TokenCodec::parse_json`].
pub fn parse_json(object: &Map<String, Value>, scheme: TokenScheme) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_json(object, scheme)
}

/// Parse a JSON token response, routing on its `token_type`
///
/// See [`TokenCodec::parse_json_any`].
pub fn parse_json_any(object: &Map<String, Value>) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_json_any(object)
}

/// Parse a JSON token response with an optional refresh token
///
/// See [`TokenCodec::parse_token_pair`].
pub fn parse_token_pair(object: &Map<String, Value>) -> crate::Result<TokenPair> {
    DEFAULT_CODEC.parse_token_pair(object)
}

/// Parse an `Authorization` header value for an expected scheme
///
/// See [`TokenCodec::parse_header`].
pub fn parse_header(value: Option<&str>, scheme: TokenScheme) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_header(value, scheme)
}

/// Parse an `Authorization` header value of either scheme
///
/// See [`TokenCodec::parse_header_infer`].
pub fn parse_header_infer(value: Option<&str>) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_header_infer(value)
}

/// Parse the `access_token` parameter
///
/// See [`TokenCodec::parse_params`].
pub fn parse_params(params: &Params, scheme: Option<TokenScheme>) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_params(params, scheme)
}

/// Find an access token anywhere in a request
///
/// See [`TokenCodec::parse_request`].
pub fn parse_request(headers: &HeaderMap, params: &Params) -> crate::Result<AccessToken> {
    DEFAULT_CODEC.parse_request(headers, params)
}

/// Access token decoder
#[derive(Debug, Clone, Default)]
pub struct TokenCodec {
    config: CodecConfig,
}

impl TokenCodec {
    /// Create a codec from a configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn new(config: CodecConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Generate a token using the configured value length
    #[must_use]
    pub fn generate(&self, scheme: TokenScheme) -> AccessToken {
        AccessToken::generate_with_len(scheme, self.config.value_bytes)
    }

    /// Parse a JSON token response for an expected scheme
    ///
    /// `token_type` must equal the scheme's type exactly. `expires_in` may be
    /// a number or a numeric string; a blank `scope` means no scope.
    ///
    /// # Errors
    /// Returns [`ParseError::Token`] with an `invalid_request` challenge if a
    /// member is missing or malformed.
    pub fn parse_json(
        &self,
        object: &Map<String, Value>,
        scheme: TokenScheme,
    ) -> crate::Result<AccessToken> {
        let fail = |message: String| self.fail(message, StandardError::InvalidRequest, scheme);

        let token_type = object
            .get(TOKEN_TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| fail("Missing token_type".to_string()))?;

        match scheme.token_type() {
            Some(expected) if expected == token_type => {}
            Some(expected) => return Err(fail(format!("Token type must be {expected}"))),
            None => return Err(fail(format!("Cannot parse {scheme} tokens from JSON"))),
        }

        let value = object
            .get(ACCESS_TOKEN)
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| fail("Missing or blank access_token".to_string()))?;

        let lifetime = match object.get(EXPIRES_IN) {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| {
                fail("Invalid expires_in: must be a non-negative integer".to_string())
            })?,
            Some(Value::String(s)) => s.parse::<u64>().map_err(|_| {
                fail("Invalid expires_in: must be a non-negative integer".to_string())
            })?,
            Some(_) => return Err(fail("Invalid expires_in: unexpected type".to_string())),
        };

        let scope = match object.get(SCOPE) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                let scope = Scope::parse(s).map_err(|e| fail(format!("Invalid scope: {e}")))?;
                (!scope.is_empty()).then_some(scope)
            }
            Some(_) => return Err(fail("Invalid scope: must be a string".to_string())),
        };

        let issued_token_type = match object.get(ISSUED_TOKEN_TYPE) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(
                TokenTypeUri::parse(s)
                    .map_err(|e| fail(format!("Invalid issued_token_type: {e}")))?,
            ),
            Some(_) => {
                return Err(fail("Invalid issued_token_type: must be a string".to_string()));
            }
        };

        Ok(AccessToken::new(scheme, value)
            .with_lifetime(lifetime)
            .with_scope(scope)
            .with_issued_token_type(issued_token_type))
    }

    /// Parse a JSON token response, routing on its `token_type`
    ///
    /// Only `Bearer` and `DPoP` are routed. Use [`parse_json`](Self::parse_json)
    /// with [`TokenScheme::NotApplicable`] for token exchange `N_A` responses.
    ///
    /// # Errors
    /// Returns [`ParseError::Token`] with a Bearer `invalid_request` challenge
    /// if `token_type` is missing or unsupported, otherwise as
    /// [`parse_json`](Self::parse_json).
    pub fn parse_json_any(&self, object: &Map<String, Value>) -> crate::Result<AccessToken> {
        match object.get(TOKEN_TYPE).and_then(Value::as_str) {
            Some("Bearer") => self.parse_json(object, TokenScheme::Bearer),
            Some("DPoP") => self.parse_json(object, TokenScheme::DPoP),
            Some(_) => Err(self.fail(
                "Unsupported token_type",
                StandardError::InvalidRequest,
                TokenScheme::Bearer,
            )),
            None => Err(self.fail(
                "Missing token_type",
                StandardError::InvalidRequest,
                TokenScheme::Bearer,
            )),
        }
    }

    /// Parse a JSON token response with an optional refresh token
    ///
    /// # Errors
    /// As [`parse_json_any`](Self::parse_json_any), or if `refresh_token` is
    /// present but not a non-blank string.
    pub fn parse_token_pair(&self, object: &Map<String, Value>) -> crate::Result<TokenPair> {
        let access_token = self.parse_json_any(object)?;

        let refresh_token = match object.get(REFRESH_TOKEN) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(RefreshToken::new(s.as_str())),
            Some(_) => {
                return Err(self.fail(
                    "Invalid refresh_token: must be a non-blank string",
                    StandardError::InvalidRequest,
                    access_token.scheme(),
                ));
            }
        };

        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Parse an `Authorization` header value for an expected scheme
    ///
    /// The keyword is matched case-sensitively and separated from the value by
    /// whitespace. `None` means the header was absent.
    ///
    /// # Errors
    /// Returns [`ParseError::Token`] with the challenge listed in the
    /// [module table](self).
    pub fn parse_header(&self, value: Option<&str>, scheme: TokenScheme) -> crate::Result<AccessToken> {
        let Some(keyword) = scheme.header_keyword() else {
            return Err(self.fail(
                format!("{scheme} tokens have no Authorization header form"),
                StandardError::InvalidRequest,
                scheme,
            ));
        };

        let value = value.map(str::trim_start).unwrap_or_default();
        if value.trim_end().is_empty() {
            return Err(self.fail("Missing access token", StandardError::MissingToken, scheme));
        }

        let Some((presented, token)) = value.split_once(char::is_whitespace) else {
            return Err(self.fail(
                "Invalid Authorization header value",
                StandardError::InvalidRequest,
                scheme,
            ));
        };

        if presented != keyword {
            return Err(self.fail(
                format!("Token type must be {keyword}"),
                self.header_error(scheme),
                scheme,
            ));
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(self.fail(
                "Empty access token value",
                self.header_error(scheme),
                scheme,
            ));
        }

        Ok(AccessToken::new(scheme, token))
    }

    /// Parse an `Authorization` header value of either scheme
    ///
    /// Values starting with `Bearer` are parsed as Bearer tokens, everything
    /// else (including an absent header) as DPoP.
    ///
    /// # Errors
    /// As [`parse_header`](Self::parse_header).
    pub fn parse_header_infer(&self, value: Option<&str>) -> crate::Result<AccessToken> {
        match value {
            Some(v) if v.trim_start().starts_with("Bearer") => {
                self.parse_header(value, TokenScheme::Bearer)
            }
            _ => self.parse_header(value, TokenScheme::DPoP),
        }
    }

    /// Parse the `access_token` parameter
    ///
    /// The first value is used. Without an expected scheme the result is an
    /// [`TokenScheme::Unknown`] token.
    ///
    /// # Errors
    /// Returns [`ParseError::Token`] with the scheme's `missing_token`
    /// challenge (Bearer when no scheme is given) if there is no non-blank
    /// `access_token`.
    pub fn parse_params(
        &self,
        params: &Params,
        scheme: Option<TokenScheme>,
    ) -> crate::Result<AccessToken> {
        let scheme = scheme.unwrap_or(TokenScheme::Unknown);

        let Some(value) = params
            .get(ACCESS_TOKEN)
            .and_then(|values| values.first())
            .filter(|v| !v.trim().is_empty())
        else {
            return Err(self.fail("Missing access token", StandardError::MissingToken, scheme));
        };

        Ok(AccessToken::new(scheme, TokenValue::new(value.as_str())))
    }

    /// Find an access token anywhere in a request
    ///
    /// The `Authorization` header wins when present (see
    /// [`parse_header_infer`](Self::parse_header_infer)). Otherwise the
    /// `access_token` parameter is read as a token of unknown scheme.
    ///
    /// # Errors
    /// Returns [`ParseError::Token`] if the header is malformed or not UTF-8,
    /// or with a Bearer `missing_token` challenge if no token is found.
    pub fn parse_request(&self, headers: &HeaderMap, params: &Params) -> crate::Result<AccessToken> {
        if let Some(header) = headers.get(AUTHORIZATION) {
            let value = header.to_str().map_err(|_| {
                self.fail(
                    "Authorization header is not valid UTF-8",
                    StandardError::InvalidRequest,
                    TokenScheme::Bearer,
                )
            })?;
            return self.parse_header_infer(Some(value));
        }

        self.parse_params(params, None)
    }

    fn header_error(&self, scheme: TokenScheme) -> StandardError {
        match (scheme, self.config.scheme_errors) {
            (TokenScheme::DPoP, SchemeErrorPolicy::Legacy) => StandardError::InvalidToken,
            _ => StandardError::InvalidRequest,
        }
    }

    fn fail(
        &self,
        message: impl Into<Cow<'static, str>>,
        kind: StandardError,
        scheme: TokenScheme,
    ) -> ParseError {
        let message = message.into();
        debug!(%scheme, error = ?kind, reason = %message, "Access token rejected");

        let mut challenge = ChallengeError::standard(kind, scheme);
        if let Some(realm) = &self.config.realm {
            challenge = challenge.with_realm(Some(realm.as_str()));
        }
        ParseError::invalid_token(message, challenge)
    }
}
