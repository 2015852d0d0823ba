//! # Authentication Challenges (RFC 6750 / RFC 9449)
//!
//! A [`ChallengeError`] describes why a resource server refused a request and
//! what the client must present to retry. It serializes to, and is parsed from,
//! the `WWW-Authenticate` response header:
//!
//! ```text
//! WWW-Authenticate: Bearer realm="example", error="invalid_token", error_description="expired"
//! WWW-Authenticate: DPoP error="invalid_token", algs="ES256 PS256"
//! ```
//!
//! Challenges are immutable values. Every `with_*` method returns a modified
//! copy, so the standard constants can be refined in place:
//!
//! ```rust
//! use tokenwire::ChallengeError;
//!
//! let challenge = ChallengeError::BEARER_INVALID_TOKEN
//!     .with_realm(Some("api"))
//!     .with_description(Some("Token has expired"));
//!
//! assert_eq!(
//!     challenge.to_www_authenticate(),
//!     r#"Bearer realm="api", error="invalid_token", error_description="Token has expired""#
//! );
//! ```

mod algorithm;
mod www_authenticate;

pub use algorithm::JwsAlgorithm;

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use http::StatusCode;
use url::Url;

use crate::scheme::TokenScheme;
use crate::scope::{self, Scope};

/// Authentication scheme of a challenge
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChallengeScheme {
    /// RFC 6750 `Bearer`
    Bearer,
    /// RFC 9449 `DPoP`
    DPoP,
    /// Any other scheme, keeping the keyword as received
    Unknown(Cow<'static, str>),
}

impl ChallengeScheme {
    /// Header keyword for this scheme
    pub fn keyword(&self) -> &str {
        match self {
            Self::Bearer => "Bearer",
            Self::DPoP => "DPoP",
            Self::Unknown(keyword) => keyword,
        }
    }

    /// Challenge scheme answering a request for a token of `scheme`
    ///
    /// DPoP tokens are challenged with `DPoP`; every other scheme, including
    /// tokens whose scheme is unknown, falls back to the generic `Bearer`
    /// challenge.
    #[must_use]
    pub fn for_token(scheme: TokenScheme) -> Self {
        match scheme {
            TokenScheme::DPoP => Self::DPoP,
            _ => Self::Bearer,
        }
    }
}

impl fmt::Display for ChallengeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Standard error conditions per RFC 6750 Section 3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardError {
    /// No token was presented. Carries no error code.
    MissingToken,

    /// The request is missing a required parameter, includes an unsupported
    /// parameter or parameter value, repeats the same parameter, uses more
    /// than one method for including an access token, or is otherwise malformed.
    InvalidRequest,

    /// The access token provided is expired, revoked, malformed, or invalid
    /// for other reasons.
    InvalidToken,

    /// The request requires higher privileges than provided by the access token.
    InsufficientScope,
}

impl StandardError {
    /// Get the error code string per RFC 6750
    pub const fn code(self) -> Option<&'static str> {
        match self {
            Self::MissingToken => None,
            Self::InvalidRequest => Some("invalid_request"),
            Self::InvalidToken => Some("invalid_token"),
            Self::InsufficientScope => Some("insufficient_scope"),
        }
    }

    /// HTTP status code the error is returned with
    pub const fn status(self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::InsufficientScope => StatusCode::FORBIDDEN,
        }
    }
}

/// Token scheme error returned in a `WWW-Authenticate` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeError {
    scheme: ChallengeScheme,
    code: Option<Cow<'static, str>>,
    description: Option<Cow<'static, str>>,
    status: Option<StatusCode>,
    uri: Option<Url>,
    realm: Option<String>,
    scope: Option<Scope>,
    jws_algorithms: Option<BTreeSet<JwsAlgorithm>>,
}

impl ChallengeError {
    /// Bearer request without an access token (HTTP 401, no error code)
    pub const BEARER_MISSING_TOKEN: Self =
        Self::standard_const(ChallengeScheme::Bearer, StandardError::MissingToken);
    /// Malformed Bearer request (HTTP 400)
    pub const BEARER_INVALID_REQUEST: Self =
        Self::standard_const(ChallengeScheme::Bearer, StandardError::InvalidRequest);
    /// Invalid, expired or revoked Bearer token (HTTP 401)
    pub const BEARER_INVALID_TOKEN: Self =
        Self::standard_const(ChallengeScheme::Bearer, StandardError::InvalidToken);
    /// Bearer token lacks the required scope (HTTP 403)
    pub const BEARER_INSUFFICIENT_SCOPE: Self =
        Self::standard_const(ChallengeScheme::Bearer, StandardError::InsufficientScope);

    /// DPoP request without an access token (HTTP 401, no error code)
    pub const DPOP_MISSING_TOKEN: Self =
        Self::standard_const(ChallengeScheme::DPoP, StandardError::MissingToken);
    /// Malformed DPoP request (HTTP 400)
    pub const DPOP_INVALID_REQUEST: Self =
        Self::standard_const(ChallengeScheme::DPoP, StandardError::InvalidRequest);
    /// Invalid, expired or revoked DPoP token (HTTP 401)
    pub const DPOP_INVALID_TOKEN: Self =
        Self::standard_const(ChallengeScheme::DPoP, StandardError::InvalidToken);
    /// DPoP token lacks the required scope (HTTP 403)
    pub const DPOP_INSUFFICIENT_SCOPE: Self =
        Self::standard_const(ChallengeScheme::DPoP, StandardError::InsufficientScope);

    const fn standard_const(scheme: ChallengeScheme, kind: StandardError) -> Self {
        let code = match kind.code() {
            Some(code) => Some(Cow::Borrowed(code)),
            None => None,
        };
        Self {
            scheme,
            code,
            description: None,
            status: Some(kind.status()),
            uri: None,
            realm: None,
            scope: None,
            jws_algorithms: None,
        }
    }

    /// Create an empty challenge for `scheme`
    pub fn new(scheme: ChallengeScheme) -> Self {
        Self {
            scheme,
            code: None,
            description: None,
            status: None,
            uri: None,
            realm: None,
            scope: None,
            jws_algorithms: None,
        }
    }

    /// Standard error for the scheme a token was expected in
    #[must_use]
    pub fn standard(kind: StandardError, scheme: TokenScheme) -> Self {
        Self::standard_const(ChallengeScheme::for_token(scheme), kind)
    }

    /// Challenge scheme
    pub fn scheme(&self) -> &ChallengeScheme {
        &self.scheme
    }

    /// Error code (`invalid_token`, ...)
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable error description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// HTTP status code, if specified
    pub fn http_status_code(&self) -> Option<StatusCode> {
        self.status
    }

    /// URI of a page describing the error
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    /// Protection space
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Scope required to access the resource
    pub fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// JWS algorithms accepted for DPoP proofs
    pub fn jws_algorithms(&self) -> Option<&BTreeSet<JwsAlgorithm>> {
        self.jws_algorithms.as_ref()
    }

    /// Copy with a different error code
    ///
    /// # Panics
    /// Panics if `code` is empty or contains characters outside the RFC 6750
    /// range.
    #[must_use]
    pub fn with_code(&self, code: Option<&str>) -> Self {
        assert!(code != Some(""), "error code must not be empty");
        Self {
            code: code.map(|c| Cow::Owned(checked("error code", c))),
            ..self.clone()
        }
    }

    /// Copy with a different description
    ///
    /// # Panics
    /// Panics if `description` contains characters outside the RFC 6750 range.
    #[must_use]
    pub fn with_description(&self, description: Option<&str>) -> Self {
        Self {
            description: description.map(|d| Cow::Owned(checked("error description", d))),
            ..self.clone()
        }
    }

    /// Copy with a different HTTP status code
    #[must_use]
    pub fn with_http_status_code(&self, status: Option<StatusCode>) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy with a different error URI
    #[must_use]
    pub fn with_uri(&self, uri: Option<Url>) -> Self {
        Self {
            uri,
            ..self.clone()
        }
    }

    /// Copy with a different realm
    #[must_use]
    pub fn with_realm(&self, realm: Option<&str>) -> Self {
        Self {
            realm: realm.map(str::to_string),
            ..self.clone()
        }
    }

    /// Copy with a different required scope
    #[must_use]
    pub fn with_scope(&self, scope: Option<Scope>) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    /// Copy with a different set of accepted DPoP proof algorithms
    ///
    /// An empty iterator clears the set.
    ///
    /// # Panics
    /// Panics if this is not a DPoP challenge.
    #[must_use]
    pub fn with_jws_algorithms<I>(&self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = JwsAlgorithm>,
    {
        assert!(
            self.scheme == ChallengeScheme::DPoP,
            "JWS algorithms apply only to DPoP challenges, not {}",
            self.scheme
        );
        let algorithms: BTreeSet<_> = algorithms.into_iter().collect();
        Self {
            jws_algorithms: (!algorithms.is_empty()).then_some(algorithms),
            ..self.clone()
        }
    }

    /// HTTP status to respond with, defaulting to 401
    pub fn status_or_default(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::UNAUTHORIZED)
    }
}

fn checked(what: &str, value: &str) -> String {
    assert!(
        scope::is_legal(value),
        "{what} contains characters outside the RFC 6750 range: {value:?}"
    );
    value.to_string()
}

impl fmt::Display for ChallengeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => {
                write!(f, "{} {}: {}", self.scheme, code, description)
            }
            (Some(code), None) => write!(f, "{} {}", self.scheme, code),
            _ => write!(f, "{} authentication required", self.scheme),
        }
    }
}

impl std::error::Error for ChallengeError {}
