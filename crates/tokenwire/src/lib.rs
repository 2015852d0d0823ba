//! # tokenwire - OAuth 2.0 Access Tokens on the Wire
//!
//! Access-token value model and codecs for the four places an OAuth 2.0 token
//! (or the reason it was rejected) travels over HTTP:
//!
//! - `Authorization: Bearer <token>` / `Authorization: DPoP <token>` request headers
//! - JSON token responses (`access_token`, `token_type`, `expires_in`, ...)
//! - `access_token` query / form parameters
//! - `WWW-Authenticate` challenge headers (RFC 6750, RFC 9449)
//!
//! ## Architecture
//!
//! - [`value`] - Opaque token values, generated from the OS CSPRNG
//! - [`scope`] - Space-delimited scope values with RFC 6750 character rules
//! - [`scheme`] - Token schemes and their wire keywords
//! - [`token_type`] - RFC 8693 issued token type URIs
//! - [`token`] - The [`AccessToken`] value type and its serializers
//! - [`refresh`] - Refresh tokens and access/refresh token pairs
//! - [`codec`] - Parsing tokens out of JSON, headers, parameters and requests
//! - [`challenge`] - [`ChallengeError`] and the WWW-Authenticate codec
//! - [`config`] - Codec configuration
//! - [`error`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use tokenwire::{AccessToken, ChallengeError, Scope, TokenScheme, codec};
//!
//! // Server side: mint a token and put it in a token response
//! let token = AccessToken::generate(TokenScheme::Bearer)
//!     .with_lifetime(3600)
//!     .with_scope(Some(Scope::new(["read", "write"])));
//! let body = token.to_json();
//! assert_eq!(body["token_type"], "Bearer");
//!
//! // Resource server: read the token back from the Authorization header
//! let header = token.to_header();
//! let parsed = codec::parse_header(Some(&header), TokenScheme::Bearer).unwrap();
//! assert_eq!(parsed.value(), token.value());
//!
//! // A malformed header carries the challenge to send back
//! let err = codec::parse_header(Some("bearer abc"), TokenScheme::Bearer).unwrap_err();
//! assert_eq!(err.challenge().unwrap().code(), Some("invalid_request"));
//!
//! // Client side: understand why the server said no
//! let challenge = ChallengeError::parse_www_authenticate(
//!     r#"Bearer error="invalid_token", error_description="expired""#,
//!     TokenScheme::Bearer,
//! )
//! .unwrap();
//! assert_eq!(challenge.description(), Some("expired"));
//! ```
//!
//! ## Feature Flags
//!
//! - `jsonwebtoken` - Conversions between [`JwsAlgorithm`] and `jsonwebtoken::Algorithm`
//!
//! ## Standards Compliance
//!
//! - **RFC 6749** - OAuth 2.0 Authorization Framework (token responses)
//! - **RFC 6750** - Bearer Token Usage
//! - **RFC 8693** - OAuth 2.0 Token Exchange (`issued_token_type`, `N_A`)
//! - **RFC 9449** - Demonstrating Proof of Possession (DPoP)

pub mod challenge;
pub mod codec;
pub mod config;
pub mod error;
pub mod refresh;
pub mod scheme;
pub mod scope;
pub mod token;
pub mod token_type;
pub mod value;

#[doc(inline)]
pub use challenge::{ChallengeError, ChallengeScheme, JwsAlgorithm, StandardError};
#[doc(inline)]
pub use codec::{Params, TokenCodec};
#[doc(inline)]
pub use config::{CodecConfig, SchemeErrorPolicy};
#[doc(inline)]
pub use error::{ConfigError, InvalidScope, InvalidTokenType, ParseError};
#[doc(inline)]
pub use refresh::{RefreshToken, TokenPair};
#[doc(inline)]
pub use scheme::TokenScheme;
#[doc(inline)]
pub use scope::Scope;
#[doc(inline)]
pub use token::AccessToken;
#[doc(inline)]
pub use token_type::TokenTypeUri;
#[doc(inline)]
pub use value::TokenValue;

/// Result type for token and challenge parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Default number of random bytes in a generated token value (256 bits)
pub const DEFAULT_VALUE_BYTES: usize = 32;

/// Longest realm accepted when parsing a WWW-Authenticate header
pub const MAX_PARSED_REALM_LENGTH: usize = 256;
