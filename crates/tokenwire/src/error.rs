//! Error types for token and challenge handling
//!
//! Untrusted wire input fails with [`ParseError`]. Token parse failures carry the
//! standard [`ChallengeError`] a resource server should answer with, so an HTTP
//! layer can turn the error straight into a 400/401 response.

use std::borrow::Cow;

use http::StatusCode;
use thiserror::Error;

use crate::challenge::ChallengeError;

/// Failure to decode a token or a WWW-Authenticate challenge
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    /// Malformed or missing access token (JSON, header or parameters)
    #[error("{message}")]
    Token {
        /// What was wrong with the input
        message: Cow<'static, str>,
        /// The challenge to return to the client
        challenge: Box<ChallengeError>,
    },

    /// WWW-Authenticate value does not use the expected scheme
    #[error("{message}")]
    Challenge {
        /// What was wrong with the input
        message: Cow<'static, str>,
    },
}

impl ParseError {
    pub(crate) fn invalid_token(message: impl Into<Cow<'static, str>>, challenge: ChallengeError) -> Self {
        Self::Token {
            message: message.into(),
            challenge: Box::new(challenge),
        }
    }

    pub(crate) fn wrong_scheme(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Challenge {
            message: message.into(),
        }
    }

    /// Human-readable failure reason
    pub fn message(&self) -> &str {
        match self {
            Self::Token { message, .. } | Self::Challenge { message } => message,
        }
    }

    /// The challenge a resource server should send for this failure
    pub fn challenge(&self) -> Option<&ChallengeError> {
        match self {
            Self::Token { challenge, .. } => Some(challenge.as_ref()),
            Self::Challenge { .. } => None,
        }
    }

    /// HTTP status code of the carried challenge
    pub fn status(&self) -> Option<StatusCode> {
        self.challenge().and_then(ChallengeError::http_status_code)
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::Challenge { .. } => "challenge",
        }
    }
}

/// Scope string containing an empty or illegal scope token
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid scope token {token:?}: {reason}")]
pub struct InvalidScope {
    /// The offending scope token
    pub token: String,
    /// Why it was rejected
    pub reason: &'static str,
}

/// Token type that is not a URI reference
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid token type URI {value:?}: {reason}")]
pub struct InvalidTokenType {
    /// The rejected value
    pub value: String,
    /// Why it was rejected
    pub reason: Cow<'static, str>,
}

/// Invalid codec configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Generated token values need at least two random bytes
    #[error("Token value length must be greater than 1 byte, got {0}")]
    InvalidValueLength(usize),

    /// Configured realm cannot appear in a WWW-Authenticate header
    #[error("Realm contains characters not allowed in an HTTP header: {0:?}")]
    InvalidRealm(String),
}
