//! Access token schemes
//!
//! Scheme-specific wire behaviour (the Authorization keyword, the JSON
//! `token_type` value) is resolved through [`SchemeInfo`] rather than per-type
//! dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access token scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenScheme {
    /// RFC 6750 bearer token
    #[serde(rename = "Bearer")]
    Bearer,

    /// RFC 9449 DPoP-bound token
    #[serde(rename = "DPoP")]
    DPoP,

    /// RFC 8693 `N_A` token: issued by token exchange, not usable as an access token
    #[serde(rename = "N_A")]
    NotApplicable,

    /// Scheme could not be determined (e.g. token found in query parameters)
    #[serde(rename = "unknown")]
    Unknown,
}

/// Wire keywords for a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeInfo {
    /// Keyword in `Authorization` / `WWW-Authenticate` headers
    pub header_keyword: Option<&'static str>,
    /// Value of `token_type` in JSON token responses
    pub token_type: Option<&'static str>,
}

const BEARER_INFO: SchemeInfo = SchemeInfo {
    header_keyword: Some("Bearer"),
    token_type: Some("Bearer"),
};

const DPOP_INFO: SchemeInfo = SchemeInfo {
    header_keyword: Some("DPoP"),
    token_type: Some("DPoP"),
};

const NA_INFO: SchemeInfo = SchemeInfo {
    header_keyword: None,
    token_type: Some("N_A"),
};

const UNKNOWN_INFO: SchemeInfo = SchemeInfo {
    header_keyword: None,
    token_type: None,
};

impl TokenScheme {
    /// Wire keyword table for this scheme
    #[must_use]
    pub fn info(self) -> &'static SchemeInfo {
        match self {
            Self::Bearer => &BEARER_INFO,
            Self::DPoP => &DPOP_INFO,
            Self::NotApplicable => &NA_INFO,
            Self::Unknown => &UNKNOWN_INFO,
        }
    }

    /// Keyword used in `Authorization` and `WWW-Authenticate` headers
    #[must_use]
    pub fn header_keyword(self) -> Option<&'static str> {
        self.info().header_keyword
    }

    /// `token_type` value in JSON token responses
    #[must_use]
    pub fn token_type(self) -> Option<&'static str> {
        self.info().token_type
    }

    /// Whether tokens of this scheme can be written to the wire at all
    #[must_use]
    pub fn is_serializable(self) -> bool {
        self.token_type().is_some()
    }

    /// Look up the scheme for an exact JSON `token_type` value
    #[must_use]
    pub fn from_token_type(token_type: &str) -> Option<Self> {
        [Self::Bearer, Self::DPoP, Self::NotApplicable]
            .into_iter()
            .find(|s| s.token_type() == Some(token_type))
    }

    /// Short name used in logs and messages
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::DPoP => "DPoP",
            Self::NotApplicable => "N_A",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TokenScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
