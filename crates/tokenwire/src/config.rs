//! Codec configuration
//!
//! [`CodecConfig`] is plain data so it can be embedded in an application's own
//! configuration file. Every field has a default; call
//! [`CodecConfig::validate`] (or build a [`TokenCodec`](crate::TokenCodec),
//! which does) before use.

use http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::DEFAULT_VALUE_BYTES;
use crate::error::ConfigError;

/// Which challenge DPoP header failures produce
///
/// Bearer rejects a wrong keyword or a blank value with `invalid_request`.
/// DPoP historically answers the same two cases with `invalid_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeErrorPolicy {
    /// DPoP answers a wrong keyword or blank value with `invalid_token`
    #[default]
    Legacy,
    /// Both schemes answer with `invalid_request`
    Uniform,
}

/// Token codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Realm attached to every challenge produced by a failed parse
    pub realm: Option<String>,
    /// Random bytes in generated token values
    pub value_bytes: usize,
    /// Challenge selection for DPoP header failures
    pub scheme_errors: SchemeErrorPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            realm: None,
            value_bytes: DEFAULT_VALUE_BYTES,
            scheme_errors: SchemeErrorPolicy::default(),
        }
    }
}

impl CodecConfig {
    /// Set the realm
    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Set the generated value length in bytes
    #[must_use]
    pub fn with_value_bytes(mut self, value_bytes: usize) -> Self {
        self.value_bytes = value_bytes;
        self
    }

    /// Set the DPoP header failure policy
    #[must_use]
    pub fn with_scheme_errors(mut self, policy: SchemeErrorPolicy) -> Self {
        self.scheme_errors = policy;
        self
    }

    /// Check the configuration
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `value_bytes` is less than 2 or the realm
    /// cannot be placed in an HTTP header.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.value_bytes <= 1 {
            return Err(ConfigError::InvalidValueLength(self.value_bytes));
        }

        if let Some(realm) = &self.realm
            && HeaderValue::from_str(realm).is_err()
        {
            return Err(ConfigError::InvalidRealm(realm.clone()));
        }

        Ok(())
    }
}
