//! Opaque token values
//!
//! A [`TokenValue`] is the secret string carried by an access or refresh token.
//! Values are either supplied (parsed off the wire) or generated from the
//! operating system's CSPRNG and base64url-encoded without padding.

use std::fmt;
use std::hash::{Hash, Hasher};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::DEFAULT_VALUE_BYTES;

/// Non-empty opaque token value
///
/// Comparison is constant-time so that matching a presented token against a
/// stored one does not leak how many leading bytes were correct. `Debug`
/// output is redacted.
#[derive(Clone)]
pub struct TokenValue(String);

impl TokenValue {
    /// Wrap an existing token value
    ///
    /// # Panics
    /// Panics if `value` is empty.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        assert!(!value.is_empty(), "token value must not be empty");
        Self(value)
    }

    /// Generate a random 256-bit value
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with_len(DEFAULT_VALUE_BYTES)
    }

    /// Generate a random value from `byte_len` bytes of OS randomness
    ///
    /// The returned string is the base64url (unpadded) encoding of those bytes.
    ///
    /// # Panics
    /// Panics if `byte_len` is less than 2.
    #[must_use]
    pub fn generate_with_len(byte_len: usize) -> Self {
        assert!(
            byte_len > 1,
            "generated token values need more than 1 byte, got {byte_len}"
        );

        let mut bytes = vec![0u8; byte_len];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(&bytes))
    }

    /// Get the raw value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the raw value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PartialEq for TokenValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for TokenValue {}

impl Hash for TokenValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

// Manual Debug impl to prevent token exposure in logs
impl fmt::Debug for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenValue").field(&"[REDACTED]").finish()
    }
}

impl AsRef<str> for TokenValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TokenValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_value_length() {
        // 32 bytes -> 43 base64url characters without padding
        let value = TokenValue::generate();
        assert_eq!(value.as_str().len(), 43);
        assert!(
            value
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generated_values_differ() {
        let a = TokenValue::generate();
        let b = TokenValue::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_custom_byte_length() {
        assert_eq!(TokenValue::generate_with_len(2).as_str().len(), 3);
        assert_eq!(TokenValue::generate_with_len(64).as_str().len(), 86);
    }

    #[test]
    #[should_panic(expected = "more than 1 byte")]
    fn test_single_byte_rejected() {
        let _ = TokenValue::generate_with_len(1);
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn test_empty_value_rejected() {
        let _ = TokenValue::new("");
    }

    #[test]
    fn test_debug_is_redacted() {
        let value = TokenValue::new("super-secret");
        let debug = format!("{value:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_equality() {
        assert_eq!(TokenValue::new("abc"), TokenValue::from("abc"));
        assert_ne!(TokenValue::new("abc"), TokenValue::new("abd"));
        assert_ne!(TokenValue::new("abc"), TokenValue::new("abcd"));
    }
}
