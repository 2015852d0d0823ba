//! OAuth 2.0 scope values
//!
//! A scope is a set of space-delimited scope tokens (RFC 6749 Section 3.3).
//! Token characters are limited to the RFC 6750 Section 3 range so that a
//! scope can be placed inside a quoted WWW-Authenticate attribute without
//! escaping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InvalidScope;

/// Check a character against the RFC 6750 Section 3 range
///
/// Allowed: `%x20-21 / %x23-5B / %x5D-7E` (printable ASCII without `"` and `\`).
pub(crate) fn is_legal_char(c: char) -> bool {
    matches!(c, '\x20'..='\x21' | '\x23'..='\x5B' | '\x5D'..='\x7E')
}

/// Check that every character of `value` is in the RFC 6750 Section 3 range
pub fn is_legal(value: &str) -> bool {
    value.chars().all(is_legal_char)
}

/// Unordered collection of scope tokens
///
/// Tokens keep their insertion order for serialization, duplicates are
/// dropped, and equality ignores order.
#[derive(Debug, Clone, Default, Eq)]
pub struct Scope {
    values: Vec<String>,
}

impl Scope {
    /// Build a scope from known-good tokens
    ///
    /// # Panics
    /// Panics if a token is empty or contains a space, `"`, `\` or a
    /// non-printable character. Use [`Scope::parse`] for untrusted input.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scope = Self::default();
        for value in values {
            let value = value.into();
            if let Err(err) = check_token(&value) {
                panic!("{err}");
            }
            scope.insert(value);
        }
        scope
    }

    /// Parse a space-delimited scope string
    ///
    /// Tokens are separated by spaces (`0x20`); repeated, leading and trailing
    /// spaces are ignored. Other whitespace such as tabs is an illegal
    /// character.
    ///
    /// # Errors
    /// Returns [`InvalidScope`] if a token contains an illegal character.
    pub fn parse(value: &str) -> Result<Self, InvalidScope> {
        let mut scope = Self::default();
        for token in value.split(' ').filter(|t| !t.is_empty()) {
            check_token(token)?;
            scope.insert(token.to_string());
        }
        Ok(scope)
    }

    fn insert(&mut self, value: String) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Whether the scope contains `value`
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Whether every token of `other` is also in this scope
    pub fn contains_all(&self, other: &Scope) -> bool {
        other.values.iter().all(|v| self.contains(v))
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the scope has no tokens
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the tokens in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

fn check_token(token: &str) -> Result<(), InvalidScope> {
    if token.is_empty() {
        return Err(InvalidScope {
            token: token.to_string(),
            reason: "empty scope token",
        });
    }
    if token.contains(' ') || !is_legal(token) {
        return Err(InvalidScope {
            token: token.to_string(),
            reason: "illegal character",
        });
    }
    Ok(())
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.contains_all(other)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.join(" "))
    }
}

impl FromStr for Scope {
    type Err = InvalidScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a Scope {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
