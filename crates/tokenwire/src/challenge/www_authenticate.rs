//! WWW-Authenticate header encoding
//!
//! Parsing is attribute-at-a-time: each attribute is found by its own bounded
//! regular expression over the whole header value, so attributes may come in
//! any order and unrelated text is ignored. Matches that start inside a quoted
//! string belong to another attribute's value and are skipped. Only a scheme
//! keyword mismatch is fatal; malformed attributes are dropped.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Range;

use http::header::{InvalidHeaderValue, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderValue, StatusCode};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace};
use url::Url;

use super::{ChallengeError, ChallengeScheme, JwsAlgorithm};
use crate::error::ParseError;
use crate::scheme::TokenScheme;
use crate::scope::{self, Scope};

// Realm content is bounded to keep worst-case matching cost linear in a small constant
static REALM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brealm="((?:[^"\\]|\\.){0,256})""#).expect("Invalid realm regex")
});

static ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\berror=(?:"([^"]*)"|([\w\-]+))"#).expect("Invalid error regex")
});

static ERROR_DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\berror_description="([^"]*)""#).expect("Invalid error_description regex")
});

static ERROR_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\berror_uri="([^"]*)""#).expect("Invalid error_uri regex"));

static SCOPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bscope="([^"]*)""#).expect("Invalid scope regex"));

static ALGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\balgs="([^"]*)""#).expect("Invalid algs regex"));

impl ChallengeError {
    /// Render the `WWW-Authenticate` header value
    ///
    /// Attributes are emitted in a fixed order (`realm`, `error`,
    /// `error_description`, `error_uri`, `scope`, `algs`) and absent ones are
    /// skipped. `error_description` and `error_uri` only appear together with
    /// `error`.
    pub fn to_www_authenticate(&self) -> String {
        let mut attributes: Vec<String> = Vec::new();

        if let Some(realm) = &self.realm {
            attributes.push(format!("realm=\"{}\"", escape(realm)));
        }

        if let Some(code) = &self.code {
            attributes.push(format!("error=\"{code}\""));

            if let Some(description) = &self.description {
                attributes.push(format!("error_description=\"{description}\""));
            }
            if let Some(uri) = &self.uri {
                attributes.push(format!("error_uri=\"{}\"", escape(uri.as_str())));
            }
        }

        if let Some(scope) = &self.scope {
            attributes.push(format!("scope=\"{scope}\""));
        }

        if self.scheme == ChallengeScheme::DPoP
            && let Some(algorithms) = &self.jws_algorithms
        {
            let names: Vec<&str> = algorithms.iter().map(JwsAlgorithm::as_str).collect();
            attributes.push(format!("algs=\"{}\"", names.join(" ")));
        }

        let keyword = self.scheme.keyword();
        if attributes.is_empty() {
            keyword.to_string()
        } else {
            format!("{keyword} {}", attributes.join(", "))
        }
    }

    /// Render the `WWW-Authenticate` header as an [`HeaderValue`]
    ///
    /// # Errors
    /// Fails if the realm or an unknown scheme keyword contains bytes not
    /// allowed in an HTTP header.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_www_authenticate())
    }

    /// Parse a `WWW-Authenticate` value for an expected scheme
    ///
    /// The value must start with the scheme keyword (case-insensitive).
    /// Attributes that are missing or malformed are left unset.
    ///
    /// # Errors
    /// Returns [`ParseError::Challenge`] if the value does not start with the
    /// keyword of `scheme`, or if `scheme` has no challenge keyword.
    pub fn parse_www_authenticate(value: &str, scheme: TokenScheme) -> crate::Result<Self> {
        let challenge_scheme = match scheme {
            TokenScheme::Bearer => ChallengeScheme::Bearer,
            TokenScheme::DPoP => ChallengeScheme::DPoP,
            other => {
                return Err(ParseError::wrong_scheme(format!(
                    "{other} tokens have no WWW-Authenticate scheme"
                )));
            }
        };

        if !starts_with_keyword(value, challenge_scheme.keyword()) {
            debug!(expected = %challenge_scheme, "WWW-Authenticate scheme mismatch");
            return Err(ParseError::wrong_scheme(format!(
                "WWW-Authenticate scheme must be {challenge_scheme}"
            )));
        }

        Ok(extract(value, challenge_scheme))
    }

    /// Parse a `WWW-Authenticate` value of any scheme
    ///
    /// `Bearer` and `DPoP` (in any letter case) are recognised; any other
    /// keyword yields a [`ChallengeScheme::Unknown`] challenge with the
    /// generic attributes extracted.
    ///
    /// # Errors
    /// Returns [`ParseError::Challenge`] if the value is blank.
    pub fn parse_any(value: &str) -> crate::Result<Self> {
        let Some(keyword) = value.split_whitespace().next() else {
            return Err(ParseError::wrong_scheme("WWW-Authenticate value is blank"));
        };

        // Tolerate attributes glued to the keyword with a comma
        let keyword = keyword.split(',').next().unwrap_or(keyword);

        let scheme = if keyword.eq_ignore_ascii_case("Bearer") {
            ChallengeScheme::Bearer
        } else if keyword.eq_ignore_ascii_case("DPoP") {
            ChallengeScheme::DPoP
        } else {
            ChallengeScheme::Unknown(Cow::Owned(keyword.to_string()))
        };

        Ok(extract(value, scheme))
    }

    /// Parse the challenge of an HTTP error response
    ///
    /// Looks through every `WWW-Authenticate` header for the first one using
    /// the expected scheme and records `status` on the result.
    ///
    /// # Errors
    /// Returns [`ParseError::Challenge`] if no `WWW-Authenticate` header uses
    /// the scheme.
    pub fn parse_response(
        status: StatusCode,
        headers: &HeaderMap,
        scheme: TokenScheme,
    ) -> crate::Result<Self> {
        let keyword = scheme.header_keyword().unwrap_or(scheme.as_str());

        headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| starts_with_keyword(v, keyword))
            .ok_or_else(|| {
                ParseError::wrong_scheme(format!("No {keyword} WWW-Authenticate challenge in response"))
            })
            .and_then(|v| Self::parse_www_authenticate(v, scheme))
            .map(|challenge| challenge.with_http_status_code(Some(status)))
    }
}

fn starts_with_keyword(value: &str, keyword: &str) -> bool {
    value
        .get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

/// Byte ranges of quoted strings, quotes included
///
/// A backslash escapes the next character. An unterminated string runs to the
/// end of the value.
fn quoted_spans(value: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut escaped = false;

    for (i, b) in value.bytes().enumerate() {
        match open {
            None if b == b'"' => open = Some(i),
            None => {}
            Some(_) if escaped => escaped = false,
            Some(_) if b == b'\\' => escaped = true,
            Some(start) if b == b'"' => {
                spans.push(start..i + 1);
                open = None;
            }
            Some(_) => {}
        }
    }
    if let Some(start) = open {
        spans.push(start..value.len());
    }
    spans
}

/// First match of `attribute` that does not start inside a quoted string
fn find<'h>(attribute: &Regex, value: &'h str, quoted: &[Range<usize>]) -> Option<Captures<'h>> {
    let mut from = 0;
    while let Some(captures) = attribute.captures_at(value, from) {
        let start = captures.get(0)?.start();
        match quoted.iter().find(|span| span.contains(&start)) {
            Some(span) => {
                trace!("Skipping attribute lookalike inside a quoted string");
                from = span.end;
            }
            None => return Some(captures),
        }
    }
    None
}

fn extract(value: &str, scheme: ChallengeScheme) -> ChallengeError {
    let mut challenge = ChallengeError::new(scheme);
    let quoted = quoted_spans(value);

    challenge.realm = find(&REALM, value, &quoted).map(|c| unescape(&c[1]));

    challenge.code = find(&ERROR, value, &quoted)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str())
        .filter(|code| {
            let legal = !code.is_empty() && scope::is_legal(code);
            if !legal {
                trace!("Dropping illegal error code");
            }
            legal
        })
        .map(|code| Cow::Owned(code.to_string()));

    if challenge.code.is_some() {
        challenge.description = find(&ERROR_DESCRIPTION, value, &quoted)
            .map(|c| c[1].to_string())
            .filter(|description| {
                let legal = scope::is_legal(description);
                if !legal {
                    trace!("Dropping illegal error description");
                }
                legal
            })
            .map(Cow::Owned);

        challenge.uri = find(&ERROR_URI, value, &quoted)
            .and_then(|c| match Url::parse(&c[1]) {
                Ok(uri) => Some(uri),
                Err(e) => {
                    trace!(error = %e, "Dropping unparsable error_uri");
                    None
                }
            });
    }

    challenge.scope = find(&SCOPE, value, &quoted)
        .and_then(|c| match Scope::parse(&c[1]) {
            Ok(scope) => Some(scope),
            Err(e) => {
                trace!(error = %e, "Dropping illegal scope");
                None
            }
        });

    if challenge.scheme == ChallengeScheme::DPoP {
        challenge.jws_algorithms = find(&ALGS, value, &quoted).and_then(|c| {
            let algorithms: BTreeSet<JwsAlgorithm> = c[1]
                .split_whitespace()
                .filter_map(JwsAlgorithm::parse)
                .collect();
            (!algorithms.is_empty()).then_some(algorithms)
        });
    }

    challenge
}

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['"', '\\']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

// Only `\"` and `\\` are escapes; any other backslash is kept as written
fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && matches!(next, '"' | '\\')
        {
            chars.next();
            unescaped.push(next);
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}
