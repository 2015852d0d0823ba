//! End-to-end wire scenarios
//!
//! Each test plays both sides of an exchange: a resource server or
//! authorization server producing wire data and a client consuming it.
//!
//! # Standards
//! - RFC 6750: Bearer Token Usage
//! - RFC 8693: OAuth 2.0 Token Exchange
//! - RFC 9449: DPoP

use std::collections::BTreeSet;

use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokenwire::{
    AccessToken, ChallengeError, ChallengeScheme, CodecConfig, JwsAlgorithm, Scope,
    SchemeErrorPolicy, TokenCodec, TokenPair, TokenScheme, TokenTypeUri, codec,
};

fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Test: A protected resource rejects a request without credentials
///
/// GIVEN a request with no Authorization header and no access_token parameter
/// WHEN the server scans it for a token
/// THEN the failure carries a 401 `Bearer` challenge with no error code
#[test]
fn test_missing_credentials_round_trip() {
    let codec = TokenCodec::new(CodecConfig::default().with_realm("example.com")).unwrap();

    let err = codec
        .parse_request(&HeaderMap::new(), &codec::parse_query("page=2"))
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    // Server builds the response
    let challenge = err.challenge().unwrap();
    let mut response_headers = HeaderMap::new();
    response_headers.insert(WWW_AUTHENTICATE, challenge.to_header_value().unwrap());
    assert_eq!(response_headers[WWW_AUTHENTICATE], "Bearer realm=\"example.com\"");

    // Client reads it back
    let seen = ChallengeError::parse_response(
        err.status().unwrap(),
        &response_headers,
        TokenScheme::Bearer,
    )
    .unwrap();
    assert_eq!(seen.realm(), Some("example.com"));
    assert_eq!(seen.code(), None);
    assert_eq!(seen.http_status_code(), Some(StatusCode::UNAUTHORIZED));
}

/// Test: Lower-case scheme keyword is rejected
#[test]
fn test_scheme_keyword_is_case_sensitive() {
    let err = codec::parse_header(Some("bearer xyz"), TokenScheme::Bearer).unwrap_err();
    assert_eq!(err.challenge(), Some(&ChallengeError::BEARER_INVALID_REQUEST));

    let token = codec::parse_header(Some("Bearer xyz"), TokenScheme::Bearer).unwrap();
    assert_eq!(token.value().as_str(), "xyz");
}

/// Test: Missing header produces the bare keyword challenge
#[test]
fn test_missing_header_challenge() {
    let err = codec::parse_header(None, TokenScheme::Bearer).unwrap_err();
    let challenge = err.challenge().unwrap();

    assert_eq!(challenge.http_status_code(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(challenge.code(), None);
    assert_eq!(challenge.to_www_authenticate(), "Bearer");
}

/// Test: Token type confusion between Bearer and DPoP
///
/// A DPoP-bound token presented as Bearer (or vice versa) must not be accepted
/// under the wrong scheme.
#[test]
fn test_token_type_confusion() {
    let dpop = AccessToken::generate(TokenScheme::DPoP);

    let err = codec::parse_header(Some(&dpop.to_header()), TokenScheme::Bearer).unwrap_err();
    assert_eq!(err.challenge().unwrap().code(), Some("invalid_request"));

    let bearer = AccessToken::generate(TokenScheme::Bearer);
    let err = codec::parse_header(Some(&bearer.to_header()), TokenScheme::DPoP).unwrap_err();
    assert_eq!(err.challenge(), Some(&ChallengeError::DPOP_INVALID_TOKEN));

    let uniform = TokenCodec::new(
        CodecConfig::default().with_scheme_errors(SchemeErrorPolicy::Uniform),
    )
    .unwrap();
    let err = uniform
        .parse_header(Some(&bearer.to_header()), TokenScheme::DPoP)
        .unwrap_err();
    assert_eq!(err.challenge(), Some(&ChallengeError::DPOP_INVALID_REQUEST));
}

/// Test: Servers disagree on the type of `expires_in`
#[test]
fn test_expires_in_number_or_string() {
    let numeric = object(json!({"access_token": "a", "token_type": "Bearer", "expires_in": 3600}));
    let string = object(json!({"access_token": "a", "token_type": "Bearer", "expires_in": "3600"}));

    let a = codec::parse_json_any(&numeric).unwrap();
    let b = codec::parse_json_any(&string).unwrap();
    assert_eq!(a.lifetime(), 3600);
    assert_eq!(a, b);
}

/// Test: Full token endpoint response with refresh token
#[test]
fn test_token_endpoint_response() {
    let body = r#"{
        "access_token": "2YotnFZFEjr1zCsicMWpAA",
        "token_type": "Bearer",
        "expires_in": 3600,
        "refresh_token": "tGzv3JOkF0XG5Qx2TlKWIA",
        "scope": "openid profile",
        "example_parameter": "example_value"
    }"#;

    let pair: TokenPair = serde_json::from_str(body).unwrap();
    let access = pair.access_token();

    assert_eq!(access.scheme(), TokenScheme::Bearer);
    assert_eq!(access.value().as_str(), "2YotnFZFEjr1zCsicMWpAA");
    assert_eq!(access.scope(), Some(&Scope::new(["profile", "openid"])));
    assert_eq!(
        pair.refresh_token().unwrap().value().as_str(),
        "tGzv3JOkF0XG5Qx2TlKWIA"
    );
    assert_eq!(
        pair.parameter_names(),
        BTreeSet::from(["access_token", "expires_in", "refresh_token", "scope", "token_type"])
    );
}

/// Test: Token exchange response with an `N_A` token
#[test]
fn test_token_exchange_response() {
    let response = object(json!({
        "access_token": "eyJhbGciOiJFUzI1NiJ9.e30.sig",
        "issued_token_type": "urn:ietf:params:oauth:token-type:id_token",
        "token_type": "N_A",
        "expires_in": 60
    }));

    // The generic dispatcher only routes usable access tokens
    assert!(codec::parse_json_any(&response).is_err());

    let token = codec::parse_json(&response, TokenScheme::NotApplicable).unwrap();
    assert_eq!(token.issued_token_type(), Some(&TokenTypeUri::IdToken));
    assert_eq!(
        Value::Object(token.to_json()),
        Value::Object(response.clone())
    );
}

/// Test: Third-party challenge with attributes in unusual order
#[test]
fn test_tolerant_challenge_parsing() {
    let header = r#"Bearer error="invalid_token", error_description="expired", realm="example.com""#;
    let challenge = ChallengeError::parse_www_authenticate(header, TokenScheme::Bearer).unwrap();

    assert_eq!(challenge.code(), Some("invalid_token"));
    assert_eq!(challenge.description(), Some("expired"));
    assert_eq!(challenge.realm(), Some("example.com"));

    // Re-serialized in canonical order, same attributes
    let reserialized = challenge.to_www_authenticate();
    assert_eq!(
        reserialized,
        r#"Bearer realm="example.com", error="invalid_token", error_description="expired""#
    );
    let again = ChallengeError::parse_www_authenticate(&reserialized, TokenScheme::Bearer).unwrap();
    assert_eq!(again, challenge);
}

/// Test: Hostile challenge content never aborts parsing
#[test]
fn test_hostile_challenge_content() {
    let oversized = "x".repeat(10_000);
    let headers = [
        format!("Bearer realm=\"{oversized}\""),
        "Bearer error=\"\u{0}\u{1}\", error_description=\"\u{7f}\"".to_string(),
        "Bearer ,,,,=====\"\"\"\\\\".to_string(),
        "Bearer error=invalid_token error=invalid_request".to_string(),
        "Bearer scope=\"a\\\"b\"".to_string(),
    ];

    for header in &headers {
        let challenge = ChallengeError::parse_www_authenticate(header, TokenScheme::Bearer).unwrap();
        assert_eq!(challenge.scheme(), &ChallengeScheme::Bearer);
    }

    let first_wins =
        ChallengeError::parse_www_authenticate(&headers[3], TokenScheme::Bearer).unwrap();
    assert_eq!(first_wins.code(), Some("invalid_token"));
}

/// Test: A realm chosen by the server cannot rewrite the error code
///
/// GIVEN a realm whose text looks like an `error` attribute
/// WHEN the challenge is serialized and read back by a client
/// THEN the client sees the real error code and the realm unchanged
#[test]
fn test_realm_text_cannot_forge_error() {
    let challenge = ChallengeError::BEARER_INVALID_TOKEN.with_realm(Some("api error=forged"));
    let header = challenge.to_www_authenticate();
    assert_eq!(header, r#"Bearer realm="api error=forged", error="invalid_token""#);

    let seen = ChallengeError::parse_www_authenticate(&header, TokenScheme::Bearer).unwrap();
    assert_eq!(seen.code(), Some("invalid_token"));
    assert_eq!(seen.realm(), Some("api error=forged"));
}

/// Test: Illegal scope characters are a construction error
#[test]
fn test_illegal_scope_rejected() {
    assert!(Scope::parse("read\"write").is_err());
    let scope = Scope::parse("read write").unwrap();

    let challenge = ChallengeError::BEARER_INSUFFICIENT_SCOPE.with_scope(Some(scope));
    assert_eq!(
        challenge.to_www_authenticate(),
        r#"Bearer error="insufficient_scope", scope="read write""#
    );
}

#[test]
#[should_panic(expected = "illegal character")]
fn test_illegal_scope_construction_panics() {
    let _ = ChallengeError::BEARER_INSUFFICIENT_SCOPE.with_scope(Some(Scope::new(["read\"write"])));
}

/// Test: DPoP server advertises accepted proof algorithms
#[test]
fn test_dpop_algs_round_trip() {
    let challenge = ChallengeError::DPOP_INVALID_TOKEN
        .with_description(Some("Proof algorithm not accepted"))
        .with_jws_algorithms([JwsAlgorithm::PS256, JwsAlgorithm::ES256]);

    let header = challenge.to_www_authenticate();
    let parsed = ChallengeError::parse_any(&header).unwrap();

    assert_eq!(parsed.scheme(), &ChallengeScheme::DPoP);
    assert_eq!(
        parsed.jws_algorithms(),
        Some(&BTreeSet::from([JwsAlgorithm::ES256, JwsAlgorithm::PS256]))
    );
}

/// Test: Header wins over query parameters when scanning a request
#[test]
fn test_request_scan_prefers_header() {
    let token = AccessToken::generate(TokenScheme::Bearer);

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&token.to_header()).unwrap(),
    );
    let params = codec::parse_query("access_token=other");

    assert_eq!(codec::parse_request(&headers, &params).unwrap(), token);

    let from_query = codec::parse_request(&HeaderMap::new(), &params).unwrap();
    assert_eq!(from_query.scheme(), TokenScheme::Unknown);
    assert_eq!(from_query.value().as_str(), "other");
}
