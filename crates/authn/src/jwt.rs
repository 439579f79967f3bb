//! Token structure, claim set, and expiry validation.
//!
//! This module provides the structural half of verification: stripping the
//! `Bearer` scheme, decoding the three dot-separated base64url segments, and
//! checking the expiration claim. Cryptographic signature verification lives
//! in [`verify_signature`], which the [`TokenVerifier`](crate::TokenVerifier)
//! drives after the structural gates pass.
//!
//! # Example
//!
//! ```no_run
//! // Requires a raw `Authorization` header value.
//! use idgate_authn::jwt::{parse_token, strip_bearer_scheme};
//!
//! # fn example(header_value: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let token = strip_bearer_scheme(header_value);
//! let parsed = parse_token(token)?;
//!
//! println!("Algorithm: {}", parsed.header.alg);
//! println!("Claims: {}", parsed.claims.len());
//! # Ok(())
//! # }
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// Name of the expiration timestamp claim.
pub const EXPIRATION_CLAIM: &str = "exp";

/// The full claim set of a token, claim name → claim value.
///
/// Claims are returned to callers unfiltered: every claim present in the
/// token payload is preserved, whatever its name or type. Typed accessors
/// exist only for the claims the verifier itself inspects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Returns the value of the named claim, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `true` if the named claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the expiration timestamp (seconds since epoch), if the `exp`
    /// claim is present and numeric.
    #[must_use]
    pub fn expiration(&self) -> Option<i64> {
        self.get(EXPIRATION_CLAIM).and_then(claim_timestamp)
    }

    /// Returns the number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the claim set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Consumes the claim set, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Decoded token header.
///
/// The algorithm is kept as a plain string so that unknown or forbidden
/// values (`none`, the HMAC family) reach
/// [`validate_algorithm`](crate::validate_algorithm) instead of failing
/// earlier as a deserialization error.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TokenHeader {
    /// Declared signing algorithm, e.g. `"RS256"`.
    pub alg: String,
    /// Token type, usually `"JWT"`.
    #[serde(default)]
    pub typ: Option<String>,
    /// Key identifier, if the issuer sets one.
    #[serde(default)]
    pub kid: Option<String>,
}

/// A structurally decoded token, prior to cryptographic verification.
///
/// Transient: the verifier discards it once the signature and expiry gates
/// have run.
#[derive(Clone, Debug)]
pub struct ParsedToken {
    /// Decoded header segment.
    pub header: TokenHeader,
    /// Decoded payload segment.
    pub claims: ClaimSet,
    /// Decoded signature bytes.
    pub signature: Vec<u8>,
}

/// Strips the `Bearer` scheme marker from a raw credential.
///
/// The scheme token is case-sensitive and must be followed by exactly one
/// whitespace character; both are removed. Any other shape is returned
/// unchanged and treated as the token body in full.
#[must_use]
pub fn strip_bearer_scheme(raw_credential: &str) -> &str {
    match raw_credential.strip_prefix("Bearer") {
        Some(rest) => match rest.strip_prefix(|c: char| c.is_whitespace()) {
            Some(body) => body,
            None => raw_credential,
        },
        None => raw_credential,
    }
}

/// Structurally decodes a token into header, claims, and signature bytes.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] if:
/// - The token is empty
/// - The token does not have exactly 3 dot-separated segments
/// - Any segment is not unpadded base64url
/// - The header or payload is not valid JSON
pub fn parse_token(token: &str) -> Result<ParsedToken, AuthError> {
    if token.is_empty() {
        return Err(AuthError::malformed_token("credential is empty"));
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::malformed_token(format!(
            "token must have 3 dot-separated segments, found {}",
            parts.len()
        )));
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(parts[0])
        .map_err(|e| AuthError::malformed_token(format!("failed to decode header segment: {e}")))?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|e| {
        AuthError::malformed_token(format!("failed to decode payload segment: {e}"))
    })?;
    let signature = URL_SAFE_NO_PAD.decode(parts[2]).map_err(|e| {
        AuthError::malformed_token(format!("failed to decode signature segment: {e}"))
    })?;

    let header: TokenHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| AuthError::malformed_token(format!("failed to parse token header: {e}")))?;
    let claims: ClaimSet = serde_json::from_slice(&payload_bytes)
        .map_err(|e| AuthError::malformed_token(format!("failed to parse token claims: {e}")))?;

    Ok(ParsedToken { header, claims, signature })
}

/// Verifies the RSA-SHA256 signature over `header.payload` and returns the
/// decoded claim set.
///
/// Expiry is not checked here. It is a separate gate with its own error
/// kind, see [`validate_expiry`].
///
/// # Errors
///
/// Returns [`AuthError::InvalidSignature`] if the signature does not verify
/// under `key`, or the mapped error for any other library failure.
pub fn verify_signature(token: &str, key: &DecodingKey) -> Result<ClaimSet, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = jsonwebtoken::decode::<ClaimSet>(token, key, &validation)?;

    Ok(token_data.claims)
}

/// Checks the expiration claim against the current UTC wall clock.
///
/// A missing `exp` claim is accepted as not expired: the token is treated
/// as long-lived. Callers wanting a stricter policy can require
/// [`ClaimSet::expiration`] themselves.
///
/// # Errors
///
/// Returns [`AuthError::Expired`] if the current time is at or past the
/// expiration timestamp, or [`AuthError::MalformedToken`] if `exp` is
/// present but not numeric.
pub fn validate_expiry(claims: &ClaimSet) -> Result<(), AuthError> {
    validate_expiry_at(claims, Utc::now().timestamp())
}

/// Deterministic variant of [`validate_expiry`] taking an explicit clock
/// reading (seconds since epoch).
pub fn validate_expiry_at(claims: &ClaimSet, now: i64) -> Result<(), AuthError> {
    let Some(value) = claims.get(EXPIRATION_CLAIM) else {
        return Ok(());
    };

    let exp = claim_timestamp(value).ok_or_else(|| {
        AuthError::malformed_token("exp claim is not a numeric timestamp")
    })?;

    if exp <= now {
        return Err(AuthError::expired(format!("token expired at {exp} (now {now})")));
    }

    Ok(())
}

/// Reads a claim value as a unix timestamp. Integral and fractional JSON
/// numbers are accepted; anything else is `None`.
fn claim_timestamp(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn claims_from_json(value: Value) -> ClaimSet {
        serde_json::from_value(value).expect("claims json")
    }

    #[rstest]
    #[case::plain_scheme("Bearer abc.def.ghi", "abc.def.ghi")]
    #[case::tab_separator("Bearer\tabc.def.ghi", "abc.def.ghi")]
    #[case::no_scheme("abc.def.ghi", "abc.def.ghi")]
    #[case::lowercase_scheme_kept("bearer abc.def.ghi", "bearer abc.def.ghi")]
    #[case::no_separator_kept("Bearerabc.def.ghi", "Bearerabc.def.ghi")]
    #[case::empty_body("Bearer ", "")]
    #[case::second_space_is_body("Bearer  abc", " abc")]
    fn test_strip_bearer_scheme(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_bearer_scheme(raw), expected);
    }

    #[test]
    fn test_parse_token_round_trip() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_id":42,"exp":1893456000}"#);
        let signature = URL_SAFE_NO_PAD.encode(b"not-a-real-signature");
        let token = format!("{header}.{payload}.{signature}");

        let parsed = parse_token(&token).expect("parse");
        assert_eq!(parsed.header.alg, "RS256");
        assert_eq!(parsed.header.typ.as_deref(), Some("JWT"));
        assert_eq!(parsed.claims.get("user_id"), Some(&json!(42)));
        assert_eq!(parsed.signature, b"not-a-real-signature");
    }

    #[test]
    fn test_parse_token_empty() {
        let result = parse_token("");
        assert!(
            matches!(&result, Err(AuthError::MalformedToken { message }) if message.contains("empty")),
            "expected MalformedToken for empty input, got: {result:?}"
        );
    }

    #[rstest]
    #[case::one_segment("onlyonesegment")]
    #[case::two_segments("only.two")]
    #[case::four_segments("too.many.parts.here")]
    fn test_parse_token_wrong_segment_count(#[case] token: &str) {
        let result = parse_token(token);
        assert!(
            matches!(&result, Err(AuthError::MalformedToken { message }) if message.contains("3 dot-separated segments")),
            "expected segment-count error for {token:?}, got: {result:?}"
        );
    }

    #[test]
    fn test_parse_token_invalid_base64_attaches_detail() {
        let result = parse_token("!!!.!!!.!!!");
        match result {
            Err(AuthError::MalformedToken { message }) => {
                assert!(message.contains("header segment"), "unexpected detail: {message}");
            },
            other => panic!("expected MalformedToken, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_token_invalid_payload_json() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(b"not-json");
        let token = format!("{header}.{payload}.sig-is-checked-later");

        let result = parse_token(&token);
        assert!(
            matches!(&result, Err(AuthError::MalformedToken { message }) if message.contains("claims")),
            "expected claims-parse failure, got: {result:?}"
        );
    }

    #[test]
    fn test_parse_token_header_without_alg_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"user_id":42}"#);
        let token = format!("{header}.{payload}.");

        let result = parse_token(&token);
        assert!(
            matches!(&result, Err(AuthError::MalformedToken { message }) if message.contains("header")),
            "header missing alg must be malformed, got: {result:?}"
        );
    }

    #[test]
    fn test_claim_set_accessors() {
        let claims = claims_from_json(json!({
            "user_id": 42,
            "name": "vendor-a",
            "exp": 1893456000,
        }));

        assert_eq!(claims.len(), 3);
        assert!(!claims.is_empty());
        assert!(claims.contains("user_id"));
        assert!(!claims.contains("missing"));
        assert_eq!(claims.expiration(), Some(1893456000));
        assert_eq!(claims.iter().count(), 3);
    }

    #[test]
    fn test_claim_set_expiration_absent() {
        let claims = claims_from_json(json!({"user_id": 42}));
        assert_eq!(claims.expiration(), None);
    }

    #[test]
    fn test_claim_set_expiration_fractional() {
        let claims = claims_from_json(json!({"exp": 1893456000.9}));
        assert_eq!(claims.expiration(), Some(1893456000));
    }

    #[test]
    fn test_validate_expiry_future_accepted() {
        let claims = claims_from_json(json!({"exp": 1_000}));
        assert!(validate_expiry_at(&claims, 999).is_ok());
    }

    #[test]
    fn test_validate_expiry_at_boundary_rejected() {
        // now == exp is already expired.
        let claims = claims_from_json(json!({"exp": 1_000}));
        let result = validate_expiry_at(&claims, 1_000);
        assert!(matches!(result, Err(AuthError::Expired { .. })));
    }

    #[test]
    fn test_validate_expiry_past_rejected() {
        let claims = claims_from_json(json!({"exp": 1_000}));
        let result = validate_expiry_at(&claims, 1_010);
        assert!(
            matches!(&result, Err(AuthError::Expired { message }) if message.contains("1000")),
            "expected Expired with timestamp detail, got: {result:?}"
        );
    }

    #[test]
    fn test_validate_expiry_missing_claim_accepted() {
        let claims = claims_from_json(json!({"user_id": 42}));
        assert!(validate_expiry_at(&claims, i64::MAX).is_ok());
    }

    #[test]
    fn test_validate_expiry_non_numeric_rejected() {
        let claims = claims_from_json(json!({"exp": "tomorrow"}));
        let result = validate_expiry_at(&claims, 0);
        assert!(matches!(result, Err(AuthError::MalformedToken { .. })));
    }

    /// Regression tests from known-bad inputs: malformed and hostile tokens
    /// must produce a typed error, never a panic.
    mod malformed_regressions {
        use super::*;

        fn exercise_parsing(token: &str) -> bool {
            let stripped = strip_bearer_scheme(token);
            let parsed = parse_token(stripped);
            if let Ok(ref parsed) = parsed {
                let _ = validate_expiry_at(&parsed.claims, 0);
                let _ = validate_expiry(&parsed.claims);
            }
            parsed.is_ok()
        }

        #[test]
        fn empty_input_no_panic() {
            assert!(!exercise_parsing(""));
        }

        #[test]
        fn bearer_with_empty_body_no_panic() {
            assert!(!exercise_parsing("Bearer "));
        }

        #[test]
        fn single_dot_no_panic() {
            assert!(!exercise_parsing("."));
        }

        #[test]
        fn two_dots_decode_as_empty_segments() {
            // ".." is three empty segments; empty base64url decodes to empty
            // bytes, so the failure comes from JSON parsing, not a panic.
            assert!(!exercise_parsing(".."));
        }

        #[test]
        fn three_dots_no_panic() {
            assert!(!exercise_parsing("..."));
        }

        #[test]
        fn plain_string_no_panic() {
            assert!(!exercise_parsing("not-a-token"));
        }

        #[test]
        fn padded_base64_rejected() {
            // Standard padded base64 is not valid base64url-without-padding.
            let token = "eyJhbGciOiJSUzI1NiJ9==.e30=.c2ln";
            assert!(!exercise_parsing(token));
        }

        #[test]
        fn bracket_injection_no_panic() {
            assert!(!exercise_parsing("a]]]].b.c"));
        }

        #[test]
        fn newlines_in_token_no_panic() {
            assert!(!exercise_parsing("eyJhbGciOiJSUzI1NiJ9\n.e30\n."));
        }

        #[test]
        fn unicode_in_claims_no_panic() {
            let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
            let payload_json = "{\"iss\":\"\u{1F4A9}\",\"sub\":\"\u{FEFF}\",\"exp\":9999999999}";
            let payload = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
            let token = format!("{header}.{payload}.");
            exercise_parsing(&token);
        }

        #[test]
        fn extreme_timestamps_no_panic() {
            let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
            let payload =
                URL_SAFE_NO_PAD.encode(br#"{"user_id":1,"exp":18446744073709551615}"#);
            let token = format!("{header}.{payload}.");
            exercise_parsing(&token);
        }

        #[test]
        fn zero_timestamp_no_panic() {
            let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
            let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":0}"#);
            let token = format!("{header}.{payload}.");
            exercise_parsing(&token);
        }

        #[test]
        fn oversized_payload_no_panic() {
            let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
            let big_sub = "A".repeat(100_000);
            let payload_json = format!("{{\"sub\":\"{big_sub}\",\"exp\":1}}");
            let payload = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
            let token = format!("{header}.{payload}.sig");
            exercise_parsing(&token);
        }

        #[test]
        fn nested_token_in_claim_no_panic() {
            // The payload carries another token-like string as a claim value.
            let inner = "eyJhbGciOiJub25lIn0.eyJpc3MiOiJldmlsIn0.";
            let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
            let payload_json = format!("{{\"iss\":\"{inner}\",\"exp\":9999999999}}");
            let payload = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
            let token = format!("{header}.{payload}.");
            exercise_parsing(&token);
        }
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        /// Strategy for claim values: strings, integers, and booleans.
        fn arb_claim_value() -> impl Strategy<Value = Value> {
            prop_oneof![
                "[a-zA-Z0-9:/._ -]{0,32}".prop_map(Value::from),
                any::<i64>().prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
            ]
        }

        /// Strategy for arbitrary claim sets.
        fn arb_claim_set() -> impl Strategy<Value = ClaimSet> {
            proptest::collection::btree_map("[a-z_]{1,12}", arb_claim_value(), 0..8).prop_map(
                |entries| ClaimSet::from(entries.into_iter().collect::<Map<String, Value>>()),
            )
        }

        proptest! {
            /// Serializing then deserializing any claim set must produce an
            /// identical claim set: claims pass through unmodified.
            #[test]
            fn claim_set_serde_round_trip(claims in arb_claim_set()) {
                let json = serde_json::to_string(&claims).expect("serialize should succeed");
                let deserialized: ClaimSet =
                    serde_json::from_str(&json).expect("deserialize should succeed");
                prop_assert_eq!(deserialized, claims);
            }

            /// Stripping the scheme from `"Bearer <token>"` always yields the
            /// token body unchanged.
            #[test]
            fn bearer_strip_preserves_body(body in "[A-Za-z0-9._-]{1,64}") {
                let raw = format!("Bearer {body}");
                prop_assert_eq!(strip_bearer_scheme(&raw), body.as_str());
            }

            /// A credential without the scheme marker is never altered.
            #[test]
            fn bare_credential_unchanged(body in "[a-z0-9._-]{1,64}") {
                prop_assert_eq!(strip_bearer_scheme(&body), body.as_str());
            }
        }
    }
}
