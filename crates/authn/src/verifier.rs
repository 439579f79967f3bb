//! The bearer-token verifier.
//!
//! [`TokenVerifier`] decides, deterministically, whether a raw credential is
//! a well-formed, correctly signed, non-expired token, and exposes its
//! claims if so. Each gate is ordered and short-circuits:
//!
//! ```text
//! credential arrives → resolve configured public key   (Configuration)
//!                    → strip scheme, structural decode (MalformedToken)
//!                    → algorithm gate, RS256 only      (UnsupportedAlgorithm)
//!                    → RSA-SHA256 signature check      (InvalidSignature)
//!                    → expiry check against UTC now    (Expired)
//!                    → full claim set returned
//! ```
//!
//! The key gate runs first so a broken deployment is reported for every
//! input; misconfiguration is distinguishable from a bad credential.
//!
//! Verification is pure and synchronous: no shared mutable state, no I/O
//! beyond the one-time key load, so any number of calls may run in parallel.

use std::fmt;

use crate::{
    config::VerifierConfig,
    error::AuthError,
    jwt::{ClaimSet, parse_token, strip_bearer_scheme, validate_expiry, verify_signature},
    signing_key::{CachedSigningKey, SigningKeySource},
    validation::validate_algorithm,
};

/// Subject identifier extracted from a verified claim set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubjectId {
    /// Numeric identifier, e.g. a user row id.
    Numeric(i64),
    /// Textual identifier, e.g. a UUID or account name.
    Text(String),
}

impl SubjectId {
    /// Converts a claim value into a subject identifier.
    ///
    /// Integers become [`SubjectId::Numeric`], non-empty strings become
    /// [`SubjectId::Text`]; anything else is not a usable identifier.
    #[must_use]
    pub fn from_claim(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Numeric),
            serde_json::Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// RSA-SHA256 bearer-token verifier.
///
/// Holds a reference to the public verification key, loaded once on first
/// use and cached immutably for the verifier's lifetime. Key rotation is an
/// external concern: construct a new verifier with the new source.
pub struct TokenVerifier {
    source: SigningKeySource,
    key: CachedSigningKey,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The decoding key itself is not printable.
        f.debug_struct("TokenVerifier").field("source", &self.source).finish()
    }
}

impl TokenVerifier {
    /// Creates a verifier for the given key source.
    ///
    /// The key material is not touched here; it loads on the first
    /// [`verify`](Self::verify) call. A broken source therefore surfaces as
    /// [`AuthError::Configuration`] per call, not as a construction failure.
    #[must_use]
    pub fn new(source: SigningKeySource) -> Self {
        Self { source, key: CachedSigningKey::new() }
    }

    /// Creates a verifier from external configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if no key path is configured.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, AuthError> {
        Ok(Self::new(config.signing_key_source()?))
    }

    /// Verifies a raw bearer credential and returns its claim set.
    ///
    /// The credential may carry a `"Bearer "` scheme prefix, which is
    /// stripped; otherwise the whole string is treated as the token body.
    /// On success every claim present in the token payload is returned,
    /// unmodified and unfiltered.
    ///
    /// Identical inputs always yield identical outcomes: verification
    /// consumes nothing and mutates nothing.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Configuration`]: key unset, unreadable, or invalid;
    ///   reported for every input
    /// - [`AuthError::MalformedToken`]: not a three-segment base64url token
    /// - [`AuthError::UnsupportedAlgorithm`]: header declares anything but RS256
    /// - [`AuthError::InvalidSignature`]: signature does not verify
    /// - [`AuthError::Expired`]: expiration timestamp is not in the future
    #[tracing::instrument(skip(self, raw_credential))]
    pub fn verify(&self, raw_credential: &str) -> Result<ClaimSet, AuthError> {
        let decoding_key = self.key.get_or_load(&self.source)?;

        let token = strip_bearer_scheme(raw_credential);
        let parsed = parse_token(token)?;
        validate_algorithm(&parsed.header.alg)?;

        let claims = verify_signature(token, decoding_key)?;
        validate_expiry(&claims)?;

        tracing::debug!(claims = claims.len(), "bearer token verified");
        Ok(claims)
    }

    /// Verifies the credential and extracts the named subject claim.
    ///
    /// Convenience wrapper over [`verify`](Self::verify) for call sites that
    /// only need an identity: any verification failure collapses to `None`,
    /// as does a missing or non-identifier claim value. Callers that need
    /// the failure reason call [`verify`](Self::verify) directly.
    #[must_use]
    pub fn resolve_subject(&self, raw_credential: &str, claim: &str) -> Option<SubjectId> {
        match self.verify(raw_credential) {
            Ok(claims) => claims.get(claim).and_then(SubjectId::from_claim),
            Err(err) => {
                tracing::debug!(error = %err, "subject resolution failed");
                None
            },
        }
    }
}
