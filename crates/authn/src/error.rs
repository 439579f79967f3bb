//! Authentication error types.
//!
//! This module defines the failure taxonomy for bearer-token verification.
//! Each kind is a distinct variant so callers can branch on the failure
//! class without string-matching; the `message` field carries diagnostic
//! detail only.

use thiserror::Error;

/// Bearer-token verification errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`: new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Environment or deployment problem: signing key unset, unreadable,
    /// or not valid key material. Never attributable to the caller.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What was wrong with the deployment environment.
        message: String,
    },

    /// The client sent garbage: not a three-segment token, undecodable
    /// base64url, or unparseable JSON.
    #[error("Malformed token: {message}")]
    MalformedToken {
        /// The underlying decode or parse error.
        message: String,
    },

    /// The token header declares an algorithm other than RS256.
    #[error("Unsupported algorithm: {message}")]
    UnsupportedAlgorithm {
        /// Which algorithm was declared and why it is rejected.
        message: String,
    },

    /// The signature does not verify under the configured public key:
    /// tampered, or issued by an untrusted signer.
    #[error("Invalid signature: {message}")]
    InvalidSignature {
        /// Diagnostic detail from the verification step.
        message: String,
    },

    /// Valid signature, stale token: the expiration timestamp is not in
    /// the future.
    #[error("Token expired: {message}")]
    Expired {
        /// When the token expired relative to the check time.
        message: String,
    },
}

impl AuthError {
    /// Builds a [`AuthError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Builds a [`AuthError::MalformedToken`] error.
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::MalformedToken { message: message.into() }
    }

    /// Builds a [`AuthError::UnsupportedAlgorithm`] error.
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm { message: message.into() }
    }

    /// Builds a [`AuthError::InvalidSignature`] error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature { message: message.into() }
    }

    /// Builds a [`AuthError::Expired`] error.
    pub fn expired(message: impl Into<String>) -> Self {
        Self::Expired { message: message.into() }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => {
                AuthError::invalid_signature("signature verification failed")
            },
            ErrorKind::ExpiredSignature => {
                AuthError::expired("token is past its expiration time")
            },
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::unsupported_algorithm("algorithm is not supported for verification")
            },
            ErrorKind::InvalidRsaKey(detail) => {
                AuthError::configuration(format!("invalid RSA key: {detail}"))
            },
            ErrorKind::InvalidKeyFormat => {
                AuthError::configuration("key material is not in a recognized format")
            },
            ErrorKind::InvalidToken => AuthError::malformed_token("invalid token structure"),
            _ => AuthError::malformed_token(format!("token error: {err}")),
        }
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
