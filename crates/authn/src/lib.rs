//! # IdGate Authentication
//!
//! Bearer-token verification and claim extraction for IdGate services.
//!
//! This crate provides:
//! - **Token verification**: structural decode, RSA-SHA256 signature
//!   verification, expiry checks
//! - **Claim extraction**: the full claim set of a verified token, plus a
//!   one-call subject-id helper
//! - **Algorithm validation**: security checks for token algorithms
//!
//! ## Features
//!
//! - The verification algorithm is fixed to RS256; there is no algorithm
//!   negotiation
//! - Symmetric algorithms (HS256, etc.) and `none` are explicitly rejected
//! - Every expected failure is a typed [`AuthError`], never a panic
//!
//! ## Example
//!
//! ```no_run
//! use idgate_authn::{SigningKeySource, TokenVerifier};
//!
//! # fn example(authorization_header: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let verifier =
//!     TokenVerifier::new(SigningKeySource::from_pem_file("/etc/idgate/jwt-public.pem"));
//!
//! let claims = verifier.verify(authorization_header)?;
//! println!("Subject: {:?}", claims.get("user_id"));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// External configuration for the verifier.
pub mod config;
/// Authentication error types.
pub mod error;
/// Token structure, claim set, and expiry validation.
pub mod jwt;
/// Signing-key references and load-once caching.
pub mod signing_key;
/// Test helpers and RSA key fixtures.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
/// Algorithm validation.
pub mod validation;
/// The bearer-token verifier.
pub mod verifier;

// Re-export key types for convenience
pub use config::{PUBLIC_KEY_PATH_ENV, VerifierConfig};
pub use error::{AuthError, Result};
pub use jwt::{ClaimSet, EXPIRATION_CLAIM, ParsedToken, TokenHeader, strip_bearer_scheme};
pub use signing_key::SigningKeySource;
pub use validation::{ACCEPTED_ALGORITHMS, FORBIDDEN_ALGORITHMS, validate_algorithm};
pub use verifier::{SubjectId, TokenVerifier};
