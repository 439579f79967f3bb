//! Token algorithm validation.
//!
//! This module provides security checks for the algorithm a token header
//! declares, ensuring only the one approved asymmetric algorithm is accepted.
//!
//! # Security
//!
//! The policy is strict and fixed:
//! - Exact algorithm checks to prevent algorithm substitution attacks
//! - Only RSA-SHA256 (RS256) is allowed
//! - Symmetric algorithms and "none" are always rejected

use crate::error::AuthError;

/// Forbidden token algorithms that are never accepted for security reasons.
///
/// These algorithms are blocked because:
/// - `none`: No signature verification (trivially bypassable)
/// - `HS256`, `HS384`, `HS512`: Symmetric algorithms (shared secret vulnerability)
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none", "HS256", "HS384", "HS512"];

/// Accepted token algorithms.
///
/// The verification pipeline is fixed to RSA-SHA256: the issuer signs with
/// the private half of an RSA key pair and this crate verifies with the
/// public half. There is no algorithm negotiation.
///
/// Per RFC 8725 Section 3.1, validators must reject algorithms they do not
/// fully implement. Listing further algorithms here without verification
/// support would produce confusing errors at the signature verification
/// stage.
pub const ACCEPTED_ALGORITHMS: &[&str] = &["RS256"];

/// Validate a declared token algorithm against security policies.
///
/// This function enforces strict algorithm security per RFC 8725:
/// - ALWAYS rejects symmetric algorithms (HS256, HS384, HS512)
/// - ALWAYS rejects "none"
/// - Only accepts RS256
///
/// # Arguments
///
/// * `alg` - The algorithm from the token header
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if:
/// - Algorithm is symmetric (HS256, HS384, HS512)
/// - Algorithm is "none"
/// - Algorithm is not in [`ACCEPTED_ALGORITHMS`]
///
/// # Examples
///
/// ```
/// use idgate_authn::validation::validate_algorithm;
///
/// // RS256 is accepted
/// assert!(validate_algorithm("RS256").is_ok());
///
/// // EdDSA is not supported by this pipeline
/// assert!(validate_algorithm("EdDSA").is_err());
///
/// // Symmetric algorithm rejected
/// assert!(validate_algorithm("HS256").is_err());
/// ```
pub fn validate_algorithm(alg: &str) -> Result<(), AuthError> {
    // Check against forbidden algorithms
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        return Err(AuthError::unsupported_algorithm(format!(
            "algorithm '{alg}' is not allowed for security reasons"
        )));
    }

    // Check if in accepted list
    if !ACCEPTED_ALGORITHMS.contains(&alg) {
        return Err(AuthError::unsupported_algorithm(format!(
            "algorithm '{alg}' is not in the accepted list (only RS256 is supported)"
        )));
    }

    Ok(())
}
