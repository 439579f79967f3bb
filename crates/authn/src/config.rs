//! External configuration for the verifier.
//!
//! One setting matters here: where the RSA public key lives. An absent
//! setting is an expected misconfiguration state and surfaces as
//! [`AuthError::Configuration`] when the verifier needs the key, never as a
//! panic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{error::AuthError, signing_key::SigningKeySource};

/// Environment variable naming the RSA public key PEM path.
pub const PUBLIC_KEY_PATH_ENV: &str = "IDGATE_PUBLIC_KEY_PATH";

/// Verifier configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Filesystem path to the PEM-encoded RSA public key used for signature
    /// verification. `None` means the deployment has not configured one.
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,
}

impl VerifierConfig {
    /// Builds a configuration with the given public key path.
    pub fn new(public_key_path: impl Into<PathBuf>) -> Self {
        Self { public_key_path: Some(public_key_path.into()) }
    }

    /// Reads the configuration from the process environment
    /// ([`PUBLIC_KEY_PATH_ENV`]).
    #[must_use]
    pub fn from_env() -> Self {
        Self { public_key_path: std::env::var_os(PUBLIC_KEY_PATH_ENV).map(PathBuf::from) }
    }

    /// Resolves the configured key path into a [`SigningKeySource`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if no key path is configured.
    pub fn signing_key_source(&self) -> Result<SigningKeySource, AuthError> {
        self.public_key_path
            .as_ref()
            .map(SigningKeySource::from_pem_file)
            .ok_or_else(|| AuthError::configuration("signing key path is not configured"))
    }
}
