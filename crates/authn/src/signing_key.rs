//! Signing-key references and load-once caching.
//!
//! The verifier holds a [`SigningKeySource`], a reference to RSA public key
//! material, either a filesystem path or inline PEM. The material is loaded
//! on first use and cached immutably for the verifier's lifetime; key
//! rotation is an operational concern handled by constructing a new
//! verifier.
//!
//! All loading failures are [`AuthError::Configuration`]: an unset or broken
//! key reference is a deployment problem, distinct from any quality of the
//! credential being verified.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use jsonwebtoken::DecodingKey;

use crate::error::AuthError;

/// Reference to the RSA public key used for signature verification.
///
/// The key is used only to verify, never to sign; the private half stays
/// with the token issuer.
#[derive(Clone, PartialEq, Eq)]
pub enum SigningKeySource {
    /// Filesystem path to a PEM-encoded RSA public key.
    File(PathBuf),
    /// Inline PEM-encoded RSA public key material.
    Pem(String),
}

impl fmt::Debug for SigningKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Inline key material is elided from Debug output.
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Pem(_) => f.write_str("Pem(..)"),
        }
    }
}

impl SigningKeySource {
    /// Builds a source referencing a PEM file on disk.
    pub fn from_pem_file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Builds a source from inline PEM material.
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self::Pem(pem.into())
    }

    /// Loads the referenced material and parses it into a decoding key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the file does not exist, is
    /// unreadable, or the material is not a valid RSA public key PEM.
    pub fn load(&self) -> Result<DecodingKey, AuthError> {
        let pem = match self {
            Self::File(path) => read_pem_file(path)?,
            Self::Pem(pem) => pem.clone(),
        };

        DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::configuration(format!("invalid RSA public key PEM: {e}")))
    }
}

fn read_pem_file(path: &Path) -> Result<String, AuthError> {
    if !path.exists() {
        return Err(AuthError::configuration(format!(
            "public key file does not exist: {}",
            path.display()
        )));
    }

    fs::read_to_string(path).map_err(|e| {
        AuthError::configuration(format!("failed to read public key file {}: {e}", path.display()))
    })
}

/// Load-once, immutable cache for the verifier's decoding key.
///
/// A successful load is cached for the lifetime of the cache; concurrent
/// readers share the same key with no further synchronization. A failed
/// load is not cached, so a repaired configuration is picked up on the
/// next call without restarting the process.
pub(crate) struct CachedSigningKey {
    key: OnceLock<DecodingKey>,
}

impl CachedSigningKey {
    pub(crate) fn new() -> Self {
        Self { key: OnceLock::new() }
    }

    /// Returns the cached key, loading it from `source` on first use.
    pub(crate) fn get_or_load(&self, source: &SigningKeySource) -> Result<&DecodingKey, AuthError> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }

        let loaded = source.load()?;
        // Two racing loaders both succeed; the loser's key is dropped.
        Ok(self.key.get_or_init(|| loaded))
    }

    /// Whether a key has been loaded and cached.
    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.key.get().is_some()
    }
}
