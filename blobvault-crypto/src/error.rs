//! Error types for reference encryption.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The authentication tag did not verify: wrong key or tampered data.
    #[error("integrity check failed (wrong key or tampered data)")]
    Integrity,

    /// The encoded ciphertext or decrypted plaintext is structurally invalid.
    #[error("malformed ciphertext: {0}")]
    Malformed(String),
}

impl CryptoError {
    /// Returns true if this error means the key did not match the ciphertext.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Integrity)
    }
}
