//! Key derivation and management.
//!
//! Keys are derived from a short PIN with Argon2id. The salt is not random:
//! it is computed from the owner's identity, so the same (identity, PIN)
//! pair always yields the same key and nothing but the PIN has to be
//! remembered to recover a reference.

use crate::error::{CryptoError, CryptoResult};
use argon2::{Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of encryption keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Size of salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Domain separator mixed into identity-bound salts.
const PIN_SALT_DOMAIN: &[u8] = b"blobvault/pin-key/v1:";

/// A derived encryption key with automatic zeroization on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Creates a new derived key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Derives the salt bound to an owner identity.
    ///
    /// The identity is used verbatim: `0xABC` and `0xabc` are different
    /// owners as far as key derivation is concerned.
    pub fn for_identity(identity: &str) -> Self {
        let digest = Sha256::new()
            .chain_update(PIN_SALT_DOMAIN)
            .chain_update(identity.as_bytes())
            .finalize();

        let mut bytes = [0u8; SALT_SIZE];
        bytes.copy_from_slice(&digest[..SALT_SIZE]);
        Self { bytes }
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}

/// Key derivation parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id (2023)
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// Derives an encryption key from a password using Argon2id.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<DerivedKey> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key_bytes = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key_bytes)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let key = DerivedKey::from_bytes(key_bytes);
    key_bytes.zeroize();
    Ok(key)
}

/// Derives the reference key for an owner identity and PIN.
///
/// Pure and deterministic: identical inputs always produce an identical key.
pub fn derive_pin_key(identity: &str, pin: &str, params: &KdfParams) -> CryptoResult<DerivedKey> {
    derive_key(pin, &Salt::for_identity(identity), params)
}

/// Generates a random encryption key.
pub fn generate_random_key() -> DerivedKey {
    let mut bytes = [0u8; KEY_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    DerivedKey::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> KdfParams {
        KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn identity_salt_is_stable() {
        assert_eq!(Salt::for_identity("0xABC"), Salt::for_identity("0xABC"));
        assert_ne!(Salt::for_identity("0xABC"), Salt::for_identity("0xabc"));
    }

    #[test]
    fn pin_key_depends_on_identity_and_pin() {
        let params = fast_params();
        let base = derive_pin_key("0xABC", "123456", &params).unwrap();
        assert_eq!(base, derive_pin_key("0xABC", "123456", &params).unwrap());
        assert_ne!(base, derive_pin_key("0xABD", "123456", &params).unwrap());
        assert_ne!(base, derive_pin_key("0xABC", "123457", &params).unwrap());
    }

    #[test]
    fn invalid_params_rejected() {
        let params = KdfParams {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
        };
        let err = derive_pin_key("0xABC", "123456", &params).unwrap_err();
        assert!(matches!(err, CryptoError::KeyDerivation(_)));
    }

    #[test]
    fn debug_output_redacts_key() {
        let key = generate_random_key();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
