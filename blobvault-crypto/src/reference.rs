//! Encrypted blob references.
//!
//! Only the reference (the store's content address) is encrypted, never the
//! blob itself. The sealed form is what the vault gateway keeps on behalf of
//! the owner.

use crate::cipher::{EncryptedData, decrypt, encrypt};
use crate::error::{CryptoError, CryptoResult};
use crate::key::DerivedKey;
use zeroize::Zeroize;

/// Ciphertext of a blob reference together with its Poly1305 tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedReference {
    data: EncryptedData,
}

impl EncryptedReference {
    /// Wraps raw encrypted data.
    pub fn from_data(data: EncryptedData) -> Self {
        Self { data }
    }

    /// Wire form stored by the gateway.
    pub fn to_base64(&self) -> String {
        self.data.to_base64()
    }

    /// Parses the wire form. Only checks structure, not the tag.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        EncryptedData::from_base64(encoded).map(Self::from_data)
    }
}

/// Encrypts a blob reference under `key`.
pub fn seal_reference(reference: &str, key: &DerivedKey) -> CryptoResult<EncryptedReference> {
    encrypt(key, reference.as_bytes()).map(EncryptedReference::from_data)
}

/// Decrypts a blob reference, verifying its integrity tag first.
pub fn open_reference(sealed: &EncryptedReference, key: &DerivedKey) -> CryptoResult<String> {
    let plaintext = decrypt(key, &sealed.data)?;
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        CryptoError::Malformed("reference is not valid UTF-8".to_string())
    })
}
