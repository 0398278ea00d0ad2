//! Reference encryption for blobvault.
//!
//! Provides:
//! - Argon2id key derivation from an owner identity and a short PIN
//! - ChaCha20-Poly1305 authenticated encryption of blob references
//! - Key material that zeroizes itself on drop
//!
//! # Key model
//!
//! The key is never stored. It is re-derived from `(identity, PIN)` every
//! time a reference is sealed or opened, using a salt computed from the
//! identity. Losing the PIN means losing access to the reference; the blob
//! itself stays in the store under its content address.
//!
//! A wrong PIN produces a different key, and the Poly1305 tag rejects it.
//! Decryption never hands back plausible-looking garbage.

mod cipher;
mod error;
mod key;
mod reference;

pub use cipher::{EncryptedData, NONCE_SIZE, TAG_SIZE, decrypt, encrypt};
pub use error::{CryptoError, CryptoResult};
pub use key::{
    DerivedKey, KEY_SIZE, KdfParams, SALT_SIZE, Salt, derive_key, derive_pin_key,
    generate_random_key,
};
pub use reference::{EncryptedReference, open_reference, seal_reference};
