//! Error taxonomy for store, vault and share operations.

use blobvault_crypto::CryptoError;
use thiserror::Error;

/// Result type for blobvault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur while saving, recovering or sharing a blob.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("upload failed with status {status}: {message}")]
    UploadFailed { status: u16, message: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed share token: {0}")]
    MalformedToken(String),

    #[error("decryption integrity check failed")]
    DecryptionIntegrityFailure,

    #[error("a save is already in progress for record {0}")]
    Busy(String),

    #[error("crypto error: {0}")]
    Crypto(CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Classification of a [`VaultError`], independent of its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkFailure,
    ValidationFailure,
    UploadFailed,
    Unauthorized,
    NotFound,
    MalformedToken,
    DecryptionIntegrityFailure,
    Busy,
    Internal,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::UploadFailed { .. } => ErrorKind::UploadFailed,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MalformedToken(_) => ErrorKind::MalformedToken,
            Self::DecryptionIntegrityFailure => ErrorKind::DecryptionIntegrityFailure,
            Self::Busy(_) => ErrorKind::Busy,
            Self::Crypto(_) | Self::Serialization(_) | Self::Config(_) => ErrorKind::Internal,
        }
    }

    /// Only network failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::NetworkFailure
    }

    /// Message suitable for showing to the person who triggered the operation.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network(_) => {
                "Network error. Please check your connection and try again.".into()
            }
            Self::UploadFailed { .. } => "Failed to save configuration.".into(),
            Self::Unauthorized(_) => "Your session has expired. Please sign in again.".into(),
            Self::NotFound(_) => "The requested record or blob could not be found.".into(),
            Self::MalformedToken(_) => "This share link is invalid.".into(),
            Self::DecryptionIntegrityFailure => "Incorrect PIN. Please re-enter your PIN.".into(),
            Self::Busy(_) => "A save is already in progress.".into(),
            Self::Crypto(_) | Self::Serialization(_) | Self::Config(_) => {
                "Something went wrong. Please try again.".into()
            }
        }
    }
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Integrity => Self::DecryptionIntegrityFailure,
            other => Self::Crypto(other),
        }
    }
}

impl From<reqwest::Error> for VaultError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}
