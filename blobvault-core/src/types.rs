//! Shared types for store, vault and share operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Content address assigned by the object store.
    BlobId
);

string_id!(
    /// Gateway record under which an encrypted reference is kept.
    RecordId
);

string_id!(
    /// Stable per-user identifier, typically a wallet address.
    OwnerIdentity
);

/// Bearer token for the vault gateway.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Result of writing a payload to the object store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Identical content was already stored; its registration event is reused.
    AlreadyCertified { blob_id: BlobId, tx_digest: String },
    /// A new blob object was created.
    NewlyCreated { blob_id: BlobId, object_id: String },
}

impl StoreOutcome {
    pub fn blob_id(&self) -> &BlobId {
        match self {
            Self::AlreadyCertified { blob_id, .. } | Self::NewlyCreated { blob_id, .. } => blob_id,
        }
    }

    pub fn is_newly_created(&self) -> bool {
        matches!(self, Self::NewlyCreated { .. })
    }
}

/// A file uploaded during the current session.
///
/// Field names follow the share-token wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub blob_id: BlobId,
    pub media_type: String,
    pub blob_url: String,
    /// Ledger explorer link for the blob object or its certification event.
    #[serde(alias = "suiUrl")]
    pub object_url: String,
    pub is_image: bool,
}
