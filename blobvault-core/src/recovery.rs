//! Read path for saved configurations.
//!
//! Re-derives the key from the owner identity and the PIN entered now, opens
//! the reference kept by the gateway and downloads the blob it names. A
//! wrong PIN is reported as an integrity failure before the store is ever
//! contacted.

use crate::blob_store::BlobStoreClient;
use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::session::SessionContext;
use crate::types::{BlobId, RecordId};
use crate::vault_client::VaultGatewayClient;
use blobvault_crypto::{KdfParams, derive_pin_key, open_reference};
use std::sync::Arc;
use tracing::{debug, info};

/// A configuration downloaded from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveredConfig {
    pub blob_id: BlobId,
    /// Suggested name when writing the payload to disk.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// File name used for a client's downloaded configuration.
pub fn config_file_name(client_name: &str) -> String {
    format!("{client_name}.conf")
}

/// Recovers configurations saved through the save workflow.
pub struct ConfigRecovery {
    store: Arc<BlobStoreClient>,
    vault: Arc<VaultGatewayClient>,
    session: SessionContext,
    kdf: KdfParams,
}

impl ConfigRecovery {
    pub fn new(
        config: &VaultConfig,
        store: Arc<BlobStoreClient>,
        vault: Arc<VaultGatewayClient>,
        session: SessionContext,
    ) -> Self {
        Self {
            store,
            vault,
            session,
            kdf: config.kdf.clone(),
        }
    }

    /// Fetches and decrypts the blob id saved for `record_id`.
    pub async fn recover_blob_id(&self, record_id: &RecordId, pin: &str) -> VaultResult<BlobId> {
        let sealed = self
            .vault
            .fetch_encrypted_reference(record_id, self.session.token())
            .await?;

        let key = derive_pin_key(self.session.identity().as_str(), pin, &self.kdf)?;
        let blob_id = BlobId::new(open_reference(&sealed, &key)?);
        debug!("opened reference for record {record_id}");
        Ok(blob_id)
    }

    /// Recovers the blob id for `record_id` and downloads its payload.
    pub async fn recover(
        &self,
        record_id: &RecordId,
        pin: &str,
        client_name: &str,
    ) -> VaultResult<RecoveredConfig> {
        let blob_id = self.recover_blob_id(record_id, pin).await?;
        let recovered = self.download(&blob_id, client_name).await?;
        info!("recovered configuration for record {record_id}");
        Ok(recovered)
    }

    /// Downloads a configuration by a blob id that is already known.
    pub async fn download(&self, blob_id: &BlobId, client_name: &str) -> VaultResult<RecoveredConfig> {
        let data = self.store.retrieve(blob_id).await?;
        Ok(RecoveredConfig {
            blob_id: blob_id.clone(),
            file_name: config_file_name(client_name),
            data,
        })
    }
}
