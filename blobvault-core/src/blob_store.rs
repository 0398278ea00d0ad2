//! Content-addressed object store client.
//!
//! Writes go to the publisher, reads to the aggregator. The store dedupes by
//! content: uploading bytes it already holds returns the existing blob id as
//! an "already certified" result instead of creating a new object.

use crate::config::{VaultConfig, base};
use crate::error::{VaultError, VaultResult};
use crate::retry::RetryPolicy;
use crate::types::{BlobId, StoreOutcome};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
enum StoreResponse {
    AlreadyCertified(AlreadyCertified),
    NewlyCreated(NewlyCreated),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlreadyCertified {
    blob_id: String,
    event: CertifyEvent,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertifyEvent {
    tx_digest: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewlyCreated {
    blob_object: BlobObject,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobObject {
    id: String,
    blob_id: String,
}

impl From<StoreResponse> for StoreOutcome {
    fn from(resp: StoreResponse) -> Self {
        match resp {
            StoreResponse::AlreadyCertified(c) => StoreOutcome::AlreadyCertified {
                blob_id: BlobId::new(c.blob_id),
                tx_digest: c.event.tx_digest,
            },
            StoreResponse::NewlyCreated(n) => StoreOutcome::NewlyCreated {
                blob_id: BlobId::new(n.blob_object.blob_id),
                object_id: n.blob_object.id,
            },
        }
    }
}

/// HTTP client for the publisher/aggregator pair.
pub struct BlobStoreClient {
    client: Client,
    publisher_url: String,
    aggregator_url: String,
    explorer_base_url: String,
    epochs: u32,
    retry: RetryPolicy,
}

impl BlobStoreClient {
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            publisher_url: base(&config.publisher_url).to_string(),
            aggregator_url: base(&config.aggregator_url).to_string(),
            explorer_base_url: base(&config.explorer_base_url).to_string(),
            epochs: config.epochs,
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    /// Stores a payload for the configured number of epochs.
    pub async fn store(&self, data: &[u8]) -> VaultResult<StoreOutcome> {
        let outcome = self.retry.run("store", || self.store_once(data)).await?;
        debug!(
            "stored {} bytes (sha256 {}) as blob {} (new: {})",
            data.len(),
            hex::encode(Sha256::digest(data)),
            outcome.blob_id(),
            outcome.is_newly_created()
        );
        Ok(outcome)
    }

    async fn store_once(&self, data: &[u8]) -> VaultResult<StoreOutcome> {
        let url = format!("{}/v1/store", self.publisher_url);
        let resp = self
            .client
            .put(&url)
            .query(&[("epochs", self.epochs)])
            .body(data.to_vec())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VaultError::UploadFailed {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.bytes().await?;
        let parsed: StoreResponse =
            serde_json::from_slice(&body).map_err(|e| VaultError::UploadFailed {
                status: status.as_u16(),
                message: format!("unrecognized store response: {e}"),
            })?;
        Ok(parsed.into())
    }

    /// Downloads the raw bytes of a blob.
    pub async fn retrieve(&self, blob_id: &BlobId) -> VaultResult<Vec<u8>> {
        let bytes = self
            .retry
            .run("retrieve", || self.retrieve_once(blob_id))
            .await?;
        debug!("retrieved {} bytes for blob {blob_id}", bytes.len());
        Ok(bytes)
    }

    async fn retrieve_once(&self, blob_id: &BlobId) -> VaultResult<Vec<u8>> {
        let resp = self.client.get(self.blob_url(blob_id)).send().await?;

        match resp.status() {
            s if s.is_success() => Ok(resp.bytes().await?.to_vec()),
            StatusCode::NOT_FOUND => Err(VaultError::NotFound(format!("blob {blob_id}"))),
            s => Err(VaultError::Network(format!(
                "aggregator returned {s} for blob {blob_id}"
            ))),
        }
    }

    /// Public read URL for a blob.
    pub fn blob_url(&self, blob_id: &BlobId) -> String {
        format!("{}/v1/{blob_id}", self.aggregator_url)
    }

    /// Explorer link for the object or certification event behind an upload.
    pub fn object_url(&self, outcome: &StoreOutcome) -> String {
        match outcome {
            StoreOutcome::AlreadyCertified { tx_digest, .. } => {
                format!("{}/tx/{tx_digest}", self.explorer_base_url)
            }
            StoreOutcome::NewlyCreated { object_id, .. } => {
                format!("{}/object/{object_id}", self.explorer_base_url)
            }
        }
    }
}
