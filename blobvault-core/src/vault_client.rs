//! HTTP client for the vault gateway.
//!
//! The gateway maps a record id to the encrypted blob reference owned by the
//! caller. It never sees the PIN, the key or the plaintext blob id. Every
//! call is authorized with the session's bearer token.

use crate::config::{VaultConfig, base};
use crate::error::{VaultError, VaultResult};
use crate::retry::RetryPolicy;
use crate::types::{AuthToken, RecordId};
use blobvault_crypto::EncryptedReference;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gateway route prefix for per-record blob references.
const RECORD_PATH: &str = "/api/v1.0/erebrus/client";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceBody<'a> {
    blob_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceResponse {
    #[serde(default)]
    blob_id: Option<String>,
}

/// Client for persisting and fetching encrypted references.
pub struct VaultGatewayClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl VaultGatewayClient {
    pub fn new(config: &VaultConfig) -> VaultResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            base_url: base(&config.gateway_base_url).to_string(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    fn record_url(&self, record_id: &RecordId) -> String {
        format!("{}{RECORD_PATH}/{record_id}/blobId", self.base_url)
    }

    /// Stores `reference` as the encrypted blob reference of `record_id`.
    pub async fn persist_encrypted_reference(
        &self,
        record_id: &RecordId,
        reference: &EncryptedReference,
        token: &AuthToken,
    ) -> VaultResult<()> {
        let encoded = reference.to_base64();
        let encoded = encoded.as_str();
        self.retry
            .run("persist reference", move || async move {
                let resp = self
                    .client
                    .put(self.record_url(record_id))
                    .bearer_auth(token.expose())
                    .json(&ReferenceBody { blob_id: encoded })
                    .send()
                    .await?;
                check_status(resp, record_id).await.map(drop)
            })
            .await?;

        info!("persisted encrypted reference for record {record_id}");
        Ok(())
    }

    /// Fetches the encrypted blob reference of `record_id`.
    pub async fn fetch_encrypted_reference(
        &self,
        record_id: &RecordId,
        token: &AuthToken,
    ) -> VaultResult<EncryptedReference> {
        let body: ReferenceResponse = self
            .retry
            .run("fetch reference", move || async move {
                let resp = self
                    .client
                    .get(self.record_url(record_id))
                    .bearer_auth(token.expose())
                    .send()
                    .await?;
                let resp = check_status(resp, record_id).await?;
                Ok(resp.json::<ReferenceResponse>().await?)
            })
            .await?;

        let encoded = body
            .blob_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| VaultError::NotFound(format!("no reference stored for record {record_id}")))?;

        debug!("fetched encrypted reference for record {record_id}");
        Ok(EncryptedReference::from_base64(&encoded)?)
    }
}

/// Classifies a gateway response status.
async fn check_status(resp: Response, record_id: &RecordId) -> VaultResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(VaultError::Unauthorized(
            format!("gateway rejected token ({status})"),
        )),
        StatusCode::NOT_FOUND => Err(VaultError::NotFound(format!("record {record_id}"))),
        _ => {
            let body = resp.text().await.unwrap_or_default();
            Err(VaultError::Network(format!("gateway returned {status}: {body}")))
        }
    }
}
