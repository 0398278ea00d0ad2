//! Client configuration.

use crate::error::{VaultError, VaultResult};
use blobvault_crypto::KdfParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the store, gateway and workflow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Object store write endpoint.
    pub publisher_url: String,

    /// Object store read endpoint.
    pub aggregator_url: String,

    /// Base URL of the vault gateway.
    pub gateway_base_url: String,

    /// Ledger explorer used for object/transaction links.
    pub explorer_base_url: String,

    /// Origin that serves the share deep-link route.
    pub share_base_url: String,

    /// Retention epochs requested for each upload.
    pub epochs: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Automatic retries after a transient network failure.
    pub max_retries: u32,

    /// How long a terminal save result stays visible before returning to idle.
    pub result_display_ms: u64,

    /// Argon2id cost parameters for PIN key derivation.
    #[serde(default)]
    pub kdf: KdfParams,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            publisher_url: "https://publisher-devnet.walrus.space".to_string(),
            aggregator_url: "https://aggregator-devnet.walrus.space".to_string(),
            gateway_base_url: "https://gateway.erebrus.io".to_string(),
            explorer_base_url: "https://suiscan.xyz/testnet".to_string(),
            share_base_url: "https://erebrus.io".to_string(),
            epochs: 5,
            request_timeout_secs: 30,
            max_retries: 1,
            result_display_ms: 5_000,
            kdf: KdfParams::default(),
        }
    }
}

impl VaultConfig {
    /// Checks that the configuration can be used to build clients.
    pub fn validate(&self) -> VaultResult<()> {
        let urls = [
            ("publisher_url", &self.publisher_url),
            ("aggregator_url", &self.aggregator_url),
            ("gateway_base_url", &self.gateway_base_url),
            ("explorer_base_url", &self.explorer_base_url),
            ("share_base_url", &self.share_base_url),
        ];
        for (name, value) in urls {
            if value.trim().is_empty() {
                return Err(VaultError::Config(format!("missing {name}")));
            }
        }
        if self.epochs == 0 {
            return Err(VaultError::Config("epochs must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(VaultError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn result_display(&self) -> Duration {
        Duration::from_millis(self.result_display_ms)
    }

    /// Builds the HTTP client used by every remote call.
    pub(crate) fn http_client(&self) -> VaultResult<reqwest::Client> {
        self.validate()?;
        reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()
            .map_err(|e| VaultError::Config(format!("failed to build HTTP client: {e}")))
    }
}

/// Strips trailing slashes so paths can be appended with `format!`.
pub(crate) fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}
