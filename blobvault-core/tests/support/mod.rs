//! Shared helpers for tests against wiremock stand-ins of the publisher,
//! aggregator and vault gateway.
#![allow(dead_code)]

use blobvault_core::session::SessionContext;
use blobvault_core::{AuthToken, VaultConfig};
use blobvault_crypto::KdfParams;
use std::sync::Once;
use wiremock::MockServer;

pub const IDENTITY: &str = "0xABC";
pub const TOKEN: &str = "gateway-token";

/// Fast KDF params for testing (low memory/iterations for speed).
pub fn fast_kdf_params() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

/// Points every endpoint at one mock server.
pub fn test_config(server: &MockServer) -> VaultConfig {
    init_tracing();
    VaultConfig {
        publisher_url: server.uri(),
        aggregator_url: server.uri(),
        gateway_base_url: server.uri(),
        explorer_base_url: "https://explorer.test".into(),
        share_base_url: "https://app.test".into(),
        epochs: 5,
        request_timeout_secs: 5,
        max_retries: 1,
        result_display_ms: 60_000,
        kdf: fast_kdf_params(),
    }
}

pub fn session() -> SessionContext {
    SessionContext::new(IDENTITY, AuthToken::new(TOKEN))
}

pub fn newly_created(blob_id: &str, object_id: &str) -> serde_json::Value {
    serde_json::json!({
        "newlyCreated": {
            "blobObject": {
                "id": object_id,
                "storedEpoch": 12,
                "blobId": blob_id,
                "size": 17,
                "encodingType": "RedStuff",
                "certifiedEpoch": 12,
                "storage": { "id": "0xstorage", "startEpoch": 12, "endEpoch": 17, "storageSize": 65023000 },
                "deletable": false
            },
            "resourceOperation": { "registerFromScratch": { "encodedLength": 65023000, "epochsAhead": 5 } },
            "cost": 132300
        }
    })
}

pub fn already_certified(blob_id: &str, tx_digest: &str) -> serde_json::Value {
    serde_json::json!({
        "alreadyCertified": {
            "blobId": blob_id,
            "event": { "txDigest": tx_digest, "eventSeq": "0" },
            "endEpoch": 17
        }
    })
}

pub fn reference_path(record_id: &str) -> String {
    format!("/api/v1.0/erebrus/client/{record_id}/blobId")
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
