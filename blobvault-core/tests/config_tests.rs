use blobvault_core::{VaultConfig, VaultError};
use std::time::Duration;

#[test]
fn default_endpoints() {
    let config = VaultConfig::default();
    assert_eq!(config.publisher_url, "https://publisher-devnet.walrus.space");
    assert_eq!(config.aggregator_url, "https://aggregator-devnet.walrus.space");
    assert_eq!(config.explorer_base_url, "https://suiscan.xyz/testnet");
}

#[test]
fn default_epochs() {
    assert_eq!(VaultConfig::default().epochs, 5);
}

#[test]
fn default_timeout_and_retry() {
    let config = VaultConfig::default();
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.max_retries, 1);
}

#[test]
fn default_result_display() {
    assert_eq!(VaultConfig::default().result_display(), Duration::from_secs(5));
}

#[test]
fn default_is_valid() {
    assert!(VaultConfig::default().validate().is_ok());
}

#[test]
fn empty_url_rejected() {
    let mut config = VaultConfig::default();
    config.gateway_base_url = "  ".into();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, VaultError::Config(ref msg) if msg.contains("gateway_base_url")));
}

#[test]
fn zero_epochs_rejected() {
    let mut config = VaultConfig::default();
    config.epochs = 0;
    assert!(matches!(config.validate(), Err(VaultError::Config(_))));
}

#[test]
fn zero_timeout_rejected() {
    let mut config = VaultConfig::default();
    config.request_timeout_secs = 0;
    assert!(matches!(config.validate(), Err(VaultError::Config(_))));
}

#[test]
fn serialization_roundtrip() {
    let config = VaultConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: VaultConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.publisher_url, config.publisher_url);
    assert_eq!(deserialized.gateway_base_url, config.gateway_base_url);
    assert_eq!(deserialized.epochs, config.epochs);
    assert_eq!(deserialized.max_retries, config.max_retries);
    assert_eq!(deserialized.kdf, config.kdf);
}

#[test]
fn kdf_defaults_when_missing() {
    let mut value = serde_json::to_value(VaultConfig::default()).unwrap();
    value.as_object_mut().unwrap().remove("kdf");
    let config: VaultConfig = serde_json::from_value(value).unwrap();
    assert_eq!(config.kdf, blobvault_crypto::KdfParams::default());
}
