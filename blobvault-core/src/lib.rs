//! Blob reference vault.
//!
//! Uploads payloads to a content-addressed object store and keeps only an
//! encrypted reference to them in a remote vault gateway:
//! - Publisher/aggregator client with dedupe-aware upload results
//! - Vault gateway client with bearer auth and a single transient retry
//! - PIN-gated save workflow as an explicit, observable state machine
//! - Recovery of saved configurations from (record id, PIN)
//! - Session file catalog and portable share links

pub mod blob_store;
pub mod config;
pub mod error;
pub mod file_catalog;
pub mod recovery;
pub mod retry;
pub mod save_workflow;
pub mod session;
pub mod share;
pub mod types;
pub mod vault_client;

pub use config::VaultConfig;
pub use error::{ErrorKind, VaultError, VaultResult};
pub use types::*;
