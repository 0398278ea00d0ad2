//! Save workflow: PIN → upload → encrypt reference → persist → report.
//!
//! An explicit state machine, one instance per record id:
//!
//! ```text
//! Idle → AwaitingPin → Uploading ─┬─────────────────────────────→ Succeeded
//!                                 └→ Encrypting → Persisting ──→ Succeeded
//!                      (any stage) ──────────────────────────────→ Failed
//! ```
//!
//! Terminal states fall back to `Idle` once the configured display timeout
//! has passed, or immediately on [`SaveWorkflow::acknowledge`]. Observers
//! registered with [`SaveWorkflow::subscribe`] see every transition in order.
//!
//! The PIN and the derived key exist only inside a single run and are
//! zeroized when it ends. Neither is logged.

use crate::blob_store::BlobStoreClient;
use crate::config::VaultConfig;
use crate::error::{ErrorKind, VaultError, VaultResult};
use crate::session::SessionContext;
use crate::types::{BlobId, RecordId, StoreOutcome};
use crate::vault_client::VaultGatewayClient;
use blobvault_crypto::{EncryptedReference, KdfParams, derive_pin_key, seal_reference};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Required PIN length, in digits.
pub const PIN_LENGTH: usize = 6;

/// Shown when a new reference was persisted.
pub const SAVED_MESSAGE: &str = "Configuration saved successfully!";

/// Shown when the store already held identical content.
pub const ALREADY_SAVED_MESSAGE: &str = "Configuration is already saved.";

/// Workflow states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SaveState {
    Idle,
    AwaitingPin,
    Uploading,
    Encrypting,
    Persisting,
    Succeeded,
    Failed,
}

impl SaveState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingPin => "awaiting-pin",
            Self::Uploading => "uploading",
            Self::Encrypting => "encrypting",
            Self::Persisting => "persisting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What observers see on each transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveStatus {
    pub state: SaveState,
    /// User-facing message for terminal states and rejected PINs.
    pub message: Option<String>,
    /// Classification of the last failure, if any.
    pub error: Option<ErrorKind>,
}

impl SaveStatus {
    fn plain(state: SaveState) -> Self {
        Self {
            state,
            message: None,
            error: None,
        }
    }
}

/// How a successful run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The store already held this content; the vault was not touched.
    AlreadyCertified,
    /// A new blob was created and its encrypted reference persisted.
    Persisted,
}

/// Summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    pub record_id: RecordId,
    pub blob_id: BlobId,
    pub outcome: SaveOutcome,
    pub completed_at: DateTime<Utc>,
}

type Observer = Box<dyn Fn(&SaveStatus) + Send + Sync>;

/// Drives one record's configuration through the save pipeline.
///
/// `Busy` is tracked per instance. Hosts keep one workflow per record id;
/// two instances built for the same record do not see each other's runs.
///
/// Dropping a `submit_pin` future after the upload has started moves the
/// workflow to `Failed` with a network classification.
pub struct SaveWorkflow {
    store: Arc<BlobStoreClient>,
    vault: Arc<VaultGatewayClient>,
    session: SessionContext,
    record_id: RecordId,
    payload: Vec<u8>,
    kdf: KdfParams,
    display_timeout: Duration,
    status: SaveStatus,
    terminal_since: Option<Instant>,
    observers: Vec<Observer>,
}

impl SaveWorkflow {
    pub fn new(
        config: &VaultConfig,
        store: Arc<BlobStoreClient>,
        vault: Arc<VaultGatewayClient>,
        session: SessionContext,
        record_id: RecordId,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            store,
            vault,
            session,
            record_id,
            payload,
            kdf: config.kdf.clone(),
            display_timeout: config.result_display(),
            status: SaveStatus::plain(SaveState::Idle),
            terminal_since: None,
            observers: Vec::new(),
        }
    }

    /// Builds the store and gateway clients from `config`.
    pub fn connect(
        config: &VaultConfig,
        session: SessionContext,
        record_id: RecordId,
        payload: Vec<u8>,
    ) -> VaultResult<Self> {
        let store = Arc::new(BlobStoreClient::new(config)?);
        let vault = Arc::new(VaultGatewayClient::new(config)?);
        Ok(Self::new(config, store, vault, session, record_id, payload))
    }

    /// Registers a callback invoked on every state change.
    pub fn subscribe(&mut self, observer: impl Fn(&SaveStatus) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Current status, after applying the display timeout.
    pub fn status(&mut self) -> SaveStatus {
        self.expire_result();
        self.status.clone()
    }

    pub fn state(&mut self) -> SaveState {
        self.status().state
    }

    /// `Idle → AwaitingPin`. Rejected with `Busy` from any other state.
    pub fn start(&mut self) -> VaultResult<()> {
        self.expire_result();
        if self.status.state != SaveState::Idle {
            debug!(
                "start rejected for record {} in state {}",
                self.record_id, self.status.state
            );
            return Err(VaultError::Busy(self.record_id.to_string()));
        }
        self.transition(SaveStatus::plain(SaveState::AwaitingPin));
        Ok(())
    }

    /// Abandons the PIN prompt. Only possible before anything was uploaded.
    pub fn cancel(&mut self) -> VaultResult<()> {
        self.expire_result();
        match self.status.state {
            SaveState::Idle => Ok(()),
            SaveState::AwaitingPin => {
                self.transition(SaveStatus::plain(SaveState::Idle));
                Ok(())
            }
            SaveState::Succeeded | SaveState::Failed => {
                self.acknowledge();
                Ok(())
            }
            SaveState::Uploading | SaveState::Encrypting | SaveState::Persisting => {
                Err(VaultError::Busy(self.record_id.to_string()))
            }
        }
    }

    /// Dismisses a terminal result.
    pub fn acknowledge(&mut self) {
        if self.status.state.is_terminal() {
            self.transition(SaveStatus::plain(SaveState::Idle));
        }
    }

    /// Validates the PIN and runs the save to a terminal state.
    ///
    /// A rejected PIN leaves the workflow in `AwaitingPin` without any
    /// network call. Once the upload has begun the run always ends in
    /// `Succeeded` or `Failed`.
    pub async fn submit_pin(&mut self, pin: &str, confirm_pin: &str) -> VaultResult<SaveReport> {
        self.expire_result();
        match self.status.state {
            SaveState::AwaitingPin => {}
            SaveState::Idle => {
                return Err(VaultError::Validation(
                    "no save in progress; start one first".to_string(),
                ));
            }
            _ => return Err(VaultError::Busy(self.record_id.to_string())),
        }

        let pin = Zeroizing::new(pin.to_string());
        if let Err(err) = validate_pin(&pin, confirm_pin) {
            self.transition(SaveStatus {
                state: SaveState::AwaitingPin,
                message: Some(err.user_message()),
                error: Some(err.kind()),
            });
            return Err(err);
        }

        let span = info_span!("save", record_id = %self.record_id, run_id = %Uuid::now_v7());
        let result = {
            let mut guard = RunGuard::arm(self);
            let result = guard.workflow.run(pin).instrument(span).await;
            guard.disarm();
            result
        };
        match result {
            Ok(report) => {
                let message = match report.outcome {
                    SaveOutcome::AlreadyCertified => ALREADY_SAVED_MESSAGE,
                    SaveOutcome::Persisted => SAVED_MESSAGE,
                };
                self.transition(SaveStatus {
                    state: SaveState::Succeeded,
                    message: Some(message.to_string()),
                    error: None,
                });
                Ok(report)
            }
            Err(err) => {
                warn!("save for record {} failed: {err}", self.record_id);
                self.transition(SaveStatus {
                    state: SaveState::Failed,
                    message: Some(err.user_message()),
                    error: Some(err.kind()),
                });
                Err(err)
            }
        }
    }

    async fn run(&mut self, pin: Zeroizing<String>) -> VaultResult<SaveReport> {
        self.transition(SaveStatus::plain(SaveState::Uploading));
        let outcome = self.store.store(&self.payload).await?;

        let blob_id = match outcome {
            StoreOutcome::AlreadyCertified { blob_id, .. } => {
                info!("content already certified as blob {blob_id}, skipping vault");
                return Ok(self.report(blob_id, SaveOutcome::AlreadyCertified));
            }
            StoreOutcome::NewlyCreated { blob_id, .. } => blob_id,
        };

        self.transition(SaveStatus::plain(SaveState::Encrypting));
        let sealed = self.seal(&blob_id, pin)?;

        self.transition(SaveStatus::plain(SaveState::Persisting));
        self.vault
            .persist_encrypted_reference(&self.record_id, &sealed, self.session.token())
            .await?;

        info!("saved blob {blob_id} for record {}", self.record_id);
        Ok(self.report(blob_id, SaveOutcome::Persisted))
    }

    /// Derives the key and seals the reference. Both secrets drop here.
    fn seal(&self, blob_id: &BlobId, pin: Zeroizing<String>) -> VaultResult<EncryptedReference> {
        let key = derive_pin_key(self.session.identity().as_str(), &pin, &self.kdf)?;
        Ok(seal_reference(blob_id.as_str(), &key)?)
    }

    fn report(&self, blob_id: BlobId, outcome: SaveOutcome) -> SaveReport {
        SaveReport {
            record_id: self.record_id.clone(),
            blob_id,
            outcome,
            completed_at: Utc::now(),
        }
    }

    fn transition(&mut self, status: SaveStatus) {
        debug!(
            "record {}: {} -> {}",
            self.record_id, self.status.state, status.state
        );
        self.terminal_since = status.state.is_terminal().then(Instant::now);
        self.status = status;
        for observer in &self.observers {
            observer(&self.status);
        }
    }

    fn expire_result(&mut self) {
        if let Some(since) = self.terminal_since {
            if since.elapsed() >= self.display_timeout {
                self.transition(SaveStatus::plain(SaveState::Idle));
            }
        }
    }
}

/// Fails the run if the `submit_pin` future is dropped before it finishes.
struct RunGuard<'a> {
    workflow: &'a mut SaveWorkflow,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn arm(workflow: &'a mut SaveWorkflow) -> Self {
        Self {
            workflow,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed || self.workflow.status.state.is_terminal() {
            return;
        }
        let err = VaultError::Network(format!(
            "save interrupted during {}",
            self.workflow.status.state
        ));
        warn!("save for record {} abandoned: {err}", self.workflow.record_id);
        self.workflow.transition(SaveStatus {
            state: SaveState::Failed,
            message: Some(err.user_message()),
            error: Some(err.kind()),
        });
    }
}

fn validate_pin(pin: &str, confirm_pin: &str) -> VaultResult<()> {
    if pin.chars().count() != PIN_LENGTH || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(VaultError::Validation(format!(
            "Please enter a valid {PIN_LENGTH}-digit PIN"
        )));
    }
    if pin != confirm_pin {
        return Err(VaultError::Validation(
            "PIN and confirmation PIN do not match".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_must_be_six_digits() {
        assert!(validate_pin("123456", "123456").is_ok());
        assert!(validate_pin("12345", "12345").is_err());
        assert!(validate_pin("1234567", "1234567").is_err());
        assert!(validate_pin("12345a", "12345a").is_err());
        assert!(validate_pin("", "").is_err());
    }

    #[test]
    fn pin_must_match_confirmation() {
        let err = validate_pin("123456", "123457").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn terminal_states() {
        assert!(SaveState::Succeeded.is_terminal());
        assert!(SaveState::Failed.is_terminal());
        assert!(!SaveState::Persisting.is_terminal());
        assert!(!SaveState::Idle.is_terminal());
    }
}
