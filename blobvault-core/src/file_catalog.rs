//! Session-local catalog of uploaded files.
//!
//! Uploads go straight to the object store; nothing is encrypted and the
//! vault is not involved. Entries are keyed by blob id, so uploading the
//! same content twice refreshes the existing entry instead of adding one.

use crate::blob_store::BlobStoreClient;
use crate::error::VaultResult;
use crate::share;
use crate::types::{BlobId, FileRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// A file fetched through a share link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedFile {
    pub record: FileRecord,
    pub data: Vec<u8>,
}

/// Files uploaded during the current session.
pub struct FileCatalog {
    store: Arc<BlobStoreClient>,
    share_base_url: String,
    records: Vec<FileRecord>,
}

impl FileCatalog {
    pub fn new(store: Arc<BlobStoreClient>, share_base_url: impl Into<String>) -> Self {
        Self {
            store,
            share_base_url: share_base_url.into(),
            records: Vec::new(),
        }
    }

    /// Uploads a file and records it in the catalog.
    pub async fn upload_file(
        &mut self,
        file_name: &str,
        media_type: &str,
        data: &[u8],
    ) -> VaultResult<FileRecord> {
        let outcome = self.store.store(data).await?;
        let blob_id = outcome.blob_id().clone();

        let record = FileRecord {
            file_name: file_name.to_string(),
            blob_url: self.store.blob_url(&blob_id),
            object_url: self.store.object_url(&outcome),
            blob_id,
            media_type: media_type.to_string(),
            is_image: media_type.starts_with("image/"),
        };

        self.upsert(record.clone());
        info!("uploaded {file_name} as blob {}", record.blob_id);
        Ok(record)
    }

    fn upsert(&mut self, record: FileRecord) {
        match self.records.iter_mut().find(|r| r.blob_id == record.blob_id) {
            Some(existing) => {
                debug!("refreshing catalog entry for blob {}", record.blob_id);
                *existing = record;
            }
            None => self.records.push(record),
        }
    }

    /// Records in upload order.
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, blob_id: &BlobId) -> Option<&FileRecord> {
        self.records.iter().find(|r| &r.blob_id == blob_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Downloads a record's bytes from the store.
    pub async fn download(&self, record: &FileRecord) -> VaultResult<Vec<u8>> {
        self.store.retrieve(&record.blob_id).await
    }

    /// Builds a share link for a record.
    pub fn share_link(&self, record: &FileRecord) -> VaultResult<String> {
        share::share_link(&self.share_base_url, record)
    }
}

/// Honors a share link: decodes it locally and fetches the blob directly.
pub async fn open_share_link(store: &BlobStoreClient, link: &str) -> VaultResult<SharedFile> {
    let record = share::record_from_link(link)?;
    let data = store.retrieve(&record.blob_id).await?;
    Ok(SharedFile { record, data })
}
