//! Share tokens and deep links for uploaded files.
//!
//! A token is the base64 of a [`FileRecord`]'s JSON. It carries everything
//! needed to fetch the file straight from the object store, so honoring a
//! share link never touches the vault gateway. Tokens do not expire; one
//! stays usable for as long as its blob resolves in the store.

use crate::config::base;
use crate::error::{VaultError, VaultResult};
use crate::types::FileRecord;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use reqwest::Url;
use std::fmt;

/// Deep-link route that accepts a share token.
pub const SHARE_ROUTE: &str = "/filedownload";

/// Query parameter carrying the token.
pub const SHARE_QUERY_PARAM: &str = "file";

/// Portable encoded form of one [`FileRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareToken(String);

impl ShareToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a file record into a share token.
pub fn encode(record: &FileRecord) -> VaultResult<ShareToken> {
    let json = serde_json::to_vec(record)?;
    Ok(ShareToken(STANDARD.encode(json)))
}

/// Decodes a share token. Accepts the standard and URL-safe alphabets.
///
/// Links built without percent-encoding the token reach us form-decoded,
/// with every `+` turned into a space; those are restored first.
pub fn decode(token: &ShareToken) -> VaultResult<FileRecord> {
    let raw = token.as_str().trim().replace(' ', "+");
    let bytes = STANDARD
        .decode(&raw)
        .or_else(|_| URL_SAFE.decode(&raw))
        .or_else(|_| URL_SAFE_NO_PAD.decode(&raw))
        .map_err(|e| VaultError::MalformedToken(format!("invalid base64: {e}")))?;

    let record: FileRecord = serde_json::from_slice(&bytes)
        .map_err(|e| VaultError::MalformedToken(format!("invalid record: {e}")))?;

    if record.blob_id.as_str().trim().is_empty() {
        return Err(VaultError::MalformedToken("record has no blob id".to_string()));
    }
    Ok(record)
}

/// Builds `{share_base_url}/filedownload?file={token}`.
pub fn share_link(share_base_url: &str, record: &FileRecord) -> VaultResult<String> {
    let token = encode(record)?;
    let mut url = Url::parse(&format!("{}{SHARE_ROUTE}", base(share_base_url)))
        .map_err(|e| VaultError::Config(format!("invalid share base url: {e}")))?;
    url.query_pairs_mut()
        .append_pair(SHARE_QUERY_PARAM, token.as_str());
    Ok(url.into())
}

/// Extracts the token from a share link.
pub fn token_from_link(link: &str) -> VaultResult<ShareToken> {
    let url = Url::parse(link)
        .map_err(|e| VaultError::MalformedToken(format!("invalid link: {e}")))?;
    url.query_pairs()
        .find(|(key, _)| key == SHARE_QUERY_PARAM)
        .map(|(_, value)| ShareToken(value.into_owned()))
        .ok_or_else(|| VaultError::MalformedToken(format!("link has no `{SHARE_QUERY_PARAM}` parameter")))
}

/// Decodes the file record carried by a share link.
pub fn record_from_link(link: &str) -> VaultResult<FileRecord> {
    decode(&token_from_link(link)?)
}
