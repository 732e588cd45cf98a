use serde::{Deserialize, Serialize};
use url::Url;

use common::crypto::Address;

/// Errors that can occur uploading voucher metadata
#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// What gets uploaded for a minted voucher
#[derive(Debug, Clone, Serialize)]
pub struct VoucherDescriptor {
    pub name: String,
    pub description: String,
    pub minter_name: String,
    pub amount: i64,
}

/// The uploader's answer: a content id plus the stored metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherMetadata {
    pub cid: String,
    pub metadata: serde_json::Value,
}

/// One voucher movement on the community token
///
/// Decoded from a `TransferSingle` event; the id and value stay as hex words
/// since token ids routinely exceed machine integers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherTransfer {
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    pub id: String,
    pub value: String,
    pub transaction_hash: Option<String>,
}

/// Client for the external voucher image/metadata upload service
///
/// An opaque, possibly-failing remote collaborator; no retries here.
#[derive(Debug, Clone)]
pub struct VoucherUploader {
    base_url: Url,
    client: reqwest::Client,
}

impl VoucherUploader {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Upload a voucher descriptor, returning its content id and metadata
    pub async fn upload(
        &self,
        descriptor: &VoucherDescriptor,
    ) -> Result<VoucherMetadata, VoucherError> {
        let url = self
            .base_url
            .join("upload")
            .map_err(|e| VoucherError::Rejected(e.to_string()))?;

        let response = self.client.post(url).json(descriptor).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoucherError::Rejected(format!("{status}: {body}")));
        }

        Ok(response.json().await?)
    }
}
