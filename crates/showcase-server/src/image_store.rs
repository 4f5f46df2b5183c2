//! Image storage strategies.
//!
//! The upload pipeline hands every validated image to an [`ImageStore`] and
//! keeps whatever [`StoredImage`] comes back. Which store is used is decided
//! once at startup from [`ImageStorage`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use showcase_shared::codec::encode_inline;
use showcase_shared::validation::ImageUpload;
use showcase_shared::StoredImage;

use crate::config::{CloudinaryConfig, ImageStorage};

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("{0}")]
    Encoding(String),

    #[error("{0}")]
    Remote(String),

    #[error("request timed out")]
    Timeout,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Short label used in logs.
    fn kind(&self) -> &'static str;

    /// Turn an uploaded image into its stored representation.
    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError>;
}

/// Build the store selected by configuration.
pub fn from_config(
    storage: &ImageStorage,
    timeout: Duration,
) -> Result<Arc<dyn ImageStore>, ImageStoreError> {
    let store: Arc<dyn ImageStore> = match storage {
        ImageStorage::Inline => Arc::new(InlineImageStore),
        ImageStorage::Cloudinary(config) => {
            Arc::new(RemoteAssetStore::new(config.clone(), timeout)?)
        }
    };
    info!(kind = store.kind(), "Image store initialized");
    Ok(store)
}

// ---------------------------------------------------------------------------
// Inline
// ---------------------------------------------------------------------------

/// Keeps images as base64 inside the product document.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineImageStore;

#[async_trait]
impl ImageStore for InlineImageStore {
    fn kind(&self) -> &'static str {
        "inline"
    }

    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError> {
        let stored = encode_inline(&image.bytes, &image.content_type);
        debug!(size = image.bytes.len(), "Encoded image inline");
        Ok(stored)
    }
}

// ---------------------------------------------------------------------------
// Remote asset service
// ---------------------------------------------------------------------------

/// Uploads images to a Cloudinary-compatible asset service and keeps only
/// the returned URL and asset id.
#[derive(Debug, Clone)]
pub struct RemoteAssetStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadedAsset {
    secure_url: String,
    public_id: String,
}

impl RemoteAssetStore {
    pub fn new(config: CloudinaryConfig, timeout: Duration) -> Result<Self, ImageStoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ImageStoreError::Remote(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ImageStore for RemoteAssetStore {
    fn kind(&self) -> &'static str {
        "cloudinary"
    }

    async fn store(&self, image: &ImageUpload) -> Result<StoredImage, ImageStoreError> {
        let file_name = image
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string());
        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ImageStoreError::Encoding(format!("Invalid content type: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone());

        let url = self.config.upload_url();
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(remote_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageStoreError::Remote(format!(
                "asset service returned {status}: {body}"
            )));
        }

        let asset: UploadedAsset = response.json().await.map_err(remote_error)?;

        info!(
            asset_id = %asset.public_id,
            size = image.bytes.len(),
            "Image uploaded to asset service"
        );

        Ok(StoredImage::External {
            url: asset.secure_url,
            asset_id: asset.public_id,
            content_type: image.content_type.clone(),
        })
    }
}

fn remote_error(e: reqwest::Error) -> ImageStoreError {
    if e.is_timeout() {
        ImageStoreError::Timeout
    } else {
        ImageStoreError::Remote(e.to_string())
    }
}
