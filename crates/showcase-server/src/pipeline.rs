//! Upload pipeline.
//!
//! One submission moves through
//! `Received -> Validated -> Encoded -> Persisted -> Acknowledged`
//! or stops at `Rejected`, `EncodingFailed` or `PersistenceFailed`.
//! Nothing is retried and nothing is persisted unless every earlier stage
//! succeeded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use showcase_shared::validation::{SubmissionBundle, UploadPolicy};
use showcase_shared::{NewProduct, ProductId};

use crate::error::ServerError;
use crate::gateway::ProductGateway;
use crate::image_store::ImageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Validated,
    Encoded,
    Persisted,
    Acknowledged,
    Rejected,
    EncodingFailed,
    PersistenceFailed,
}

impl UploadStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadStage::Acknowledged
                | UploadStage::Rejected
                | UploadStage::EncodingFailed
                | UploadStage::PersistenceFailed
        )
    }
}

/// Tracks the stage of one submission for diagnostics.
struct Progress {
    stage: UploadStage,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: UploadStage::Received,
        }
    }

    fn advance(&mut self, next: UploadStage) {
        debug!(
            from = ?self.stage,
            to = ?next,
            terminal = next.is_terminal(),
            "Upload stage"
        );
        self.stage = next;
    }
}

#[derive(Clone)]
pub struct UploadPipeline {
    policy: UploadPolicy,
    images: Arc<dyn ImageStore>,
    products: Arc<dyn ProductGateway>,
}

impl UploadPipeline {
    pub fn new(
        policy: UploadPolicy,
        images: Arc<dyn ImageStore>,
        products: Arc<dyn ProductGateway>,
    ) -> Self {
        Self {
            policy,
            images,
            products,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate, store the image, persist the product, and return its id.
    pub async fn submit(&self, bundle: SubmissionBundle) -> Result<ProductId, ServerError> {
        let mut progress = Progress::new();

        let submission = match self.policy.validate(bundle) {
            Ok(submission) => submission,
            Err(e) => {
                progress.advance(UploadStage::Rejected);
                warn!(reason = %e, "Upload rejected");
                return Err(e.into());
            }
        };
        progress.advance(UploadStage::Validated);

        let image = match self.images.store(&submission.image).await {
            Ok(image) => image,
            Err(e) => {
                progress.advance(UploadStage::EncodingFailed);
                tracing::error!(
                    store = self.images.kind(),
                    error = %e,
                    "Image storage failed"
                );
                return Err(e.into());
            }
        };
        debug!(
            store = self.images.kind(),
            content_type = image.content_type(),
            "Image stored"
        );
        progress.advance(UploadStage::Encoded);

        let document = NewProduct {
            name: submission.name,
            description: submission.description,
            price: submission.price,
            image,
        };

        let id = match self.products.insert(document).await {
            Ok(id) => id,
            Err(e) => {
                progress.advance(UploadStage::PersistenceFailed);
                tracing::error!(error = %e, "Product insert failed");
                return Err(e.into());
            }
        };
        progress.advance(UploadStage::Persisted);

        info!(
            id = %id,
            size = submission.image.bytes.len(),
            content_type = %submission.image.content_type,
            "Product uploaded"
        );
        progress.advance(UploadStage::Acknowledged);

        Ok(id)
    }
}
