//! Submission validation.
//!
//! A [`SubmissionBundle`] is checked against an [`UploadPolicy`] in a fixed
//! order (presence, size, content type, price) and the first violated rule
//! is reported.

use bytes::Bytes;

use crate::constants::{
    DEFAULT_ALLOWED_IMAGE_TYPES, FIELD_DESCRIPTION, FIELD_IMAGE, FIELD_NAME, FIELD_PRICE,
    MAX_UPLOAD_SIZE,
};
use crate::error::ValidationError;

/// An uploaded image part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// The fields extracted from one multipart upload. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionBundle {
    pub image: Option<ImageUpload>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
}

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub image: ImageUpload,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Limits applied to uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_upload_size: usize,
    /// Lowercase MIME essences, e.g. `image/png`.
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_upload_size: MAX_UPLOAD_SIZE,
            allowed_types: DEFAULT_ALLOWED_IMAGE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn new(max_upload_size: usize, allowed_types: Vec<String>) -> Self {
        Self {
            max_upload_size,
            allowed_types: allowed_types
                .iter()
                .map(|t| mime_essence(t))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn allows(&self, content_type: &str) -> bool {
        let essence = mime_essence(content_type);
        self.allowed_types.iter().any(|t| *t == essence)
    }

    /// Run every rule against `bundle`.
    pub fn validate(
        &self,
        bundle: SubmissionBundle,
    ) -> Result<ValidatedSubmission, ValidationError> {
        let image = bundle
            .image
            .filter(|img| !img.bytes.is_empty())
            .ok_or(ValidationError::MissingField(FIELD_IMAGE))?;
        let name = non_blank(bundle.name).ok_or(ValidationError::MissingField(FIELD_NAME))?;
        let description =
            non_blank(bundle.description).ok_or(ValidationError::MissingField(FIELD_DESCRIPTION))?;
        let raw_price = bundle
            .price
            .ok_or(ValidationError::MissingField(FIELD_PRICE))?;

        if image.bytes.len() > self.max_upload_size {
            return Err(ValidationError::FileTooLarge {
                size: image.bytes.len(),
                max: self.max_upload_size,
            });
        }

        if !self.allows(&image.content_type) {
            return Err(ValidationError::UnsupportedType(image.content_type));
        }

        let price = parse_price(&raw_price)?;

        Ok(ValidatedSubmission {
            image,
            name,
            description,
            price,
        })
    }
}

/// Parse a price as a finite, non-negative decimal.
pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidPrice(raw.to_string());

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    // -0 parses fine; store it as 0.
    Ok(value.abs())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `Image/PNG; charset=x` -> `image/png`
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
