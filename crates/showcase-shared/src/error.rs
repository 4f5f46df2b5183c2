use thiserror::Error;

/// A rejected product submission. Variants are ordered the way the
/// validation stage checks them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("File size {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    /// The request body outgrew the transport limit before the image could
    /// be measured.
    #[error("Request body exceeds the {limit} byte limit")]
    RequestTooLarge { limit: usize },

    #[error("Unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error("Invalid price '{0}': must be a non-negative number")]
    InvalidPrice(String),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image is not stored inline")]
    NotInline,
}
