//! Inline image codec.
//!
//! Images kept inside the product document are stored as standard, padded
//! base64 next to their original content type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CodecError;
use crate::types::StoredImage;

/// Raw image bytes recovered from a stored representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Encode raw bytes as an inline [`StoredImage`].
pub fn encode_inline(bytes: &[u8], content_type: &str) -> StoredImage {
    StoredImage::Inline {
        data: STANDARD.encode(bytes),
        content_type: content_type.to_string(),
    }
}

/// Recover the original bytes of an inline image.
///
/// Externally hosted images have no local bytes and yield
/// [`CodecError::NotInline`].
pub fn decode_inline(image: &StoredImage) -> Result<DecodedImage, CodecError> {
    match image {
        StoredImage::Inline { data, content_type } => Ok(DecodedImage {
            bytes: STANDARD.decode(data)?,
            content_type: content_type.clone(),
        }),
        StoredImage::External { .. } => Err(CodecError::NotInline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_byte_identical() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let stored = encode_inline(&bytes, "image/webp");

        let decoded = decode_inline(&stored).unwrap();
        assert_eq!(decoded.bytes, bytes);
        assert_eq!(decoded.content_type, "image/webp");
    }

    #[test]
    fn test_empty_payload_round_trips() {
        let decoded = decode_inline(&encode_inline(&[], "image/png")).unwrap();
        assert!(decoded.bytes.is_empty());
    }

    #[test]
    fn test_corrupt_base64_rejected() {
        let stored = StoredImage::Inline {
            data: "not base64!!".into(),
            content_type: "image/png".into(),
        };
        assert!(matches!(decode_inline(&stored), Err(CodecError::Base64(_))));
    }

    #[test]
    fn test_external_image_has_no_inline_bytes() {
        let stored = StoredImage::External {
            url: "https://example.com/a.png".into(),
            asset_id: "a".into(),
            content_type: "image/png".into(),
        };
        assert!(matches!(decode_inline(&stored), Err(CodecError::NotInline)));
    }
}
