use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned product identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ProductId(pub Uuid);

impl ProductId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a product image is kept. A product carries exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredImage {
    /// Base64 bytes embedded in the product document.
    Inline { data: String, content_type: String },
    /// Hosted by a remote asset service; only the reference is kept.
    External {
        url: String,
        asset_id: String,
        content_type: String,
    },
}

impl StoredImage {
    pub fn content_type(&self) -> &str {
        match self {
            StoredImage::Inline { content_type, .. } => content_type,
            StoredImage::External { content_type, .. } => content_type,
        }
    }

    /// A URL usable as an `<img src>`: the hosted URL, or a `data:` URI
    /// built from the inline bytes.
    pub fn render_src(&self) -> String {
        match self {
            StoredImage::Inline { data, content_type } => {
                format!("data:{content_type};base64,{data}")
            }
            StoredImage::External { url, .. } => url.clone(),
        }
    }
}

/// A product document as built by the upload pipeline, before the store
/// assigns its id and creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: StoredImage,
}

/// A persisted product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: StoredImage,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_render_src_is_data_uri() {
        let image = StoredImage::Inline {
            data: "AAEC".into(),
            content_type: "image/png".into(),
        };
        assert_eq!(image.render_src(), "data:image/png;base64,AAEC");
        assert_eq!(image.content_type(), "image/png");
    }

    #[test]
    fn test_external_render_src_is_url() {
        let image = StoredImage::External {
            url: "https://res.cloudinary.com/demo/image/upload/mug.jpg".into(),
            asset_id: "mug".into(),
            content_type: "image/jpeg".into(),
        };
        assert_eq!(
            image.render_src(),
            "https://res.cloudinary.com/demo/image/upload/mug.jpg"
        );
    }

    #[test]
    fn test_stored_image_json_is_tagged() {
        let image = StoredImage::Inline {
            data: "AAEC".into(),
            content_type: "image/gif".into(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["kind"], "inline");
        assert_eq!(json["content_type"], "image/gif");

        let back: StoredImage = serde_json::from_value(json).unwrap();
        assert_eq!(back, image);
    }

    #[test]
    fn test_product_id_display_parses_back() {
        let id = ProductId::new();
        assert_eq!(ProductId::parse(&id.to_string()).unwrap(), id);
    }
}
