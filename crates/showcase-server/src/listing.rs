//! Listing query: every product, newest first, in render-ready form.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use showcase_shared::{Product, ProductId};

use crate::error::ServerError;
use crate::gateway::ProductGateway;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Hosted URL or `data:` URI.
    pub image_src: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            image_src: product.image.render_src(),
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            created_at: product.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ListingQuery {
    products: Arc<dyn ProductGateway>,
}

impl ListingQuery {
    pub fn new(products: Arc<dyn ProductGateway>) -> Self {
        Self { products }
    }

    /// A store failure is returned as an error, never as an empty listing.
    pub async fn run(&self) -> Result<Vec<ProductView>, ServerError> {
        let products = self.products.list_all().await.map_err(|e| {
            tracing::error!(error = %e, "Product listing failed");
            ServerError::from(e)
        })?;
        tracing::debug!(count = products.len(), "Listed products");
        Ok(products.into_iter().map(ProductView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use showcase_shared::codec::encode_inline;
    use showcase_shared::{NewProduct, StoredImage};

    use crate::gateway::{GatewayError, SqliteGateway};

    struct DownGateway;

    #[async_trait]
    impl ProductGateway for DownGateway {
        async fn insert(&self, _product: NewProduct) -> Result<ProductId, GatewayError> {
            Err(GatewayError::Timeout)
        }

        async fn list_all(&self) -> Result<Vec<Product>, GatewayError> {
            Err(GatewayError::Unavailable("connection refused".into()))
        }
    }

    fn product(name: &str, image: StoredImage) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: format!("About {name}"),
            price: 4.0,
            image,
        }
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let gateway = Arc::new(SqliteGateway::new(":memory:", Duration::from_secs(5)));
        assert!(ListingQuery::new(gateway).run().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_views_are_newest_first_with_renderable_images() {
        let gateway = Arc::new(SqliteGateway::new(":memory:", Duration::from_secs(5)));
        gateway
            .insert(product("A", encode_inline(&[1, 2, 3], "image/png")))
            .await
            .unwrap();
        gateway
            .insert(product(
                "B",
                StoredImage::External {
                    url: "https://res.cloudinary.com/demo/b.jpg".into(),
                    asset_id: "b".into(),
                    content_type: "image/jpeg".into(),
                },
            ))
            .await
            .unwrap();

        let views = ListingQuery::new(gateway).run().await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "B");
        assert_eq!(views[0].image_src, "https://res.cloudinary.com/demo/b.jpg");
        assert_eq!(views[1].name, "A");
        assert_eq!(views[1].image_src, "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_listing_is_idempotent() {
        let gateway = Arc::new(SqliteGateway::new(":memory:", Duration::from_secs(5)));
        for name in ["A", "B", "C"] {
            gateway
                .insert(product(name, encode_inline(b"x", "image/gif")))
                .await
                .unwrap();
        }
        let query = ListingQuery::new(gateway);

        let first = query.run().await.unwrap();
        let second = query.run().await.unwrap();
        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_an_empty_list() {
        let err = ListingQuery::new(Arc::new(DownGateway)).run().await.unwrap_err();
        assert!(matches!(err, ServerError::Persistence(_)));
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = ProductView {
            id: ProductId::new(),
            name: "Mug".into(),
            description: "Ceramic mug".into(),
            price: 9.99,
            image_src: "data:image/jpeg;base64,AA==".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["imageSrc"], "data:image/jpeg;base64,AA==");
        assert!(json.get("createdAt").is_some());
    }
}
