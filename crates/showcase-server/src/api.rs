use std::sync::Arc;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::{DefaultBodyLimit, Multipart, State},
    http::{Method, StatusCode},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use showcase_shared::constants::{FIELD_DESCRIPTION, FIELD_IMAGE, FIELD_NAME, FIELD_PRICE};
use showcase_shared::validation::{ImageUpload, SubmissionBundle};
use showcase_shared::{ProductId, ValidationError};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gateway::ProductGateway;
use crate::image_store::ImageStore;
use crate::listing::{ListingQuery, ProductView};
use crate::page;
use crate::pipeline::UploadPipeline;

/// Room for the text fields and multipart framing on top of the image.
const FORM_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<UploadPipeline>,
    pub listing: ListingQuery,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        images: Arc<dyn ImageStore>,
        products: Arc<dyn ProductGateway>,
    ) -> Self {
        let pipeline = UploadPipeline::new(config.upload_policy(), images, products.clone());
        Self {
            pipeline: Arc::new(pipeline),
            listing: ListingQuery::new(products),
        }
    }

    /// Request body ceiling. Larger than the image limit so oversized images
    /// still reach validation and get a proper error.
    fn body_limit(&self) -> usize {
        self.pipeline
            .policy()
            .max_upload_size
            .saturating_add(FORM_OVERHEAD)
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(listing_page))
        .route("/health", get(health_check))
        .route("/api/products", get(list_products))
        .route("/api/upload", post(upload_product))
        .layer(DefaultBodyLimit::max(state.body_limit()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    message: &'static str,
    product_id: ProductId,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn upload_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServerError> {
    let multipart = multipart.map_err(|e| ServerError::MalformedForm(e.body_text()))?;
    let bundle = read_submission(multipart, state.body_limit()).await?;

    let product_id = state.pipeline.submit(bundle).await?;

    Ok(Json(UploadResponse {
        message: "Product uploaded successfully",
        product_id,
    }))
}

/// Collect the submission fields. Unknown fields are skipped; a repeated
/// field keeps its last value.
async fn read_submission(
    mut multipart: Multipart,
    body_limit: usize,
) -> Result<SubmissionBundle, ServerError> {
    let mut bundle = SubmissionBundle::default();
    let form_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::Validation(ValidationError::RequestTooLarge { limit: body_limit })
        } else {
            ServerError::MalformedForm(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            FIELD_IMAGE => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                bundle.image = Some(ImageUpload {
                    bytes,
                    content_type,
                    file_name,
                });
            }
            FIELD_NAME => bundle.name = Some(field.text().await.map_err(form_error)?),
            FIELD_DESCRIPTION => {
                bundle.description = Some(field.text().await.map_err(form_error)?)
            }
            FIELD_PRICE => bundle.price = Some(field.text().await.map_err(form_error)?),
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(bundle)
}

async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductView>>, ServerError> {
    Ok(Json(state.listing.run().await?))
}

async fn listing_page(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let products = state.listing.run().await?;
    Ok(Html(page::render(&products)))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
