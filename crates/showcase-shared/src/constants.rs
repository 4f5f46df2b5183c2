/// Application name
pub const APP_NAME: &str = "Product Showcase";

/// Maximum image upload size in bytes (5 MiB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Image content types accepted by default
pub const DEFAULT_ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Multipart field names of a product submission
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_NAME: &str = "name";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRICE: &str = "price";

/// Characters of description shown on a listing card
pub const DESCRIPTION_PREVIEW_CHARS: usize = 120;

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default SQLite database path
pub const DEFAULT_DATABASE_PATH: &str = "./showcase.db";

/// Default bound on a single document store call, in seconds
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Default bound on a remote asset upload, in seconds
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 30;

/// Default Cloudinary-compatible upload API base
pub const DEFAULT_ASSET_API_BASE: &str = "https://api.cloudinary.com/v1_1";
