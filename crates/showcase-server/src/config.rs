//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. A `.env` file in the working
//! directory is read first if present.

use std::net::SocketAddr;
use std::time::Duration;

use showcase_shared::constants::{
    DEFAULT_ALLOWED_IMAGE_TYPES, DEFAULT_ASSET_API_BASE, DEFAULT_ASSET_TIMEOUT_SECS,
    DEFAULT_DATABASE_PATH, DEFAULT_HTTP_PORT, DEFAULT_STORE_TIMEOUT_SECS, MAX_UPLOAD_SIZE,
};
use showcase_shared::validation::UploadPolicy;

/// Where uploaded images end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStorage {
    /// Base64 inside the product document.
    Inline,
    /// Uploaded to a Cloudinary-compatible asset service.
    Cloudinary(CloudinaryConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    /// Env: `CLOUDINARY_API_BASE`
    /// Default: `https://api.cloudinary.com/v1_1`
    pub api_base: String,
    /// Env: `CLOUDINARY_CLOUD_NAME`
    pub cloud_name: String,
    /// Unsigned upload preset.
    /// Env: `CLOUDINARY_UPLOAD_PRESET`
    pub upload_preset: String,
}

impl CloudinaryConfig {
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Document store connection string (SQLite path or `:memory:`).
    /// Env: `DATABASE_PATH`
    /// Default: `./showcase.db`
    pub database_path: String,

    /// Maximum image size in bytes.
    /// Env: `MAX_UPLOAD_SIZE`
    /// Default: 5 MiB
    pub max_upload_size: usize,

    /// Accepted image content types.
    /// Env: `ALLOWED_IMAGE_TYPES` (comma separated)
    /// Default: `image/jpeg,image/png,image/gif,image/webp`
    pub allowed_image_types: Vec<String>,

    /// Env: `IMAGE_STORAGE` (`inline` or `cloudinary`)
    /// Default: `inline`
    pub image_storage: ImageStorage,

    /// Bound on a single document store call.
    /// Env: `STORE_TIMEOUT_SECS`
    /// Default: `10`
    pub store_timeout: Duration,

    /// Bound on a remote asset upload.
    /// Env: `ASSET_TIMEOUT_SECS`
    /// Default: `30`
    pub asset_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            max_upload_size: MAX_UPLOAD_SIZE,
            allowed_image_types: DEFAULT_ALLOWED_IMAGE_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            image_storage: ImageStorage::Inline,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            asset_timeout: Duration::from_secs(DEFAULT_ASSET_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = get("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = get("DATABASE_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = path;
        }

        if let Some(val) = get("MAX_UPLOAD_SIZE") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_size = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_UPLOAD_SIZE, using default"),
            }
        }

        if let Some(val) = get("ALLOWED_IMAGE_TYPES") {
            let types: Vec<String> = val
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if types.is_empty() {
                tracing::warn!("Empty ALLOWED_IMAGE_TYPES, using default");
            } else {
                config.allowed_image_types = types;
            }
        }

        if let Some(val) = get("STORE_TIMEOUT_SECS") {
            match parse_secs(&val) {
                Some(d) => config.store_timeout = d,
                None => tracing::warn!(value = %val, "Invalid STORE_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(val) = get("ASSET_TIMEOUT_SECS") {
            match parse_secs(&val) {
                Some(d) => config.asset_timeout = d,
                None => tracing::warn!(value = %val, "Invalid ASSET_TIMEOUT_SECS, using default"),
            }
        }

        config.image_storage = match get("IMAGE_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("inline") => ImageStorage::Inline,
            Some("cloudinary") => match (
                get("CLOUDINARY_CLOUD_NAME"),
                get("CLOUDINARY_UPLOAD_PRESET"),
            ) {
                (Some(cloud_name), Some(upload_preset))
                    if !cloud_name.is_empty() && !upload_preset.is_empty() =>
                {
                    ImageStorage::Cloudinary(CloudinaryConfig {
                        api_base: get("CLOUDINARY_API_BASE")
                            .filter(|b| !b.is_empty())
                            .unwrap_or_else(|| DEFAULT_ASSET_API_BASE.to_string()),
                        cloud_name,
                        upload_preset,
                    })
                }
                _ => {
                    tracing::warn!(
                        "IMAGE_STORAGE=cloudinary needs CLOUDINARY_CLOUD_NAME and \
                         CLOUDINARY_UPLOAD_PRESET, storing images inline"
                    );
                    ImageStorage::Inline
                }
            },
            Some(other) => {
                tracing::warn!(value = %other, "Unknown IMAGE_STORAGE, storing images inline");
                ImageStorage::Inline
            }
        };

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.max_upload_size, self.allowed_image_types.clone())
    }
}

fn parse_secs(val: &str) -> Option<Duration> {
    match val.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(Duration::from_secs(n)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.max_upload_size, 5 * 1024 * 1024);
        assert_eq!(config.image_storage, ImageStorage::Inline);
        assert_eq!(config.allowed_image_types.len(), 4);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_ADDR", "127.0.0.1:9000"),
            ("DATABASE_PATH", "/tmp/products.db"),
            ("MAX_UPLOAD_SIZE", "1024"),
            ("ALLOWED_IMAGE_TYPES", "image/png, image/avif ,"),
            ("STORE_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_path, "/tmp/products.db");
        assert_eq!(config.max_upload_size, 1024);
        assert_eq!(config.allowed_image_types, ["image/png", "image/avif"]);
        assert_eq!(config.store_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("HTTP_ADDR", "not-an-addr"),
            ("MAX_UPLOAD_SIZE", "lots"),
            ("ASSET_TIMEOUT_SECS", "0"),
            ("ALLOWED_IMAGE_TYPES", " , "),
        ]);
        let default = ServerConfig::default();
        assert_eq!(config.http_addr, default.http_addr);
        assert_eq!(config.max_upload_size, default.max_upload_size);
        assert_eq!(config.asset_timeout, default.asset_timeout);
        assert_eq!(config.allowed_image_types, default.allowed_image_types);
    }

    #[test]
    fn test_cloudinary_storage() {
        let config = config_from(&[
            ("IMAGE_STORAGE", "cloudinary"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_UPLOAD_PRESET", "showcase"),
        ]);
        let ImageStorage::Cloudinary(cloudinary) = config.image_storage else {
            panic!("expected cloudinary storage");
        };
        assert_eq!(
            cloudinary.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(cloudinary.upload_preset, "showcase");
    }

    #[test]
    fn test_cloudinary_without_credentials_falls_back_to_inline() {
        let config = config_from(&[("IMAGE_STORAGE", "cloudinary")]);
        assert_eq!(config.image_storage, ImageStorage::Inline);
    }

    #[test]
    fn test_upload_policy_follows_config() {
        let config = config_from(&[
            ("MAX_UPLOAD_SIZE", "10"),
            ("ALLOWED_IMAGE_TYPES", "image/png"),
        ]);
        let policy = config.upload_policy();
        assert_eq!(policy.max_upload_size, 10);
        assert!(policy.allows("image/png"));
        assert!(!policy.allows("image/jpeg"));
    }
}
