use std::env;
use thiserror::Error;

/// Feed page size used when `FEED_PAGE_SIZE` is not set.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid environment variable format for {0}: {1}")]
    InvalidVar(String, String),
    #[error(transparent)]
    DotEnvError(#[from] dotenvy::Error),
}

#[derive(Clone, Debug)] // Clone needed if passed around, Debug for logging
pub struct Config {
    pub posts_table: String,
    pub media_bucket: String,
    // Store region as string for simplicity here, aws_clients can convert
    pub aws_region: String,
    pub page_size: u32,
    // Public/CDN base joined with object keys to form stored image URLs
    pub media_base_url: Option<String>,
    // Optional endpoint for LocalStack
    pub localstack_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignores errors, relies on env vars otherwise)
        dotenvy::dotenv().ok();

        let posts_table = env::var("POSTS_TABLE_NAME").unwrap_or_else(|_| "posts".to_string());

        let media_bucket = env::var("POST_MEDIA_BUCKET")
            .map_err(|_| ConfigError::MissingVar("POST_MEDIA_BUCKET".into()))?;

        let aws_region =
            env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "ca-central-1".to_string());

        let page_size = match env::var("FEED_PAGE_SIZE") {
            Ok(raw) => {
                let parsed: u32 = raw
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        ConfigError::InvalidVar("FEED_PAGE_SIZE".into(), e.to_string())
                    })?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidVar(
                        "FEED_PAGE_SIZE".into(),
                        "page size must be at least 1".into(),
                    ));
                }
                parsed
            }
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        let media_base_url = env::var("MEDIA_BASE_URL").ok();

        // Allow overriding endpoint for localstack/testing
        let localstack_endpoint = env::var("AWS_ENDPOINT_URL").ok(); // Optional

        Ok(Config {
            posts_table,
            media_bucket,
            aws_region,
            page_size,
            media_base_url,
            localstack_endpoint,
        })
    }
}
