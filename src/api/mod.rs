//! Remote configuration API -- `/api/config` and `/api/locations`.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Config, LocationCatalog};

pub use self::http::HttpConfigApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Save rejected; the server's message is shown as-is.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint url: {0}")]
    Url(String),
}

/// Load and save operations against the remote configuration API.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    async fn fetch_config(&self) -> Result<Config, ApiError>;

    async fn fetch_locations(&self) -> Result<LocationCatalog, ApiError>;

    /// Overwrites the persisted configuration.
    async fn save_config(&self, config: &Config) -> Result<(), ApiError>;
}
