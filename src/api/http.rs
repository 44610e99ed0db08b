use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info};

use super::{ApiError, ConfigApi};
use crate::model::{Config, LocationCatalog};

/// [`ConfigApi`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpConfigApi {
    client: Client,
    config_url: Url,
    locations_url: Url,
}

impl HttpConfigApi {
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edgepick/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config_url: endpoint(base, "/api/config")?,
            locations_url: endpoint(base, "/api/locations")?,
        })
    }

    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, ApiError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    base.join(path).map_err(|e| ApiError::Url(e.to_string()))
}

#[async_trait]
impl ConfigApi for HttpConfigApi {
    async fn fetch_config(&self) -> Result<Config, ApiError> {
        let value = self.get_json(&self.config_url).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_locations(&self) -> Result<LocationCatalog, ApiError> {
        let value = self.get_json(&self.locations_url).await?;
        Ok(LocationCatalog::from_wire(value)?)
    }

    async fn save_config(&self, config: &Config) -> Result<(), ApiError> {
        debug!(url = %self.config_url, "POST");
        let response = self.client.post(self.config_url.clone()).json(config).send().await?;
        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "configuration saved");
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Rejected {
            status: status.as_u16(),
            body: rejection_message(status, body),
        })
    }
}

fn rejection_message(status: StatusCode, body: String) -> String {
    let trimmed = body.trim_end();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}
