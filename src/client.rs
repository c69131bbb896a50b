//! HTTP client for the catalog backend
//!
//! Every source lives under its own path prefix on one backend; requests are
//! built as `{api_url}{base_path}{method}`.

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::error::{HubError, Result};

/// Backend method names, appended to a source's base path.
pub mod endpoints {
    pub const CONSOLE_DATA: &str = "console_data/";
    pub const OWNED_GAMES: &str = "owned_games/";
    pub const GAME_DATA: &str = "game_data/";
    pub const FULL_GAME_DATA: &str = "full_game_data/";
    pub const COMPLETION_PROGRESS: &str = "completion_progress/";
    pub const COMPARE_DATA: &str = "compare_data/";
    pub const EXISTING_DATA: &str = "existing_data/";
    pub const WRITE_DATABASE: &str = "write_database/";
}

/// HTTP client for the catalog backend
pub struct CatalogClient {
    api_url: String,
    client: Client,
}

impl CatalogClient {
    /// Create a client for the backend rooted at `api_url`.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        let mut api_url = api_url.into();
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Ok(Self { api_url, client })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of `method` under `base_path`.
    pub fn url(&self, base_path: &str, method: &str) -> String {
        format!("{}{}{}", self.api_url, base_path, method)
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, base_path: &str, method: &str) -> Result<T> {
        let url = self.url(base_path, method);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).send().await?;
        let body = Self::check_status(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET an endpoint whose body carries no information.
    pub async fn get_ack(&self, base_path: &str, method: &str) -> Result<()> {
        let url = self.url(base_path, method);
        debug!(url = %url, "GET (ack)");

        let response = self.client.get(&url).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match status {
            StatusCode::NOT_FOUND => format!("{} not found", response.url().path()),
            _ => response.text().await.unwrap_or_default(),
        };
        Err(HubError::Server {
            status: status.as_u16(),
            message,
        })
    }
}
