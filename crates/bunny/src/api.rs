//! REST client for the CDN's video management API.
//!
//! Covers the small slice of the management surface the platform uses:
//! creating a video slot ahead of a TUS upload and fetching video
//! details for diagnostics.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Client for the video management API of a single library.
pub struct BunnyApi {
    client: reqwest::Client,
    api_base: String,
    library_id: String,
    api_key: String,
}

/// Response from creating a video slot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedVideo {
    /// Server-assigned video id, used in upload headers and embeds.
    pub guid: String,
}

/// Errors from management API operations.
#[derive(Debug, thiserror::Error)]
pub enum BunnyApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error status {status}: {body}")]
    ApiError { status: u16, body: String },
}

impl BunnyApi {
    /// Create a client for one library.
    pub fn new(api_base: String, library_id: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_base, library_id, api_key)
    }

    /// Create a client with a custom reqwest client (for timeouts, proxies).
    pub fn with_client(
        client: reqwest::Client,
        api_base: String,
        library_id: String,
        api_key: String,
    ) -> Self {
        Self {
            client,
            api_base,
            library_id,
            api_key,
        }
    }

    /// The library this client operates on.
    pub fn library_id(&self) -> &str {
        &self.library_id
    }

    /// The API key for this library.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Create an empty video slot titled `title` and return its id.
    ///
    /// The slot holds no media until a TUS upload targets it.
    pub async fn create_video(&self, title: &str) -> Result<CreatedVideo, BunnyApiError> {
        let url = format!("{}/library/{}/videos", self.api_base, self.library_id);
        let response = self
            .client
            .post(&url)
            .header("AccessKey", &self.api_key)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await?;

        self.parse_response(response).await
    }

    /// Fetch the raw details of a video (status, encode progress).
    pub async fn get_video(&self, video_id: &str) -> Result<serde_json::Value, BunnyApiError> {
        let url = format!(
            "{}/library/{}/videos/{}",
            self.api_base, self.library_id, video_id
        );
        let response = self
            .client
            .get(&url)
            .header("AccessKey", &self.api_key)
            .send()
            .await?;

        self.parse_response(response).await
    }

    // ---- private helpers ----

    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BunnyApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BunnyApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
