//! HTTP-backed implementations of the upload seams.
//!
//! These talk to a running backend: [`SignEndpoint`] requests a slot
//! from the sign route, [`BlockVideoSink`] writes the finished video id
//! onto a content block. Studio tooling wires them into a
//! [`VideoUpload`](crate::upload::VideoUpload) together with a
//! [`TusClient`](crate::tus::TusClient).

use async_trait::async_trait;
use etude_core::DbId;

use crate::upload::{SignedSlot, UploadError, UploadSigner, VideoSink};

/// Signer that calls the backend's video sign route.
pub struct SignEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl SignEndpoint {
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl UploadSigner for SignEndpoint {
    async fn sign(&self, title: &str) -> Result<SignedSlot, UploadError> {
        let url = format!("{}/api/v1/uploads/videos/sign", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(|err| UploadError::Sign(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UploadError::Sign(extract_error_message(&body, status)));
        }

        response
            .json::<SignedSlot>()
            .await
            .map_err(|err| UploadError::Sign(err.to_string()))
    }
}

/// Sink that saves the video id onto a content block via the block
/// update route.
pub struct BlockVideoSink {
    client: reqwest::Client,
    base_url: String,
    lesson_id: DbId,
    block_id: DbId,
}

impl BlockVideoSink {
    pub fn new(base_url: String, lesson_id: DbId, block_id: DbId) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, lesson_id, block_id)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        lesson_id: DbId,
        block_id: DbId,
    ) -> Self {
        Self {
            client,
            base_url,
            lesson_id,
            block_id,
        }
    }
}

#[async_trait]
impl VideoSink for BlockVideoSink {
    async fn attach(&self, video_id: &str) -> Result<(), UploadError> {
        let url = format!(
            "{}/api/v1/lessons/{}/blocks/{}",
            self.base_url, self.lesson_id, self.block_id
        );
        let body = serde_json::json!({
            "type": "video",
            "content": { "video_id": video_id },
        });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| UploadError::Persist {
                detail: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UploadError::Persist {
                detail: extract_error_message(&detail, status),
            });
        }

        Ok(())
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the
/// raw body with its status.
fn extract_error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|message| message.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("status {status}: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_the_json_error_field() {
        let message = extract_error_message(
            r#"{"error":"Title is required","code":"VALIDATION"}"#,
            reqwest::StatusCode::BAD_REQUEST,
        );
        assert_eq!(message, "Title is required");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let message =
            extract_error_message("gateway timeout", reqwest::StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(message, "status 504 Gateway Timeout: gateway timeout");
    }
}
