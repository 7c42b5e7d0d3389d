//! Resumable upload driver speaking the TUS 1.0 protocol.
//!
//! Splits a file into fixed-size chunks and PATCHes them to the CDN's
//! upload endpoint. Transient failures (transport errors, 5xx, offset
//! conflicts) are retried on a fixed schedule; after each failed chunk
//! the server's offset is probed so the transfer resumes where the
//! server actually is rather than where the client thinks it is.

use std::io::SeekFrom;
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::upload::SignedSlot;

/// TUS protocol version sent with every request.
const TUS_VERSION: &str = "1.0.0";

/// Bytes sent per PATCH request.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Delay before each retry of a failed chunk. The first retry is
/// immediate; the transfer fails once the schedule is exhausted.
pub const RETRY_DELAYS_MS: [u64; 5] = [0, 3_000, 5_000, 10_000, 20_000];

/// Metadata attached to the upload via the `Upload-Metadata` header.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    /// MIME type of the file being sent.
    pub filetype: String,
    /// Human-readable title shown in the CDN dashboard.
    pub title: String,
}

/// Errors from a chunked transfer.
#[derive(Debug, thiserror::Error)]
pub enum TusError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upload endpoint returned status {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("Upload protocol error: {0}")]
    Protocol(String),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Upload failed after {attempts} retries: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TusError {
    /// Whether a retry could plausibly succeed.
    fn is_transient(&self) -> bool {
        match self {
            TusError::Request(_) => true,
            // 409 means the server disagrees about the offset; a probe
            // plus retry resolves it.
            TusError::Endpoint { status, .. } => *status >= 500 || *status == 409,
            _ => false,
        }
    }
}

/// Chunked TUS upload client.
pub struct TusClient {
    client: reqwest::Client,
    chunk_size: usize,
    retry_delays: Vec<Duration>,
}

impl TusClient {
    /// Create a client with the standard chunk size and retry schedule.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a client on top of a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            chunk_size: CHUNK_SIZE,
            retry_delays: RETRY_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }

    /// Override the chunk size and retry schedule. Small values keep
    /// tests fast.
    pub fn with_tuning(mut self, chunk_size: usize, retry_delays: Vec<Duration>) -> Self {
        self.chunk_size = chunk_size;
        self.retry_delays = retry_delays;
        self
    }

    /// Upload `path` into the slot described by `slot`.
    ///
    /// `progress` is called with `(bytes_confirmed, total_bytes)` after
    /// the server acknowledges each chunk. Cancelling `cancel` aborts
    /// the transfer at the next request boundary.
    pub async fn upload(
        &self,
        slot: &SignedSlot,
        path: &Path,
        metadata: &UploadMetadata,
        mut progress: impl FnMut(u64, u64),
        cancel: &CancellationToken,
    ) -> Result<(), TusError> {
        let mut file = File::open(path).await?;
        let total = file.metadata().await?.len();

        let resource_url = self.create_session(slot, total, metadata, cancel).await?;
        info!(video_id = %slot.video_id, total_bytes = total, "upload session created");
        progress(0, total);

        let mut offset: u64 = 0;
        let mut attempt: usize = 0;
        while offset < total {
            match self
                .send_chunk(&resource_url, slot, &mut file, offset, total, cancel)
                .await
            {
                Ok(confirmed) => {
                    offset = confirmed;
                    attempt = 0;
                    progress(offset, total);
                }
                Err(err) if err.is_transient() => {
                    if attempt >= self.retry_delays.len() {
                        return Err(TusError::RetriesExhausted {
                            attempts: attempt,
                            last_error: err.to_string(),
                        });
                    }
                    let delay = self.retry_delays[attempt];
                    attempt += 1;
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "chunk failed, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(TusError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    match self.probe_offset(&resource_url, slot, cancel).await {
                        Ok(confirmed) => offset = confirmed,
                        Err(TusError::Cancelled) => return Err(TusError::Cancelled),
                        Err(probe_err) => {
                            warn!(error = %probe_err, "offset probe failed, keeping local offset");
                        }
                    }
                }
                Err(err) => return Err(err),
            }
        }

        info!(video_id = %slot.video_id, total_bytes = total, "upload complete");
        Ok(())
    }

    // ---- private helpers ----

    /// POST the creation request and resolve the upload resource URL
    /// from the `Location` header.
    async fn create_session(
        &self,
        slot: &SignedSlot,
        total: u64,
        metadata: &UploadMetadata,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Url, TusError> {
        let request = self
            .authorize(self.client.post(&slot.upload_url), slot)
            .header("Upload-Length", total.to_string())
            .header(
                "Upload-Metadata",
                encode_metadata(&[
                    ("filetype", &metadata.filetype),
                    ("title", &metadata.title),
                ]),
            );

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(TusError::Cancelled),
            result = request.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TusError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                TusError::Protocol("creation response missing Location header".to_string())
            })?;

        let base = reqwest::Url::parse(&slot.upload_url)
            .map_err(|err| TusError::Protocol(format!("invalid upload endpoint: {err}")))?;
        base.join(location)
            .map_err(|err| TusError::Protocol(format!("invalid Location header: {err}")))
    }

    /// PATCH one chunk starting at `offset` and return the offset the
    /// server confirmed.
    async fn send_chunk(
        &self,
        resource_url: &reqwest::Url,
        slot: &SignedSlot,
        file: &mut File,
        offset: u64,
        total: u64,
        cancel: &CancellationToken,
    ) -> Result<u64, TusError> {
        let chunk_len = (total - offset).min(self.chunk_size as u64) as usize;
        let mut buffer = vec![0u8; chunk_len];
        file.seek(SeekFrom::Start(offset)).await?;
        file.read_exact(&mut buffer).await?;

        let request = self
            .authorize(self.client.patch(resource_url.clone()), slot)
            .header("Upload-Offset", offset.to_string())
            .header("Content-Type", "application/offset+octet-stream")
            .body(buffer);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(TusError::Cancelled),
            result = request.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TusError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let confirmed = header_u64(&response, "Upload-Offset")
            .unwrap_or(offset + chunk_len as u64);
        debug!(offset = confirmed, total, "chunk acknowledged");
        Ok(confirmed)
    }

    /// HEAD the resource to learn how many bytes the server holds.
    async fn probe_offset(
        &self,
        resource_url: &reqwest::Url,
        slot: &SignedSlot,
        cancel: &CancellationToken,
    ) -> Result<u64, TusError> {
        let request = self.authorize(self.client.head(resource_url.clone()), slot);

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(TusError::Cancelled),
            result = request.send() => result?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TusError::Endpoint {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        header_u64(&response, "Upload-Offset")
            .ok_or_else(|| TusError::Protocol("HEAD response missing Upload-Offset".to_string()))
    }

    /// Attach the protocol version and the signed authorization headers.
    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        slot: &SignedSlot,
    ) -> reqwest::RequestBuilder {
        request
            .header("Tus-Resumable", TUS_VERSION)
            .header("AuthorizationSignature", &slot.authorization_signature)
            .header("AuthorizationExpire", slot.authorization_expire.to_string())
            .header("VideoId", &slot.video_id)
            .header("LibraryId", &slot.library_id)
    }
}

impl Default for TusClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode TUS `Upload-Metadata`: comma-separated `key base64(value)`
/// pairs.
fn encode_metadata(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key} {}", BASE64.encode(value)))
        .collect::<Vec<_>>()
        .join(",")
}

fn header_u64(response: &reqwest::Response, name: &str) -> Option<u64> {
    response.headers().get(name)?.to_str().ok()?.parse().ok()
}
