//! Upload lifecycle state machine.
//!
//! [`VideoUpload`] walks one file through sign, transfer, and persist,
//! publishing its phase on a watch channel so UIs can render progress
//! without polling. The phases move idle -> signing -> uploading ->
//! complete, with any failure landing in the error phase. A finished or
//! failed uploader can be run again.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::tus::{TusClient, TusError, UploadMetadata};

/// File extensions the uploader accepts.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi"];

/// A signed upload slot issued by the backend's sign endpoint.
///
/// Serialized camelCase because the signature fields mirror the CDN's
/// TUS authorization headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedSlot {
    /// CDN-assigned id of the video the slot belongs to.
    pub video_id: String,
    /// Library the video lives in.
    pub library_id: String,
    /// Presigned SHA-256 authorization digest.
    pub authorization_signature: String,
    /// Unix timestamp (seconds) the signature expires at.
    pub authorization_expire: i64,
    /// TUS endpoint the transfer targets.
    pub upload_url: String,
}

/// Observable lifecycle of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Signing,
    Uploading { percent: u8 },
    Complete { video_id: String },
    Error { message: String },
}

impl UploadPhase {
    /// Whether a transfer is currently running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadPhase::Signing | UploadPhase::Uploading { .. })
    }
}

/// Errors surfaced by the upload state machine.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The selected file does not look like a video.
    #[error("Please select a video file")]
    NotAVideo,

    /// The sign endpoint rejected the request or was unreachable.
    #[error("{0}")]
    Sign(String),

    /// The chunked transfer failed.
    #[error(transparent)]
    Transfer(#[from] TusError),

    /// The video reached the CDN but its id could not be saved.
    #[error("Upload succeeded but failed to save to database")]
    Persist { detail: String },
}

/// Obtains a signed upload slot, normally from the backend's sign
/// endpoint.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn sign(&self, title: &str) -> Result<SignedSlot, UploadError>;
}

/// Persists the CDN video id once a transfer finishes, normally onto
/// the lesson or content block that owns the upload.
#[async_trait]
pub trait VideoSink: Send + Sync {
    async fn attach(&self, video_id: &str) -> Result<(), UploadError>;
}

/// State machine for a single upload slot in the authoring UI.
///
/// Ownership keeps transfers serial: `run` borrows the machine mutably,
/// so a second transfer cannot start while one is in flight. Observers
/// hold watch receivers from [`VideoUpload::subscribe`] and keep
/// receiving phases across runs.
pub struct VideoUpload {
    phase: watch::Sender<UploadPhase>,
    cancel: CancellationToken,
}

impl VideoUpload {
    pub fn new() -> Self {
        let (phase, _) = watch::channel(UploadPhase::Idle);
        Self {
            phase,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to phase changes.
    pub fn subscribe(&self) -> watch::Receiver<UploadPhase> {
        self.phase.subscribe()
    }

    /// Snapshot of the current phase.
    pub fn phase(&self) -> UploadPhase {
        self.phase.borrow().clone()
    }

    /// Handle that aborts the next `run` when cancelled.
    ///
    /// Grab the handle before calling `run`; cancelling it stops the
    /// transfer at the next request boundary.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive one file through sign, transfer, and persist.
    ///
    /// Returns the CDN video id on success. Every failure is also
    /// published as an error phase; files without a video extension are
    /// rejected before signing and leave the phase untouched.
    pub async fn run(
        &mut self,
        path: &Path,
        title: &str,
        signer: &dyn UploadSigner,
        sink: &dyn VideoSink,
        tus: &TusClient,
    ) -> Result<String, UploadError> {
        if !is_video_file(path) {
            return Err(UploadError::NotAVideo);
        }

        // A cancellation only applies to the run it interrupted.
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }

        self.phase.send_replace(UploadPhase::Signing);
        let slot = match signer.sign(title).await {
            Ok(slot) => slot,
            Err(err) => return Err(self.fail(err)),
        };
        info!(video_id = %slot.video_id, "upload slot signed");

        self.phase.send_replace(UploadPhase::Uploading { percent: 0 });
        let metadata = UploadMetadata {
            filetype: mime_for_video(path).to_string(),
            title: title.to_string(),
        };
        let mut last_percent = 0u8;
        let result = tus
            .upload(
                &slot,
                path,
                &metadata,
                |sent, total| {
                    // The server may report a lower offset after a
                    // probe; never let the bar move backwards.
                    let percent = transfer_percent(sent, total).max(last_percent);
                    last_percent = percent;
                    self.phase.send_replace(UploadPhase::Uploading { percent });
                },
                &self.cancel,
            )
            .await;
        if let Err(err) = result {
            return Err(self.fail(UploadError::Transfer(err)));
        }

        if let Err(err) = sink.attach(&slot.video_id).await {
            let err = match err {
                persist @ UploadError::Persist { .. } => persist,
                other => UploadError::Persist {
                    detail: other.to_string(),
                },
            };
            return Err(self.fail(err));
        }

        self.phase.send_replace(UploadPhase::Complete {
            video_id: slot.video_id.clone(),
        });
        Ok(slot.video_id)
    }

    fn fail(&self, err: UploadError) -> UploadError {
        warn!(error = %err, "upload failed");
        self.phase.send_replace(UploadPhase::Error {
            message: err.to_string(),
        });
        err
    }
}

impl Default for VideoUpload {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the path carries a recognized video extension.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// MIME type advertised in the upload metadata.
fn mime_for_video(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// Percentage of the transfer the server has confirmed.
fn transfer_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (sent as f64 / total as f64) * 100.0;
    percent.round().min(100.0) as u8
}
