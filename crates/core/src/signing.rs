//! Upload authorization signatures for the video CDN.
//!
//! The CDN's resumable upload endpoint authenticates each transfer with a
//! presigned digest: `hex(sha256(library_id + api_key + expire + video_id))`
//! where `expire` is a unix timestamp in seconds. The api crate computes
//! the signature at sign time; uploaders forward it verbatim in the
//! `AuthorizationSignature` / `AuthorizationExpire` headers.

use sha2::{Digest, Sha256};

/// Presigned upload authorizations are valid for one hour.
pub const PRESIGN_TTL_SECS: i64 = 3600;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute the upload authorization signature for a signed video slot.
pub fn upload_signature(
    library_id: &str,
    api_key: &str,
    expires_unix: i64,
    video_id: &str,
) -> String {
    sha256_hex(format!("{library_id}{api_key}{expires_unix}{video_id}").as_bytes())
}
