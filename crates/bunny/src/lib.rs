//! Bunny Stream client library.
//!
//! Everything the platform needs to talk to the video CDN: the
//! management REST API for creating video slots, the TUS resumable
//! upload driver, the upload state machine used by studio tooling, and
//! embed URL resolution for playback.

pub mod api;
pub mod studio;
pub mod tus;
pub mod upload;

/// Default base URL of the video management API.
pub const DEFAULT_API_BASE: &str = "https://video.bunnycdn.com";

/// Default TUS endpoint uploads are sent to.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://video.bunnycdn.com/tusupload";

/// Default base URL of the embeddable player.
pub const DEFAULT_EMBED_BASE: &str = "https://iframe.mediadelivery.net/embed";

/// Build the embeddable player URL for an uploaded video.
pub fn embed_url(embed_base: &str, library_id: &str, video_id: &str) -> String {
    format!("{embed_base}/{library_id}/{video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_joins_library_and_video() {
        assert_eq!(
            embed_url(DEFAULT_EMBED_BASE, "lib-42", "vid-abc"),
            "https://iframe.mediadelivery.net/embed/lib-42/vid-abc"
        );
    }
}
