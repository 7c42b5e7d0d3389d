//! Content block payloads.
//!
//! A lesson body is a sequence of typed blocks. The payload is a closed
//! union keyed by a `type` tag; the same serialized form is stored in the
//! `content` jsonb column and served over the API, so adding a variant
//! here is a storage and wire change at once. Unknown tags fail at the
//! serde boundary instead of round-tripping as opaque blobs.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Type tag constants
// ---------------------------------------------------------------------------

/// Rich text block.
pub const BLOCK_TYPE_TEXT: &str = "text";
/// CDN-hosted video block.
pub const BLOCK_TYPE_VIDEO: &str = "video";
/// Sheet music PDF block.
pub const BLOCK_TYPE_SHEET_MUSIC: &str = "sheet_music";
/// Audio sample block.
pub const BLOCK_TYPE_AUDIO: &str = "audio";

/// All valid content block type tags.
pub const VALID_BLOCK_TYPES: &[&str] = &[
    BLOCK_TYPE_TEXT,
    BLOCK_TYPE_VIDEO,
    BLOCK_TYPE_SHEET_MUSIC,
    BLOCK_TYPE_AUDIO,
];

// ---------------------------------------------------------------------------
// Payload union
// ---------------------------------------------------------------------------

/// Payload of a single content block, adjacently tagged as
/// `{"type": ..., "content": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum BlockContent {
    /// Raw HTML fragment authored in the studio, stored verbatim.
    Text { html: String },
    /// Remote video reference; `video_id` stays None until an upload
    /// handshake completes.
    Video { video_id: Option<String> },
    /// Sheet music PDF held in the file store.
    SheetMusic {
        pdf_url: Option<String>,
        filename: Option<String>,
    },
    /// Practice audio sample.
    Audio {
        audio_url: Option<String>,
        title: Option<String>,
    },
}

impl BlockContent {
    /// The stable type tag for this payload.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockContent::Text { .. } => BLOCK_TYPE_TEXT,
            BlockContent::Video { .. } => BLOCK_TYPE_VIDEO,
            BlockContent::SheetMusic { .. } => BLOCK_TYPE_SHEET_MUSIC,
            BlockContent::Audio { .. } => BLOCK_TYPE_AUDIO,
        }
    }

    /// The empty payload a freshly added block of `kind` starts with, or
    /// None for an unknown tag.
    pub fn empty(kind: &str) -> Option<Self> {
        match kind {
            BLOCK_TYPE_TEXT => Some(BlockContent::Text {
                html: String::new(),
            }),
            BLOCK_TYPE_VIDEO => Some(BlockContent::Video { video_id: None }),
            BLOCK_TYPE_SHEET_MUSIC => Some(BlockContent::SheetMusic {
                pdf_url: None,
                filename: None,
            }),
            BLOCK_TYPE_AUDIO => Some(BlockContent::Audio {
                audio_url: None,
                title: None,
            }),
            _ => None,
        }
    }
}
