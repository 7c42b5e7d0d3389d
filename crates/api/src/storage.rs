//! Local file storage for uploaded assets.
//!
//! Files land under a root directory and are served back by the static
//! file route mounted at `/files`, so the public URL of a stored file is
//! `{public_base}/files/{key}`.

use std::path::{Path, PathBuf};

/// Writes uploads to disk under a fixed root.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
    public_base: String,
}

/// A file that has been written to the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Key relative to the store root, e.g. `pdfs/1700000000-score.pdf`.
    pub key: String,
    /// Public URL the file is served at.
    pub url: String,
    /// Size in bytes.
    pub size: i64,
}

impl FileStore {
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self { root, public_base }
    }

    /// Root directory files are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` under `{prefix}/{unix_ts}-{filename}` and return the
    /// stored key, public URL, and size.
    ///
    /// Only the final path component of `filename` is kept, so client
    /// supplied names cannot escape the prefix directory, and anything
    /// outside `[A-Za-z0-9._-]` becomes `_` so the key is URL-safe as is.
    pub async fn put(
        &self,
        prefix: &str,
        filename: &str,
        data: &[u8],
    ) -> std::io::Result<StoredFile> {
        let base_name = filename
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("file");
        let safe_name: String = base_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let key = format!("{prefix}/{}-{safe_name}", chrono::Utc::now().timestamp());
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        Ok(StoredFile {
            url: format!("{}/files/{key}", self.public_base),
            key,
            size: data.len() as i64,
        })
    }
}
