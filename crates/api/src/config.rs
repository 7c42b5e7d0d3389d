/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight requests on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Video CDN configuration (library credentials, endpoints).
    pub bunny: BunnyConfig,
    /// Local file storage configuration.
    pub storage: StorageConfig,
}

/// Bunny Stream configuration.
///
/// `library_id` and `api_key` have no defaults; while they are unset the
/// server runs with video upload signing disabled and the sign endpoint
/// reports a configuration error.
#[derive(Debug, Clone)]
pub struct BunnyConfig {
    /// Video library id (`BUNNY_LIBRARY_ID`).
    pub library_id: Option<String>,
    /// Library API key (`BUNNY_API_KEY`).
    pub api_key: Option<String>,
    /// Management API base URL.
    pub api_base: String,
    /// TUS endpoint handed to upload clients.
    pub upload_endpoint: String,
    /// Embed player base URL.
    pub embed_base: String,
}

/// Where uploaded files land on disk and how they are served back.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory uploaded files are written under.
    pub upload_dir: String,
    /// Public base URL the stored files are reachable at.
    pub public_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                   |
    /// |--------------------------|-------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                 |
    /// | `PORT`                   | `3000`                                    |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                   |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                                      |
    /// | `BUNNY_LIBRARY_ID`       | (unset)                                   |
    /// | `BUNNY_API_KEY`          | (unset)                                   |
    /// | `BUNNY_API_BASE`         | `https://video.bunnycdn.com`              |
    /// | `BUNNY_UPLOAD_ENDPOINT`  | `https://video.bunnycdn.com/tusupload`    |
    /// | `BUNNY_EMBED_BASE`       | `https://iframe.mediadelivery.net/embed`  |
    /// | `UPLOAD_STORAGE_DIR`     | `storage/uploads`                         |
    /// | `PUBLIC_BASE_URL`        | `http://localhost:3000`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            bunny: BunnyConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

impl BunnyConfig {
    pub fn from_env() -> Self {
        Self {
            library_id: std::env::var("BUNNY_LIBRARY_ID").ok(),
            api_key: std::env::var("BUNNY_API_KEY").ok(),
            api_base: std::env::var("BUNNY_API_BASE")
                .unwrap_or_else(|_| etude_bunny::DEFAULT_API_BASE.into()),
            upload_endpoint: std::env::var("BUNNY_UPLOAD_ENDPOINT")
                .unwrap_or_else(|_| etude_bunny::DEFAULT_UPLOAD_ENDPOINT.into()),
            embed_base: std::env::var("BUNNY_EMBED_BASE")
                .unwrap_or_else(|_| etude_bunny::DEFAULT_EMBED_BASE.into()),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: std::env::var("UPLOAD_STORAGE_DIR")
                .unwrap_or_else(|_| "storage/uploads".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        }
    }
}
