use std::env;
use std::path::PathBuf;

/// Shared-secret token accepted by the delete endpoint when none is
/// configured. Matches the original deployment default.
const DEFAULT_DELETE_TOKEN: &str = "secret";

/// Runtime configuration for the upload service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on (default: 3000)
    pub port: u16,

    /// Root directory of the storage tree (default: "uploads")
    pub uploads_dir: PathBuf,

    /// Base URL prefixed to every retrieval URL (default: "http://localhost:<port>")
    pub public_base_url: String,

    /// Shared secret required by the delete endpoint
    pub delete_token: String,

    /// Maximum accepted file size in bytes (default: 100 MiB)
    pub max_file_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            uploads_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:3000".to_string(),
            delete_token: DEFAULT_DELETE_TOKEN.to_string(),
            max_file_size: 100 * 1024 * 1024, // 100 MiB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.port);

        Self {
            port,

            uploads_dir: env::var("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.uploads_dir),

            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),

            delete_token: env::var("DELETE_TOKEN").unwrap_or(default.delete_token),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }
}
