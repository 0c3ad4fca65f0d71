use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A persisted object plus its derived metadata. `url`, `size` and
/// `uploadedAt` are computed from the filesystem at read time; nothing
/// besides the file itself is stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Generated name: 16 hex characters plus the original extension.
    pub filename: String,
    /// Slash-separated path relative to the storage root, empty for root.
    pub folder: String,
    pub url: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// One entry of the volatile activity feed. Not authoritative: the
/// inventory endpoint re-walks the storage tree instead.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecencyEntry {
    pub filename: String,
    pub folder: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}
