use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the content cache.
///
/// What `payload` holds depends on the key: a JSON array for link-list URLs,
/// a full expanded document for document-type keys, and a binary delta
/// against that template for every other document URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: String,
    pub payload: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
}

/// Listing view of a record, without the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSummary {
    pub key: String,
    pub size: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}
