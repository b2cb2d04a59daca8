pub mod sqlite;

use crate::app::Result;
use crate::domain::{CacheRecord, RecordSummary};

pub use sqlite::SqliteStore;

/// Durable key/blob storage behind the content cache.
///
/// Keys are URLs, link-list URLs or document-type tokens; the store itself
/// does not interpret them.
pub trait Store {
    fn get_record(&self, key: &str) -> Result<Option<CacheRecord>>;
    fn get_content(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn contains(&self, key: &str) -> Result<bool>;

    /// Insert or replace the record for `key`.
    fn put_content(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Insert only if no record exists. Returns whether a row was written.
    fn insert_content(&self, key: &str, content: &[u8]) -> Result<bool>;

    /// All records in insertion order.
    fn list_records(&self) -> Result<Vec<RecordSummary>>;
    fn delete(&self, key: &str) -> Result<bool>;
}
