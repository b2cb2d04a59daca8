pub mod record;
pub mod url_kind;

pub use record::{CacheRecord, RecordSummary};
pub use url_kind::{DocumentKind, DocumentType, UrlClassifier, UrlKind};
