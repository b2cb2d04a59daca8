use thiserror::Error;

#[derive(Error, Debug)]
pub enum StencilError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Corrupt delta for {key}: {reason}")]
    CorruptDelta { key: String, reason: String },

    #[error("No template stored for document type '{type_key}' (needed by {url})")]
    MissingTemplate { type_key: String, url: String },

    #[error("Payload kind does not match key space of {0}")]
    PayloadMismatch(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl StencilError {
    /// Whether this failure leaves the store in a state where further writes
    /// could compound the damage. Everything else is scoped to a single URL.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            StencilError::MissingTemplate { .. }
                | StencilError::CorruptDelta { .. }
                | StencilError::Database(_)
                | StencilError::Migration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StencilError>;
