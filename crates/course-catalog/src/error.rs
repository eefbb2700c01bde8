use std::path::PathBuf;

/// Errors raised by the catalog batch components.
///
/// A missing or empty parse result is not an error: the parser returns an empty
/// `Vec` and the lookup tool reports absence as a normal message.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("tool already registered: {0}")]
    DuplicateTool(String),
}
