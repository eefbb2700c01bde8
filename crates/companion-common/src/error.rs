/// Error types for the shared retrieval infrastructure (vector store, embeddings).
///
/// Redis failures never surface here: the cache degrades to misses instead.
/// Crate-specific errors wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("vector db error: {0}")]
    VectorDb(String),

    #[error("embedding error: {0}")]
    Embedding(String),
}
