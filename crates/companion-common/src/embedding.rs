/// Sentence embeddings via fastembed.
///
/// `TextEmbedding` is synchronous and CPU-bound, so every call runs inside
/// `tokio::task::spawn_blocking`. The model is all-MiniLM-L6-v2, which takes raw
/// text for both documents and queries (no task prefixes).
use std::sync::Arc;

use crate::error::CommonError;

pub const EMBEDDING_DIM: usize = 384;

pub struct Embedder {
    model: Arc<fastembed::TextEmbedding>,
}

impl Embedder {
    /// Initialize all-MiniLM-L6-v2. Downloads the model (~90MB) on first run.
    pub async fn new() -> Result<Self, CommonError> {
        let model = tokio::task::spawn_blocking(|| {
            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(true);
            fastembed::TextEmbedding::try_new(options)
        })
        .await
        .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| CommonError::Embedding(format!("model initialization failed: {e}")))?;

        Ok(Self {
            model: Arc::new(model),
        })
    }

    /// Embed document chunks for indexing, in small batches to bound peak memory.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CommonError> {
        let texts = texts.to_vec();
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(texts, Some(16)))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("document embedding failed: {e}")))
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, CommonError> {
        let input = vec![query.to_string()];
        let model = Arc::clone(&self.model);
        let mut results = tokio::task::spawn_blocking(move || model.embed(input, None))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("query embedding failed: {e}")))?;
        results
            .pop()
            .ok_or_else(|| CommonError::Embedding("empty embedding result".to_string()))
    }

    pub fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}
