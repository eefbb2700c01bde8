use std::sync::Arc;

use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use tracing::{info, warn};

use crate::cache::CompanionCache;
use crate::error::AppError;
use crate::index::VECTOR_TABLE_NAME;
use companion_common::embedding::Embedder;
use companion_common::mcp_api::SourceFragment;
use companion_common::vectordb::VectorDb;

pub struct Retriever {
    embedder: Arc<Embedder>,
    vectordb: Arc<VectorDb>,
    cache: Arc<CompanionCache>,
}

impl Retriever {
    pub fn new(embedder: Arc<Embedder>, vectordb: Arc<VectorDb>, cache: Arc<CompanionCache>) -> Self {
        Self {
            embedder,
            vectordb,
            cache,
        }
    }

    /// The `limit` fragments nearest to `query`, best first.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SourceFragment>, AppError> {
        if let Some(cached) = self.cache.get_search_results(query, limit).await {
            info!(query, "search cache hit");
            return Ok(cached);
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        let batches = self
            .vectordb
            .search(VECTOR_TABLE_NAME, &query_embedding, limit)
            .await?;

        let results = extract_fragments(&batches);
        self.cache.set_search_results(query, limit, &results).await;
        Ok(results)
    }
}

fn extract_fragments(batches: &[RecordBatch]) -> Vec<SourceFragment> {
    let mut results = Vec::new();

    for batch in batches {
        let (Some(id_col), Some(source_col), Some(text_col)) = (
            string_column(batch, "id"),
            string_column(batch, "source"),
            string_column(batch, "text"),
        ) else {
            warn!("search result batch missing expected columns");
            continue;
        };
        let distance_col = float_column(batch, "_distance");

        for row in 0..batch.num_rows() {
            let distance = distance_col.map(|c| c.value(row)).unwrap_or(0.0);
            results.push(SourceFragment {
                id: id_col.value(row).to_string(),
                source: source_col.value(row).to_string(),
                text: text_col.value(row).to_string(),
                score: (1.0_f32 - distance).max(0.0),
            });
        }
    }

    results
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    let idx = batch.schema().index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<StringArray>()
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a Float32Array> {
    let idx = batch.schema().index_of(name).ok()?;
    batch.column(idx).as_any().downcast_ref::<Float32Array>()
}
