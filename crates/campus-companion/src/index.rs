/// Document index builder.
///
/// Loads the course catalog and UG manual text from disk, chunks them, embeds the
/// chunks and replaces the LanceDB table. A SHA-256 fingerprint of the inputs is kept
/// in the cache so start-up only re-indexes when the sources change or the table is
/// missing. Runs at start-up and on demand via the `reindex` MCP tool.
use std::path::Path;
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::cache::CompanionCache;
use crate::chunker::{Splitter, CHUNK_OVERLAP, CHUNK_SIZE};
use crate::config::Config;
use crate::error::AppError;
use companion_common::embedding::{Embedder, EMBEDDING_DIM};
use companion_common::error::CommonError;
use companion_common::vectordb::VectorDb;
use course_catalog::CourseCatalog;

pub const VECTOR_TABLE_NAME: &str = "campus_documents";
pub const SOURCE_CATALOG: &str = "catalog";
pub const SOURCE_MANUAL: &str = "manual";

/// A chunk ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: String,
    pub source: &'static str,
    pub text: String,
}

pub struct IndexSummary {
    pub updated: bool,
    pub fingerprint: String,
    pub chunk_count: usize,
}

pub struct IndexService {
    config: Config,
    embedder: Arc<Embedder>,
    vectordb: Arc<VectorDb>,
    cache: Arc<CompanionCache>,
}

impl IndexService {
    pub fn new(
        config: Config,
        embedder: Arc<Embedder>,
        vectordb: Arc<VectorDb>,
        cache: Arc<CompanionCache>,
    ) -> Self {
        Self {
            config,
            embedder,
            vectordb,
            cache,
        }
    }

    pub fn current_fingerprint(&self) -> String {
        source_fingerprint(self.config.catalog_path(), self.config.manual_path())
    }

    /// `true` when the sources changed since the last build or the table is gone.
    pub async fn needs_update(&self, fingerprint: &str) -> Result<bool, AppError> {
        match self.cache.get_index_fingerprint().await {
            Some(cached) if cached == fingerprint => {
                if self.vectordb.table_exists(VECTOR_TABLE_NAME).await? {
                    Ok(false)
                } else {
                    info!("vector table missing, re-index needed");
                    Ok(true)
                }
            }
            _ => Ok(true),
        }
    }

    /// Rebuild the index if needed.
    pub async fn update(&self) -> Result<IndexSummary, AppError> {
        let fingerprint = self.current_fingerprint();
        if !self.needs_update(&fingerprint).await? {
            info!(fingerprint = %fingerprint, "document index up to date, skipping re-index");
            return Ok(IndexSummary {
                updated: false,
                fingerprint,
                chunk_count: 0,
            });
        }
        self.full_reindex(fingerprint).await
    }

    pub async fn full_reindex(&self, fingerprint: String) -> Result<IndexSummary, AppError> {
        info!(fingerprint = %fingerprint, "starting full re-index");

        let catalog = CourseCatalog::load_or_empty(self.config.catalog_path());
        let manual = match std::fs::read_to_string(self.config.manual_path()) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(
                    error = %e,
                    path = %self.config.manual_path().display(),
                    "manual text unavailable, indexing catalog only"
                );
                None
            }
        };

        let chunks = build_chunks(&catalog, manual.as_deref(), &Splitter::default());
        if chunks.is_empty() {
            warn!("no documents to index, run catalog-ingest first");
            return clear_index(&self.vectordb, &self.cache, fingerprint).await;
        }
        info!(
            courses = catalog.len(),
            chunks = chunks.len(),
            "documents chunked"
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Common(CommonError::Embedding(format!(
                "embedding count mismatch: expected {}, got {}",
                chunks.len(),
                embeddings.len()
            ))));
        }

        let batch = build_record_batch(&chunks, &embeddings)?;
        let schema = batch.schema();
        self.vectordb
            .create_or_replace_table(VECTOR_TABLE_NAME, schema, vec![batch])
            .await?;

        record_build(&self.cache, &fingerprint).await;

        info!(
            fingerprint = %fingerprint,
            chunks = chunks.len(),
            "re-index complete"
        );
        Ok(IndexSummary {
            updated: true,
            fingerprint,
            chunk_count: chunks.len(),
        })
    }
}

/// Empty sources leave no table behind, so nothing indexed from earlier sources
/// stays searchable.
async fn clear_index(
    vectordb: &VectorDb,
    cache: &CompanionCache,
    fingerprint: String,
) -> Result<IndexSummary, AppError> {
    vectordb.drop_table(VECTOR_TABLE_NAME).await?;
    record_build(cache, &fingerprint).await;

    info!(fingerprint = %fingerprint, "document index cleared");
    Ok(IndexSummary {
        updated: true,
        fingerprint,
        chunk_count: 0,
    })
}

async fn record_build(cache: &CompanionCache, fingerprint: &str) {
    cache.invalidate_all().await;
    cache.set_index_fingerprint(fingerprint).await;
}

/// Chunks for every course (one document per course) followed by the manual.
pub fn build_chunks(catalog: &CourseCatalog, manual: Option<&str>, splitter: &Splitter) -> Vec<Chunk> {
    let course_docs = catalog
        .records()
        .iter()
        .map(|r| (r.code.clone(), SOURCE_CATALOG, r.index_text()));
    let manual_doc = manual.map(|text| (SOURCE_MANUAL.to_string(), SOURCE_MANUAL, text.to_string()));

    course_docs
        .chain(manual_doc)
        .flat_map(|(doc_id, source, text)| {
            splitter
                .split(&text)
                .into_iter()
                .enumerate()
                .map(move |(i, text)| Chunk {
                    id: format!("{doc_id}#{i}"),
                    source,
                    text,
                })
        })
        .collect()
}

/// Fingerprint of the index inputs. Missing files hash as empty.
pub fn source_fingerprint(catalog_path: &Path, manual_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("all-MiniLM-L6-v2|{CHUNK_SIZE}|{CHUNK_OVERLAP}|").as_bytes());
    for path in [catalog_path, manual_path] {
        let bytes = std::fs::read(path).unwrap_or_default();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    format!("{:x}", hasher.finalize())
}

fn build_record_batch(chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch, AppError> {
    let embedding_dim = EMBEDDING_DIM as i32;

    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    let sources: Vec<&str> = chunks.iter().map(|c| c.source).collect();
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

    let id_array: ArrayRef = Arc::new(StringArray::from(ids));
    let source_array: ArrayRef = Arc::new(StringArray::from(sources));
    let text_array: ArrayRef = Arc::new(StringArray::from(texts));

    let flat_values: Vec<f32> = embeddings.iter().flat_map(|e| e.iter().copied()).collect();
    let item_field = Arc::new(Field::new("item", DataType::Float32, true));
    let embedding_array: ArrayRef = Arc::new(
        FixedSizeListArray::try_new(
            Arc::clone(&item_field),
            embedding_dim,
            Arc::new(Float32Array::from(flat_values)),
            None,
        )
        .map_err(|e| CommonError::VectorDb(format!("failed to build embedding array: {e}")))?,
    );

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(item_field, embedding_dim),
            false,
        ),
    ]));

    RecordBatch::try_new(schema, vec![id_array, source_array, text_array, embedding_array])
        .map_err(|e| AppError::Common(CommonError::VectorDb(format!("failed to build record batch: {e}"))))
}
