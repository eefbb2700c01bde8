/// Redis caching layer for the assistant.
///
/// All operations return `Option<T>` or fire-and-forget for graceful degradation.
///
/// Key schema:
/// - `cmp:v1:search:{sha256(query|limit)}`: JSON Vec<SourceFragment> (TTL 3600s)
/// - `cmp:v1:index_fingerprint`: fingerprint of the sources the vector table was built from
use sha2::{Digest, Sha256};
use tracing::warn;

use companion_common::mcp_api::SourceFragment;
use companion_common::redis::RedisCache;

const KEY_PREFIX: &str = "cmp:v1:";
const SEARCH_TTL_SECS: u64 = 3600;

pub struct CompanionCache {
    redis: RedisCache,
}

impl CompanionCache {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    pub async fn get_search_results(
        &self,
        query: &str,
        limit: usize,
    ) -> Option<Vec<SourceFragment>> {
        let key = search_key(query, limit);
        let json = self.redis.get(&key).await?;
        serde_json::from_str(&json)
            .inspect_err(|e| warn!(error = %e, key, "cache deserialization failed"))
            .ok()
    }

    pub async fn set_search_results(&self, query: &str, limit: usize, results: &[SourceFragment]) {
        let key = search_key(query, limit);
        if let Ok(json) = serde_json::to_string(results) {
            self.redis.set_with_ttl(&key, &json, SEARCH_TTL_SECS).await;
        }
    }

    pub async fn get_index_fingerprint(&self) -> Option<String> {
        self.redis.get(&format!("{KEY_PREFIX}index_fingerprint")).await
    }

    pub async fn set_index_fingerprint(&self, fingerprint: &str) {
        self.redis
            .set(&format!("{KEY_PREFIX}index_fingerprint"), fingerprint)
            .await;
    }

    pub async fn invalidate_all(&self) {
        self.redis.delete_by_prefix(KEY_PREFIX).await;
    }
}

fn search_key(query: &str, limit: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b"|");
    hasher.update(limit.to_string().as_bytes());
    format!("{KEY_PREFIX}search:{:x}", hasher.finalize())
}
