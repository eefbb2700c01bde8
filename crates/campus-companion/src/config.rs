use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::answer::ChainType;
use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// The course catalog and manual text are produced by `catalog-ingest`; either may be
/// missing, in which case the assistant runs with whatever is present.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL. `None` disables caching.
    pub redis_url: Option<String>,
    /// Filesystem path to the LanceDB data directory.
    pub lancedb_path: String,
    pub catalog_path: PathBuf,
    pub manual_path: PathBuf,
    /// Model id sent to the OpenAI-compatible host.
    pub model: String,
    pub retrieval_k: usize,
    pub chain_type: ChainType,
    pub temperature: f32,
    pub max_tokens: u32,
    pub agent_max_steps: usize,
}

impl Config {
    /// Required:
    /// - `LANCEDB_PATH`
    ///
    /// Optional:
    /// - `REDIS_URL`
    /// - `COURSE_CATALOG_PATH` (default: "ae_courses.json")
    /// - `MANUAL_TEXT_PATH` (default: "ug_manual.txt")
    /// - `COMPANION_MODEL` (default: "iitk-companion-flan-t5-base")
    /// - `COMPANION_RETRIEVAL_K` (default: 3)
    /// - `COMPANION_CHAIN_TYPE` ("map_reduce" or "stuff", default: "map_reduce")
    /// - `COMPANION_TEMPERATURE` (default: 0.1)
    /// - `COMPANION_MAX_TOKENS` (default: 512)
    /// - `COMPANION_AGENT_MAX_STEPS` (default: 5)
    pub fn from_env() -> Result<Self, AppError> {
        let lancedb_path = std::env::var("LANCEDB_PATH").map_err(|_| {
            AppError::Config("LANCEDB_PATH environment variable is required".to_string())
        })?;

        let chain_type = match std::env::var("COMPANION_CHAIN_TYPE") {
            Ok(raw) => raw.parse::<ChainType>()?,
            Err(_) => ChainType::MapReduce,
        };

        let retrieval_k = parse_var("COMPANION_RETRIEVAL_K", 3usize)?;
        if retrieval_k == 0 {
            return Err(AppError::Config(
                "COMPANION_RETRIEVAL_K must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            lancedb_path,
            catalog_path: std::env::var("COURSE_CATALOG_PATH")
                .unwrap_or_else(|_| "ae_courses.json".to_string())
                .into(),
            manual_path: std::env::var("MANUAL_TEXT_PATH")
                .unwrap_or_else(|_| "ug_manual.txt".to_string())
                .into(),
            model: std::env::var("COMPANION_MODEL")
                .unwrap_or_else(|_| "iitk-companion-flan-t5-base".to_string()),
            retrieval_k,
            chain_type,
            temperature: parse_var("COMPANION_TEMPERATURE", 0.1f32)?,
            max_tokens: parse_var("COMPANION_MAX_TOKENS", 512u32)?,
            agent_max_steps: parse_var("COMPANION_AGENT_MAX_STEPS", 5usize)?,
        })
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn manual_path(&self) -> &Path {
        &self.manual_path
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
