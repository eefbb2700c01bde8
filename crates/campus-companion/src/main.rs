mod agent;
mod answer;
mod cache;
mod chunker;
mod config;
mod error;
mod index;
mod search;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use agent::Agent;
use answer::{AnswerChain, ModelClient};
use cache::CompanionCache;
use companion_common::openai::{OpenAiClient, OpenAiClientConfig};
use config::Config;
use course_catalog::{CourseCatalog, PrerequisiteLookup, course_tools};
use index::IndexService;
use search::Retriever;
use server::CampusCompanionServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting campus-companion MCP server");

    let config = Config::from_env()?;
    info!(
        lancedb_path = %config.lancedb_path,
        catalog_path = %config.catalog_path().display(),
        manual_path = %config.manual_path().display(),
        model = %config.model,
        chain_type = ?config.chain_type,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    let redis_cache = companion_common::redis::RedisCache::new(config.redis_url.as_deref());
    if redis_cache.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without cache");
    }
    let cache = Arc::new(CompanionCache::new(redis_cache));

    info!("initializing embedding model (may download on first run)");
    let embedder = Arc::new(companion_common::embedding::Embedder::new().await?);
    info!(dimensions = embedder.dimensions(), "embedding model ready");

    let vectordb =
        Arc::new(companion_common::vectordb::VectorDb::connect(&config.lancedb_path).await?);
    info!("lancedb connected");

    let index_service = IndexService::new(
        config.clone(),
        Arc::clone(&embedder),
        Arc::clone(&vectordb),
        Arc::clone(&cache),
    );
    let summary = index_service.update().await?;
    if summary.updated {
        info!(
            fingerprint = %summary.fingerprint,
            chunks = summary.chunk_count,
            "indexing complete"
        );
    }

    let catalog = Arc::new(CourseCatalog::load_or_empty(config.catalog_path()));
    let tools = Arc::new(course_tools(PrerequisiteLookup::new(Arc::clone(&catalog))));
    info!(
        courses = catalog.len(),
        tools = ?tools.names(),
        "course tools registered"
    );

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        timeout_ms = openai_config.default_timeout.as_millis(),
        max_retries = openai_config.max_retries,
        "openai client configured"
    );
    let openai = Arc::new(OpenAiClient::new(openai_config)?);
    let model = ModelClient::new(
        openai,
        config.model.clone(),
        config.temperature,
        config.max_tokens,
    );

    let retriever = Arc::new(Retriever::new(embedder, vectordb, cache));
    let answer_chain = AnswerChain::new(
        model.clone(),
        Arc::clone(&retriever),
        config.chain_type,
        config.retrieval_k,
    );
    let agent = Agent::new(
        model.with_stop(&["\nObservation:"]),
        Arc::clone(&tools),
        config.agent_max_steps,
    );

    let server = CampusCompanionServer::new(
        catalog,
        tools,
        retriever,
        answer_chain,
        agent,
        index_service,
    );

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
