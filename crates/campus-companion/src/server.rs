use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::agent::Agent;
use crate::answer::{AnswerChain, ModelClient};
use crate::index::IndexService;
use crate::search::Retriever;
use companion_common::mcp_api::{
    AgentAnswerResponse, AnswerResponse, AskParams, CourseCodeParams, CourseDetailResponse,
    ReindexResponse, SearchDocumentsParams, SearchDocumentsResponse, TextResponse,
};
use course_catalog::{CourseCatalog, PrerequisiteLookup, ToolRegistry};

#[derive(Clone)]
pub struct CampusCompanionServer {
    catalog: Arc<CourseCatalog>,
    tools: Arc<ToolRegistry>,
    retriever: Arc<Retriever>,
    answer_chain: Arc<AnswerChain<ModelClient>>,
    agent: Arc<Agent<ModelClient>>,
    index_service: Arc<IndexService>,
    tool_router: ToolRouter<CampusCompanionServer>,
}

impl CampusCompanionServer {
    pub fn new(
        catalog: Arc<CourseCatalog>,
        tools: Arc<ToolRegistry>,
        retriever: Arc<Retriever>,
        answer_chain: AnswerChain<ModelClient>,
        agent: Agent<ModelClient>,
        index_service: IndexService,
    ) -> Self {
        Self {
            catalog,
            tools,
            retriever,
            answer_chain: Arc::new(answer_chain),
            agent: Arc::new(agent),
            index_service: Arc::new(index_service),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl CampusCompanionServer {
    #[tool(description = "Report the prerequisites listed for a course code (e.g. 'AE201A').")]
    async fn check_prerequisites(
        &self,
        Parameters(params): Parameters<CourseCodeParams>,
    ) -> Result<Json<TextResponse>, String> {
        let text = self
            .tools
            .call(PrerequisiteLookup::TOOL_NAME, &params.course_code)
            .ok_or_else(|| format!("tool not registered: {}", PrerequisiteLookup::TOOL_NAME))?;
        Ok(Json(TextResponse { text }))
    }

    #[tool(description = "Get the catalog entry for a course code (e.g. 'AE201A').")]
    async fn get_course(
        &self,
        Parameters(params): Parameters<CourseCodeParams>,
    ) -> Result<Json<CourseDetailResponse>, String> {
        let code = params.course_code.trim().to_uppercase();
        if code.is_empty() {
            return Err("course_code must not be empty".to_string());
        }
        if self.catalog.is_empty() {
            return Err("course data is not available".to_string());
        }

        let record = self
            .catalog
            .find(&code)
            .ok_or_else(|| format!("course not found: {code}"))?;

        Ok(Json(CourseDetailResponse {
            code: record.code.clone(),
            title: record.title.clone(),
            credits: record.credits.clone(),
            description: record.description.clone(),
        }))
    }

    #[tool(description = "Search the course catalog and UG manual by semantic similarity.")]
    async fn search_documents(
        &self,
        Parameters(params): Parameters<SearchDocumentsParams>,
    ) -> Result<Json<SearchDocumentsResponse>, String> {
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err("query must not be empty".to_string());
        }

        let limit = params.limit.unwrap_or(5).clamp(1, 20) as usize;

        let results = self
            .retriever
            .search(&query, limit)
            .await
            .map_err(|e| format!("search failed: {e}"))?;

        Ok(Json(SearchDocumentsResponse { results }))
    }

    #[tool(description = "Answer a question about department courses or UG regulations from the indexed documents.")]
    async fn ask(
        &self,
        Parameters(params): Parameters<AskParams>,
    ) -> Result<Json<AnswerResponse>, String> {
        let answer = self
            .answer_chain
            .ask(&params.question)
            .await
            .map_err(|e| format!("answer failed: {e}"))?;

        Ok(Json(AnswerResponse {
            answer: answer.answer,
            sources: answer.sources,
        }))
    }

    #[tool(description = "Answer a question with an agent that may consult the course prerequisite checker.")]
    async fn ask_agent(
        &self,
        Parameters(params): Parameters<AskParams>,
    ) -> Result<Json<AgentAnswerResponse>, String> {
        let outcome = self
            .agent
            .run(&params.question)
            .await
            .map_err(|e| format!("agent failed: {e}"))?;

        Ok(Json(AgentAnswerResponse {
            answer: outcome.answer,
            steps: outcome.steps,
        }))
    }

    #[tool(description = "Re-index the course catalog and UG manual if their contents changed.")]
    async fn reindex(&self) -> Result<Json<ReindexResponse>, String> {
        info!("reindex tool invoked");

        let summary = self
            .index_service
            .update()
            .await
            .map_err(|e| format!("reindex failed: {e}"))?;

        Ok(Json(ReindexResponse {
            updated: summary.updated,
            fingerprint: summary.fingerprint,
            chunk_count: summary.chunk_count,
        }))
    }
}

#[tool_handler]
impl ServerHandler for CampusCompanionServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "campus-companion".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Aerospace department student assistant. Use check_prerequisites or get_course \
                 for a specific course code, search_documents to find catalog or UG manual \
                 passages, ask for a grounded answer with sources, ask_agent for an answer that \
                 may consult the prerequisite checker, and reindex after re-running the ingest."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CampusCompanionServer;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = CampusCompanionServer::tool_router().list_all();
        for name in [
            "check_prerequisites",
            "get_course",
            "search_documents",
            "ask",
            "ask_agent",
            "reindex",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }
}
