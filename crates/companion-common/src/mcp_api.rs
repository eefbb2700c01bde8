use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CourseCodeParams {
    /// Course code such as "AE201A". Case and surrounding whitespace are ignored.
    pub course_code: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchDocumentsParams {
    /// Natural-language description of what to find in the catalog or UG manual.
    pub query: String,
    /// Maximum number of fragments to return (default: 5, max: 20).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AskParams {
    /// Question about department courses or UG regulations.
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TextResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseDetailResponse {
    pub code: String,
    pub title: String,
    pub credits: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceFragment {
    /// Chunk id, e.g. "AE201A#0" or "manual#14".
    pub id: String,
    /// "catalog" or "manual".
    pub source: String,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocumentsResponse {
    pub results: Vec<SourceFragment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnswerResponse {
    pub answer: String,
    /// Retrieved fragments the answer was conditioned on.
    pub sources: Vec<SourceFragment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentStepInfo {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentAnswerResponse {
    pub answer: String,
    /// Tool calls made before the final answer, in order.
    pub steps: Vec<AgentStepInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReindexResponse {
    pub updated: bool,
    pub fingerprint: String,
    pub chunk_count: usize,
}
