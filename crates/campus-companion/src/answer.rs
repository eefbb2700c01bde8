/// Retrieval-augmented answer chain.
///
/// A question is embedded, the nearest fragments are retrieved, and the answering
/// model is prompted with them. Two chain types:
/// - `stuff`: one call with every fragment inlined as context
/// - `map_reduce`: one extraction call per fragment, then one call combining the
///   relevant extracts into the final answer
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::AppError;
use crate::search::Retriever;
use companion_common::mcp_api::SourceFragment;
use companion_common::openai::{ChatCompletionRequest, Message, OpenAiClient};

/// Anything that turns a prompt into generated text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: String) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// The answering model behind an OpenAI-compatible host.
#[derive(Clone)]
pub struct ModelClient {
    openai: Arc<OpenAiClient>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    stop: Option<Vec<String>>,
}

impl ModelClient {
    pub fn new(openai: Arc<OpenAiClient>, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            openai,
            model,
            temperature,
            max_tokens,
            stop: None,
        }
    }

    pub fn with_stop(mut self, stop: &[&str]) -> Self {
        self.stop = Some(stop.iter().map(|s| s.to_string()).collect());
        self
    }
}

impl TextGenerator for ModelClient {
    fn generate(&self, prompt: String) -> impl Future<Output = Result<String, AppError>> + Send {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            stop: self.stop.clone(),
        };
        let openai = Arc::clone(&self.openai);
        async move { Ok(openai.complete(request).await?.trim().to_string()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Stuff,
    MapReduce,
}

impl FromStr for ChainType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stuff" => Ok(Self::Stuff),
            "map_reduce" | "map-reduce" => Ok(Self::MapReduce),
            other => Err(AppError::Config(format!(
                "unknown chain type '{other}', expected 'stuff' or 'map_reduce'"
            ))),
        }
    }
}

pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceFragment>,
}

pub struct AnswerChain<G> {
    generator: G,
    retriever: Arc<Retriever>,
    chain_type: ChainType,
    k: usize,
}

impl<G: TextGenerator> AnswerChain<G> {
    pub fn new(generator: G, retriever: Arc<Retriever>, chain_type: ChainType, k: usize) -> Self {
        Self {
            generator,
            retriever,
            chain_type,
            k,
        }
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::EmptyInput("question"));
        }

        let sources = self.retriever.search(question, self.k).await?;
        info!(
            sources = sources.len(),
            chain = ?self.chain_type,
            "answering question"
        );
        let answer = answer_from(&self.generator, self.chain_type, question, &sources).await?;
        Ok(Answer { answer, sources })
    }
}

/// Run the chain over already-retrieved fragments.
pub async fn answer_from<G: TextGenerator>(
    generator: &G,
    chain_type: ChainType,
    question: &str,
    sources: &[SourceFragment],
) -> Result<String, AppError> {
    match chain_type {
        ChainType::Stuff => generator.generate(stuff_prompt(question, sources)).await,
        ChainType::MapReduce => {
            let extracts = try_join_all(
                sources
                    .iter()
                    .map(|fragment| generator.generate(map_prompt(question, &fragment.text))),
            )
            .await?;
            let relevant: Vec<String> = extracts
                .into_iter()
                .filter(|e| is_relevant_extract(e))
                .collect();
            debug!(
                fragments = sources.len(),
                relevant = relevant.len(),
                "map step complete"
            );
            generator.generate(combine_prompt(question, &relevant)).await
        }
    }
}

fn stuff_prompt(question: &str, sources: &[SourceFragment]) -> String {
    let context = sources
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. If you don't \
         know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

fn map_prompt(question: &str, fragment: &str) -> String {
    format!(
        "Use the following portion of a long document to see if any of the text is relevant \
         to answer the question. Return any relevant text verbatim.\n{fragment}\n\
         Question: {question}\nRelevant text, if any:"
    )
}

fn combine_prompt(question: &str, extracts: &[String]) -> String {
    let summaries = extracts.join("\n\n");
    format!(
        "Given the following extracted parts of a long document and a question, create a final \
         answer. If you don't know the answer, just say that you don't know. Don't try to make \
         up an answer.\n\nQUESTION: {question}\n=========\n{summaries}\n=========\nFINAL ANSWER:"
    )
}

fn is_relevant_extract(extract: &str) -> bool {
    let lowered = extract.trim().to_lowercase();
    !(lowered.is_empty()
        || lowered == "none"
        || lowered.starts_with("none.")
        || lowered.starts_with("no relevant"))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Echoes a canned reply per prompt kind and records every prompt it saw.
    #[derive(Default)]
    struct ScriptedModel {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for ScriptedModel {
        fn generate(&self, prompt: String) -> impl Future<Output = Result<String, AppError>> + Send {
            let reply = if prompt.contains("Relevant text, if any:") {
                if prompt.contains("AE201A") {
                    "Prerequisite: AE200.".to_string()
                } else {
                    "None".to_string()
                }
            } else {
                "AE200 is required.".to_string()
            };
            self.prompts.lock().unwrap().push(prompt);
            async move { Ok(reply) }
        }
    }

    fn fragment(id: &str, text: &str) -> SourceFragment {
        SourceFragment {
            id: id.to_string(),
            source: "catalog".to_string(),
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn stuff_inlines_all_context_in_one_call() {
        let model = ScriptedModel::default();
        let sources = vec![
            fragment("AE201A#0", "AE201A: Flight Mechanics - Prerequisite: AE200."),
            fragment("manual#2", "Credits are counted per semester."),
        ];

        let answer = answer_from(&model, ChainType::Stuff, "What does AE201A need?", &sources)
            .await
            .unwrap();

        assert_eq!(answer, "AE200 is required.");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Prerequisite: AE200.\n\nCredits are counted"));
        assert!(prompts[0].ends_with("Question: What does AE201A need?\nHelpful Answer:"));
    }

    #[tokio::test]
    async fn map_reduce_combines_only_relevant_extracts() {
        let model = ScriptedModel::default();
        let sources = vec![
            fragment("AE201A#0", "AE201A: Flight Mechanics - Prerequisite: AE200."),
            fragment("manual#2", "Credits are counted per semester."),
        ];

        let answer = answer_from(&model, ChainType::MapReduce, "What does AE201A need?", &sources)
            .await
            .unwrap();

        assert_eq!(answer, "AE200 is required.");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        let combine = prompts.last().unwrap();
        assert!(combine.contains("=========\nPrerequisite: AE200.\n========="));
        assert!(!combine.contains("None"));
    }

    #[tokio::test]
    async fn map_reduce_without_sources_still_asks_once() {
        let model = ScriptedModel::default();
        let answer = answer_from(&model, ChainType::MapReduce, "Anything?", &[])
            .await
            .unwrap();
        assert_eq!(answer, "AE200 is required.");
        assert_eq!(model.prompts.lock().unwrap().len(), 1);
    }

    #[test]
    fn chain_type_parses() {
        assert_eq!("stuff".parse::<ChainType>().unwrap(), ChainType::Stuff);
        assert_eq!(" MAP_REDUCE ".parse::<ChainType>().unwrap(), ChainType::MapReduce);
        assert!("refine".parse::<ChainType>().is_err());
    }

    #[test]
    fn irrelevant_extracts_are_recognized() {
        assert!(!is_relevant_extract("  "));
        assert!(!is_relevant_extract("None"));
        assert!(!is_relevant_extract("No relevant text."));
        assert!(is_relevant_extract("Prerequisite: AE200."));
        assert!(is_relevant_extract("Nonetheless, AE200 applies."));
    }
}
