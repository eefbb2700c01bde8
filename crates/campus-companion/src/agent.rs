/// ReAct-style tool-using agent.
///
/// Each turn the model sees the tool list, the question and the scratchpad of
/// earlier thoughts and observations. Its reply is either an action to dispatch
/// through the [`ToolRegistry`] or a final answer.
use std::sync::Arc;

use regex::Regex;
use tracing::{info, warn};

use crate::answer::TextGenerator;
use crate::error::AppError;
use companion_common::mcp_api::AgentStepInfo;
use course_catalog::ToolRegistry;

pub const STEP_BUDGET_EXHAUSTED: &str =
    "Agent stopped due to iteration limit or time limit.";

const ACTION_PATTERN: &str = r"(?s)Action\s*:\s*(.*?)\s*\n\s*Action\s*Input\s*:\s*(.*)";
const FINAL_ANSWER_PATTERN: &str = r"(?s)Final Answer\s*:\s*(.*)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    Finish(String),
}

pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStepInfo>,
}

pub struct Agent<G> {
    generator: G,
    tools: Arc<ToolRegistry>,
    max_steps: usize,
}

impl<G: TextGenerator> Agent<G> {
    pub fn new(generator: G, tools: Arc<ToolRegistry>, max_steps: usize) -> Self {
        Self {
            generator,
            tools,
            max_steps: max_steps.max(1),
        }
    }

    pub async fn run(&self, question: &str) -> Result<AgentOutcome, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::EmptyInput("question"));
        }

        let mut scratchpad = String::new();
        let mut steps = Vec::new();

        for turn in 0..self.max_steps {
            let reply = self
                .generator
                .generate(build_prompt(&self.tools, question, &scratchpad))
                .await?;

            match parse_step(&reply) {
                AgentStep::Finish(answer) => {
                    info!(turns = turn + 1, tool_calls = steps.len(), "agent finished");
                    return Ok(AgentOutcome { answer, steps });
                }
                AgentStep::Action { tool, input } => {
                    let observation = self.dispatch(&tool, &input);
                    info!(tool = %tool, input = %input, "agent tool call");
                    scratchpad.push_str(truncate_at_observation(&reply).trim_end());
                    scratchpad.push_str(&format!("\nObservation: {observation}\nThought:"));
                    steps.push(AgentStepInfo {
                        tool,
                        input,
                        observation,
                    });
                }
            }
        }

        warn!(max_steps = self.max_steps, "agent step budget exhausted");
        Ok(AgentOutcome {
            answer: STEP_BUDGET_EXHAUSTED.to_string(),
            steps,
        })
    }

    fn dispatch(&self, tool: &str, input: &str) -> String {
        match self.tools.call(tool, input) {
            Some(observation) => observation,
            None => format!(
                "{tool} is not a valid tool, try one of [{}].",
                self.tools.names().join(", ")
            ),
        }
    }
}

/// Interpret one model reply. A reply that is neither an action nor a final answer,
/// or that is both at once, is taken as the final answer verbatim.
pub fn parse_step(reply: &str) -> AgentStep {
    let reply = truncate_at_observation(reply);
    let final_re = Regex::new(FINAL_ANSWER_PATTERN).expect("valid regex");
    let action_re = Regex::new(ACTION_PATTERN).expect("valid regex");

    let action = action_re.captures(reply).and_then(|caps| {
        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').trim().to_string();
        (!tool.is_empty()).then_some((tool, input))
    });
    let final_answer = final_re.captures(reply).map(|caps| caps[1].trim().to_string());

    match (action, final_answer) {
        (Some(_), Some(_)) => {
            warn!("model reply holds both an action and a final answer");
            AgentStep::Finish(reply.trim().to_string())
        }
        (Some((tool, input)), None) => AgentStep::Action { tool, input },
        (None, Some(answer)) => AgentStep::Finish(answer),
        (None, None) => AgentStep::Finish(reply.trim().to_string()),
    }
}

/// Models sometimes invent their own observations; everything from the first one on
/// is dropped.
fn truncate_at_observation(reply: &str) -> &str {
    match reply.find("\nObservation:") {
        Some(pos) => &reply[..pos],
        None => reply,
    }
}

fn build_prompt(tools: &ToolRegistry, question: &str, scratchpad: &str) -> String {
    let tool_lines = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools.names().join(", ");

    format!(
        "Answer the following questions as best you can. You have access to the following \
         tools:\n\n{tool_lines}\n\nUse the following format:\n\n\
         Question: the input question you must answer\n\
         Thought: you should always think about what to do\n\
         Action: the action to take, should be one of [{tool_names}]\n\
         Action Input: the input to the action\n\
         Observation: the result of the action\n\
         ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
         Thought: I now know the final answer\n\
         Final Answer: the final answer to the original input question\n\n\
         Begin!\n\nQuestion: {question}\nThought:{scratchpad}"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    use super::*;

    struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for ScriptedModel {
        fn generate(&self, prompt: String) -> impl Future<Output = Result<String, AppError>> + Send {
            self.prompts.lock().unwrap().push(prompt);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "Action: echo\nAction Input: again".to_string());
            async move { Ok(reply) }
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut tools = ToolRegistry::new();
        tools
            .register("echo", "Repeats its input.", |input| format!("echo: {input}"))
            .unwrap();
        Arc::new(tools)
    }

    #[test]
    fn parses_actions_and_answers() {
        assert_eq!(
            parse_step(" I should look it up.\nAction: course_prerequisite_checker\nAction Input: \"AE201A\""),
            AgentStep::Action {
                tool: "course_prerequisite_checker".to_string(),
                input: "AE201A".to_string(),
            }
        );
        assert_eq!(
            parse_step(" I now know the final answer\nFinal Answer: AE200 is required."),
            AgentStep::Finish("AE200 is required.".to_string())
        );
        assert_eq!(
            parse_step("AE200 is required."),
            AgentStep::Finish("AE200 is required.".to_string())
        );
    }

    #[test]
    fn invented_observations_are_ignored() {
        assert_eq!(
            parse_step("Action: echo\nAction Input: hi\nObservation: made up\nFinal Answer: no"),
            AgentStep::Action {
                tool: "echo".to_string(),
                input: "hi".to_string(),
            }
        );
    }

    #[test]
    fn action_with_final_answer_is_ambiguous() {
        let reply = "Action: echo\nAction Input: AE201A\nFinal Answer: AE200 is required.";
        assert_eq!(parse_step(reply), AgentStep::Finish(reply.to_string()));

        let reply = "Final Answer: AE200 is required.\nAction: echo\nAction Input: AE201A";
        assert_eq!(parse_step(reply), AgentStep::Finish(reply.to_string()));
    }

    #[tokio::test]
    async fn ambiguous_reply_ends_without_calling_tools() {
        let model = ScriptedModel::new(&["Action: echo\nAction Input: AE201A\nFinal Answer: done"]);
        let agent = Agent::new(model, registry(), 5);

        let outcome = agent.run("What about AE201A?").await.unwrap();

        assert!(outcome.steps.is_empty());
        assert!(outcome.answer.starts_with("Action: echo"));
    }

    #[tokio::test]
    async fn dispatches_tool_then_finishes() {
        let model = ScriptedModel::new(&[
            " I need the tool.\nAction: echo\nAction Input: AE201A",
            " I now know the final answer\nFinal Answer: done",
        ]);
        let agent = Agent::new(model, registry(), 5);

        let outcome = agent.run("What about AE201A?").await.unwrap();

        assert_eq!(outcome.answer, "done");
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].tool, "echo");
        assert_eq!(outcome.steps[0].observation, "echo: AE201A");

        let prompts = agent.generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("echo: Repeats its input."));
        assert!(prompts[1].ends_with("Action Input: AE201A\nObservation: echo: AE201A\nThought:"));
    }

    #[tokio::test]
    async fn unknown_tool_lists_available_ones() {
        let model = ScriptedModel::new(&[
            "Action: search\nAction Input: AE201A",
            "Final Answer: gave up",
        ]);
        let agent = Agent::new(model, registry(), 5);

        let outcome = agent.run("What about AE201A?").await.unwrap();

        assert_eq!(outcome.answer, "gave up");
        assert_eq!(
            outcome.steps[0].observation,
            "search is not a valid tool, try one of [echo]."
        );
    }

    #[tokio::test]
    async fn step_budget_bounds_the_loop() {
        let agent = Agent::new(ScriptedModel::new(&[]), registry(), 3);

        let outcome = agent.run("loop forever").await.unwrap();

        assert_eq!(outcome.answer, STEP_BUDGET_EXHAUSTED);
        assert_eq!(outcome.steps.len(), 3);
    }

    #[tokio::test]
    async fn empty_question_is_rejected() {
        let agent = Agent::new(ScriptedModel::new(&[]), registry(), 3);
        assert!(matches!(
            agent.run("   ").await,
            Err(AppError::EmptyInput("question"))
        ));
    }
}
