//! ReAct agent: iterative reasoning with tools.
//!
//! [`ReactAgent`] drives a Thought → Action → Observation loop over a
//! [`ToolRegistry`]: the model is instructed to emit its reasoning in a fixed
//! text format, the agent parses the `Action:` / `Action Input:` block,
//! executes the named tool, feeds the result back as an `Observation:`, and
//! repeats until the model produces a `Final Answer:` (or the step cap is
//! reached).
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::react::ReactAgent;
//! use caravan::model_factory::ModelFactory;
//! use caravan::tool_protocol::ToolRegistry;
//!
//! # async {
//! let client = ModelFactory::create_client()?;
//! let registry = ToolRegistry::empty();
//!
//! let agent = ReactAgent::new("researcher", "Research Agent", client, registry)
//!     .with_max_steps(8);
//!
//! let outcome = agent.run("Write a short report about ENIT.").await?;
//! println!("{}", outcome.answer);
//! for step in &outcome.steps {
//!     println!("step: {:?} -> {:?}", step.action, step.observation);
//! }
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! # };
//! ```

use crate::caravan::event::{EventHandler, ReactEvent};
use crate::caravan::tool_protocol::ToolRegistry;
use crate::client_wrapper::{ClientWrapper, Message, Role, TokenUsage};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default bound on reasoning steps.
const DEFAULT_MAX_STEPS: usize = 10;

/// The reasoning format mandate injected into every system prompt.
const REACT_FORMAT: &str = "\
Follow the ReAct pattern. For every step of your reasoning, output:

Thought: [what you need to do next and why]
Action: [the tool to call]
Action Input: [the input to the tool as a JSON object]

After each tool result you will receive an 'Observation:' line. Base your
next Thought on it. Call tools ONE AT A TIME. When you have everything you
need, output:

Final Answer: [your complete answer]";

/// One recorded reasoning step.
#[derive(Debug, Clone)]
pub struct ReactStep {
    /// The model's stated thought for this step, when present.
    pub thought: Option<String>,
    /// The tool the model chose to call, when it chose one.
    pub action: Option<String>,
    /// The JSON input passed to the tool.
    pub action_input: serde_json::Value,
    /// The textual observation fed back to the model.
    pub observation: Option<String>,
}

/// The result of a [`ReactAgent::run`] call.
#[derive(Debug, Clone)]
pub struct ReactOutcome {
    /// The final answer text (or the last raw response if the step cap hit).
    pub answer: String,
    /// Every reasoning step in order.
    pub steps: Vec<ReactStep>,
    /// Whether the loop terminated with a `Final Answer:` rather than the cap.
    pub completed: bool,
    /// Token usage aggregated across all LLM calls, when the client reports it.
    pub tokens_used: Option<TokenUsage>,
}

/// An agent that reasons iteratively with tools in the ReAct style.
pub struct ReactAgent {
    /// Stable identifier used in events.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    client: Arc<dyn ClientWrapper>,
    tools: Arc<RwLock<ToolRegistry>>,
    system_prompt: String,
    max_steps: usize,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl ReactAgent {
    /// Create a ReAct agent over the given client and tool registry.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        client: Arc<dyn ClientWrapper>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            client,
            tools: Arc::new(RwLock::new(tools)),
            system_prompt: String::new(),
            max_steps: DEFAULT_MAX_STEPS,
            event_handler: None,
        }
    }

    /// Share a tool registry with other agents (builder pattern).
    pub fn with_shared_tools(mut self, tools: Arc<RwLock<ToolRegistry>>) -> Self {
        self.tools = tools;
        self
    }

    /// Prepend task-specific guidance to the built-in format mandate
    /// (builder pattern).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Override the default step cap (builder pattern).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Attach an [`EventHandler`] for step observability (builder pattern).
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    async fn emit(&self, event: ReactEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_react_event(&event).await;
        }
    }

    /// Run the Thought → Action → Observation loop for `task`.
    ///
    /// Each iteration sends the accumulated transcript, parses the action
    /// block out of the model's reply, executes the tool through the
    /// registry, and appends the observation. The loop ends on
    /// `Final Answer:`, on a reply with no parsable action, or at
    /// `max_steps` (in which case `completed` is false and the last raw
    /// reply becomes the answer).
    pub async fn run(&self, task: &str) -> Result<ReactOutcome, Box<dyn Error + Send + Sync>> {
        let system = self.build_system_prompt().await;

        let mut messages = vec![
            Message {
                role: Role::System,
                content: system,
            },
            Message {
                role: Role::User,
                content: task.to_string(),
            },
        ];

        let mut steps: Vec<ReactStep> = Vec::new();
        let mut total_input = 0;
        let mut total_output = 0;
        let mut total = 0;

        for step_number in 1..=self.max_steps {
            self.emit(ReactEvent::StepStarted {
                agent_id: self.id.clone(),
                step: step_number,
            })
            .await;

            let response = self.client.send_message(&messages).await.map_err(|e| {
                Box::new(ReactError(e.to_string())) as Box<dyn Error + Send + Sync>
            })?;

            if let Some(usage) = self.client.get_last_usage().await {
                total_input += usage.input_tokens;
                total_output += usage.output_tokens;
                total += usage.total_tokens;
            }

            let text = response.content.clone();

            // Terminal: the model declared its final answer
            if let Some(answer) = extract_final_answer(&text) {
                steps.push(ReactStep {
                    thought: extract_section(&text, "Thought:"),
                    action: None,
                    action_input: serde_json::Value::Null,
                    observation: None,
                });
                self.emit(ReactEvent::Finished {
                    agent_id: self.id.clone(),
                    steps: steps.len(),
                    completed: true,
                })
                .await;
                return Ok(ReactOutcome {
                    answer,
                    steps,
                    completed: true,
                    tokens_used: usage_totals(total_input, total_output, total),
                });
            }

            let (action, action_input) = match parse_action(&text) {
                Some(parsed) => parsed,
                None => {
                    // No action and no final answer marker: treat the whole
                    // reply as the answer rather than looping on nothing.
                    steps.push(ReactStep {
                        thought: extract_section(&text, "Thought:"),
                        action: None,
                        action_input: serde_json::Value::Null,
                        observation: None,
                    });
                    self.emit(ReactEvent::Finished {
                        agent_id: self.id.clone(),
                        steps: steps.len(),
                        completed: true,
                    })
                    .await;
                    return Ok(ReactOutcome {
                        answer: text,
                        steps,
                        completed: true,
                        tokens_used: usage_totals(total_input, total_output, total),
                    });
                }
            };

            self.emit(ReactEvent::ActionParsed {
                agent_id: self.id.clone(),
                step: step_number,
                tool_name: action.clone(),
                action_input: action_input.clone(),
            })
            .await;

            let observation = {
                let registry = self.tools.read().await;
                match registry.execute_tool(&action, action_input.clone()).await {
                    Ok(result) => {
                        if result.success {
                            result.output_text()
                        } else {
                            format!(
                                "Tool '{}' failed: {}",
                                action,
                                result.error.unwrap_or_else(|| "Unknown error".to_string())
                            )
                        }
                    }
                    Err(e) => format!("Tool '{}' error: {}", action, e),
                }
            };

            self.emit(ReactEvent::ObservationRecorded {
                agent_id: self.id.clone(),
                step: step_number,
                observation_length: observation.len(),
            })
            .await;

            steps.push(ReactStep {
                thought: extract_section(&text, "Thought:"),
                action: Some(action),
                action_input,
                observation: Some(observation.clone()),
            });

            messages.push(Message {
                role: Role::Assistant,
                content: text,
            });
            messages.push(Message {
                role: Role::User,
                content: format!("Observation: {}", observation),
            });
        }

        // Step cap reached without a final answer
        self.emit(ReactEvent::Finished {
            agent_id: self.id.clone(),
            steps: steps.len(),
            completed: false,
        })
        .await;

        let answer = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(ReactOutcome {
            answer,
            steps,
            completed: false,
            tokens_used: usage_totals(total_input, total_output, total),
        })
    }

    /// Compose the system prompt: caller guidance, format mandate, tool list.
    async fn build_system_prompt(&self) -> String {
        let mut prompt = String::new();
        if !self.system_prompt.is_empty() {
            prompt.push_str(&self.system_prompt);
            prompt.push_str("\n\n");
        }
        prompt.push_str(REACT_FORMAT);

        let registry = self.tools.read().await;
        let tools = registry.list_tools();
        if !tools.is_empty() {
            prompt.push_str("\n\nAvailable tools:\n");
            for tool in tools {
                prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
                for param in &tool.parameters {
                    prompt.push_str(&format!(
                        "    {} ({:?}{})\n",
                        param.name,
                        param.param_type,
                        if param.required { ", required" } else { "" },
                    ));
                }
            }
        }
        prompt
    }
}

/// Error raised when the underlying LLM call fails mid-loop.
#[derive(Debug, Clone)]
pub struct ReactError(pub String);

impl std::fmt::Display for ReactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReAct error: {}", self.0)
    }
}

impl Error for ReactError {}

fn usage_totals(input: usize, output: usize, total: usize) -> Option<TokenUsage> {
    if total > 0 {
        Some(TokenUsage {
            input_tokens: input,
            output_tokens: output,
            total_tokens: total,
        })
    } else {
        None
    }
}

/// Extract the text following a `Final Answer:` marker, if present.
fn extract_final_answer(text: &str) -> Option<String> {
    let idx = text.find("Final Answer:")?;
    let answer = text[idx + "Final Answer:".len()..].trim();
    Some(answer.to_string())
}

/// Extract the first line-level section following `marker` (e.g. `Thought:`).
fn extract_section(text: &str, marker: &str) -> Option<String> {
    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix(marker) {
            let value = rest.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Parse the `Action:` / `Action Input:` block out of a model reply.
///
/// The action name is taken from the remainder of the `Action:` line. The
/// input is the first JSON object found after the `Action Input:` marker,
/// extracted by brace counting so trailing prose doesn't break parsing.
/// Missing or malformed input degrades to an empty JSON object rather than
/// failing the step.
fn parse_action(text: &str) -> Option<(String, serde_json::Value)> {
    let action = extract_section(text, "Action:")?;
    // Guard against "Action: FINISH"-style non-tools
    if action.eq_ignore_ascii_case("finish") || action.eq_ignore_ascii_case("none") {
        return None;
    }

    let input = text
        .find("Action Input:")
        .map(|idx| &text[idx + "Action Input:".len()..])
        .and_then(extract_json_object)
        .unwrap_or_else(|| serde_json::json!({}));

    Some((action, input))
}

/// Find and parse the first brace-balanced JSON object in `text`.
fn extract_json_object(text: &str) -> Option<serde_json::Value> {
    let start = text.find('{')?;
    let mut brace_count = 0;
    let mut end = start;
    for (i, ch) in text.char_indices().skip_while(|(i, _)| *i < start) {
        if ch == '{' {
            brace_count += 1;
        } else if ch == '}' {
            brace_count -= 1;
            if brace_count == 0 {
                end = i + ch.len_utf8();
                break;
            }
        }
    }
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..end]).ok()
}
