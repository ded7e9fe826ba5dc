use async_trait::async_trait;
use caravan::client_wrapper::{ClientWrapper, Message, Role};
use caravan::react::ReactAgent;
use caravan::tool_protocol::{ToolMetadata, ToolRegistry, ToolResult};
use caravan::tool_protocols::CustomToolProtocol;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Replays a scripted sequence of model outputs; repeats the last one when
/// the script runs dry.
struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl ScriptedClient {
    fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            last: Mutex::new(String::new()),
        })
    }
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    fn model_name(&self) -> &str {
        "scripted-react"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
    ) -> Result<Message, Box<dyn std::error::Error>> {
        let mut queue = self.responses.lock().await;
        let content = match queue.pop_front() {
            Some(content) => {
                *self.last.lock().await = content.clone();
                content
            }
            None => self.last.lock().await.clone(),
        };
        Ok(Message {
            role: Role::Assistant,
            content,
        })
    }
}

/// Registry with a single `search` tool that counts invocations and echoes
/// the query back.
async fn search_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
    let executions = Arc::new(AtomicUsize::new(0));
    let counter = executions.clone();

    let protocol = CustomToolProtocol::new();
    protocol
        .register_tool(
            ToolMetadata::new("search", "Searches for things"),
            Arc::new(move |params| {
                counter.fetch_add(1, Ordering::SeqCst);
                let query = params.get("query").and_then(|v| v.as_str()).unwrap_or("");
                Ok(ToolResult::success(serde_json::Value::String(format!(
                    "results about {}",
                    query
                ))))
            }),
        )
        .await;

    let mut registry = ToolRegistry::empty();
    registry
        .add_protocol("local", Arc::new(protocol))
        .await
        .unwrap();
    (registry, executions)
}

#[tokio::test]
async fn react_loop_executes_action_then_finishes() {
    let client = ScriptedClient::new(vec![
        "Thought: I should search.\nAction: search\nAction Input: {\"query\": \"tunisia\"}",
        "Thought: I have what I need.\nFinal Answer: Tunisia is lovely in March.",
    ]);
    let (registry, executions) = search_registry().await;

    let agent = ReactAgent::new("r1", "Researcher", client, registry);
    let outcome = agent.run("research tunisia").await.unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.answer, "Tunisia is lovely in March.");
    assert_eq!(executions.load(Ordering::SeqCst), 1);

    // First step records the action and its observation
    assert_eq!(outcome.steps.len(), 2);
    assert_eq!(outcome.steps[0].action.as_deref(), Some("search"));
    assert_eq!(
        outcome.steps[0].observation.as_deref(),
        Some("results about tunisia")
    );
    // Final step carries no action
    assert!(outcome.steps[1].action.is_none());
}

#[tokio::test]
async fn react_loop_chains_multiple_actions() {
    let client = ScriptedClient::new(vec![
        "Thought: pillar one.\nAction: search\nAction Input: {\"query\": \"programs\"}",
        "Thought: pillar two.\nAction: search\nAction Input: {\"query\": \"research\"}",
        "Final Answer: compiled report",
    ]);
    let (registry, executions) = search_registry().await;

    let agent = ReactAgent::new("r1", "Researcher", client, registry);
    let outcome = agent.run("two pillars").await.unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.answer, "compiled report");
    assert_eq!(executions.load(Ordering::SeqCst), 2);
    assert_eq!(outcome.steps[0].action_input["query"], "programs");
    assert_eq!(outcome.steps[1].action_input["query"], "research");
}

#[tokio::test]
async fn react_loop_stops_at_step_cap() {
    // The model never concludes
    let client = ScriptedClient::new(vec![
        "Thought: again.\nAction: search\nAction Input: {\"query\": \"loop\"}",
    ]);
    let (registry, executions) = search_registry().await;

    let agent = ReactAgent::new("r1", "Researcher", client, registry).with_max_steps(3);
    let outcome = agent.run("never ends").await.unwrap();

    assert!(!outcome.completed);
    assert_eq!(executions.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.steps.len(), 3);
    // The cap answer is the last raw model reply
    assert!(outcome.answer.contains("Action: search"));
}

#[tokio::test]
async fn react_treats_plain_reply_as_final_answer() {
    let client = ScriptedClient::new(vec!["Here is everything you asked for."]);
    let (registry, executions) = search_registry().await;

    let agent = ReactAgent::new("r1", "Researcher", client, registry);
    let outcome = agent.run("simple question").await.unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.answer, "Here is everything you asked for.");
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn react_reports_tool_failures_as_observations() {
    let client = ScriptedClient::new(vec![
        "Action: missing_tool\nAction Input: {}",
        "Final Answer: I adapted.",
    ]);
    let (registry, _) = search_registry().await;

    let agent = ReactAgent::new("r1", "Researcher", client, registry);
    let outcome = agent.run("use a bad tool").await.unwrap();

    assert!(outcome.completed);
    assert_eq!(outcome.answer, "I adapted.");
    let observation = outcome.steps[0].observation.as_deref().unwrap();
    assert!(observation.contains("missing_tool"));
    assert!(observation.contains("error") || observation.contains("not found"));
}
