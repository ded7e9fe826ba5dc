use async_trait::async_trait;
use caravan::client_wrapper::{ClientWrapper, Message, Role};
use caravan::tool_protocol::{ToolMetadata, ToolRegistry, ToolResult};
use caravan::tool_protocols::CustomToolProtocol;
use caravan::Agent;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock client that replays a scripted sequence of responses.
/// Once the script is exhausted, the last response repeats.
struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
    last_response: Mutex<String>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(responses: Vec<&str>) -> Self {
        let mut queue = VecDeque::new();
        for response in responses {
            queue.push_back(response.to_string());
        }
        Self {
            responses: Mutex::new(queue),
            last_response: Mutex::new("done".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientWrapper for ScriptedClient {
    fn model_name(&self) -> &str {
        "scripted-mock"
    }

    async fn send_message(
        &self,
        _messages: &[Message],
    ) -> Result<Message, Box<dyn std::error::Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.responses.lock().await;
        let content = match queue.pop_front() {
            Some(content) => {
                *self.last_response.lock().await = content.clone();
                content
            }
            None => self.last_response.lock().await.clone(),
        };
        Ok(Message {
            role: Role::Assistant,
            content,
        })
    }
}

/// Build a registry with one `lookup` tool that records its invocations.
async fn lookup_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
    let executions = Arc::new(AtomicUsize::new(0));
    let counter = executions.clone();

    let protocol = CustomToolProtocol::new();
    protocol
        .register_tool(
            ToolMetadata::new("lookup", "Looks something up"),
            Arc::new(move |params| {
                counter.fetch_add(1, Ordering::SeqCst);
                let key = params.get("key").and_then(|v| v.as_str()).unwrap_or("");
                Ok(ToolResult::success(serde_json::Value::String(format!(
                    "value-for-{}",
                    key
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
async fn test_agent_builder_pattern() {
    let agent = Agent::new(
        "analyst",
        "Technical Analyst",
        Arc::new(ScriptedClient::new(vec![])),
    )
    .with_expertise("Cloud Architecture")
    .with_personality("Direct and analytical")
    .with_instructions("Always cite sources.")
    .with_metadata("department", "Engineering");

    assert_eq!(agent.id, "analyst");
    assert_eq!(agent.name, "Technical Analyst");
    assert_eq!(agent.expertise, Some("Cloud Architecture".to_string()));
    assert_eq!(agent.personality, Some("Direct and analytical".to_string()));
    assert_eq!(agent.instructions, Some("Always cite sources.".to_string()));
    assert_eq!(
        agent.metadata.get("department"),
        Some(&"Engineering".to_string())
    );
}

#[tokio::test]
async fn test_send_without_tools_returns_model_text() {
    let client = Arc::new(ScriptedClient::new(vec!["plain answer"]));
    let mut agent = Agent::new("a1", "Agent", client.clone());

    let response = agent.send("question").await.unwrap();
    assert_eq!(response.content, "plain answer");
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_tool_loop_executes_and_feeds_result_back() {
    let client = Arc::new(ScriptedClient::new(vec![
        r#"Let me check. {"tool_call": {"name": "lookup", "parameters": {"key": "alpha"}}}"#,
        "The stored value is value-for-alpha.",
    ]));

    let (registry, executions) = lookup_registry().await;
    let mut agent = Agent::new("a1", "Agent", client.clone()).with_tools(registry);

    let response = agent.send("what is alpha?").await.unwrap();
    assert_eq!(response.content, "The stored value is value-for-alpha.");
    assert_eq!(executions.load(Ordering::SeqCst), 1);
    // Initial call + follow-up after the tool result
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_tool_loop_caps_iterations_with_warning() {
    // The model never stops asking for the tool
    let client = Arc::new(ScriptedClient::new(vec![
        r#"{"tool_call": {"name": "lookup", "parameters": {"key": "loop"}}}"#,
    ]));

    let (registry, executions) = lookup_registry().await;
    let mut agent = Agent::new("a1", "Agent", client).with_tools(registry);

    let response = agent.send("loop forever").await.unwrap();
    assert!(response
        .content
        .contains("[Warning: Maximum tool iterations reached]"));
    assert_eq!(executions.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_unknown_tool_failure_is_fed_back_not_fatal() {
    let client = Arc::new(ScriptedClient::new(vec![
        r#"{"tool_call": {"name": "no_such_tool", "parameters": {}}}"#,
        "I could not use that tool.",
    ]));

    let mut agent = Agent::new("a1", "Agent", client);
    let response = agent.send("try a missing tool").await.unwrap();
    assert_eq!(response.content, "I could not use that tool.");
}

#[tokio::test]
async fn test_fork_shares_tools_but_not_session() {
    let client = Arc::new(ScriptedClient::new(vec!["reply"]));
    let (registry, _) = lookup_registry().await;

    let mut agent = Agent::new("a1", "Agent", client)
        .with_expertise("Testing")
        .with_tools(registry);
    agent.receive_message(Role::User, "context".to_string());
    assert_eq!(agent.session_history_len(), 1);

    let forked = agent.fork();
    assert_eq!(forked.id, agent.id);
    assert_eq!(forked.expertise, agent.expertise);
    assert_eq!(forked.session_history_len(), 0);
    assert_eq!(forked.list_tools().await, agent.list_tools().await);

    let carried = agent.fork_with_context();
    assert_eq!(carried.session_history_len(), 1);
}

#[tokio::test]
async fn test_resume_from_memory_injects_recall_context() {
    use caravan::memory_log::{MemoryKind, MemoryLog};
    use tokio::sync::RwLock;

    let dir = tempfile::tempdir().unwrap();
    let mut log = MemoryLog::open(dir.path(), "demo_user").unwrap();
    log.append(MemoryKind::Preference, "Prefers beach destinations")
        .unwrap();
    let log = Arc::new(RwLock::new(log));

    let agent = Agent::resume_from_memory(
        "assistant",
        "Assistant",
        Arc::new(ScriptedClient::new(vec![])),
        32_000,
        log.clone(),
    )
    .unwrap();

    // The recall prompt landed in the fresh session
    assert_eq!(agent.session_history_len(), 1);

    // remember() appends through the shared log
    agent
        .remember(MemoryKind::Fact, "Travels from London")
        .await
        .unwrap();
    let entries = agent.memory_entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(log.read().await.verify_integrity());

    // A fresh log for the same user starts with no recall context
    let empty = Arc::new(RwLock::new(
        MemoryLog::open(dir.path(), "someone_else").unwrap(),
    ));
    let blank = Agent::resume_from_memory(
        "assistant",
        "Assistant",
        Arc::new(ScriptedClient::new(vec![])),
        32_000,
        empty,
    )
    .unwrap();
    assert_eq!(blank.session_history_len(), 0);
}

#[tokio::test]
async fn test_shared_registry_mutations_visible_across_agents() {
    let client = || Arc::new(ScriptedClient::new(vec![]));
    let shared = Arc::new(tokio::sync::RwLock::new(ToolRegistry::empty()));

    let agent_a = Agent::new("a", "Agent A", client()).with_shared_tools(shared.clone());
    let agent_b = Agent::new("b", "Agent B", client()).with_shared_tools(shared);

    let protocol = CustomToolProtocol::new();
    protocol
        .register_tool(
            ToolMetadata::new("shared_tool", "Visible to everyone"),
            Arc::new(|_| Ok(ToolResult::success(serde_json::Value::Null))),
        )
        .await;
    agent_a
        .add_protocol("local", Arc::new(protocol))
        .await
        .unwrap();

    assert_eq!(agent_b.list_tools().await, vec!["shared_tool".to_string()]);

    agent_b.remove_protocol("local").await;
    assert!(agent_a.list_tools().await.is_empty());
}
