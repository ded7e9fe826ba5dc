use async_trait::async_trait;
use caravan::client_wrapper::{ClientWrapper, Message, Role};
use caravan::team::{Team, TeamError, TeamMode};
use caravan::Agent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock client that answers with a fixed response and records the message
/// arrays it was asked to complete.
struct MockClient {
    name: String,
    response: String,
    seen_requests: Mutex<Vec<Vec<String>>>,
    calls: AtomicUsize,
}

impl MockClient {
    fn new(name: &str, response: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            response: response.to_string(),
            seen_requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    async fn seen(&self) -> Vec<Vec<String>> {
        self.seen_requests.lock().await.clone()
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn send_message(
        &self,
        messages: &[Message],
    ) -> Result<Message, Box<dyn std::error::Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_requests
            .lock()
            .await
            .push(messages.iter().map(|m| m.content.clone()).collect());
        Ok(Message {
            role: Role::Assistant,
            content: self.response.clone(),
        })
    }
}

#[tokio::test]
async fn coordinate_mode_engages_members_in_registration_order() {
    let mut team = Team::new("t1", "Test Team").with_mode(TeamMode::Coordinate);
    team.add_member(Agent::new("first", "First", MockClient::new("m1", "alpha")))
        .unwrap();
    team.add_member(Agent::new("second", "Second", MockClient::new("m2", "beta")))
        .unwrap();

    let response = team.run("go").await.unwrap();

    assert!(response.is_complete);
    assert_eq!(response.messages.len(), 2);
    assert_eq!(response.messages[0].member_id.as_deref(), Some("first"));
    assert_eq!(&*response.messages[0].content, "alpha");
    assert_eq!(response.messages[1].member_id.as_deref(), Some("second"));
    assert_eq!(&*response.messages[1].content, "beta");
    // No coordinator configured, so no synthesis
    assert!(response.final_answer.is_none());
}

#[tokio::test]
async fn shared_interactions_route_earlier_responses_to_later_members() {
    let second_client = MockClient::new("m2", "beta");

    let mut team = Team::new("t1", "Test Team")
        .with_mode(TeamMode::Coordinate)
        .share_member_interactions(true);
    team.add_member(Agent::new("first", "First", MockClient::new("m1", "alpha")))
        .unwrap();
    team.add_member(Agent::new("second", "Second", second_client.clone()))
        .unwrap();

    team.run("go").await.unwrap();

    // The second member's request contains the first member's routed response
    let seen = second_client.seen().await;
    assert_eq!(seen.len(), 1);
    assert!(
        seen[0].iter().any(|content| content.contains("[First]: alpha")),
        "second member should see the first member's response: {:?}",
        seen[0]
    );
}

#[tokio::test]
async fn coordinator_synthesizes_member_findings() {
    let coordinator = MockClient::new("coordinator", "the final plan");

    let mut team = Team::new("t1", "Test Team")
        .with_mode(TeamMode::Coordinate)
        .with_description("Plan trips.")
        .with_instruction("1. Gather findings")
        .with_coordinator(coordinator.clone());
    team.add_member(Agent::new("first", "First", MockClient::new("m1", "alpha")))
        .unwrap();

    let response = team.run("go").await.unwrap();

    assert_eq!(response.final_answer.as_deref(), Some("the final plan"));
    // Synthesis message is appended after member messages and unattributed
    let last = response.messages.last().unwrap();
    assert!(last.member_id.is_none());
    assert_eq!(last.metadata.get("synthesis").map(String::as_str), Some("true"));

    // The coordinator saw the member findings in its request
    let seen = coordinator.seen().await;
    assert!(seen[0].iter().any(|content| content.contains("[First]:")));
    assert!(seen[0].iter().any(|content| content.contains("go")));
}

#[tokio::test]
async fn broadcast_mode_collects_one_message_per_member() {
    let mut team = Team::new("t1", "Parallel Team").with_mode(TeamMode::Broadcast);
    team.add_member(Agent::new("a", "A", MockClient::new("m1", "from a")))
        .unwrap();
    team.add_member(Agent::new("b", "B", MockClient::new("m2", "from b")))
        .unwrap();
    team.add_member(Agent::new("c", "C", MockClient::new("m3", "from c")))
        .unwrap();

    let response = team.run("go").await.unwrap();

    assert!(response.is_complete);
    assert_eq!(response.messages.len(), 3);
    let mut ids: Vec<_> = response
        .messages
        .iter()
        .filter_map(|m| m.member_id.clone())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn nested_subteam_contributes_one_member_message() {
    // Broadcast sub-team with its own coordinator
    let mut subteam = Team::new("tech", "Technical Team")
        .with_mode(TeamMode::Broadcast)
        .with_coordinator(MockClient::new("sub-coord", "technical verdict"));
    subteam
        .add_member(Agent::new("backend", "Backend", MockClient::new("m1", "backend fine")))
        .unwrap();
    subteam
        .add_member(Agent::new("frontend", "Frontend", MockClient::new("m2", "frontend fine")))
        .unwrap();

    // Coordinate parent: sub-team first, then an individual analyst
    let mut committee = Team::new("committee", "Committee")
        .with_mode(TeamMode::Coordinate)
        .with_coordinator(MockClient::new("coord", "final decision"));
    committee.add_subteam(subteam).unwrap();
    committee
        .add_member(Agent::new("business", "Business", MockClient::new("m3", "market fine")))
        .unwrap();

    let response = committee.run("evaluate the startup").await.unwrap();

    assert!(response.is_complete);
    // sub-team message + business message + synthesis
    assert_eq!(response.messages.len(), 3);
    assert_eq!(response.messages[0].member_id.as_deref(), Some("tech"));
    // The sub-team reports through its own synthesis
    assert_eq!(&*response.messages[0].content, "technical verdict");
    assert_eq!(response.messages[1].member_id.as_deref(), Some("business"));
    assert_eq!(response.final_answer.as_deref(), Some("final decision"));
}

#[tokio::test]
async fn subteam_without_coordinator_reports_joined_member_responses() {
    let mut subteam = Team::new("sub", "Sub").with_mode(TeamMode::Broadcast);
    subteam
        .add_member(Agent::new("x", "X", MockClient::new("m1", "x says")))
        .unwrap();

    let mut parent = Team::new("parent", "Parent").with_mode(TeamMode::Coordinate);
    parent.add_subteam(subteam).unwrap();

    let response = parent.run("go").await.unwrap();
    assert_eq!(&*response.messages[0].content, "[X]: x says");
}

#[tokio::test]
async fn run_without_members_is_an_error() {
    let mut team = Team::new("t1", "Empty");
    let err = team.run("go").await.unwrap_err();
    assert!(err.to_string().contains("No members"));
}

#[tokio::test]
async fn duplicate_member_ids_are_rejected() {
    let mut team = Team::new("t1", "Team");
    team.add_member(Agent::new("dup", "One", MockClient::new("m1", "r")))
        .unwrap();
    let err = team
        .add_member(Agent::new("dup", "Two", MockClient::new("m2", "r")))
        .unwrap_err();
    assert!(matches!(err, TeamError::DuplicateMember(_)));
}

#[tokio::test]
async fn transcript_accumulates_across_runs() {
    let mut team = Team::new("t1", "Team").with_mode(TeamMode::Coordinate);
    team.add_member(Agent::new("a", "A", MockClient::new("m1", "r")))
        .unwrap();

    team.run("first").await.unwrap();
    team.run("second").await.unwrap();

    // 2 user prompts + 2 member responses
    assert_eq!(team.get_conversation_history().len(), 4);

    team.clear_history();
    assert!(team.get_conversation_history().is_empty());
}
