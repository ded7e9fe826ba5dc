//! Team runtime: multi-agent delegation.
//!
//! A [`Team`] owns an ordered set of members — [`Agent`]s or nested sub-teams
//! — a delegation [`TeamMode`], and a running transcript. Call [`Team::run`]
//! to execute a request across the members and receive a [`TeamResponse`].
//!
//! Two modes are provided:
//!
//! - **Coordinate** — members are engaged sequentially in registration order;
//!   when `share_member_interactions` is set, each member sees the responses
//!   produced before its turn. An optional coordinator model then synthesizes
//!   the member findings into a final answer.
//! - **Broadcast** — every agent member is forked and engaged in parallel
//!   with the same request; sub-team members run inline afterwards. Synthesis
//!   works the same way.
//!
//! Nesting a broadcast sub-team inside a coordinate team yields the hybrid
//! topology: parallel specialists inside a sequential committee.
//!
//! # Example
//!
//! ```rust,no_run
//! use caravan::{Agent, team::{Team, TeamMode}};
//! use caravan::model_factory::ModelFactory;
//!
//! # async {
//! let client = ModelFactory::create_client()?;
//!
//! let mut team = Team::new("travel-team", "Travel Planning Team")
//!     .with_mode(TeamMode::Coordinate)
//!     .with_description("Coordinate Tunisia travel booking.")
//!     .with_instruction("1. Ask the Flight Specialist to find flights from London to Tunisia")
//!     .with_instruction("2. Ask the Hotel Specialist to find hotels in Tunisia")
//!     .with_instruction("3. Present a complete travel plan with costs in British Pounds (£)")
//!     .with_coordinator(client.clone())
//!     .share_member_interactions(true);
//!
//! team.add_member(Agent::new("flights", "Flight Specialist", client.clone()))?;
//! team.add_member(Agent::new("hotels", "Hotel Specialist", client))?;
//!
//! let response = team.run("Plan a 5-day trip to Tunisia from London.").await?;
//! println!("{}", response.final_answer.as_deref().unwrap_or(""));
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! # };
//! ```

use crate::caravan::agent::Agent;
use crate::caravan::event::{EventHandler, TeamEvent};
use crate::client_wrapper::{ClientWrapper, Message, Role};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// How a team engages its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamMode {
    /// Members are engaged one at a time, in registration order. Later
    /// members can see earlier responses when
    /// [`share_member_interactions`](Team::share_member_interactions) is set.
    Coordinate,

    /// Every agent member is forked into its own task and engaged in
    /// parallel with the same request. Sub-team members run inline after the
    /// parallel sweep.
    Broadcast,
}

impl TeamMode {
    fn as_str(&self) -> &'static str {
        match self {
            TeamMode::Coordinate => "coordinate",
            TeamMode::Broadcast => "broadcast",
        }
    }
}

/// A single message produced during a team run.
///
/// Every member response, user prompt, and coordinator synthesis flowing
/// through a [`Team`] is captured as a `TeamMessage`. The struct carries
/// identity and timing information alongside the text, making it easy to
/// replay or audit a multi-agent conversation.
#[derive(Debug, Clone)]
pub struct TeamMessage {
    /// UTC timestamp recorded when the message was created.
    pub timestamp: DateTime<Utc>,

    /// Identifier of the member that produced this message, or `None` for
    /// user prompts and coordinator output.
    pub member_id: Option<String>,

    /// Display name of the contributing member, or `None` for non-member
    /// messages.
    pub member_name: Option<String>,

    /// Conversation role — [`Role::User`] for prompts, [`Role::Assistant`]
    /// for member and coordinator responses.
    pub role: Role,

    /// The message body. Stored as `Arc<str>` so cloning messages is cheap.
    pub content: Arc<str>,

    /// Free-form key-value metadata attached to the message. Built-in modes
    /// populate `"mode"` and, for synthesis output, `"synthesis"`.
    pub metadata: HashMap<String, String>,
}

impl TeamMessage {
    /// Create a message with the given role and content but no member identity.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            member_id: None,
            member_name: None,
            role,
            content: Arc::from(content.into().as_str()),
            metadata: HashMap::new(),
        }
    }

    /// Create an assistant-role message attributed to a specific member.
    pub fn from_member(
        member_id: impl Into<String>,
        member_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            member_id: Some(member_id.into()),
            member_name: Some(member_name.into()),
            role: Role::Assistant,
            content: Arc::from(content.into().as_str()),
            metadata: HashMap::new(),
        }
    }

    /// Attach a key-value metadata pair to this message (builder pattern).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The result of a [`Team::run`] call.
#[derive(Debug)]
pub struct TeamResponse {
    /// Unique identifier of this run, also carried in emitted events.
    pub run_id: Uuid,

    /// Every [`TeamMessage`] generated during the run, in chronological order
    /// (member responses followed by the synthesis message, when present).
    pub messages: Vec<TeamMessage>,

    /// The coordinator's synthesized answer, when a coordinator was
    /// configured.
    pub final_answer: Option<String>,

    /// Whether every member produced a response.
    pub is_complete: bool,

    /// Approximate total tokens consumed across all members and the
    /// coordinator. Members whose clients do not report usage contribute zero.
    pub total_tokens_used: usize,
}

/// Errors that can occur during team configuration or execution.
#[derive(Debug, Clone)]
pub enum TeamError {
    /// A member id was registered twice.
    DuplicateMember(String),
    /// The configuration is structurally invalid.
    InvalidConfig(String),
    /// A runtime failure occurred while gathering member responses.
    ExecutionFailed(String),
    /// [`Team::run`] was called before any members were added.
    NoMembers,
}

impl fmt::Display for TeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamError::DuplicateMember(id) => write!(f, "Duplicate member: {}", id),
            TeamError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            TeamError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
            TeamError::NoMembers => write!(f, "No members in team"),
        }
    }
}

impl Error for TeamError {}

/// A member of a team: a single agent or a nested sub-team.
pub enum TeamMember {
    Agent(Agent),
    Team(Box<Team>),
}

impl TeamMember {
    fn id(&self) -> &str {
        match self {
            TeamMember::Agent(agent) => &agent.id,
            TeamMember::Team(team) => &team.id,
        }
    }

    fn name(&self) -> &str {
        match self {
            TeamMember::Agent(agent) => &agent.name,
            TeamMember::Team(team) => &team.name,
        }
    }
}

/// The delegation engine that coordinates members in a chosen [`TeamMode`].
pub struct Team {
    /// Stable identifier used for logging, events, and nesting.
    pub id: String,

    /// Human-readable name of this team.
    pub name: String,

    /// What this team is for; prepended to member system prompts and the
    /// synthesis prompt.
    description: String,

    /// Workflow instructions, rendered as one line each.
    instructions: Vec<String>,

    /// Registered members in engagement order.
    members: Vec<TeamMember>,

    /// The active delegation strategy.
    mode: TeamMode,

    /// Model used for the synthesis step. Without one, runs end after the
    /// last member response.
    coordinator: Option<Arc<dyn ClientWrapper>>,

    /// Whether members see the responses produced before their turn
    /// (coordinate mode only).
    share_interactions: bool,

    /// Optional observer for run/member/synthesis events.
    event_handler: Option<Arc<dyn EventHandler>>,

    /// Running transcript across runs.
    conversation_history: Vec<TeamMessage>,
}

impl Team {
    /// Create an empty team in [`TeamMode::Coordinate`].
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            instructions: Vec::new(),
            members: Vec::new(),
            mode: TeamMode::Coordinate,
            coordinator: None,
            share_interactions: false,
            event_handler: None,
            conversation_history: Vec::new(),
        }
    }

    /// Set the delegation mode (builder pattern).
    pub fn with_mode(mut self, mode: TeamMode) -> Self {
        self.mode = mode;
        self
    }

    /// Describe the team's purpose (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append one workflow instruction (builder pattern).
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Replace the workflow instructions wholesale (builder pattern).
    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Attach the model used for the synthesis step (builder pattern).
    pub fn with_coordinator(mut self, client: Arc<dyn ClientWrapper>) -> Self {
        self.coordinator = Some(client);
        self
    }

    /// Route earlier member responses into later members' context
    /// (builder pattern; coordinate mode only).
    pub fn share_member_interactions(mut self, share: bool) -> Self {
        self.share_interactions = share;
        self
    }

    /// Attach an [`EventHandler`] for run observability (builder pattern).
    ///
    /// The handler is propagated to members added afterwards.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Register an agent as the next member.
    ///
    /// The team's event handler (if any) is propagated to the agent.
    pub fn add_member(&mut self, mut agent: Agent) -> Result<(), TeamError> {
        if self.members.iter().any(|m| m.id() == agent.id) {
            return Err(TeamError::DuplicateMember(agent.id));
        }
        if let Some(handler) = &self.event_handler {
            agent.set_event_handler(handler.clone());
        }
        self.members.push(TeamMember::Agent(agent));
        Ok(())
    }

    /// Register a nested sub-team as the next member.
    pub fn add_subteam(&mut self, mut team: Team) -> Result<(), TeamError> {
        if self.members.iter().any(|m| m.id() == team.id) {
            return Err(TeamError::DuplicateMember(team.id));
        }
        if self.event_handler.is_some() && team.event_handler.is_none() {
            team.event_handler = self.event_handler.clone();
        }
        self.members.push(TeamMember::Team(Box::new(team)));
        Ok(())
    }

    /// Names of the registered members, in engagement order.
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// The running transcript accumulated across runs.
    pub fn get_conversation_history(&self) -> &[TeamMessage] {
        &self.conversation_history
    }

    /// Drop the accumulated transcript.
    pub fn clear_history(&mut self) {
        self.conversation_history.clear();
    }

    /// Emit a [`TeamEvent`] to the registered handler (no-op without one).
    async fn emit(&self, event: TeamEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_team_event(&event).await;
        }
    }

    /// Execute a request across the team's members.
    ///
    /// # Errors
    ///
    /// Returns [`TeamError::NoMembers`] if no members have been registered.
    /// Individual member failures do not abort the run — the failure is
    /// reported via [`TeamEvent::MemberFailed`] and `is_complete` is false.
    pub async fn run(
        &mut self,
        request: &str,
    ) -> Result<TeamResponse, Box<dyn Error + Send + Sync>> {
        if self.members.is_empty() {
            return Err(Box::new(TeamError::NoMembers));
        }

        let run_id = Uuid::new_v4();
        self.emit(TeamEvent::RunStarted {
            team_id: self.id.clone(),
            team_name: self.name.clone(),
            run_id: run_id.to_string(),
            mode: self.mode.as_str().to_string(),
            member_count: self.members.len(),
        })
        .await;

        self.conversation_history
            .push(TeamMessage::new(Role::User, request));

        let (mut messages, mut total_tokens, mut all_responded) = match self.mode {
            TeamMode::Coordinate => self.engage_coordinate(request).await?,
            TeamMode::Broadcast => self.engage_broadcast(request).await?,
        };

        // Synthesis step
        let final_answer = if let Some(coordinator) = self.coordinator.clone() {
            self.emit(TeamEvent::SynthesisStarted {
                team_id: self.id.clone(),
            })
            .await;

            match self.synthesize(&coordinator, request, &messages).await {
                Ok((answer, tokens)) => {
                    total_tokens += tokens;
                    self.emit(TeamEvent::SynthesisCompleted {
                        team_id: self.id.clone(),
                        response_length: answer.len(),
                    })
                    .await;

                    let msg = TeamMessage::new(Role::Assistant, answer.clone())
                        .with_metadata("synthesis", "true")
                        .with_metadata("mode", self.mode.as_str());
                    messages.push(msg.clone());
                    self.conversation_history.push(msg);
                    Some(answer)
                }
                Err(e) => {
                    log::error!("Team '{}': synthesis failed: {}", self.id, e);
                    all_responded = false;
                    None
                }
            }
        } else {
            None
        };

        self.emit(TeamEvent::RunCompleted {
            team_id: self.id.clone(),
            run_id: run_id.to_string(),
            total_tokens,
            message_count: messages.len(),
            is_complete: all_responded,
        })
        .await;

        Ok(TeamResponse {
            run_id,
            messages,
            final_answer,
            is_complete: all_responded,
            total_tokens_used: total_tokens,
        })
    }

    /// Coordinate mode: engage members one at a time, in order.
    async fn engage_coordinate(
        &mut self,
        request: &str,
    ) -> Result<(Vec<TeamMessage>, usize, bool), Box<dyn Error + Send + Sync>> {
        let system_context = self.system_context();
        let team_id = self.id.clone();
        let share = self.share_interactions;
        let event_handler = self.event_handler.clone();

        let mut messages: Vec<TeamMessage> = Vec::new();
        let mut total_tokens = 0;
        let mut all_responded = true;

        for index in 0..self.members.len() {
            let (member_id, member_name) = {
                let member = &self.members[index];
                (member.id().to_string(), member.name().to_string())
            };

            if let Some(handler) = &event_handler {
                handler
                    .on_team_event(&TeamEvent::MemberStarted {
                        team_id: team_id.clone(),
                        member_id: member_id.clone(),
                        member_name: member_name.clone(),
                    })
                    .await;
            }

            let result = match &mut self.members[index] {
                TeamMember::Agent(agent) => {
                    agent.set_system_prompt(&system_context);
                    if share {
                        for msg in &messages {
                            if let Some(name) = &msg.member_name {
                                agent.receive_message(
                                    Role::Assistant,
                                    format!("[{}]: {}", name, msg.content),
                                );
                            }
                        }
                    }
                    agent.send(request).await.map(|response| {
                        (response.content, response.tokens_used.map(|u| u.total_tokens))
                    })
                }
                TeamMember::Team(subteam) => {
                    // Box the recursive call so the future stays finitely sized
                    Box::pin(subteam.run(request)).await.map(|response| {
                        let content = subteam_contribution(&response);
                        (content, Some(response.total_tokens_used))
                    })
                }
            };

            match result {
                Ok((content, tokens)) => {
                    total_tokens += tokens.unwrap_or(0);

                    if let Some(handler) = &event_handler {
                        handler
                            .on_team_event(&TeamEvent::MemberResponded {
                                team_id: team_id.clone(),
                                member_id: member_id.clone(),
                                member_name: member_name.clone(),
                                tokens_used: None,
                                response_length: content.len(),
                            })
                            .await;
                    }

                    let msg = TeamMessage::from_member(&member_id, &member_name, content)
                        .with_metadata("mode", TeamMode::Coordinate.as_str());
                    messages.push(msg.clone());
                    self.conversation_history.push(msg);
                }
                Err(e) => {
                    all_responded = false;
                    if let Some(handler) = &event_handler {
                        handler
                            .on_team_event(&TeamEvent::MemberFailed {
                                team_id: team_id.clone(),
                                member_id,
                                member_name,
                                error: e.to_string(),
                            })
                            .await;
                    }
                }
            }
        }

        Ok((messages, total_tokens, all_responded))
    }

    /// Broadcast mode: fork agent members into parallel tasks, then run
    /// sub-team members inline.
    async fn engage_broadcast(
        &mut self,
        request: &str,
    ) -> Result<(Vec<TeamMessage>, usize, bool), Box<dyn Error + Send + Sync>> {
        let system_context = self.system_context();
        let team_id = self.id.clone();
        let event_handler = self.event_handler.clone();

        let mut tasks = Vec::new();
        let mut subteam_indices = Vec::new();

        for (index, member) in self.members.iter().enumerate() {
            match member {
                TeamMember::Agent(agent) => {
                    let mut forked = agent.fork();
                    forked.set_system_prompt(&system_context);
                    let request = request.to_string();

                    if let Some(handler) = &event_handler {
                        handler
                            .on_team_event(&TeamEvent::MemberStarted {
                                team_id: team_id.clone(),
                                member_id: forked.id.clone(),
                                member_name: forked.name.clone(),
                            })
                            .await;
                    }

                    tasks.push(tokio::spawn(async move {
                        let result = forked.send(&request).await;
                        (forked.id.clone(), forked.name.clone(), result)
                    }));
                }
                TeamMember::Team(_) => subteam_indices.push(index),
            }
        }

        let mut messages: Vec<TeamMessage> = Vec::new();
        let mut total_tokens = 0;
        let mut all_responded = true;

        for task in tasks {
            let (member_id, member_name, result) = task.await.map_err(|e| {
                Box::new(TeamError::ExecutionFailed(format!("Task join error: {}", e)))
                    as Box<dyn Error + Send + Sync>
            })?;

            match result {
                Ok(response) => {
                    if let Some(usage) = &response.tokens_used {
                        total_tokens += usage.total_tokens;
                    }

                    if let Some(handler) = &event_handler {
                        handler
                            .on_team_event(&TeamEvent::MemberResponded {
                                team_id: team_id.clone(),
                                member_id: member_id.clone(),
                                member_name: member_name.clone(),
                                tokens_used: response.tokens_used.clone(),
                                response_length: response.content.len(),
                            })
                            .await;
                    }

                    let msg = TeamMessage::from_member(&member_id, &member_name, response.content)
                        .with_metadata("mode", TeamMode::Broadcast.as_str());
                    messages.push(msg.clone());
                    self.conversation_history.push(msg);
                }
                Err(e) => {
                    all_responded = false;
                    if let Some(handler) = &event_handler {
                        handler
                            .on_team_event(&TeamEvent::MemberFailed {
                                team_id: team_id.clone(),
                                member_id,
                                member_name,
                                error: e.to_string(),
                            })
                            .await;
                    }
                }
            }
        }

        // Sub-teams keep their own internal parallelism; at this level they
        // contribute one message each, in registration order.
        for index in subteam_indices {
            let (member_id, member_name) = {
                let member = &self.members[index];
                (member.id().to_string(), member.name().to_string())
            };

            if let TeamMember::Team(subteam) = &mut self.members[index] {
                match Box::pin(subteam.run(request)).await {
                    Ok(response) => {
                        total_tokens += response.total_tokens_used;
                        let content = subteam_contribution(&response);

                        if let Some(handler) = &event_handler {
                            handler
                                .on_team_event(&TeamEvent::MemberResponded {
                                    team_id: team_id.clone(),
                                    member_id: member_id.clone(),
                                    member_name: member_name.clone(),
                                    tokens_used: None,
                                    response_length: content.len(),
                                })
                                .await;
                        }

                        let msg = TeamMessage::from_member(&member_id, &member_name, content)
                            .with_metadata("mode", TeamMode::Broadcast.as_str());
                        messages.push(msg.clone());
                        self.conversation_history.push(msg);
                    }
                    Err(e) => {
                        all_responded = false;
                        if let Some(handler) = &event_handler {
                            handler
                                .on_team_event(&TeamEvent::MemberFailed {
                                    team_id: team_id.clone(),
                                    member_id,
                                    member_name,
                                    error: e.to_string(),
                                })
                                .await;
                        }
                    }
                }
            }
        }

        Ok((messages, total_tokens, all_responded))
    }

    /// Ask the coordinator model to synthesize member findings into a final
    /// answer. Returns the answer and the tokens spent on it.
    async fn synthesize(
        &self,
        coordinator: &Arc<dyn ClientWrapper>,
        request: &str,
        member_messages: &[TeamMessage],
    ) -> Result<(String, usize), Box<dyn Error + Send + Sync>> {
        let mut findings = String::new();
        for msg in member_messages {
            if let Some(name) = &msg.member_name {
                findings.push_str(&format!("[{}]:\n{}\n\n", name, msg.content));
            }
        }

        let request_messages = vec![
            Message {
                role: Role::System,
                content: format!(
                    "You coordinate the team '{}'.\n{}\n\nSynthesize the member findings into \
                     one coherent answer for the user. Attribute nothing; just answer.",
                    self.name,
                    self.system_context()
                ),
            },
            Message {
                role: Role::User,
                content: format!(
                    "Original request:\n{}\n\nMember findings:\n{}",
                    request, findings
                ),
            },
        ];

        let response = coordinator
            .send_message(&request_messages)
            .await
            .map_err(|e| {
                Box::new(TeamError::ExecutionFailed(e.to_string()))
                    as Box<dyn Error + Send + Sync>
            })?;

        let tokens = coordinator
            .get_last_usage()
            .await
            .map(|u| u.total_tokens)
            .unwrap_or(0);

        Ok((response.content, tokens))
    }

    /// The description plus numbered instructions, used as member system
    /// context and in the synthesis prompt.
    fn system_context(&self) -> String {
        let mut context = self.description.clone();
        if !self.instructions.is_empty() {
            if !context.is_empty() {
                context.push('\n');
            }
            for instruction in &self.instructions {
                context.push_str(instruction);
                context.push('\n');
            }
        }
        context
    }
}

/// What a sub-team contributes to its parent: the synthesized answer when a
/// coordinator produced one, otherwise the member responses joined together.
fn subteam_contribution(response: &TeamResponse) -> String {
    if let Some(answer) = &response.final_answer {
        return answer.clone();
    }
    response
        .messages
        .iter()
        .filter_map(|msg| {
            msg.member_name
                .as_ref()
                .map(|name| format!("[{}]: {}", name, msg.content))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
