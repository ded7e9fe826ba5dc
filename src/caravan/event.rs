//! Real-time observability events.
//!
//! Agents, teams, and the ReAct loop emit events during their lifecycle.
//! Attach an [`EventHandler`] to receive them — events are fire-and-forget
//! observability, never control flow. The [`ConsoleEventHandler`] prints a
//! compact live trace and is what the demo programs use to surface member
//! progress.

use crate::client_wrapper::TokenUsage;
use async_trait::async_trait;
use std::sync::Arc;

/// Events emitted by a single [`Agent`](crate::Agent) during its lifecycle.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// `send()` was entered.
    SendStarted {
        agent_id: String,
        agent_name: String,
        message_preview: String,
    },
    /// An LLM round-trip is about to start.
    LLMCallStarted {
        agent_id: String,
        agent_name: String,
        iteration: usize,
    },
    /// An LLM round-trip finished.
    LLMCallCompleted {
        agent_id: String,
        agent_name: String,
        iteration: usize,
        tokens_used: Option<TokenUsage>,
        response_length: usize,
    },
    /// A tool call was parsed out of the LLM response.
    ToolCallDetected {
        agent_id: String,
        agent_name: String,
        tool_name: String,
        parameters: serde_json::Value,
        iteration: usize,
    },
    /// A tool finished executing.
    ToolExecutionCompleted {
        agent_id: String,
        agent_name: String,
        tool_name: String,
        success: bool,
        error: Option<String>,
        iteration: usize,
    },
    /// The tool loop hit its iteration cap.
    ToolMaxIterationsReached {
        agent_id: String,
        agent_name: String,
    },
    /// `send()` returned.
    SendCompleted {
        agent_id: String,
        agent_name: String,
        tokens_used: Option<TokenUsage>,
        tool_calls_made: usize,
        response_length: usize,
    },
    /// An entry was appended to the agent's memory log.
    MemoryCommitted {
        agent_id: String,
        agent_name: String,
    },
    /// A tool protocol was added at runtime.
    ProtocolAdded {
        agent_id: String,
        agent_name: String,
        protocol_label: String,
    },
    /// A tool protocol was removed at runtime.
    ProtocolRemoved {
        agent_id: String,
        agent_name: String,
        protocol_label: String,
    },
}

/// Events emitted by a [`Team`](crate::team::Team) run.
#[derive(Debug, Clone)]
pub enum TeamEvent {
    /// `run()` was entered.
    RunStarted {
        team_id: String,
        team_name: String,
        run_id: String,
        mode: String,
        member_count: usize,
    },
    /// A member is about to be engaged.
    MemberStarted {
        team_id: String,
        member_id: String,
        member_name: String,
    },
    /// A member produced its response.
    MemberResponded {
        team_id: String,
        member_id: String,
        member_name: String,
        tokens_used: Option<TokenUsage>,
        response_length: usize,
    },
    /// A member failed; the run continues with the remaining members.
    MemberFailed {
        team_id: String,
        member_id: String,
        member_name: String,
        error: String,
    },
    /// The coordinator synthesis step is about to start.
    SynthesisStarted { team_id: String },
    /// The coordinator produced the final answer.
    SynthesisCompleted {
        team_id: String,
        response_length: usize,
    },
    /// `run()` returned.
    RunCompleted {
        team_id: String,
        run_id: String,
        total_tokens: usize,
        message_count: usize,
        is_complete: bool,
    },
}

/// Events emitted by a [`ReactAgent`](crate::react::ReactAgent) run.
#[derive(Debug, Clone)]
pub enum ReactEvent {
    /// A reasoning step is about to start.
    StepStarted { agent_id: String, step: usize },
    /// An action was parsed from the model output.
    ActionParsed {
        agent_id: String,
        step: usize,
        tool_name: String,
        action_input: serde_json::Value,
    },
    /// A tool observation was recorded.
    ObservationRecorded {
        agent_id: String,
        step: usize,
        observation_length: usize,
    },
    /// The loop produced its final answer (or gave up at the step cap).
    Finished {
        agent_id: String,
        steps: usize,
        completed: bool,
    },
}

/// Receiver for agent, team, and ReAct events.
///
/// All methods default to no-ops so implementations only override what they
/// care about.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_agent_event(&self, _event: &AgentEvent) {}
    async fn on_team_event(&self, _event: &TeamEvent) {}
    async fn on_react_event(&self, _event: &ReactEvent) {}
}

/// Event handler that prints a compact live trace to stdout.
///
/// Used by the demo programs to show member progress while a team run is in
/// flight (the transcript itself is printed from the returned response).
pub struct ConsoleEventHandler;

#[async_trait]
impl EventHandler for ConsoleEventHandler {
    async fn on_agent_event(&self, event: &AgentEvent) {
        match event {
            AgentEvent::ToolCallDetected {
                agent_name,
                tool_name,
                ..
            } => {
                println!("  [{}] calling tool '{}'...", agent_name, tool_name);
            }
            AgentEvent::ToolExecutionCompleted {
                agent_name,
                tool_name,
                success,
                ..
            } => {
                let status = if *success { "ok" } else { "failed" };
                println!("  [{}] tool '{}' {}", agent_name, tool_name, status);
            }
            _ => {}
        }
    }

    async fn on_team_event(&self, event: &TeamEvent) {
        match event {
            TeamEvent::RunStarted {
                team_name,
                mode,
                member_count,
                ..
            } => {
                println!("[{}] run started: {} members, {} mode", team_name, member_count, mode);
            }
            TeamEvent::MemberStarted { member_name, .. } => {
                println!("  -> {} is working...", member_name);
            }
            TeamEvent::MemberResponded {
                member_name,
                response_length,
                ..
            } => {
                println!("  <- {} responded ({} chars)", member_name, response_length);
            }
            TeamEvent::MemberFailed {
                member_name, error, ..
            } => {
                println!("  !! {} failed: {}", member_name, error);
            }
            TeamEvent::SynthesisStarted { .. } => {
                println!("  synthesizing final answer...");
            }
            _ => {}
        }
    }

    async fn on_react_event(&self, event: &ReactEvent) {
        match event {
            ReactEvent::ActionParsed {
                step, tool_name, ..
            } => {
                println!("  [step {}] action: {}", step, tool_name);
            }
            ReactEvent::ObservationRecorded {
                step,
                observation_length,
                ..
            } => {
                println!("  [step {}] observation ({} chars)", step, observation_length);
            }
            _ => {}
        }
    }
}

/// Shared handle type used by agents, teams, and the ReAct loop.
pub type SharedEventHandler = Arc<dyn EventHandler>;
