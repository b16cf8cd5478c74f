//! Host event and response types for the ci-guard session protocol.
//!
//! This module defines the wire types exchanged with the agent host:
//! - `HookEvent`: The lifecycle events the guard listens to
//! - `HostEvent`: A decoded event with its payload
//! - `Decision`: The verdict for a tool that is about to run
//! - `Advisory`: An end-of-turn reminder for the transcript
//! - `HookResponse`: The line written back for every event

use serde::{Deserialize, Serialize};

/// Lifecycle events delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// A tool is about to run (the only event that can block)
    ToolCall,
    /// A tool finished
    ToolResult,
    /// The agent finished its turn
    TurnEnd,
}

impl HookEvent {
    /// Returns the event name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::ToolCall => "tool_call",
            HookEvent::ToolResult => "tool_result",
            HookEvent::TurnEnd => "turn_end",
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tool about to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    /// Opaque tool input; shell tools carry a `command` string
    #[serde(default)]
    pub input: serde_json::Value,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
        }
    }

    /// Shorthand for a shell tool invocation.
    pub fn shell(command: &str) -> Self {
        Self::new("bash", serde_json::json!({ "command": command }))
    }

    pub fn command(&self) -> Option<&str> {
        command_of(&self.input)
    }
}

/// A tool that finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    /// Process exit code for shell tools, when the host reports one
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Host-level failure flag
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn new(tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
            exit_code: None,
            is_error: false,
        }
    }

    /// Shorthand for a finished shell command.
    pub fn shell(command: &str, exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            is_error: exit_code != 0,
            ..Self::new("bash", serde_json::json!({ "command": command }))
        }
    }

    /// Shorthand for a finished file edit.
    pub fn edit(path: &str) -> Self {
        Self::new("edit", serde_json::json!({ "path": path }))
    }

    pub fn command(&self) -> Option<&str> {
        command_of(&self.input)
    }

    /// No error flag and a zero (or unreported) exit code.
    pub fn succeeded(&self) -> bool {
        !self.is_error && self.exit_code.unwrap_or(0) == 0
    }
}

fn command_of(input: &serde_json::Value) -> Option<&str> {
    input.get("command").and_then(serde_json::Value::as_str)
}

/// A decoded host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    TurnEnd,
}

impl HostEvent {
    pub fn kind(&self) -> HookEvent {
        match self {
            HostEvent::ToolCall(_) => HookEvent::ToolCall,
            HostEvent::ToolResult(_) => HookEvent::ToolResult,
            HostEvent::TurnEnd => HookEvent::TurnEnd,
        }
    }
}

/// Verdict for a tool about to run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Decision {
    #[default]
    Allow,
    Block(String),
}

impl Decision {
    pub fn block(reason: impl Into<String>) -> Self {
        Decision::Block(reason.into())
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Block(_))
    }
}

/// A non-blocking reminder appended to the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: String,
    pub text: String,
    pub visible: bool,
}

impl Advisory {
    pub const KIND: &'static str = "ci-guard";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            text: text.into(),
            visible: true,
        }
    }
}

/// How the host should deliver an advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverAs {
    /// Appended after the turn as a follow-up message
    FollowUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Allow,
    Block,
}

/// The single line written back for each event line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookResponse {
    Decision {
        decision: DecisionKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Ack,
    Advisory {
        message: Advisory,
        deliver_as: DeliverAs,
        /// Prompt exactly one more agent turn
        trigger_turn: bool,
    },
    #[serde(rename = "none")]
    NoAdvisory,
    Error {
        message: String,
    },
}

impl From<Decision> for HookResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => HookResponse::Decision {
                decision: DecisionKind::Allow,
                reason: None,
            },
            Decision::Block(reason) => HookResponse::Decision {
                decision: DecisionKind::Block,
                reason: Some(reason),
            },
        }
    }
}

impl From<Option<Advisory>> for HookResponse {
    fn from(advisory: Option<Advisory>) -> Self {
        match advisory {
            Some(message) => HookResponse::Advisory {
                message,
                deliver_as: DeliverAs::FollowUp,
                trigger_turn: true,
            },
            None => HookResponse::NoAdvisory,
        }
    }
}
