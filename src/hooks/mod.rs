//! Host integration for the CI guard.
//!
//! The agent host talks to ci-guard over a line-delimited JSON session on
//! stdin/stdout. Each input line is one event, and each event gets exactly
//! one response line.
//!
//! # Hook Events
//!
//! - `tool_call` - A tool is about to run (can block)
//! - `tool_result` - A tool finished (updates the gate)
//! - `turn_end` - The agent finished its turn (may emit a reminder)
//!
//! # Example session
//!
//! ```text
//! > {"event":"tool_call","tool_name":"bash","input":{"command":"jj git push"}}
//! < {"type":"decision","decision":"block","reason":"CI has not passed ..."}
//! > {"event":"tool_result","tool_name":"bash","input":{"command":"selfci check"},"exit_code":0}
//! < {"type":"ack"}
//! > {"event":"turn_end"}
//! < {"type":"none"}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ci_guard::hooks::HookManager;
//!
//! let manager = HookManager::new(guard);
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! manager.serve(stdin, tokio::io::stdout()).await?;
//! ```

pub mod manager;
pub mod types;

// Re-exports for convenience
pub use manager::{HookManager, SessionSummary};
pub use types::{Advisory, Decision, HookEvent, HookResponse, HostEvent, ToolCall, ToolResult};
