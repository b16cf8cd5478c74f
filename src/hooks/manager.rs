//! Hook manager for a single host session.
//!
//! The `HookManager` is the adapter between the agent host and the guard.
//! It decodes one JSON event per line, dispatches it to the matching
//! [`CiGuard`] handler, and writes exactly one JSON response line back.
//! Event delivery is serialized: the next line is not read until the
//! previous response has been flushed.

use super::types::{HookResponse, HostEvent};
use crate::errors::ProtocolError;
use crate::guard::CiGuard;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub events: usize,
    pub blocked: usize,
    pub advisories: usize,
    pub malformed: usize,
}

/// Routes host events to the guard for the lifetime of one session.
pub struct HookManager {
    guard: CiGuard,
}

impl HookManager {
    pub fn new(guard: CiGuard) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &CiGuard {
        &self.guard
    }

    /// Run one decoded event through the guard.
    pub async fn dispatch(&self, event: &HostEvent) -> HookResponse {
        match event {
            HostEvent::ToolCall(call) => self.guard.handle_tool_call(call).await.into(),
            HostEvent::ToolResult(result) => {
                self.guard.handle_tool_result(result);
                HookResponse::Ack
            }
            HostEvent::TurnEnd => self.guard.handle_turn_end().await.into(),
        }
    }

    /// Decode and dispatch one line. Blank lines produce no response.
    pub async fn handle_line(&self, line: &str) -> Option<HookResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => {
                debug!(event = %event.kind(), "dispatching");
                self.dispatch(&event).await
            }
            Err(e) => {
                let err = ProtocolError::Malformed(e);
                warn!(error = %err, "ignoring event");
                HookResponse::Error {
                    message: err.to_string(),
                }
            }
        };
        Some(response)
    }

    /// Serve events from `reader` until EOF, writing responses to `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<SessionSummary, ProtocolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary::default();
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            summary.events += 1;
            match &response {
                HookResponse::Decision { reason: Some(_), .. } => summary.blocked += 1,
                HookResponse::Advisory { .. } => summary.advisories += 1,
                HookResponse::Error { .. } => summary.malformed += 1,
                _ => {}
            }

            let mut encoded = serde_json::to_string(&response).map_err(ProtocolError::Encode)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GuardConfig;
    use crate::guard::probe::fake::FakeProbe;
    use crate::hooks::types::DecisionKind;
    use std::sync::Arc;

    const MARKER: &str = ".config/selfci/ci.yaml";
    const JJ_BOOKMARKS: &str = r#"jj bookmark list -T name ++ "\n""#;

    fn manager(probe: FakeProbe) -> HookManager {
        let guard = CiGuard::new(GuardConfig::default(), Arc::new(probe)).unwrap();
        HookManager::new(guard)
    }

    fn jj_manager() -> HookManager {
        manager(
            FakeProbe::new()
                .with_file(MARKER)
                .ok("jj root", "/repo\n")
                .ok(JJ_BOOKMARKS, "main\n"),
        )
    }

    async fn run_session(manager: &HookManager, input: &str) -> (SessionSummary, Vec<serde_json::Value>) {
        let mut output = Vec::new();
        let summary = manager.serve(input.as_bytes(), &mut output).await.unwrap();
        let responses = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, responses)
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let manager = jj_manager();
        assert!(manager.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_line_reports_error() {
        let manager = jj_manager();
        let response = manager.handle_line("{not json").await.unwrap();
        match response {
            HookResponse::Error { message } => assert!(message.starts_with("Malformed event")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_result_is_acknowledged() {
        let manager = jj_manager();
        let response = manager
            .handle_line(r#"{"event":"tool_result","tool_name":"edit","input":{"path":"a.rs"}}"#)
            .await
            .unwrap();
        assert_eq!(response, HookResponse::Ack);
    }

    #[tokio::test]
    async fn test_session_blocks_then_allows_push() {
        let manager = jj_manager();
        let input = r#"{"event":"tool_call","tool_name":"bash","input":{"command":"jj git push"}}
{"event":"tool_result","tool_name":"bash","input":{"command":"selfci check"},"exit_code":0}

{"event":"tool_call","tool_name":"bash","input":{"command":"jj git push"}}
"#;

        let (summary, responses) = run_session(&manager, input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["decision"], "block");
        assert!(
            responses[0]["reason"]
                .as_str()
                .unwrap()
                .contains("selfci check")
        );
        assert_eq!(responses[1]["type"], "ack");
        assert_eq!(responses[2]["decision"], "allow");
        assert_eq!(
            summary,
            SessionSummary {
                events: 3,
                blocked: 1,
                advisories: 0,
                malformed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_session_continues_after_malformed_line() {
        let manager = manager(FakeProbe::new());
        let input = "garbage\n{\"event\":\"turn_end\"}\n";

        let (summary, responses) = run_session(&manager, input).await;

        assert_eq!(responses[0]["type"], "error");
        assert_eq!(responses[1]["type"], "none");
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.events, 2);
    }

    #[tokio::test]
    async fn test_turn_end_advisory_is_follow_up() {
        let manager = manager(
            FakeProbe::new()
                .with_file(MARKER)
                .ok("git rev-parse --git-dir", ".git\n")
                .ok("git branch --list --format=%(refname:short)", "main\n")
                .ok("git status --porcelain", "")
                .ok("git rev-list --count main..HEAD", "1\n"),
        );
        let input = r#"{"event":"tool_result","tool_name":"bash","input":{"command":"git commit -m x"},"exit_code":0}
{"event":"turn_end"}
"#;

        let (summary, responses) = run_session(&manager, input).await;

        assert_eq!(summary.advisories, 1);
        let advisory = &responses[1];
        assert_eq!(advisory["type"], "advisory");
        assert_eq!(advisory["deliver_as"], "follow_up");
        assert_eq!(advisory["trigger_turn"], true);
        assert!(
            advisory["message"]["text"]
                .as_str()
                .unwrap()
                .contains("1 commit(s) ahead of main")
        );
    }

    #[tokio::test]
    async fn test_dispatch_decision_kind() {
        let manager = manager(FakeProbe::new());
        let event: HostEvent = serde_json::from_str(
            r#"{"event":"tool_call","tool_name":"bash","input":{"command":"git push"}}"#,
        )
        .unwrap();

        match manager.dispatch(&event).await {
            HookResponse::Decision { decision, reason } => {
                assert_eq!(decision, DecisionKind::Allow);
                assert!(reason.is_none());
            }
            other => panic!("Expected Decision, got {:?}", other),
        }
    }
}
