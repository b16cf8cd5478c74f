//! CI gate tracking for agent sessions.
//!
//! The guard watches tool events from an agent host and keeps one bit of
//! session state: has validation passed for the changes currently present?
//! It uses that bit to block pushes and to remind the agent at the end of a
//! turn.
//!
//! # Components
//!
//! - [`setup::SetupResolver`] - decides once per session whether gating applies
//! - [`changes::ChangeInspector`] - counts unvalidated working-copy and committed changes
//! - [`state::GateState`] - the `Unvalidated` / `Validated` machine
//! - [`classify::CommandClassifier`] - maps shell text to push / mutation / validation
//! - [`advisory`] - block and reminder text
//! - [`probe::Probe`] - bounded external commands
//!
//! # Usage
//!
//! ```ignore
//! use ci_guard::guard::CiGuard;
//! use ci_guard::hooks::ToolCall;
//!
//! let guard = CiGuard::for_project(&project_dir, config)?;
//!
//! let decision = guard.handle_tool_call(&ToolCall::shell("jj git push")).await;
//! if decision.is_blocked() {
//!     // Tell the host to refuse the tool call
//! }
//! ```

pub mod advisory;
pub mod changes;
pub mod classify;
pub mod probe;
pub mod setup;
pub mod state;

pub use changes::{ChangeInspector, ChangeSummary};
pub use classify::{CommandClass, CommandClassifier};
pub use probe::{CommandProbe, Probe, ProbeOutput};
pub use setup::{GateSetup, SetupResolver, VcsKind};
pub use state::GateState;

use crate::config::GuardConfig;
use crate::errors::ConfigError;
use crate::hooks::types::{Advisory, Decision, ToolCall, ToolResult};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Session-scoped gate context.
///
/// Created at session start, mutated only by the event handlers, dropped at
/// session end. Setup is resolved lazily on first need and never re-probed.
pub struct CiGuard {
    config: GuardConfig,
    classifier: CommandClassifier,
    probe: Arc<dyn Probe>,
    setup: OnceCell<Option<GateSetup>>,
    state: Mutex<GateState>,
}

impl CiGuard {
    pub fn new(config: GuardConfig, probe: Arc<dyn Probe>) -> Result<Self, ConfigError> {
        let classifier = CommandClassifier::new(&config.validation.pattern)?;
        Ok(Self {
            config,
            classifier,
            probe,
            setup: OnceCell::new(),
            state: Mutex::new(GateState::default()),
        })
    }

    /// Guard backed by real subprocess probes in `project_dir`.
    pub fn for_project(
        project_dir: impl AsRef<Path>,
        config: GuardConfig,
    ) -> Result<Self, ConfigError> {
        let probe = CommandProbe::new(project_dir, config.probe_timeout());
        Self::new(config, Arc::new(probe))
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn classifier(&self) -> &CommandClassifier {
        &self.classifier
    }

    pub fn state(&self) -> GateState {
        *self.lock_state()
    }

    /// The resolved setup, or `None` when gating is inactive for this session.
    pub async fn setup(&self) -> Option<&GateSetup> {
        self.setup
            .get_or_init(|| async {
                SetupResolver::new(
                    self.probe.as_ref(),
                    self.config.marker.clone(),
                    self.config.trunk_candidates.clone(),
                )
                .resolve()
                .await
            })
            .await
            .as_ref()
    }

    /// Decide whether a tool about to run may proceed.
    pub async fn handle_tool_call(&self, call: &ToolCall) -> Decision {
        if !self.config.tools.is_shell(&call.tool_name) {
            return Decision::Allow;
        }
        let Some(command) = call.command() else {
            return Decision::Allow;
        };

        let class = self.classifier.classify_call(command);
        let CommandClass::Push(vcs) = class else {
            return Decision::Allow;
        };

        if self.setup().await.is_none() {
            debug!(%vcs, "push allowed, gating inactive");
            return Decision::Allow;
        }

        if self.state().is_validated() {
            debug!(%vcs, "push allowed, CI passed");
            return Decision::Allow;
        }

        info!(%vcs, command, "blocking push, CI has not passed");
        Decision::block(advisory::block_message(&self.config.validation.command))
    }

    /// Update the gate from a finished tool.
    pub fn handle_tool_result(&self, result: &ToolResult) {
        if self.config.tools.is_edit(&result.tool_name) {
            self.reset(&result.tool_name);
            return;
        }
        if !self.config.tools.is_shell(&result.tool_name) {
            return;
        }
        let Some(command) = result.command() else {
            return;
        };

        match self.classifier.classify_result(command) {
            CommandClass::HistoryMutation(_) => self.reset(command),
            CommandClass::Validation if result.succeeded() => {
                let mut state = self.lock_state();
                if !state.is_validated() {
                    info!(command, "CI passed, gate open");
                }
                state.observe_validation_success();
            }
            CommandClass::Validation => {
                debug!(command, exit_code = ?result.exit_code, "validation did not succeed");
            }
            CommandClass::Push(_) | CommandClass::Other => {}
        }
    }

    /// Build the end-of-turn reminder, if one is due.
    pub async fn handle_turn_end(&self) -> Option<Advisory> {
        if self.state().is_validated() {
            return None;
        }
        let setup = self.setup().await?;

        let summary = ChangeInspector::new(self.probe.as_ref())
            .inspect(setup)
            .await;
        let text = advisory::compose(&summary, &setup.trunk, &self.config.validation.command)?;

        info!(
            uncommitted = summary.uncommitted,
            ahead = summary.ahead,
            "unvalidated changes at end of turn"
        );
        Some(Advisory::new(text))
    }

    fn reset(&self, cause: &str) {
        let mut state = self.lock_state();
        if state.is_validated() {
            info!(cause, "change set mutated, gate closed");
        }
        state.observe_mutation();
    }

    // The state is a plain enum, so a poisoned lock still holds a valid value
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
