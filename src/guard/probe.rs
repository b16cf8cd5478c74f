//! Bounded external probes.
//!
//! Every question the guard asks about the working directory goes through
//! the [`Probe`] trait: run a VCS command, or check that a file exists.
//! A probe never fails loudly. Spawn errors, timeouts and unreadable output
//! all come back as `None`, and callers read that as "not found".

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Captured result of a completed probe command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Exit code, or -1 when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: String,
}

impl ProbeOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Read-only access to the ambient working directory.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run `program` with `args` in the working directory.
    async fn run(&self, program: &str, args: &[&str]) -> Option<ProbeOutput>;

    /// Whether `relative` exists as a file under the working directory.
    async fn exists(&self, relative: &Path) -> bool;

    /// Stdout of a command that exited 0, else `None`.
    async fn run_ok(&self, program: &str, args: &[&str]) -> Option<String> {
        self.run(program, args)
            .await
            .filter(ProbeOutput::success)
            .map(|output| output.stdout)
    }
}

/// Runs probes as real subprocesses with a fixed timeout.
pub struct CommandProbe {
    working_dir: PathBuf,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(working_dir: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            timeout,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[async_trait]
impl Probe for CommandProbe {
    async fn run(&self, program: &str, args: &[&str]) -> Option<ProbeOutput> {
        let child = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(program, ?args, error = %e, "probe failed to run");
                return None;
            }
            Err(_) => {
                debug!(program, ?args, timeout = ?self.timeout, "probe timed out");
                return None;
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(program, ?args, exit_code, "probe completed");

        Some(ProbeOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }

    async fn exists(&self, relative: &Path) -> bool {
        tokio::fs::metadata(self.working_dir.join(relative))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

/// Scripted probe for tests: canned outputs keyed by the full command line.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeProbe {
        outputs: HashMap<String, ProbeOutput>,
        files: HashSet<PathBuf>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
            self.files.insert(path.into());
            self
        }

        /// Register a command line that exits 0 with `stdout`.
        pub fn ok(mut self, command_line: &str, stdout: &str) -> Self {
            self.outputs.insert(
                command_line.to_string(),
                ProbeOutput {
                    exit_code: 0,
                    stdout: stdout.to_string(),
                },
            );
            self
        }

        /// Register a command line that exits with `code`.
        pub fn fails(mut self, command_line: &str, code: i32) -> Self {
            self.outputs.insert(
                command_line.to_string(),
                ProbeOutput {
                    exit_code: code,
                    stdout: String::new(),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl Probe for FakeProbe {
        async fn run(&self, program: &str, args: &[&str]) -> Option<ProbeOutput> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.lock().unwrap().push(line.clone());
            // Unscripted commands behave like a missing binary
            self.outputs.get(&line).cloned()
        }

        async fn exists(&self, relative: &Path) -> bool {
            self.files.contains(relative)
        }
    }
}
