//! Shell command classification.
//!
//! This is a text heuristic, not a shell parser. Each event phase has its
//! own ordered list of `(category, pattern)` pairs, matched against the raw
//! command string; the first match in that list wins.
//!
//! - Before a tool runs only pushes matter: `[jj push, git push]`.
//! - After it finished only gate updates matter:
//!   `[jj mutation, git mutation, validation]`.
//!
//! So `git commit -am wip && git push` is a push when it is about to run and
//! a history mutation once it has finished. Pushes hidden behind aliases or
//! scripts are not seen, and that is an accepted limitation.

use super::setup::VcsKind;
use crate::errors::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

static JJ_PUSH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bjj\s+git\s+push\b").unwrap());

static GIT_PUSH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bgit\s+push\b").unwrap());

static JJ_MUTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bjj\s+(commit|ci|new|squash|amend|rebase|abandon|restore|split|duplicate|backout|revert|absorb)\b",
    )
    .unwrap()
});

static GIT_MUTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bgit\s+(commit|rebase|merge|cherry-pick|reset|revert|am|pull)\b").unwrap()
});

/// What a shell command means to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Publishes changes; subject to the gate
    Push(VcsKind),
    /// Changes what the next push would contain
    HistoryMutation(VcsKind),
    /// Runs the validation command
    Validation,
    /// Anything else, including read-only commands
    Other,
}

impl CommandClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandClass::Push(VcsKind::Jj) => "push (jj)",
            CommandClass::Push(VcsKind::Git) => "push (git)",
            CommandClass::HistoryMutation(VcsKind::Jj) => "history mutation (jj)",
            CommandClass::HistoryMutation(VcsKind::Git) => "history mutation (git)",
            CommandClass::Validation => "validation",
            CommandClass::Other => "other",
        }
    }
}

impl std::fmt::Display for CommandClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-phase ordered pattern lists; see the module docs.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    call_rules: Vec<(CommandClass, Regex)>,
    result_rules: Vec<(CommandClass, Regex)>,
}

impl CommandClassifier {
    /// Build the classifier with the given validation-command pattern.
    pub fn new(validation_pattern: &str) -> Result<Self, ConfigError> {
        let validation =
            Regex::new(validation_pattern).map_err(|source| ConfigError::InvalidPattern {
                field: "validation",
                pattern: validation_pattern.to_string(),
                source,
            })?;

        // jj comes first: `jj git push` also contains `git push`
        let call_rules = vec![
            (CommandClass::Push(VcsKind::Jj), JJ_PUSH.clone()),
            (CommandClass::Push(VcsKind::Git), GIT_PUSH.clone()),
        ];
        let result_rules = vec![
            (CommandClass::HistoryMutation(VcsKind::Jj), JJ_MUTATION.clone()),
            (CommandClass::HistoryMutation(VcsKind::Git), GIT_MUTATION.clone()),
            (CommandClass::Validation, validation),
        ];

        Ok(Self {
            call_rules,
            result_rules,
        })
    }

    /// Classify a command that is about to run. Yields `Push` or `Other`.
    pub fn classify_call(&self, command: &str) -> CommandClass {
        first_match(&self.call_rules, command)
    }

    /// Classify a command that finished. Yields `HistoryMutation`,
    /// `Validation` or `Other`.
    pub fn classify_result(&self, command: &str) -> CommandClass {
        first_match(&self.result_rules, command)
    }
}

fn first_match(rules: &[(CommandClass, Regex)], command: &str) -> CommandClass {
    rules
        .iter()
        .find(|(_, pattern)| pattern.is_match(command))
        .map(|(class, _)| *class)
        .unwrap_or(CommandClass::Other)
}
