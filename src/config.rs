//! Guard configuration parsing and validation.
//!
//! Settings are loaded from `.config/ci-guard.toml` in the project directory
//! (or an explicit `--config` path). Every field has a default, so a project
//! only needs the file to override something. Opting into gating is a
//! separate concern: that is the presence of the `marker` file.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the config file, relative to the project directory.
pub const CONFIG_FILE: &str = ".config/ci-guard.toml";

/// Top-level guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Relative path whose presence opts the project into gating
    #[serde(default = "default_marker")]
    pub marker: PathBuf,

    /// Trunk names probed in order; the first one that exists wins
    #[serde(default = "default_trunk_candidates")]
    pub trunk_candidates: Vec<String>,

    /// Timeout applied to every VCS probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// The validation command whose success opens the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Command shown to the operator in block and advisory messages
    #[serde(default = "default_validation_command")]
    pub command: String,

    /// Regex matched against shell command text to recognize a validation run
    #[serde(default = "default_validation_pattern")]
    pub pattern: String,
}

/// Host tool names the guard reacts to. Compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tools whose input carries a shell `command`
    #[serde(default = "default_shell_tools")]
    pub shell: Vec<String>,

    /// Tools that mutate file contents
    #[serde(default = "default_edit_tools")]
    pub edit: Vec<String>,
}

fn default_marker() -> PathBuf {
    PathBuf::from(".config/selfci/ci.yaml")
}

fn default_trunk_candidates() -> Vec<String> {
    vec!["main".into(), "master".into(), "trunk".into()]
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_validation_command() -> String {
    "selfci check".to_string()
}

fn default_validation_pattern() -> String {
    r"\bselfci\s+check\b".to_string()
}

fn default_shell_tools() -> Vec<String> {
    vec!["bash".into()]
}

fn default_edit_tools() -> Vec<String> {
    vec![
        "edit".into(),
        "write".into(),
        "multiedit".into(),
        "notebookedit".into(),
    ]
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            trunk_candidates: default_trunk_candidates(),
            probe_timeout_secs: default_probe_timeout(),
            validation: ValidationConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            command: default_validation_command(),
            pattern: default_validation_pattern(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell: default_shell_tools(),
            edit: default_edit_tools(),
        }
    }
}

impl ToolsConfig {
    pub fn is_shell(&self, tool_name: &str) -> bool {
        self.shell.iter().any(|t| t.eq_ignore_ascii_case(tool_name))
    }

    pub fn is_edit(&self, tool_name: &str) -> bool {
        self.edit.iter().any(|t| t.eq_ignore_ascii_case(tool_name))
    }
}

impl GuardConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `<project_dir>/.config/ci-guard.toml`, or defaults if absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path when given, else from the project default.
    pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_or_default(project_dir),
        }
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.probe_timeout_secs)
    }

    /// Validate the configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.marker.is_absolute() {
            warnings.push(format!(
                "marker '{}' is absolute; it is meant to be relative to the project directory",
                self.marker.display()
            ));
        }
        if self.trunk_candidates.is_empty() {
            warnings.push("trunk_candidates is empty; gating can never activate".to_string());
        }
        if self.probe_timeout_secs == 0 {
            warnings.push("probe_timeout_secs is 0; every probe will time out".to_string());
        }
        if self.validation.command.trim().is_empty() {
            warnings.push("validation.command is empty".to_string());
        }
        if let Err(e) = regex::Regex::new(&self.validation.pattern) {
            warnings.push(format!(
                "validation.pattern '{}' is not a valid regex: {}",
                self.validation.pattern, e
            ));
        }
        if self.tools.shell.is_empty() {
            warnings.push("tools.shell is empty; pushes will never be gated".to_string());
        }
        if self.tools.edit.is_empty() {
            warnings.push("tools.edit is empty; file edits will not reset the gate".to_string());
        }

        warnings
    }
}
