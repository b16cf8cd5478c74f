//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module      | Commands handled |
//! |-------------|------------------|
//! | `serve`     | `Serve`          |
//! | `status`    | `Status`         |
//! | `classify`  | `Classify`       |
//! | `config`    | `Config`         |

pub mod classify;
pub mod config;
pub mod serve;
pub mod status;

pub use classify::cmd_classify;
pub use config::cmd_config;
pub use serve::cmd_serve;
pub use status::cmd_status;

use anyhow::{Context, Result};
use ci_guard::config::GuardConfig;
use std::path::Path;

/// Load the guard config for a command, honoring `--config`.
pub(crate) fn load_config(project_dir: &Path, explicit: Option<&Path>) -> Result<GuardConfig> {
    GuardConfig::resolve(project_dir, explicit).context("Failed to load ci-guard configuration")
}
