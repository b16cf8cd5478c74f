//! Host session loop — `ci-guard serve`.

use anyhow::{Context, Result};
use ci_guard::guard::CiGuard;
use ci_guard::hooks::HookManager;
use std::path::Path;
use tokio::io::BufReader;
use tracing::info;

pub async fn cmd_serve(project_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(project_dir, config_path)?;
    let guard = CiGuard::for_project(project_dir, config)
        .context("Failed to build guard from configuration")?;
    let manager = HookManager::new(guard);

    info!(project_dir = %project_dir.display(), "session started");

    let stdin = BufReader::new(tokio::io::stdin());
    let summary = manager
        .serve(stdin, tokio::io::stdout())
        .await
        .context("Session stream failed")?;

    info!(
        events = summary.events,
        blocked = summary.blocked,
        advisories = summary.advisories,
        malformed = summary.malformed,
        final_state = %manager.guard().state(),
        "session ended"
    );

    Ok(())
}
