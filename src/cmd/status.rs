//! One-shot gate report — `ci-guard status`.

use anyhow::{Context, Result};
use ci_guard::guard::{ChangeInspector, CommandProbe, SetupResolver};
use std::path::Path;

pub async fn cmd_status(project_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(project_dir, config_path)?;
    let project_dir = project_dir
        .canonicalize()
        .context("Failed to resolve project directory")?;
    let probe = CommandProbe::new(&project_dir, config.probe_timeout());

    println!();
    println!("CI Guard Status");
    println!("===============");
    println!();
    println!("  Project:    {}", project_dir.display());
    println!("  Marker:     {}", config.marker.display());

    let resolver = SetupResolver::new(
        &probe,
        config.marker.clone(),
        config.trunk_candidates.clone(),
    );
    let Some(setup) = resolver.resolve().await else {
        println!("  Gating:     inactive");
        println!();
        if !project_dir.join(&config.marker).is_file() {
            println!("Create {} to opt this project in.", config.marker.display());
        } else {
            println!(
                "No jj or git repository with a trunk named one of [{}] was found.",
                config.trunk_candidates.join(", ")
            );
        }
        return Ok(());
    };

    println!("  Gating:     active");
    println!("  VCS:        {}", setup.vcs);
    println!("  Trunk:      {}", setup.trunk);

    let summary = ChangeInspector::new(&probe).inspect(&setup).await;
    println!(
        "  Changes:    {}",
        if summary.uncommitted {
            "uncommitted changes present"
        } else {
            "working copy clean"
        }
    );
    println!("  Ahead:      {} commit(s) ahead of {}", summary.ahead, setup.trunk);
    println!();
    println!(
        "Validation command: {} (a fresh session starts unvalidated)",
        config.validation.command
    );

    Ok(())
}
