//! Command classification preview — `ci-guard classify`.

use anyhow::{Context, Result};
use ci_guard::guard::CommandClassifier;
use std::path::Path;

pub fn cmd_classify(project_dir: &Path, config_path: Option<&Path>, command: &str) -> Result<()> {
    let config = super::load_config(project_dir, config_path)?;
    let classifier = CommandClassifier::new(&config.validation.pattern)
        .context("Failed to compile validation pattern")?;

    println!("before run: {}", classifier.classify_call(command));
    println!("after run:  {}", classifier.classify_result(command));
    Ok(())
}
