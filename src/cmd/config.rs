//! Configuration view and validation commands — `ci-guard config`.

use anyhow::{Context, Result};
use ci_guard::config::CONFIG_FILE;
use std::path::Path;

use super::super::ConfigCommands;

pub fn cmd_config(
    project_dir: &Path,
    config_path: Option<&Path>,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let config = super::load_config(project_dir, config_path)?;
    let source = match config_path {
        Some(path) => path.to_path_buf(),
        None => project_dir.join(CONFIG_FILE),
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("CI Guard Configuration");
            println!("======================");
            println!();
            if source.exists() {
                println!("Config file: {}", source.display());
            } else {
                println!("No config file at {}", source.display());
                println!("Using default configuration:");
            }
            println!();

            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
                anyhow::bail!("{} configuration warning(s)", warnings.len());
            }
        }
    }

    Ok(())
}
