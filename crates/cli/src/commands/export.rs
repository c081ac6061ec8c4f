use anyhow::{Context, Result};
use efrun_core::StagedConfig;
use std::path::Path;

use crate::cli::ConfigArgs;
use crate::config::load_config;

pub fn export_command(args: &ConfigArgs, output: Option<&Path>) -> Result<()> {
    let config = load_config(args)?;

    match output {
        Some(path) => {
            let staged = StagedConfig::stage(&config, Some(path))
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            eprintln!("✅ Wrote config: {}", staged.path().display());
        }
        None => print!("{}", config.to_ini_string()),
    }

    Ok(())
}
