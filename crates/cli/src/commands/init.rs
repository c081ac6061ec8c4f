use anyhow::{Context, Result};
use efrun_core::RunnerSettings;
use std::{env, path::Path};
use tracing::info;

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    let root = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize {}", root.display()))?;

    let settings_path = root.join(".efrun.json");
    if settings_path.exists() && !force {
        println!("❌ Settings already exist at: {}", settings_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    println!("🚀 Initializing efrun in: {}", root.display());

    let settings = RunnerSettings::with_defaults();
    settings
        .save_to_file(&settings_path)
        .with_context(|| format!("Failed to write settings to {}", settings_path.display()))?;
    info!("Wrote {}", settings_path.display());

    println!("✅ Created settings: {}", settings_path.display());
    println!("\n📌 Edit `command` to point at your engine; the config path is appended to it.");
    Ok(())
}
