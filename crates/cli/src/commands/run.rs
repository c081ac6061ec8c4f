use anyhow::{Context, Result, ensure};
use efrun_core::{IniConfig, RunStatus, Runner, RunnerSettings};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::ConfigArgs;
use crate::config::{load_config, resolve_settings};
use crate::display::print_command_breakdown;

#[derive(Debug, Default)]
pub struct RunOptions {
    pub workdir: Option<PathBuf>,
    pub save_config: Option<PathBuf>,
    pub command_template: Option<String>,
    pub config: ConfigArgs,
    pub dry_run: bool,
}

pub fn run_command(opts: RunOptions) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let settings = resolve_settings(&cwd)?;
    let config = load_config(&opts.config)?;

    let runner = build_runner(&config, &settings, opts.command_template);
    let workdir = opts
        .workdir
        .unwrap_or_else(|| settings.workdir_or_default().to_path_buf());
    let save_as = opts.save_config.or_else(|| settings.save_config_as.clone());

    debug!("Running with workdir {} and config {:?}", workdir.display(), save_as);

    if opts.dry_run {
        // A temp config would be deleted right away, so only show where it would go
        let config_path = match save_as {
            Some(ref path) => runner.stage_config(Some(path.as_path()))?.path().to_path_buf(),
            None => env::temp_dir().join("efrun-XXXXXX.ini"),
        };
        return print_dry_run(&runner, &config_path, &workdir);
    }

    let staged = runner.stage_config(save_as.as_deref())?;
    if !staged.is_temporary() {
        println!("💾 Config saved to: {}", staged.path().display());
    }

    let status = launch(&runner, staged.path(), &workdir)?;

    // process::exit skips destructors, so the temp config must go first
    drop(staged);
    exit_with(status)
}

pub fn run_file_command(
    file: &Path,
    workdir: Option<PathBuf>,
    command_template: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let cwd = env::current_dir().context("Failed to get current directory")?;
    let settings = resolve_settings(&cwd)?;

    // The engine starts elsewhere, so hand it a path that still points here
    let file = std::path::absolute(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    ensure!(file.is_file(), "Config file not found: {}", file.display());

    let config = IniConfig::default();
    let runner = build_runner(&config, &settings, command_template);
    let workdir = workdir.unwrap_or_else(|| settings.workdir_or_default().to_path_buf());

    if dry_run {
        return print_dry_run(&runner, &file, &workdir);
    }

    let status = launch(&runner, &file, &workdir)?;
    exit_with(status)
}

fn build_runner<'a>(
    config: &'a IniConfig,
    settings: &RunnerSettings,
    command_template: Option<String>,
) -> Runner<'a, IniConfig> {
    let runner = Runner::with_settings(config, settings);
    match command_template {
        Some(template) => runner.with_command(template),
        None => runner,
    }
}

fn print_dry_run(runner: &Runner<'_, IniConfig>, config_path: &Path, workdir: &Path) -> Result<()> {
    let command = runner.command_for(config_path, workdir)?;
    println!("{}", command.to_shell_command());
    print_command_breakdown(&command);
    Ok(())
}

fn launch(runner: &Runner<'_, IniConfig>, config_path: &Path, workdir: &Path) -> Result<RunStatus> {
    let command = runner.command_for(config_path, workdir)?;
    let shell_cmd = command.to_shell_command();
    eprintln!("🚀 Running: {}", shell_cmd);
    info!("Working directory: {}", workdir.display());

    runner
        .run_from_file(config_path, workdir)
        .with_context(|| format!("Failed to execute: {}", shell_cmd))
}

fn exit_with(status: RunStatus) -> Result<()> {
    if !status.success() {
        eprintln!("❌ Engine exited with code {}", status.code);
        std::process::exit(status.code);
    }
    Ok(())
}
