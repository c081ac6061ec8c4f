//! Main runner: stage the configuration, launch the engine, relay its output

use crate::{
    command::SimCommand,
    config::{ConfigExport, DEFAULT_COMMAND, RunnerSettings},
    error::{Error, Result},
    relay::{ConsoleSink, LineSink, relay_lines},
    staging::StagedConfig,
};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tracing::{debug, info, warn};

/// Exit status of one engine run.
///
/// A non-zero code is not an error here; callers that want one can use
/// [`RunStatus::into_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: i32,
    pub lines_relayed: usize,
}

impl RunStatus {
    fn from_exit(status: ExitStatus, lines_relayed: usize) -> Self {
        Self {
            code: exit_code(status),
            lines_relayed,
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::NonZeroExit { code: self.code })
        }
    }
}

/// Shell convention: a child killed by signal N reports 128 + N.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Runs the simulation engine against a configuration.
///
/// The runner borrows the configuration and never changes this process's
/// working directory, so several runners can be used from different threads.
pub struct Runner<'a, C: ConfigExport + ?Sized> {
    config: &'a C,
    command: String,
    env: Vec<(String, String)>,
    temp_dir: Option<PathBuf>,
}

impl<'a, C: ConfigExport + ?Sized> Runner<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self {
            config,
            command: DEFAULT_COMMAND.to_string(),
            env: Vec::new(),
            temp_dir: None,
        }
    }

    /// Runner using the command and environment from persisted settings
    pub fn with_settings(config: &'a C, settings: &RunnerSettings) -> Self {
        let mut runner = Self::new(config).with_command(settings.command_or_default());
        for (key, value) in &settings.env {
            runner = runner.with_env(key.clone(), value.clone());
        }
        runner
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env.push((key, value));
        self
    }

    /// Directory for temporary configs instead of the system temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn command_template(&self) -> &str {
        &self.command
    }

    /// Export the configuration to a temp file (or `save_config_as`) and run it,
    /// printing the engine's output to stdout.
    pub fn run(&self, workdir: &Path, save_config_as: Option<&Path>) -> Result<RunStatus> {
        self.run_with_sink(workdir, save_config_as, &mut ConsoleSink)
    }

    pub fn run_with_sink(
        &self,
        workdir: &Path,
        save_config_as: Option<&Path>,
        sink: &mut dyn LineSink,
    ) -> Result<RunStatus> {
        let staged = self.stage_config(save_config_as)?;
        // `staged` outlives the run and removes a temp file on every return path
        self.run_from_file_with_sink(staged.path(), workdir, sink)
    }

    pub fn stage_config(&self, save_config_as: Option<&Path>) -> Result<StagedConfig> {
        match (save_config_as, &self.temp_dir) {
            (None, Some(dir)) => StagedConfig::temporary_in(self.config, dir),
            _ => StagedConfig::stage(self.config, save_config_as),
        }
    }

    /// Run an already exported config file, printing the engine's output to stdout.
    ///
    /// A relative `startfile` is handed to the engine unchanged, so it is
    /// resolved from `workdir`.
    pub fn run_from_file(&self, startfile: &Path, workdir: &Path) -> Result<RunStatus> {
        self.run_from_file_with_sink(startfile, workdir, &mut ConsoleSink)
    }

    pub fn run_from_file_with_sink(
        &self,
        startfile: &Path,
        workdir: &Path,
        sink: &mut dyn LineSink,
    ) -> Result<RunStatus> {
        let command = self.command_for(startfile, workdir)?;
        let shell_cmd = command.to_shell_command();
        info!("command: {}", shell_cmd);
        info!("Working directory: {}", workdir.display());

        let mut child = command
            .to_process()
            .spawn()
            .map_err(|source| Error::SpawnError {
                command: shell_cmd.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("engine stdout was not captured"))?;

        let relayed = relay_lines(BufReader::new(stdout), sink);
        if relayed.is_err() {
            // Nobody is draining the pipe any more; don't wait on a blocked child
            warn!("Output relay failed, killing `{}`", shell_cmd);
            let _ = child.kill();
        }

        let status = child.wait()?;
        let lines_relayed = relayed?;

        let status = RunStatus::from_exit(status, lines_relayed);
        debug!(
            "`{}` exited with {} after {} lines",
            shell_cmd, status.code, status.lines_relayed
        );
        Ok(status)
    }

    /// The command `run_from_file` would launch, without launching it.
    pub fn command_for(&self, startfile: &Path, workdir: &Path) -> Result<SimCommand> {
        if !workdir.is_dir() {
            return Err(Error::WorkdirNotFound(workdir.to_path_buf()));
        }

        let mut command = SimCommand::from_template(&self.command, startfile)?
            .with_working_dir(workdir);
        for (key, value) in &self.env {
            command = command.with_env(key.clone(), value.clone());
        }
        Ok(command)
    }
}
