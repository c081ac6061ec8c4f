use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fully resolved invocation of the simulation engine
#[derive(Debug, Clone, PartialEq)]
pub struct SimCommand {
    pub program: String,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl SimCommand {
    pub fn new(program: String, args: Vec<OsString>) -> Self {
        Self {
            program,
            args,
            working_dir: None,
            env: Vec::new(),
        }
    }

    /// Split `template` with shell-word rules and append `config_path` as its
    /// own argument, so paths with spaces survive untouched.
    pub fn from_template(template: &str, config_path: &Path) -> Result<Self> {
        let mut words = shell_words::split(template)?.into_iter();
        let program = words.next().ok_or(Error::EmptyCommand)?;

        let mut args: Vec<OsString> = words.map(OsString::from).collect();
        args.push(config_path.as_os_str().to_os_string());

        Ok(Self::new(program, args))
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: String, value: String) -> Self {
        self.env.push((key, value));
        self
    }

    /// The config file argument, always the last one
    pub fn config_path(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }

    /// Render the command as a line that a POSIX shell would split back into
    /// the same argument vector.
    pub fn to_shell_command(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.clone());
        words.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        shell_words::join(words)
    }

    /// Build the process with stdout piped and stderr inherited.
    pub fn to_process(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        // Set working directory if specified
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}
