use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{export_command, init_command, run_command, run_file_command};

#[derive(Parser, Debug)]
#[command(name = "efrun")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    RUST_LOG=debug          Enable debug logging\n    EFRUN_COMMAND=<cmd>     Engine command template\n    EFRUN_WORKDIR=<dir>     Working directory for the engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the simulation configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Base configuration file (.ini, or .json as {"section": {"key": value}})
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set a single value, e.g. --set simulation.steps=500 (repeatable)
    #[arg(long = "set", value_name = "SECTION.KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export the configuration and run the engine on it
    #[command(visible_alias = "r")]
    Run {
        /// Directory to launch the engine from (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Keep the exported config at this path instead of a temp file
        #[arg(short, long = "save-config", value_name = "PATH")]
        save_config: Option<PathBuf>,

        /// Engine command template; the config path is appended
        #[arg(short = 'c', long = "command", value_name = "TEMPLATE")]
        command_template: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print the command without executing it
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Run the engine on an existing config file
    #[command(name = "run-file", visible_alias = "rf")]
    RunFile {
        /// Config file to hand to the engine
        file: PathBuf,

        /// Directory to launch the engine from (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        workdir: Option<PathBuf>,

        /// Engine command template; the config path is appended
        #[arg(short = 'c', long = "command", value_name = "TEMPLATE")]
        command_template: Option<String>,

        /// Print the command without executing it
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Write the configuration as INI to stdout or a file
    Export {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Write a .efrun.json with the default settings
    Init {
        /// Directory to initialize (defaults to the current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Force overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Run {
                workdir,
                save_config,
                command_template,
                config,
                dry_run,
            } => run_command(crate::commands::RunOptions {
                workdir,
                save_config,
                command_template,
                config,
                dry_run,
            }),
            Commands::RunFile {
                file,
                workdir,
                command_template,
                dry_run,
            } => run_file_command(&file, workdir, command_template, dry_run),
            Commands::Export { config, output } => export_command(&config, output.as_deref()),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::parse_from([
            "efrun",
            "run",
            "-w",
            "runs/a",
            "--set",
            "run.steps=5",
            "--set",
            "run.seed=1",
            "-c",
            "engine --fast",
            "-d",
        ]);

        match cli.command {
            Commands::Run {
                workdir,
                command_template,
                config,
                dry_run,
                save_config,
            } => {
                assert_eq!(workdir, Some(PathBuf::from("runs/a")));
                assert_eq!(command_template.as_deref(), Some("engine --fast"));
                assert_eq!(config.set, vec!["run.steps=5", "run.seed=1"]);
                assert!(dry_run);
                assert!(save_config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_file_alias() {
        let cli = Cli::parse_from(["efrun", "rf", "conf.ini"]);
        assert!(matches!(cli.command, Commands::RunFile { ref file, .. } if file == &PathBuf::from("conf.ini")));
    }
}
