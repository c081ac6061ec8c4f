//! efrun - Run an external simulation engine against a generated config file
//!
//! This crate provides functionality to:
//! - Export a configuration (INI by default) to a temporary or saved file
//! - Launch the engine from a chosen working directory with that file
//! - Relay the engine's output line by line and report its exit code
pub mod command;
pub mod config;
pub mod error;
pub mod relay;
pub mod runner;
pub mod staging;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use command::SimCommand;
pub use config::{ConfigExport, IniConfig, RunnerSettings};
pub use relay::{ConsoleSink, LineSink};
pub use runner::{RunStatus, Runner};
pub use staging::StagedConfig;
