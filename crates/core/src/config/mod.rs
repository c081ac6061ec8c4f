//! Configuration management for efrun
//!
//! Two different things live here: the simulation configuration that gets
//! exported for the engine, and the runner's own persisted settings.

mod export;
mod ini;
mod settings;

// Re-export main types
pub use export::ConfigExport;
pub use ini::{IniConfig, IniSection};
pub use settings::{
    COMMAND_ENV_VAR, DEFAULT_COMMAND, RunnerSettings, SETTINGS_FILE_NAMES, WORKDIR_ENV_VAR,
};
