use std::io;
use std::path::PathBuf;

/// Errors that can occur during efrun operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to launch `{command}`: {source}")]
    SpawnError {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Working directory does not exist: {}", .0.display())]
    WorkdirNotFound(PathBuf),

    #[error("Command template is empty")]
    EmptyCommand,

    #[error("Invalid command template: {0}")]
    CommandParseError(#[from] shell_words::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Simulation exited with code {code}")]
    NonZeroExit { code: i32 },
}

/// Result type alias for efrun operations
pub type Result<T> = std::result::Result<T, Error>;
