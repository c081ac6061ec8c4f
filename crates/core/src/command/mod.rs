//! Simulation command construction

pub mod sim_command;

// Re-export commonly used types
pub use sim_command::SimCommand;
