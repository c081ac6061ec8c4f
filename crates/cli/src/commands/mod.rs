pub mod export;
pub mod init;
pub mod run;

pub use export::export_command;
pub use init::init_command;
pub use run::{RunOptions, run_command, run_file_command};
