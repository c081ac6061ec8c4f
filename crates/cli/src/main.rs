use anyhow::Result;
use clap::Parser;
use efrun::Cli;

fn main() -> Result<()> {
    // Logs go to stderr so the engine's relayed stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli.command.execute()
}
