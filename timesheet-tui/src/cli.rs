use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "timesheet-tui")]
#[command(about = "Terminal UI for weekly timesheet entry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run against the timesheet API configured in config.toml
    Run,
    /// Run in dev mode with local in-memory data
    Dev {
        /// Artificial delay added to every backend call, in milliseconds
        #[arg(long, default_value_t = 0)]
        latency_ms: u64,
    },
    /// Print config path and create default file if missing
    ConfigPath,
}
