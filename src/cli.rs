use clap::Parser;

use crate::cmd::Commands;

/// Terminal client for the Smart Task Manager server.
/// The server defaults to http://localhost:8000 or a URL passed via --api-url.
#[derive(Parser)]
#[command(name = "td", version, about = "Smart task management from the terminal")]
pub struct Cli {
    /// Base URL of the task server. Falls back to $TASKDECK_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
