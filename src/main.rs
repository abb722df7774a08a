//! # TD - Smart Task Manager TUI
//!
//! A terminal client for the Smart Task Manager server: create, list,
//! complete and delete tasks, and ask the server's AI service to split a
//! task into subtasks which can be reviewed and selectively committed back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive TUI against http://localhost:8000
//! td
//!
//! # Point at another server
//! td --api-url http://tasks.example.com ui
//!
//! # Scriptable commands over the same API
//! td add "Implement user authentication"
//! td list --all
//! td complete 3
//! td delete 3
//! ```
//!
//! ## TUI Keys
//!
//! - `n` type a new task title, `Enter` to create
//! - `c` toggle completion, `d` delete (with confirm), `r` reload
//! - `a` open/close the AI panel for the selected task; inside it:
//!   `g` generate suggestions, `Space` select/deselect, `Enter` save
//!   selected, `Esc` cancel
//!
//! All state lives on the server; the client holds a transient cache that is
//! refreshed after mutations. Network calls never block the interface.

use clap::Parser;
use log::info;
use tokio::runtime::Runtime;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod event;
pub mod task;
pub mod workflow;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod input;
    pub mod run;
}

use anyhow::{Context, Result};
use api::{ApiClient, DEFAULT_API_URL};
use cli::Cli;
use cmd::*;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Flag, then environment, then the development default.
    let api_url = cli
        .api_url
        .or_else(|| std::env::var("TASKDECK_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    match cli.command {
        // Completions need no server and no runtime.
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
            Ok(())
        }
        command => {
            let runtime = Runtime::new().context("failed to start async runtime")?;
            let client = ApiClient::new(&api_url);
            info!("taskdeck started, server {}", client.base_url());

            match command {
                Some(Commands::List { all }) => cmd_list(&runtime, &client, all),
                Some(Commands::Add { title }) => cmd_add(&runtime, &client, &title),
                Some(Commands::Complete { id }) => cmd_complete(&runtime, &client, id),
                Some(Commands::Delete { id }) => cmd_delete(&runtime, &client, id),
                // None and `ui`; completions was consumed by the outer match.
                _ => cmd_ui(&runtime, client),
            }
        }
    }
}
