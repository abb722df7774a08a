//! Command implementations for the CLI interface.
//!
//! Each handler wraps one or two calls on the shared [`ApiClient`], blocking
//! on the runtime, so every TUI operation is also scriptable. The `ui`
//! command hands over to the interactive interface.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use log::info;
use tokio::runtime::Runtime;

use crate::api::ApiClient;
use crate::cli::Cli;
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface (default).
    Ui,

    /// List tasks, newest first.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
    },

    /// Toggle a task's completion by ID.
    Complete {
        /// Task ID.
        id: u64,
    },

    /// Delete a task by ID.
    Delete {
        /// Task ID.
        id: u64,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Launch the TUI against the given server.
pub fn cmd_ui(runtime: &Runtime, client: ApiClient) -> Result<()> {
    info!("launching TUI against {}", client.base_url());
    run_tui(runtime.handle().clone(), client).context("TUI failed")
}

/// Print tasks newest-first. Completed tasks are hidden unless `all` is set.
pub fn cmd_list(runtime: &Runtime, client: &ApiClient, all: bool) -> Result<()> {
    let mut tasks = runtime
        .block_on(client.list_tasks())
        .context("failed to fetch tasks")?;
    tasks.reverse();

    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| all || !t.is_completed)
        .collect();

    if visible.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    for task in visible {
        let mark = if task.is_completed { "x" } else { " " };
        let tag = if task.is_subtask() { "  ↳ " } else { "" };
        println!("[{}] #{:<4} {}{}", mark, task.id, tag, task.title);
    }
    Ok(())
}

/// Create a task. Blank titles are rejected before any network call.
pub fn cmd_add(runtime: &Runtime, client: &ApiClient, title: &str) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        bail!("task title cannot be empty");
    }
    let task = runtime
        .block_on(client.create_task(title))
        .context("failed to create task")?;
    println!("Added #{}: {}", task.id, task.title);
    Ok(())
}

/// Flip a task's completion flag, preserving its title.
pub fn cmd_complete(runtime: &Runtime, client: &ApiClient, id: u64) -> Result<()> {
    let tasks = runtime
        .block_on(client.list_tasks())
        .context("failed to fetch tasks")?;
    let task = tasks
        .iter()
        .find(|t| t.id == id)
        .with_context(|| format!("no task with ID {}", id))?;

    let flipped = !task.is_completed;
    runtime
        .block_on(client.update_task(id, &task.title, flipped))
        .context("failed to update task")?;
    println!(
        "Task #{} marked {}",
        id,
        if flipped { "done" } else { "open" }
    );
    Ok(())
}

/// Delete a task by id.
pub fn cmd_delete(runtime: &Runtime, client: &ApiClient, id: u64) -> Result<()> {
    runtime
        .block_on(client.delete_task(id))
        .context("failed to delete task")?;
    println!("Deleted task #{}", id);
    Ok(())
}

/// Emit shell completions on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
