//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which owns the cached task list,
//! the single active AI suggestion panel, and the channel that network
//! tasks report back on. Handlers mutate state only on the UI thread:
//! every API call is spawned onto the runtime and re-enters the loop as an
//! [`ApiEvent`] applied by `apply_event`.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use log::warn;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tokio::runtime::Handle;

use crate::api::ApiClient;
use crate::event::ApiEvent;
use crate::task::Task;
use crate::tui::colors::{AI_PURPLE, DONE_GREEN, ERROR_RED, SUBTASK_GOLD};
use crate::tui::input::InputField;
use crate::workflow::{SuggestionWorkflow, WorkflowState};

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    TaskList,
    AddTask,
    Confirm,
    Help,
}

/// Main application state for the terminal user interface.
///
/// The server is the sole source of truth; `tasks` is a transient cache
/// replaced in full on load and patched in place after successful
/// mutations. `ai_panel` holds at most one suggestion workflow at a time,
/// keyed by the task it was opened for.
pub struct App {
    state: AppState,
    runtime: Handle,
    client: ApiClient,
    events_tx: Sender<ApiEvent>,
    events_rx: Receiver<ApiEvent>,
    tasks: Vec<Task>,
    filtered_tasks: Vec<u64>,
    task_list_state: TableState,
    loading: bool,
    show_completed: bool,
    title_input: InputField,
    status_message: String,
    confirm_delete: Option<u64>,
    ai_panel: Option<SuggestionWorkflow>,
    panel_cursor: usize,
}

impl App {
    /// Create a new App instance talking to the given server.
    pub fn new(runtime: Handle, client: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        App {
            state: AppState::TaskList,
            runtime,
            client,
            events_tx,
            events_rx,
            tasks: Vec::new(),
            filtered_tasks: Vec::new(),
            task_list_state: TableState::default(),
            loading: false,
            show_completed: true,
            title_input: InputField::new(),
            status_message: String::new(),
            confirm_delete: None,
            ai_panel: None,
            panel_cursor: 0,
        }
    }

    /// Run the event loop until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.spawn_load();
        loop {
            self.drain_events();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key.code, key.modifiers) {
                        return Ok(());
                    }
                }
            }
        }
    }

    // ---- network dispatch -------------------------------------------------

    /// Fetch the full task list, replacing the cache when the result lands.
    fn spawn_load(&mut self) {
        self.loading = true;
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.list_tasks().await;
            let _ = tx.send(ApiEvent::TasksLoaded(result));
        });
    }

    /// Submit the add-task input. Returns true if a create call was
    /// dispatched; blank titles never reach the network.
    fn submit_new_task(&mut self) -> bool {
        let title = self.title_input.value.trim().to_string();
        if title.is_empty() {
            self.set_status_message("Task title cannot be empty".to_string());
            return false;
        }
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.create_task(&title).await;
            let _ = tx.send(ApiEvent::TaskCreated(result));
        });
        self.title_input.reset();
        self.state = AppState::TaskList;
        true
    }

    /// Flip the selected task's completion flag server-side, keeping the
    /// title as it is. The cache is only patched once the call succeeds.
    fn toggle_selected_task(&mut self) {
        let Some(task) = self.get_selected_task() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        let id = task.id;
        let title = task.title.clone();
        let flipped = !task.is_completed;
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.update_task(id, &title, flipped).await;
            let _ = tx.send(ApiEvent::TaskToggled {
                id,
                is_completed: flipped,
                result,
            });
        });
    }

    /// Delete the task the confirm dialog was opened for.
    fn delete_confirmed_task(&mut self) {
        let Some(id) = self.confirm_delete.take() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.delete_task(id).await;
            let _ = tx.send(ApiEvent::TaskDeleted { id, result });
        });
    }

    /// Start generation for the open panel. The workflow's re-entry guard
    /// ensures at most one generate call is in flight per panel.
    fn request_generate(&mut self) {
        let Some(workflow) = self.ai_panel.as_mut() else {
            return;
        };
        if !workflow.begin_generate() {
            return;
        }
        let task_id = workflow.task_id();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.generate_subtasks(task_id).await;
            let _ = tx.send(ApiEvent::SuggestionsGenerated { task_id, result });
        });
    }

    /// Commit the selected suggestions. Returns true if a batch-create call
    /// was dispatched; an empty selection is a local no-op.
    fn request_save(&mut self) -> bool {
        let Some(workflow) = self.ai_panel.as_ref() else {
            return false;
        };
        let titles = workflow.selected_titles();
        if titles.is_empty() {
            self.set_status_message("No suggestions selected".to_string());
            return false;
        }
        let task_id = workflow.task_id();
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        self.runtime.spawn(async move {
            let result = client.batch_create(task_id, titles).await;
            let _ = tx.send(ApiEvent::SubtasksSaved { task_id, result });
        });
        true
    }

    // ---- event application ------------------------------------------------

    /// Drain all pending completion events from network tasks.
    fn drain_events(&mut self) {
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Apply one completion event. Failed calls surface a message and leave
    /// the cache exactly as it was.
    fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::TasksLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(mut tasks) => {
                        // Server order is insertion order; display newest first.
                        tasks.reverse();
                        self.tasks = tasks;
                        self.update_filtered_tasks();
                    }
                    Err(e) => {
                        warn!("task list fetch failed: {}", e);
                        self.set_status_message(format!("Error fetching tasks: {}", e));
                    }
                }
            }
            ApiEvent::TaskCreated(result) => match result {
                Ok(task) => {
                    self.set_status_message(format!("Added task #{}", task.id));
                    self.tasks.insert(0, task);
                    self.update_filtered_tasks();
                    self.task_list_state.select(Some(0));
                }
                Err(e) => {
                    warn!("task create failed: {}", e);
                    self.set_status_message(format!("Error adding task: {}", e));
                }
            },
            ApiEvent::TaskToggled {
                id,
                is_completed,
                result,
            } => match result {
                Ok(()) => {
                    if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                        task.is_completed = is_completed;
                    }
                    self.update_filtered_tasks();
                }
                Err(e) => {
                    warn!("task update failed: {}", e);
                    self.set_status_message(format!("Error updating task: {}", e));
                }
            },
            ApiEvent::TaskDeleted { id, result } => match result {
                Ok(()) => {
                    self.tasks.retain(|t| t.id != id);
                    self.update_filtered_tasks();
                    // A panel for a task that no longer exists is useless.
                    if self.ai_panel.as_ref().is_some_and(|w| w.task_id() == id) {
                        self.ai_panel = None;
                    }
                    self.set_status_message(format!("Deleted task #{}", id));
                }
                Err(e) => {
                    warn!("task delete failed: {}", e);
                    self.set_status_message(format!("Error deleting task: {}", e));
                }
            },
            ApiEvent::SuggestionsGenerated { task_id, result } => {
                let Some(workflow) = self
                    .ai_panel
                    .as_mut()
                    .filter(|w| w.task_id() == task_id)
                else {
                    warn!("dropping stale suggestions for task {}", task_id);
                    return;
                };
                match result {
                    Ok(titles) => {
                        workflow.suggestions_ready(titles);
                        self.panel_cursor = 0;
                    }
                    Err(e) => {
                        warn!("subtask generation failed: {}", e);
                        workflow.generate_failed(e.to_string());
                    }
                }
            }
            ApiEvent::SubtasksSaved { task_id, result } => {
                let Some(workflow) = self
                    .ai_panel
                    .as_mut()
                    .filter(|w| w.task_id() == task_id)
                else {
                    warn!("dropping stale batch-create result for task {}", task_id);
                    return;
                };
                match result {
                    Ok(()) => {
                        workflow.saved();
                        self.ai_panel = None;
                        self.set_status_message("Subtasks added".to_string());
                        self.spawn_load();
                    }
                    Err(e) => {
                        warn!("batch create failed: {}", e);
                        workflow.save_failed(e.to_string());
                    }
                }
            }
        }
    }

    // ---- local state ------------------------------------------------------

    /// Toggle which task's AI panel is open. The same id closes it; a
    /// different id replaces the prior workflow, discarding its unsaved
    /// suggestions without any server interaction.
    fn set_active_panel(&mut self, task_id: Option<u64>) {
        match task_id {
            Some(id) if self.ai_panel.as_ref().is_some_and(|w| w.task_id() == id) => {
                self.ai_panel = None;
            }
            Some(id) => {
                self.ai_panel = Some(SuggestionWorkflow::new(id));
                self.panel_cursor = 0;
            }
            None => self.ai_panel = None,
        }
    }

    /// Rebuild the visible id list from the cache and the completed-filter,
    /// preserving the selection where possible.
    fn update_filtered_tasks(&mut self) {
        let old_selected_id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.filtered_tasks.get(idx))
            .copied();

        self.filtered_tasks = self
            .tasks
            .iter()
            .filter(|t| self.show_completed || !t.is_completed)
            .map(|t| t.id)
            .collect();

        if let Some(old_id) = old_selected_id {
            if let Some(new_idx) = self.filtered_tasks.iter().position(|&id| id == old_id) {
                self.task_list_state.select(Some(new_idx));
            } else {
                self.task_list_state
                    .select(if self.filtered_tasks.is_empty() {
                        None
                    } else {
                        Some(0)
                    });
            }
        } else if !self.filtered_tasks.is_empty() && self.task_list_state.selected().is_none() {
            self.task_list_state.select(Some(0));
        } else if self.filtered_tasks.is_empty() {
            self.task_list_state.select(None);
        }
    }

    /// Get a reference to the currently selected task.
    fn get_selected_task(&self) -> Option<&Task> {
        let id = self
            .task_list_state
            .selected()
            .and_then(|idx| self.filtered_tasks.get(idx))?;
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Set a status message to display in the status bar.
    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    // ---- input handling ---------------------------------------------------

    /// Dispatch a key press for the current screen.
    ///
    /// Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            _ => {}
        }

        match self.state {
            AppState::TaskList if self.ai_panel.is_some() => self.handle_panel_input(key),
            AppState::TaskList => return self.handle_task_list_input(key),
            AppState::AddTask => self.handle_add_task_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
            AppState::Help => self.state = AppState::TaskList,
        }
        false
    }

    /// Handle keyboard input when in the task list view.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('n') => {
                self.title_input.reset();
                self.title_input.active = true;
                self.state = AppState::AddTask;
                self.set_status_message("Type a title, Enter to add, Esc to cancel".to_string());
            }
            KeyCode::Char('c') | KeyCode::Char(' ') => self.toggle_selected_task(),
            KeyCode::Char('d') => {
                if let Some(task) = self.get_selected_task() {
                    self.confirm_delete = Some(task.id);
                    self.state = AppState::Confirm;
                } else {
                    self.set_status_message("No task selected".to_string());
                }
            }
            KeyCode::Char('a') => {
                if let Some(task) = self.get_selected_task() {
                    self.set_active_panel(Some(task.id));
                } else {
                    self.set_status_message("No task selected".to_string());
                }
            }
            KeyCode::Char('t') => {
                self.show_completed = !self.show_completed;
                self.update_filtered_tasks();
                self.set_status_message(if self.show_completed {
                    format!("Showing all tasks ({} total)", self.filtered_tasks.len())
                } else {
                    format!(
                        "Hiding completed tasks ({} visible)",
                        self.filtered_tasks.len()
                    )
                });
            }
            KeyCode::Char('r') => {
                self.spawn_load();
                self.set_status_message("Reloading tasks...".to_string());
            }
            KeyCode::Char('h') => self.state = AppState::Help,
            _ => {}
        }
        false
    }

    /// Handle keyboard input while the AI suggestion panel is open.
    fn handle_panel_input(&mut self, key: KeyCode) {
        let Some(workflow) = self.ai_panel.as_mut() else {
            return;
        };
        let reviewing = matches!(workflow.state(), WorkflowState::Reviewing { .. });

        match key {
            KeyCode::Esc => {
                if reviewing {
                    workflow.cancel();
                } else {
                    self.set_active_panel(None);
                }
            }
            KeyCode::Char('a') => {
                let id = workflow.task_id();
                self.set_active_panel(Some(id));
            }
            KeyCode::Char('g') if !reviewing => self.request_generate(),
            KeyCode::Up if reviewing => {
                self.panel_cursor = self.panel_cursor.saturating_sub(1);
            }
            KeyCode::Down if reviewing => {
                if self.panel_cursor + 1 < workflow.suggestions().len() {
                    self.panel_cursor += 1;
                }
            }
            KeyCode::Char(' ') if reviewing => {
                let cursor = self.panel_cursor;
                workflow.toggle_selection(cursor);
            }
            KeyCode::Enter if reviewing => {
                self.request_save();
            }
            _ => {}
        }
    }

    /// Handle keyboard input when typing a new task title.
    fn handle_add_task_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.title_input.reset();
                self.state = AppState::TaskList;
                self.status_message.clear();
            }
            KeyCode::Enter => {
                self.submit_new_task();
            }
            KeyCode::Backspace => self.title_input.handle_backspace(),
            KeyCode::Left => self.title_input.move_cursor_left(),
            KeyCode::Right => self.title_input.move_cursor_right(),
            KeyCode::Char(c) => self.title_input.handle_char(c),
            _ => {}
        }
    }

    /// Handle keyboard input in the delete confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.delete_confirmed_task();
                self.state = AppState::TaskList;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.state = AppState::TaskList;
            }
            _ => {}
        }
    }

    /// Move the list selection up or down.
    fn move_selection(&mut self, delta: i64) {
        if self.filtered_tasks.is_empty() {
            return;
        }
        let current = self.task_list_state.selected().unwrap_or(0) as i64;
        let last = self.filtered_tasks.len() as i64 - 1;
        let next = (current + delta).clamp(0, last);
        self.task_list_state.select(Some(next as usize));
    }

    // ---- rendering --------------------------------------------------------

    fn draw(&mut self, f: &mut Frame) {
        let with_panel = self.ai_panel.is_some();
        let constraints = if with_panel {
            vec![
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(9),
                Constraint::Length(1),
            ]
        } else {
            vec![
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Length(1),
            ]
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        self.draw_input_bar(f, chunks[0]);
        self.draw_task_table(f, chunks[1]);
        if with_panel {
            self.draw_ai_panel(f, chunks[2]);
        }
        self.draw_status_bar(f, chunks[chunks.len() - 1]);

        match self.state {
            AppState::Confirm => self.draw_confirm_dialog(f),
            AppState::Help => self.draw_help(f),
            _ => {}
        }
    }

    fn draw_input_bar(&self, f: &mut Frame, area: Rect) {
        let (text, style) = if self.title_input.active {
            (
                self.title_input.value.as_str(),
                Style::default().fg(Color::White),
            )
        } else {
            (
                "Press n to add a task",
                Style::default().fg(Color::DarkGray),
            )
        };
        let input = Paragraph::new(text).style(style).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Smart Task Manager "),
        );
        f.render_widget(input, area);

        if self.title_input.active {
            f.set_cursor_position((
                area.x + 1 + self.title_input.cursor_column() as u16,
                area.y + 1,
            ));
        }
    }

    fn draw_task_table(&mut self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .filtered_tasks
            .iter()
            .filter_map(|id| self.tasks.iter().find(|t| t.id == *id))
            .map(|task| {
                let mark = if task.is_completed { "[x]" } else { "[ ]" };
                let mut title_style = Style::default();
                if task.is_completed {
                    title_style = title_style
                        .fg(DONE_GREEN)
                        .add_modifier(Modifier::CROSSED_OUT);
                }
                let title = if task.is_subtask() {
                    Line::from(vec![
                        Span::styled("↳ ", Style::default().fg(SUBTASK_GOLD)),
                        Span::styled(task.title.clone(), title_style),
                    ])
                } else {
                    Line::from(Span::styled(task.title.clone(), title_style))
                };
                Row::new(vec![
                    Line::from(mark),
                    Line::from(format!("#{}", task.id)),
                    title,
                ])
            })
            .collect();

        let empty = rows.is_empty();
        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(6),
                Constraint::Min(10),
            ],
        )
        .block(Block::default().borders(Borders::ALL).title(" Tasks "))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(table, area, &mut self.task_list_state);

        if empty && !self.loading {
            let hint = Paragraph::new("No tasks yet. Add one with n!")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray));
            let inner = Rect {
                x: area.x + 1,
                y: area.y + area.height / 2,
                width: area.width.saturating_sub(2),
                height: 1,
            };
            f.render_widget(hint, inner);
        }
    }

    fn draw_ai_panel(&self, f: &mut Frame, area: Rect) {
        let Some(workflow) = self.ai_panel.as_ref() else {
            return;
        };
        let task_title = self
            .tasks
            .iter()
            .find(|t| t.id == workflow.task_id())
            .map(|t| t.title.as_str())
            .unwrap_or("?");

        let mut lines: Vec<Line> = Vec::new();
        match workflow.state() {
            WorkflowState::Idle => {
                lines.push(Line::from("✨ g: generate subtasks with AI"));
            }
            WorkflowState::Generating => {
                lines.push(Line::from("Thinking..."));
            }
            WorkflowState::Reviewing { suggestions } => {
                for (idx, suggestion) in suggestions.iter().enumerate() {
                    let mark = if suggestion.is_selected { "[x]" } else { "[ ]" };
                    let style = if idx == self.panel_cursor {
                        Style::default()
                            .bg(Color::DarkGray)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("{} {}", mark, suggestion.title),
                        style,
                    )));
                }
                lines.push(Line::from(Span::styled(
                    "Space select · Enter save selected · Esc cancel",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        if let Some(error) = workflow.last_error() {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(ERROR_RED),
            )));
        }

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(AI_PURPLE))
                .title(format!(" AI Suggestions · {} ", task_title)),
        );
        f.render_widget(panel, area);
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.loading {
            "Loading tasks...".to_string()
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            "n:new  c:toggle  d:delete  a:AI panel  t:filter  r:reload  h:help  q:quit".to_string()
        };
        let bar = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        f.render_widget(bar, area);
    }

    fn draw_confirm_dialog(&self, f: &mut Frame) {
        let Some(id) = self.confirm_delete else {
            return;
        };
        let area = centered_rect(40, 20, f.area());
        f.render_widget(Clear, area);
        let dialog = Paragraph::new(format!("Delete task #{}?\n\ny: yes    n: no", id))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ERROR_RED))
                    .title(" Confirm "),
            );
        f.render_widget(dialog, area);
    }

    fn draw_help(&self, f: &mut Frame) {
        let area = centered_rect(60, 60, f.area());
        f.render_widget(Clear, area);
        let help = Paragraph::new(
            "n        add a new task\n\
             c/Space  toggle completion\n\
             d        delete selected task\n\
             a        open/close AI panel for selected task\n\
             g        generate suggestions (in panel)\n\
             Enter    save selected suggestions (in panel)\n\
             Esc      cancel suggestions / close panel\n\
             t        show/hide completed tasks\n\
             r        reload from server\n\
             q        quit\n\n\
             Press any key to close",
        )
        .block(Block::default().borders(Borders::ALL).title(" Help "));
        f.render_widget(help, area);
    }
}

/// Helper to create a centered rect using a percentage of the available area.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use tokio::runtime::Runtime;

    fn test_app(runtime: &Runtime) -> App {
        App::new(
            runtime.handle().clone(),
            ApiClient::new("http://localhost:8000"),
        )
    }

    fn task(id: u64, title: &str, is_completed: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            is_completed,
            description: None,
        }
    }

    fn api_error() -> ApiError {
        ApiError::Decode("bad body".to_string())
    }

    #[test]
    fn test_load_replaces_cache_newest_first() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.loading = true;

        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![
            task(1, "first", false),
            task(2, "second", false),
        ])));

        assert!(!app.loading);
        assert_eq!(app.tasks[0].id, 2);
        assert_eq!(app.tasks[1].id, 1);
        assert_eq!(app.task_list_state.selected(), Some(0));
    }

    #[test]
    fn test_failed_load_keeps_previous_cache() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![task(1, "keep me", false)])));

        app.loading = true;
        app.apply_event(ApiEvent::TasksLoaded(Err(api_error())));

        assert!(!app.loading);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].title, "keep me");
    }

    #[test]
    fn test_created_task_is_prepended() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![task(1, "old", false)])));

        app.apply_event(ApiEvent::TaskCreated(Ok(task(2, "new", false))));

        assert_eq!(app.tasks[0].id, 2);
        assert_eq!(app.tasks.len(), 2);
    }

    #[test]
    fn test_blank_title_never_dispatches() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.title_input.value = "   ".to_string();

        assert!(!app.submit_new_task());
        assert_eq!(app.status_message, "Task title cannot be empty");
    }

    #[test]
    fn test_toggle_twice_restores_flag_and_title() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![task(5, "stable", false)])));

        app.apply_event(ApiEvent::TaskToggled {
            id: 5,
            is_completed: true,
            result: Ok(()),
        });
        assert!(app.tasks[0].is_completed);
        assert_eq!(app.tasks[0].title, "stable");

        app.apply_event(ApiEvent::TaskToggled {
            id: 5,
            is_completed: false,
            result: Ok(()),
        });
        assert!(!app.tasks[0].is_completed);
        assert_eq!(app.tasks[0].title, "stable");
    }

    #[test]
    fn test_failed_toggle_leaves_cache_untouched() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![task(5, "stable", false)])));

        app.apply_event(ApiEvent::TaskToggled {
            id: 5,
            is_completed: true,
            result: Err(api_error()),
        });

        assert!(!app.tasks[0].is_completed);
    }

    #[test]
    fn test_delete_removes_entry_and_closes_its_panel() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![
            task(1, "a", false),
            task(2, "b", false),
        ])));
        app.set_active_panel(Some(1));

        app.apply_event(ApiEvent::TaskDeleted {
            id: 1,
            result: Ok(()),
        });

        assert!(app.tasks.iter().all(|t| t.id != 1));
        assert!(app.ai_panel.is_none());
    }

    #[test]
    fn test_panel_toggles_and_switching_discards_prior_workflow() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);

        app.set_active_panel(Some(1));
        assert_eq!(app.ai_panel.as_ref().unwrap().task_id(), 1);

        // Give task 1 some in-progress suggestions, then switch to task 2.
        let workflow = app.ai_panel.as_mut().unwrap();
        workflow.begin_generate();
        workflow.suggestions_ready(vec!["A".to_string()]);

        app.set_active_panel(Some(2));
        let workflow = app.ai_panel.as_ref().unwrap();
        assert_eq!(workflow.task_id(), 2);
        assert!(workflow.suggestions().is_empty());

        // Same id acts as a close toggle.
        app.set_active_panel(Some(2));
        assert!(app.ai_panel.is_none());
    }

    #[test]
    fn test_stale_suggestions_are_dropped() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.set_active_panel(Some(2));
        app.ai_panel.as_mut().unwrap().begin_generate();

        // Result for a panel that is no longer open.
        app.apply_event(ApiEvent::SuggestionsGenerated {
            task_id: 1,
            result: Ok(vec!["stale".to_string()]),
        });

        let workflow = app.ai_panel.as_ref().unwrap();
        assert_eq!(workflow.task_id(), 2);
        assert!(workflow.suggestions().is_empty());
        assert!(workflow.is_generating());
    }

    #[test]
    fn test_matching_suggestions_enter_review() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.set_active_panel(Some(2));
        app.ai_panel.as_mut().unwrap().begin_generate();

        app.apply_event(ApiEvent::SuggestionsGenerated {
            task_id: 2,
            result: Ok(vec!["A".to_string(), "B".to_string()]),
        });

        let workflow = app.ai_panel.as_ref().unwrap();
        assert_eq!(workflow.suggestions().len(), 2);
        assert!(workflow.suggestions().iter().all(|s| s.is_selected));
    }

    #[test]
    fn test_save_with_empty_selection_is_local_noop() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.set_active_panel(Some(2));
        {
            let workflow = app.ai_panel.as_mut().unwrap();
            workflow.begin_generate();
            workflow.suggestions_ready(vec!["A".to_string()]);
            workflow.toggle_selection(0);
        }

        assert!(!app.request_save());
        let workflow = app.ai_panel.as_ref().unwrap();
        assert_eq!(workflow.suggestions().len(), 1);
    }

    #[test]
    fn test_save_success_closes_panel_and_reloads() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.set_active_panel(Some(2));
        {
            let workflow = app.ai_panel.as_mut().unwrap();
            workflow.begin_generate();
            workflow.suggestions_ready(vec!["A".to_string()]);
        }

        app.apply_event(ApiEvent::SubtasksSaved {
            task_id: 2,
            result: Ok(()),
        });

        assert!(app.ai_panel.is_none());
        // The view refreshes from the server after a successful save.
        assert!(app.loading);
    }

    #[test]
    fn test_save_failure_keeps_panel_reviewing() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.set_active_panel(Some(2));
        {
            let workflow = app.ai_panel.as_mut().unwrap();
            workflow.begin_generate();
            workflow.suggestions_ready(vec!["A".to_string()]);
        }

        app.apply_event(ApiEvent::SubtasksSaved {
            task_id: 2,
            result: Err(api_error()),
        });

        let workflow = app.ai_panel.as_ref().unwrap();
        assert_eq!(workflow.suggestions().len(), 1);
        assert!(workflow.last_error().is_some());
    }

    #[test]
    fn test_add_mode_drives_input_focus() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);

        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);
        assert!(app.state == AppState::AddTask);
        assert!(app.title_input.active);

        app.handle_key(KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.state == AppState::TaskList);
        assert!(!app.title_input.active);
    }

    #[test]
    fn test_typing_multibyte_title_does_not_corrupt_input() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);

        for c in "Café".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(app.title_input.value, "Cafés");

        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        app.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.title_input.value, "Caf");
        assert_eq!(app.title_input.cursor_column(), 3);
    }

    #[test]
    fn test_completed_filter_hides_done_tasks() {
        let rt = Runtime::new().unwrap();
        let mut app = test_app(&rt);
        app.apply_event(ApiEvent::TasksLoaded(Ok(vec![
            task(1, "open", false),
            task(2, "done", true),
        ])));

        app.show_completed = false;
        app.update_filtered_tasks();
        assert_eq!(app.filtered_tasks.len(), 1);

        app.show_completed = true;
        app.update_filtered_tasks();
        assert_eq!(app.filtered_tasks.len(), 2);
    }
}
