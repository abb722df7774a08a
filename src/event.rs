//! Completion events posted back to the UI thread by network tasks.
//!
//! Each API call spawned by the TUI finishes by sending exactly one of
//! these over an `std::sync::mpsc` channel. The event loop drains the
//! channel every tick and applies the results on the UI thread, so no task
//! state is ever mutated concurrently.

use crate::api::ApiError;
use crate::task::Task;

/// Result of an asynchronous API call.
///
/// Mutation events carry the id they were issued for so the receiver can
/// match them against its current state and drop the ones that arrive after
/// the panel or entry they refer to has gone away.
pub enum ApiEvent {
    /// Full task list fetched (or the fetch failed).
    TasksLoaded(Result<Vec<Task>, ApiError>),
    /// A create call finished; on success carries the created entity.
    TaskCreated(Result<Task, ApiError>),
    /// A toggle-completion update finished for `id`; `is_completed` is the
    /// value that was sent and is applied to the cache only on success.
    TaskToggled {
        id: u64,
        is_completed: bool,
        result: Result<(), ApiError>,
    },
    /// A delete call finished for `id`.
    TaskDeleted { id: u64, result: Result<(), ApiError> },
    /// The AI service answered a generate call issued for `task_id`.
    SuggestionsGenerated {
        task_id: u64,
        result: Result<Vec<String>, ApiError>,
    },
    /// A batch-create of selected suggestions finished for `task_id`.
    SubtasksSaved { task_id: u64, result: Result<(), ApiError> },
}
