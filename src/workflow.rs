//! State machine for the AI subtask-suggestion panel.
//!
//! One workflow exists per open panel, bound to a single task. Network I/O
//! lives elsewhere; this module only models the legal transitions, which
//! keeps combinations like "loading and reviewing at once" unrepresentable:
//!
//! `Idle` --generate--> `Generating` --success--> `Reviewing` --save/cancel--> `Idle`
//!
//! A failed generate drops back to `Idle` with the error recorded; a failed
//! save stays in `Reviewing` so the selection is not lost.

/// A candidate subtask title awaiting user confirmation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub is_selected: bool,
}

/// The panel's single tagged state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    /// No suggestions held; generation may be started.
    Idle,
    /// A generate request is in flight; re-entry is refused.
    Generating,
    /// Suggestions held, each independently selectable.
    Reviewing { suggestions: Vec<Suggestion> },
}

/// The generate → review/select → commit lifecycle for one task's panel.
#[derive(Debug)]
pub struct SuggestionWorkflow {
    task_id: u64,
    state: WorkflowState,
    last_error: Option<String>,
}

impl SuggestionWorkflow {
    /// Open a fresh panel for the given task.
    pub fn new(task_id: u64) -> Self {
        Self {
            task_id,
            state: WorkflowState::Idle,
            last_error: None,
        }
    }

    /// Id of the task this panel belongs to. Responses for any other task
    /// id are stale and must be dropped by the caller.
    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.state == WorkflowState::Generating
    }

    /// Begin generation. Returns false without side effects unless the
    /// workflow is `Idle`, which is what stops a second request going out
    /// while one is already in flight.
    pub fn begin_generate(&mut self) -> bool {
        if self.state != WorkflowState::Idle {
            return false;
        }
        self.state = WorkflowState::Generating;
        self.last_error = None;
        true
    }

    /// Accept the generated titles: `Generating` → `Reviewing`, every
    /// suggestion selected by default.
    pub fn suggestions_ready(&mut self, titles: Vec<String>) {
        if self.state != WorkflowState::Generating {
            return;
        }
        let suggestions = titles
            .into_iter()
            .map(|title| Suggestion {
                title,
                is_selected: true,
            })
            .collect();
        self.state = WorkflowState::Reviewing { suggestions };
    }

    /// Record a failed generate call: back to `Idle`, error kept for display.
    pub fn generate_failed(&mut self, message: String) {
        if self.state != WorkflowState::Generating {
            return;
        }
        self.state = WorkflowState::Idle;
        self.last_error = Some(message);
    }

    /// Flip the selection flag of one suggestion. Only meaningful while
    /// reviewing; out-of-range indices are ignored.
    pub fn toggle_selection(&mut self, index: usize) {
        if let WorkflowState::Reviewing { suggestions } = &mut self.state {
            if let Some(suggestion) = suggestions.get_mut(index) {
                suggestion.is_selected = !suggestion.is_selected;
            }
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match &self.state {
            WorkflowState::Reviewing { suggestions } => suggestions,
            _ => &[],
        }
    }

    /// Titles currently selected for committing, in display order.
    pub fn selected_titles(&self) -> Vec<String> {
        self.suggestions()
            .iter()
            .filter(|s| s.is_selected)
            .map(|s| s.title.clone())
            .collect()
    }

    /// The batch-create succeeded: clear everything, back to `Idle`.
    pub fn saved(&mut self) {
        if matches!(self.state, WorkflowState::Reviewing { .. }) {
            self.state = WorkflowState::Idle;
            self.last_error = None;
        }
    }

    /// The batch-create failed: keep the suggestions and the selection so
    /// the user can retry, record the error.
    pub fn save_failed(&mut self, message: String) {
        if matches!(self.state, WorkflowState::Reviewing { .. }) {
            self.last_error = Some(message);
        }
    }

    /// Discard all suggestions unconditionally and return to `Idle`.
    pub fn cancel(&mut self) {
        if matches!(self.state, WorkflowState::Reviewing { .. }) {
            self.state = WorkflowState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewing_workflow(titles: &[&str]) -> SuggestionWorkflow {
        let mut wf = SuggestionWorkflow::new(42);
        assert!(wf.begin_generate());
        wf.suggestions_ready(titles.iter().map(|t| t.to_string()).collect());
        wf
    }

    #[test]
    fn test_generate_success_selects_everything() {
        let wf = reviewing_workflow(&["A", "B"]);
        assert_eq!(wf.suggestions().len(), 2);
        assert!(wf.suggestions().iter().all(|s| s.is_selected));
        assert_eq!(wf.selected_titles(), vec!["A", "B"]);
    }

    #[test]
    fn test_generate_reentry_is_refused() {
        let mut wf = SuggestionWorkflow::new(1);
        assert!(wf.begin_generate());
        // Second call while the request is in flight must not go out.
        assert!(!wf.begin_generate());
        assert!(wf.is_generating());
    }

    #[test]
    fn test_generate_refused_while_reviewing() {
        let mut wf = reviewing_workflow(&["A"]);
        assert!(!wf.begin_generate());
        assert_eq!(wf.suggestions().len(), 1);
    }

    #[test]
    fn test_generate_failure_returns_to_idle_with_error() {
        let mut wf = SuggestionWorkflow::new(1);
        wf.begin_generate();
        wf.generate_failed("AI service failed".to_string());
        assert_eq!(*wf.state(), WorkflowState::Idle);
        assert_eq!(wf.last_error(), Some("AI service failed"));
        // The error clears on the next attempt.
        assert!(wf.begin_generate());
        assert_eq!(wf.last_error(), None);
    }

    #[test]
    fn test_deselect_then_selected_titles() {
        let mut wf = reviewing_workflow(&["A", "B"]);
        wf.toggle_selection(0);
        assert_eq!(wf.selected_titles(), vec!["B"]);
        wf.toggle_selection(0);
        assert_eq!(wf.selected_titles(), vec!["A", "B"]);
    }

    #[test]
    fn test_toggle_out_of_range_is_ignored() {
        let mut wf = reviewing_workflow(&["A"]);
        wf.toggle_selection(5);
        assert_eq!(wf.selected_titles(), vec!["A"]);
    }

    #[test]
    fn test_save_failure_keeps_reviewing_state() {
        let mut wf = reviewing_workflow(&["A", "B"]);
        wf.toggle_selection(1);
        wf.save_failed("server returned 500".to_string());
        assert_eq!(wf.suggestions().len(), 2);
        assert_eq!(wf.selected_titles(), vec!["A"]);
        assert_eq!(wf.last_error(), Some("server returned 500"));
    }

    #[test]
    fn test_save_success_resets_to_idle() {
        let mut wf = reviewing_workflow(&["A"]);
        wf.saved();
        assert_eq!(*wf.state(), WorkflowState::Idle);
        assert!(wf.suggestions().is_empty());
    }

    #[test]
    fn test_cancel_discards_regardless_of_selection() {
        let mut wf = reviewing_workflow(&["A", "B", "C"]);
        wf.toggle_selection(0);
        wf.toggle_selection(2);
        wf.cancel();
        assert_eq!(*wf.state(), WorkflowState::Idle);
        assert!(wf.suggestions().is_empty());
    }

    #[test]
    fn test_stale_transitions_are_ignored() {
        let mut wf = SuggestionWorkflow::new(1);
        // Not generating: a late response must not fabricate a review state.
        wf.suggestions_ready(vec!["A".to_string()]);
        assert_eq!(*wf.state(), WorkflowState::Idle);
        wf.generate_failed("late".to_string());
        assert_eq!(wf.last_error(), None);
    }
}
