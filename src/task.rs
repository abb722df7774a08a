//! Wire models for the Smart Task Manager API.
//!
//! These mirror the JSON bodies the server exchanges: the `Task` entity plus
//! the request payloads for creating/updating tasks and batch-creating
//! AI-generated subtasks.

use serde::{Deserialize, Serialize};

/// A persisted unit of work, as returned by the server.
///
/// The server assigns `id`. Tasks created from AI suggestions carry a
/// description prefixed `"Subtask of:"` — a display convention only, the
/// client never enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl Task {
    /// Whether this task was generated as a subtask of another one.
    pub fn is_subtask(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.starts_with("Subtask of:"))
    }
}

/// Body for create and update calls.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub is_completed: bool,
}

/// Body for the batch-create call committing selected suggestions.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreatePayload {
    pub parent_task_id: u64,
    pub subtasks_titles: Vec<String>,
}

/// Response of the generate-subtasks call.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSubtasks {
    pub suggested_subtasks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserializes_server_shape() {
        let json = r#"{"id": 7, "title": "Ship it", "description": null, "is_completed": false}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 7);
        assert_eq!(task.title, "Ship it");
        assert!(!task.is_completed);
        assert!(task.description.is_none());
    }

    #[test]
    fn test_subtask_convention() {
        let tagged = Task {
            id: 1,
            title: "Write docs".to_string(),
            is_completed: false,
            description: Some("Subtask of: Ship it".to_string()),
        };
        let plain = Task {
            id: 2,
            title: "Ship it".to_string(),
            is_completed: false,
            description: None,
        };
        assert!(tagged.is_subtask());
        assert!(!plain.is_subtask());
    }

    #[test]
    fn test_batch_create_payload_shape() {
        let payload = BatchCreatePayload {
            parent_task_id: 3,
            subtasks_titles: vec!["A".to_string(), "B".to_string()],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["parent_task_id"], 3);
        assert_eq!(json["subtasks_titles"][1], "B");
    }
}
