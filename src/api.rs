//! HTTP client for the Smart Task Manager API.
//!
//! The server owns all task state; this client is the only way the rest of
//! the crate talks to it. Every method maps to exactly one endpoint of the
//! REST contract and returns an [`ApiError`] on transport failure or any
//! non-2xx response.

use log::debug;
use reqwest::StatusCode;
use thiserror::Error;

use crate::task::{BatchCreatePayload, GeneratedSubtasks, Task, TaskPayload};

/// Default base URL, matching the backend's development bind address.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Errors from talking to the task server.
///
/// The UI treats all variants the same way (a message near the affected
/// control); the split exists so logs and the CLI can tell a dead server
/// apart from a rejecting one.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network-level failure: no response at all.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// A 2xx response whose body did not match the expected shape.
    #[error("could not decode server response: {0}")]
    Decode(String),
}

/// Client for the task server's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL. A trailing slash is tolerated.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every task, in server (insertion) order.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let url = format!("{}/tasks/", self.base_url);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        Self::check_status(response)
            .await?
            .json::<Vec<Task>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Create a task with the given title, initially not completed.
    /// Returns the created entity with its server-assigned id.
    pub async fn create_task(&self, title: &str) -> Result<Task, ApiError> {
        let url = format!("{}/tasks/", self.base_url);
        debug!("POST {}", url);
        let payload = TaskPayload {
            title: title.to_string(),
            is_completed: false,
        };
        let response = self.http.post(&url).json(&payload).send().await?;
        Self::check_status(response)
            .await?
            .json::<Task>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Update a task's title and completion flag.
    ///
    /// The server echoes the updated entity but callers only need
    /// success/failure, so the body is not decoded.
    pub async fn update_task(
        &self,
        id: u64,
        title: &str,
        is_completed: bool,
    ) -> Result<(), ApiError> {
        let url = format!("{}/tasks/{}", self.base_url, id);
        debug!("PUT {}", url);
        let payload = TaskPayload {
            title: title.to_string(),
            is_completed,
        };
        let response = self.http.put(&url).json(&payload).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Delete a task by id.
    pub async fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        let url = format!("{}/tasks/{}", self.base_url, id);
        debug!("DELETE {}", url);
        let response = self.http.delete(&url).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Ask the AI service for suggested subtask titles for a task.
    pub async fn generate_subtasks(&self, id: u64) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/tasks/{}/generate-subtasks", self.base_url, id);
        debug!("POST {}", url);
        let response = self.http.post(&url).send().await?;
        let generated = Self::check_status(response)
            .await?
            .json::<GeneratedSubtasks>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(generated.suggested_subtasks)
    }

    /// Create one subtask per title under the given parent task.
    pub async fn batch_create(
        &self,
        parent_task_id: u64,
        titles: Vec<String>,
    ) -> Result<(), ApiError> {
        let url = format!("{}/tasks/batch-create", self.base_url);
        debug!("POST {}", url);
        let payload = BatchCreatePayload {
            parent_task_id,
            subtasks_titles: titles,
        };
        let response = self.http.post(&url).json(&payload).send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Turn a non-2xx response into an `ApiError::Status`, keeping whatever
    /// body text the server sent for the logs.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }
}
