use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::IndexError;

/// Handle of an enqueued store task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    #[serde(rename = "taskUid")]
    pub task_uid: u64,
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

/// Error attached to a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskErrorInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}

/// Task state as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub uid: u64,
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<TaskErrorInfo>,
}

impl TaskInfo {
    pub fn succeeded(uid: u64) -> Self {
        Self {
            uid,
            status: TaskStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(uid: u64, code: &str, message: &str) -> Self {
        Self {
            uid,
            status: TaskStatus::Failed,
            error: Some(TaskErrorInfo {
                message: message.to_string(),
                code: code.to_string(),
            }),
        }
    }

    /// Deleting a collection that does not exist fails with this code.
    pub fn is_index_not_found(&self) -> bool {
        self.status == TaskStatus::Failed
            && self
                .error
                .as_ref()
                .map(|e| e.code == "index_not_found")
                .unwrap_or(false)
    }

    /// `Ok` for succeeded tasks, `TaskFailed` otherwise.
    pub fn into_result(self) -> Result<TaskInfo, IndexError> {
        match self.status {
            TaskStatus::Succeeded => Ok(self),
            TaskStatus::Canceled => Err(IndexError::TaskFailed {
                task_uid: self.uid,
                code: "canceled".to_string(),
                message: "task was canceled".to_string(),
            }),
            _ => {
                let error = self.error.unwrap_or(TaskErrorInfo {
                    message: format!("task ended as {:?}", self.status),
                    code: "unknown".to_string(),
                });
                Err(IndexError::TaskFailed {
                    task_uid: self.uid,
                    code: error.code,
                    message: error.message,
                })
            }
        }
    }
}

/// Search query sent to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "q")]
    pub query: String,
    pub limit: u32,
    pub offset: u64,
}

/// One page of search hits, in relevance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default, rename = "estimatedTotalHits")]
    pub estimated_total_hits: Option<u64>,
}

/// One page of stored documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentsPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total: u64,
}
