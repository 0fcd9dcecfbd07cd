//! Search index store client.
//!
//! The store runs mutations asynchronously: every write returns a
//! [`TaskHandle`] that has to be polled until the task reaches a terminal
//! state.

mod meilisearch;
mod types;

pub use meilisearch::MeilisearchClient;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from the search index store.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// Store unreachable or unhealthy.
    #[error("Search index unavailable: {0}")]
    Unavailable(String),

    #[error("Search index request timeout")]
    Timeout,

    #[error("Search index API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Task {task_uid} failed ({code}): {message}")]
    TaskFailed {
        task_uid: u64,
        code: String,
        message: String,
    },

    #[error("Task {0} did not finish in time")]
    TaskTimeout(u64),
}

/// Trait for search index backends.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Check that the store is up.
    async fn health(&self) -> Result<(), IndexError>;

    /// Delete a collection.
    async fn delete_index(&self, uid: &str) -> Result<TaskHandle, IndexError>;

    /// Create a collection with the given primary key.
    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskHandle, IndexError>;

    /// Bulk-insert documents (insert or replace by primary key).
    async fn add_documents(
        &self,
        uid: &str,
        primary_key: &str,
        documents: Vec<Value>,
    ) -> Result<TaskHandle, IndexError>;

    /// Block until the task reaches a terminal state and return it.
    ///
    /// A task that ends `failed` or `canceled` is returned as-is; use
    /// [`TaskInfo::into_result`] to turn it into an error.
    async fn wait_for_task(&self, task: TaskHandle) -> Result<TaskInfo, IndexError>;

    /// Free-text search with paging.
    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchPage, IndexError>;

    /// Page through stored documents in insertion order.
    async fn documents(
        &self,
        uid: &str,
        limit: u32,
        offset: u64,
    ) -> Result<DocumentsPage, IndexError>;
}

/// Delete then recreate a collection, waiting for both tasks.
///
/// A missing collection is not an error.
pub async fn reset_index(
    index: &dyn SearchIndex,
    uid: &str,
    primary_key: &str,
) -> Result<(), IndexError> {
    let deleted = index.wait_for_task(index.delete_index(uid).await?).await?;
    if !deleted.is_index_not_found() {
        deleted.into_result()?;
    }

    let created = index
        .wait_for_task(index.create_index(uid, primary_key).await?)
        .await?;
    created.into_result()?;
    Ok(())
}
