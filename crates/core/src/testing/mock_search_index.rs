//! In-memory search index for testing.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::search_index::{
    DocumentsPage, IndexError, SearchIndex, SearchPage, SearchRequest, TaskHandle, TaskInfo,
};

#[derive(Debug, Clone)]
struct MockCollection {
    primary_key: String,
    documents: Vec<Value>,
}

#[derive(Debug, Default)]
struct MockIndexState {
    collections: HashMap<String, MockCollection>,
    tasks: HashMap<u64, TaskInfo>,
    next_task: u64,
    health_error: Option<IndexError>,
    failing_inserts: HashSet<String>,
    searches: Vec<(String, SearchRequest)>,
}

impl MockIndexState {
    fn finish(&mut self, info: impl FnOnce(u64) -> TaskInfo) -> TaskHandle {
        self.next_task += 1;
        let uid = self.next_task;
        self.tasks.insert(uid, info(uid));
        TaskHandle { task_uid: uid }
    }

    fn collection(&self, uid: &str) -> Result<&MockCollection, IndexError> {
        self.collections.get(uid).ok_or_else(|| IndexError::Api {
            status: 404,
            message: format!("Index `{}` not found. (index_not_found)", uid),
        })
    }
}

/// Mock implementation of the SearchIndex trait.
///
/// Tasks complete synchronously; `wait_for_task` returns the recorded
/// outcome. Search matches every query word against the `name` field,
/// case-insensitively, and keeps insertion order as the ranking.
///
/// # Example
///
/// ```rust,ignore
/// let index = MockSearchIndex::new();
/// index.seed("movies", "stream_id", vec![fixtures::vod_document(1, "Dune")]).await;
///
/// let page = index.search("movies", &request).await?;
/// assert_eq!(index.document_count("movies").await, Some(1));
/// ```
#[derive(Debug, Default)]
pub struct MockSearchIndex {
    state: RwLock<MockIndexState>,
}

impl MockSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection directly.
    pub async fn create(&self, uid: &str, primary_key: &str) {
        self.seed(uid, primary_key, Vec::new()).await;
    }

    /// Create a collection holding `documents`, replacing any previous one.
    pub async fn seed(&self, uid: &str, primary_key: &str, documents: Vec<Value>) {
        self.state.write().await.collections.insert(
            uid.to_string(),
            MockCollection {
                primary_key: primary_key.to_string(),
                documents,
            },
        );
    }

    pub async fn document_count(&self, uid: &str) -> Option<usize> {
        self.state
            .read()
            .await
            .collections
            .get(uid)
            .map(|c| c.documents.len())
    }

    pub async fn primary_key(&self, uid: &str) -> Option<String> {
        self.state
            .read()
            .await
            .collections
            .get(uid)
            .map(|c| c.primary_key.clone())
    }

    /// Make the health check fail (or succeed again with `None`).
    pub async fn set_health_error(&self, error: Option<IndexError>) {
        self.state.write().await.health_error = error;
    }

    /// Make document inserts into `uid` end in a failed task.
    pub async fn fail_inserts_into(&self, uid: &str) {
        self.state
            .write()
            .await
            .failing_inserts
            .insert(uid.to_string());
    }

    /// Most recent search call.
    pub async fn last_search(&self) -> Option<(String, SearchRequest)> {
        self.state.read().await.searches.last().cloned()
    }
}

fn matches(document: &Value, words: &[String]) -> bool {
    let name = document
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    words.iter().all(|w| name.contains(w.as_str()))
}

fn window(documents: Vec<Value>, offset: u64, limit: u32) -> Vec<Value> {
    documents
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    async fn health(&self) -> Result<(), IndexError> {
        match &self.state.read().await.health_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn delete_index(&self, uid: &str) -> Result<TaskHandle, IndexError> {
        let mut state = self.state.write().await;
        let existed = state.collections.remove(uid).is_some();
        Ok(state.finish(|task| {
            if existed {
                TaskInfo::succeeded(task)
            } else {
                TaskInfo::failed(task, "index_not_found", &format!("Index `{}` not found.", uid))
            }
        }))
    }

    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskHandle, IndexError> {
        let mut state = self.state.write().await;
        if state.collections.contains_key(uid) {
            return Ok(state.finish(|task| {
                TaskInfo::failed(
                    task,
                    "index_already_exists",
                    &format!("Index `{}` already exists.", uid),
                )
            }));
        }
        state.collections.insert(
            uid.to_string(),
            MockCollection {
                primary_key: primary_key.to_string(),
                documents: Vec::new(),
            },
        );
        Ok(state.finish(TaskInfo::succeeded))
    }

    async fn add_documents(
        &self,
        uid: &str,
        primary_key: &str,
        documents: Vec<Value>,
    ) -> Result<TaskHandle, IndexError> {
        let mut state = self.state.write().await;
        if state.failing_inserts.contains(uid) {
            return Ok(state.finish(|task| {
                TaskInfo::failed(task, "internal", "simulated insert failure")
            }));
        }

        let collection = state
            .collections
            .entry(uid.to_string())
            .or_insert_with(|| MockCollection {
                primary_key: primary_key.to_string(),
                documents: Vec::new(),
            });
        let pk = collection.primary_key.clone();
        for document in documents {
            let key = document.get(&pk).cloned();
            let existing = collection
                .documents
                .iter()
                .position(|d| key.is_some() && d.get(&pk) == key.as_ref());
            match existing {
                Some(pos) => collection.documents[pos] = document,
                None => collection.documents.push(document),
            }
        }
        Ok(state.finish(TaskInfo::succeeded))
    }

    async fn wait_for_task(&self, task: TaskHandle) -> Result<TaskInfo, IndexError> {
        self.state
            .read()
            .await
            .tasks
            .get(&task.task_uid)
            .cloned()
            .ok_or_else(|| IndexError::Api {
                status: 404,
                message: format!("Task `{}` not found.", task.task_uid),
            })
    }

    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchPage, IndexError> {
        let mut state = self.state.write().await;
        state
            .searches
            .push((uid.to_string(), request.clone()));

        let words: Vec<String> = request
            .query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let matched: Vec<Value> = state
            .collection(uid)?
            .documents
            .iter()
            .filter(|d| matches(d, &words))
            .cloned()
            .collect();

        Ok(SearchPage {
            estimated_total_hits: Some(matched.len() as u64),
            hits: window(matched, request.offset, request.limit),
        })
    }

    async fn documents(
        &self,
        uid: &str,
        limit: u32,
        offset: u64,
    ) -> Result<DocumentsPage, IndexError> {
        let state = self.state.read().await;
        let collection = state.collection(uid)?;
        Ok(DocumentsPage {
            total: collection.documents.len() as u64,
            results: window(collection.documents.clone(), offset, limit),
        })
    }
}
