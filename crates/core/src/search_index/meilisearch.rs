//! Meilisearch REST client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::SearchIndexConfig;

use super::{
    DocumentsPage, IndexError, SearchIndex, SearchPage, SearchRequest, TaskHandle, TaskInfo,
};

/// Meilisearch client.
pub struct MeilisearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    task_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

impl MeilisearchClient {
    /// Create a new Meilisearch client.
    pub fn new(config: &SearchIndexConfig) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_millis(config.task_poll_interval_ms),
            task_timeout: Duration::from_secs(config.task_timeout_secs as u64),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn index_path(uid: &str) -> String {
        format!("/indexes/{}", urlencoding::encode(uid))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_key)
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IndexError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) if !err.code.is_empty() => format!("{} ({})", err.message, err.code),
            Ok(err) if !err.message.is_empty() => err.message,
            _ => body.chars().take(200).collect(),
        };
        Err(IndexError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, IndexError> {
        let response = self.send(request).await?;
        let status = response.status().as_u16();
        response.json().await.map_err(|e| IndexError::Api {
            status,
            message: format!("Invalid response body: {}", e),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> IndexError {
    if e.is_timeout() {
        IndexError::Timeout
    } else {
        IndexError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl SearchIndex for MeilisearchClient {
    async fn health(&self) -> Result<(), IndexError> {
        let body: Value = self
            .json(self.client.get(self.url("/health")))
            .await
            .map_err(|e| match e {
                IndexError::Api { status, message } => {
                    IndexError::Unavailable(format!("HTTP {}: {}", status, message))
                }
                other => other,
            })?;

        match body.get("status").and_then(Value::as_str) {
            Some("available") => Ok(()),
            other => Err(IndexError::Unavailable(format!(
                "unexpected health status: {:?}",
                other
            ))),
        }
    }

    async fn delete_index(&self, uid: &str) -> Result<TaskHandle, IndexError> {
        debug!(index = uid, "Deleting index");
        self.json(self.client.delete(self.url(&Self::index_path(uid))))
            .await
    }

    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskHandle, IndexError> {
        debug!(index = uid, primary_key, "Creating index");
        self.json(
            self.client
                .post(self.url("/indexes"))
                .json(&json!({ "uid": uid, "primaryKey": primary_key })),
        )
        .await
    }

    async fn add_documents(
        &self,
        uid: &str,
        primary_key: &str,
        documents: Vec<Value>,
    ) -> Result<TaskHandle, IndexError> {
        debug!(index = uid, count = documents.len(), "Adding documents");
        let path = format!("{}/documents", Self::index_path(uid));
        self.json(
            self.client
                .post(self.url(&path))
                .query(&[("primaryKey", primary_key)])
                .json(&documents),
        )
        .await
    }

    async fn wait_for_task(&self, task: TaskHandle) -> Result<TaskInfo, IndexError> {
        let started = Instant::now();
        let path = format!("/tasks/{}", task.task_uid);

        loop {
            let info: TaskInfo = self.json(self.client.get(self.url(&path))).await?;
            if info.status.is_terminal() {
                debug!(task = task.task_uid, status = ?info.status, "Task finished");
                return Ok(info);
            }

            if started.elapsed() >= self.task_timeout {
                warn!(
                    task = task.task_uid,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Gave up waiting for task"
                );
                return Err(IndexError::TaskTimeout(task.task_uid));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchPage, IndexError> {
        debug!(
            index = uid,
            query = %request.query,
            limit = request.limit,
            offset = request.offset,
            "Searching index"
        );
        let path = format!("{}/search", Self::index_path(uid));
        self.json(self.client.post(self.url(&path)).json(request))
            .await
    }

    async fn documents(
        &self,
        uid: &str,
        limit: u32,
        offset: u64,
    ) -> Result<DocumentsPage, IndexError> {
        debug!(index = uid, limit, offset, "Listing documents");
        let path = format!("{}/documents", Self::index_path(uid));
        self.json(
            self.client
                .get(self.url(&path))
                .query(&[("limit", limit as u64), ("offset", offset)]),
        )
        .await
    }
}
