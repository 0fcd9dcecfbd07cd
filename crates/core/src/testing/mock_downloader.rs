//! Mock downloader for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::download::{DownloadError, DownloadStatus, Downloader, JobHandle};

pub const MOCK_DOWNLOAD_DIR: &str = "/mock/downloads";

/// A recorded `add_uri` call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDownload {
    pub gid: String,
    pub uri: String,
    pub out: String,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the Downloader trait.
///
/// Provides controllable behavior for testing:
/// - Track submitted URIs for assertions
/// - Control per-download progress
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let downloader = MockDownloader::new();
/// let handle = downloader.add_uri("http://...", "movies/Dune/Dune.mkv").await?;
///
/// downloader.set_progress(&handle.gid, 500, 1000).await;
/// let status = downloader.status(&handle.gid).await?;
/// assert_eq!(status.status, "active");
/// ```
#[derive(Debug, Default)]
pub struct MockDownloader {
    added: Arc<RwLock<Vec<RecordedDownload>>>,
    statuses: Arc<RwLock<HashMap<String, DownloadStatus>>>,
    next_error: Arc<RwLock<Option<DownloadError>>>,
    gid_counter: Arc<RwLock<u64>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded submissions.
    pub async fn added(&self) -> Vec<RecordedDownload> {
        self.added.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set progress for a download; it becomes `complete` once fully done.
    pub async fn set_progress(&self, gid: &str, completed: u64, total: u64) {
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(gid) {
            status.completed_length = completed;
            status.total_length = total;
            status.status = if total > 0 && completed >= total {
                "complete".to_string()
            } else {
                "active".to_string()
            };
        }
    }

    async fn take_error(&self) -> Option<DownloadError> {
        self.next_error.write().await.take()
    }

    async fn generate_gid(&self) -> String {
        let mut counter = self.gid_counter.write().await;
        *counter += 1;
        format!("{:016x}", *counter)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn add_uri(&self, uri: &str, out: &str) -> Result<JobHandle, DownloadError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let gid = self.generate_gid().await;
        self.added.write().await.push(RecordedDownload {
            gid: gid.clone(),
            uri: uri.to_string(),
            out: out.to_string(),
            timestamp: Utc::now(),
        });
        self.statuses.write().await.insert(
            gid.clone(),
            DownloadStatus {
                gid: gid.clone(),
                status: "waiting".to_string(),
                total_length: 0,
                completed_length: 0,
                download_speed: 0,
                dir: MOCK_DOWNLOAD_DIR.to_string(),
                error_message: None,
            },
        );

        Ok(JobHandle {
            gid,
            name: out.rsplit('/').next().unwrap_or(out).to_string(),
            dir: MOCK_DOWNLOAD_DIR.to_string(),
            out: out.to_string(),
        })
    }

    async fn status(&self, gid: &str) -> Result<DownloadStatus, DownloadError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.statuses
            .read()
            .await
            .get(gid)
            .cloned()
            .ok_or_else(|| DownloadError::UnknownGid(gid.to_string()))
    }
}
