//! Download dispatch to an external download manager.
//!
//! Jobs are validated and turned into a stream URI plus a relative output
//! path, then handed to a [`Downloader`]. Progress and completion live
//! entirely in the downloader.

mod aria2;
mod dispatcher;
mod types;

pub use aria2::Aria2Client;
pub use dispatcher::DownloadDispatcher;
pub use types::{DownloadJob, DownloadStatus, JobHandle};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from download dispatch.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// The job is malformed; nothing was submitted.
    #[error("Invalid download job: {0}")]
    Validation(String),

    /// The downloader does not know this GID.
    #[error("Unknown download: {0}")]
    UnknownGid(String),

    /// The downloader answered with a JSON-RPC error.
    #[error("Downloader RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Downloader connection failed: {0}")]
    Connection(String),

    #[error("Downloader request timeout")]
    Timeout,

    #[error("Invalid downloader response: {0}")]
    InvalidResponse(String),
}

impl DownloadError {
    /// Label used for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            DownloadError::Validation(_) => "validation",
            DownloadError::UnknownGid(_) => "unknown_gid",
            DownloadError::Rpc { .. } => "rpc",
            DownloadError::Connection(_) => "connection",
            DownloadError::Timeout => "timeout",
            DownloadError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Trait for download manager backends.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Enqueue `uri`, saving it to `out` relative to the download directory.
    ///
    /// `uri` embeds catalog credentials and must not be logged.
    async fn add_uri(&self, uri: &str, out: &str) -> Result<JobHandle, DownloadError>;

    /// Current progress of a download.
    async fn status(&self, gid: &str) -> Result<DownloadStatus, DownloadError>;
}
