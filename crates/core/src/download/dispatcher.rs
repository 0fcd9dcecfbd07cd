use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::CatalogSource;
use crate::metrics;

use super::{DownloadError, DownloadJob, DownloadStatus, Downloader, JobHandle};

/// Turns download jobs into downloader submissions.
pub struct DownloadDispatcher {
    source: Arc<dyn CatalogSource>,
    downloader: Arc<dyn Downloader>,
}

impl DownloadDispatcher {
    pub fn new(source: Arc<dyn CatalogSource>, downloader: Arc<dyn Downloader>) -> Self {
        Self { source, downloader }
    }

    /// Validate and submit a single job.
    pub async fn submit(&self, job: &DownloadJob) -> Result<JobHandle, DownloadError> {
        let out = job.destination_path().inspect_err(record_failure)?;
        self.dispatch(job, &out).await
    }

    /// Validate every job, then submit them in order.
    ///
    /// One invalid job rejects the whole batch before anything is sent.
    /// A downloader failure stops the batch; earlier submissions stay queued.
    pub async fn submit_batch(&self, jobs: &[DownloadJob]) -> Result<Vec<JobHandle>, DownloadError> {
        let mut paths = Vec::with_capacity(jobs.len());
        for (idx, job) in jobs.iter().enumerate() {
            match job.destination_path() {
                Ok(out) => paths.push(out),
                Err(e) => {
                    warn!(job = idx, error = %e, "Rejecting download batch");
                    record_failure(&e);
                    return Err(match e {
                        DownloadError::Validation(msg) => {
                            DownloadError::Validation(format!("job {}: {}", idx, msg))
                        }
                        other => other,
                    });
                }
            }
        }

        let mut handles = Vec::with_capacity(jobs.len());
        for (job, out) in jobs.iter().zip(paths) {
            handles.push(self.dispatch(job, &out).await?);
        }
        Ok(handles)
    }

    /// Progress of a previously submitted download.
    pub async fn status(&self, gid: &str) -> Result<DownloadStatus, DownloadError> {
        self.downloader.status(gid).await
    }

    async fn dispatch(&self, job: &DownloadJob, out: &str) -> Result<JobHandle, DownloadError> {
        let uri = self
            .source
            .stream_uri(job.kind, job.stream_id, job.container_extension.trim());

        match self.downloader.add_uri(&uri, out).await {
            Ok(handle) => {
                metrics::DOWNLOADS_SUBMITTED
                    .with_label_values(&[job.kind.as_str()])
                    .inc();
                info!(
                    gid = %handle.gid,
                    kind = job.kind.as_str(),
                    stream_id = job.stream_id,
                    out,
                    "Download submitted"
                );
                Ok(handle)
            }
            Err(e) => {
                warn!(
                    kind = job.kind.as_str(),
                    stream_id = job.stream_id,
                    error = %e,
                    "Download submission failed"
                );
                record_failure(&e);
                Err(e)
            }
        }
    }
}

fn record_failure(e: &DownloadError) {
    metrics::DOWNLOAD_SUBMISSION_FAILURES
        .with_label_values(&[e.reason()])
        .inc();
}
