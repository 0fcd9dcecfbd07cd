use serde::{Deserialize, Serialize};

use crate::catalog::MediaKind;

use super::DownloadError;

/// A download request for one VOD or one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadJob {
    pub kind: MediaKind,
    /// VOD `stream_id`, or the episode id for series jobs.
    pub stream_id: u64,
    /// Movie name, or series name for episodes.
    pub name: String,
    pub container_extension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
}

impl DownloadJob {
    pub fn vod(stream_id: u64, name: &str, container_extension: &str) -> Self {
        Self {
            kind: MediaKind::Vod,
            stream_id,
            name: name.to_string(),
            container_extension: container_extension.to_string(),
            season: None,
            episode_title: None,
        }
    }

    pub fn episode(
        episode_id: u64,
        series_name: &str,
        season: u32,
        episode_title: &str,
        container_extension: &str,
    ) -> Self {
        Self {
            kind: MediaKind::Series,
            stream_id: episode_id,
            name: series_name.to_string(),
            container_extension: container_extension.to_string(),
            season: Some(season),
            episode_title: Some(episode_title.to_string()),
        }
    }

    /// Check the job before anything is dispatched.
    pub fn validate(&self) -> Result<(), DownloadError> {
        if self.name.trim().is_empty() {
            return Err(DownloadError::Validation("name is required".to_string()));
        }
        let ext = self.container_extension.trim();
        if ext.is_empty() {
            return Err(DownloadError::Validation(
                "container_extension is required".to_string(),
            ));
        }
        if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DownloadError::Validation(format!(
                "container_extension must be alphanumeric, got {:?}",
                ext
            )));
        }
        if self.kind == MediaKind::Series {
            if self.season.is_none() {
                return Err(DownloadError::Validation(
                    "season is required for series downloads".to_string(),
                ));
            }
            match &self.episode_title {
                Some(title) if !title.trim().is_empty() => {}
                _ => {
                    return Err(DownloadError::Validation(
                        "episode_title is required for series downloads".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Relative output path handed to the downloader.
    ///
    /// - VOD: `movies/{name}/{name}.{ext}`
    /// - Episode: `shows/{name}/Season {NN}/{episode_title}.{ext}`
    pub fn destination_path(&self) -> Result<String, DownloadError> {
        self.validate()?;
        let name = path_segment(&self.name);
        let ext = self.container_extension.trim();

        Ok(match (self.kind, self.season, &self.episode_title) {
            (MediaKind::Series, Some(season), Some(title)) => format!(
                "shows/{}/Season {:02}/{}.{}",
                name,
                season,
                path_segment(title),
                ext
            ),
            _ => format!("movies/{}/{}.{}", name, name, ext),
        })
    }
}

/// One path component: separators become `-`, and `.`/`..` become `-`.
fn path_segment(value: &str) -> String {
    match value.trim() {
        "." | ".." => "-".to_string(),
        other => other.replace(['/', '\\'], "-"),
    }
}

/// Handle for a dispatched download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub gid: String,
    /// File name of the output.
    pub name: String,
    /// Downloader's base download directory.
    pub dir: String,
    /// Output path relative to `dir`.
    pub out: String,
}

/// Progress of a download as reported by the downloader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadStatus {
    pub gid: String,
    /// `active`, `waiting`, `paused`, `error`, `complete` or `removed`.
    pub status: String,
    pub total_length: u64,
    pub completed_length: u64,
    /// Bytes per second.
    pub download_speed: u64,
    pub dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DownloadStatus {
    /// Completion ratio in `0.0..=1.0`; zero while the size is unknown.
    pub fn progress(&self) -> f64 {
        if self.total_length == 0 {
            0.0
        } else {
            self.completed_length as f64 / self.total_length as f64
        }
    }
}
