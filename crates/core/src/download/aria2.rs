//! aria2 JSON-RPC client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::DownloaderConfig;

use super::{DownloadError, DownloadStatus, Downloader, JobHandle};

/// Options attached to every `aria2.addUri` call, besides `out`.
const DEFAULT_OPTIONS: &[(&str, &str)] = &[
    ("continue", "true"),
    ("allow-overwrite", "true"),
    ("auto-file-renaming", "false"),
    ("retry-wait", "5"),
    ("max-tries", "10"),
];

/// aria2 client.
pub struct Aria2Client {
    client: Client,
    endpoint: String,
    secret: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TellStatus {
    gid: String,
    status: String,
    #[serde(default)]
    total_length: String,
    #[serde(default)]
    completed_length: String,
    #[serde(default)]
    download_speed: String,
    #[serde(default)]
    dir: String,
    #[serde(default)]
    error_message: Option<String>,
}

impl From<TellStatus> for DownloadStatus {
    fn from(s: TellStatus) -> Self {
        Self {
            gid: s.gid,
            status: s.status,
            total_length: s.total_length.parse().unwrap_or(0),
            completed_length: s.completed_length.parse().unwrap_or(0),
            download_speed: s.download_speed.parse().unwrap_or(0),
            dir: s.dir,
            error_message: s.error_message.filter(|m| !m.is_empty()),
        }
    }
}

impl Aria2Client {
    pub fn new(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DownloadError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.rpc_endpoint(),
            secret: config.secret.clone(),
        })
    }

    /// Build the JSON-RPC envelope; the secret goes first as `token:<secret>`.
    fn envelope(&self, method: &str, params: Vec<Value>) -> Value {
        let mut all = Vec::with_capacity(params.len() + 1);
        if !self.secret.is_empty() {
            all.push(Value::String(format!("token:{}", self.secret)));
        }
        all.extend(params);

        json!({
            "jsonrpc": "2.0",
            "id": uuid::Uuid::new_v4().to_string(),
            "method": method,
            "params": all,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, DownloadError> {
        debug!(method, "aria2 RPC call");
        let body = self.envelope(method, params);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    DownloadError::Timeout
                } else {
                    DownloadError::Connection(e.to_string())
                }
            })?;

        // aria2 reports RPC errors with a 4xx status and a JSON-RPC body.
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DownloadError::Connection(e.without_url().to_string()))?;

        let parsed: RpcResponse = serde_json::from_str(&text).map_err(|_| {
            DownloadError::InvalidResponse(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.chars().take(200).collect::<String>()
            ))
        })?;

        if let Some(err) = parsed.error {
            return Err(DownloadError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| DownloadError::InvalidResponse("missing result".to_string()))?;
        serde_json::from_value(result).map_err(|e| DownloadError::InvalidResponse(e.to_string()))
    }

    /// The downloader's global download directory.
    pub async fn download_dir(&self) -> Result<String, DownloadError> {
        let options: Map<String, Value> = self.call("aria2.getGlobalOption", vec![]).await?;
        Ok(options
            .get("dir")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

fn add_uri_options(out: &str) -> Value {
    let mut options: Map<String, Value> = DEFAULT_OPTIONS
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    options.insert("out".to_string(), Value::String(out.to_string()));
    Value::Object(options)
}

/// aria2 reports a missing download as `GID <gid> is not found`.
fn is_unknown_gid(message: &str) -> bool {
    message.starts_with("GID ") && message.ends_with("is not found")
}

fn file_name(out: &str) -> String {
    out.rsplit('/').next().unwrap_or(out).to_string()
}

#[async_trait]
impl Downloader for Aria2Client {
    async fn add_uri(&self, uri: &str, out: &str) -> Result<JobHandle, DownloadError> {
        // Looked up before enqueueing: a failed lookup must leave nothing queued.
        let dir = self.download_dir().await?;
        let gid: String = self
            .call("aria2.addUri", vec![json!([uri]), add_uri_options(out)])
            .await?;

        debug!(gid = %gid, out, "Download enqueued");
        Ok(JobHandle {
            gid,
            name: file_name(out),
            dir,
            out: out.to_string(),
        })
    }

    async fn status(&self, gid: &str) -> Result<DownloadStatus, DownloadError> {
        let status: TellStatus = self
            .call("aria2.tellStatus", vec![json!(gid)])
            .await
            .map_err(|e| match e {
                DownloadError::Rpc { ref message, .. } if is_unknown_gid(message) => {
                    DownloadError::UnknownGid(gid.to_string())
                }
                other => other,
            })?;
        Ok(status.into())
    }
}
