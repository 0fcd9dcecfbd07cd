use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub xtream: XtreamConfig,
    #[serde(default)]
    pub search_index: SearchIndexConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration (favorites storage)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("lionz.db")
}

/// Xtream Codes catalog source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct XtreamConfig {
    /// Provider host including scheme (e.g., "http://xtream-codes.com")
    pub host: String,
    #[serde(default = "default_xtream_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl XtreamConfig {
    /// Base URL used for API calls and stream URIs: `{host}:{port}`.
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}

fn default_xtream_port() -> u16 {
    8080
}

/// Meilisearch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchIndexConfig {
    #[serde(default = "default_search_index_url")]
    pub url: String,
    /// Master/API key. Empty means no Authorization header is sent.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Delay between task status polls
    #[serde(default = "default_task_poll_interval_ms")]
    pub task_poll_interval_ms: u64,
    /// Upper bound on waiting for a single task
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u32,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            url: default_search_index_url(),
            api_key: String::new(),
            timeout_secs: default_timeout(),
            task_poll_interval_ms: default_task_poll_interval_ms(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

fn default_search_index_url() -> String {
    "http://localhost:7700".to_string()
}

fn default_task_poll_interval_ms() -> u64 {
    250
}

fn default_task_timeout_secs() -> u32 {
    600
}

/// aria2 JSON-RPC configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloaderConfig {
    #[serde(default = "default_downloader_host")]
    pub host: String,
    #[serde(default = "default_downloader_port")]
    pub port: u16,
    /// RPC secret, sent as `token:<secret>`. Empty disables the token.
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl DownloaderConfig {
    /// JSON-RPC endpoint: `{host}:{port}/jsonrpc`.
    pub fn rpc_endpoint(&self) -> String {
        format!("{}:{}/jsonrpc", self.host.trim_end_matches('/'), self.port)
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            host: default_downloader_host(),
            port: default_downloader_port(),
            secret: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_downloader_host() -> String {
    "http://localhost".to_string()
}

fn default_downloader_port() -> u16 {
    6800
}

/// Catalog sync behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Run the series and VOD streams concurrently
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Trigger one sync in the background after startup
    #[serde(default)]
    pub on_startup: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            on_startup: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub xtream: SanitizedXtreamConfig,
    pub search_index: SanitizedSearchIndexConfig,
    pub downloader: SanitizedDownloaderConfig,
    pub sync: SyncConfig,
}

/// Sanitized Xtream config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedXtreamConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized Meilisearch config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchIndexConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized aria2 config (secret hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDownloaderConfig {
    pub endpoint: String,
    pub secret_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            xtream: SanitizedXtreamConfig {
                host: config.xtream.host.clone(),
                port: config.xtream.port,
                username: config.xtream.username.clone(),
                password_configured: !config.xtream.password.is_empty(),
                timeout_secs: config.xtream.timeout_secs,
            },
            search_index: SanitizedSearchIndexConfig {
                url: config.search_index.url.clone(),
                api_key_configured: !config.search_index.api_key.is_empty(),
                timeout_secs: config.search_index.timeout_secs,
            },
            downloader: SanitizedDownloaderConfig {
                endpoint: config.downloader.rpc_endpoint(),
                secret_configured: !config.downloader.secret.is_empty(),
                timeout_secs: config.downloader.timeout_secs,
            },
            sync: config.sync.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[xtream]
host = "http://provider.example"
username = "user"
password = "pass"
"#;

    #[test]
    fn test_deserialize_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "lionz.db");
        assert_eq!(config.xtream.port, 8080);
        assert_eq!(config.xtream.timeout_secs, 30);
        assert_eq!(config.search_index.url, "http://localhost:7700");
        assert_eq!(config.search_index.task_poll_interval_ms, 250);
        assert_eq!(config.downloader.port, 6800);
        assert!(config.sync.parallel);
        assert!(!config.sync.on_startup);
    }

    #[test]
    fn test_deserialize_missing_xtream_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_xtream_base_url() {
        let toml = r#"
[xtream]
host = "http://provider.example/"
port = 25461
username = "user"
password = "pass"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.xtream.base_url(), "http://provider.example:25461");
    }

    #[test]
    fn test_downloader_rpc_endpoint() {
        let config = DownloaderConfig {
            host: "http://umbrel".to_string(),
            port: 6800,
            secret: "umbrel".to_string(),
            timeout_secs: 30,
        };
        assert_eq!(config.rpc_endpoint(), "http://umbrel:6800/jsonrpc");
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let toml = r#"
[xtream]
host = "http://provider.example"
username = "user"
password = "secret-pass"

[search_index]
api_key = "master-key"

[downloader]
secret = "rpc-secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert!(sanitized.xtream.password_configured);
        assert!(sanitized.search_index.api_key_configured);
        assert!(sanitized.downloader.secret_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-pass"));
        assert!(!json.contains("master-key"));
        assert!(!json.contains("rpc-secret"));
    }
}
