//! Xtream Codes player API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::XtreamConfig;
use crate::metrics;

use super::{CatalogError, CatalogSource, MediaKind, SeriesInfo, SeriesListing, VodInfo, VodStream};

/// Actions accepted by `player_api.php`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XtreamAction {
    GetSeries,
    GetVodStreams,
    GetSeriesInfo,
    GetVodInfo,
}

impl XtreamAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            XtreamAction::GetSeries => "get_series",
            XtreamAction::GetVodStreams => "get_vod_streams",
            XtreamAction::GetSeriesInfo => "get_series_info",
            XtreamAction::GetVodInfo => "get_vod_info",
        }
    }
}

/// Xtream Codes client.
///
/// Every request carries the account credentials as query parameters, so
/// request URLs are stripped from errors before they are surfaced.
pub struct XtreamClient {
    client: Client,
    config: XtreamConfig,
    base_url: String,
}

impl XtreamClient {
    /// Create a client without contacting the provider.
    pub fn new(config: XtreamConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CatalogError::Connection(e.without_url().to_string()))?;
        let base_url = config.base_url();

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Create a client and verify the credentials.
    pub async fn connect(config: XtreamConfig) -> Result<Self, CatalogError> {
        let client = Self::new(config)?;
        client.authenticate().await?;
        Ok(client)
    }

    /// Call the API without an action.
    ///
    /// Any non-error HTTP response counts as an established session unless the
    /// provider explicitly reports `user_info.auth = 0`.
    pub async fn authenticate(&self) -> Result<(), CatalogError> {
        let value = self
            .request(None, &[])
            .await
            .map_err(|e| CatalogError::Authentication(e.to_string()))?;

        let denied = value
            .get("user_info")
            .and_then(|u| u.get("auth"))
            .map(|auth| auth.as_i64() == Some(0) || auth.as_str() == Some("0"))
            .unwrap_or(false);
        if denied {
            return Err(CatalogError::Authentication(
                "Provider rejected the credentials".to_string(),
            ));
        }

        info!(
            "Authenticated with Xtream provider at {} as {}",
            self.base_url, self.config.username
        );
        Ok(())
    }

    fn api_url(&self) -> String {
        format!("{}/player_api.php", self.base_url)
    }

    /// Issue a `player_api.php` call and return the raw JSON body.
    async fn request(
        &self,
        action: Option<XtreamAction>,
        extra: &[(&str, String)],
    ) -> Result<Value, CatalogError> {
        let action_name = action.map(|a| a.as_str()).unwrap_or("authenticate");
        let result = self.send(action_name, action, extra).await;
        if result.is_err() {
            metrics::REMOTE_FETCH_FAILURES
                .with_label_values(&[action_name])
                .inc();
        }
        result
    }

    async fn send(
        &self,
        action_name: &str,
        action: Option<XtreamAction>,
        extra: &[(&str, String)],
    ) -> Result<Value, CatalogError> {
        debug!("Xtream request: action={} params={:?}", action_name, extra);

        let mut request = self.client.get(self.api_url()).query(&[
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ]);
        if let Some(action) = action {
            request = request.query(&[("action", action.as_str())]);
        }
        if !extra.is_empty() {
            request = request.query(extra);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Xtream {} returned HTTP {}", action_name, status);
            return Err(CatalogError::Http {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response.json().await.map_err(|e| CatalogError::Parse {
            action: action_name.to_string(),
            message: e.without_url().to_string(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> CatalogError {
    let e = e.without_url();
    if e.is_timeout() {
        CatalogError::Timeout
    } else if e.is_connect() {
        CatalogError::Connection(e.to_string())
    } else {
        CatalogError::Connection(format!("Request failed: {}", e))
    }
}

fn parse<T: DeserializeOwned>(action: XtreamAction, value: Value) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|e| CatalogError::Parse {
        action: action.as_str().to_string(),
        message: e.to_string(),
    })
}

/// Listings occasionally come back as `null` or `{}` for empty catalogs.
fn parse_listing<T: DeserializeOwned>(
    action: XtreamAction,
    value: Value,
) -> Result<Vec<T>, CatalogError> {
    match value {
        Value::Array(_) => parse(action, value),
        Value::Null => Ok(Vec::new()),
        Value::Object(ref map) if map.is_empty() => Ok(Vec::new()),
        other => Err(CatalogError::Parse {
            action: action.as_str().to_string(),
            message: format!("expected an array, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_empty_block(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Unknown ids come back as `[]`, `null` or an object with an empty `info`.
fn parse_series_info(series_id: u64, value: Value) -> Result<SeriesInfo, CatalogError> {
    if !value.is_object() || is_empty_block(value.get("info")) {
        return Err(CatalogError::NotFound(format!("Series {}", series_id)));
    }
    parse(XtreamAction::GetSeriesInfo, value)
}

fn parse_vod_info(vod_id: u64, value: Value) -> Result<VodInfo, CatalogError> {
    if !value.is_object() || !value.get("movie_data").map(Value::is_object).unwrap_or(false) {
        return Err(CatalogError::NotFound(format!("VOD {}", vod_id)));
    }
    parse(XtreamAction::GetVodInfo, value)
}

#[async_trait]
impl CatalogSource for XtreamClient {
    fn name(&self) -> &str {
        "xtream"
    }

    async fn series(&self) -> Result<Vec<SeriesListing>, CatalogError> {
        let value = self.request(Some(XtreamAction::GetSeries), &[]).await?;
        parse_listing(XtreamAction::GetSeries, value)
    }

    async fn vod_streams(&self) -> Result<Vec<VodStream>, CatalogError> {
        let value = self.request(Some(XtreamAction::GetVodStreams), &[]).await?;
        parse_listing(XtreamAction::GetVodStreams, value)
    }

    async fn series_info(&self, series_id: u64) -> Result<SeriesInfo, CatalogError> {
        let value = self
            .request(
                Some(XtreamAction::GetSeriesInfo),
                &[("series_id", series_id.to_string())],
            )
            .await?;
        parse_series_info(series_id, value)
    }

    async fn vod_info(&self, vod_id: u64) -> Result<VodInfo, CatalogError> {
        let value = self
            .request(
                Some(XtreamAction::GetVodInfo),
                &[("vod_id", vod_id.to_string())],
            )
            .await?;
        parse_vod_info(vod_id, value)
    }

    fn stream_uri(&self, kind: MediaKind, id: u64, container_extension: &str) -> String {
        build_stream_uri(
            &self.base_url,
            &self.config.username,
            &self.config.password,
            kind,
            id,
            container_extension,
        )
    }
}

/// `{base}/{movie|series}/{username}/{password}/{id}.{ext}`
pub fn build_stream_uri(
    base_url: &str,
    username: &str,
    password: &str,
    kind: MediaKind,
    id: u64,
    container_extension: &str,
) -> String {
    format!(
        "{}/{}/{}/{}/{}.{}",
        base_url,
        kind.stream_path(),
        username,
        password,
        id,
        container_extension
    )
}
