//! HTTP GET-JSON seam and its reqwest implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{RemoteError, RemoteResult};

/// Public Argovis deployment.
pub const DEFAULT_BASE_URL: &str = "https://argovis.colorado.edu";

/// Configuration for the Argovis client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host, no trailing slash
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Issues a GET and hands back the status code with the parsed body.
///
/// An error page that is not JSON is returned as `Value::Null` so the caller
/// can still report the status.
#[async_trait]
pub trait JsonGetter: Send + Sync {
    async fn get_json(&self, url: &str) -> RemoteResult<(u16, Value)>;
}

#[async_trait]
impl<T: JsonGetter + ?Sized> JsonGetter for Arc<T> {
    async fn get_json(&self, url: &str) -> RemoteResult<(u16, Value)> {
        (**self).get_json(url).await
    }
}

/// [`JsonGetter`] backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestGetter {
    client: Client,
}

impl ReqwestGetter {
    pub fn new(config: &ClientConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonGetter for ReqwestGetter {
    #[instrument(skip(self))]
    async fn get_json(&self, url: &str) -> RemoteResult<(u16, Value)> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Received response");

        let value = parse_body(url, status, &body)?;
        Ok((status, value))
    }
}

/// Parse a response body.
///
/// Non-2xx bodies and empty bodies that fail to parse become `Value::Null`;
/// a malformed 2xx body is a [`RemoteError::Decode`].
pub fn parse_body(url: &str, status: u16, body: &str) -> RemoteResult<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) if status / 100 != 2 || body.trim().is_empty() => Ok(Value::Null),
        Err(e) => Err(RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Map a non-2xx status to [`RemoteError::UnexpectedStatus`].
pub fn check_status(url: &str, status: u16, body: Value) -> RemoteResult<Value> {
    if status / 100 == 2 {
        Ok(body)
    } else {
        Err(RemoteError::UnexpectedStatus {
            status,
            url: url.to_string(),
        })
    }
}
