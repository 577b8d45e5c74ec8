//! Request/response transport to the node.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::RpcConfig;
use crate::error::RpcError;

/// Sends one request and returns the parsed JSON reply.
///
/// Paths are relative to the node root (`chains/main/blocks/head`). A
/// non-2xx reply must surface as [`RpcError::Node`] carrying the body, or
/// [`RpcError::Status`] when the body is empty. Implementations are shared
/// across concurrent submissions and must be `Send + Sync`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, RpcError>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value, RpcError>;
}

/// HTTP/1.1 JSON transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    config: RpcConfig,
}

impl HttpTransport {
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        config.validate()?;

        // The node rejects HTTP/2 upgrades.
        let http = Client::builder()
            .http1_only()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    async fn read(response: reqwest::Response) -> Result<Value, RpcError> {
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), len = body.len(), "node replied");

        if !status.is_success() {
            return Err(RpcError::from_status(status.as_u16(), body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, RpcError> {
        debug!(method = "GET", path, "node request");
        let response = self.http.get(self.config.endpoint(path)).send().await?;
        Self::read(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, RpcError> {
        debug!(method = "POST", path, "node request");
        let response = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }
}
