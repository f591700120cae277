use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;

/// Raw status and body of an HTTP exchange.
///
/// Non-success statuses are returned as replies, not errors; callers decide
/// which error variant a failed status maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network seam used by the resolver and executor
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body with extra headers and return the raw reply
    async fn post_json(&self, url: &str, headers: Vec<(String, String)>, body: Value) -> Result<HttpReply>;
}

/// `reqwest` backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, headers: Vec<(String, String)>, body: Value) -> Result<HttpReply> {
        debug!("POST {}", url);

        let mut request = self.client.post(url).json(&body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("POST {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpReply { status, body })
    }
}
