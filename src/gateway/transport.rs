use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_ACCEPT: &str = "Accept";
pub const MIME_JSON: &str = "application/json";

/// A fully resolved request, ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The token carried in the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header(HEADER_AUTHORIZATION)?.strip_prefix("Bearer ")
    }
}

/// Whatever came back, whatever the status.
#[derive(Debug, Clone)]
pub struct InboundResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Moves requests over the network. An `Err` means no HTTP response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: OutboundRequest) -> Result<InboundResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if accept_invalid_certs {
            // Self-signed deployments of the backend are common on library intranets.
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build().context("build http client")?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: OutboundRequest) -> Result<InboundResponse> {
        let mut builder = self
            .client
            .request(req.method, &req.url)
            .header(HEADER_ACCEPT, MIME_JSON);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (key, value) in req.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = req.body {
            builder = builder.json(&body);
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                bail!(
                    "request timed out after {}",
                    humantime::format_duration(self.timeout)
                )
            }
            Err(err) if err.is_connect() => {
                return Err(err).context("connect to server");
            }
            Err(err) => return Err(err).context("send request"),
        };

        let status = resp.status().as_u16();
        let body = match resp.bytes().await {
            Ok(body) => body.to_vec(),
            Err(err) if err.is_timeout() => {
                bail!(
                    "reading response timed out after {}",
                    humantime::format_duration(self.timeout)
                )
            }
            Err(err) => return Err(err).context("read response body"),
        };

        Ok(InboundResponse { status, body })
    }
}
