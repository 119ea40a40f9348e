use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, Url, header::HeaderMap};
use serde_json::Value;
use thiserror::Error;

/// A fully assembled outbound request: absolute URL (query and auth already
/// applied), validated headers and an optional JSON body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// URL without the query string, safe to log.
    #[must_use]
    pub fn log_target(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// One HTTP exchange plus the pause taken between attempts.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;

    async fn backoff(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// `reqwest`-backed transport. A new client is built for every attempt so no
/// connection outlives the request it was opened for.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

impl HttpTransport {
    #[must_use]
    pub fn user_agent() -> &'static str {
        concat!("smartlead-cli/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
