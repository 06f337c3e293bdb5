use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Uniform result of a single HTTP request.
///
/// Non-2xx statuses are carried here with `success == false`; only
/// connection-level failures become errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub success: bool,
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    /// Build a response, deriving `success` from the status
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RestResponse {
            success: (200..300).contains(&status),
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    pub fn json<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Executes one request and reports the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, url: &str, method: Method, body: Option<&Value>)
        -> Result<RestResponse>;
}

/// Transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        url: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<RestResponse> {
        let parsed = Url::parse(url)?;
        // the query holds key and token, keep it out of the logs
        let path = parsed.path().to_string();

        let mut request = self.client.request(method.clone(), parsed);
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = std::time::Instant::now();
        let http_response = request.send().await?;
        let status = http_response.status().as_u16();
        let body = http_response.text().await?;

        debug!(
            method = %method,
            path = %path,
            status,
            elapsed = ?start.elapsed(),
            "request complete"
        );

        Ok(RestResponse::new(status, body))
    }
}
