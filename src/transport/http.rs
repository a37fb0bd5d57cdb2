use crate::api::VideoConfig;
use crate::error::{Result, ScopeError};
use crate::traits::{Transport, TransportResponse};
use crate::transport::resolve_api_key;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// [`Transport`] over `reqwest` with bearer authentication and JSON bodies.
///
/// Paths are joined onto `base_url`. Network failures and timeouts surface as
/// [`ScopeError::TransientTransport`]; status codes are returned as-is for
/// the caller to interpret.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ScopeError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from config, reading the API key from `config.api_key_env`.
    pub fn from_config(config: &VideoConfig) -> Result<Self> {
        config.validate()?;
        let api_key = resolve_api_key(&config.api_key_env)?;
        Self::new(
            config.base_url.clone(),
            api_key,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn decode(response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScopeError::TransientTransport(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(TransportResponse { status, body: None });
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(TransportResponse {
                status,
                body: Some(body),
            }),
            Err(e) if (200..300).contains(&status) => Err(ScopeError::Protocol(format!(
                "Response body is not JSON: {}",
                e
            ))),
            Err(_) => Ok(TransportResponse { status, body: None }),
        }
    }
}

fn send_error(e: reqwest::Error) -> ScopeError {
    if e.is_timeout() {
        ScopeError::TransientTransport(format!("Request timed out: {}", e))
    } else {
        ScopeError::TransientTransport(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        path: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse> {
        let mut request = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().await.map_err(send_error)?;
        Self::decode(response).await
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<TransportResponse> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await
            .map_err(send_error)?;
        Self::decode(response).await
    }
}
