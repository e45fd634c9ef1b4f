//! Client for the deploy endpoint.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use url::Url;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Request timeout: {0}")]
    RequestTimeout(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Body of a deploy notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPayload {
    pub access_token: String,
    pub environment: String,
    pub revision: String,
    pub comment: String,
    pub rollbar_username: String,
    pub local_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResponse {
    pub status: u16,
    pub body: String,
}

impl BuildResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait BuildApi: Send + Sync {
    async fn track_build(&self, payload: &BuildPayload) -> Result<BuildResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    deploy_url: Url,
    timeout: Duration,
}

impl HttpApiClient {
    /// `endpoint` is the API base, e.g. `https://api.rollbar.com/api/1/`.
    pub fn new(endpoint: &str, request_timeout: Duration, proxy: Option<&str>) -> Result<Self, ApiError> {
        let base = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{endpoint}/")
        };
        let deploy_url = Url::parse(&base)
            .and_then(|url| url.join("deploy/"))
            .map_err(|e| ApiError::InvalidConfiguration(format!("Invalid endpoint URL: {e}")))?;

        let mut builder = ClientBuilder::new()
            .timeout(request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ApiError::InvalidConfiguration(format!("Invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            ApiError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            deploy_url,
            timeout: request_timeout,
        })
    }

    pub fn deploy_url(&self) -> &Url {
        &self.deploy_url
    }
}

#[async_trait]
impl BuildApi for HttpApiClient {
    async fn track_build(&self, payload: &BuildPayload) -> Result<BuildResponse, ApiError> {
        let response = timeout(
            self.timeout,
            self.client.post(self.deploy_url.clone()).json(payload).send(),
        )
        .await
        .map_err(|_| ApiError::RequestTimeout("Deploy request timeout".to_string()))??;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(BuildResponse { status, body })
    }
}
