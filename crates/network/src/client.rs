// crates/network/src/client.rs
//! HTTP client wrapper with retry

use crate::error::{NetworkError, NetworkResult};
use libris_config::ApiConfig;
use libris_resilience::{with_retry, RetryPolicy};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Retry policy for idempotent requests (writes are never retried)
    pub retry_policy: Option<RetryPolicy>,
}

impl ClientConfig {
    /// Builds a client configuration from the `[api]` config section
    pub fn from_api_config(api: &ApiConfig) -> Self {
        Self {
            timeout: Duration::from_secs(api.timeout_secs),
            user_agent: api.user_agent.clone(),
            max_redirects: 10,
            // The first attempt is not a retry
            retry_policy: Some(
                RetryPolicy::new(api.max_retries as usize + 1)
                    .with_initial_delay(Duration::from_millis(100)),
            ),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("Libris/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            retry_policy: Some(RetryPolicy::new(3).with_initial_delay(Duration::from_millis(100))),
        }
    }
}

/// JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET with query parameters and decodes the JSON body
    pub async fn get_json<T, Q>(&self, url: Url, query: &Q) -> NetworkResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        log::debug!("GET {}", url);
        let response = self
            .execute(true, || self.inner.get(url.clone()).query(query))
            .await?;
        decode(response).await
    }

    /// Sends a JSON body and decodes the JSON response
    pub async fn send_json<T, B>(&self, method: Method, url: Url, body: &B) -> NetworkResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        log::debug!("{} {}", method, url);
        let response = self
            .execute(false, || {
                self.inner.request(method.clone(), url.clone()).json(body)
            })
            .await?;
        decode(response).await
    }

    /// Performs a DELETE, ignoring any response body
    pub async fn delete(&self, url: Url) -> NetworkResult<()> {
        log::debug!("DELETE {}", url);
        self.execute(false, || self.inner.delete(url.clone()))
            .await?;
        Ok(())
    }

    /// Sends the request built by `build`, retrying idempotent requests
    async fn execute<F>(&self, idempotent: bool, build: F) -> NetworkResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let policy = match (&self.config.retry_policy, idempotent) {
            (Some(policy), true) => policy.clone(),
            _ => RetryPolicy::no_retry(),
        };

        let build = &build;
        with_retry(
            &policy,
            move || async move {
                let response = build().send().await?;
                check_status(response).await
            },
            NetworkError::is_retryable,
        )
        .await
    }
}

/// Turns a non-success status into an error carrying the response body
async fn check_status(response: Response) -> NetworkResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(NetworkError::Status {
        code: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> NetworkResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
