use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::NetworkError;

/// Raw response body plus the URL it was finally served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHtml {
    pub body: String,
    pub final_url: String,
}

/// One HTTP GET, no retries. Retrying is left to [`crate::retry::RetryPolicy`].
pub trait Transport {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawHtml, NetworkError>> + Send;
}

pub fn round_url(base_url: &str, round: u32) -> String {
    format!("{}?method=byWin&drwNo={}", base_url, round)
}

/// Without `method` the endpoint answers 400, so the latest-round page still
/// carries `method=byWin`.
pub fn latest_round_url(base_url: &str) -> String {
    format!("{}?method=byWin", base_url)
}

/// `reqwest` backed transport. The inner client keeps one connection pool for
/// the whole run.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(config.timeout(), &config.user_agent)
    }

    fn classify(url: &str, e: reqwest::Error) -> NetworkError {
        let url = url.to_string();
        if e.is_timeout() {
            NetworkError::Timeout { url }
        } else if e.is_connect() {
            NetworkError::Connect { url, source: e }
        } else if let Some(status) = e.status() {
            NetworkError::Status { url, status }
        } else {
            NetworkError::Request { url, source: e }
        }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<RawHtml, NetworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status,
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| Self::classify(url, e))?;
        debug!("fetched {} ({} bytes) from {}", url, body.len(), final_url);

        Ok(RawHtml { body, final_url })
    }
}
