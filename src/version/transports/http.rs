//! reqwest-based registry transport

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::warn;

use crate::version::error::RegistryError;
use crate::version::transport::Transport;

/// Build the User-Agent sent with every registry request
///
/// The crate name and version, followed by the site address when one is known
/// (e.g. "update-checker/0.1.0; https://blog.example.com/").
pub fn user_agent(site_url: Option<&str>) -> String {
    let base = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
    match site_url {
        Some(site) => format!("{}; {}", base, site),
        None => base.to_string(),
    }
}

/// Transport issuing real HTTP requests
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the given User-Agent and request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            warn!("Registry returned status {}: {}", status, url);
            return Err(RegistryError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
