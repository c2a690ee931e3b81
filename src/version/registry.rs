//! Registry client issuing version and detail queries through the response cache

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::UpdaterConfig;
use crate::version::cache::{ResponseCache, fingerprint};
use crate::version::error::RegistryError;
use crate::version::store::KeyValueStore;
use crate::version::transport::Transport;
use crate::version::types::{RemoteDetailInfo, RemoteVersionInfo};

/// Client for the two registry endpoints (version info and detail info)
pub struct RegistryClient<S: KeyValueStore> {
    transport: Arc<dyn Transport>,
    cache: ResponseCache<S>,
    package_endpoint: String,
    detail_endpoint: String,
    ttl: Duration,
}

impl<S: KeyValueStore> RegistryClient<S> {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: ResponseCache<S>,
        package_endpoint: &str,
        detail_endpoint: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            package_endpoint: package_endpoint.trim_end_matches('/').to_string(),
            detail_endpoint: detail_endpoint.trim_end_matches('/').to_string(),
            ttl,
        }
    }

    /// Build a client from the registry and cache sections of the configuration
    pub fn from_config(transport: Arc<dyn Transport>, store: Arc<S>, config: &UpdaterConfig) -> Self {
        Self::new(
            transport,
            ResponseCache::new(store),
            &config.registry.package_endpoint,
            &config.registry.detail_endpoint,
            config.cache.ttl(),
        )
    }

    /// URL answering version queries for a package
    pub fn version_url(&self, package_id: &str) -> String {
        format!("{}/{}", self.package_endpoint, package_id)
    }

    /// URL answering detail queries for a package
    pub fn detail_url(&self, package_id: &str) -> String {
        format!("{}/{}", self.detail_endpoint, package_id)
    }

    /// Fetch the latest version information for a package
    #[tracing::instrument(skip(self))]
    pub async fn fetch_version_info(
        &self,
        package_id: &str,
    ) -> Result<RemoteVersionInfo, RegistryError> {
        self.fetch_cached(&self.version_url(package_id)).await
    }

    /// Fetch the "view details" information for a package
    #[tracing::instrument(skip(self))]
    pub async fn fetch_detail_info(
        &self,
        package_id: &str,
    ) -> Result<RemoteDetailInfo, RegistryError> {
        self.fetch_cached(&self.detail_url(package_id)).await
    }

    /// POST `url` through the cache and decode the body.
    ///
    /// A fresh body is decoded before it is cached so that a response
    /// violating the contract is never stored; only cache hits are decoded
    /// afterwards.
    async fn fetch_cached<T: DeserializeOwned>(&self, url: &str) -> Result<T, RegistryError> {
        let transport = &self.transport;
        let mut fetched = None;
        let slot = &mut fetched;

        let body = self
            .cache
            .get_or_fetch(&fingerprint("POST", url), self.ttl, move || async move {
                let body = transport.post(url).await?;
                *slot = Some(decode::<T>(&body, url)?);
                Ok(body)
            })
            .await?;

        match fetched {
            Some(value) => Ok(value),
            None => decode(&body, url),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], url: &str) -> Result<T, RegistryError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Failed to decode registry response from {}: {}", url, e);
        if e.is_data() {
            RegistryError::MalformedResponse(e.to_string())
        } else {
            RegistryError::InvalidBody(e.to_string())
        }
    })
}
