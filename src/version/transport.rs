//! Transport trait for issuing registry requests

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for sending requests to the remote registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POSTs to `url` and returns the body of a successful response
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Raw body of a 2xx response
    /// * `Err(RegistryError)` - Network failure or non-2xx status
    async fn post(&self, url: &str) -> Result<Vec<u8>, RegistryError>;
}
