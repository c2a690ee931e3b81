//! Registry test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use update_checker::package::identifier::PackageIdentifier;
use update_checker::package::types::Package;
use update_checker::version::cache::ResponseCache;
use update_checker::version::checker::UpdateChecker;
use update_checker::version::error::RegistryError;
use update_checker::version::registry::RegistryClient;
use update_checker::version::store::KeyValueStore;
use update_checker::version::stores::SqliteStore;
use update_checker::version::transport::Transport;

pub const PACKAGE_ENDPOINT: &str = "http://registry.test/api/package";
pub const DETAIL_ENDPOINT: &str = "http://registry.test/api/detail";

/// Scripted transport that records every request it receives
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Vec<Result<String, u16>>>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful body for `url`; the last queued answer repeats
    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.to_string()));
        self
    }

    /// Queue a failing status for `url`
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.push(url, Err(status));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, url: &str, response: Result<String, u16>) {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(response);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| RegistryError::UnexpectedStatus {
                status: 404,
                url: url.to_string(),
            })?;

        let response = if queue.len() > 1 {
            queue.remove(0)
        } else {
            queue[0].clone()
        };

        response
            .map(String::into_bytes)
            .map_err(|status| RegistryError::UnexpectedStatus {
                status,
                url: url.to_string(),
            })
    }
}

/// Version query body in the registry's wire format
pub fn version_body(slug: &str, version: &str) -> String {
    format!(
        r#"{{"slug":"{}","version":"{}","url":"http://x/y","package":"http://x/pkg.zip"}}"#,
        slug, version
    )
}

pub fn version_url(package_id: &str) -> String {
    format!("{}/{}", PACKAGE_ENDPOINT, package_id)
}

pub fn detail_url(package_id: &str) -> String {
    format!("{}/{}", DETAIL_ENDPOINT, package_id)
}

/// Create a SQLite store in a temporary directory
pub fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::new(&db_path).unwrap();
    (temp_dir, Arc::new(store))
}

/// Create a checker talking to `transport` through `store`
pub fn create_test_checker<S: KeyValueStore>(
    transport: Arc<dyn Transport>,
    store: Arc<S>,
    package_endpoint: &str,
    detail_endpoint: &str,
) -> UpdateChecker<S> {
    let client = RegistryClient::new(
        transport,
        ResponseCache::new(store),
        package_endpoint,
        detail_endpoint,
        Duration::from_secs(300),
    );
    UpdateChecker::new(client, PackageIdentifier::default())
}

/// A plugin installed below `prefix`
pub fn plugin_at(prefix: &str, package_id: &str, current_version: Option<&str>) -> Package {
    Package::new(
        package_id,
        format!("{}/wp-content/plugins/demo", prefix),
        format!("{}/wp-content/plugins/demo/demo.php", prefix),
        current_version,
    )
}
