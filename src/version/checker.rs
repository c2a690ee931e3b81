//! Update checks for installed packages

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tracing::{debug, info};

use crate::package::identifier::PackageIdentifier;
use crate::package::types::Package;
use crate::version::error::RegistryError;
use crate::version::registry::RegistryClient;
use crate::version::semver::is_newer;
use crate::version::store::KeyValueStore;
use crate::version::types::{RemoteDetailInfo, UpdateRecord};

/// Outcome of checking one package as part of [`UpdateChecker::check_all`]
#[derive(Debug)]
pub struct PackageCheck {
    pub package_id: String,
    pub result: Result<Option<UpdateRecord>, RegistryError>,
}

/// Compares installed packages against the registry
///
/// Every check is independent and returns its result; the only state kept
/// between calls is the registry slug last seen for each package, which
/// scopes [`UpdateChecker::details`] to the package it was asked about.
pub struct UpdateChecker<S: KeyValueStore> {
    client: RegistryClient<S>,
    identifier: PackageIdentifier,
    resolved_slugs: Mutex<HashMap<String, String>>,
}

impl<S: KeyValueStore> UpdateChecker<S> {
    pub fn new(client: RegistryClient<S>, identifier: PackageIdentifier) -> Self {
        Self {
            client,
            identifier,
            resolved_slugs: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a newer version of `package` is available.
    ///
    /// Returns `Ok(None)` without touching the network when the package is
    /// installed outside the plugins and themes roots.
    pub async fn check(&self, package: &Package) -> Result<Option<UpdateRecord>, RegistryError> {
        let resolved = match self.identifier.resolve(package) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("Skipping update check for {}: {}", package.package_id, e);
                return Ok(None);
            }
        };

        let remote = self.client.fetch_version_info(&package.package_id).await?;
        self.remember_slug(&package.package_id, &remote.slug);

        let current = package.current_version.as_deref();
        if !is_newer(&remote.version, current) {
            debug!(
                "{} is up to date (installed {:?}, registry {})",
                resolved.slug, current, remote.version
            );
            return Ok(None);
        }

        info!(
            "Update available for {}: {:?} -> {}",
            resolved.slug, current, remote.version
        );

        Ok(Some(UpdateRecord {
            kind: resolved.kind,
            slug: remote.slug,
            install_slug: resolved.slug,
            new_version: remote.version,
            url: remote.url,
            package_source: remote.package,
        }))
    }

    /// Fetch detail information, but only when `requested_slug` names this package.
    ///
    /// The slug is the one the registry reported during the last successful
    /// [`check`](Self::check); if the package was never checked, it is
    /// resolved with a version query first.
    pub async fn details(
        &self,
        package: &Package,
        requested_slug: &str,
    ) -> Result<Option<RemoteDetailInfo>, RegistryError> {
        if let Err(e) = self.identifier.resolve(package) {
            debug!("Skipping details for {}: {}", package.package_id, e);
            return Ok(None);
        }

        let slug = match self.resolved_slug(&package.package_id) {
            Some(slug) => slug,
            None => {
                let remote = self.client.fetch_version_info(&package.package_id).await?;
                self.remember_slug(&package.package_id, &remote.slug);
                remote.slug
            }
        };

        if slug != requested_slug {
            debug!(
                "Details requested for {}, {} is {}",
                requested_slug, package.package_id, slug
            );
            return Ok(None);
        }

        self.client
            .fetch_detail_info(&package.package_id)
            .await
            .map(Some)
    }

    /// Check many packages concurrently
    pub async fn check_all(&self, packages: &[Package]) -> Vec<PackageCheck> {
        join_all(packages.iter().map(|package| async move {
            PackageCheck {
                package_id: package.package_id.clone(),
                result: self.check(package).await,
            }
        }))
        .await
    }

    fn lock_slugs(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.resolved_slugs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remember_slug(&self, package_id: &str, slug: &str) {
        self.lock_slugs()
            .insert(package_id.to_string(), slug.to_string());
    }

    fn resolved_slug(&self, package_id: &str) -> Option<String> {
        self.lock_slugs().get(package_id).cloned()
    }
}
