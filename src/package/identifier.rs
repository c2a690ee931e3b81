//! Slug derivation for installed packages
//!
//! A slug identifies a package within its kind. It must stay the same across
//! installs, so it is always computed relative to the plugins or themes root
//! and never carries the absolute prefix of the host's document root.

use thiserror::Error;

use crate::config::RootsConfig;
use crate::package::types::{Package, PackageKind, ResolvedPackage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0:?} is neither under the plugins root nor the themes root")]
    UnknownInstallLocation(String),

    #[error("Cannot derive a slug from {file:?} below {root:?}")]
    EmptySlug { root: String, file: String },
}

/// Detects package kinds and derives slugs from install paths
#[derive(Debug, Clone)]
pub struct PackageIdentifier {
    plugins_root: Vec<String>,
    themes_root: Vec<String>,
}

impl PackageIdentifier {
    /// Creates an identifier for the given root markers (e.g. "wp-content/plugins")
    pub fn new(plugins_root: &str, themes_root: &str) -> Self {
        Self {
            plugins_root: owned_segments(plugins_root),
            themes_root: owned_segments(themes_root),
        }
    }

    pub fn from_config(roots: &RootsConfig) -> Self {
        Self::new(&roots.plugins, &roots.themes)
    }

    /// Determine whether a directory belongs to a plugin or a theme.
    ///
    /// Plugins win when a directory somehow matches both roots.
    pub fn kind_of(&self, install_directory: &str) -> Result<PackageKind, ConfigurationError> {
        let segments = segments(install_directory);

        if find_after_root(&segments, &self.plugins_root).is_some() {
            Ok(PackageKind::Plugin)
        } else if find_after_root(&segments, &self.themes_root).is_some() {
            Ok(PackageKind::Theme)
        } else {
            Err(ConfigurationError::UnknownInstallLocation(
                install_directory.to_string(),
            ))
        }
    }

    /// Derive the slug of a package of the given kind
    ///
    /// - Plugin: the install file relative to the plugins root ("demo/demo.php")
    /// - Theme: the top-level directory below the themes root ("twentytwenty")
    pub fn slug_for(
        &self,
        kind: PackageKind,
        install_directory: &str,
        install_file: &str,
    ) -> Result<String, ConfigurationError> {
        let root = self.root(kind);

        if find_after_root(&segments(install_directory), root).is_none() {
            return Err(ConfigurationError::UnknownInstallLocation(
                install_directory.to_string(),
            ));
        }

        let file_segments = segments(install_file);
        let empty_slug = || ConfigurationError::EmptySlug {
            root: root.join("/"),
            file: install_file.to_string(),
        };

        let start = find_after_root(&file_segments, root).ok_or_else(empty_slug)?;
        let rest = &file_segments[start..];

        let slug = match kind {
            PackageKind::Plugin => rest.join("/"),
            PackageKind::Theme => rest.first().map(|s| s.to_string()).unwrap_or_default(),
        };

        if slug.is_empty() {
            return Err(empty_slug());
        }

        Ok(slug)
    }

    /// Resolve kind and slug of a package
    pub fn resolve(&self, package: &Package) -> Result<ResolvedPackage, ConfigurationError> {
        let kind = self.kind_of(&package.install_directory)?;
        let slug = self.slug_for(kind, &package.install_directory, &package.install_file)?;
        Ok(ResolvedPackage { kind, slug })
    }

    fn root(&self, kind: PackageKind) -> &[String] {
        match kind {
            PackageKind::Plugin => &self.plugins_root,
            PackageKind::Theme => &self.themes_root,
        }
    }
}

impl Default for PackageIdentifier {
    fn default() -> Self {
        Self::from_config(&RootsConfig::default())
    }
}

/// Split a path on both separator styles, dropping empty and "." segments
fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

fn owned_segments(path: &str) -> Vec<String> {
    segments(path).into_iter().map(str::to_string).collect()
}

/// Index of the first segment following the first occurrence of `root`
fn find_after_root(segments: &[&str], root: &[String]) -> Option<usize> {
    if root.is_empty() || segments.len() < root.len() {
        return None;
    }

    segments
        .windows(root.len())
        .position(|window| window.iter().zip(root).all(|(a, b)| *a == b.as_str()))
        .map(|pos| pos + root.len())
}
