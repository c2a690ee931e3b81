//! Common types for installed packages

use serde::{Deserialize, Serialize};

/// Kind of installed package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Plugin installed under the plugins root
    Plugin,
    /// Theme installed under the themes root
    Theme,
}

/// Install metadata of a package, as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Identifier the registry knows the package by
    pub package_id: String,
    /// Directory the package code lives in
    pub install_directory: String,
    /// File that registered the package (plugin main file, or any theme file)
    pub install_file: String,
    /// Installed version, if the host could read it
    #[serde(default)]
    pub current_version: Option<String>,
}

impl Package {
    pub fn new(
        package_id: impl Into<String>,
        install_directory: impl Into<String>,
        install_file: impl Into<String>,
        current_version: Option<&str>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            install_directory: install_directory.into(),
            install_file: install_file.into(),
            current_version: current_version.map(str::to_string),
        }
    }
}

/// Kind and slug derived from a package's install paths
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPackage {
    pub kind: PackageKind,
    pub slug: String,
}
