//! Installed package layer
//!
//! Describes the plugins and themes a host reports as installed, and derives
//! the stable slug each one is known by in the registry and the response cache.
//!
//! # Modules
//!
//! - [`identifier`]: Kind detection and slug derivation from install paths
//! - [`types`]: Package, kind and resolved identity types

pub mod identifier;
pub mod types;
