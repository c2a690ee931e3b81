//! Version management layer for package update checks
//!
//! This module provides the core functionality for querying, caching, and comparing
//! package versions against a remote update registry.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Transport  │◀────│  Registry   │◀────│   Checker   │
//! │   (POST)    │     │  (decode)   │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │    Cache    │     │   Semver    │
//!                     │ (TTL store) │     │(version cmp)│
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: Fingerprint-keyed response cache
//! - [`checker`]: Update checks and detail lookups for installed packages
//! - [`error`]: Error types for cache and registry operations
//! - [`registry`]: Client for the version and detail endpoints
//! - [`semver`]: Dotted version parsing and ordering
//! - [`store`]: Key-value store trait the cache writes through
//! - [`stores`]: In-memory and SQLite store implementations
//! - [`transport`]: Transport trait for registry requests
//! - [`transports`]: HTTP transport implementation
//! - [`types`]: Registry payloads and `UpdateRecord`

pub mod cache;
pub mod checker;
pub mod error;
pub mod registry;
pub mod semver;
pub mod store;
pub mod stores;
pub mod transport;
pub mod transports;
pub mod types;
