pub mod config;
pub mod package;
pub mod version;
