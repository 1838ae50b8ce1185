//! # Tabhost Core Storage
//!
//! Settings persistence for discovery: the [`DiscoverySettings`] document and
//! the [`ConfigFormat`] used to read and write it.
pub mod config;
pub mod error;

/// Re-export key types
pub use config::{ConfigFormat, DiscoverySettings};
pub use error::StorageSystemError;
