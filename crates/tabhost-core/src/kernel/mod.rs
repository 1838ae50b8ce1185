//! # Tabhost Core Kernel
//!
//! Crate-wide constants and the aggregate error type.
//!
//! - **Core Constants**: API version, entry point namespace, well-known file
//!   and symbol names, via the `constants` submodule.
//! - **Error Handling**: [`Error`](error::Error) wraps the typed errors of the
//!   plugin system and the storage layer, with a `Result` alias.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
