//! # Tabhost Plugin System
//!
//! Discovers tab plugins from every channel the host knows about, validates
//! them and merges them into one ordered, queryable registry. Discovery runs
//! once per process and never fails; every problem becomes a diagnostic.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: The [`TabPlugin`] contract plugins implement and the
//!   [`DisplayUnit`] they hand back for a tab.
//! - **[`descriptor`]**: [`PluginDescriptor`], the metadata snapshot plus
//!   factory for one plugin, and its [`Origin`].
//! - **[`validator`]**: Ordered checks producing a [`ValidationResult`].
//! - **[`scanner`]**: The local directory and installed-package scanners.
//! - **[`loader`]**: The [`PluginLoader`] seam and its native library implementation.
//! - **[`ffi`]**: The declaration record plugin libraries export.
//! - **[`package_index`]**: Installed-package entry point enumeration.
//! - **[`registry`]**: Name-keyed merge with origin precedence ([`PluginRegistry`],
//!   [`RegistryView`]).
//! - **[`conflict`]**: Records of registrations shadowed by name collisions.
//! - **[`discovery`]**: The orchestrator ([`Discovery`]) and its background handle.
//! - **[`platform`]** / **[`version`]**: Platform identifiers and core API versioning.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError) and its [`ErrorKind`](error::ErrorKind).
pub mod conflict;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod ffi;
mod guard;
pub mod loader;
pub mod package_index;
pub mod platform;
pub mod registry;
pub mod scanner;
pub mod traits;
pub mod validator;
pub mod version;

pub use conflict::PluginOverride;
pub use descriptor::{DescriptorBuilder, Origin, PluginDescriptor, PluginInfo};
pub use discovery::{Discovery, DiscoveryHandle, DiscoveryOutcome};
pub use loader::{NativeLoader, PluginLoader};
pub use package_index::{DirectoryPackageIndex, EntryPoint, PackageIndex, StaticPackageIndex};
pub use platform::Platform;
pub use registry::{DiscoverySummary, PluginRegistry, RegistryEntry, RegistryView};
pub use traits::{DisplayUnit, FnTabPlugin, PluginError, TabPlugin, TextPanel};
pub use validator::{ValidationResult, ValidationStatus, Validator};

// Test module declaration
#[cfg(test)]
mod tests;
