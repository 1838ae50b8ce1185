//! # Plugin Source Scanners
//!
//! A scanner enumerates one discovery channel and turns every source it finds
//! into a [`Candidate`]: either a descriptor ready for validation or a failure
//! attributed to the source that caused it. Scanners never fail as a whole;
//! a channel that cannot be enumerated contributes a single failed candidate
//! keyed by the scanner itself.
//!
//! - [`LocalScanner`]: flat directory of dynamic library files.
//! - [`EntryPointScanner`]: entries registered by installed packages.
pub mod entry_point;
pub mod local;

pub use entry_point::EntryPointScanner;
pub use local::LocalScanner;

use std::sync::Arc;

use crate::plugin_system::descriptor::{Origin, PluginDescriptor};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::guard::guarded;
use crate::plugin_system::traits::TabPlugin;

/// One discovered source, before validation
#[derive(Debug)]
pub enum Candidate {
    /// A plugin whose metadata could be read
    Found(PluginDescriptor),
    /// A source that did not yield a plugin
    Failed {
        origin: Origin,
        source_identifier: String,
        error: PluginSystemError,
    },
}

impl Candidate {
    pub fn failed(origin: Origin, source_identifier: impl Into<String>, error: PluginSystemError) -> Self {
        Candidate::Failed {
            origin,
            source_identifier: source_identifier.into(),
            error,
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            Candidate::Found(descriptor) => descriptor.origin,
            Candidate::Failed { origin, .. } => *origin,
        }
    }

    pub fn source_identifier(&self) -> &str {
        match self {
            Candidate::Found(descriptor) => &descriptor.source_identifier,
            Candidate::Failed {
                source_identifier, ..
            } => source_identifier,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Candidate::Found(_))
    }
}

/// A discovery channel
pub trait Scanner: Send + Sync {
    /// Identifier used for scanner-level diagnostics
    fn name(&self) -> String;

    /// Channel the candidates belong to
    fn origin(&self) -> Origin;

    /// Enumerate the channel. Read-only and infallible.
    fn scan(&self) -> Vec<Candidate>;
}

/// Run a loader call and snapshot the plugin it produced.
///
/// Loader implementations are expected to isolate plugin panics themselves;
/// the guard here also covers loaders that do not.
pub(crate) fn load_candidate<F>(origin: Origin, source_identifier: String, load: F) -> Candidate
where
    F: FnOnce() -> Result<Box<dyn TabPlugin>, PluginSystemError>,
{
    let loaded = match guarded(load) {
        Ok(loaded) => loaded,
        Err(panic_msg) => Err(PluginSystemError::load(
            source_identifier.clone(),
            format!("panic while loading plugin: {}", panic_msg),
        )),
    };

    let plugin: Arc<dyn TabPlugin> = match loaded {
        Ok(plugin) => Arc::from(plugin),
        Err(error) => return Candidate::failed(origin, source_identifier, error),
    };

    match PluginDescriptor::from_plugin(plugin, origin, source_identifier.clone()) {
        Ok(descriptor) => Candidate::Found(descriptor),
        Err(error) => Candidate::failed(origin, source_identifier, error),
    }
}
