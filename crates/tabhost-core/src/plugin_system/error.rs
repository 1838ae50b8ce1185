//! # Tabhost Plugin System Errors
//!
//! [`PluginSystemError`] is the typed error for everything that can go wrong
//! while turning a plugin source into a registered descriptor: reading or
//! resolving the source, checking the plugin contract, creating widgets and
//! running the scanners themselves. Discovery converts each of these into a
//! diagnostic instead of propagating it.
//!
//! [`ErrorKind`] is the coarse classification surfaced to hosts.
use std::fmt;
use std::path::PathBuf;

/// Coarse classification of discovery outcomes that are not plain successes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// The source could not be read, parsed or resolved
    LoadError,
    /// The resolved symbol lacks the required metadata or capability
    ContractError,
    /// The plugin does not run on the current platform
    IncompatiblePlatform,
    /// The descriptor is valid but instantiation failed
    FactoryError,
    /// Informational: a registration shadowed an earlier one with the same name
    CollisionOverride,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::LoadError => "load error",
            ErrorKind::ContractError => "contract error",
            ErrorKind::IncompatiblePlatform => "incompatible platform",
            ErrorKind::FactoryError => "factory error",
            ErrorKind::CollisionOverride => "collision override",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin loading failed for '{source_identifier}': {message}")]
    LoadError {
        source_identifier: String,
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Plugin '{source_identifier}' does not satisfy the tab plugin contract: {message}")]
    ContractError {
        source_identifier: String,
        message: String,
    },

    #[error("plugin does not support {platform} (supports: {supported})")]
    IncompatiblePlatform {
        plugin_id: String,
        platform: String,
        supported: String,
    },

    /// Message is the plugin's own error text or the captured panic
    #[error("{message}")]
    FactoryError {
        plugin_id: String,
        message: String,
    },

    #[error("Malformed entry point '{key} = {value}' in '{source_identifier}': {message}")]
    MalformedEntryPoint {
        source_identifier: String,
        key: String,
        value: String,
        message: String,
    },

    #[error("Package metadata error for '{path}': {message}")]
    PackageMetadata {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Scanner '{scanner}' could not run: {message}")]
    ScannerUnavailable {
        scanner: String,
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Plugin discovery aborted before completing: {0}")]
    DiscoveryAborted(String),
}

impl PluginSystemError {
    /// Classify this error for diagnostics
    pub fn kind(&self) -> ErrorKind {
        match self {
            PluginSystemError::ContractError { .. } => ErrorKind::ContractError,
            PluginSystemError::IncompatiblePlatform { .. } => ErrorKind::IncompatiblePlatform,
            PluginSystemError::FactoryError { .. } => ErrorKind::FactoryError,
            PluginSystemError::LoadError { .. }
            | PluginSystemError::MalformedEntryPoint { .. }
            | PluginSystemError::PackageMetadata { .. }
            | PluginSystemError::ScannerUnavailable { .. }
            | PluginSystemError::DiscoveryAborted(_) => ErrorKind::LoadError,
        }
    }

    /// Shorthand for a load failure without a filesystem path
    pub fn load(source_identifier: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::LoadError {
            source_identifier: source_identifier.into(),
            path: None,
            message: message.into(),
        }
    }

    /// Shorthand for a contract violation
    pub fn contract(source_identifier: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::ContractError {
            source_identifier: source_identifier.into(),
            message: message.into(),
        }
    }
}
