use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kernel::constants::{DEFAULT_PLUGINS_DIR, ENTRY_POINT_NAMESPACE};
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }
}

/// Settings that steer a discovery run.
///
/// Every field has a default, so an empty document (or no document at all)
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Directory scanned for local plugin libraries
    pub plugins_dir: PathBuf,
    /// Roots of the installed package index
    pub package_dirs: Vec<PathBuf>,
    /// Namespace installed packages register tab plugins under
    pub entry_point_namespace: String,
    /// File names the local scanner never loads
    pub skip_files: Vec<String>,
    /// Plugin names switched off by the user
    pub disabled: BTreeSet<String>,
    /// Plugin names switched on even though they are disabled by default
    pub enabled: BTreeSet<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            package_dirs: Vec::new(),
            entry_point_namespace: ENTRY_POINT_NAMESPACE.to_string(),
            skip_files: Vec::new(),
            disabled: BTreeSet::new(),
            enabled: BTreeSet::new(),
        }
    }
}

impl DiscoverySettings {
    /// Load settings from a file, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = Self::format_for(path)?;

        if !path.is_file() {
            return Err(StorageSystemError::FileNotFound(path.to_path_buf()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, "read_settings", path.to_path_buf()))?;
        let settings = Self::deserialize(&content, format)?;
        log::debug!("Loaded discovery settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a file, picking the format from its extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let format = Self::format_for(path)?;
        let content = self.serialize(format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io(e, "create_settings_dir", parent.to_path_buf()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::io(e, "write_settings", path.to_path_buf()))?;
        Ok(())
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let serialized = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        };
        serialized.map_err(|source| {
            StorageSystemError::SerializationError {
                format: format.name().to_string(),
                source,
            }
            .into()
        })
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(data)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        };
        parsed.map_err(|source| {
            StorageSystemError::DeserializationError {
                format: format.name().to_string(),
                source,
            }
            .into()
        })
    }

    /// Whether a plugin is switched on, given its default.
    ///
    /// An explicit `disabled` entry always wins; `enabled` only lifts the
    /// disabled-by-default state.
    pub fn is_enabled(&self, name: &str, disabled_by_default: bool) -> bool {
        if self.disabled.contains(name) {
            return false;
        }
        !disabled_by_default || self.enabled.contains(name)
    }

    fn format_for(path: &Path) -> Result<ConfigFormat> {
        ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string()).into()
        })
    }
}
