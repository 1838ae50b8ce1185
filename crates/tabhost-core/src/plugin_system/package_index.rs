//! Installed package index.
//!
//! Packages advertise tab plugins by registering entries under a fixed
//! namespace in their `tabhost-package.toml`:
//!
//! ```toml
//! [package]
//! name = "netkit"
//! version = "0.3.0"
//!
//! [entry-points.tabhost_tabs]
//! ping = "netkit_tabs:PING_TAB"
//! ```
//!
//! The value names a library in the package directory and the exported
//! declaration symbol inside it.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use serde::Deserialize;

use crate::kernel::constants::PACKAGE_METADATA_FILE;
use crate::plugin_system::error::PluginSystemError;

/// One `key = "module:symbol"` registration of an installed package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Entry key within the namespace
    pub name: String,
    /// Library name inside the package directory, without platform prefix or extension
    pub module: String,
    /// Exported declaration symbol
    pub symbol: String,
    /// Owning package name
    pub package: String,
    /// Package directory
    pub location: PathBuf,
}

impl EntryPoint {
    /// Parse an entry value of the form `module:symbol`
    pub fn parse(
        package: &str,
        location: impl Into<PathBuf>,
        key: &str,
        value: &str,
    ) -> Result<Self, PluginSystemError> {
        let malformed = |message: &str| PluginSystemError::MalformedEntryPoint {
            source_identifier: format!("{}:{}", package, key),
            key: key.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(malformed("entry key is empty"));
        }

        let (module, symbol) = value
            .split_once(':')
            .ok_or_else(|| malformed("expected 'module:symbol'"))?;
        let module = module.trim();
        let symbol = symbol.trim();

        if module.is_empty() {
            return Err(malformed("module part is empty"));
        }
        if module.contains(['/', '\\']) {
            return Err(malformed("module must be a library name, not a path"));
        }
        if !is_symbol_name(symbol) {
            return Err(malformed("symbol must be a non-empty identifier"));
        }

        Ok(Self {
            name: key.to_string(),
            module: module.to_string(),
            symbol: symbol.to_string(),
            package: package.to_string(),
            location: location.into(),
        })
    }

    /// `<package>:<key>`, the identifier diagnostics are keyed by
    pub fn source_identifier(&self) -> String {
        format!("{}:{}", self.package, self.name)
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = \"{}:{}\"", self.name, self.module, self.symbol)
    }
}

fn is_symbol_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Enumerated entries; each item is an entry or the reason one could not be read
pub type EntryPoints = Vec<Result<EntryPoint, PluginSystemError>>;

/// Source of installed-package entry points
pub trait PackageIndex: Send + Sync {
    /// All entries registered under `namespace`.
    ///
    /// `Err` means the index as a whole could not be enumerated.
    fn entry_points(&self, namespace: &str) -> Result<EntryPoints, PluginSystemError>;
}

#[derive(Debug, Deserialize, Default)]
struct PackageSection {
    name: Option<String>,
    #[allow(dead_code)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PackageMetadataFile {
    #[serde(default)]
    package: PackageSection,
    #[serde(default, rename = "entry-points")]
    entry_points: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// Package index over directories of installed packages.
///
/// Every immediate subdirectory of a root that holds a `tabhost-package.toml`
/// is a package. Roots that do not exist are skipped; a root that cannot be
/// read becomes one failed item and the remaining roots are still read.
#[derive(Debug, Clone, Default)]
pub struct DirectoryPackageIndex {
    roots: Vec<PathBuf>,
}

impl DirectoryPackageIndex {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn unavailable(root: &Path, message: &str, source: Option<io::Error>) -> PluginSystemError {
        PluginSystemError::ScannerUnavailable {
            scanner: "package-index".to_string(),
            path: Some(root.to_path_buf()),
            message: message.to_string(),
            source,
        }
    }

    fn package_dirs(root: &Path) -> Result<Vec<PathBuf>, PluginSystemError> {
        if !root.exists() {
            trace!("Package root {} does not exist, skipping", root.display());
            return Ok(Vec::new());
        }
        if !root.is_dir() {
            return Err(Self::unavailable(root, "package root is not a directory", None));
        }

        let reader = fs::read_dir(root)
            .map_err(|e| Self::unavailable(root, "failed to read package root", Some(e)))?;

        let mut dirs = Vec::new();
        for entry in reader {
            let entry =
                entry.map_err(|e| Self::unavailable(root, "failed to read package root", Some(e)))?;
            let path = entry.path();
            if path.is_dir() && path.join(PACKAGE_METADATA_FILE).is_file() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn read_package(dir: &Path, namespace: &str, out: &mut EntryPoints) {
        let metadata_path = dir.join(PACKAGE_METADATA_FILE);
        let metadata_error = |message: String, source: Option<BoxedSource>| {
            PluginSystemError::PackageMetadata {
                path: metadata_path.clone(),
                message,
                source,
            }
        };

        let text = match fs::read_to_string(&metadata_path) {
            Ok(text) => text,
            Err(e) => {
                out.push(Err(metadata_error("failed to read package metadata".to_string(), Some(Box::new(e) as BoxedSource))));
                return;
            }
        };

        let parsed: PackageMetadataFile = match toml::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                out.push(Err(metadata_error(format!("invalid package metadata: {}", e), Some(Box::new(e) as BoxedSource))));
                return;
            }
        };

        let package = parsed
            .package
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        let Some(entries) = parsed.entry_points.get(namespace) else {
            trace!("Package '{}' registers nothing under '{}'", package, namespace);
            return;
        };

        for (key, value) in entries {
            let entry = match value.as_str() {
                Some(value) => EntryPoint::parse(&package, dir, key, value),
                None => Err(PluginSystemError::MalformedEntryPoint {
                    source_identifier: format!("{}:{}", package, key),
                    key: key.clone(),
                    value: value.to_string(),
                    message: "entry value must be a string".to_string(),
                }),
            };
            out.push(entry);
        }
    }
}

impl PackageIndex for DirectoryPackageIndex {
    fn entry_points(&self, namespace: &str) -> Result<EntryPoints, PluginSystemError> {
        let mut entries = Vec::new();
        for root in &self.roots {
            match Self::package_dirs(root) {
                Ok(dirs) => {
                    for dir in dirs {
                        Self::read_package(&dir, namespace, &mut entries);
                    }
                }
                // other roots are still enumerated
                Err(e) => {
                    debug!("Skipping package root {}: {}", root.display(), e);
                    entries.push(Err(e));
                }
            }
        }
        debug!(
            "Package index found {} entries under '{}' in {} root(s)",
            entries.len(),
            namespace,
            self.roots.len()
        );
        Ok(entries)
    }
}

#[derive(Debug, Clone)]
struct StaticEntry {
    namespace: String,
    package: String,
    key: String,
    value: String,
    location: PathBuf,
}

/// In-memory package index for embedding hosts and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPackageIndex {
    entries: Vec<StaticEntry>,
    unavailable: Option<String>,
}

impl StaticPackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index whose enumeration always fails with `message`
    pub fn unavailable(message: &str) -> Self {
        Self {
            entries: Vec::new(),
            unavailable: Some(message.to_string()),
        }
    }

    /// Register `key = "value"` for `package` under `namespace`
    pub fn with_entry(mut self, namespace: &str, package: &str, key: &str, value: &str) -> Self {
        self.entries.push(StaticEntry {
            namespace: namespace.to_string(),
            package: package.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            location: PathBuf::new(),
        });
        self
    }

    /// Set the package directory of the most recently added entry
    pub fn located_at(mut self, location: impl Into<PathBuf>) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.location = location.into();
        }
        self
    }
}

impl PackageIndex for StaticPackageIndex {
    fn entry_points(&self, namespace: &str) -> Result<EntryPoints, PluginSystemError> {
        if let Some(message) = &self.unavailable {
            return Err(PluginSystemError::ScannerUnavailable {
                scanner: "package-index".to_string(),
                path: None,
                message: message.clone(),
                source: None,
            });
        }

        Ok(self
            .entries
            .iter()
            .filter(|e| e.namespace == namespace)
            .map(|e| EntryPoint::parse(&e.package, e.location.clone(), &e.key, &e.value))
            .collect())
    }
}
