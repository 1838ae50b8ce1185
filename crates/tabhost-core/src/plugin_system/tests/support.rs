#![cfg(test)]

// Shared fixtures: a configurable mock tab and a loader that maps file stems
// and entry symbols to mock tabs instead of opening real libraries.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::package_index::EntryPoint;
use crate::plugin_system::platform::Platform;
use crate::plugin_system::traits::{DisplayUnit, PluginError, TabPlugin, TextPanel};
use crate::plugin_system::validator::Validator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryBehavior {
    Builds,
    Fails(String),
    Panics(String),
}

#[derive(Debug, Clone)]
pub struct MockTab {
    pub name: String,
    pub description: String,
    pub version: String,
    pub platforms: Vec<String>,
    pub requires_admin: bool,
    pub disabled_by_default: bool,
    pub factory: FactoryBehavior,
    pub metadata_panics: bool,
    pub factory_calls: Arc<AtomicUsize>,
}

impl MockTab {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{} description", name),
            version: "1.0.0".to_string(),
            platforms: vec!["Windows".into(), "Linux".into(), "macOS".into()],
            requires_admin: false,
            disabled_by_default: false,
            factory: FactoryBehavior::Builds,
            metadata_panics: false,
            factory_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn platforms(mut self, platforms: &[&str]) -> Self {
        self.platforms = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn factory(mut self, behavior: FactoryBehavior) -> Self {
        self.factory = behavior;
        self
    }

    pub fn with_requires_admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.disabled_by_default = true;
        self
    }

    pub fn panicking_metadata(mut self) -> Self {
        self.metadata_panics = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.factory_calls.load(Ordering::SeqCst)
    }
}

impl TabPlugin for MockTab {
    fn name(&self) -> &str {
        if self.metadata_panics {
            panic!("metadata unavailable");
        }
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn supported_platforms(&self) -> Vec<String> {
        self.platforms.clone()
    }

    fn requires_admin(&self) -> bool {
        self.requires_admin
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn disabled_by_default(&self) -> bool {
        self.disabled_by_default
    }

    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        self.factory_calls.fetch_add(1, Ordering::SeqCst);
        match &self.factory {
            FactoryBehavior::Builds => Ok(Box::new(TextPanel::new(self.name.clone(), "ready"))),
            FactoryBehavior::Fails(message) => Err(PluginError::WidgetError(message.clone())),
            FactoryBehavior::Panics(message) => panic!("{}", message),
        }
    }
}

/// Loader keyed by file stem (local files) or symbol (entry points).
///
/// Unknown stems containing "panic" make the loader panic; any other unknown
/// source is reported as a load error.
#[derive(Clone, Default)]
pub struct FakeLoader {
    plugins: HashMap<String, MockTab>,
}

impl FakeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, tab: MockTab) -> Self {
        self.plugins.insert(key.to_string(), tab);
        self
    }

    fn lookup(&self, key: &str, source: String, path: Option<PathBuf>) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        if let Some(tab) = self.plugins.get(key) {
            return Ok(Box::new(tab.clone()));
        }
        if key.contains("panic") {
            panic!("constructor exploded in {}", key);
        }
        Err(PluginSystemError::LoadError {
            source_identifier: source,
            path,
            message: "not a tab plugin library".to_string(),
        })
    }
}

impl PluginLoader for FakeLoader {
    fn load_file(&self, path: &Path) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.lookup(&stem, path.display().to_string(), Some(path.to_path_buf()))
    }

    fn resolve_entry(&self, entry: &EntryPoint) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        self.lookup(&entry.symbol, entry.source_identifier(), None)
    }
}

/// Create an empty file with the platform library extension
pub fn touch_library(dir: &Path, stem: &str) -> PathBuf {
    let path = dir.join(format!("{}.{}", stem, std::env::consts::DLL_EXTENSION));
    fs::write(&path, b"not really a library").expect("Failed to write library fixture");
    path
}

pub fn linux_validator() -> Validator {
    Validator::for_platform(Some(Platform::Linux))
}
