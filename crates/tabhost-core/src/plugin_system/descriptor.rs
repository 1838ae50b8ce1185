use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::guard::guarded;
use crate::plugin_system::platform::Platform;
use crate::plugin_system::traits::{DisplayUnit, PluginError, TabPlugin, TextPanel};

/// Discovery channel a descriptor came from.
///
/// Variants are ordered by precedence: a later registration only shadows an
/// earlier one of lower or equal rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Built into the host application
    Core,
    /// Registered by an installed package
    EntryPoint,
    /// Dropped into the local plugins directory
    Local,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Core => write!(f, "core"),
            Origin::EntryPoint => write!(f, "entry-point"),
            Origin::Local => write!(f, "local"),
        }
    }
}

/// Metadata snapshot of one plugin plus the factory capability that builds its widget
#[derive(Clone)]
pub struct PluginDescriptor {
    /// Unique display and registration key
    pub name: String,
    /// Human-readable summary
    pub description: String,
    /// Platform identifiers exactly as the plugin declared them
    pub supported_platforms: BTreeSet<String>,
    /// Declared administrator requirement
    pub requires_admin: bool,
    /// Plugin version
    pub version: String,
    /// Display text for the author(s)
    pub author: String,
    /// Individual authors
    pub authors: Vec<String>,
    /// Whether the plugin starts switched off
    pub disabled_by_default: bool,
    /// Discovery channel
    pub origin: Origin,
    /// File path, package entry or `core:<name>`, for diagnostics
    pub source_identifier: String,
    factory: Arc<dyn TabPlugin>,
}

impl PluginDescriptor {
    /// Snapshot a plugin's metadata.
    ///
    /// The plugin is third-party code: a panic while reading any field is
    /// reported as a contract error attributed to `source_identifier`.
    pub fn from_plugin(
        plugin: Arc<dyn TabPlugin>,
        origin: Origin,
        source_identifier: impl Into<String>,
    ) -> Result<Self, PluginSystemError> {
        let source_identifier = source_identifier.into();

        let metadata = guarded(|| {
            (
                plugin.name().to_string(),
                plugin.description().to_string(),
                plugin.supported_platforms(),
                plugin.requires_admin(),
                plugin.version().to_string(),
                plugin.author().to_string(),
                plugin.authors(),
                plugin.disabled_by_default(),
            )
        })
        .map_err(|panic_msg| {
            PluginSystemError::contract(
                source_identifier.clone(),
                format!("panic while reading plugin metadata: {}", panic_msg),
            )
        })?;

        let (name, description, platforms, requires_admin, version, author, authors, disabled) =
            metadata;
        let (author, authors) = normalize_authors(&author, authors);

        Ok(Self {
            name,
            description,
            supported_platforms: platforms.into_iter().collect(),
            requires_admin,
            version,
            author,
            authors,
            disabled_by_default: disabled,
            origin,
            source_identifier,
            factory: plugin,
        })
    }

    /// Invoke the factory. Unguarded: this is the host's lazy tab-open call.
    pub fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        self.factory.create_widget()
    }

    /// The plugin object behind this descriptor
    pub fn plugin(&self) -> &Arc<dyn TabPlugin> {
        &self.factory
    }

    /// Whether both descriptors share the same factory object
    pub fn same_factory(&self, other: &PluginDescriptor) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.factory), Arc::as_ptr(&other.factory))
    }

    pub fn is_core(&self) -> bool {
        self.origin == Origin::Core
    }

    /// Whether the declared platforms include `platform`
    pub fn supports(&self, platform: Platform) -> bool {
        self.supported_platforms.iter().any(|p| platform.matches(p))
    }

    /// Serializable summary of this descriptor
    pub fn info(&self, current: Option<Platform>) -> PluginInfo {
        PluginInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            supported_platforms: self.supported_platforms.iter().cloned().collect(),
            requires_admin: self.requires_admin,
            version: self.version.clone(),
            author: self.author.clone(),
            authors: self.authors.clone(),
            compatible: current.map_or(false, |p| self.supports(p)),
            current_platform: current.map_or_else(
                || std::env::consts::OS.to_string(),
                |p| p.as_str().to_string(),
            ),
            disabled_by_default: self.disabled_by_default,
            origin: self.origin,
            source: self.source_identifier.clone(),
        }
    }
}

impl PartialEq for PluginDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.supported_platforms == other.supported_platforms
            && self.requires_admin == other.requires_admin
            && self.version == other.version
            && self.author == other.author
            && self.authors == other.authors
            && self.disabled_by_default == other.disabled_by_default
            && self.origin == other.origin
            && self.source_identifier == other.source_identifier
            && self.same_factory(other)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("origin", &self.origin)
            .field("source_identifier", &self.source_identifier)
            .field("supported_platforms", &self.supported_platforms)
            .finish_non_exhaustive()
    }
}

/// Prefer the author list; fall back to the single author
fn normalize_authors(author: &str, authors: Vec<String>) -> (String, Vec<String>) {
    let authors: Vec<String> = authors
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if !authors.is_empty() {
        return (authors.join(", "), authors);
    }

    let single = author.trim();
    if single.is_empty() {
        ("Unknown".to_string(), Vec::new())
    } else {
        (single.to_string(), vec![single.to_string()])
    }
}

/// Plugin information for listings and troubleshooting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub supported_platforms: Vec<String>,
    pub requires_admin: bool,
    pub version: String,
    pub author: String,
    pub authors: Vec<String>,
    pub compatible: bool,
    pub current_platform: String,
    pub disabled_by_default: bool,
    pub origin: Origin,
    pub source: String,
}

type BoxedFactory = Box<dyn Fn() -> Result<Box<dyn DisplayUnit>, PluginError> + Send + Sync>;

/// Plugin assembled by [`DescriptorBuilder`]
struct BuiltPlugin {
    name: String,
    description: String,
    platforms: Vec<String>,
    requires_admin: bool,
    version: String,
    author: String,
    authors: Vec<String>,
    disabled_by_default: bool,
    factory: BoxedFactory,
}

impl TabPlugin for BuiltPlugin {
    fn name(&self) -> &str {
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
    fn author(&self) -> &str {
        &self.author
    }
    fn authors(&self) -> Vec<String> {
        self.authors.clone()
    }
    fn disabled_by_default(&self) -> bool {
        self.disabled_by_default
    }
    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        (self.factory)()
    }
}

/// Builder for creating a plugin descriptor up front
pub struct DescriptorBuilder {
    plugin: BuiltPlugin,
    origin: Origin,
    source_identifier: Option<String>,
}

impl DescriptorBuilder {
    /// Create a new builder; the default factory yields a [`TextPanel`]
    pub fn new(name: &str) -> Self {
        let title = name.to_string();
        Self {
            plugin: BuiltPlugin {
                name: name.to_string(),
                description: format!("{} tab", name),
                platforms: Platform::ALL.iter().map(|p| p.as_str().to_string()).collect(),
                requires_admin: false,
                version: "1.0.0".to_string(),
                author: "Unknown".to_string(),
                authors: Vec::new(),
                disabled_by_default: false,
                factory: Box::new(move || Ok(Box::new(TextPanel::new(title.clone(), "")) as Box<dyn DisplayUnit>)),
            },
            origin: Origin::Core,
            source_identifier: None,
        }
    }

    /// Set the description
    pub fn description(mut self, description: &str) -> Self {
        self.plugin.description = description.to_string();
        self
    }

    /// Replace the supported platforms
    pub fn platforms(mut self, platforms: &[&str]) -> Self {
        self.plugin.platforms = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Declare an administrator requirement
    pub fn requires_admin(mut self, requires_admin: bool) -> Self {
        self.plugin.requires_admin = requires_admin;
        self
    }

    /// Set the version
    pub fn version(mut self, version: &str) -> Self {
        self.plugin.version = version.to_string();
        self
    }

    /// Set the single author
    pub fn author(mut self, author: &str) -> Self {
        self.plugin.author = author.to_string();
        self
    }

    /// Add an author to the author list
    pub fn add_author(mut self, author: &str) -> Self {
        self.plugin.authors.push(author.to_string());
        self
    }

    /// Start switched off
    pub fn disabled_by_default(mut self, disabled: bool) -> Self {
        self.plugin.disabled_by_default = disabled;
        self
    }

    /// Set the discovery channel
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the source identifier; defaults to `<origin>:<name>`
    pub fn source(mut self, source_identifier: &str) -> Self {
        self.source_identifier = Some(source_identifier.to_string());
        self
    }

    /// Replace the widget factory
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn DisplayUnit>, PluginError> + Send + Sync + 'static,
    {
        self.plugin.factory = Box::new(factory);
        self
    }

    /// Build the descriptor
    pub fn build(self) -> PluginDescriptor {
        let source_identifier = self
            .source_identifier
            .unwrap_or_else(|| format!("{}:{}", self.origin, self.plugin.name));
        let (author, authors) = normalize_authors(&self.plugin.author, self.plugin.authors.clone());
        let plugin = self.plugin;

        PluginDescriptor {
            name: plugin.name.clone(),
            description: plugin.description.clone(),
            supported_platforms: plugin.platforms.iter().cloned().collect(),
            requires_admin: plugin.requires_admin,
            version: plugin.version.clone(),
            author,
            authors,
            disabled_by_default: plugin.disabled_by_default,
            origin: self.origin,
            source_identifier,
            factory: Arc::new(plugin),
        }
    }
}
