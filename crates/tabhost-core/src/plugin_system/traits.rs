use std::any::Any;
use std::fmt;

/// Error type plugin authors return from their own code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("Widget creation error: {0}")]
    WidgetError(String),
    #[error("Plugin error: {0}")]
    Other(String),
}

/// A unit of UI a plugin hands to the host for one tab.
///
/// The core never renders it; it only requires that one can be built. Hosts
/// downcast through [`DisplayUnit::as_any`] to their toolkit's widget type.
pub trait DisplayUnit: Send {
    /// Title shown on the tab
    fn title(&self) -> String;

    /// Plain-text rendering for text-mode hosts
    fn render_text(&self) -> String {
        String::new()
    }

    /// Access to the concrete type for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayUnit").field("title", &self.title()).finish()
    }
}

/// Core trait that all tab plugins must implement
pub trait TabPlugin: Send + Sync {
    /// Unique display and registration name
    fn name(&self) -> &str;

    /// Human-readable summary
    fn description(&self) -> &str;

    /// Platform identifiers this plugin claims to run on ("Windows", "Linux", "macOS")
    fn supported_platforms(&self) -> Vec<String>;

    /// Whether the plugin needs administrator privileges. Recorded, never enforced.
    fn requires_admin(&self) -> bool {
        false
    }

    /// The version of the plugin
    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Single author, used when [`TabPlugin::authors`] is empty
    fn author(&self) -> &str {
        "Unknown"
    }

    /// Optional list of authors; takes precedence over [`TabPlugin::author`]
    fn authors(&self) -> Vec<String> {
        Vec::new()
    }

    /// Plugins that start switched off until the user enables them
    fn disabled_by_default(&self) -> bool {
        false
    }

    /// Build the widget for this plugin's tab
    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError>;
}

/// Adapter turning metadata plus a closure into a [`TabPlugin`].
///
/// Handy for built-in tabs that do not warrant their own type.
pub struct FnTabPlugin<F> {
    name: String,
    description: String,
    platforms: Vec<String>,
    requires_admin: bool,
    factory: F,
}

impl<F> FnTabPlugin<F>
where
    F: Fn() -> Result<Box<dyn DisplayUnit>, PluginError> + Send + Sync,
{
    /// Create an adapter supporting every recognized platform
    pub fn new(name: &str, description: &str, factory: F) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            platforms: crate::plugin_system::platform::Platform::ALL
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            requires_admin: false,
            factory,
        }
    }

    /// Restrict the supported platforms
    pub fn with_platforms(mut self, platforms: &[&str]) -> Self {
        self.platforms = platforms.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Declare an administrator requirement
    pub fn with_requires_admin(mut self, requires_admin: bool) -> Self {
        self.requires_admin = requires_admin;
        self
    }
}

impl<F> TabPlugin for FnTabPlugin<F>
where
    F: Fn() -> Result<Box<dyn DisplayUnit>, PluginError> + Send + Sync,
{
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

    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        (self.factory)()
    }
}

/// A text-only display unit, enough for simple tabs and text-mode hosts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPanel {
    pub title: String,
    pub body: String,
}

impl TextPanel {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl DisplayUnit for TextPanel {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn render_text(&self) -> String {
        self.body.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
