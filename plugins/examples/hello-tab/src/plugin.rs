//! Example dynamically loaded tab.
//!
//! Built as a `cdylib`, the library exports two declarations: the default
//! `TAB_PLUGIN_DECLARATION` picked up when the file is dropped into the
//! plugins directory, and `HELLO_TAB_ENTRY` for a
//! `tabhost-package.toml` next to the built library, such as:
//!
//! ```toml
//! [package]
//! name = "hello"
//!
//! [entry-points.tabhost_tabs]
//! hello = "hello_tab:HELLO_TAB_ENTRY"
//! ```
use std::any::Any;

use tabhost_core::plugin_system::{DisplayUnit, PluginError, TabPlugin};

struct Greeting {
    audience: String,
}

impl DisplayUnit for Greeting {
    fn title(&self) -> String {
        "Hello".to_string()
    }

    fn render_text(&self) -> String {
        format!("Hello from a dynamically loaded tab, {}!", self.audience)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct HelloTab {
    name: &'static str,
    audience: &'static str,
}

impl Default for HelloTab {
    fn default() -> Self {
        Self {
            name: "Hello",
            audience: "plugins directory",
        }
    }
}

impl HelloTab {
    /// Variant registered through the package index
    pub fn entry_point() -> Self {
        Self {
            name: "Hello (package)",
            audience: "package index",
        }
    }
}

impl TabPlugin for HelloTab {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Greets from a dynamically loaded library"
    }

    fn supported_platforms(&self) -> Vec<String> {
        vec!["Windows".to_string(), "Linux".to_string(), "macOS".to_string()]
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn author(&self) -> &str {
        "Tabhost Developers"
    }

    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        Ok(Box::new(Greeting {
            audience: self.audience.to_string(),
        }))
    }
}

tabhost_core::declare_tab_plugin!(HelloTab::default());
tabhost_core::declare_tab_plugin!(HELLO_TAB_ENTRY, HelloTab::entry_point());

#[cfg(test)]
mod tests;
