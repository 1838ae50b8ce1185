use tabhost_core::kernel::constants::{APP_NAME, CORE_API_VERSION};
use tabhost_core::plugin_system::{DisplayUnit, FnTabPlugin, PluginError, TabPlugin, TextPanel};

/// Built-in tab describing this installation
pub fn about_tab() -> impl TabPlugin {
    FnTabPlugin::new("About", "About this tabhost installation", about_panel)
}

fn about_panel() -> Result<Box<dyn DisplayUnit>, PluginError> {
    let body = format!(
        "{} {}\ncore API {}\nplatform {}",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        CORE_API_VERSION,
        std::env::consts::OS
    );
    Ok(Box::new(TextPanel::new("About", body)))
}
