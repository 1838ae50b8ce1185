/// Application name
pub const APP_NAME: &str = "Tabhost";

/// Core API version plugins are built against
pub const CORE_API_VERSION: &str = "0.1.0";

/// Compiler that built this crate, recorded by the build script
pub const RUSTC_VERSION: &str = env!("TABHOST_RUSTC_VERSION");

/// Namespace installed packages register tab plugins under
pub const ENTRY_POINT_NAMESPACE: &str = "tabhost_tabs";

/// Metadata file describing an installed package
pub const PACKAGE_METADATA_FILE: &str = "tabhost-package.toml";

/// Symbol every local plugin library exports
pub const PLUGIN_DECLARATION_SYMBOL: &str = "TAB_PLUGIN_DECLARATION";

/// Default plugins directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Source identifier prefix for built-in plugins
pub const CORE_SOURCE_PREFIX: &str = "core";
