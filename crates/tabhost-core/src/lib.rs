pub mod kernel;
pub mod plugin_system;
pub mod storage;

// Re-export key public types/traits for hosts and plugin crates
pub use kernel::constants::{CORE_API_VERSION, RUSTC_VERSION};
pub use kernel::error::Error as KernelError;
pub use plugin_system::{
    Discovery, DiscoveryHandle, DisplayUnit, PluginDescriptor, PluginError, RegistryView, TabPlugin,
    TextPanel,
};
pub use storage::DiscoverySettings;
