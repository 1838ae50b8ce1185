//! Declaration exported by dynamically loaded tab plugins.
//!
//! A plugin library exports a [`PluginDeclaration`] static, normally through
//! [`declare_tab_plugin!`](crate::declare_tab_plugin). The loader compares
//! the recorded versions with its own before calling `create`; Rust trait
//! objects are only ABI-compatible between identical compilers and core API
//! series.
use crate::plugin_system::traits::TabPlugin;

/// Static record a plugin library exports
#[repr(C)]
pub struct PluginDeclaration {
    /// `CORE_API_VERSION` of the tabhost-core the plugin was built against
    pub core_version: &'static str,
    /// `rustc --version` output of the compiler that built the plugin
    pub rustc_version: &'static str,
    /// Constructor for the plugin object
    pub create: fn() -> Box<dyn TabPlugin>,
}

/// Export a [`PluginDeclaration`] for a plugin constructor expression.
///
/// ```ignore
/// tabhost_core::declare_tab_plugin!(HelloTab::default());
/// tabhost_core::declare_tab_plugin!(HELLO_TAB_ENTRY, HelloTab::entry_point());
/// ```
///
/// The one-argument form exports the symbol the local scanner looks for,
/// `TAB_PLUGIN_DECLARATION`. The two-argument form exports a named symbol
/// for package entry points.
#[macro_export]
macro_rules! declare_tab_plugin {
    ($ctor:expr) => {
        $crate::declare_tab_plugin!(TAB_PLUGIN_DECLARATION, $ctor);
    };
    ($symbol:ident, $ctor:expr) => {
        #[doc(hidden)]
        #[unsafe(no_mangle)]
        pub static $symbol: $crate::plugin_system::ffi::PluginDeclaration =
            $crate::plugin_system::ffi::PluginDeclaration {
                core_version: $crate::CORE_API_VERSION,
                rustc_version: $crate::RUSTC_VERSION,
                create: {
                    fn create() -> ::std::boxed::Box<dyn $crate::plugin_system::traits::TabPlugin> {
                        ::std::boxed::Box::new($ctor)
                    }
                    create
                },
            };
    };
}
