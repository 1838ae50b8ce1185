use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use log::{debug, trace};

use crate::kernel::constants::{PLUGIN_DECLARATION_SYMBOL, RUSTC_VERSION};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::ffi::PluginDeclaration;
use crate::plugin_system::guard::guarded;
use crate::plugin_system::package_index::EntryPoint;
use crate::plugin_system::traits::{DisplayUnit, PluginError, TabPlugin};
use crate::plugin_system::version::core_api_requirement;

/// Turns plugin sources into plugin objects.
///
/// Implementations isolate plugin constructor panics and report every
/// failure as a [`PluginSystemError`] attributed to the source.
pub trait PluginLoader: Send + Sync {
    /// Load the plugin a local library file declares
    fn load_file(&self, path: &Path) -> Result<Box<dyn TabPlugin>, PluginSystemError>;

    /// Resolve an installed package entry point
    fn resolve_entry(&self, entry: &EntryPoint) -> Result<Box<dyn TabPlugin>, PluginSystemError>;
}

/// File name of a dynamic library for the current platform, e.g. `libfoo.so`
pub fn library_file_name(module: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        module,
        std::env::consts::DLL_SUFFIX
    )
}

/// Whether `path` carries the platform's dynamic library extension
pub fn is_library_file(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext == std::env::consts::DLL_EXTENSION)
}

/// Loader for plugins compiled as native dynamic libraries
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLoader;

impl NativeLoader {
    pub fn new() -> Self {
        Self
    }

    fn load_declared(
        &self,
        path: &Path,
        symbol: &str,
        source_identifier: &str,
    ) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        let load_error = |message: String| PluginSystemError::LoadError {
            source_identifier: source_identifier.to_string(),
            path: Some(path.to_path_buf()),
            message,
        };

        trace!("Opening plugin library {}", path.display());
        // SAFETY: loading a library runs its initializers; plugin files are
        // trusted to be tab plugins built for this host.
        let library = unsafe { Library::new(path) }
            .map_err(|e| load_error(format!("not a loadable library: {}", e)))?;

        let (core_version, rustc_version, create) = {
            // SAFETY: the symbol is declared by `declare_tab_plugin!` as a
            // `PluginDeclaration` static; its address stays valid while `library` is mapped.
            let declaration: Symbol<*const PluginDeclaration> = unsafe { library.get(symbol.as_bytes()) }
                .map_err(|e| load_error(format!("missing symbol '{}': {}", symbol, e)))?;
            let declaration: *const PluginDeclaration = *declaration;
            if declaration.is_null() {
                return Err(load_error(format!("symbol '{}' is null", symbol)));
            }
            let declaration = unsafe { &*declaration };
            (
                declaration.core_version.to_string(),
                declaration.rustc_version.to_string(),
                declaration.create,
            )
        };

        let requirement = core_api_requirement();
        match requirement.includes_str(&core_version) {
            Ok(true) => {}
            Ok(false) => {
                return Err(PluginSystemError::contract(
                    source_identifier,
                    format!(
                        "built against core API {}, host requires {}",
                        core_version, requirement
                    ),
                ));
            }
            Err(e) => {
                return Err(PluginSystemError::contract(
                    source_identifier,
                    format!("unreadable core API version: {}", e),
                ));
            }
        }

        if rustc_version != RUSTC_VERSION {
            return Err(PluginSystemError::contract(
                source_identifier,
                format!(
                    "compiler mismatch: plugin built with '{}', host built with '{}'",
                    rustc_version, RUSTC_VERSION
                ),
            ));
        }

        let plugin = guarded(create)
            .map_err(|panic_msg| load_error(format!("panic in plugin constructor: {}", panic_msg)))?;

        debug!("Loaded plugin declaration '{}' from {}", symbol, path.display());
        Ok(Box::new(LibraryBackedPlugin {
            plugin,
            library: Arc::new(library),
        }))
    }
}

impl PluginLoader for NativeLoader {
    fn load_file(&self, path: &Path) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        let source_identifier = path.display().to_string();
        self.load_declared(path, PLUGIN_DECLARATION_SYMBOL, &source_identifier)
    }

    fn resolve_entry(&self, entry: &EntryPoint) -> Result<Box<dyn TabPlugin>, PluginSystemError> {
        let source_identifier = entry.source_identifier();
        let path = entry.location.join(library_file_name(&entry.module));
        if !path.is_file() {
            return Err(PluginSystemError::LoadError {
                source_identifier,
                path: Some(path),
                message: format!("module '{}' not found in package '{}'", entry.module, entry.package),
            });
        }
        self.load_declared(&path, &entry.symbol, &source_identifier)
    }
}

/// Plugin that keeps its library mapped.
///
/// Field order matters: `plugin` is dropped before `library`.
struct LibraryBackedPlugin {
    plugin: Box<dyn TabPlugin>,
    library: Arc<Library>,
}

impl TabPlugin for LibraryBackedPlugin {
    fn name(&self) -> &str {
        self.plugin.name()
    }

    fn description(&self) -> &str {
        self.plugin.description()
    }

    fn supported_platforms(&self) -> Vec<String> {
        self.plugin.supported_platforms()
    }

    fn requires_admin(&self) -> bool {
        self.plugin.requires_admin()
    }

    fn version(&self) -> &str {
        self.plugin.version()
    }

    fn author(&self) -> &str {
        self.plugin.author()
    }

    fn authors(&self) -> Vec<String> {
        self.plugin.authors()
    }

    fn disabled_by_default(&self) -> bool {
        self.plugin.disabled_by_default()
    }

    fn create_widget(&self) -> Result<Box<dyn DisplayUnit>, PluginError> {
        let widget = self.plugin.create_widget()?;
        Ok(Box::new(LibraryBackedWidget {
            widget,
            _library: Arc::clone(&self.library),
        }))
    }
}

/// Widget created by library code; outlives neither its code nor its vtable
struct LibraryBackedWidget {
    widget: Box<dyn DisplayUnit>,
    _library: Arc<Library>,
}

impl DisplayUnit for LibraryBackedWidget {
    fn title(&self) -> String {
        self.widget.title()
    }

    fn render_text(&self) -> String {
        self.widget.render_text()
    }

    fn as_any(&self) -> &dyn Any {
        self.widget.as_any()
    }
}
