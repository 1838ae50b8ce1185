use std::path::Path;
use std::sync::Arc;
use std::thread;

use log::{debug, trace};
use tokio::sync::oneshot;

use crate::kernel::constants::CORE_SOURCE_PREFIX;
use crate::kernel::error::Result;
use crate::plugin_system::descriptor::{Origin, PluginDescriptor};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::guard::guarded;
use crate::plugin_system::loader::{NativeLoader, PluginLoader};
use crate::plugin_system::package_index::{DirectoryPackageIndex, PackageIndex};
use crate::plugin_system::registry::{PluginRegistry, RegistryView};
use crate::plugin_system::scanner::{Candidate, EntryPointScanner, LocalScanner, Scanner};
use crate::plugin_system::traits::TabPlugin;
use crate::plugin_system::validator::{ValidationResult, Validator};
use crate::storage::config::DiscoverySettings;

/// Result a [`DiscoveryHandle`] resolves to
pub type DiscoveryOutcome = std::result::Result<RegistryView, PluginSystemError>;

/// Sequences registration of core plugins, scanning, validation and merging
pub struct Discovery {
    settings: DiscoverySettings,
    core_plugins: Vec<Arc<dyn TabPlugin>>,
    loader: Arc<dyn PluginLoader>,
    package_index: Arc<dyn PackageIndex>,
    validator: Validator,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new(DiscoverySettings::default())
    }
}

impl Discovery {
    /// Discovery over the directories named in `settings`, loading native libraries
    pub fn new(settings: DiscoverySettings) -> Self {
        let package_index = DirectoryPackageIndex::new(settings.package_dirs.clone());
        Self {
            settings,
            core_plugins: Vec::new(),
            loader: Arc::new(NativeLoader::new()),
            package_index: Arc::new(package_index),
            validator: Validator::new(),
        }
    }

    /// Discovery configured from a settings file
    pub fn from_settings_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DiscoverySettings::load(path)?))
    }

    /// Add a built-in plugin; core plugins are registered in the order added
    pub fn with_core_plugin<P: TabPlugin + 'static>(mut self, plugin: P) -> Self {
        self.core_plugins.push(Arc::new(plugin));
        self
    }

    /// Replace the loader used by both scanners
    pub fn with_loader<L: PluginLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Replace the installed package index
    pub fn with_package_index<I: PackageIndex + 'static>(mut self, index: I) -> Self {
        self.package_index = Arc::new(index);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Run one full discovery pass.
    ///
    /// Never fails: every problem ends up as a diagnostic in the returned
    /// view. Each call performs an independent merge.
    pub fn discover(&self) -> RegistryView {
        let mut registry =
            PluginRegistry::new(self.validator.platform()).with_settings(self.settings.clone());

        debug!("Registering {} core plugin(s)", self.core_plugins.len());
        self.register_all(&mut registry, self.core_candidates());

        for scanner in self.scanners() {
            debug!("Running {}", scanner.name());
            let candidates = scanner.scan();
            debug!("{} produced {} candidate(s)", scanner.name(), candidates.len());
            self.register_all(&mut registry, candidates);
        }

        let view = registry.into_view();
        debug!(
            "Discovery finished: {} registered, {} outcome(s) recorded",
            view.all().len(),
            view.diagnostics().len()
        );
        view
    }

    /// Run discovery on a dedicated thread.
    ///
    /// The returned handle always resolves, with [`PluginSystemError::DiscoveryAborted`]
    /// if the run itself did not complete.
    pub fn spawn(self) -> DiscoveryHandle {
        let (sender, receiver) = oneshot::channel();

        let spawned = thread::Builder::new()
            .name("tabhost-discovery".to_string())
            .spawn(move || {
                let outcome = guarded(|| self.discover()).map_err(PluginSystemError::DiscoveryAborted);
                if sender.send(outcome).is_err() {
                    trace!("Discovery handle dropped before the result arrived");
                }
            });

        if let Err(e) = spawned {
            debug!("Failed to start discovery thread: {}", e);
        }

        DiscoveryHandle {
            receiver,
            resolved: false,
        }
    }

    fn scanners(&self) -> Vec<Box<dyn Scanner>> {
        vec![
            Box::new(EntryPointScanner::new(
                self.settings.entry_point_namespace.clone(),
                Arc::clone(&self.package_index),
                Arc::clone(&self.loader),
            )),
            Box::new(
                LocalScanner::new(self.settings.plugins_dir.clone(), Arc::clone(&self.loader))
                    .with_skip_files(self.settings.skip_files.iter().cloned()),
            ),
        ]
    }

    fn core_candidates(&self) -> Vec<Candidate> {
        self.core_plugins
            .iter()
            .enumerate()
            .map(|(position, plugin)| {
                let source_identifier = guarded(|| format!("{}:{}", CORE_SOURCE_PREFIX, plugin.name()))
                    .unwrap_or_else(|_| format!("{}:#{}", CORE_SOURCE_PREFIX, position));
                match PluginDescriptor::from_plugin(Arc::clone(plugin), Origin::Core, source_identifier.clone()) {
                    Ok(descriptor) => Candidate::Found(descriptor),
                    Err(error) => Candidate::failed(Origin::Core, source_identifier, error),
                }
            })
            .collect()
    }

    fn register_all(&self, registry: &mut PluginRegistry, candidates: Vec<Candidate>) {
        for candidate in candidates {
            let result = match candidate {
                Candidate::Found(descriptor) => self.validator.validate(&descriptor),
                Candidate::Failed {
                    origin,
                    source_identifier,
                    error,
                } => ValidationResult::failure(origin, source_identifier, &error),
            };
            trace!("{} -> {}", result.source_identifier, result.status);
            registry.register(result);
        }
    }
}

/// One-shot completion signal of a background discovery run
#[derive(Debug)]
pub struct DiscoveryHandle {
    receiver: oneshot::Receiver<DiscoveryOutcome>,
    resolved: bool,
}

impl DiscoveryHandle {
    fn closed() -> PluginSystemError {
        PluginSystemError::DiscoveryAborted("discovery thread ended without a result".to_string())
    }

    /// Poll without blocking, e.g. from a UI event loop.
    ///
    /// Returns `Some` exactly once; `None` before the run finishes and after
    /// the outcome has been taken.
    pub fn try_take(&mut self) -> Option<DiscoveryOutcome> {
        if self.resolved {
            return None;
        }
        let outcome = match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(Self::closed()),
        };
        self.resolved = true;
        Some(outcome)
    }

    /// Wait for the outcome asynchronously
    pub async fn wait(self) -> DiscoveryOutcome {
        self.receiver.await.unwrap_or_else(|_| Err(Self::closed()))
    }

    /// Block the current thread until the outcome arrives.
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_wait(self) -> DiscoveryOutcome {
        self.receiver.blocking_recv().unwrap_or_else(|_| Err(Self::closed()))
    }
}

#[cfg(test)]
impl DiscoveryHandle {
    /// Handle fed by the returned sender instead of a discovery thread
    pub(crate) fn detached() -> (oneshot::Sender<DiscoveryOutcome>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                receiver,
                resolved: false,
            },
        )
    }
}
