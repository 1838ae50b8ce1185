use std::sync::Arc;

use log::debug;

use crate::plugin_system::descriptor::Origin;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::guard::guarded;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::package_index::PackageIndex;
use crate::plugin_system::scanner::{load_candidate, Candidate, Scanner};

/// Resolves the entries installed packages register under one namespace
pub struct EntryPointScanner {
    namespace: String,
    index: Arc<dyn PackageIndex>,
    loader: Arc<dyn PluginLoader>,
}

impl EntryPointScanner {
    pub fn new(
        namespace: impl Into<String>,
        index: Arc<dyn PackageIndex>,
        loader: Arc<dyn PluginLoader>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            index,
            loader,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Source a failed index item is attributed to
    fn failure_source(&self, error: &PluginSystemError) -> String {
        match error {
            PluginSystemError::MalformedEntryPoint {
                source_identifier, ..
            } => source_identifier.clone(),
            PluginSystemError::PackageMetadata { path, .. }
            | PluginSystemError::ScannerUnavailable { path: Some(path), .. } => path.display().to_string(),
            _ => self.name(),
        }
    }
}

impl Scanner for EntryPointScanner {
    fn name(&self) -> String {
        format!("entry-point-scanner:{}", self.namespace)
    }

    fn origin(&self) -> Origin {
        Origin::EntryPoint
    }

    fn scan(&self) -> Vec<Candidate> {
        let listed = guarded(|| self.index.entry_points(&self.namespace)).unwrap_or_else(|panic_msg| {
            Err(PluginSystemError::ScannerUnavailable {
                scanner: self.name(),
                path: None,
                message: format!("panic while enumerating packages: {}", panic_msg),
                source: None,
            })
        });

        let entries = match listed {
            Ok(entries) => entries,
            Err(error) => {
                debug!("Entry-point scanner unavailable: {}", error);
                return vec![Candidate::failed(Origin::EntryPoint, self.name(), error)];
            }
        };

        debug!("Entry-point scanner found {} entr(ies) under '{}'", entries.len(), self.namespace);
        entries
            .into_iter()
            .map(|entry| match entry {
                Ok(entry) => load_candidate(Origin::EntryPoint, entry.source_identifier(), || {
                    self.loader.resolve_entry(&entry)
                }),
                Err(error) => Candidate::failed(Origin::EntryPoint, self.failure_source(&error), error),
            })
            .collect()
    }
}
