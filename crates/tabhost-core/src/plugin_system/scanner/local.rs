use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};

use crate::plugin_system::descriptor::Origin;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::loader::{is_library_file, PluginLoader};
use crate::plugin_system::scanner::{load_candidate, Candidate, Scanner};

/// Scans one directory (non-recursively) for plugin library files
pub struct LocalScanner {
    dir: PathBuf,
    skip_files: BTreeSet<String>,
    loader: Arc<dyn PluginLoader>,
}

impl LocalScanner {
    pub fn new(dir: impl Into<PathBuf>, loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            dir: dir.into(),
            skip_files: BTreeSet::new(),
            loader,
        }
    }

    /// File names (or stems) to ignore in addition to `_`-prefixed files
    pub fn with_skip_files<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_files.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let file_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let stem = path.file_stem().map(|n| n.to_string_lossy()).unwrap_or_default();
        file_name.starts_with('_')
            || self.skip_files.contains(&*file_name)
            || self.skip_files.contains(&*stem)
    }

    /// Library files in the directory, sorted by file name
    fn library_files(&self) -> Result<Vec<PathBuf>, PluginSystemError> {
        let unavailable = |message: &str, source: Option<std::io::Error>| {
            PluginSystemError::ScannerUnavailable {
                scanner: self.name(),
                path: Some(self.dir.clone()),
                message: message.to_string(),
                source,
            }
        };

        if !self.dir.exists() {
            debug!("Plugins directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }
        if !self.dir.is_dir() {
            return Err(unavailable("plugins path is not a directory", None));
        }

        let reader = fs::read_dir(&self.dir)
            .map_err(|e| unavailable("failed to read plugins directory", Some(e)))?;

        let mut files = Vec::new();
        for entry in reader {
            let path = entry
                .map_err(|e| unavailable("failed to read plugins directory", Some(e)))?
                .path();
            if !path.is_file() || !is_library_file(&path) {
                continue;
            }
            if self.is_skipped(&path) {
                trace!("Skipping {}", path.display());
                continue;
            }
            files.push(path);
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

impl Scanner for LocalScanner {
    fn name(&self) -> String {
        format!("local-scanner:{}", self.dir.display())
    }

    fn origin(&self) -> Origin {
        Origin::Local
    }

    fn scan(&self) -> Vec<Candidate> {
        let files = match self.library_files() {
            Ok(files) => files,
            Err(error) => {
                debug!("Local scanner unavailable: {}", error);
                return vec![Candidate::failed(Origin::Local, self.name(), error)];
            }
        };

        debug!("Local scanner found {} library file(s) in {}", files.len(), self.dir.display());
        files
            .into_iter()
            .map(|path| {
                let source_identifier = path.display().to_string();
                load_candidate(Origin::Local, source_identifier, || self.loader.load_file(&path))
            })
            .collect()
    }
}
