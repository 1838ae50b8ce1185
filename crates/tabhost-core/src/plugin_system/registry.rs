use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use serde::Serialize;

use crate::plugin_system::conflict::PluginOverride;
use crate::plugin_system::descriptor::{Origin, PluginDescriptor, PluginInfo};
use crate::plugin_system::platform::Platform;
use crate::plugin_system::validator::{ValidationResult, ValidationStatus};
use crate::storage::config::DiscoverySettings;

/// A registered plugin and the outcome of validating it
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub descriptor: PluginDescriptor,
    pub validation: ValidationResult,
}

impl RegistryEntry {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn status(&self) -> ValidationStatus {
        self.validation.status
    }

    pub fn is_active(&self) -> bool {
        self.validation.is_valid()
    }
}

/// Merge point for every discovery channel.
///
/// Names are unique. On a collision a valid registration beats an invalid
/// one; otherwise the incoming registration wins when its origin ranks at
/// least as high as the existing one. The winner takes over the existing
/// entry's position. Nothing is ever removed, and every outcome keeps its own
/// diagnostic: a repeated source identifier is recorded as `<source>#<n>`.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    entries: Vec<RegistryEntry>,
    by_name: HashMap<String, usize>,
    diagnostics: BTreeMap<String, ValidationResult>,
    overrides: Vec<PluginOverride>,
    platform: Option<Platform>,
    settings: DiscoverySettings,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl PluginRegistry {
    /// Create an empty registry; `platform` is reported in plugin info
    pub fn new(platform: Option<Platform>) -> Self {
        Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            diagnostics: BTreeMap::new(),
            overrides: Vec::new(),
            platform,
            settings: DiscoverySettings::default(),
        }
    }

    /// Use the enabled/disabled overlay of `settings`
    pub fn with_settings(mut self, settings: DiscoverySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Record a validation outcome and, if it names a plugin, register it
    pub fn register(&mut self, mut result: ValidationResult) {
        let source = self.unique_source(&result.source_identifier);
        if source != result.source_identifier {
            trace!("Source {} already recorded, keeping this outcome as {}", result.source_identifier, source);
            result.source_identifier = source.clone();
            if let Some(descriptor) = result.descriptor.as_mut() {
                descriptor.source_identifier = source.clone();
            }
        }
        self.diagnostics.insert(source.clone(), result.clone());

        let descriptor = match &result.descriptor {
            Some(d) if !d.name.trim().is_empty() => d.clone(),
            _ => {
                trace!("Recorded diagnostic-only outcome for {}", source);
                return;
            }
        };

        let Some(&index) = self.by_name.get(&descriptor.name) else {
            debug!("Registered '{}' from {} ({})", descriptor.name, source, result.status);
            self.by_name.insert(descriptor.name.clone(), self.entries.len());
            self.entries.push(RegistryEntry {
                descriptor,
                validation: result,
            });
            return;
        };

        let existing = &self.entries[index];
        let incoming_wins = Self::takes_over(&result, &existing.validation);
        let (winner, loser) = if incoming_wins {
            (&descriptor, &existing.descriptor)
        } else {
            (&existing.descriptor, &descriptor)
        };
        let record = PluginOverride {
            name: descriptor.name.clone(),
            winner_source: winner.source_identifier.clone(),
            winner_origin: winner.origin,
            loser_source: loser.source_identifier.clone(),
            loser_origin: loser.origin,
        };
        debug!("{}", record);

        if let Some(diagnostic) = self.diagnostics.get_mut(&record.loser_source) {
            diagnostic.push_message(record.note());
        }
        self.overrides.push(record);

        if incoming_wins {
            self.entries[index] = RegistryEntry {
                descriptor,
                validation: result,
            };
        }
    }

    /// Whether `incoming` replaces `existing` under the same name.
    ///
    /// A valid outcome always beats an invalid one; between two valid (or two
    /// invalid) outcomes the higher or equal origin wins.
    fn takes_over(incoming: &ValidationResult, existing: &ValidationResult) -> bool {
        match (incoming.is_valid(), existing.is_valid()) {
            (true, false) => true,
            (false, true) => false,
            _ => incoming.origin >= existing.origin,
        }
    }

    /// `source`, or `source#<n>` when an earlier outcome already uses it
    fn unique_source(&self, source: &str) -> String {
        if !self.diagnostics.contains_key(source) {
            return source.to_string();
        }
        (2..)
            .map(|n| format!("{}#{}", source, n))
            .find(|candidate| !self.diagnostics.contains_key(candidate))
            .unwrap_or_else(|| source.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Freeze the registry into the view handed to the host
    pub fn into_view(self) -> RegistryView {
        RegistryView { registry: self }
    }
}

/// Immutable result of a discovery run
#[derive(Debug, Clone)]
pub struct RegistryView {
    registry: PluginRegistry,
}

impl RegistryView {
    /// Every registered entry in insertion order, whatever its status
    pub fn all(&self) -> &[RegistryEntry] {
        &self.registry.entries
    }

    /// Entries that passed validation
    pub fn active(&self) -> Vec<&RegistryEntry> {
        self.all().iter().filter(|e| e.is_active()).collect()
    }

    /// Every recorded outcome keyed by source identifier, valid ones included
    pub fn diagnostics(&self) -> &BTreeMap<String, ValidationResult> {
        &self.registry.diagnostics
    }

    /// Outcomes that are not valid
    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.diagnostics().values().filter(|r| !r.is_valid())
    }

    /// Name collisions resolved during the run
    pub fn overrides(&self) -> &[PluginOverride] {
        &self.registry.overrides
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.registry.get(name)
    }

    /// Registered names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.all().iter().map(|e| e.name()).collect()
    }

    /// Built-in entries
    pub fn core(&self) -> Vec<&RegistryEntry> {
        self.all().iter().filter(|e| e.descriptor.is_core()).collect()
    }

    /// Entries from packages and the plugins directory
    pub fn external(&self) -> Vec<&RegistryEntry> {
        self.all().iter().filter(|e| !e.descriptor.is_core()).collect()
    }

    /// Whether `name` is active and not switched off by the settings overlay
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).map_or(false, |e| self.entry_enabled(e))
    }

    /// Active entries not switched off by the settings overlay
    pub fn enabled(&self) -> Vec<&RegistryEntry> {
        self.all().iter().filter(|e| self.entry_enabled(e)).collect()
    }

    fn entry_enabled(&self, entry: &RegistryEntry) -> bool {
        entry.is_active()
            && self
                .registry
                .settings
                .is_enabled(entry.name(), entry.descriptor.disabled_by_default)
    }

    /// Platform the run validated against
    pub fn platform(&self) -> Option<Platform> {
        self.registry.platform
    }

    pub fn info(&self, name: &str) -> Option<PluginInfo> {
        self.get(name).map(|e| e.descriptor.info(self.platform()))
    }

    /// Serializable overview of the run
    pub fn summary(&self) -> DiscoverySummary {
        let mut by_origin = BTreeMap::new();
        let mut by_status = BTreeMap::new();
        for entry in self.all() {
            *by_origin.entry(entry.descriptor.origin).or_insert(0) += 1;
            *by_status.entry(entry.status()).or_insert(0) += 1;
        }

        DiscoverySummary {
            platform: self
                .platform()
                .map_or_else(|| std::env::consts::OS.to_string(), |p| p.as_str().to_string()),
            total: self.all().len(),
            active: self.active().len(),
            enabled: self.enabled().len(),
            failures: self.failures().count(),
            by_origin,
            by_status,
            plugins: self
                .all()
                .iter()
                .map(|e| SummaryEntry {
                    info: e.descriptor.info(self.platform()),
                    status: e.status(),
                    enabled: self.entry_enabled(e),
                    messages: e.validation.messages.clone(),
                })
                .collect(),
            overrides: self.overrides().to_vec(),
        }
    }
}

/// One plugin within a [`DiscoverySummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    #[serde(flatten)]
    pub info: PluginInfo,
    pub status: ValidationStatus,
    pub enabled: bool,
    pub messages: Vec<String>,
}

/// Counts and per-plugin details of a discovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverySummary {
    pub platform: String,
    pub total: usize,
    pub active: usize,
    pub enabled: usize,
    /// Non-valid outcomes, including sources that never yielded a descriptor
    pub failures: usize,
    pub by_origin: BTreeMap<Origin, usize>,
    pub by_status: BTreeMap<ValidationStatus, usize>,
    pub plugins: Vec<SummaryEntry>,
    pub overrides: Vec<PluginOverride>,
}
