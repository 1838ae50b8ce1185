//! Descriptor validation.
//!
//! Checks run in a fixed order and stop at the first failing check, keeping
//! every message that check produced:
//!
//! 1. required text fields are present
//! 2. declared platforms are recognized
//! 3. the current platform is among them
//! 4. the factory builds a widget
use std::fmt;

use serde::Serialize;

use crate::plugin_system::descriptor::{Origin, PluginDescriptor};
use crate::plugin_system::error::{ErrorKind, PluginSystemError};
use crate::plugin_system::guard::guarded;
use crate::plugin_system::platform::Platform;

/// Outcome of validating one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    IncompatiblePlatform,
    FactoryError,
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::IncompatiblePlatform => "incompatible platform",
            ValidationStatus::FactoryError => "factory error",
        };
        f.write_str(text)
    }
}

/// Validation outcome for one source, kept whether or not it succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// `None` when the source never produced a descriptor
    pub descriptor: Option<PluginDescriptor>,
    pub origin: Origin,
    pub source_identifier: String,
    pub status: ValidationStatus,
    pub messages: Vec<String>,
    /// Classification of the failure, `None` for valid results
    pub error_kind: Option<ErrorKind>,
}

impl ValidationResult {
    /// Result for a source that failed before yielding a descriptor
    pub fn failure(origin: Origin, source_identifier: impl Into<String>, error: &PluginSystemError) -> Self {
        Self {
            descriptor: None,
            origin,
            source_identifier: source_identifier.into(),
            status: ValidationStatus::Invalid,
            messages: vec![error.to_string()],
            error_kind: Some(error.kind()),
        }
    }

    fn for_descriptor(
        descriptor: &PluginDescriptor,
        status: ValidationStatus,
        messages: Vec<String>,
        error_kind: Option<ErrorKind>,
    ) -> Self {
        Self {
            descriptor: Some(descriptor.clone()),
            origin: descriptor.origin,
            source_identifier: descriptor.source_identifier.clone(),
            status,
            messages,
            error_kind,
        }
    }

    /// Registration name, if a descriptor exists
    pub fn name(&self) -> Option<&str> {
        self.descriptor.as_ref().map(|d| d.name.as_str())
    }

    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    pub(crate) fn push_message(&mut self, message: String) {
        self.messages.push(message);
    }
}

/// Pure validator; the platform it checks against is fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    platform: Option<Platform>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator for the platform this process runs on
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Validator for a given platform; `None` is an unrecognized host OS
    pub fn for_platform(platform: Option<Platform>) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn validate(&self, descriptor: &PluginDescriptor) -> ValidationResult {
        let invalid = |messages| {
            ValidationResult::for_descriptor(
                descriptor,
                ValidationStatus::Invalid,
                messages,
                Some(ErrorKind::ContractError),
            )
        };

        let messages = Self::check_required_fields(descriptor);
        if !messages.is_empty() {
            return invalid(messages);
        }

        let messages = Self::check_platform_identifiers(descriptor);
        if !messages.is_empty() {
            return invalid(messages);
        }

        let failure = self
            .check_current_platform(descriptor)
            .or_else(|| Self::check_factory(descriptor));
        if let Some(error) = failure {
            let status = match error.kind() {
                ErrorKind::IncompatiblePlatform => ValidationStatus::IncompatiblePlatform,
                _ => ValidationStatus::FactoryError,
            };
            return ValidationResult::for_descriptor(
                descriptor,
                status,
                vec![error.to_string()],
                Some(error.kind()),
            );
        }

        let mut messages = Vec::new();
        if descriptor.requires_admin {
            messages.push("requires administrator privileges".to_string());
        }
        ValidationResult::for_descriptor(descriptor, ValidationStatus::Valid, messages, None)
    }

    fn check_required_fields(descriptor: &PluginDescriptor) -> Vec<String> {
        [
            ("name", &descriptor.name),
            ("description", &descriptor.description),
            ("version", &descriptor.version),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| format!("missing required field '{}'", field))
        .collect()
    }

    fn check_platform_identifiers(descriptor: &PluginDescriptor) -> Vec<String> {
        if descriptor.supported_platforms.is_empty() {
            return vec!["no supported platforms declared".to_string()];
        }
        descriptor
            .supported_platforms
            .iter()
            .filter_map(|p| p.parse::<Platform>().err())
            .map(|e| e.to_string())
            .collect()
    }

    fn check_current_platform(&self, descriptor: &PluginDescriptor) -> Option<PluginSystemError> {
        let platform = match self.platform {
            Some(platform) if descriptor.supports(platform) => return None,
            Some(platform) => platform.to_string(),
            None => format!("unrecognized platform '{}'", std::env::consts::OS),
        };
        Some(PluginSystemError::IncompatiblePlatform {
            plugin_id: descriptor.source_identifier.clone(),
            platform,
            supported: descriptor
                .supported_platforms
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    fn check_factory(descriptor: &PluginDescriptor) -> Option<PluginSystemError> {
        // the built widget is dropped inside the guard too
        let message = match guarded(|| descriptor.create_widget().map(drop)) {
            Ok(Ok(())) => return None,
            Ok(Err(e)) => e.to_string(),
            Err(panic_msg) => format!("widget factory panicked: {}", panic_msg),
        };
        Some(PluginSystemError::FactoryError {
            plugin_id: descriptor.source_identifier.clone(),
            message,
        })
    }
}
