use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Platforms a tab plugin can declare support for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

/// Error returned when a platform identifier is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl Platform {
    /// Every recognized platform
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::MacOs];

    /// The platform this process runs on, if recognized
    pub fn current() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a Rust target OS name (`std::env::consts::OS`) to a platform
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "windows" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            "macos" => Some(Platform::MacOs),
            _ => None,
        }
    }

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
        }
    }

    /// Whether a declared identifier names this platform
    pub fn matches(&self, identifier: &str) -> bool {
        identifier.parse::<Platform>().map_or(false, |p| p == *self)
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    /// Case-insensitive; accepts `darwin` as an alias for macOS
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" => Ok(Platform::MacOs),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
