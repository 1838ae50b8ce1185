use std::fmt;

use serde::Serialize;

use crate::plugin_system::descriptor::Origin;
use crate::plugin_system::error::ErrorKind;

/// Record of one registration shadowing another with the same name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginOverride {
    /// Contested registration name
    pub name: String,
    /// Source identifier of the registration that won
    pub winner_source: String,
    pub winner_origin: Origin,
    /// Source identifier of the registration that was shadowed
    pub loser_source: String,
    pub loser_origin: Origin,
}

impl PluginOverride {
    /// Always [`ErrorKind::CollisionOverride`]; overrides are informational
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::CollisionOverride
    }

    /// Note attached to the loser's diagnostic entry
    pub fn note(&self) -> String {
        format!("overridden by {}", self.winner_source)
    }
}

impl fmt::Display for PluginOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' from {} ({}) overridden by {} ({})",
            self.name, self.loser_source, self.loser_origin, self.winner_source, self.winner_origin
        )
    }
}
