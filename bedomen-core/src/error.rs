//! Error types for the automaton.
//!
//! None of these are fatal to the event loop. The controller catches each at
//! the point it happens, turns it into a notification or a trace event, and
//! moves on to the next event.

use std::path::PathBuf;
use thiserror::Error;

/// A host query (agent position, held item) could not be answered.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("query '{query}' failed: {reason}")]
    QuerySampling { query: &'static str, reason: String },
}

impl HostError {
    pub fn sampling(query: &'static str, reason: impl Into<String>) -> Self {
        HostError::QuerySampling {
            query,
            reason: reason.into(),
        }
    }
}

/// Malformed control input. The display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Usage: {prefix} <on|off|toggle|status|log> [on|off]")]
    MissingSubcommand { prefix: String },

    #[error("Unknown subcommand '{given}'. Usage: {prefix} <on|off|toggle|status|log> [on|off]")]
    UnknownSubcommand { prefix: String, given: String },

    #[error("Usage: {prefix} log <on|off>")]
    MissingLogArgument { prefix: String },

    #[error("Unknown argument '{given}' for 'log'. Usage: {prefix} log <on|off>")]
    InvalidLogArgument { prefix: String, given: String },
}

/// The logging marker file could not be created or removed.
#[derive(Debug, Error)]
#[error("failed to {action} log marker {}: {source}", path.display())]
pub struct PersistenceError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display_carries_usage() {
        let err = CommandError::UnknownSubcommand {
            prefix: "\\potion".to_string(),
            given: "drink".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("drink"));
        assert!(text.contains("\\potion <on|off"));
    }

    #[test]
    fn host_error_display() {
        let err = HostError::sampling("player_position", "world not loaded");
        assert_eq!(
            err.to_string(),
            "query 'player_position' failed: world not loaded"
        );
    }

    #[test]
    fn persistence_error_names_path() {
        let err = PersistenceError {
            action: "remove",
            path: PathBuf::from("/tmp/bedomen_log_status.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("bedomen_log_status.txt"));
        assert!(err.to_string().contains("remove"));
    }
}
