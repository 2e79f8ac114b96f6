//! Automaton configuration.
//!
//! The three deployed variants differ only in the values here, so each has a
//! named preset. Configuration files are YAML; every field is optional and
//! falls back to the in-loop variant's value.

use crate::error::ConfigError;
use crate::{
    DEFAULT_COMMAND_PREFIX, DEFAULT_COOLDOWN_MS, DEFAULT_ITEM_ID, DEFAULT_RECEIVE_TIMEOUT_MS,
    DEFAULT_TRAPDOOR_MARKER, DEFAULT_TRIGGER_DISTANCE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the executor decides the drink happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum VerificationMode {
    /// Hold the use gesture for a fixed time, then check once.
    BlindHold { duration_ms: u64 },
    /// Poll the off-hand every `poll_interval_ms` until the stack changes
    /// or `max_wait_ms` passes.
    PolledConfirmation {
        max_wait_ms: u64,
        poll_interval_ms: u64,
    },
}

impl VerificationMode {
    pub fn blind_hold(duration: Duration) -> Self {
        VerificationMode::BlindHold {
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn polled(max_wait: Duration, poll_interval: Duration) -> Self {
        VerificationMode::PolledConfirmation {
            max_wait_ms: max_wait.as_millis() as u64,
            poll_interval_ms: poll_interval.as_millis() as u64,
        }
    }
}

impl Default for VerificationMode {
    fn default() -> Self {
        VerificationMode::PolledConfirmation {
            max_wait_ms: 15_000,
            poll_interval_ms: 100,
        }
    }
}

/// Complete automaton configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonConfig {
    /// Maximum distance (blocks, to the cell center) at which an open fires.
    pub trigger_distance: f64,

    /// Global cooldown after a fire (ms).
    pub cooldown_ms: u64,

    /// Only count an open when the previous state was a closed trapdoor.
    pub require_strict_prior_closed: bool,

    pub verification: VerificationMode,

    /// Item id expected in the off-hand.
    pub item_id: String,

    /// Substring of the block id that marks a trapdoor.
    pub trapdoor_marker: String,

    /// Leading token of chat commands addressed to the automaton.
    pub command_prefix: String,

    /// Bare prefix toggles enablement instead of printing usage.
    pub bare_command_toggles: bool,

    /// Logging flag at start when no marker file is configured.
    pub logging_default: bool,

    /// Marker file whose presence means logging is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_marker_path: Option<PathBuf>,

    /// Bounded wait on the event queue (ms).
    pub receive_timeout_ms: u64,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            require_strict_prior_closed: false,
            verification: VerificationMode::default(),
            item_id: DEFAULT_ITEM_ID.to_string(),
            trapdoor_marker: DEFAULT_TRAPDOOR_MARKER.to_string(),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            bare_command_toggles: false,
            logging_default: true,
            log_marker_path: None,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
        }
    }
}

impl AutomatonConfig {
    /// Background variant: strict prior-closed check, 3 s confirmation
    /// window, logging persisted as a marker file.
    pub fn strict_polled() -> Self {
        Self {
            require_strict_prior_closed: true,
            verification: VerificationMode::PolledConfirmation {
                max_wait_ms: 3_000,
                poll_interval_ms: 100,
            },
            logging_default: false,
            log_marker_path: Some(PathBuf::from("bedomen_log_status.txt")),
            ..Self::default()
        }
    }

    /// Fixed-duration variant: hold use for 1.9 s without polling.
    pub fn blind_hold() -> Self {
        Self {
            verification: VerificationMode::BlindHold { duration_ms: 1_900 },
            bare_command_toggles: true,
            ..Self::default()
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AutomatonConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.trigger_distance.is_finite() && self.trigger_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "trigger_distance must be a positive number, got {}",
                self.trigger_distance
            )));
        }
        if self.item_id.trim().is_empty() {
            return Err(ConfigError::Invalid("item_id must not be empty".into()));
        }
        if self.trapdoor_marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "trapdoor_marker must not be empty".into(),
            ));
        }
        if self.command_prefix.trim().is_empty() || self.command_prefix.contains(char::is_whitespace)
        {
            return Err(ConfigError::Invalid(
                "command_prefix must be a single non-empty token".into(),
            ));
        }
        if self.receive_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "receive_timeout_ms must be greater than zero".into(),
            ));
        }
        match self.verification {
            VerificationMode::BlindHold { duration_ms: 0 } => Err(ConfigError::Invalid(
                "blind_hold duration_ms must be greater than zero".into(),
            )),
            VerificationMode::PolledConfirmation {
                poll_interval_ms: 0,
                ..
            } => Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".into(),
            )),
            VerificationMode::PolledConfirmation {
                max_wait_ms,
                poll_interval_ms,
            } if poll_interval_ms > max_wait_ms => Err(ConfigError::Invalid(format!(
                "poll_interval_ms ({poll_interval_ms}) exceeds max_wait_ms ({max_wait_ms})"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_in_loop_variant() {
        let config = AutomatonConfig::default();
        assert_eq!(config.trigger_distance, 2.5);
        assert_eq!(config.cooldown(), Duration::from_secs(5));
        assert!(!config.require_strict_prior_closed);
        assert_eq!(
            config.verification,
            VerificationMode::polled(Duration::from_secs(15), Duration::from_millis(100))
        );
        assert!(config.logging_default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn presets_validate() {
        assert!(AutomatonConfig::strict_polled().validate().is_ok());
        assert!(AutomatonConfig::blind_hold().validate().is_ok());
        assert!(AutomatonConfig::strict_polled().require_strict_prior_closed);
        assert_eq!(
            AutomatonConfig::blind_hold().verification,
            VerificationMode::blind_hold(Duration::from_millis(1_900))
        );
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
trigger_distance: 3.0
require_strict_prior_closed: true
verification:
  mode: blind_hold
  duration_ms: 1900
log_marker_path: "bedomen_log_status.txt"
"#;
        let config = AutomatonConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.trigger_distance, 3.0);
        assert!(config.require_strict_prior_closed);
        assert_eq!(
            config.verification,
            VerificationMode::BlindHold { duration_ms: 1900 }
        );
        assert_eq!(
            config.log_marker_path.as_deref(),
            Some(Path::new("bedomen_log_status.txt"))
        );
        // untouched fields keep defaults
        assert_eq!(config.cooldown_ms, DEFAULT_COOLDOWN_MS);
        assert_eq!(config.command_prefix, DEFAULT_COMMAND_PREFIX);
    }

    #[test]
    fn test_parse_polled_yaml() {
        let yaml = r#"
verification:
  mode: polled_confirmation
  max_wait_ms: 3000
  poll_interval_ms: 100
"#;
        let config = AutomatonConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.verification,
            VerificationMode::PolledConfirmation {
                max_wait_ms: 3000,
                poll_interval_ms: 100
            }
        );
    }

    #[test]
    fn rejects_inconsistent_values() {
        let err = AutomatonConfig::from_yaml("trigger_distance: -1.0").unwrap_err();
        assert!(err.to_string().contains("trigger_distance"));

        let yaml = r#"
verification:
  mode: polled_confirmation
  max_wait_ms: 50
  poll_interval_ms: 100
"#;
        let err = AutomatonConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AutomatonConfig::from_yaml("command_prefix: \"two words\"").unwrap_err();
        assert!(err.to_string().contains("command_prefix"));
    }

    #[test]
    fn rejects_unknown_verification_mode() {
        let err = AutomatonConfig::from_yaml("verification:\n  mode: guess\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AutomatonConfig::from_file("/nonexistent/bedomen.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
