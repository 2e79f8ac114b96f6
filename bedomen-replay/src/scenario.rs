//! Replay scenarios.
//!
//! A scenario is a YAML script: the player's starting position and off-hand,
//! an optional automaton config, and a list of timed steps. Steps either
//! deliver a host event (chat line, block update) or change the simulated
//! world (move the player, swap the off-hand stack).

use anyhow::{bail, Context, Result};
use bedomen_core::{AgentPosition, AutomatonConfig, HeldItem, TransitionEvent};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<AutomatonConfig>,
    pub player: PlayerSetup,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSetup {
    pub position: AgentPosition,
    #[serde(default)]
    pub offhand: Option<HeldItem>,
    /// Held-use time needed to finish one drink.
    #[serde(default = "default_drink_ms")]
    pub drink_ms: u64,
}

fn default_drink_ms() -> u64 {
    1_600
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    /// Offset from replay start.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Chat(String),
    Block(TransitionEvent),
    MoveTo(AgentPosition),
    SetOffhand(Option<HeldItem>),
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            config.validate()?;
        }
        if self.player.drink_ms == 0 {
            bail!("player.drink_ms must be greater than zero");
        }
        for pair in self.steps.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                bail!(
                    "steps must be in time order: {}ms follows {}ms",
                    pair[1].at_ms,
                    pair[0].at_ms
                );
            }
        }
        Ok(())
    }

    /// Time of the last step.
    pub fn duration_ms(&self) -> u64 {
        self.steps.last().map_or(0, |s| s.at_ms)
    }
}
