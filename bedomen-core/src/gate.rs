//! Trigger gate: cooldown, per-cell debounce and distance.
//!
//! Order matters and is observable:
//!
//! 1. disabled → nothing, no bookkeeping
//! 2. close → remember the cell as closed
//! 3. anything but an open → nothing
//! 4. global cooldown active → nothing (cell history untouched)
//! 5. cell already known open → nothing (duplicate open)
//! 6. remember the cell as open
//! 7. too far → nothing; a later approach is not retried
//! 8. fire, arming the cooldown in the same step
//!
//! There is a single global action slot. Several cells opening inside one
//! cooldown window fire once, for whichever was admitted first.

use crate::classify::Transition;
use crate::error::HostError;
use crate::geometry::{distance_to_cell_center, AgentPosition, CellCoordinate};
use crate::state::AutomatonState;
use std::time::Duration;
use tokio::time::Instant;

/// Parameters the gate needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    pub trigger_distance: f64,
    pub cooldown: Duration,
}

/// Result of running one transition through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Disabled,
    Irrelevant,
    ClosedRecorded,
    CoolingDown { remaining: Duration },
    AlreadyOpen,
    /// The position query failed after the cell was recorded open.
    PositionUnavailable { error: String },
    OutOfRange { distance: f64 },
    Fire { distance: f64 },
}

impl GateDecision {
    pub fn should_fire(&self) -> bool {
        matches!(self, GateDecision::Fire { .. })
    }
}

/// Evaluate a classified transition for `cell` at `now`.
///
/// `position` is only called once the transition has passed cooldown and
/// debounce, so the agent position is sampled at decision time.
pub fn evaluate<F>(
    state: &mut AutomatonState,
    cell: CellCoordinate,
    transition: Transition,
    now: Instant,
    config: &GateConfig,
    position: F,
) -> GateDecision
where
    F: FnOnce() -> Result<AgentPosition, HostError>,
{
    if !state.enabled {
        return GateDecision::Disabled;
    }

    match transition {
        Transition::ClosedNow => {
            state.record_cell(cell, false);
            return GateDecision::ClosedRecorded;
        }
        Transition::Irrelevant => return GateDecision::Irrelevant,
        Transition::OpenedNow => {}
    }

    if let Some(remaining) = state.cooldown_remaining(now) {
        return GateDecision::CoolingDown { remaining };
    }

    if state.known_open(cell) == Some(true) {
        return GateDecision::AlreadyOpen;
    }
    state.record_cell(cell, true);

    // A failed sample skips the event but the cell stays recorded as open,
    // so it is debounced until a close is observed.
    let agent = match position() {
        Ok(agent) => agent,
        Err(e) => {
            return GateDecision::PositionUnavailable {
                error: e.to_string(),
            }
        }
    };

    let distance = distance_to_cell_center(agent, cell);
    if distance > config.trigger_distance {
        return GateDecision::OutOfRange { distance };
    }

    state.arm_cooldown(now, config.cooldown);
    GateDecision::Fire { distance }
}
