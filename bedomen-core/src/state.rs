//! Automaton state, owned exclusively by the controller.

use crate::geometry::CellCoordinate;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Mutable state of one automaton run.
///
/// Created disabled, with the cooldown already expired and no cell history.
/// Nothing here survives a restart except whatever the logging marker says.
#[derive(Debug, Clone)]
pub struct AutomatonState {
    pub enabled: bool,
    pub logging_enabled: bool,
    /// `None` means ready now.
    cooldown_deadline: Option<Instant>,
    /// Last observed open/closed per cell. Absence means unknown, not closed.
    /// Unbounded: entries are only overwritten, never evicted, for the life of
    /// the run.
    known_open_cells: HashMap<CellCoordinate, bool>,
}

impl AutomatonState {
    pub fn new(logging_enabled: bool) -> Self {
        Self {
            enabled: false,
            logging_enabled,
            cooldown_deadline: None,
            known_open_cells: HashMap::new(),
        }
    }

    pub fn cooldown_deadline(&self) -> Option<Instant> {
        self.cooldown_deadline
    }

    /// Time left on the global cooldown, if any.
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        self.cooldown_deadline
            .filter(|deadline| now < *deadline)
            .map(|deadline| deadline - now)
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooldown_remaining(now).is_some()
    }

    pub fn arm_cooldown(&mut self, now: Instant, cooldown: Duration) {
        self.cooldown_deadline = Some(now + cooldown);
    }

    pub fn reset_cooldown(&mut self) {
        self.cooldown_deadline = None;
    }

    pub fn known_open(&self, cell: CellCoordinate) -> Option<bool> {
        self.known_open_cells.get(&cell).copied()
    }

    pub fn record_cell(&mut self, cell: CellCoordinate, open: bool) {
        self.known_open_cells.insert(cell, open);
    }

    pub fn tracked_cells(&self) -> usize {
        self.known_open_cells.len()
    }
}
