//! Simulated player.
//!
//! Implements the three host ports over a small in-memory model. Holding use
//! with a non-empty off-hand finishes one drink every `drink` of held time;
//! the stack shrinks when the next query observes the finished drink.

use bedomen_core::{AgentPosition, HeldItem, HostError, Notifier, UseGesture, WorldQueries};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

#[derive(Debug)]
struct PlayerState {
    position: AgentPosition,
    offhand: Option<HeldItem>,
    using_since: Option<Instant>,
    drinks: u32,
}

#[derive(Debug)]
pub struct SimulatedPlayer {
    state: Mutex<PlayerState>,
    drink: Duration,
}

impl SimulatedPlayer {
    pub fn new(position: AgentPosition, offhand: Option<HeldItem>, drink: Duration) -> Self {
        Self {
            state: Mutex::new(PlayerState {
                position,
                offhand,
                using_since: None,
                drinks: 0,
            }),
            drink,
        }
    }

    pub fn move_to(&self, position: AgentPosition) {
        if let Ok(mut state) = self.state.lock() {
            debug!(?position, "player moved");
            state.position = position;
        }
    }

    pub fn set_offhand(&self, offhand: Option<HeldItem>) {
        if let Ok(mut state) = self.state.lock() {
            debug!(?offhand, "off-hand replaced");
            state.offhand = offhand;
            if state.using_since.is_some() {
                state.using_since = Some(Instant::now());
            }
        }
    }

    /// Completed drinks so far.
    pub fn drinks(&self) -> u32 {
        self.state.lock().map_or(0, |s| s.drinks)
    }

    pub fn is_using(&self) -> bool {
        self.state.lock().map_or(false, |s| s.using_since.is_some())
    }

    fn lock(&self, query: &'static str) -> Result<MutexGuard<'_, PlayerState>, HostError> {
        self.state
            .lock()
            .map_err(|_| HostError::sampling(query, "player state poisoned"))
    }

    fn settle(&self, state: &mut PlayerState) {
        let Some(since) = state.using_since else {
            return;
        };
        if since.elapsed() < self.drink {
            return;
        }
        let Some(stack) = state.offhand.as_mut().filter(|s| s.is_present()) else {
            return;
        };
        stack.count -= 1;
        state.drinks += 1;
        trace!(left = stack.count, "drink finished");
        if stack.count <= 0 {
            state.offhand = None;
        }
        // still holding: the next drink starts now
        state.using_since = Some(Instant::now());
    }
}

impl WorldQueries for SimulatedPlayer {
    fn agent_position(&self) -> Result<AgentPosition, HostError> {
        Ok(self.lock("agent_position")?.position)
    }

    fn offhand_item(&self) -> Result<Option<HeldItem>, HostError> {
        let mut state = self.lock("offhand_item")?;
        self.settle(&mut state);
        Ok(state.offhand.clone())
    }
}

impl UseGesture for SimulatedPlayer {
    fn begin_use(&self) {
        if let Ok(mut state) = self.state.lock() {
            if state.using_since.is_none() {
                state.using_since = Some(Instant::now());
            }
        }
    }

    fn end_use(&self) {
        if let Ok(mut state) = self.state.lock() {
            self.settle(&mut state);
            state.using_since = None;
        }
    }
}

/// Prints notifications as chat lines on stdout.
#[derive(Debug, Default)]
pub struct ChatEcho;

impl Notifier for ChatEcho {
    fn notify(&self, text: &str) {
        println!("[chat] {text}");
    }
}
