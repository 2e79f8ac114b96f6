//! Host interface.
//!
//! The automaton never talks to the game directly. World queries, the use
//! gesture and user-visible output are ports implemented by whoever embeds
//! the controller; events arrive over a tokio channel as [`HostEvent`]s.

use crate::error::HostError;
use crate::geometry::{AgentPosition, CellCoordinate};
use serde::{Deserialize, Serialize};

/// The stack in a hand. `count <= 0` means nothing is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldItem {
    pub item_id: String,
    pub count: i32,
}

impl HeldItem {
    pub fn new(item_id: impl Into<String>, count: i32) -> Self {
        Self {
            item_id: item_id.into(),
            count,
        }
    }

    pub fn is_present(&self) -> bool {
        self.count > 0
    }
}

/// A single observed block change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub cell: CellCoordinate,
    pub previous_state: String,
    pub new_state: String,
}

impl TransitionEvent {
    pub fn new(
        cell: CellCoordinate,
        previous_state: impl Into<String>,
        new_state: impl Into<String>,
    ) -> Self {
        Self {
            cell,
            previous_state: previous_state.into(),
            new_state: new_state.into(),
        }
    }
}

/// Everything the host delivers, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    BlockUpdate(TransitionEvent),
    /// Raw outgoing chat line; only lines starting with the command prefix
    /// are acted on.
    ChatCommand(String),
}

/// Side-effect-free queries against the world.
pub trait WorldQueries: Send + Sync {
    fn agent_position(&self) -> Result<AgentPosition, HostError>;

    /// Current off-hand stack, `None` when the hand is empty.
    fn offhand_item(&self) -> Result<Option<HeldItem>, HostError>;
}

/// Press and release of the use action. Both are safe to call redundantly.
pub trait UseGesture: Send + Sync {
    fn begin_use(&self);
    fn end_use(&self);
}

/// User-visible output (chat echo).
pub trait Notifier: Send + Sync {
    fn notify(&self, text: &str);
}
