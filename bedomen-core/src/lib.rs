//! Trapdoor-triggered consumption automaton.
//!
//! Watches block updates near the agent and, when a trapdoor swings open
//! within reach, drinks the bottle held in the off-hand. The crate is the
//! unified core of three deployed variants that differed only in trigger
//! distance, cooldown and how the drink is confirmed; those differences are
//! now configuration (see [`AutomatonConfig`]).
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────── HostEvent ────────────────┐
//!                 │                                            │
//!          BlockUpdate                                   ChatCommand
//!                 │                                            │
//!                 ▼                                            ▼
//!     TrapdoorClassifier ──► gate::evaluate ──► Executor    Command::parse
//!        (BlockState)        (cooldown, debounce,  (guarded     │
//!                             distance)            use gesture) │
//!                 │                 │                  │        │
//!                 └──────── Automaton (single owner of AutomatonState) ◄─┘
//!                                   │
//!                                   ▼
//!                          Notifier (user output)
//! ```
//!
//! The host itself (world queries, the use gesture, the chat sink and the
//! event queue) sits behind the traits in [`host`]. Everything runs on one
//! task; the only suspension points are the receive and the executor's poll
//! sleep, both on tokio's clock so tests can run on paused time.
//!
//! # Example
//!
//! ```ignore
//! use bedomen_core::{Automaton, AutomatonConfig, HostEvent};
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! let mut automaton = Automaton::new(AutomatonConfig::default(), world, gesture, notifier);
//! automaton.run(rx, shutdown).await;
//! ```

pub mod block_state;
pub mod classify;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod gate;
pub mod geometry;
pub mod host;
pub mod marker;
pub mod state;

pub use block_state::BlockState;
pub use classify::{TrapdoorClassifier, Transition};
pub use command::Command;
pub use config::{AutomatonConfig, VerificationMode};
pub use controller::{Automaton, EventReport};
pub use error::{CommandError, ConfigError, HostError, PersistenceError};
pub use executor::{ConsumptionOutcome, Executor};
pub use gate::GateDecision;
pub use geometry::{distance_to_cell_center, AgentPosition, CellCoordinate};
pub use host::{HeldItem, HostEvent, Notifier, TransitionEvent, UseGesture, WorldQueries};
pub use marker::LogMarker;
pub use state::AutomatonState;

/// Item the deployed variants drink.
pub const DEFAULT_ITEM_ID: &str = "minecraft:ominous_bottle";

/// Chat prefix that routes a message to the automaton.
pub const DEFAULT_COMMAND_PREFIX: &str = "\\potion";

/// Substring of a block id that identifies the trapdoor family.
pub const DEFAULT_TRAPDOOR_MARKER: &str = "trapdoor";

/// Default trigger radius in blocks, measured to the cell center.
pub const DEFAULT_TRIGGER_DISTANCE: f64 = 2.5;

/// Default global cooldown after a fire (milliseconds).
pub const DEFAULT_COOLDOWN_MS: u64 = 5_000;

/// Default bounded wait on the event queue (milliseconds).
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1_000;
