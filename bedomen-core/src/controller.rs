//! Automaton controller.
//!
//! Single owner of [`AutomatonState`]. Events are handled strictly in
//! delivery order on one task, so a command that arrives between two block
//! updates applies before the second one is evaluated. Nothing raised while
//! handling an event escapes the loop.

use crate::classify::TrapdoorClassifier;
use crate::command::Command;
use crate::config::AutomatonConfig;
use crate::error::CommandError;
use crate::executor::{ConsumptionOutcome, Executor};
use crate::gate::{self, GateConfig, GateDecision};
use crate::geometry::CellCoordinate;
use crate::host::{HostEvent, Notifier, TransitionEvent, UseGesture, WorldQueries};
use crate::marker::LogMarker;
use crate::state::AutomatonState;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

const ACK_PREFIX: &str = "BedOmen:";
const LOG_PREFIX: &str = "[BedOmen Log]";

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventReport {
    /// Chat line not addressed to the automaton.
    Ignored,
    Command { command: Command, changed: bool },
    CommandRejected(CommandError),
    /// Block update that did not fire.
    Gate {
        cell: CellCoordinate,
        decision: GateDecision,
    },
    Fired {
        cell: CellCoordinate,
        distance: f64,
        outcome: ConsumptionOutcome,
    },
}

/// The trapdoor automaton.
pub struct Automaton {
    config: AutomatonConfig,
    classifier: TrapdoorClassifier,
    gate: GateConfig,
    executor: Executor,
    marker: Option<LogMarker>,
    state: AutomatonState,
    world: Arc<dyn WorldQueries>,
    gesture: Arc<dyn UseGesture>,
    notifier: Arc<dyn Notifier>,
}

impl Automaton {
    /// Create a disabled automaton. The logging flag starts from the marker
    /// file when one is configured, otherwise from `logging_default`.
    pub fn new(
        config: AutomatonConfig,
        world: Arc<dyn WorldQueries>,
        gesture: Arc<dyn UseGesture>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let marker = config.log_marker_path.clone().map(LogMarker::new);
        let logging_enabled = marker
            .as_ref()
            .map(LogMarker::is_set)
            .unwrap_or(config.logging_default);

        Self {
            classifier: TrapdoorClassifier::new(
                config.trapdoor_marker.clone(),
                config.require_strict_prior_closed,
            ),
            gate: GateConfig {
                trigger_distance: config.trigger_distance,
                cooldown: config.cooldown(),
            },
            executor: Executor::new(config.item_id.clone(), config.verification),
            marker,
            state: AutomatonState::new(logging_enabled),
            config,
            world,
            gesture,
            notifier,
        }
    }

    pub fn state(&self) -> &AutomatonState {
        &self.state
    }

    pub fn config(&self) -> &AutomatonConfig {
        &self.config
    }

    /// Receive and handle events until the channel closes or `shutdown`
    /// turns true. The receive is bounded so shutdown is noticed while idle;
    /// an event in flight is abandoned on shutdown, which releases the use
    /// gesture through the executor's guard.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<HostEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            trigger_distance = self.config.trigger_distance,
            cooldown_ms = self.config.cooldown_ms,
            strict = self.classifier.is_strict(),
            verification = ?self.config.verification,
            "automaton loop started"
        );
        self.log_if_enabled("Event loop started. Waiting for trapdoors...");

        let receive_timeout = self.config.receive_timeout();
        loop {
            if *shutdown.borrow() {
                info!("shutdown requested");
                break;
            }

            let event = match timeout(receive_timeout, events.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => {
                    debug!("event channel closed");
                    break;
                }
                Err(_) => continue,
            };

            tokio::select! {
                report = self.handle_event(event) => {
                    debug!(?report, "event handled");
                }
                _ = shutdown_signalled(&mut shutdown) => {
                    info!("shutdown requested while handling an event");
                    break;
                }
            }
        }

        self.log_if_enabled("Event loop stopped.");
        info!("automaton loop stopped");
    }

    pub async fn handle_event(&mut self, event: HostEvent) -> EventReport {
        match event {
            HostEvent::ChatCommand(text) => self.handle_command(&text),
            HostEvent::BlockUpdate(update) => self.handle_block_update(&update).await,
        }
    }

    pub fn handle_command(&mut self, text: &str) -> EventReport {
        let parsed = Command::parse(
            text,
            &self.config.command_prefix,
            self.config.bare_command_toggles,
        );
        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => return EventReport::Ignored,
            Err(e) => {
                debug!(error = %e, "rejected command");
                self.notify(&e.to_string());
                return EventReport::CommandRejected(e);
            }
        };

        let changed = match command {
            Command::Enable => self.set_enabled(true),
            Command::Disable => self.set_enabled(false),
            Command::Toggle => self.set_enabled(!self.state.enabled),
            Command::SetLogging(on) => self.set_logging(on),
            Command::Status => {
                self.report_status();
                false
            }
        };
        EventReport::Command { command, changed }
    }

    pub async fn handle_block_update(&mut self, update: &TransitionEvent) -> EventReport {
        let cell = update.cell;
        let transition = self
            .classifier
            .classify(&update.previous_state, &update.new_state);

        let now = Instant::now();
        let world = Arc::clone(&self.world);
        let decision = gate::evaluate(&mut self.state, cell, transition, now, &self.gate, || {
            world.agent_position()
        });
        debug!(%cell, ?transition, ?decision, "gate evaluated");

        let distance = match decision {
            GateDecision::Fire { distance } => distance,
            suppressed => {
                self.log_suppressed(cell, &suppressed);
                return EventReport::Gate {
                    cell,
                    decision: suppressed,
                };
            }
        };

        info!(%cell, distance, "trapdoor opened in range, drinking");
        self.log_if_enabled(&format!(
            "Trapdoor opened within range ({distance:.2} m). Drinking..."
        ));

        let report = self
            .executor
            .execute(self.world.as_ref(), self.gesture.as_ref())
            .await;

        match report.outcome {
            ConsumptionOutcome::NoItemPresent => {
                info!(item = %self.executor.item_id(), "nothing to drink in off-hand");
                self.notify(&format!(
                    "{ACK_PREFIX} no {} in the off-hand.",
                    self.executor.item_id()
                ));
            }
            ConsumptionOutcome::Consumed => {
                info!(held_ms = report.held_for.as_millis() as u64, "bottle consumed");
                self.log_if_enabled("Bottle consumed.");
            }
            ConsumptionOutcome::TimedOutUnconfirmed => {
                warn!(
                    held_ms = report.held_for.as_millis() as u64,
                    polls = report.polls,
                    "could not confirm consumption"
                );
                self.log_if_enabled("Could not confirm the bottle was consumed.");
            }
        }

        EventReport::Fired {
            cell,
            distance,
            outcome: report.outcome,
        }
    }

    fn log_suppressed(&self, cell: CellCoordinate, decision: &GateDecision) {
        match decision {
            GateDecision::CoolingDown { remaining } => self.log_if_enabled(&format!(
                "Trapdoor opened at {cell} ignored: cooldown, {:.1}s left.",
                remaining.as_secs_f64()
            )),
            GateDecision::OutOfRange { distance } => self.log_if_enabled(&format!(
                "Trapdoor opened at {cell}, but too far ({distance:.2} m)."
            )),
            GateDecision::PositionUnavailable { error } => {
                warn!(%cell, %error, "player position unavailable, skipping trapdoor");
                self.log_if_enabled(&format!("Could not read player position: {error}"));
            }
            _ => {}
        }
    }

    /// Returns whether the state changed. Enabling re-arms immediately.
    fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.state.enabled == enabled {
            let word = on_off(enabled);
            self.notify(&format!("{ACK_PREFIX} auto-drink is already {word}."));
            return false;
        }

        self.state.enabled = enabled;
        if enabled {
            self.state.reset_cooldown();
        }
        info!(enabled, "automaton enablement changed");
        let word = if enabled { "enabled" } else { "disabled" };
        self.notify(&format!("{ACK_PREFIX} auto-drink {word}."));
        true
    }

    fn set_logging(&mut self, on: bool) -> bool {
        let word = on_off(on);
        if self.state.logging_enabled == on {
            self.notify(&format!("{ACK_PREFIX} logging is already {word}."));
            return false;
        }

        if let Some(marker) = &self.marker {
            if let Err(e) = marker.set(on) {
                warn!(error = %e, "could not persist logging flag");
                self.notify(&format!("{ACK_PREFIX} could not turn logging {word}: {e}"));
                return false;
            }
        }

        self.state.logging_enabled = on;
        info!(logging = on, "logging flag changed");
        self.notify(&format!("{ACK_PREFIX} logging {word}."));
        true
    }

    fn report_status(&self) {
        let cooldown = match self.state.cooldown_remaining(Instant::now()) {
            Some(remaining) => format!("{:.1}s left", remaining.as_secs_f64()),
            None => "ready".to_string(),
        };
        self.notify(&format!(
            "{ACK_PREFIX} auto-drink {}, logging {}, cooldown {cooldown}.",
            on_off(self.state.enabled),
            on_off(self.state.logging_enabled),
        ));
    }

    fn notify(&self, text: &str) {
        self.notifier.notify(text);
    }

    fn log_if_enabled(&self, text: &str) {
        if self.state.logging_enabled {
            self.notifier.notify(&format!("{LOG_PREFIX} {text}"));
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Resolves once the flag reads true. A dropped sender never signals.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
