//! Drives one scenario through the automaton.
//!
//! A feeder task walks the scenario steps on the tokio clock: host events go
//! into the bounded channel, world changes are applied to the simulated
//! player directly. The automaton runs on the calling task until the feeder
//! finishes (channel closed) or shutdown is signalled.

use crate::scenario::{Scenario, StepAction};
use crate::sim::SimulatedPlayer;
use anyhow::Result;
use bedomen_core::{Automaton, AutomatonConfig, HostEvent, Notifier, WorldQueries};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info};

const EVENT_QUEUE_DEPTH: usize = 64;

/// End state of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub drinks: u32,
    pub bottles_left: i32,
    pub enabled: bool,
    pub logging_enabled: bool,
}

pub async fn replay(
    scenario: Scenario,
    config: AutomatonConfig,
    notifier: Arc<dyn Notifier>,
    shutdown: watch::Receiver<bool>,
    linger: Duration,
) -> Result<ReplaySummary> {
    let player = Arc::new(SimulatedPlayer::new(
        scenario.player.position,
        scenario.player.offhand.clone(),
        Duration::from_millis(scenario.player.drink_ms),
    ));
    let mut automaton = Automaton::new(config, player.clone(), player.clone(), notifier);

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    info!(
        steps = scenario.steps.len(),
        duration_ms = scenario.duration_ms(),
        "replay started"
    );
    let feeder = tokio::spawn(feed(scenario, player.clone(), tx, linger));

    automaton.run(rx, shutdown).await;
    // no-op when the feeder already finished
    feeder.abort();

    let bottles_left = player.offhand_item()?.map_or(0, |stack| stack.count);
    let summary = ReplaySummary {
        drinks: player.drinks(),
        bottles_left,
        enabled: automaton.state().enabled,
        logging_enabled: automaton.state().logging_enabled,
    };
    info!(?summary, "replay finished");
    Ok(summary)
}

async fn feed(
    scenario: Scenario,
    player: Arc<SimulatedPlayer>,
    tx: mpsc::Sender<HostEvent>,
    linger: Duration,
) {
    let start = Instant::now();
    for step in scenario.steps {
        sleep_until(start + Duration::from_millis(step.at_ms)).await;
        let event = match step.action {
            StepAction::Chat(text) => HostEvent::ChatCommand(text),
            StepAction::Block(update) => HostEvent::BlockUpdate(update),
            StepAction::MoveTo(position) => {
                player.move_to(position);
                continue;
            }
            StepAction::SetOffhand(stack) => {
                player.set_offhand(stack);
                continue;
            }
        };
        debug!(at_ms = step.at_ms, ?event, "delivering");
        if tx.send(event).await.is_err() {
            debug!("automaton gone, feeder stopping");
            return;
        }
    }
    sleep(linger).await;
}
