//! Action executor: press use, confirm the drink, release.
//!
//! The use gesture is held by a [`GestureGuard`]. Releasing it is tied to the
//! guard's drop, so `end_use` runs exactly once on every exit path: success,
//! timeout, a panic in a host query, or the executor future being dropped by
//! a shutdown. A hard kill of the process can still leave the gesture held.
//!
//! Sleeping goes through `tokio::time`, which tests pause and auto-advance.

use crate::config::VerificationMode;
use crate::host::{HeldItem, UseGesture, WorldQueries};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};

/// How a consumption attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumptionOutcome {
    /// The expected item was not in the off-hand; use was never pressed.
    NoItemPresent,
    Consumed,
    /// No stack change observed within the window.
    TimedOutUnconfirmed,
}

/// Outcome plus what it took to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumptionReport {
    pub outcome: ConsumptionOutcome,
    /// Off-hand samples taken after pressing use.
    pub polls: u32,
    /// Time the gesture was held.
    pub held_for: Duration,
}

impl ConsumptionReport {
    fn not_started() -> Self {
        Self {
            outcome: ConsumptionOutcome::NoItemPresent,
            polls: 0,
            held_for: Duration::ZERO,
        }
    }
}

/// Holds the use gesture for as long as it lives.
struct GestureGuard<'a> {
    gesture: &'a dyn UseGesture,
}

impl<'a> GestureGuard<'a> {
    fn engage(gesture: &'a dyn UseGesture) -> Self {
        gesture.begin_use();
        Self { gesture }
    }

    fn release(self) {
        drop(self);
    }
}

impl Drop for GestureGuard<'_> {
    fn drop(&mut self) {
        self.gesture.end_use();
    }
}

/// Drives one consumption attempt against the host.
#[derive(Debug, Clone)]
pub struct Executor {
    item_id: String,
    mode: VerificationMode,
}

impl Executor {
    pub fn new(item_id: impl Into<String>, mode: VerificationMode) -> Self {
        Self {
            item_id: item_id.into(),
            mode,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Run one attempt. Never fails: query errors degrade to
    /// `NoItemPresent` before pressing and to "not yet confirmed" after.
    pub async fn execute(
        &self,
        world: &dyn WorldQueries,
        gesture: &dyn UseGesture,
    ) -> ConsumptionReport {
        let initial_count = match world.offhand_item() {
            Ok(Some(stack)) if self.is_expected(&stack) => stack.count,
            Ok(_) => return ConsumptionReport::not_started(),
            Err(e) => {
                warn!(error = %e, "off-hand query failed before use");
                return ConsumptionReport::not_started();
            }
        };

        let started = Instant::now();
        let guard = GestureGuard::engage(gesture);
        debug!(item = %self.item_id, initial_count, mode = ?self.mode, "use pressed");

        let (outcome, polls) = match self.mode {
            VerificationMode::BlindHold { duration_ms } => {
                sleep(Duration::from_millis(duration_ms)).await;
                let outcome = if self.sample_consumed(world, initial_count) {
                    ConsumptionOutcome::Consumed
                } else {
                    ConsumptionOutcome::TimedOutUnconfirmed
                };
                (outcome, 1)
            }
            VerificationMode::PolledConfirmation {
                max_wait_ms,
                poll_interval_ms,
            } => {
                let max_wait = Duration::from_millis(max_wait_ms);
                let interval = Duration::from_millis(poll_interval_ms);
                let mut polls = 0u32;
                let outcome = loop {
                    sleep(interval).await;
                    polls += 1;
                    if self.sample_consumed(world, initial_count) {
                        break ConsumptionOutcome::Consumed;
                    }
                    if started.elapsed() >= max_wait {
                        break ConsumptionOutcome::TimedOutUnconfirmed;
                    }
                };
                (outcome, polls)
            }
        };

        guard.release();
        let held_for = started.elapsed();
        debug!(?outcome, polls, ?held_for, "use released");

        ConsumptionReport {
            outcome,
            polls,
            held_for,
        }
    }

    fn is_expected(&self, stack: &HeldItem) -> bool {
        stack.item_id == self.item_id && stack.is_present()
    }

    /// A failed sample counts as unconfirmed.
    fn sample_consumed(&self, world: &dyn WorldQueries, initial_count: i32) -> bool {
        match world.offhand_item() {
            Ok(None) => true,
            Ok(Some(stack)) => {
                trace!(item = %stack.item_id, count = stack.count, "off-hand sample");
                stack.item_id != self.item_id || !stack.is_present() || stack.count < initial_count
            }
            Err(e) => {
                warn!(error = %e, "off-hand query failed while confirming");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::geometry::AgentPosition;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const BOTTLE: &str = "minecraft:ominous_bottle";

    /// Replays a fixed off-hand sequence; the last entry repeats forever.
    struct ScriptedHand {
        samples: Mutex<Vec<Result<Option<HeldItem>, HostError>>>,
        calls: AtomicU32,
    }

    impl ScriptedHand {
        fn new(samples: Vec<Result<Option<HeldItem>, HostError>>) -> Self {
            Self {
                samples: Mutex::new(samples),
                calls: AtomicU32::new(0),
            }
        }

        fn constant(stack: Option<HeldItem>) -> Self {
            Self::new(vec![Ok(stack)])
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WorldQueries for ScriptedHand {
        fn agent_position(&self) -> Result<AgentPosition, HostError> {
            Ok(AgentPosition::new(0.0, 0.0, 0.0))
        }

        fn offhand_item(&self) -> Result<Option<HeldItem>, HostError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut samples = self.samples.lock().unwrap();
            if samples.len() > 1 {
                samples.remove(0)
            } else {
                samples[0].clone()
            }
        }
    }

    #[derive(Default)]
    struct CountingGesture {
        begins: AtomicU32,
        ends: AtomicU32,
    }

    impl CountingGesture {
        fn begins(&self) -> u32 {
            self.begins.load(Ordering::SeqCst)
        }
        fn ends(&self) -> u32 {
            self.ends.load(Ordering::SeqCst)
        }
    }

    impl UseGesture for CountingGesture {
        fn begin_use(&self) {
            self.begins.fetch_add(1, Ordering::SeqCst);
        }
        fn end_use(&self) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bottles(count: i32) -> Result<Option<HeldItem>, HostError> {
        Ok(Some(HeldItem::new(BOTTLE, count)))
    }

    fn polled(max_wait_ms: u64) -> Executor {
        Executor::new(
            BOTTLE,
            VerificationMode::PolledConfirmation {
                max_wait_ms,
                poll_interval_ms: 100,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn empty_hand_never_presses_use() {
        let world = ScriptedHand::constant(None);
        let gesture = CountingGesture::default();
        let report = polled(15_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::NoItemPresent);
        assert_eq!(gesture.begins(), 0);
        assert_eq!(gesture.ends(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_item_or_empty_stack_is_no_item() {
        let gesture = CountingGesture::default();
        let world = ScriptedHand::constant(Some(HeldItem::new("minecraft:potion", 1)));
        let report = polled(15_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::NoItemPresent);

        let world = ScriptedHand::new(vec![bottles(0)]);
        let report = polled(15_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::NoItemPresent);
        assert_eq!(gesture.begins(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn query_error_before_use_is_no_item() {
        let world = ScriptedHand::new(vec![Err(HostError::sampling("player_hand_items", "boom"))]);
        let gesture = CountingGesture::default();
        let report = polled(15_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::NoItemPresent);
        assert_eq!(gesture.begins(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn count_drop_after_three_polls_is_consumed() {
        // initial sample, two unchanged polls, then the stack shrinks
        let world = ScriptedHand::new(vec![bottles(3), bottles(3), bottles(3), bottles(2)]);
        let gesture = CountingGesture::default();
        let report = polled(15_000).execute(&world, &gesture).await;

        assert_eq!(report.outcome, ConsumptionOutcome::Consumed);
        assert_eq!(report.polls, 3);
        assert_eq!(report.held_for, Duration::from_millis(300));
        assert_eq!(gesture.begins(), 1);
        assert_eq!(gesture.ends(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn last_bottle_leaving_the_hand_is_consumed() {
        let world = ScriptedHand::new(vec![bottles(1), Ok(None)]);
        let gesture = CountingGesture::default();
        let report = polled(3_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::Consumed);
        assert_eq!(report.polls, 1);

        let world = ScriptedHand::new(vec![
            bottles(1),
            Ok(Some(HeldItem::new("minecraft:glass_bottle", 1))),
        ]);
        let report = polled(3_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::Consumed);
        assert_eq!(gesture.ends(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_stack_times_out_after_ten_polls() {
        let world = ScriptedHand::constant(Some(HeldItem::new(BOTTLE, 2)));
        let gesture = CountingGesture::default();
        let report = polled(1_000).execute(&world, &gesture).await;

        assert_eq!(report.outcome, ConsumptionOutcome::TimedOutUnconfirmed);
        assert_eq!(report.polls, 10);
        assert_eq!(world.calls(), 11);
        assert_eq!(report.held_for, Duration::from_secs(1));
        assert_eq!(gesture.ends(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_errors_keep_waiting_then_time_out() {
        let world = ScriptedHand::new(vec![
            bottles(2),
            Err(HostError::sampling("player_hand_items", "busy")),
        ]);
        let gesture = CountingGesture::default();
        let report = polled(500).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::TimedOutUnconfirmed);
        assert_eq!(report.polls, 5);
        assert_eq!(gesture.ends(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_error_then_drop_is_consumed() {
        let world = ScriptedHand::new(vec![
            bottles(2),
            Err(HostError::sampling("player_hand_items", "busy")),
            bottles(1),
        ]);
        let gesture = CountingGesture::default();
        let report = polled(3_000).execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::Consumed);
        assert_eq!(report.polls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn blind_hold_waits_full_duration_then_checks_once() {
        let executor = Executor::new(BOTTLE, VerificationMode::BlindHold { duration_ms: 1_900 });
        let gesture = CountingGesture::default();

        let world = ScriptedHand::new(vec![bottles(4), bottles(3)]);
        let report = executor.execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::Consumed);
        assert_eq!(report.held_for, Duration::from_millis(1_900));
        assert_eq!(report.polls, 1);

        let world = ScriptedHand::constant(Some(HeldItem::new(BOTTLE, 4)));
        let report = executor.execute(&world, &gesture).await;
        assert_eq!(report.outcome, ConsumptionOutcome::TimedOutUnconfirmed);
        assert_eq!(gesture.begins(), 2);
        assert_eq!(gesture.ends(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_future_mid_poll_releases_use() {
        let world = ScriptedHand::constant(Some(HeldItem::new(BOTTLE, 2)));
        let gesture = CountingGesture::default();
        let executor = polled(15_000);

        let attempt = executor.execute(&world, &gesture);
        let cancelled = tokio::time::timeout(Duration::from_millis(450), attempt).await;
        assert!(cancelled.is_err());
        assert_eq!(gesture.begins(), 1);
        assert_eq!(gesture.ends(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_query_still_releases_use() {
        struct Exploding {
            calls: AtomicU32,
        }
        impl WorldQueries for Exploding {
            fn agent_position(&self) -> Result<AgentPosition, HostError> {
                Ok(AgentPosition::new(0.0, 0.0, 0.0))
            }
            fn offhand_item(&self) -> Result<Option<HeldItem>, HostError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Some(HeldItem::new(BOTTLE, 1)))
                } else {
                    panic!("host went away")
                }
            }
        }

        let world = std::sync::Arc::new(Exploding {
            calls: AtomicU32::new(0),
        });
        let gesture = std::sync::Arc::new(CountingGesture::default());
        let (w, g) = (world.clone(), gesture.clone());
        let joined = tokio::spawn(async move {
            polled(3_000).execute(w.as_ref(), g.as_ref()).await
        })
        .await;

        assert!(joined.is_err());
        assert_eq!(gesture.begins(), 1);
        assert_eq!(gesture.ends(), 1);
    }
}
