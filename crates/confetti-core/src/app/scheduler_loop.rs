//! SchedulerLoop - drives the scheduler on a fixed period.
//!
//! The first cycle waits for the transport's readiness gate. After that one
//! cycle runs per tick until shutdown. A tick that lands while a manual
//! cycle is running waits for it rather than skipping the date. No cycle
//! error ends the loop; the next tick is the retry. A debug heartbeat is
//! logged every five minutes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::scheduler::NotificationScheduler;
use crate::ports::ReadinessGate;

const HEARTBEAT: Duration = Duration::from_secs(5 * 60);

/// Handle to the background scheduler task.
/// - `request_shutdown()` stops it before the next tick
/// - `shutdown_and_join()` also waits for an in-flight cycle to finish
pub struct SchedulerLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SchedulerLoop {
    pub fn spawn(
        scheduler: Arc<NotificationScheduler>,
        readiness: Arc<dyn ReadinessGate>,
        period: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(run(scheduler, readiness, period, shutdown_rx));
        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already have exited
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "scheduler task ended abnormally");
        }
    }
}

async fn run(
    scheduler: Arc<NotificationScheduler>,
    readiness: Arc<dyn ReadinessGate>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tokio::select! {
        _ = readiness.await_ready() => {}
        _ = shutdown_rx.changed() => return,
    }
    info!(period_secs = period.as_secs(), community = %scheduler.community(), "scheduler started");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut heartbeat = tokio::time::interval_at(Instant::now() + HEARTBEAT, HEARTBEAT);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = heartbeat.tick() => {
                debug!(state = ?scheduler.state(), "scheduler heartbeat");
                continue;
            }
            _ = ticker.tick() => {}
        }
        if *shutdown_rx.borrow() {
            break;
        }

        match scheduler.run_scheduled().await {
            Ok(report) if report.is_noop() => info!(date = %report.date, "no birthdays today"),
            Ok(report) => info!(
                date = %report.date,
                due = report.due,
                sent = report.sent.len(),
                failed = report.failed.len(),
                "birthday cycle settled"
            ),
            Err(e) => error!(error = %e, kind = ?e.kind(), "birthday cycle aborted; retrying next period"),
        }
    }
    info!("scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scheduler::tests::{
        COMMUNITY, DEFAULT_CHANNEL, RecordingSender, Roster, gated_harness, harness, harness_with,
    };
    use crate::domain::{CalendarDay, ChannelId, CycleState, UserId};
    use crate::impls::ReadySignal;
    use crate::ports::{ChannelRegistry, Clock, EventStore, FixedClock};

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[tokio::test(start_paused = true)]
    async fn first_cycle_waits_for_readiness() {
        let h = harness(2026, 7, 4);
        h.store
            .upsert(UserId::new(42), "ada", CalendarDay::new(7, 4).unwrap())
            .unwrap();
        let ready = Arc::new(ReadySignal::new());

        let handle = SchedulerLoop::spawn(h.scheduler.clone(), ready.clone(), DAY);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(h.sender.messages().is_empty());

        ready.mark_ready();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.sender.messages().len(), 1);

        handle.shutdown_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn each_period_runs_a_cycle_and_never_resends() {
        let h = harness(2026, 7, 4);
        h.store
            .upsert(UserId::new(42), "ada", CalendarDay::new(7, 4).unwrap())
            .unwrap();
        h.store
            .upsert(UserId::new(43), "bob", CalendarDay::new(7, 5).unwrap())
            .unwrap();

        let handle = SchedulerLoop::spawn(h.scheduler.clone(), Arc::new(ReadySignal::ready()), DAY);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.sender.messages().len(), 1);

        // a second tick on the same date sends nothing
        tokio::time::sleep(DAY).await;
        assert_eq!(h.sender.messages().len(), 1);

        h.clock.advance(chrono::Duration::days(1));
        tokio::time::sleep(DAY).await;
        let messages = h.sender.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].1.contains("bob"));

        handle.shutdown_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn tick_during_manual_cycle_waits_instead_of_skipping_the_date() {
        let (h, gate) = gated_harness(2026, 7, 4);
        h.store
            .upsert(UserId::new(1), "sim", CalendarDay::new(1, 1).unwrap())
            .unwrap();
        h.store
            .upsert(UserId::new(42), "ada", CalendarDay::new(7, 4).unwrap())
            .unwrap();

        let mut states = h.scheduler.subscribe();
        let simulation = tokio::spawn({
            let scheduler = h.scheduler.clone();
            async move { scheduler.simulate(CalendarDay::new(1, 1).unwrap()).await }
        });
        states
            .wait_for(|s| *s == CycleState::Dispatching)
            .await
            .unwrap();

        let handle = SchedulerLoop::spawn(h.scheduler.clone(), Arc::new(ReadySignal::ready()), DAY);
        tokio::time::sleep(Duration::from_secs(10 * 60 * 60)).await;
        assert!(h.sender.messages().is_empty());

        // release the simulated send, then the scheduled one
        gate.notify_one();
        simulation.await.unwrap().unwrap();
        gate.notify_one();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let messages = h.sender.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].1.contains("[DEBUG]"));
        assert!(messages[1].1.contains("ada"));
        let ada = h.store.get(UserId::new(42)).unwrap().unwrap();
        assert!(ada.notified_on(h.clock.today()));

        handle.shutdown_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_does_not_stop_the_timer() {
        let h = harness_with(
            Roster::default(),
            RecordingSender::default(),
            FixedClock::on(2026, 7, 4).unwrap(),
        );
        h.store
            .upsert(UserId::new(42), "ada", CalendarDay::new(7, 4).unwrap())
            .unwrap();

        let handle = SchedulerLoop::spawn(h.scheduler.clone(), Arc::new(ReadySignal::ready()), DAY);
        tokio::time::sleep(Duration::from_secs(1)).await;
        // no binding and no default channel: the first cycle aborts
        assert!(h.sender.messages().is_empty());
        assert_eq!(h.store.get(UserId::new(42)).unwrap().unwrap().last_notified, None);

        let channel = ChannelId::new(77);
        h.store.set_channel(COMMUNITY, channel).unwrap();
        tokio::time::sleep(DAY).await;

        let messages = h.sender.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, channel);
        assert_ne!(messages[0].0, DEFAULT_CHANNEL);

        handle.shutdown_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_ticks_never_run_a_cycle() {
        let h = harness(2026, 7, 4);
        h.store
            .upsert(UserId::new(42), "ada", CalendarDay::new(7, 4).unwrap())
            .unwrap();

        let handle = SchedulerLoop::spawn(h.scheduler.clone(), Arc::new(ReadySignal::ready()), DAY);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(h.sender.messages().len(), 1);

        // with the marker gone, any extra cycle would greet ada again
        h.store.reset_all_flags().unwrap();
        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(h.sender.messages().len(), 1);

        handle.shutdown_and_join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_before_ready_exits_cleanly() {
        let h = harness(2026, 7, 4);
        let handle = SchedulerLoop::spawn(h.scheduler.clone(), Arc::new(ReadySignal::new()), DAY);
        handle.shutdown_and_join().await;
        assert!(h.sender.messages().is_empty());
    }
}
