//! NotificationScheduler - the scan-and-dispatch cycle.
//!
//! # Flow
//! 1. Scanning: today's date from the clock, query every calendar day
//!    celebrated today, keep records not yet notified today
//! 2. Dispatching: resolve the channel once (binding, else transport
//!    default; none aborts the cycle before any send), then per record in
//!    order: resolve name → send → `mark_notified`
//! 3. Settled: return a `CycleReport`
//!
//! Every run holds the single in-flight lock. Manual and simulated triggers
//! take it with `try_lock` and get `CoreError::CycleInProgress` while another
//! cycle runs. The periodic loop calls `run_scheduled`, which waits for the
//! lock instead, so a scheduled date is never skipped.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, info, warn};

use super::template::MessageTemplate;
use crate::domain::{
    BirthdayRecord, CalendarDay, ChannelId, CommunityId, CoreError, CycleMode, CycleReport,
    CycleState, DispatchFailure,
};
use crate::ports::{ChannelLookup, ChannelRegistry, ChannelSender, Clock, EventStore, MemberResolver};

/// Port bundle required by the scheduler.
#[derive(Clone)]
pub struct SchedulerPorts {
    pub events: Arc<dyn EventStore>,
    pub channels: Arc<dyn ChannelRegistry>,
    pub members: Arc<dyn MemberResolver>,
    pub sender: Arc<dyn ChannelSender>,
    pub lookup: Arc<dyn ChannelLookup>,
    pub clock: Arc<dyn Clock>,
}

/// Per-deployment scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub community: CommunityId,
    pub template: MessageTemplate,
    pub debug_template: MessageTemplate,
}

impl SchedulerSettings {
    pub fn new(community: CommunityId) -> Self {
        Self {
            community,
            template: MessageTemplate::default(),
            debug_template: MessageTemplate::new(super::template::DEFAULT_DEBUG_MESSAGE)
                .unwrap_or_default(),
        }
    }
}

pub struct NotificationScheduler {
    ports: SchedulerPorts,
    settings: SchedulerSettings,
    in_flight: Mutex<()>,
    state: watch::Sender<CycleState>,
}

impl NotificationScheduler {
    pub fn new(ports: SchedulerPorts, settings: SchedulerSettings) -> Self {
        let (state, _rx) = watch::channel(CycleState::Idle);
        Self {
            ports,
            settings,
            in_flight: Mutex::new(()),
            state,
        }
    }

    pub fn community(&self) -> CommunityId {
        self.settings.community
    }

    pub fn state(&self) -> CycleState {
        *self.state.borrow()
    }

    /// Watch state transitions. Intermediate states may be coalesced.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    /// Manual trigger: run today's cycle now, or fail with
    /// `CycleInProgress` if one is already running.
    pub async fn run_cycle(&self) -> Result<CycleReport, CoreError> {
        let _cycle = self.try_acquire()?;
        let today = self.ports.clock.today();
        self.settle(today, &CalendarDay::celebrated_on(today), CycleMode::Scheduled)
            .await
    }

    /// Periodic trigger: waits for an in-flight cycle to finish, then runs
    /// for the date the tick fired on.
    pub async fn run_scheduled(&self) -> Result<CycleReport, CoreError> {
        let today = self.ports.clock.today();
        let _cycle = self.in_flight.lock().await;
        self.settle(today, &CalendarDay::celebrated_on(today), CycleMode::Scheduled)
            .await
    }

    /// Dispatch the debug message for every record stored on exactly `day`.
    ///
    /// Markers are ignored and left untouched, so a simulation never
    /// suppresses the real notification. No Feb 28 / Feb 29 folding.
    pub async fn simulate(&self, day: CalendarDay) -> Result<CycleReport, CoreError> {
        let year = self.ports.clock.today().year();
        let date = day.in_year(year).ok_or(CoreError::InvalidDate {
            month: day.month(),
            day: day.day(),
        })?;
        let _cycle = self.try_acquire()?;
        self.settle(date, &[day], CycleMode::Simulated).await
    }

    fn try_acquire(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.in_flight
            .try_lock()
            .map_err(|_| CoreError::CycleInProgress)
    }

    /// Run one cycle; the caller holds the in-flight lock.
    async fn settle(
        &self,
        date: NaiveDate,
        days: &[CalendarDay],
        mode: CycleMode,
    ) -> Result<CycleReport, CoreError> {
        let result = self.cycle(date, days, mode).await;
        self.enter(CycleState::Idle);
        result
    }

    async fn cycle(
        &self,
        date: NaiveDate,
        days: &[CalendarDay],
        mode: CycleMode,
    ) -> Result<CycleReport, CoreError> {
        self.enter(CycleState::Scanning);
        let due = self.scan(date, days, mode)?;
        if due.is_empty() {
            debug!(%date, ?mode, "nothing due");
            self.enter(CycleState::Settled);
            return Ok(CycleReport::empty(date, mode));
        }

        self.enter(CycleState::Dispatching);
        let channel = self.resolve_channel()?;
        let template = match mode {
            CycleMode::Scheduled => &self.settings.template,
            CycleMode::Simulated => &self.settings.debug_template,
        };

        let mut report = CycleReport {
            due: due.len(),
            channel: Some(channel),
            ..CycleReport::empty(date, mode)
        };

        for record in due {
            let name = self.display_name(&record);
            let text = template.render(&name);

            if let Err(e) = self.ports.sender.send(channel, &text).await {
                warn!(user = %record.user_id, %channel, error = %e, "birthday message failed");
                report.failed.push(DispatchFailure {
                    user_id: record.user_id,
                    reason: e.to_string(),
                });
                continue;
            }

            if mode == CycleMode::Scheduled {
                match self.ports.events.mark_notified(record.user_id, date) {
                    Ok(()) => {}
                    // Cleared between scan and send; nothing left to mark.
                    Err(CoreError::NotFound(user)) => {
                        warn!(%user, "record vanished before it could be marked");
                    }
                    Err(e) => return Err(e),
                }
            }
            info!(user = %record.user_id, %channel, ?mode, "sent birthday message for {name}");
            report.sent.push(record.user_id);
        }

        self.enter(CycleState::Settled);
        Ok(report)
    }

    fn scan(
        &self,
        date: NaiveDate,
        days: &[CalendarDay],
        mode: CycleMode,
    ) -> Result<Vec<BirthdayRecord>, CoreError> {
        let mut due = Vec::new();
        for &day in days {
            let records = self.ports.events.find_by_date(day)?;
            due.extend(
                records
                    .into_iter()
                    .filter(|r| mode == CycleMode::Simulated || !r.notified_on(date)),
            );
        }
        Ok(due)
    }

    fn resolve_channel(&self) -> Result<ChannelId, CoreError> {
        let community = self.settings.community;
        if let Some(channel) = self.ports.channels.get_channel(community)? {
            return Ok(channel);
        }
        self.ports
            .lookup
            .default_channel(community)
            .ok_or(CoreError::ChannelUnresolved(community))
    }

    fn display_name(&self, record: &BirthdayRecord) -> String {
        match self.ports.members.resolve_member(record.user_id) {
            Some(member) => member.mention,
            None if !record.display_name.is_empty() => record.display_name.clone(),
            None => format!("User ID {}", record.user_id.get()),
        }
    }

    fn enter(&self, state: CycleState) {
        self.state.send_replace(state);
    }
}
