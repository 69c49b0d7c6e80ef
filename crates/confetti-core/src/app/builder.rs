//! AppBuilder - wiring of stores, transport ports and settings.
//!
//! # Fail-fast
//! `build()` checks that every port was supplied and returns
//! `BuildError::MissingPorts` listing the absent ones, instead of failing
//! later inside a cycle.

use std::sync::Arc;
use std::time::Duration;

use super::commands::CommandService;
use super::scheduler::{NotificationScheduler, SchedulerPorts, SchedulerSettings};
use super::scheduler_loop::SchedulerLoop;
use crate::domain::CommunityId;
use crate::ports::{
    ChannelLookup, ChannelRegistry, ChannelSender, Clock, EventStore, MemberResolver,
    ReadinessGate, SystemClock,
};

const DEFAULT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These must be supplied before build().")]
    MissingPorts(Vec<&'static str>),

    #[error("cycle period must be greater than zero")]
    ZeroPeriod,
}

pub struct AppBuilder {
    settings: SchedulerSettings,
    period: Duration,
    events: Option<Arc<dyn EventStore>>,
    channels: Option<Arc<dyn ChannelRegistry>>,
    members: Option<Arc<dyn MemberResolver>>,
    sender: Option<Arc<dyn ChannelSender>>,
    lookup: Option<Arc<dyn ChannelLookup>>,
    readiness: Option<Arc<dyn ReadinessGate>>,
    clock: Arc<dyn Clock>,
}

impl AppBuilder {
    pub fn new(community: CommunityId) -> Self {
        Self::with_settings(SchedulerSettings::new(community))
    }

    pub fn with_settings(settings: SchedulerSettings) -> Self {
        Self {
            settings,
            period: DEFAULT_PERIOD,
            events: None,
            channels: None,
            members: None,
            sender: None,
            lookup: None,
            readiness: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use one object as both event store and channel registry.
    pub fn store<S>(mut self, store: Arc<S>) -> Self
    where
        S: EventStore + ChannelRegistry + 'static,
    {
        self.events = Some(store.clone());
        self.channels = Some(store);
        self
    }

    /// Use one transport object for every transport port.
    pub fn transport<T>(mut self, transport: Arc<T>) -> Self
    where
        T: MemberResolver + ChannelSender + ChannelLookup + ReadinessGate + 'static,
    {
        self.members = Some(transport.clone());
        self.sender = Some(transport.clone());
        self.lookup = Some(transport.clone());
        self.readiness = Some(transport);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventStore>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn channels(mut self, channels: Arc<dyn ChannelRegistry>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn members(mut self, members: Arc<dyn MemberResolver>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn sender(mut self, sender: Arc<dyn ChannelSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn lookup(mut self, lookup: Arc<dyn ChannelLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn readiness(mut self, readiness: Arc<dyn ReadinessGate>) -> Self {
        self.readiness = Some(readiness);
        self
    }

    fn missing_ports(&self) -> Vec<&'static str> {
        [
            ("events", self.events.is_none()),
            ("channels", self.channels.is_none()),
            ("members", self.members.is_none()),
            ("sender", self.sender.is_none()),
            ("lookup", self.lookup.is_none()),
            ("readiness", self.readiness.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    pub fn build(self) -> Result<App, BuildError> {
        if self.period.is_zero() {
            return Err(BuildError::ZeroPeriod);
        }
        let missing = self.missing_ports();
        if !missing.is_empty() {
            return Err(BuildError::MissingPorts(missing));
        }
        let (
            Some(events),
            Some(channels),
            Some(members),
            Some(sender),
            Some(lookup),
            Some(readiness),
        ) = (
            self.events,
            self.channels,
            self.members,
            self.sender,
            self.lookup,
            self.readiness,
        )
        else {
            return Err(BuildError::MissingPorts(missing));
        };

        let ports = SchedulerPorts {
            events: events.clone(),
            channels: channels.clone(),
            members: members.clone(),
            sender,
            lookup,
            clock: self.clock,
        };
        let scheduler = Arc::new(NotificationScheduler::new(ports, self.settings));
        let commands = CommandService::new(events, channels, members, scheduler.clone());

        Ok(App {
            scheduler,
            commands,
            readiness,
            period: self.period,
        })
    }
}

/// Wired application: scheduler plus the command surface.
pub struct App {
    pub scheduler: Arc<NotificationScheduler>,
    pub commands: CommandService,
    readiness: Arc<dyn ReadinessGate>,
    period: Duration,
}

impl App {
    /// Start the periodic scheduler in the background.
    pub fn spawn_scheduler(&self) -> SchedulerLoop {
        SchedulerLoop::spawn(self.scheduler.clone(), self.readiness.clone(), self.period)
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{AlwaysReady, InMemoryStore};

    #[test]
    fn build_without_transport_lists_missing_ports() {
        let app = AppBuilder::new(CommunityId::new(1))
            .store(Arc::new(InMemoryStore::new()))
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingPorts(missing))
                if missing == vec!["members", "sender", "lookup", "readiness"]
        ));
    }

    #[tokio::test]
    async fn built_app_runs_commands_and_cycles() {
        use crate::app::scheduler::tests::{DEFAULT_CHANNEL, RecordingSender, Roster};
        use crate::domain::{Actor, UserId};
        use crate::ports::FixedClock;

        let store = Arc::new(InMemoryStore::new());
        let roster = Arc::new(Roster {
            default_channel: Some(DEFAULT_CHANNEL),
            ..Roster::default()
        });
        let sender = Arc::new(RecordingSender::default());
        let app = AppBuilder::new(CommunityId::new(1))
            .store(store)
            .members(roster.clone())
            .lookup(roster)
            .sender(sender.clone())
            .readiness(Arc::new(AlwaysReady))
            .clock(Arc::new(FixedClock::on(2026, 7, 4).unwrap()))
            .build()
            .unwrap();

        let me = Actor::member(UserId::new(42));
        app.commands.set_birthday(&me, None, "ada", 7, 4).unwrap();
        let report = app.scheduler.run_cycle().await.unwrap();

        assert_eq!(report.sent, vec![UserId::new(42)]);
        assert_eq!(sender.messages().len(), 1);
        assert_eq!(app.period(), DEFAULT_PERIOD);
    }

    #[test]
    fn zero_period_is_rejected() {
        let app = AppBuilder::new(CommunityId::new(1))
            .period(Duration::ZERO)
            .readiness(Arc::new(AlwaysReady))
            .build();
        assert!(matches!(app, Err(BuildError::ZeroPeriod)));
    }
}
