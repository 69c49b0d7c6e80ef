//! CommandService - the command gateway contract.
//!
//! Every entry point asks the authorization policy first, then calls the
//! stores or the scheduler, and returns data. Rendering that data (and
//! `CoreError`) into user-facing text is the caller's job.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::scheduler::NotificationScheduler;
use crate::domain::{
    Action, Actor, BirthdayRecord, CalendarDay, ChannelId, CommunityId, CoreError, CycleReport,
    Decision, UserId, decide,
};
use crate::ports::{ChannelRegistry, EventStore, MemberResolver};

/// Successful command result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    BirthdaySet { user_id: UserId, birthday: CalendarDay },
    BirthdayCleared { user_id: UserId },
    ChannelSet { community: CommunityId, channel: ChannelId },
    Pruned { removed: usize },
    Wiped { removed: usize },
    FlagsReset,
    Listed { records: Vec<BirthdayRecord> },
    CycleRan { report: CycleReport },
}

pub struct CommandService {
    events: Arc<dyn EventStore>,
    channels: Arc<dyn ChannelRegistry>,
    members: Arc<dyn MemberResolver>,
    scheduler: Arc<NotificationScheduler>,
}

impl CommandService {
    pub fn new(
        events: Arc<dyn EventStore>,
        channels: Arc<dyn ChannelRegistry>,
        members: Arc<dyn MemberResolver>,
        scheduler: Arc<NotificationScheduler>,
    ) -> Self {
        Self {
            events,
            channels,
            members,
            scheduler,
        }
    }

    /// Store `target`'s birthday. `target == None` means the actor's own.
    pub fn set_birthday(
        &self,
        actor: &Actor,
        target: Option<UserId>,
        display_name: &str,
        month: u32,
        day: u32,
    ) -> Result<CommandOutcome, CoreError> {
        let user_id = target.unwrap_or(actor.id);
        self.authorize(actor, Action::SetBirthday, Some(user_id))?;

        let birthday = CalendarDay::new(month, day).inspect_err(|_| {
            warn!(actor = %actor.id, month, day, "invalid date given");
        })?;
        self.events.upsert(user_id, display_name, birthday)?;

        info!(actor = %actor.id, user = %user_id, %birthday, "birthday set");
        Ok(CommandOutcome::BirthdaySet { user_id, birthday })
    }

    pub fn clear_birthday(
        &self,
        actor: &Actor,
        target: Option<UserId>,
    ) -> Result<CommandOutcome, CoreError> {
        let user_id = target.unwrap_or(actor.id);
        self.authorize(actor, Action::ClearBirthday, Some(user_id))?;

        if !self.events.remove(user_id)? {
            info!(user = %user_id, "no birthday to clear");
            return Err(CoreError::NotFound(user_id));
        }
        info!(actor = %actor.id, user = %user_id, "birthday cleared");
        Ok(CommandOutcome::BirthdayCleared { user_id })
    }

    pub fn set_channel(
        &self,
        actor: &Actor,
        channel: ChannelId,
    ) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::SetChannel, None)?;

        let community = self.scheduler.community();
        self.channels.set_channel(community, channel)?;
        info!(actor = %actor.id, %community, %channel, "birthday channel set");
        Ok(CommandOutcome::ChannelSet { community, channel })
    }

    /// Remove records of users who are no longer community members.
    pub fn prune(&self, actor: &Actor) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::Prune, None)?;

        let members = &self.members;
        let removed = self.events.prune_missing(&|user| members.is_member(user))?;
        info!(actor = %actor.id, removed, "pruned stale birthday records");
        Ok(CommandOutcome::Pruned { removed })
    }

    pub fn wipe(&self, actor: &Actor) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::WipeStore, None)?;

        let removed = self.events.wipe()?;
        warn!(actor = %actor.id, removed, "all birthday records wiped");
        Ok(CommandOutcome::Wiped { removed })
    }

    pub fn reset_flags(&self, actor: &Actor) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::ResetFlags, None)?;

        self.events.reset_all_flags()?;
        warn!(actor = %actor.id, "all notified markers reset");
        Ok(CommandOutcome::FlagsReset)
    }

    /// Any member may list the stored birthdays.
    pub fn list(&self) -> Result<CommandOutcome, CoreError> {
        Ok(CommandOutcome::Listed {
            records: self.events.all()?,
        })
    }

    /// Developer trigger: dispatch the debug message for `month`/`day`.
    pub async fn simulate(
        &self,
        actor: &Actor,
        month: u32,
        day: u32,
    ) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::DebugSimulate, None)?;

        let report = self.scheduler.simulate(CalendarDay::new(month, day)?).await?;
        Ok(CommandOutcome::CycleRan { report })
    }

    /// Developer trigger: run today's real cycle now.
    pub async fn run_now(&self, actor: &Actor) -> Result<CommandOutcome, CoreError> {
        self.authorize(actor, Action::DebugSimulate, None)?;

        let report = self.scheduler.run_cycle().await?;
        Ok(CommandOutcome::CycleRan { report })
    }

    fn authorize(
        &self,
        actor: &Actor,
        action: Action,
        target: Option<UserId>,
    ) -> Result<(), CoreError> {
        let decision = decide(actor, action, target);
        if let Decision::Deny(reason) = decision {
            warn!(actor = %actor.id, ?action, target = ?target.map(|t| t.get()), %reason, "command denied");
        }
        decision.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scheduler::tests::{DEFAULT_CHANNEL, Harness, Roster, RecordingSender, harness, harness_with};
    use crate::domain::{DenyReason, ErrorKind};
    use crate::ports::FixedClock;
    use std::collections::HashMap;

    fn service(h: &Harness, roster: Roster) -> CommandService {
        CommandService::new(h.store.clone(), h.store.clone(), Arc::new(roster), h.scheduler.clone())
    }

    const ME: UserId = UserId::new(1);
    const OTHER: UserId = UserId::new(2);

    #[test]
    fn member_sets_own_birthday() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());

        let outcome = svc.set_birthday(&Actor::member(ME), None, "me", 7, 4).unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::BirthdaySet {
                user_id: ME,
                birthday: CalendarDay::new(7, 4).unwrap()
            }
        );
        assert!(h.store.get(ME).unwrap().is_some());
    }

    #[test]
    fn member_cannot_set_someone_else() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());

        let err = svc
            .set_birthday(&Actor::member(ME), Some(OTHER), "other", 7, 4)
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Unauthorized(DenyReason::OtherUserRequiresAdministrator)
        ));
        assert!(h.store.get(OTHER).unwrap().is_none());
    }

    #[test]
    fn admin_sets_someone_else() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());
        svc.set_birthday(&Actor::admin(ME), Some(OTHER), "other", 7, 4)
            .unwrap();
        assert_eq!(h.store.get(OTHER).unwrap().unwrap().display_name, "other");
    }

    #[test]
    fn invalid_date_is_reported_not_stored() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());
        let err = svc.set_birthday(&Actor::member(ME), None, "me", 2, 30).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
        assert!(h.store.all().unwrap().is_empty());
    }

    #[test]
    fn clearing_absent_birthday_is_not_found() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());
        let err = svc.clear_birthday(&Actor::member(ME), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn set_channel_binds_the_scheduler_community() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());

        assert!(svc.set_channel(&Actor::member(ME), ChannelId::new(9)).is_err());
        svc.set_channel(&Actor::admin(ME), ChannelId::new(9)).unwrap();

        assert_eq!(
            h.store.get_channel(h.scheduler.community()).unwrap(),
            Some(ChannelId::new(9))
        );
    }

    #[test]
    fn prune_drops_users_who_left() {
        let h = harness(2026, 1, 1);
        let mut members = HashMap::new();
        members.insert(UserId::new(43), "<@43>".to_owned());
        let svc = service(
            &h,
            Roster {
                members,
                default_channel: None,
            },
        );
        let day = CalendarDay::new(7, 4).unwrap();
        h.store.upsert(UserId::new(42), "gone", day).unwrap();
        h.store.upsert(UserId::new(43), "here", day).unwrap();

        let outcome = svc.prune(&Actor::member(ME)).unwrap();

        assert_eq!(outcome, CommandOutcome::Pruned { removed: 1 });
        assert!(h.store.get(UserId::new(43)).unwrap().is_some());
    }

    #[test]
    fn wipe_and_reset_are_developer_only() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());
        h.store
            .upsert(ME, "me", CalendarDay::new(1, 1).unwrap())
            .unwrap();

        assert!(svc.wipe(&Actor::admin(ME)).is_err());
        assert!(svc.reset_flags(&Actor::admin(ME)).is_err());

        assert_eq!(svc.reset_flags(&Actor::developer(ME)).unwrap(), CommandOutcome::FlagsReset);
        assert_eq!(
            svc.wipe(&Actor::developer(ME)).unwrap(),
            CommandOutcome::Wiped { removed: 1 }
        );
    }

    #[tokio::test]
    async fn run_now_goes_through_the_scheduler() {
        let h = harness_with(
            Roster {
                default_channel: Some(DEFAULT_CHANNEL),
                ..Roster::default()
            },
            RecordingSender::default(),
            FixedClock::on(2026, 7, 4).unwrap(),
        );
        let svc = service(&h, Roster::default());
        h.store
            .upsert(ME, "me", CalendarDay::new(7, 4).unwrap())
            .unwrap();

        let denied = svc.run_now(&Actor::member(ME)).await.unwrap_err();
        assert_eq!(denied.kind(), ErrorKind::Unauthorized);

        let CommandOutcome::CycleRan { report } = svc.run_now(&Actor::developer(ME)).await.unwrap()
        else {
            panic!("expected a cycle report");
        };
        assert_eq!(report.sent, vec![ME]);
        assert_eq!(h.sender.messages().len(), 1);
    }

    #[tokio::test]
    async fn simulate_rejects_impossible_dates() {
        let h = harness(2026, 1, 1);
        let svc = service(&h, Roster::default());
        let err = svc.simulate(&Actor::developer(ME), 4, 31).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDate);
    }
}
