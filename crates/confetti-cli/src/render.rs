//! User-facing text for command results and errors.

use confetti_core::app::CommandOutcome;
use confetti_core::domain::{CoreError, CycleMode, CycleReport, ErrorKind};

pub fn outcome(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::BirthdaySet { user_id, birthday } => {
            format!("✅ Birthday set for {user_id} on {birthday}.")
        }
        CommandOutcome::BirthdayCleared { user_id } => {
            format!("🗑️ Cleared birthday entry for {user_id}.")
        }
        CommandOutcome::ChannelSet { channel, .. } => {
            format!("✅ Birthday channel set to {channel}.")
        }
        CommandOutcome::Pruned { removed } => {
            format!("🧹 Pruned {removed} stale birthday record(s).")
        }
        CommandOutcome::Wiped { removed } => format!("🗑️ Wiped {removed} birthday record(s)."),
        CommandOutcome::FlagsReset => "✅ All birthday flags reset.".to_owned(),
        CommandOutcome::Listed { records } if records.is_empty() => {
            "No birthdays stored.".to_owned()
        }
        CommandOutcome::Listed { records } => records
            .iter()
            .map(|r| {
                let notified = r
                    .last_notified
                    .map(|d| format!(" (last greeted {d})"))
                    .unwrap_or_default();
                format!("{}  {}  {}{notified}", r.birthday, r.user_id, r.display_name)
            })
            .collect::<Vec<_>>()
            .join("\n"),
        CommandOutcome::CycleRan { report } => cycle(report),
    }
}

fn cycle(report: &CycleReport) -> String {
    if report.due == 0 {
        return format!("No birthdays found for {}.", report.date.format("%m-%d"));
    }
    let verb = match report.mode {
        CycleMode::Scheduled => "birthday",
        CycleMode::Simulated => "simulated birthday",
    };
    let mut text = format!("✅ Sent {} {verb} message(s).", report.sent.len());
    for failure in &report.failed {
        text.push_str(&format!("\n❌ {}: {}", failure.user_id, failure.reason));
    }
    text
}

pub fn error(err: &CoreError) -> String {
    match err.kind() {
        ErrorKind::InvalidDate => "❌ Invalid month or day. Please ensure it's a real date.".to_owned(),
        ErrorKind::NotFound => format!("⚠️ {err}."),
        ErrorKind::Unauthorized => match err {
            CoreError::Unauthorized(reason) => format!("❌ {reason}"),
            other => format!("❌ {other}"),
        },
        ErrorKind::Transport => format!("❌ Could not deliver: {err}."),
        ErrorKind::StoreUnavailable => "❌ The birthday store is unavailable.".to_owned(),
        ErrorKind::CycleInProgress => {
            "⏳ A birthday cycle is already running; try again shortly.".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use confetti_core::domain::{CalendarDay, DenyReason, DispatchFailure, UserId};

    #[test]
    fn set_uses_month_day_format() {
        let text = outcome(&CommandOutcome::BirthdaySet {
            user_id: UserId::new(42),
            birthday: CalendarDay::new(7, 4).unwrap(),
        });
        assert_eq!(text, "✅ Birthday set for user-42 on 07-04.");
    }

    #[test]
    fn empty_cycle_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let text = outcome(&CommandOutcome::CycleRan {
            report: CycleReport::empty(date, CycleMode::Simulated),
        });
        assert_eq!(text, "No birthdays found for 03-09.");
    }

    #[test]
    fn failures_are_listed_after_the_summary() {
        let mut report = CycleReport::empty(
            NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
            CycleMode::Scheduled,
        );
        report.due = 2;
        report.sent = vec![UserId::new(1)];
        report.failed = vec![DispatchFailure {
            user_id: UserId::new(2),
            reason: "boom".to_owned(),
        }];

        let text = outcome(&CommandOutcome::CycleRan { report });
        assert_eq!(text, "✅ Sent 1 birthday message(s).\n❌ user-2: boom");
    }

    #[test]
    fn deny_reasons_are_shown_verbatim() {
        let err = CoreError::Unauthorized(DenyReason::NotDeveloper);
        assert_eq!(error(&err), format!("❌ {}", DenyReason::NotDeveloper));
    }
}
