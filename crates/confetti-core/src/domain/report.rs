//! Scheduler state and cycle outcome.

use chrono::NaiveDate;
use serde::Serialize;

use super::ids::{ChannelId, UserId};

/// Scheduler state machine.
///
/// Idle → Scanning → Dispatching → Settled → Idle. A cycle with nothing due
/// goes from Scanning straight to Settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Scanning,
    Dispatching,
    Settled,
}

/// Whether a cycle was the scheduled one or a developer simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    Scheduled,
    Simulated,
}

/// Per-record send failure kept in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub user_id: UserId,
    pub reason: String,
}

/// Outcome of one settled cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub date: NaiveDate,
    pub mode: CycleMode,
    /// Records that were due when the scan ran.
    pub due: usize,
    /// Channel used; `None` when nothing was due.
    pub channel: Option<ChannelId>,
    pub sent: Vec<UserId>,
    pub failed: Vec<DispatchFailure>,
}

impl CycleReport {
    pub fn empty(date: NaiveDate, mode: CycleMode) -> Self {
        Self {
            date,
            mode,
            due: 0,
            channel: None,
            sent: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.due == 0
    }
}
